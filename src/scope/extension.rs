/// File extensions the crawl is willing to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Html,
    Doc,
    Pdf,
    Bmp,
    Gif,
    Jpg,
    Jpeg,
    Png,
}

/// Allow-list, matched against the end of the lowercased URL
const ALLOWED: &[(&str, Extension)] = &[
    (".html", Extension::Html),
    (".doc", Extension::Doc),
    (".pdf", Extension::Pdf),
    (".bmp", Extension::Bmp),
    (".gif", Extension::Gif),
    (".jpg", Extension::Jpg),
    (".jpeg", Extension::Jpeg),
    (".png", Extension::Png),
];

impl Extension {
    /// Returns true for the raster image formats counted by the image tally
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Self::Bmp | Self::Gif | Self::Jpg | Self::Jpeg | Self::Png
        )
    }
}

/// Apparent file type of a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// The URL ends with an allow-listed extension
    Allowed(Extension),

    /// The path or query contains a '.' but the URL does not end with an allowed extension
    Disallowed,

    /// No '.' after the host; presumed content-negotiated
    Unmarked,
}

impl FileKind {
    /// Returns true if this file kind may be fetched
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Self::Disallowed)
    }

    /// Returns true if the URL names an image
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Allowed(ext) if ext.is_image())
    }
}

/// Determines the apparent file type of a URL
///
/// The match is anchored at the very end of the URL string, so a trailing
/// query string or fragment defeats an otherwise allowed extension. Dots in
/// the scheme and authority (`www.example.com`) do not mark a URL as typed;
/// only the part after the host is checked for a '.'.
///
/// # Arguments
///
/// * `url` - The URL to inspect; case does not matter
///
/// # Examples
///
/// ```
/// use crawl_tally::scope::{file_kind, Extension, FileKind};
///
/// assert_eq!(file_kind("https://example.com/a.PDF"), FileKind::Allowed(Extension::Pdf));
/// assert_eq!(file_kind("https://example.com/style.css"), FileKind::Disallowed);
/// assert_eq!(file_kind("https://example.com/a.html?ref=1"), FileKind::Disallowed);
/// assert_eq!(file_kind("https://www.nytimes.com/section/world"), FileKind::Unmarked);
/// ```
pub fn file_kind(url: &str) -> FileKind {
    let lower = url.to_lowercase();

    for (suffix, ext) in ALLOWED {
        if lower.ends_with(suffix) {
            return FileKind::Allowed(*ext);
        }
    }

    if resource_part(&lower).contains('.') {
        FileKind::Disallowed
    } else {
        FileKind::Unmarked
    }
}

/// Everything after `scheme://authority`, or the whole string when there is no scheme
fn resource_part(url: &str) -> &str {
    match url.find("://") {
        Some(idx) => {
            let rest = &url[idx + 3..];
            match rest.find(['/', '?', '#']) {
                Some(end) => &rest[end..],
                None => "",
            }
        }
        None => url,
    }
}
