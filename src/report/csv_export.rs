//! Flat CSV exports of the observation maps, and readers for them
//!
//! Rows are written in URL order. Fields are quoted only when needed, so a
//! URL containing a comma survives the round trip.

use crate::observe::{Snapshot, VisitRecord};
use crate::report::{ReportError, ReportResult};
use csv::{ReaderBuilder, StringRecord, Terminator, Writer, WriterBuilder};
use std::collections::BTreeMap;
use std::io::{Read, Write};

pub const FETCH_HEADER: [&str; 2] = ["URL", "Status"];
pub const VISIT_HEADER: [&str; 4] = ["URL", "Size (bytes)", "Outlinks", "Content-Type"];
pub const URLS_HEADER: [&str; 2] = ["URL", "Location"];

const IN_DOMAIN: &str = "OK";
const OUT_OF_DOMAIN: &str = "N_OK";

fn writer<W: Write>(sink: W) -> Writer<W> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink)
}

/// Writes `URL,Status` rows
pub fn write_fetch_csv<W: Write>(snapshot: &Snapshot, sink: W) -> ReportResult<()> {
    let mut out = writer(sink);
    out.write_record(FETCH_HEADER)?;
    for (url, status) in &snapshot.fetches {
        let status = status.to_string();
        out.write_record([url.as_str(), status.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `URL,Size (bytes),Outlinks,Content-Type` rows
pub fn write_visit_csv<W: Write>(snapshot: &Snapshot, sink: W) -> ReportResult<()> {
    let mut out = writer(sink);
    out.write_record(VISIT_HEADER)?;
    for (url, visit) in &snapshot.visits {
        let size = visit.size_bytes.to_string();
        let outlinks = visit.outlink_count.to_string();
        out.write_record([
            url.as_str(),
            size.as_str(),
            outlinks.as_str(),
            visit.content_type.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `URL,Location` rows with `OK` for in-domain URLs and `N_OK` otherwise
pub fn write_urls_csv<W: Write>(snapshot: &Snapshot, sink: W) -> ReportResult<()> {
    let mut out = writer(sink);
    out.write_record(URLS_HEADER)?;
    for (url, in_domain) in &snapshot.discoveries {
        let location = if *in_domain { IN_DOMAIN } else { OUT_OF_DOMAIN };
        out.write_record([url.as_str(), location])?;
    }
    out.flush()?;
    Ok(())
}

/// Renders one export into a string
pub fn render<F>(write: F) -> ReportResult<String>
where
    F: FnOnce(&mut Vec<u8>) -> ReportResult<()>,
{
    let mut buffer = Vec::new();
    write(&mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ReportError::Format(e.to_string()))
}

/// Reads a fetch export back into a map
pub fn read_fetch_csv<R: Read>(source: R) -> ReportResult<BTreeMap<String, u16>> {
    let mut map = BTreeMap::new();
    for_each_row(source, &FETCH_HEADER, |row, line| {
        map.insert(row[0].to_string(), parse_field(&row[1], "Status", line)?);
        Ok(())
    })?;
    Ok(map)
}

/// Reads a visit export back into a map
pub fn read_visit_csv<R: Read>(source: R) -> ReportResult<BTreeMap<String, VisitRecord>> {
    let mut map = BTreeMap::new();
    for_each_row(source, &VISIT_HEADER, |row, line| {
        let record = VisitRecord {
            size_bytes: parse_field(&row[1], "Size (bytes)", line)?,
            outlink_count: parse_field(&row[2], "Outlinks", line)?,
            content_type: row[3].to_string(),
        };
        map.insert(row[0].to_string(), record);
        Ok(())
    })?;
    Ok(map)
}

/// Reads a discovered-URL export back into a map
pub fn read_urls_csv<R: Read>(source: R) -> ReportResult<BTreeMap<String, bool>> {
    let mut map = BTreeMap::new();
    for_each_row(source, &URLS_HEADER, |row, line| {
        let in_domain = match &row[1] {
            IN_DOMAIN => true,
            OUT_OF_DOMAIN => false,
            other => {
                return Err(ReportError::Format(format!(
                    "line {}: unknown Location '{}'",
                    line, other
                )))
            }
        };
        map.insert(row[0].to_string(), in_domain);
        Ok(())
    })?;
    Ok(map)
}

/// Rebuilds a snapshot from the three exports
pub fn read_snapshot<F, V, U>(fetch: F, visit: V, urls: U) -> ReportResult<Snapshot>
where
    F: Read,
    V: Read,
    U: Read,
{
    Ok(Snapshot {
        fetches: read_fetch_csv(fetch)?,
        visits: read_visit_csv(visit)?,
        discoveries: read_urls_csv(urls)?,
    })
}

fn for_each_row<R, F>(source: R, header: &[&str], mut handle: F) -> ReportResult<()>
where
    R: Read,
    F: FnMut(&StringRecord, u64) -> ReportResult<()>,
{
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);

    let found = reader.headers()?;
    if found.iter().ne(header.iter().copied()) {
        return Err(ReportError::Format(format!(
            "unexpected header '{}', expected '{}'",
            found.iter().collect::<Vec<_>>().join(","),
            header.join(",")
        )));
    }

    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        handle(&row, line)?;
    }
    Ok(())
}

fn parse_field<T: std::str::FromStr>(value: &str, column: &str, line: u64) -> ReportResult<T> {
    value.parse().map_err(|_| {
        ReportError::Format(format!(
            "line {}: invalid {} value '{}'",
            line, column, value
        ))
    })
}
