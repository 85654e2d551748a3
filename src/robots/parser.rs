//! Robots.txt rules, matched with the robotstxt crate

use robotstxt::DefaultMatcher;

/// Robots.txt rules for one origin
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
}

impl ParsedRobots {
    /// Wraps raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Rules that allow everything
    ///
    /// Used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Checks if a URL is allowed for the given user agent
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay in seconds for a user agent
    ///
    /// A group naming the agent wins over the wildcard group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.content.is_empty() {
            return None;
        }

        let mut current_user_agents: Vec<String> = Vec::new();
        let mut in_rules = false;
        let mut delay_for_wildcard: Option<f64> = None;
        let mut delay_for_agent: Option<f64> = None;

        let normalized_agent = user_agent.to_lowercase();

        for line in self.content.lines() {
            let trimmed = line.split('#').next().unwrap_or_default().trim();
            if trimmed.is_empty() {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // A user-agent line after rules starts a new group
                    if in_rules {
                        current_user_agents.clear();
                        in_rules = false;
                    }
                    current_user_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    in_rules = true;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if current_user_agents
                        .iter()
                        .any(|ua| ua != "*" && normalized_agent.contains(ua.as_str()))
                    {
                        delay_for_agent = Some(delay);
                    } else if current_user_agents.iter().any(|ua| ua == "*") {
                        delay_for_wildcard = Some(delay);
                    }
                }
                _ => in_rules = true,
            }
        }

        delay_for_agent.or(delay_for_wildcard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed("https://example.com/any/path", "TestBot"));
        assert_eq!(robots.crawl_delay("TestBot"), None);
    }

    #[test]
    fn test_disallow_all() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!robots.is_allowed("https://example.com/", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/page", "TestBot"));
    }

    #[test]
    fn test_disallow_specific() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert!(robots.is_allowed("https://example.com/page", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "TestBot"));
    }

    #[test]
    fn test_allow_overrides_disallow() {
        let robots =
            ParsedRobots::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!robots.is_allowed("https://example.com/private", "TestBot"));
        assert!(robots.is_allowed("https://example.com/private/public", "TestBot"));
    }

    #[test]
    fn test_specific_user_agent() {
        let robots =
            ParsedRobots::from_content("User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(robots.is_allowed("https://example.com/page", "GoodBot"));
        assert!(!robots.is_allowed("https://example.com/page", "BadBot"));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 10\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("TestBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_specific_agent_wins() {
        let robots = ParsedRobots::from_content(
            "User-agent: *\nCrawl-delay: 10\n\nUser-agent: TestBot\nCrawl-delay: 5",
        );
        assert_eq!(robots.crawl_delay("TestBot"), Some(5.0));
        assert_eq!(robots.crawl_delay("OtherBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_grouped_agents() {
        let robots =
            ParsedRobots::from_content("User-agent: a-bot\nUser-agent: testbot\nCrawl-delay: 2.5");
        assert_eq!(robots.crawl_delay("TestBot/1.0"), Some(2.5));
        assert_eq!(robots.crawl_delay("OtherBot"), None);
    }

    #[test]
    fn test_crawl_delay_ignores_comments_and_junk() {
        let robots = ParsedRobots::from_content(
            "# comment\nUser-agent: * # everyone\nCrawl-delay: soon\nCrawl-delay: 3 # seconds",
        );
        assert_eq!(robots.crawl_delay("TestBot"), Some(3.0));
    }
}
