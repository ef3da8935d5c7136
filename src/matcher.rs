use tracing::debug;

use crate::consolidate::Match;
use crate::rules::MatchRule;

/// Runs every rule over a response and reports each hit as a [`Match`].
pub struct MatchScanner {
    rules: Vec<MatchRule>,
}

impl MatchScanner {
    pub fn new(rules: Vec<MatchRule>) -> Self {
        MatchScanner { rules }
    }

    /// All non-overlapping hits of every rule, rule by rule.
    ///
    /// Offsets are byte offsets into `response` and cover the whole hit;
    /// `capture` is the rule's group, or the whole hit when that group did
    /// not take part in the match. Only the display text is decoded, lossily.
    pub fn scan(&self, response: &[u8]) -> Vec<Match> {
        let mut matches = Vec::new();

        for rule in &self.rules {
            for caps in rule.pattern.captures_iter(response) {
                let Some(whole) = caps.get(0) else { continue };
                if whole.start() == whole.end() {
                    continue;
                }
                let capture = caps.get(rule.group).unwrap_or(whole);
                let capture = String::from_utf8_lossy(capture.as_bytes());

                debug!(
                    "{} hit at {}..{}: {}",
                    rule.match_type,
                    whole.start(),
                    whole.end(),
                    capture
                );

                matches.push(Match {
                    match_type: rule.match_type.clone(),
                    start: whole.start(),
                    end: whole.end(),
                    raw: whole.as_bytes().to_vec(),
                    full_match: String::from_utf8_lossy(whole.as_bytes()).into_owned(),
                    capture: capture.trim().to_string(),
                    severity: rule.severity,
                    confidence: rule.confidence,
                });
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::finding::{Confidence, Severity};
    use crate::rules::defaults::builtin_rules;
    use crate::rules::parse_rules;

    const RESPONSE: &str = "HTTP/1.1 404 Not Found\r\n\
Server: Apache/2.2.4 (Unix) mod_perl/2.0.3\r\n\
X-Powered-By: PHP/5.6.40\r\n\
X-AspNet-Version: 4.0.30319\r\n\
Content-Type: text/html\r\n\
\r\n\
<html><body><h1>Not Found</h1>\
<hr><address>Apache/2.2.4 (Unix) Server at example.com Port 80</address>\
</body></html>";

    #[test]
    fn test_builtin_rules_find_versions() {
        let scanner = MatchScanner::new(builtin_rules());
        let matches = scanner.scan(RESPONSE.as_bytes());

        let server = matches
            .iter()
            .find(|m| m.match_type == "Server header")
            .expect("server header");
        assert_eq!(server.capture, "Apache/2.2.4 (Unix) mod_perl/2.0.3");
        assert_eq!(server.full_match, "Server: Apache/2.2.4 (Unix) mod_perl/2.0.3");
        assert_eq!(&RESPONSE.as_bytes()[server.start..server.end], server.raw.as_slice());
        assert_eq!(server.severity, Some(Severity::Low));
        assert_eq!(server.confidence, Some(Confidence::Certain));

        let powered = matches
            .iter()
            .find(|m| m.match_type == "X-Powered-By")
            .expect("x-powered-by");
        assert_eq!(powered.capture, "PHP/5.6.40");

        assert!(matches.iter().any(|m| m.match_type == "ASP.NET version"
            && m.capture == "4.0.30319"));
        assert!(matches.iter().any(|m| m.match_type == "Apache error page"));

        for m in &matches {
            assert!(m.start < m.end && m.end <= RESPONSE.len());
        }
    }

    #[test]
    fn test_headers_without_versions_are_ignored() {
        let scanner = MatchScanner::new(builtin_rules());
        let matches = scanner.scan(b"HTTP/1.1 200 OK\r\nServer: cloudflare\r\n\r\nhello");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_every_hit_is_reported() {
        let rules = parse_rules(
            "[[rule]]\ntype = \"Lib\"\npattern = 'lib-([0-9.]+)'\n",
            "t",
        )
        .unwrap();
        let scanner = MatchScanner::new(rules);
        let matches = scanner.scan(b"lib-1.0 and lib-2.1");
        let captures: Vec<&str> = matches.iter().map(|m| m.capture.as_str()).collect();
        assert_eq!(captures, vec!["1.0", "2.1"]);
        assert_eq!(matches[1].start, 12);
        assert_eq!(matches[0].severity, None);
    }

    #[test]
    fn test_optional_group_falls_back_to_whole_hit() {
        let rules = parse_rules(
            "[[rule]]\ntype = \"Opt\"\npattern = 'Foo(/[0-9]+)?'\n",
            "t",
        )
        .unwrap();
        let scanner = MatchScanner::new(rules);
        let matches = scanner.scan(b"Foo and Foo/2");
        assert_eq!(matches[0].capture, "Foo");
        assert_eq!(matches[1].capture, "/2");
    }

    #[test]
    fn test_offsets_survive_invalid_utf8() {
        let response: &[u8] = b"HTTP/1.1 200 OK\r\nX-Note: caf\xe9\xe9\r\nServer: Apache/2.2.4\r\n\r\n";
        let scanner = MatchScanner::new(builtin_rules());
        let matches = scanner.scan(response);

        let server = matches
            .iter()
            .find(|m| m.match_type == "Server header")
            .expect("server header");
        assert_eq!(server.start, 32);
        assert_eq!(&response[server.start..server.end], server.raw.as_slice());
        assert_eq!(server.full_match, "Server: Apache/2.2.4");
        assert!(server.check_bounds(response.len()).is_ok());
    }

    #[test]
    fn test_invalid_bytes_inside_a_hit_are_kept_raw() {
        let scanner = MatchScanner::new(builtin_rules());
        let matches = scanner.scan(b"HTTP/1.1 200 OK\r\nServer: Foo/1.0\xe9\r\n\r\n");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].raw, b"Server: Foo/1.0\xe9");
        assert_eq!(matches[0].capture, "Foo/1.0\u{fffd}");
    }
}
