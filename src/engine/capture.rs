use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use tracing::{debug, warn};

/// One captured HTTP response, ready for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    /// Host the response was retrieved from
    pub host: String,
    /// Capture file, plus line number for .jsonl captures
    pub source: String,
    /// Raw response bytes (status line, headers and body)
    pub content: Vec<u8>,
}

/// A line of a .jsonl capture file
#[derive(Debug, Deserialize)]
struct CaptureLine {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    host: Option<String>,
    response: String,
}

/// Extract the host from a URL: no scheme, user-info, port or path.
pub fn host_from_url(url: &str) -> Option<String> {
    let rest = match url.find("://") {
        Some(i) => &url[i + 3..],
        None => url,
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit('@').next().unwrap_or("");

    let host = if let Some(stripped) = host_port.strip_prefix('[') {
        // IPv6 literal, keep the brackets
        let end = stripped.find(']')?;
        &host_port[..end + 2]
    } else {
        host_port.split(':').next().unwrap_or("")
    };

    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// Read every response held by a capture file.
///
/// Returns the responses and the number of entries that had to be skipped.
pub fn read_capture(root: &Path, path: &Path) -> Result<(Vec<CapturedResponse>, usize)> {
    let rel_path = path.strip_prefix(root).unwrap_or(path);
    let bytes = std::fs::read(path)?;

    let is_jsonl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl"));

    if is_jsonl {
        // JSON text is UTF-8; a bad line fails on its own and is skipped
        let content = String::from_utf8_lossy(&bytes);
        Ok(parse_jsonl(&rel_path.display().to_string(), &content))
    } else {
        let host = host_for_raw_capture(rel_path);
        debug!("Raw capture {} for host {}", rel_path.display(), host);
        Ok((
            vec![CapturedResponse {
                host,
                source: rel_path.display().to_string(),
                content: bytes,
            }],
            0,
        ))
    }
}

/// Parse a .jsonl capture: one `{"url", "response"}` object per line
pub fn parse_jsonl(source: &str, content: &str) -> (Vec<CapturedResponse>, usize) {
    let mut responses = Vec::new();
    let mut skipped = 0;

    for (line_num, line) in content.lines().enumerate() {
        let line_number = line_num + 1;
        if line.trim().is_empty() {
            continue;
        }

        let entry = match serde_json::from_str::<CaptureLine>(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping {}:{}: {}", source, line_number, e);
                skipped += 1;
                continue;
            }
        };

        let host = entry
            .host
            .filter(|h| !h.trim().is_empty())
            .map(|h| h.trim().to_ascii_lowercase())
            .or_else(|| entry.url.as_deref().and_then(host_from_url));

        match host {
            Some(host) => responses.push(CapturedResponse {
                host,
                source: format!("{}:{}", source, line_number),
                content: entry.response.into_bytes(),
            }),
            None => {
                warn!("Skipping {}:{}: no host or url", source, line_number);
                skipped += 1;
            }
        }
    }

    (responses, skipped)
}

/// Raw captures live in a directory named after their host; files at the
/// scan root fall back to their own name.
fn host_for_raw_capture(rel_path: &Path) -> String {
    rel_path
        .parent()
        .and_then(|p| p.file_name())
        .or_else(|| rel_path.file_stem())
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_from_url() {
        assert_eq!(host_from_url("https://Example.com/a/b?c"), Some("example.com".into()));
        assert_eq!(host_from_url("http://user:pw@example.com:8080/"), Some("example.com".into()));
        assert_eq!(host_from_url("example.com:443"), Some("example.com".into()));
        assert_eq!(host_from_url("http://[::1]:8080/x"), Some("[::1]".into()));
        assert_eq!(host_from_url("https:///path"), None);
        assert_eq!(host_from_url(""), None);
    }

    #[test]
    fn test_parse_jsonl() {
        let content = r#"{"url": "https://example.com/", "response": "HTTP/1.1 200 OK\r\nServer: nginx/1.18.0\r\n\r\n"}

not json
{"host": "Other.Example", "response": "HTTP/1.1 200 OK\r\n\r\n"}
{"response": "no host here"}
"#;
        let (responses, skipped) = parse_jsonl("caps.jsonl", content);
        assert_eq!(skipped, 2);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].host, "example.com");
        assert_eq!(responses[0].source, "caps.jsonl:1");
        assert!(responses[0].content.ends_with(b"Server: nginx/1.18.0\r\n\r\n"));
        assert_eq!(responses[1].host, "other.example");
        assert_eq!(responses[1].source, "caps.jsonl:4");
    }

    #[test]
    fn test_host_for_raw_capture() {
        assert_eq!(
            host_for_raw_capture(Path::new("example.com/index.http")),
            "example.com"
        );
        assert_eq!(
            host_for_raw_capture(Path::new("mirror/Example.org/page.http")),
            "example.org"
        );
        assert_eq!(host_for_raw_capture(Path::new("api.example.http")), "api.example");
    }

    #[test]
    fn test_raw_capture_keeps_bytes() {
        let dir = tempfile::Builder::new().prefix("verscout").tempdir().unwrap();
        let host_dir = dir.path().join("example.com");
        std::fs::create_dir(&host_dir).unwrap();
        let body = b"HTTP/1.1 200 OK\r\nX-Note: caf\xe9\r\nServer: Apache/2.2.4\r\n\r\n";
        std::fs::write(host_dir.join("index.http"), body).unwrap();

        let (responses, skipped) =
            read_capture(dir.path(), &host_dir.join("index.http")).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].host, "example.com");
        assert_eq!(responses[0].content, body);
    }
}
