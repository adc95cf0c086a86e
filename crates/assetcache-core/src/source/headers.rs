//! Response header lines collected during a GET.

/// Headers the source cares about. Only the final response of a redirect chain counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHeaders {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Parse collected header lines. A status line (`HTTP/...`) resets what was seen so far,
/// so headers of intermediate redirects are ignored.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = ResponseHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
                out.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-length") {
                out.content_length = value.parse::<u64>().ok();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn content_type_and_length() {
        let h = parse_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Type: application/pdf",
            "content-length: 1234",
            "",
        ]));
        assert_eq!(h.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(h.content_length, Some(1234));
    }

    #[test]
    fn redirect_headers_discarded() {
        let h = parse_headers(&lines(&[
            "HTTP/1.1 301 Moved Permanently",
            "Content-Type: text/html",
            "Content-Length: 10",
            "",
            "HTTP/1.1 200 OK",
            "Content-Length: 5",
            "",
        ]));
        assert_eq!(h.content_type, None);
        assert_eq!(h.content_length, Some(5));
    }
}
