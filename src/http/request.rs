use super::{ClientConfig, HeaderMap, HttpRequest};

/// Name of the identifier header the target server validates.
pub const CUSTOM_ID_HEADER: &str = "X-Custom-ID";

/// Serialize a request into its HTTP/1.1 wire form.
///
/// Injects `X-Custom-ID`, `Host` and `Connection: close` on top of the
/// caller's headers, and `Content-Length` when a body is present. The layout
/// is fixed: request line, CRLF-joined header lines, a blank line, then the
/// body bytes if any.
pub fn build(request: &HttpRequest, config: &ClientConfig) -> Vec<u8> {
    let mut headers = request.headers.clone();
    headers.set(CUSTOM_ID_HEADER, config.custom_id.clone());
    headers.set("Host", config.address());
    headers.set("Connection", "close");
    if let Some(ref body) = request.body {
        headers.set("Content-Length", body.len().to_string());
    }

    let mut bytes = Vec::with_capacity(256);
    bytes.extend_from_slice(
        format!("{} {} HTTP/1.1\r\n", request.method, request.path).as_bytes(),
    );
    for (name, value) in headers.iter() {
        bytes.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
    }
    bytes.extend_from_slice(b"\r\n");
    if let Some(ref body) = request.body {
        bytes.extend_from_slice(body);
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("127.0.0.1", 8080, "test-id-123")
    }

    fn built_text(request: &HttpRequest) -> String {
        String::from_utf8(build(request, &config())).unwrap()
    }

    fn header_lines(text: &str) -> Vec<&str> {
        let head = text.split("\r\n\r\n").next().unwrap();
        head.lines().skip(1).collect()
    }

    #[test]
    fn injects_required_headers_exactly_once() {
        let request = HttpRequest::get("/status");
        let text = built_text(&request);
        let lines = header_lines(&text);

        assert!(text.starts_with("GET /status HTTP/1.1\r\n"));
        for expected in [
            "X-Custom-ID: test-id-123",
            "Host: 127.0.0.1:8080",
            "Connection: close",
        ] {
            assert_eq!(
                lines.iter().filter(|l| **l == expected).count(),
                1,
                "missing or duplicated: {expected}"
            );
        }
    }

    #[test]
    fn preserves_caller_headers() {
        let request = HttpRequest::get("/fast").with_header("Accept", "application/json");
        let text = built_text(&request);

        assert!(header_lines(&text).contains(&"Accept: application/json"));
    }

    #[test]
    fn injected_values_override_caller_conflicts() {
        let request = HttpRequest::get("/").with_header("Connection", "keep-alive");
        let text = built_text(&request);
        let lines = header_lines(&text);

        assert!(lines.contains(&"Connection: close"));
        assert!(!lines.iter().any(|l| l.contains("keep-alive")));
    }

    #[test]
    fn content_length_matches_body() {
        let request = HttpRequest::new("POST", "/status").with_body("hello world");
        let text = built_text(&request);

        assert!(header_lines(&text).contains(&"Content-Length: 11"));
        assert!(text.ends_with("\r\n\r\nhello world"));
    }

    #[test]
    fn no_content_length_without_body() {
        let text = built_text(&HttpRequest::get("/"));

        assert!(!text.to_ascii_lowercase().contains("content-length"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn method_and_path_pass_through_uninterpreted() {
        let request = HttpRequest::new("DELETE", "/a b?q=1");
        let text = built_text(&request);

        assert!(text.starts_with("DELETE /a b?q=1 HTTP/1.1\r\n"));
    }
}
