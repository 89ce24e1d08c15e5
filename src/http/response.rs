use super::{ClientError, HeaderMap, HttpResponse};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

fn find_terminator(raw: &[u8]) -> Option<usize> {
    raw.windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Whether the header block has been fully received.
pub(crate) fn has_terminator(raw: &[u8]) -> bool {
    find_terminator(raw).is_some()
}

/// Framing rule: has a full response been accumulated?
///
/// Complete once the header terminator is present and, when the header block
/// declares a `Content-Length`, the bytes after the terminator reach that
/// value. Without a `Content-Length` the terminator alone completes the
/// frame. Chunked transfer-encoding is deliberately not supported; the
/// server is expected to either declare a length or close the connection.
pub fn is_complete(raw: &[u8]) -> bool {
    match find_terminator(raw) {
        None => false,
        Some(end) => {
            let body_received = raw.len() - (end + HEADER_TERMINATOR.len());
            match declared_content_length(&raw[..end]) {
                Some(declared) => body_received >= declared,
                None => true,
            }
        }
    }
}

/// `Content-Length` declared by a raw header block, if any.
///
/// An unparseable value is treated as absent rather than fatal.
pub fn declared_content_length(head: &[u8]) -> Option<usize> {
    let head = String::from_utf8_lossy(head);
    head.split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Split accumulated bytes into status code, headers and body.
///
/// Input without a header terminator is tolerated (the peer closed early):
/// the status is 0 and the whole input becomes the body. A status line whose
/// second field is not a number is the one hard failure, surfaced as
/// [`ClientError::Parse`] because no usable response can be recovered.
pub fn parse(raw: &[u8]) -> Result<HttpResponse, ClientError> {
    let Some(end) = find_terminator(raw) else {
        return Ok(HttpResponse {
            status: 0,
            headers: HeaderMap::new(),
            body: String::from_utf8_lossy(raw).into_owned(),
        });
    };

    let head = String::from_utf8_lossy(&raw[..end]).into_owned();
    let body = String::from_utf8_lossy(&raw[end + HEADER_TERMINATOR.len()..]).into_owned();

    let mut lines = head.split("\r\n");
    let status = parse_status_line(lines.next().unwrap_or_default())?;

    let mut headers = HeaderMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.set(name, value.trim_start());
        }
    }

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn parse_status_line(line: &str) -> Result<u16, ClientError> {
    let mut fields = line.split_whitespace();
    let _version = fields.next();
    fields
        .next()
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| ClientError::Parse(line.to_string()))
}
