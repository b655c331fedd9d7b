use crate::{errors::RequestError, models::headers::Headers};
use std::io::Read;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// `"NNN Reason"` for a status code, `"NNN Unknown"` when the code has no standard phrase.
pub fn status_line(status: u16) -> String {
    let reason = ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown");
    format!("{status} {reason}")
}

/// A request as read off the wire, before it is turned into a [`Request`](crate::Request).
#[derive(Debug)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub protocol: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

struct Head {
    method: String,
    path: String,
    query: String,
    protocol: String,
    headers: Headers,
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_head(head: &[u8]) -> Result<Head, RequestError> {
    let head = std::str::from_utf8(head).map_err(RequestError::BadMessage)?;
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let (method, target, protocol) = match parts.as_slice() {
        [method, target, protocol] => (*method, *target, *protocol),
        _ => return Err(RequestError::BadRequestLine(request_line.to_string())),
    };
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    let mut headers = Headers::new();
    for line in lines.filter(|line| !line.is_empty()) {
        match line.split_once(':') {
            Some((name, value)) => headers.push_header(name.trim(), value.trim()),
            None => log::warn!("Ignoring malformed header line '{line}'"),
        }
    }

    Ok(Head {
        method: method.to_string(),
        path: path.to_string(),
        query: query.to_string(),
        protocol: protocol.to_string(),
        headers,
    })
}

fn expected_body_len(headers: &Headers) -> Result<usize, RequestError> {
    match headers.header("Content-Length") {
        None => Ok(0),
        Some(value) => value
            .trim()
            .parse::<usize>()
            .map_err(|_| RequestError::InvalidContentLength(value.to_string())),
    }
}

/// Reads one HTTP/1.1 request. A missing `Content-Length` means there is no body.
pub fn get_request<T: Read>(stream: &mut T, max_bytes: usize) -> Result<RawRequest, RequestError> {
    let mut read = vec![];
    let mut buffer = vec![0; 1024];
    let mut head: Option<(usize, Head)> = None;
    let mut expected_len = 0;

    loop {
        match stream.read(&mut buffer[..]) {
            Ok(0) => {
                log::trace!("EOF found");
                break;
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                log::trace!("WouldBlock- assuming end of transmission.");
                break;
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::error!("Failed to read from stream. {:?}", e);
                return Err(RequestError::StreamRead(e));
            }
            Ok(bytes_read) => {
                log::trace!("Read {} bytes from incoming stream.", bytes_read);
                read.extend_from_slice(&buffer[0..bytes_read]);
            }
        }

        if read.len() > max_bytes {
            return Err(RequestError::RequestTooLarge(max_bytes));
        }

        if head.is_none() {
            if let Some(index) = find_subsequence(&read, HEADER_END) {
                let parsed = parse_head(&read[..index])?;
                expected_len = expected_body_len(&parsed.headers)?;
                let start_index = index + HEADER_END.len();
                match start_index.checked_add(expected_len) {
                    Some(total) if total <= max_bytes => {}
                    _ => return Err(RequestError::RequestTooLarge(max_bytes)),
                }
                log::trace!("Headers complete, expecting {expected_len} body bytes");
                head = Some((start_index, parsed));
            }
        }

        if let Some((start_index, _)) = &head {
            if read.len() >= start_index + expected_len {
                break;
            }
        }
    }

    let (start_index, head) = head.ok_or(RequestError::NoMessageBody)?;
    let end_index = start_index
        .checked_add(expected_len)
        .ok_or(RequestError::RequestTooLarge(max_bytes))?;
    if end_index > read.len() {
        let actual = read.len() - start_index;
        return Err(RequestError::BadContentLength(expected_len, actual));
    }

    log::trace!(
        "Recieved {} {} with {} body bytes",
        head.method,
        head.path,
        expected_len
    );
    Ok(RawRequest {
        method: head.method,
        path: head.path,
        query: head.query,
        protocol: head.protocol,
        headers: head.headers,
        body: read[start_index..end_index].to_vec(),
    })
}
