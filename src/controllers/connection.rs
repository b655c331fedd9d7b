use crate::models::{headers::Headers, http::status_line};
use chrono::Utc;
use std::io::{self, Write};

/// Where the engine sends a finished response.
pub trait Connection {
    /// Sends the status line and headers. Called once, before any body bytes.
    fn write_headers(&mut self, status: u16, headers: &Headers) -> io::Result<()>;

    /// Sends body bytes and returns how many were accepted.
    fn write_body(&mut self, data: &[u8]) -> io::Result<usize>;
}

/// Writes HTTP/1.1 responses onto a byte stream, normally a `TcpStream`.
pub struct StreamConnection<T: Write> {
    stream: T,
}

impl<T: Write> StreamConnection<T> {
    pub fn new(stream: T) -> Self {
        StreamConnection { stream }
    }

    pub fn into_inner(self) -> T {
        self.stream
    }
}

impl<T: Write> Connection for StreamConnection<T> {
    fn write_headers(&mut self, status: u16, headers: &Headers) -> io::Result<()> {
        let mut lines = vec![format!("HTTP/1.1 {}", status_line(status))];
        lines.extend(headers.iter().map(|(name, value)| format!("{name}: {value}")));
        if !headers.contains("Date") {
            lines.push(format!(
                "Date: {}",
                Utc::now().format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if !headers.contains("Connection") {
            lines.push("Connection: close".to_string());
        }
        let head = format!("{}\r\n\r\n", lines.join("\r\n"));
        log::trace!("Sending response head =\n{head}EOF");
        self.stream.write_all(head.as_bytes())
    }

    fn write_body(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.write_all(data)?;
        self.stream.flush()?;
        Ok(data.len())
    }
}
