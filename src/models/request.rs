use crate::models::{body::BodyBuffer, headers::Headers};
use chrono::{DateTime, Utc};
use std::{
    io::Read,
    net::IpAddr,
    time::{Duration, Instant},
};

/// Decoded `key=value` pairs in the order they appeared.
pub type Params = Vec<(String, String)>;

/// Everything an application sees about one request. The body borrows the caller's bytes for
/// the lifetime of a single dispatch.
#[derive(Debug)]
pub struct Request<'a> {
    pub method: String,
    pub path: String,
    pub query: String,
    pub protocol: String,
    pub is_secure: bool,
    pub server_address: String,
    pub remote_address: IpAddr,
    pub remote_port: u16,
    pub remote_user: Option<String>,
    pub headers: Headers,
    started: Instant,
    started_at: DateTime<Utc>,
    body: BodyBuffer<'a>,
}

impl<'a> Request<'a> {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        query: impl Into<String>,
        remote_address: IpAddr,
        body: BodyBuffer<'a>,
    ) -> Self {
        Request {
            method: method.into(),
            path: path.into(),
            query: query.into(),
            protocol: "HTTP/1.1".to_string(),
            is_secure: false,
            server_address: String::new(),
            remote_address,
            remote_port: 0,
            remote_user: None,
            headers: Headers::new(),
            started: Instant::now(),
            started_at: Utc::now(),
            body,
        }
    }

    /// Restarts the elapsed-time marker.
    pub fn start_timer(&mut self) {
        self.started = Instant::now();
        self.started_at = Utc::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn started_at(&self) -> &DateTime<Utc> {
        &self.started_at
    }

    pub fn body(&self) -> &BodyBuffer<'a> {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BodyBuffer<'a> {
        &mut self.body
    }

    /// Reads whatever is left of the body.
    pub fn read_body(&mut self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.body.bytes_available());
        self.body.read_to_end(&mut data)?;
        Ok(data)
    }

    pub fn query_params(&self) -> Params {
        parse_params(&self.query)
    }
}

pub(crate) fn parse_params(query: &str) -> Params {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(part: &str) -> String {
    let part = part.replace('+', " ");
    match urlencoding::decode(&part) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            log::debug!("Keeping undecodable query component '{part}' as is. {:?}", e);
            part
        }
    }
}
