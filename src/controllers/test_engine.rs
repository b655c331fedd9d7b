//! Request/response simulation for unit tests.
//!
//! [`TestEngine::create_request`] builds a synthetic [`Request`], runs it through the application
//! and hands back whatever the application wrote, captured by a [`MockConnection`] instead of a
//! socket.

use crate::{
    controllers::{
        connection::Connection,
        engine::{Application, Engine},
    },
    errors::EngineError,
    models::{
        body::BodyBuffer, config::Config, headers::Headers, http::status_line, request::Request,
        response::CapturedResponse,
    },
};
use std::{
    io,
    net::{IpAddr, Ipv4Addr},
};

/// Header that switches the request body to consuming, non-seekable playback.
pub const SEQUENTIAL_HEADER: &str = "Sequential";

/// Connection that records the response instead of transmitting it.
#[derive(Debug, Default)]
pub struct MockConnection {
    response_data: Vec<u8>,
    status: String,
    status_code: u16,
    headers: Headers,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_captured(self) -> CapturedResponse {
        CapturedResponse::new(
            self.response_data,
            self.status,
            self.status_code,
            self.headers,
        )
    }
}

impl Connection for MockConnection {
    fn write_headers(&mut self, status: u16, headers: &Headers) -> io::Result<()> {
        log::debug!("Captured status {status}");
        self.status_code = status;
        self.status = status_line(status);
        self.headers = headers.clone();
        Ok(())
    }

    fn write_body(&mut self, data: &[u8]) -> io::Result<usize> {
        self.response_data.extend_from_slice(data);
        Ok(data.len())
    }
}

/// Engine double that runs a single synthetic worker without any network transport.
pub struct TestEngine<A: Application> {
    engine: Engine<A>,
    config: Config,
}

impl<A: Application> TestEngine<A> {
    pub fn new(app: A) -> Self {
        Self::with_config(app, Config::default())
    }

    pub fn with_config(app: A, config: Config) -> Self {
        TestEngine {
            engine: Engine::new(app, 0),
            config,
        }
    }

    pub fn worker_id(&self) -> u16 {
        0
    }

    pub fn application(&self) -> &A {
        self.engine.application()
    }

    pub fn init(&mut self) -> Result<(), EngineError> {
        self.engine.init()
    }

    /// Simulates one request. `body` is borrowed for the duration of the call; with the
    /// [`SEQUENTIAL_HEADER`] set, whatever the application reads is removed from it.
    ///
    /// Nothing is returned as an error: failures show up in the captured status and body.
    pub fn create_request(
        &self,
        method: &str,
        path: &str,
        query: &str,
        headers: &Headers,
        body: &mut Vec<u8>,
    ) -> CapturedResponse {
        let sequential = headers
            .header(SEQUENTIAL_HEADER)
            .map_or(false, |value| !value.is_empty());
        let body_device = if sequential {
            BodyBuffer::sequential(body)
        } else {
            BodyBuffer::random_access(body)
        };

        let mut headers = headers.clone();
        if body_device.size() > 0 {
            headers.set_content_length(body_device.size());
        }

        let remote_address = self.config.remote_address().parse().unwrap_or_else(|e| {
            log::warn!(
                "Invalid remote_address '{}', using loopback. {:?}",
                self.config.remote_address(),
                e
            );
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        });

        let mut request = Request::new(method, path, query, remote_address, body_device);
        request.protocol = self.config.protocol().clone();
        request.is_secure = false;
        request.server_address = self.config.server_address().clone();
        request.remote_port = *self.config.remote_port();
        request.remote_user = None;
        request.headers = headers;
        request.start_timer();

        let mut connection = MockConnection::new();
        if let Err(e) = self.engine.process_request(&mut request, &mut connection) {
            log::error!("Simulated request {method} {path} failed. {}", e);
        }
        connection.into_captured()
    }

    /// `GET` without headers or body.
    pub fn get(&self, path: &str, query: &str) -> CapturedResponse {
        self.create_request("GET", path, query, &Headers::new(), &mut vec![])
    }
}
