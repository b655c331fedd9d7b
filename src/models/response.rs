use crate::models::headers::Headers;
use derive_getters::Getters;
use serde::Serialize;

/// Response being built by an application handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Response {
            status: 200,
            headers: Headers::new(),
            body: vec![],
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.headers.set_header("Content-Type", content_type);
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn write(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }
}

/// What a test observes after one simulated request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Getters)]
pub struct CapturedResponse {
    body: Vec<u8>,
    status: String,
    status_code: u16,
    headers: Headers,
}

impl CapturedResponse {
    pub(crate) fn new(body: Vec<u8>, status: String, status_code: u16, headers: Headers) -> Self {
        CapturedResponse {
            body,
            status,
            status_code,
            headers,
        }
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
