#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Failed to read from stream: {0}")]
    StreamRead(std::io::Error),

    #[error("Stream closed before the end of the request headers")]
    NoMessageBody,

    #[error("Malformed request line '{0}'")]
    BadRequestLine(String),

    #[error("Request is not valid UTF-8: {0}")]
    BadMessage(std::str::Utf8Error),

    #[error("Expected {0} body bytes but only received {1}")]
    BadContentLength(usize, usize),

    #[error("Content-Length '{0}' is not a number")]
    InvalidContentLength(String),

    #[error("Request exceeds the limit of {0} bytes")]
    RequestTooLarge(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Application bootstrap failed during {phase}: {reason}")]
    Bootstrap { phase: &'static str, reason: String },

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to open config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Error reading configuration: {0}")]
    Json(#[from] serde_json::Error),
}
