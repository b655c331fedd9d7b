//! In-process HTTP request engine.
//!
//! An [`Application`](controllers::engine::Application) is driven either by the TCP server in
//! [`controllers::server`] or, for unit tests, by the [`TestEngine`](controllers::test_engine::TestEngine)
//! which simulates a whole request/response cycle without touching a socket.

pub mod errors;

pub mod models {
    pub mod body;
    pub mod config;
    pub mod headers;
    pub mod http;
    pub mod request;
    pub mod response;
}

pub mod controllers {
    pub mod connection;
    pub mod engine;
    pub mod server;
    pub mod test_engine;
}

pub mod harness {
    pub mod observer;
    pub mod runner;
}

pub mod validator {
    pub mod alpha;
}


pub use controllers::engine::{Application, BoxError, Engine, HandlerResult};
pub use controllers::test_engine::TestEngine;
pub use models::headers::Headers;
pub use models::request::Request;
pub use models::response::{CapturedResponse, Response};
