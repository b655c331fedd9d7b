use crate::{
    controllers::connection::Connection,
    errors::EngineError,
    models::{request::Request, response::Response},
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), BoxError>;

/// The application an engine drives.
pub trait Application {
    /// One-time global setup.
    fn init(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Per-worker setup, run after [`Application::init`].
    fn post_fork(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    fn handle(&self, request: &mut Request<'_>, response: &mut Response) -> HandlerResult;
}

/// Bootstraps an [`Application`] and dispatches requests to it.
///
/// The engine does not know about sockets. Whoever feeds it a [`Request`] also hands over the
/// [`Connection`] that receives the response.
pub struct Engine<A: Application> {
    app: A,
    worker_id: u16,
}

impl<A: Application> Engine<A> {
    pub fn new(app: A, worker_id: u16) -> Self {
        Engine { app, worker_id }
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }

    pub fn application(&self) -> &A {
        &self.app
    }

    /// Runs global then per-worker initialization. The second phase is skipped when the first
    /// one fails.
    pub fn init(&mut self) -> Result<(), EngineError> {
        self.app.init().map_err(|e| EngineError::Bootstrap {
            phase: "init",
            reason: e.to_string(),
        })?;
        log::debug!("Application initialized.");
        self.app.post_fork().map_err(|e| EngineError::Bootstrap {
            phase: "post_fork",
            reason: e.to_string(),
        })?;
        log::debug!("Worker {} initialized.", self.worker_id);
        Ok(())
    }

    /// Drives one request to completion and writes the response to `connection`.
    ///
    /// Handler errors become a `500` response. Only transport failures are returned.
    pub fn process_request<C: Connection>(
        &self,
        request: &mut Request<'_>,
        connection: &mut C,
    ) -> Result<(), EngineError> {
        log::trace!("Processing {} {}", request.method, request.path);
        let mut response = Response::new();
        if let Err(e) = self.app.handle(request, &mut response) {
            log::error!("Failed to process request due to {}", e);
            response = Response::new();
            response.set_status(500);
            response.set_content_type("text/plain");
            response.set_body(e.to_string());
        }

        if !response.body.is_empty() && !response.headers.contains("Content-Length") {
            response.headers.set_content_length(response.body.len());
        }

        log::debug!(
            "{} {} -> {} in {:?}",
            request.method,
            request.path,
            response.status,
            request.elapsed()
        );
        connection.write_headers(response.status, &response.headers)?;
        if !response.body.is_empty() {
            connection.write_body(&response.body)?;
        }
        Ok(())
    }
}
