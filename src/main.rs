use request_engine::{
    controllers::server,
    models::config::Config,
    validator::alpha::ValidatorAlpha,
    Application, BoxError, Engine, HandlerResult, Request, Response,
};
use std::net::TcpListener;

struct DemoApp {
    app_name: String,
}

impl Application for DemoApp {
    fn init(&mut self) -> Result<(), BoxError> {
        log::info!("Starting {}", self.app_name);
        Ok(())
    }

    fn handle(&self, request: &mut Request<'_>, response: &mut Response) -> HandlerResult {
        response.set_content_type("text/plain");
        match (request.method.as_str(), request.path.as_str()) {
            ("GET", "/ping") => response.set_body("pong"),
            ("POST", "/echo") => {
                let body = request.read_body()?;
                response.set_body(body);
            }
            ("GET", "/hello") => {
                let result = ValidatorAlpha::new("name")
                    .label("Name")
                    .default_value("World")
                    .validate(&request.query_params());
                match result.error_message() {
                    Some(message) => {
                        response.set_status(422);
                        response.set_body(message.clone());
                    }
                    None => response.set_body(format!(
                        "Hello, {}!",
                        result.value().as_deref().unwrap_or("World")
                    )),
                }
            }
            _ => {
                response.set_status(404);
                response.set_body("Not Found");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let config = match Config::load(std::env::args().nth(1)) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}. Falling back to defaults.", e);
            Config::default()
        }
    };

    let mut engine = Engine::new(
        DemoApp {
            app_name: config.app_name().clone(),
        },
        0,
    );
    if let Err(e) = engine.init() {
        log::error!("{}", e);
        std::process::exit(1);
    }

    let listener = match TcpListener::bind(config.bind_host()) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind to {}. {}", config.bind_host(), e);
            std::process::exit(1);
        }
    };
    log::info!("Listening on {}", config.bind_host());

    let accept_loop = tokio::task::spawn_blocking(move || server::main_loop(listener, &engine, &config));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => log::info!("Shutting down."),
            Err(e) => log::error!("Failed to listen for shutdown signal. {}", e),
        },
        result = accept_loop => {
            if let Err(e) = result {
                log::error!("Accept loop stopped unexpectedly. {}", e);
            }
        }
    }
    // Blocking tasks keep the runtime alive on drop.
    std::process::exit(0);
}
