use crate::{
    controllers::{
        connection::{Connection, StreamConnection},
        engine::{Application, Engine},
    },
    errors::{EngineError, RequestError},
    models::{
        body::BodyBuffer,
        config::Config,
        headers::Headers,
        http::{self, RawRequest},
        request::Request,
    },
};
use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpListener},
    time::Duration,
};

pub fn main_loop<A: Application>(listener: TcpListener, engine: &Engine<A>, config: &Config) {
    log::trace!("Listening for incoming connections");
    for stream in listener.incoming() {
        log::trace!("Connection incoming");
        match stream {
            Ok(mut stream) => {
                let timeout = Duration::from_secs(*config.read_timeout_secs());
                if let Err(e) = stream.set_read_timeout(Some(timeout)) {
                    log::warn!("Failed to set read timeout. {:?}", e);
                }
                let addresses = stream
                    .local_addr()
                    .and_then(|local| stream.peer_addr().map(|peer| (local, peer)));
                let (local, peer) = match addresses {
                    Ok(addresses) => addresses,
                    Err(e) => {
                        log::warn!("Could not resolve connection addresses {}", e);
                        continue;
                    }
                };
                if let Err(e) = handle_stream(&mut stream, local, peer, engine, config) {
                    log::error!("Failed to answer {peer} due to {}", e);
                }
            }
            Err(io_error) => {
                log::warn!("Could not open stream {}", io_error);
            }
        }
    }
}

/// Reads one request from `stream`, dispatches it and writes the response back.
pub fn handle_stream<A: Application, S: Read + Write>(
    stream: &mut S,
    local: SocketAddr,
    peer: SocketAddr,
    engine: &Engine<A>,
    config: &Config,
) -> Result<(), EngineError> {
    let raw = match http::get_request(stream, *config.max_request_bytes()) {
        Ok(raw) => raw,
        Err(RequestError::StreamRead(e)) => return Err(EngineError::Transport(e)),
        Err(e) => {
            log::warn!("Rejecting request from {peer}: {}", e);
            let status = match &e {
                RequestError::RequestTooLarge(_) => 413,
                _ => 400,
            };
            return send_error(stream, status, &e.to_string());
        }
    };

    let RawRequest {
        method,
        path,
        query,
        protocol,
        headers,
        body,
    } = raw;
    let mut request = Request::new(
        method,
        path,
        query,
        peer.ip(),
        BodyBuffer::random_access(&body),
    );
    request.protocol = protocol;
    request.server_address = local.ip().to_string();
    request.remote_port = peer.port();
    request.headers = headers;

    let mut connection = StreamConnection::new(stream);
    engine.process_request(&mut request, &mut connection)
}

fn send_error<S: Write>(stream: &mut S, status: u16, message: &str) -> Result<(), EngineError> {
    let mut headers = Headers::new();
    headers.set_header("Content-Type", "text/plain");
    headers.set_content_length(message.len());
    let mut connection = StreamConnection::new(stream);
    connection.write_headers(status, &headers)?;
    connection.write_body(message.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{apps::PingEcho, test_stream::TestStream};
    use std::net::{TcpStream, ToSocketAddrs};

    fn addresses() -> (SocketAddr, SocketAddr) {
        let local = "127.0.0.1:3000"
            .to_socket_addrs()
            .expect("Failed to parse address")
            .next()
            .expect("No address");
        let peer = "192.168.1.20:51000"
            .to_socket_addrs()
            .expect("Failed to parse address")
            .next()
            .expect("No address");
        (local, peer)
    }

    fn engine() -> Engine<PingEcho> {
        let mut engine = Engine::new(PingEcho::default(), 0);
        engine.init().expect("Failed to init engine");
        engine
    }

    #[test]
    fn handle_stream_ping() {
        let engine = engine();
        let (local, peer) = addresses();
        let request = "GET /ping HTTP/1.1\r\nHost: 127.0.0.1:3000\r\nAccept: */*\r\n\r\n";
        let mut stream = TestStream::new(request.as_bytes());

        handle_stream(&mut stream, local, peer, &engine, &Config::default())
            .expect("Failed to handle stream");
        let sent = stream.sent_string();
        assert!(sent.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(sent.contains("Content-Length: 4\r\n"));
        assert!(sent.ends_with("\r\n\r\npong"));
    }

    #[test]
    fn handle_stream_uses_peer_address() {
        let engine = engine();
        let (local, peer) = addresses();
        let request = "GET /whoami HTTP/1.0\r\n\r\n";
        let mut stream = TestStream::new(request.as_bytes());

        handle_stream(&mut stream, local, peer, &engine, &Config::default())
            .expect("Failed to handle stream");
        assert!(stream
            .sent_string()
            .ends_with("192.168.1.20:51000 127.0.0.1 HTTP/1.0 insecure -"));
    }

    #[test]
    fn handle_stream_echo() {
        let engine = engine();
        let (local, peer) = addresses();
        let body = "{\"alerts\": []}";
        let headers = vec![
            "POST /echo HTTP/1.1".to_string(),
            "Host: 127.0.0.1:3000".to_string(),
            "User-Agent: UnitTest/1.0".to_string(),
            format!("Content-Length: {}", body.len()),
        ]
        .join("\r\n");
        let request = format!("{headers}\r\n\r\n{body}");
        let mut stream = TestStream::new(request.as_bytes());

        handle_stream(&mut stream, local, peer, &engine, &Config::default())
            .expect("Failed to handle stream");
        let sent = stream.sent_string();
        assert!(sent.contains("X-Request-Content-Length: 14\r\n"));
        assert!(sent.ends_with(body));
    }

    #[test]
    fn handle_stream_bad_request() {
        let engine = engine();
        let (local, peer) = addresses();
        let request = "POST /echo HTTP/1.1\r\nContent-Length: four\r\n\r\nNala";
        let mut stream = TestStream::new(request.as_bytes());

        handle_stream(&mut stream, local, peer, &engine, &Config::default())
            .expect("Failed to handle stream");
        let sent = stream.sent_string();
        assert!(sent.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(sent.ends_with("Content-Length 'four' is not a number"));
    }

    #[test]
    fn handle_stream_too_large() {
        let engine = engine();
        let (local, peer) = addresses();
        let config = Config::load(Some("src/resources/test-max-config.json".to_string()))
            .expect("Failed to load config");
        let body = "x".repeat(4096);
        let request = format!("POST /echo HTTP/1.1\r\nContent-Length: 4096\r\n\r\n{body}");
        let mut stream = TestStream::new(request.as_bytes());

        handle_stream(&mut stream, local, peer, &engine, &config)
            .expect("Failed to handle stream");
        assert!(stream.sent_string().starts_with("HTTP/1.1 413 "));
    }

    #[test]
    fn handle_stream_reassembles_segments() {
        let engine = engine();
        let (local, peer) = addresses();
        let request = "POST /echo HTTP/1.1\r\nHost: 127.0.0.1:3000\r\nContent-Length: 11\r\n\r\nhello world";
        let mut stream = TestStream::segmented(request.as_bytes(), 7);

        handle_stream(&mut stream, local, peer, &engine, &Config::default())
            .expect("Failed to handle stream");
        assert!(stream.reads() > 1);
        let sent = stream.sent_string();
        assert!(sent.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(sent.ends_with("\r\n\r\nhello world"));
    }

    #[test]
    fn handle_stream_short_body_after_timeout() {
        let engine = engine();
        let (local, peer) = addresses();
        let request = "POST /echo HTTP/1.1\r\nContent-Length: 42\r\n\r\nNala is the best dog.";
        let mut stream = TestStream::segmented(request.as_bytes(), 16);

        handle_stream(&mut stream, local, peer, &engine, &Config::default())
            .expect("Failed to handle stream");
        let sent = stream.sent_string();
        assert!(sent.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(sent.ends_with("Expected 42 body bytes but only received 21"));
    }

    #[test]
    fn handle_stream_huge_content_length() {
        let engine = engine();
        let (local, peer) = addresses();
        let request = "POST /echo HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\nNala";
        let mut stream = TestStream::new(request.as_bytes());

        handle_stream(&mut stream, local, peer, &engine, &Config::default())
            .expect("Failed to handle stream");
        assert!(stream.sent_string().starts_with("HTTP/1.1 413 "));
    }

    #[test]
    fn main_loop_serves_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        let address = listener.local_addr().expect("Failed to get address");
        std::thread::spawn(move || {
            let engine = engine();
            main_loop(listener, &engine, &Config::default());
        });

        let mut client = TcpStream::connect(address).expect("Failed to connect");
        client
            .write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .expect("Failed to send request");
        let mut response = String::new();
        client
            .read_to_string(&mut response)
            .expect("Failed to read response");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("pong"));
    }
}
