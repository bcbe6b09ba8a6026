//! Loopback HTTP stub standing in for the routing and geocoding services.
//!
//! Responses are served in order, one per connection; the last one repeats
//! once the list is exhausted. Each connection is handled on its own thread
//! so a delayed response does not hold up later attempts.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub struct StubServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
    heads: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(responses: Vec<StubResponse>) -> Self {
        assert!(!responses.is_empty(), "stub needs at least one response");

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let base_url = format!("http://{}", listener.local_addr().expect("stub address"));
        let hits = Arc::new(AtomicUsize::new(0));
        let heads = Arc::new(Mutex::new(Vec::new()));

        let accept_hits = Arc::clone(&hits);
        let accept_heads = Arc::clone(&heads);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let index = accept_hits.fetch_add(1, Ordering::SeqCst);
                let response = responses[index.min(responses.len() - 1)].clone();
                let heads = Arc::clone(&accept_heads);
                thread::spawn(move || serve(stream, response, heads));
            }
        });

        Self {
            base_url,
            hits,
            heads,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw request heads (request line plus headers) received so far.
    pub fn heads(&self) -> Vec<String> {
        self.heads.lock().expect("heads lock").clone()
    }

    /// Request targets (path and query) received so far.
    pub fn targets(&self) -> Vec<String> {
        self.heads()
            .iter()
            .filter_map(|head| head.split_whitespace().nth(1).map(str::to_string))
            .collect()
    }
}

/// A port nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}

fn serve(mut stream: TcpStream, response: StubResponse, heads: Arc<Mutex<Vec<String>>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(read) => head.extend_from_slice(&buf[..read]),
        }
    }
    heads
        .lock()
        .expect("heads lock")
        .push(String::from_utf8_lossy(&head).into_owned());

    thread::sleep(response.delay);

    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason(response.status),
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(reply.as_bytes());
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
