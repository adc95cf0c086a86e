//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single static body on GET. Can answer the first N requests with
//! 503 and can delay every response, and counts requests so tests can assert
//! how many reached the network.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct AssetServerOptions {
    /// Respond 503 to this many GETs before serving the body.
    pub fail_first: u32,
    /// Sleep this long before answering each request.
    pub delay: Duration,
    /// Sent as `Content-Type`.
    pub content_type: &'static str,
}

impl Default for AssetServerOptions {
    fn default() -> Self {
        Self {
            fail_first: 0,
            delay: Duration::ZERO,
            content_type: "application/pdf",
        }
    }
}

pub struct AssetServer {
    /// Full URL of the asset, e.g. "http://127.0.0.1:12345/resume.pdf".
    pub url: String,
    hits: Arc<AtomicU32>,
    last_request: Arc<Mutex<String>>,
}

impl AssetServer {
    /// Number of GET requests received so far.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw text of the most recent request head.
    pub fn last_request(&self) -> String {
        self.last_request.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread serving `body`. Runs until the process exits.
pub fn start(body: Vec<u8>) -> AssetServer {
    start_with_options(body, AssetServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: AssetServerOptions) -> AssetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicU32::new(0));
    let last_request = Arc::new(Mutex::new(String::new()));
    {
        let hits = Arc::clone(&hits);
        let last_request = Arc::clone(&last_request);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = Arc::clone(&body);
                let hits = Arc::clone(&hits);
                let last_request = Arc::clone(&last_request);
                thread::spawn(move || handle(stream, &body, opts, &hits, &last_request));
            }
        });
    }
    AssetServer {
        url: format!("http://127.0.0.1:{}/resume.pdf", port),
        hits,
        last_request,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: AssetServerOptions,
    hits: &AtomicU32,
    last_request: &Mutex<String>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]).to_string();
    let method = request.split_whitespace().next().unwrap_or("").to_string();
    *last_request.lock().unwrap() = request;

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let seen = hits.fetch_add(1, Ordering::SeqCst);
    if !opts.delay.is_zero() {
        thread::sleep(opts.delay);
    }
    if seen < opts.fail_first {
        let _ = stream.write_all(
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        opts.content_type,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
