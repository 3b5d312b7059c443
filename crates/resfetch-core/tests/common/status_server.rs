//! Minimal HTTP/1.1 server that replays scripted responses for integration tests.
//!
//! Each request gets the next `(status, body)` from the script; once the
//! script runs out the last response repeats. Request lines are recorded so
//! tests can assert on query strings and hit counts.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone)]
pub struct StatusServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StatusServer {
    /// Request lines received so far (e.g. "GET /?q=paris HTTP/1.1").
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(script: Vec<(u32, &'static str)>) -> StatusServer {
    assert!(!script.is_empty(), "script needs at least one response");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
            let mut buf = [0u8; 8192];
            let n = match stream.read(&mut buf) {
                Ok(0) | Err(_) => continue,
                Ok(n) => n,
            };
            let line = String::from_utf8_lossy(&buf[..n])
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            let index = {
                let mut reqs = recorded.lock().unwrap();
                reqs.push(line);
                reqs.len() - 1
            };
            let (status, body) = script[index.min(script.len() - 1)];
            let response = format!(
                "HTTP/1.1 {} Scripted\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    StatusServer {
        url: format!("http://127.0.0.1:{}/weather", port),
        requests,
    }
}
