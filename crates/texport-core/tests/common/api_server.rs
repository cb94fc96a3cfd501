//! Minimal scripted HTTP/1.1 server for integration tests.
//!
//! Responses are enqueued per (method, path); each matching request pops
//! the next one. Unmatched requests get a 404. Every request is recorded
//! so tests can assert call order.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Scripted {
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Scripted {
    pub fn json(status: u32, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn raw(status: u32, body: &[u8]) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/octet-stream".into())],
            body: body.to_vec(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

type Script = HashMap<(String, String), VecDeque<Scripted>>;

pub struct ApiServer {
    base_url: String,
    script: Arc<Mutex<Script>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl ApiServer {
    /// Binds an ephemeral port and serves in background threads until the
    /// process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let script: Arc<Mutex<Script>> = Arc::new(Mutex::new(HashMap::new()));
        let requests: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

        let handler_script = Arc::clone(&script);
        let handler_requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let script = Arc::clone(&handler_script);
                let requests = Arc::clone(&handler_requests);
                thread::spawn(move || handle(stream, &script, &requests));
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            script,
            requests,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn enqueue(&self, method: &str, path: &str, response: Scripted) {
        self.script
            .lock()
            .unwrap()
            .entry((method.to_uppercase(), path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Every request seen so far as (method, path), in arrival order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

fn handle(
    mut stream: TcpStream,
    script: &Mutex<Script>,
    requests: &Mutex<Vec<(String, String)>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));

    let head = match read_head(&mut stream) {
        Some(head) => head,
        None => return,
    };
    let (method, path) = match parse_request_line(&head) {
        Some(parsed) => parsed,
        None => return,
    };
    drain_body(&mut stream, &head);

    requests.lock().unwrap().push((method.clone(), path.clone()));

    let response = script
        .lock()
        .unwrap()
        .get_mut(&(method, path))
        .and_then(VecDeque::pop_front)
        .unwrap_or_else(|| Scripted::json(404, r#"{"error":"not found"}"#));

    let mut out = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.body.len()
    );
    for (name, value) in &response.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    let _ = stream.write_all(out.as_bytes());
    let _ = stream.write_all(&response.body);
}

/// Reads until the end of the header block, returning everything read so
/// far (which may include part of the body).
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut collected = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        collected.extend_from_slice(&buf[..n]);
        if collected.windows(4).any(|w| w == b"\r\n\r\n") {
            return String::from_utf8(collected).ok();
        }
        if collected.len() > 64 * 1024 {
            return None;
        }
    }
}

fn parse_request_line(head: &str) -> Option<(String, String)> {
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_uppercase();
    let target = parts.next()?;
    // Strip any query string; tests match on the path alone.
    let path = target.split('?').next().unwrap_or(target).to_string();
    Some((method, path))
}

/// Consumes any request body bytes not already read with the head, so the
/// client never sees a reset while still writing.
fn drain_body(stream: &mut TcpStream, head: &str) {
    let content_length: usize = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0);
    if content_length == 0 {
        return;
    }
    let already = head
        .find("\r\n\r\n")
        .map(|i| head.len() - (i + 4))
        .unwrap_or(0);
    let mut remaining = content_length.saturating_sub(already);
    let mut buf = [0u8; 4096];
    while remaining > 0 {
        match stream.read(&mut buf[..remaining.min(4096)]) {
            Ok(0) | Err(_) => return,
            Ok(n) => remaining -= n,
        }
    }
}
