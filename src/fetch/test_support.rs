//! In-process fakes shared by the fetch and session tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::error::FetchError;

use super::{FetchResult, Observation, QuoteProvider};

pub fn observation(symbol: &str, last_price: f64) -> Observation {
    let mut row = Observation::empty(symbol);
    row.company_name = Some(format!("{symbol} Ltd"));
    row.last_price = Some(last_price);
    row
}

/// Provider whose responses are either immediate or released by the test.
#[derive(Default)]
pub struct ScriptedProvider {
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    held: Mutex<HashMap<String, VecDeque<oneshot::Receiver<FetchResult<Observation>>>>>,
    failing: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Hold the next request for `symbol` until the returned sender fires.
    pub fn hold(&self, symbol: &str) -> oneshot::Sender<FetchResult<Observation>> {
        let (tx, rx) = oneshot::channel();
        self.held
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    /// Every unheld request for `symbol` fails.
    pub fn fail(&self, symbol: &str) {
        self.failing.lock().unwrap().push(symbol.to_string());
    }
}

impl QuoteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, FetchResult<Observation>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requested.lock().unwrap().push(symbol.to_string());
        let held = self
            .held
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(VecDeque::pop_front);
        let failing = self.failing.lock().unwrap().iter().any(|s| s == symbol);

        async move {
            if let Some(rx) = held {
                return rx
                    .await
                    .unwrap_or_else(|_| Err(FetchError::request_failed("gate dropped")));
            }
            if failing {
                return Err(FetchError::request_failed("scripted failure"));
            }
            Ok(observation(symbol, 100.0 + call as f64))
        }
        .boxed()
    }
}

pub struct CannedResponse {
    pub path: Option<&'static str>,
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            path: None,
            status,
            body: body.to_string(),
        }
    }

    pub fn at(mut self, path: &'static str) -> Self {
        self.path = Some(path);
        self
    }
}

pub struct TestServer {
    pub base_url: String,
    requests: Arc<tokio::sync::Mutex<Vec<String>>>,
}

impl TestServer {
    /// Request lines received so far.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

/// Serve each canned response to one connection, routed by path prefix.
pub async fn serve_http(responses: Vec<CannedResponse>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let remaining = Arc::new(tokio::sync::Mutex::new(responses));

    let log = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let log = Arc::clone(&log);
            let remaining = Arc::clone(&remaining);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let text = String::from_utf8_lossy(&buf).to_string();
                let request_line = text.lines().next().unwrap_or_default().to_string();
                let target = request_line.split(' ').nth(1).unwrap_or_default().to_string();
                log.lock().await.push(request_line);

                let response = {
                    let mut remaining = remaining.lock().await;
                    let position = remaining.iter().position(|canned| {
                        canned.path.map_or(true, |path| target.starts_with(path))
                    });
                    position.map(|idx| remaining.remove(idx))
                };
                let (status, body) = match response {
                    Some(canned) => (canned.status, canned.body),
                    None => (404, "{}".to_string()),
                };
                let payload = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(payload.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    TestServer { base_url, requests }
}
