//! A tiny in-process HTTP server that replays canned responses and records
//! what it received. Lets the builder be exercised without the live service.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: body.into(),
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path and query as received.
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Debug, Default)]
struct State {
    responses: Vec<StubResponse>,
    served: usize,
    received: Vec<RecordedRequest>,
}

/// Serves `responses` in order; once they run out the last one repeats.
#[derive(Debug)]
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(responses: Vec<StubResponse>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(State {
            responses,
            ..State::default()
        }));

        let shared = Arc::clone(&state);
        let task = tokio::spawn(async move {
            loop {
                let stream = match listener.accept().await {
                    Ok((stream, _)) => stream,
                    Err(err) => {
                        log::warn!("stub server accept failed: {err}");
                        continue;
                    }
                };

                let state = Arc::clone(&shared);
                tokio::task::spawn(async move {
                    let service = service_fn(move |req| respond(Arc::clone(&state), req));
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        log::debug!("stub connection failed: {err:?}");
                    }
                });
            }
        });

        log::debug!("stub server listening on {addr}");
        Ok(Self { addr, state, task })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path.trim_start_matches('/'))
    }

    pub fn received(&self) -> Vec<RecordedRequest> {
        self.lock().received.clone()
    }

    pub fn hits(&self) -> usize {
        self.lock().served
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(state: Arc<Mutex<State>>, req: Request<Incoming>) -> Result<Response<Full<Bytes>>> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();

    let canned = {
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.received.push(RecordedRequest {
            method: parts.method,
            path: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
            headers: parts.headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
        let index = state.served.min(state.responses.len().saturating_sub(1));
        state.served += 1;
        state.responses.get(index).cloned()
    };

    let canned = canned
        .unwrap_or_else(|| StubResponse::text(StatusCode::NOT_FOUND, "no canned response"));

    let mut builder = Response::builder().status(canned.status);
    for (key, value) in &canned.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    Ok(builder.body(Full::new(Bytes::from(canned.body)))?)
}

