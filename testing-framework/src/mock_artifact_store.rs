use anyhow::Context;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::net::TcpListener;

struct StoreState {
    artifacts: HashMap<String, Vec<u8>>,
    forced_status: Option<u16>,
    request_count: Arc<AtomicU64>,
}

/// A release download server. Artifacts are keyed by their URL path without the
/// leading slash, e.g. `releases/latest/download/healthcheck-amd64`.
#[derive(Default)]
pub struct MockArtifactStore {
    artifacts: HashMap<String, Vec<u8>>,
    forced_status: Option<u16>,
    request_count: Arc<AtomicU64>,
}

impl MockArtifactStore {
    pub fn new(request_count: Arc<AtomicU64>) -> Self {
        Self {
            request_count,
            ..Default::default()
        }
    }

    pub fn with_artifact(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.artifacts.insert(path.into(), bytes);
        self
    }

    /// Answers every request with this status and an empty body.
    pub fn with_forced_status(mut self, status: u16) -> Self {
        self.forced_status = Some(status);
        self
    }

    /// Serves in the background and returns the base URL, e.g. `http://127.0.0.1:4242`.
    pub async fn run(self) -> anyhow::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind mock artifact store")?;
        let addr = listener.local_addr()?;

        let state = Arc::new(StoreState {
            artifacts: self.artifacts,
            forced_status: self.forced_status,
            request_count: self.request_count,
        });
        let router = Router::new().fallback(serve_artifact).with_state(state);

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(format!("http://{}", addr))
    }
}

async fn serve_artifact(State(state): State<Arc<StoreState>>, uri: Uri) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);

    if let Some(code) = state.forced_status {
        return StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }

    let key = uri.path().trim_start_matches('/');
    match state.artifacts.get(key) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
