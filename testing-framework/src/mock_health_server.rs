use anyhow::Context;
use axum::{extract::State, http::StatusCode, http::Uri, Router};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::net::TcpListener;

/// Long enough that no probe under test would ever see the response.
const HANG_DURATION: Duration = Duration::from_secs(3600);

/// How the mock target answers a health request.
#[derive(Clone, Copy, Debug)]
pub enum HealthBehavior {
    /// Answer immediately with this status code.
    Respond(u16),
    /// Accept the connection and never answer.
    Hang,
    /// Answer with the status code after the delay.
    Delay(Duration, u16),
}

struct ServerState {
    behavior: HealthBehavior,
    request_count: Arc<AtomicU64>,
    requested_paths: Arc<Mutex<Vec<String>>>,
}

/// An HTTP server standing in for the served application's health endpoint.
/// Every path is routed to the same behavior.
pub struct MockHealthServer {
    behavior: HealthBehavior,
    request_count: Arc<AtomicU64>,
    requested_paths: Arc<Mutex<Vec<String>>>,
}

impl MockHealthServer {
    pub fn new(behavior: HealthBehavior, request_count: Arc<AtomicU64>) -> Self {
        Self {
            behavior,
            request_count,
            requested_paths: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Paths of all requests received so far, with their leading slash.
    pub fn requested_paths(&self) -> Arc<Mutex<Vec<String>>> {
        self.requested_paths.clone()
    }

    /// Binds an ephemeral loopback port, serves in the background and returns the port.
    pub async fn run(self) -> anyhow::Result<u16> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind mock health server")?;
        let port = listener.local_addr()?.port();

        let state = Arc::new(ServerState {
            behavior: self.behavior,
            request_count: self.request_count,
            requested_paths: self.requested_paths,
        });
        let router = Router::new().fallback(handle_health).with_state(state);

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(port)
    }
}

async fn handle_health(State(state): State<Arc<ServerState>>, uri: Uri) -> StatusCode {
    state.request_count.fetch_add(1, Ordering::SeqCst);
    state
        .requested_paths
        .lock()
        .unwrap()
        .push(uri.path().to_string());

    let code = match state.behavior {
        HealthBehavior::Respond(code) => code,
        HealthBehavior::Hang => {
            tokio::time::sleep(HANG_DURATION).await;
            200
        },
        HealthBehavior::Delay(delay, code) => {
            tokio::time::sleep(delay).await;
            code
        },
    };
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Returns a loopback port nothing is listening on, so connecting to it is refused.
pub async fn unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}
