//! Fixed-window request limiter keyed on the client address.
//!
//! The gate runs as middleware before any routing work. Requests with no
//! derivable peer address all land in the `""` bucket and share its fate.

use crate::errors::AppError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

/// Counter state for one client key.
struct Window {
    started: Instant,
    hits: u32,
}

/// Per-client fixed-window limiter. A quota of 0 disables the gate.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Record one request for `key` and return whether it is allowed.
    pub async fn check(&self, key: &str) -> bool {
        if self.max_requests == 0 {
            return true;
        }
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.hits = 0;
        }
        entry.hits += 1;
        entry.hits <= self.max_requests
    }
}

/// Middleware: gate every request on the peer address before handlers run.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_default();
    if !limiter.check(&key).await {
        return Err(AppError::too_many_requests("Too many requests"));
    }
    Ok(next.run(request).await)
}
