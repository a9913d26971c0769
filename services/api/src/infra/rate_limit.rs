use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Extensions, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;

/// Windows kept before expired ones are swept.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by an arbitrary string.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        if windows.len() > SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.max_requests {
            let remaining = self.window.saturating_sub(now.duration_since(entry.started));
            // Round up so clients never retry a fraction of a second too early.
            let retry_after = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            return RateLimitDecision::Limited {
                retry_after: retry_after.max(1),
            };
        }
        entry.count += 1;
        RateLimitDecision::Allowed
    }
}

/// Best-effort client address: first `x-forwarded-for` hop, then `x-real-ip`,
/// then the socket peer.
///
/// Both headers are taken at face value. Deploy behind a reverse proxy that
/// overwrites them, otherwise a caller can rotate `x-forwarded-for` to get a
/// fresh rate-limit window on every request.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_owned());
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return Some(ip.to_owned());
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
}

/// Middleware: one window per (client address, path).
pub async fn rate_limit(
    State(limiter): State<FixedWindowLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(request.headers(), request.extensions())
        .unwrap_or_else(|| "unknown".to_owned());
    let key = format!("{ip}:{}", request.uri().path());

    match limiter.check(&key) {
        RateLimitDecision::Allowed => Ok(next.run(request).await),
        RateLimitDecision::Limited { retry_after } => {
            tracing::warn!(
                ip = %ip,
                path = %request.uri().path(),
                retry_after,
                "request blocked by rate limiter"
            );
            Err(ApiError::RateLimited { retry_after })
        }
    }
}
