//! Fixed-window rate limiting keyed on the peer IP.
//!
//! Counts requests per source address in fixed windows. When the count
//! exceeds the limit the request is answered with `429` in the standard
//! error envelope before reaching any handler. State lives in-process; a
//! multi-replica deployment needs a shared store in front instead.

use std::collections::HashMap;
use std::net::IpAddr;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::domain::Error;

/// Rate limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window per peer.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Default)]
struct Counters {
    windows: HashMap<IpAddr, Window>,
}

impl Counters {
    /// Count one request; returns whether it is within the limit.
    fn admit(&mut self, peer: IpAddr, config: &RateLimitConfig, now: Instant) -> bool {
        // Drop stale windows opportunistically so the map does not grow
        // with one entry per address ever seen.
        if self.windows.len() > 4096 {
            self.windows
                .retain(|_, window| now.duration_since(window.started) < config.window);
        }

        let window = self.windows.entry(peer).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= config.window {
            window.started = now;
            window.count = 0;
        }
        window.count += 1;
        window.count <= config.max_requests
    }
}

/// Per-IP fixed-window rate limiting middleware.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::middleware::rate_limit::{RateLimit, RateLimitConfig};
///
/// let app = App::new().wrap(RateLimit::new(RateLimitConfig::default()));
/// ```
#[derive(Clone)]
pub struct RateLimit {
    config: RateLimitConfig,
    counters: Arc<Mutex<Counters>>,
}

impl RateLimit {
    /// Build a limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: Arc::new(Mutex::new(Counters::default())),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            config: self.config,
            counters: Arc::clone(&self.counters),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    config: RateLimitConfig,
    counters: Arc<Mutex<Counters>>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let admitted = match req.peer_addr() {
            Some(addr) => self
                .counters
                .lock()
                .map(|mut counters| counters.admit(addr.ip(), &self.config, Instant::now()))
                .unwrap_or(true),
            // No peer address means an in-process test client; let it through.
            None => true,
        };

        if admitted {
            let fut = self.service.call(req);
            Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
        } else {
            Box::pin(async move {
                let response = Error::rate_limited("too many requests, slow down")
                    .error_response()
                    .map_into_right_body();
                Ok(req.into_response(response))
            })
        }
    }
}
