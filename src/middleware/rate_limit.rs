//! Per-client-IP request quota (default 100 requests per 15 minutes), 429 when exhausted.
//!
//! The peer address comes from `ConnectInfo`; without it (tests, unusual transports) every
//! request shares one bucket.
//!
//! Buckets of addresses whose quota has fully refilled are dropped once per window, so
//! the table tracks recent clients only.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::{Arc, Weak};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::config::Config;
use crate::error::AppError;

pub struct IpRateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl IpRateLimiter {
    /// `max_requests` per `window`, all available as an initial burst.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check(&self, ip: IpAddr) -> Result<(), AppError> {
        self.limiter
            .check_key(&ip)
            .map_err(|_| AppError::TooManyRequests)
    }

    /// Forgets addresses that are back at full quota.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Addresses currently tracked.
    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }
}

pub fn apply(router: Router, config: &Config) -> Router {
    let limiter = Arc::new(IpRateLimiter::new(
        config.rate_limit_max_requests,
        config.rate_limit_window,
    ));
    spawn_cleanup(Arc::downgrade(&limiter), config.rate_limit_window);
    router.layer(middleware::from_fn_with_state(limiter, rate_limit))
}

/// Runs until the limiter (and so the router holding it) is dropped.
fn spawn_cleanup(limiter: Weak<IpRateLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(limiter) = limiter.upgrade() else {
                break;
            };
            let before = limiter.len();
            limiter.retain_recent();
            tracing::debug!(before, after = limiter.len(), "rate limit buckets trimmed");
        }
    });
}

async fn rate_limit(
    State(limiter): State<Arc<IpRateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if let Err(err) = limiter.check(ip) {
        tracing::warn!(%ip, "rate limit exceeded");
        return Err(err);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get};
    use tower::ServiceExt;

    const A: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const B: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn quota_is_per_ip() {
        let limiter = IpRateLimiter::new(2, Duration::from_secs(900));

        assert!(limiter.check(A).is_ok());
        assert!(limiter.check(A).is_ok());
        assert!(matches!(limiter.check(A), Err(AppError::TooManyRequests)));
        assert!(limiter.check(B).is_ok());
    }

    #[tokio::test]
    async fn refilled_buckets_are_forgotten() {
        let limiter = IpRateLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.check(A).is_ok());
        assert!(limiter.check(B).is_ok());
        assert_eq!(limiter.len(), 2);

        // still limited: nothing to forget yet
        limiter.retain_recent();
        assert_eq!(limiter.len(), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        limiter.retain_recent();

        assert!(limiter.is_empty());
        assert!(limiter.check(A).is_ok());
    }

    #[tokio::test]
    async fn cleanup_task_trims_and_stops_with_the_limiter() {
        let limiter = Arc::new(IpRateLimiter::new(1, Duration::from_millis(20)));
        assert!(limiter.check(A).is_ok());
        let weak = Arc::downgrade(&limiter);
        spawn_cleanup(weak.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(limiter.is_empty());

        drop(limiter);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn exhausted_quota_answers_429() {
        let limiter = Arc::new(IpRateLimiter::new(1, Duration::from_secs(900)));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(limiter, rate_limit));

        let first = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let second = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
