use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use legal_expert::config::{ConfigError, RateLimitConfig};
use legal_expert::respond::failure;
use tracing::{debug, warn};

/// Keys tracked before idle clients are swept out of the limiter.
const PRUNE_THRESHOLD: usize = 4096;

/// Request budget per client key: `max_requests` per `window`, refilled evenly.
#[derive(Clone)]
pub(crate) struct RequestLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl RequestLimiter {
    pub(crate) fn new(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        let period = config.window / config.max_requests.get();
        let quota = Quota::with_period(period)
            .ok_or(ConfigError::InvalidValue {
                name: "APP_RATE_LIMIT_WINDOW_SECS",
            })?
            .allow_burst(config.max_requests);

        Ok(Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        })
    }

    /// Spends one request from `key`'s budget; false once it is exhausted.
    pub(crate) fn admit(&self, key: &str) -> bool {
        if self.limiter.len() >= PRUNE_THRESHOLD {
            self.limiter.retain_recent();
            debug!(keys = self.limiter.len(), "rate limiter swept");
        }
        self.limiter.check_key(&key.to_string()).is_ok()
    }
}

pub(crate) async fn limit_requests(
    State(limiter): State<RequestLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    if limiter.admit(&key) {
        return next.run(request).await;
    }

    warn!(client = %key, path = %request.uri().path(), "request budget exhausted");
    failure(
        StatusCode::TOO_MANY_REQUESTS,
        "Too many requests from this IP, please try again later.",
    )
}

/// Last `X-Forwarded-For` entry, else the peer address.
///
/// The last entry is the one appended by the proxy in front of us; earlier
/// entries are client-supplied.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.rsplit(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
    {
        return forwarded.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use std::num::NonZeroU32;
    use std::time::Duration;
    use tower::ServiceExt;

    fn limiter(max_requests: u32, window: Duration) -> RequestLimiter {
        RequestLimiter::new(&RateLimitConfig {
            max_requests: NonZeroU32::new(max_requests).expect("non-zero budget"),
            window,
        })
        .expect("valid quota")
    }

    fn limited_app(limiter: RequestLimiter) -> Router {
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(limiter, limit_requests))
    }

    #[test]
    fn budget_is_per_key() {
        let limiter = limiter(2, Duration::from_secs(3600));

        assert!(limiter.admit("10.0.0.1"));
        assert!(limiter.admit("10.0.0.1"));
        assert!(!limiter.admit("10.0.0.1"));
        assert!(limiter.admit("10.0.0.2"));
    }

    #[test]
    fn default_budget_builds() {
        let limiter = limiter(300, Duration::from_secs(900));
        for _ in 0..300 {
            assert!(limiter.admit("203.0.113.1"));
        }
        assert!(!limiter.admit("203.0.113.1"));
    }

    #[test]
    fn zero_length_window_is_rejected() {
        let result = RequestLimiter::new(&RateLimitConfig {
            max_requests: NonZeroU32::new(5).expect("non-zero budget"),
            window: Duration::ZERO,
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "APP_RATE_LIMIT_WINDOW_SECS"
            })
        ));
    }

    #[test]
    fn client_key_uses_last_forwarded_entry() {
        let request = Request::builder()
            .uri("/health")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .expect("request builds");
        assert_eq!(client_key(&request), "10.0.0.1");

        let mut request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 4100))));
        assert_eq!(client_key(&request), "192.0.2.7");
    }

    #[tokio::test]
    async fn middleware_returns_too_many_requests_after_budget() {
        let app = limited_app(limiter(1, Duration::from_secs(900)));

        let request = || {
            Request::builder()
                .uri("/health")
                .header("x-forwarded-for", "198.51.100.4")
                .body(Body::empty())
                .expect("request builds")
        };

        let first = app.clone().oneshot(request()).await.expect("route executes");
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.expect("route executes");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            second.headers().get("content-type").map(|v| v.as_bytes()),
            Some(&b"application/json"[..])
        );
    }

    #[tokio::test]
    async fn rotating_leading_forwarded_entries_stays_limited() {
        let app = limited_app(limiter(1, Duration::from_secs(900)));

        let mut admitted = 0;
        for n in 0..50 {
            let request = Request::builder()
                .uri("/health")
                .header("x-forwarded-for", format!("10.9.{n}.1, 198.51.100.4"))
                .body(Body::empty())
                .expect("request builds");
            let response = app.clone().oneshot(request).await.expect("route executes");
            if response.status() == StatusCode::OK {
                admitted += 1;
            } else {
                assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
            }
        }
        assert_eq!(admitted, 1);
    }
}
