//! Per-identity rate limiting backed by a keyed governor limiter.
//!
//! The limiter is an injected service held in [`crate::state::AppState`],
//! not a process global. Keys are `"{scope}:{identity}"` where identity is
//! the authenticated user id when present, otherwise the client IP taken
//! from proxy headers or the socket address.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;

use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as KeyedLimiter};

use cartwheel_core::UserId;

use crate::error::AppError;
use crate::middleware::auth::OptionalAuth;
use crate::models::user::CurrentUser;
use crate::state::AppState;

/// Scope label for the product search endpoint.
pub const SEARCH_SCOPE: &str = "search";

/// The identity a request budget is charged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIdentity {
    /// Authenticated user.
    User(UserId),
    /// Anonymous caller, keyed by network address.
    Ip(IpAddr),
    /// Anonymous caller with no resolvable address.
    Anonymous,
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Ip(ip) => write!(f, "ip:{ip}"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// Resolve the identity for a request.
///
/// Authenticated user id wins; otherwise the client IP from
/// `x-forwarded-for` (first hop) or `x-real-ip`, then the connection's
/// socket address when the server tracks it.
#[must_use]
pub fn client_identity(user: Option<&CurrentUser>, parts: &Parts) -> ClientIdentity {
    if let Some(user) = user {
        return ClientIdentity::User(user.id);
    }

    if let Some(ip) = ip_from_headers(&parts.headers) {
        return ClientIdentity::Ip(ip);
    }

    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return ClientIdentity::Ip(addr.ip());
    }

    ClientIdentity::Anonymous
}

impl<S> FromRequestParts<S> for ClientIdentity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(user) = OptionalAuth::from_request_parts(parts, state).await?;
        Ok(client_identity(user.as_ref(), parts))
    }
}

/// Extract the real client IP from standard proxy headers.
fn ip_from_headers(headers: &HeaderMap) -> Option<IpAddr> {
    // X-Forwarded-For (first IP in the chain)
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return Some(ip);
    }

    // X-Real-IP
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Keyed request rate limiter.
///
/// Counters live in a concurrent keyed state store and expire as the quota
/// replenishes; checks never block or queue.
pub struct RateLimiter {
    limiter: KeyedLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>,
}

impl RateLimiter {
    /// Create a limiter allowing `per_minute` requests per identity per minute.
    #[must_use]
    pub fn new(per_minute: NonZeroU32) -> Self {
        Self {
            limiter: KeyedLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }

    /// Charge one request against `(scope, identity)`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::RateLimited` when the identity's budget for the
    /// scope is exhausted.
    pub fn check(&self, scope: &str, identity: &ClientIdentity) -> Result<(), AppError> {
        let key = format!("{scope}:{identity}");
        self.limiter.check_key(&key).map_err(|_| {
            tracing::debug!(%identity, scope, "rate limit exceeded");
            AppError::RateLimited
        })
    }
}
