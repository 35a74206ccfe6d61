//! Bearer-token authentication for the `/api/v1` routes.
//!
//! Session tokens are HS256 JWTs. The subject may arrive as `sub`, `_id` or
//! `id`; the optional `role` claim defaults to `public`.

use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::Response;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::respond::failure;
use crate::workflows::{Role, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(alias = "_id", alias = "id")]
    sub: String,
    #[serde(default)]
    role: Role,
    #[serde(default)]
    iat: u64,
    exp: u64,
}

/// Signing keys shared with the extractor through an `Extension`.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Signs a session token for `user` that expires after `ttl`.
    pub fn issue(
        &self,
        user: &UserId,
        role: Role,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: user.0.clone(),
            role,
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(AuthenticatedUser {
            user: UserId(data.claims.sub),
            role: data.claims.role,
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// Account resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user: UserId,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(user: UserId, role: Role) -> Self {
        Self { user, role }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                failure(
                    StatusCode::UNAUTHORIZED,
                    "No token provided or invalid token format",
                )
            })?;

        let verifier = parts.extensions.get::<TokenVerifier>().ok_or_else(|| {
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "authentication is not configured",
            )
        })?;

        verifier.verify(token).map_err(|err| {
            debug!(error = %err, "session token rejected");
            failure(StatusCode::UNAUTHORIZED, "Invalid or expired token")
        })
    }
}
