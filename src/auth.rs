//! Bearer-token identity verification.
//!
//! The backend never issues credentials itself; an external identity
//! provider hands players an HS256 token whose subject is their stable user
//! id. This module verifies tokens and exposes axum extractors for
//! handlers that require (or optionally use) a caller identity.

use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;

use crate::{error::AppError, state::SharedState};

/// Claims expected inside a player token.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerClaims {
    /// Stable user identifier.
    pub sub: String,
    /// Expiry, seconds since epoch.
    pub exp: usize,
}

/// Token verification configuration.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
}

impl TokenConfig {
    /// Build from the `JWT_SECRET` environment variable.
    pub fn from_env() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_owned()),
        }
    }

    /// Decode and validate a bearer token, returning the stable user id.
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        decode::<PlayerClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims.sub)
        .map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            AppError::Unauthorized("invalid bearer token".into())
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Extractor for endpoints that require an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;
        let user = state.tokens().verify(&token)?;
        Ok(AuthUser(user))
    }
}

/// Extractor for endpoints that degrade gracefully without identity: an
/// invalid or missing token yields `None` rather than a rejection.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<String>);

impl FromRequestParts<SharedState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(parts).and_then(|token| state.tokens().verify(&token).ok());
        Ok(OptionalUser(user))
    }
}
