//! The authentication seam. Token issuance and validation are external
//! collaborators; the engine only ever consumes a resolved [`UserId`].

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::AppState;
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use clipvault_core::UserId;
use std::collections::HashMap;

/// Resolves a bearer credential to an owner id. Implementations are
/// expected to be cheap per call; anything expensive should cache.
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Option<UserId>;
}

/// Development verifier over the static token table in the config file.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenVerifier {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            tokens: config
                .tokens
                .iter()
                .map(|(token, seed)| (token.clone(), UserId(seed.id)))
                .collect(),
        }
    }
}

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).copied()
    }
}

/// Middleware: resolve `Authorization: Bearer <token>` and stash the owner
/// id in request extensions for handlers to consume.
pub async fn require_owner(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let owner = match token {
        Some(token) => state.verifier.verify(token).await,
        None => None,
    };

    match owner {
        Some(owner) => {
            request.extensions_mut().insert(owner);
            next.run(request).await
        }
        None => ApiError::unauthorized().into_response(),
    }
}
