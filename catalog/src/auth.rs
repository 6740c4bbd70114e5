//! Bearer-token authorization for mutating routes.
//!
//! Read routes are public. Mutating routers are wrapped with [`require_admin`], which
//! resolves the `Authorization: Bearer <token>` header to a [`Role`] through the
//! configured [`CredentialVerifier`]:
//!
//! ```rust,ignore
//! let admin = Router::new()
//!     .route("/categories", post(create_category))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Administrator,
}

/// Maps a bearer token to the caller's role. `None` means the token is unknown.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<Role>;
}

/// Fixed token table, configured at start-up.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Role>,
}

impl StaticTokenVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, role: Role) -> Self {
        self.tokens.insert(token.into(), role);
        self
    }
}

impl CredentialVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<Role> {
        self.tokens.get(token).copied()
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware admitting administrators only.
///
/// # Errors
///
/// [`ApiError::Unauthorized`] for a missing or unknown token, [`ApiError::Forbidden`]
/// when the token belongs to a non-administrator.
pub async fn require_admin(
    State(verifier): State<Arc<dyn CredentialVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        bearer_token(&request).ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
    let role = verifier
        .verify(token)
        .ok_or_else(|| ApiError::unauthorized("Invalid bearer token"))?;

    if role != Role::Administrator {
        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            "Rejected non-administrator"
        );
        return Err(ApiError::forbidden("Administrator role required"));
    }

    request.extensions_mut().insert(role);
    Ok(next.run(request).await)
}
