use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use crate::auth::CredentialVerifier;

/// Shared router state. Handlers extract the connection with `State<DatabaseConnection>`
/// and the middleware extracts the verifier.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, verifier: impl CredentialVerifier + 'static) -> Self {
        Self {
            db,
            verifier: Arc::new(verifier),
        }
    }
}
