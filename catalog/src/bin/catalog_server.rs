use pharmacy_catalog::{AppState, Config, Migrator, Role, StaticTokenVerifier, router};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied");

    let mut verifier = StaticTokenVerifier::new();
    match &config.admin_token {
        Some(token) => verifier = verifier.with_token(token.clone(), Role::Administrator),
        None => {
            tracing::warn!("CATALOG_ADMIN_TOKEN not set, every mutating request will be rejected");
        }
    }

    let app = router(AppState::new(db, verifier))
        .layer(config.cors_layer()?)
        .layer(TraceLayer::new_for_http());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Catalog API listening, docs at /docs");
    axum::serve(listener, app).await?;
    Ok(())
}
