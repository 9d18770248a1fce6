use std::sync::Arc;

use unigate::api::{build_router, ApiState};
use unigate::auth::{AuthService, ProfileService, TokenIssuer};
use unigate::{config::AppConfig, errors::Error, observability, storage, Result};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("unigate failed to start: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = AppConfig::from_env()?;
    observability::init_tracing()?;

    tracing::info!(
        app_name = unigate::APP_NAME,
        version = unigate::VERSION,
        "Starting unigate service"
    );

    let pool = storage::create_pool(&config.database).await?;
    if config.database.auto_migrate {
        storage::run_migrations(&pool).await?;
    }
    storage::check_connection(&pool).await?;

    let token_issuer = Arc::new(TokenIssuer::from_config(&config.auth)?);
    let auth_service = AuthService::with_sqlx(pool.clone(), token_issuer.clone());
    let profile_service = ProfileService::with_sqlx(pool);

    let state = ApiState { auth_service, profile_service, token_issuer };
    let router = build_router(state, config.server.enable_cors);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| Error::internal(format!("Failed to bind {}: {}", address, e)))?;

    tracing::info!(address = %address, "unigate listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| Error::internal(format!("Server error: {}", e)))
}
