use std::net::{Ipv4Addr, SocketAddr};

use perfpulse_server::{
    config::AppConfig,
    database::client::{Database, DbConfig},
    init,
    middleware::{
        error::{AppError, AppResult},
        mw_ctx,
    },
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env();

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await?;

    init::run_migrations(&db).await?;
    init::seed_reference_data(&db).await?;

    let ctx_state = mw_ctx::create_ctx_state(db, &config)?;

    if config.seed_demo_data {
        if let Err(err) = init::create_default_data_for_dev(&ctx_state).await {
            error!("->> demo data not created: {err}");
        }
    }

    let routes_all = init::main_router(&ctx_state, &config);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    info!("->> LISTENING on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Generic {
            description: e.to_string(),
        })?;

    axum::serve(listener, routes_all.into_make_service())
        .await
        .map_err(|e| AppError::Generic {
            description: e.to_string(),
        })?;

    Ok(())
}
