use std::net::SocketAddr;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use folio_api::config::ApiConfig;
use folio_api::infra::mail::MailTransport;
use folio_api::router::build_router;
use folio_api::state::AppState;
use folio_api_migration::Migrator;
use folio_core::config::Config;
use folio_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env().expect("invalid configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to apply migrations");
        info!("database migrations applied");
    }

    let transport = MailTransport::from_config(&config).expect("failed to build mail transport");
    info!(transport = transport.name(), "mail transport selected");

    let addr = format!("0.0.0.0:{}", config.api_port);
    let router = build_router(AppState::new(db, config, transport));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
