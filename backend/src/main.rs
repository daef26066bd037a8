//! Backend entry-point: loads settings, prepares persistence, and serves
//! the REST, WebSocket, and OpenAPI endpoints.

mod server;

use std::ffi::OsString;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, MlSettings, ServerConfig, create_server};
use vitalwatch::inbound::http::health::HealthState;
use vitalwatch::outbound::persistence::{DbPool, PoolConfig};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Settings are layered from defaults, config files, and the environment;
/// the process takes no command-line flags of its own.
fn settings_args() -> impl Iterator<Item = OsString> {
    std::env::args_os().take(1)
}

fn run_migrations(database_url: &str) -> Result<()> {
    let mut conn = PgConnection::establish(database_url).wrap_err("connect for migrations")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| eyre!("run migrations: {err}"))?;
    info!(count = applied.len(), "database migrations applied");
    Ok(())
}

async fn connect_database(database_url: String) -> Result<DbPool> {
    let url = database_url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&url))
        .await
        .wrap_err("migration task panicked")??;
    DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("create database pool")
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app = AppSettings::load_from_iter(settings_args())
        .map_err(|err| eyre!("load APP settings: {err}"))?;
    let ml = MlSettings::load_from_iter(settings_args())
        .map_err(|err| eyre!("load ML settings: {err}"))?;
    info!(
        ml_host = ml.host(),
        ml_port = ml.port(),
        allow_fallback = ml.allow_fallback,
        "ML service configured"
    );

    let mut config = ServerConfig::from_settings(&app, ml).wrap_err("resolve settings")?;
    if let Some(url) = app.database_url() {
        config = config.with_db_pool(connect_database(url.to_owned()).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("start HTTP server")?;
    server.await.wrap_err("HTTP server failed")
}
