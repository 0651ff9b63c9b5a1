use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod ledger;
mod model;
mod models;
mod notifier;
mod payroll;
mod routes;
mod store;

use auth::revocation::RevokedTokens;
use config::{Config, StoreBackend};
use db::{ensure_schema, init_db};
use ledger::Ledger;
use notifier::Notifier;
use payroll::accrual::build_policy;
use store::{MemoryStore, MySqlStore, Store};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Shiftpay is running"
}

async fn build_store(config: &Config) -> anyhow::Result<Store> {
    match config.store_backend {
        StoreBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql store")?;
            let pool = init_db(url).await.context("Failed to connect to MySQL")?;
            ensure_schema(&pool)
                .await
                .context("Failed to create tables")?;
            Ok(Store::MySql(MySqlStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, data is lost on restart");
            Ok(Store::Memory(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(model = %config.accrual_model, "Server starting...");

    let store = build_store(&config).await?;
    let policy = build_policy(
        config.accrual_model,
        config.overtime_hourly_bonus,
        config.overtime_hours_per_shift,
    );
    let notifier = Notifier::from_config(&config);
    if !notifier.is_enabled() {
        info!("Telegram notifications disabled");
    }
    let ledger = Data::new(Ledger::new(
        store.clone(),
        policy,
        config.fullday_default_rate,
        notifier,
    ));
    let store = Data::new(store);
    let revoked = Data::new(RevokedTokens::new(config.refresh_token_ttl as u64));

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config.clone())
            .app_data(store.clone())
            .app_data(ledger.clone())
            .app_data(revoked.clone())
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {}", server_addr))?
    .run()
    .await?;

    Ok(())
}
