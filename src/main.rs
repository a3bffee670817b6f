use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpServer, web};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod lifecycle;
mod model;
mod models;
mod routes;
mod seed;
mod state;
mod store;
mod utils;

use config::Config;
use db::init_store;
use state::AppState;

use crate::docs::ApiDoc;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

const WARMUP_BATCH_SIZE: usize = 100;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

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

    info!("Server starting...");

    let store = init_store(&config.database_url).await?;
    let server_addr = config.server_addr.clone();
    let seed = config.seed_demo_data;
    let state = AppState::new(config, store);

    if seed {
        seed::seed_demo_data(state.store.get_ref(), &state.registry)
            .await
            .context("Failed to seed demo data")?;
    }

    let warmup = state.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = warmup
            .registry
            .warmup(warmup.store.get_ref(), WARMUP_BATCH_SIZE)
            .await
        {
            error!(error = %e, "Failed to warm up email registry");
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .configure(|cfg| routes::configure(cfg, &state))
            .default_service(web::to(routes::not_found))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
