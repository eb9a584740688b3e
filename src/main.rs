use std::str::FromStr;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

use attendance_tracker::config::Config;
use attendance_tracker::db::init_store;
use attendance_tracker::docs::ApiDoc;
use attendance_tracker::routes;

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "ok"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let level = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::DEBUG);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = init_store(config.database_url.as_deref())
        .await
        .context("failed to open the attendance store")?;
    if config.database_url.is_none() {
        warn!("DATABASE_URL not set, data lives in memory only");
    }
    info!(backend = store.backend_name(), "Store ready");

    let store = Data::new(store);
    let limiter = routes::build_limiter(config.rate_protected_per_min)?;
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        let config_data = config.clone();
        let limiter = limiter.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(move |cfg| routes::configure(cfg, &config_data, limiter))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
