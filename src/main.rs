use std::sync::Arc;

use actix_cors::Cors;
use anyhow::Context;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendbook::config::Config;
use lendbook::loans::controllers::{apply_for_loan, decide_loan, get_loan, get_schedule};
use lendbook::payments::controllers::{list_payments, submit_payment};
use lendbook::payments::services::{CollectionGateway, StubGateway};
use lendbook::sweep::controllers::run_sweep;
use lendbook::sweep::services::OverdueSweep;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lendbook=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    tracing::info!("Starting LendBook Loan Servicing Platform");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;

    tracing::info!(
        "Database pool initialized ({}-{} connections)",
        config.database.min_connections,
        config.database.max_connections
    );

    // Collection gateway boundary; real integration lives outside this service
    let gateway: Arc<dyn CollectionGateway> = Arc::new(StubGateway);

    // Background overdue sweep
    let sweep = Arc::new(OverdueSweep::new(db_pool.clone()));
    tokio::spawn(sweep.start(config.app.sweep_interval_secs));

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
            .service(
                web::scope("/loans")
                    .route("", web::post().to(apply_for_loan))
                    .route("/{loan_id}", web::get().to(get_loan))
                    .route("/{loan_id}/decision", web::post().to(decide_loan))
                    .route("/{loan_id}/schedule", web::get().to(get_schedule))
                    .route("/{loan_id}/payments", web::post().to(submit_payment))
                    .route("/{loan_id}/payments", web::get().to(list_payments)),
            )
            .route("/sweep", web::post().to(run_sweep))
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "lendbook"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "LendBook Loan Servicing Platform",
        "version": "0.1.0",
        "status": "running"
    }))
}
