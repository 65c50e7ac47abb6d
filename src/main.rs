use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use booking_autofill::config::AppConfig;
use booking_autofill::handlers;
use booking_autofill::services::page;
use booking_autofill::services::panel::PanelSession;
use booking_autofill::services::resolver::FieldResolver;
use booking_autofill::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let resolver_config = config.resolver_config()?;
    tracing::info!(
        "resolver mode {:?}, settle {}ms/{}ms",
        resolver_config.mode,
        config.date_picker_settle_ms,
        config.dropdown_settle_ms
    );
    let initial_page = config.initial_page()?;
    if let Some(path) = &config.form_page_path {
        tracing::info!("loading booking page from {}", path.display());
    }

    let (page, _agent) = page::spawn(FieldResolver::new(resolver_config), initial_page);

    let state = Arc::new(AppState {
        panel: PanelSession::new(Arc::new(page.clone())),
        page,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/panel", get(handlers::panel::panel_page))
        .route("/api/extract", post(handlers::panel::extract))
        .route(
            "/api/record",
            get(handlers::panel::get_record).put(handlers::panel::put_record),
        )
        .route("/api/fill", post(handlers::panel::fill))
        .route(
            "/api/page",
            get(handlers::page::get_page).post(handlers::page::load_page),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
