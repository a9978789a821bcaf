mod config;
mod db_types;
mod error;
mod extractor;
mod handlers;
mod json_text;
mod normalizer;
mod openai_types;
mod pipeline;
mod provider;
mod store;
mod types;
mod vapi_types;

use crate::config::{Config, StoreConfig};
use crate::extractor::Extractor;
use crate::pipeline::CallPipeline;
use crate::provider::ChatCompletionsProvider;
use crate::store::{CallStore, PgCallStore, SupabaseStore};
use crate::types::AppState;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::prelude::*;

pub mod consts {
    /// Placeholder for any text field the transcript doesn't yield.
    pub const UNKNOWN: &str = "Unknown";
    pub const DEFAULT_QUANTITY: i64 = 1;
    /// Only this many trailing characters of a transcript are sent for extraction.
    pub const TRANSCRIPT_WINDOW_CHARS: usize = 3_000;
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/vapi-webhook", post(handlers::vapi_webhook))
        .route("/", get(handlers::root))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("tower_http", tracing_subscriber::filter::LevelFilter::DEBUG),
            ("vapi_rs", config.log_level),
        ]));
    tracing::subscriber::set_global_default(subscriber)?;

    let provider = ChatCompletionsProvider::new(config.provider.clone())?;
    let store: Arc<dyn CallStore> = match &config.store {
        StoreConfig::Postgres { database_url } => {
            Arc::new(PgCallStore::connect(database_url).await?)
        }
        StoreConfig::Supabase {
            url,
            service_role_key,
        } => Arc::new(SupabaseStore::new(
            reqwest::Client::new(),
            url,
            service_role_key.clone(),
        )),
    };
    let pipeline = CallPipeline::new(Extractor::new(Arc::new(provider)), store);
    let app_state = Arc::new(AppState { pipeline });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, model=%config.provider.model, "server listening");
    axum::Server::bind(&addr)
        .serve(router(app_state).into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
