//! The JSON HTTP API served by `fintrack serve`.
//!
//! Routes map one to one onto the commands. Request bodies are read by [`body`], and errors are
//! turned into status codes and JSON bodies by [`error`].

mod body;
mod error;
mod handlers;

use crate::error::{ErrorType, IntoResult};
use crate::{Config, Mode, Result};
use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    config: Config,
    mode: Mode,
}

impl AppState {
    pub(crate) fn new(config: Config, mode: Mode) -> Self {
        Self { config, mode }
    }

    fn config(&self) -> Config {
        self.config.clone()
    }
}

pub(crate) fn router(state: AppState) -> Router {
    use handlers::*;
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/api/transactions/:id",
            get(show_transaction)
                .put(update_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/api/budgets", get(list_budgets).post(create_budget))
        .route(
            "/api/budgets/:id",
            get(show_budget)
                .put(update_budget)
                .patch(update_budget)
                .delete(delete_budget),
        )
        .route("/api/pots", get(list_pots).post(create_pot))
        .route(
            "/api/pots/:id",
            get(show_pot)
                .put(update_pot)
                .patch(update_pot)
                .delete(delete_pot),
        )
        .route("/api/pots/:id/deposit", post(deposit_to_pot))
        .route("/api/pots/:id/withdraw", post(withdraw_from_pot))
        .route("/api/recurring-bills", get(list_bills).post(create_bill))
        .route(
            "/api/recurring-bills/:id",
            get(show_bill)
                .put(update_bill)
                .patch(update_bill)
                .delete(delete_bill),
        )
        .route("/api/summary", get(summary))
        .route("/api/ai/ask", post(ask))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `bind` and serves the API until Ctrl-C.
pub(crate) async fn serve(config: Config, mode: Mode, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Unable to listen on {bind}"))
        .pub_result(ErrorType::Service)?;
    info!("Serving the fintrack API on http://{bind}");
    axum::serve(listener, router(AppState::new(config, mode)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("The HTTP server failed")
        .pub_result(ErrorType::Service)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            error!("Unable to listen for Ctrl-C, the server must be stopped another way: {e}");
            std::future::pending::<()>().await
        }
    }
}
