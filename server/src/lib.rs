pub mod config;
pub mod error;
pub mod game;
pub mod hub;
pub mod net;
pub mod rooms;


use crate::game::RandomDice;
use crate::hub::Hub;
use crate::net::{ws_handler, AppState};
use crate::rooms::RoomStore;
use axum::{routing::get, Router};
use std::sync::Arc;

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn app() -> Router {
    let state = AppState {
        store: Arc::new(RoomStore::new(Box::new(RandomDice))),
        hub: Arc::new(Hub::new()),
    };
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Serves the websocket endpoint on an already bound listener.
pub async fn run(listener: tokio::net::TcpListener) -> std::io::Result<()> {
    let address = listener.local_addr()?;
    tracing::info!(%address, "listening");

    axum::serve(listener, app()).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}
