//! Documentation of a gymnastics class signup backend.
//!
//! # Endpoints
//! - `GET /classes`: the live and upcoming class catalogs, with every
//!   session's signee list collapsed to a count
//! - `GET /events`: upcoming events, soonest first
//! - `POST /class-signup`: register a child for a class session
//!
//! # Storage
//!
//! MongoDB holds two singleton catalog documents (collection `gymnastics`
//! for live signups, `upcoming` for classes not yet open) plus an `events`
//! collection. Catalogs are seeded out-of-band; the signup append is the
//! only write this service performs, and it goes through a conditional
//! update so concurrent signups cannot overfill a session. See
//! [`database`] for the guard details.
//!
//! # Environment
//!
//! - `GYM_PORT`: listening port, defaults to 4000
//! - `MONGO_URL`: connection string, defaults to `mongodb://localhost:27017`
//! - `GYM_DB`: database name, defaults to `gym`
//! - `RUST_LOG`: tracing filter
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod registration;
pub mod routes;
pub mod state;
pub mod utils;

use routes::{classes_handler, events_handler, signup_handler};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/classes", get(classes_handler))
        .route("/events", get(events_handler))
        .route("/class-signup", post(signup_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
