//! Backend of a university-course discovery platform.
//!
//! # General Infrastructure
//! - Reference data (subjects, streams, valid combinations, courses) lives in
//!   SQLite and is seeded on startup
//! - Combination rules are loaded once into an in-memory index held in shared
//!   state, so classification never touches the database per request
//! - Every endpoint answers with the `{ success, data?, error?, details? }`
//!   envelope
//! - Requests are independent and stateless; there is no cross-request
//!   coordination anywhere
//!
//! # Endpoints
//! - `POST /api/streams/classify`: body `{ subjectIds: [a, b, c] }`
//! - `GET /api/streams/validate/{a}/{b}/{c}`: path-parameter variant
//! - `GET /api/streams`, `GET /api/subjects`: reference listings
//! - `GET /api/streams/{id}/courses`: eligible courses per stream
//! - `POST /api/saved-courses`, `DELETE /api/saved-courses/{user}/{course}`,
//!   `GET /api/saved-courses/{user}`: bookmark toggling

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post},
    Router,
};
use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod classifier;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

use config::Config;
use routes::{
    classify_handler, remove_saved_course_handler, save_course_handler, saved_courses_handler,
    stream_courses_handler, streams_handler, subjects_handler, validate_handler,
};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/streams/classify", post(classify_handler))
        .route(
            "/api/streams/validate/{subject_id1}/{subject_id2}/{subject_id3}",
            get(validate_handler),
        )
        .route("/api/streams", get(streams_handler))
        .route("/api/streams/{stream_id}/courses", get(stream_courses_handler))
        .route("/api/subjects", get(subjects_handler))
        .route("/api/saved-courses", post(save_course_handler))
        .route(
            "/api/saved-courses/{user_ref}/{course_id}",
            delete(remove_saved_course_handler),
        )
        .route("/api/saved-courses/{user_ref}", get(saved_courses_handler))
        .with_state(state)
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let router = app(state.clone()).layer(cors);

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("Server shutting down...");

    Ok(())
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
