//! HTTP boundary for the AMA platform.
//!
//! Every route maps 1:1 onto an [`ama::Ama`] operation. Tokens travel in the
//! path or the JSON body; the voter id comes from proxy headers.
//!
//! | Route | Operation |
//! |-------|-----------|
//! | `POST /api/ama` | create a session |
//! | `GET /api/ama/:token` | view a session through a token |
//! | `PUT /api/ama/:token` | publish or edit the draft |
//! | `GET /api/ama/:token/questions` | list visible questions |
//! | `POST /api/questions` | ask |
//! | `PUT /api/questions/:id/hide` | hide or show |
//! | `GET /api/questions/:id/votes` | has the caller voted |
//! | `POST /api/votes` | vote |
//! | `POST /api/answers` | answer |

use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post, put},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use ama::store::Store;
use ama::{Ama, AmaConfig};

pub mod client_ip;
pub mod config;
pub mod error;
pub mod routes;

pub use config::{DatabaseLocation, ServerConfig};
pub use error::{ApiError, ConfigError};

/// Build the application router over `ama`.
pub fn router<S: Store + 'static>(ama: Ama<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/ama", post(routes::create_session::<S>))
        .route(
            "/api/ama/:token",
            get(routes::view_session::<S>).put(routes::modify_session::<S>),
        )
        .route("/api/ama/:token/questions", get(routes::list_questions::<S>))
        .route("/api/questions", post(routes::create_question::<S>))
        .route("/api/questions/:id/hide", put(routes::set_visibility::<S>))
        .route("/api/questions/:id/votes", get(routes::vote_status::<S>))
        .route("/api/votes", post(routes::cast_vote::<S>))
        .route("/api/answers", post(routes::submit_answer::<S>))
        .fallback(routes::fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(ama)
}

/// Open the database, bind, and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!(database = ?config.database, "Opening store...");
    let store = config
        .database
        .open()
        .with_context(|| format!("opening database {:?}", config.database))?;

    let app = router(Ama::new(store, AmaConfig::default()));

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("binding to {}", config.bind_address))?;
    info!("Server running on {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving requests")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
