//! `api` crate — the REST surface onto the pure `engine`/`registration`
//! core and the `db` persistence layer.
//!
//! Exposes:
//!   GET    /api/v1/workflows
//!   POST   /api/v1/workflows                    (validate, then persist)
//!   GET    /api/v1/workflows/:id
//!   DELETE /api/v1/workflows/:id
//!   POST   /api/v1/workflows/:id/execute         (schedule + execute + persist)
//!   POST   /api/v1/registrations/:node_id/events (drive the FSM one event at a time)
//!
//! No wire protocol of its own lives in `engine`/`registration` — this
//! crate is the value-level-to-JSON adapter around them (§6 External
//! Interfaces). The transport this spec treats as external (an event
//! bus, Kafka topics) is not implemented here either; this is a
//! synchronous request/response surface only.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use db::DbPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

pub async fn serve(bind: &str, pool: DbPool) -> Result<(), std::io::Error> {
    let state = AppState { pool };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .route("/workflows", get(handlers::workflows::list).post(handlers::workflows::create))
        .route("/workflows/:id", get(handlers::workflows::get).delete(handlers::workflows::delete))
        .route("/workflows/:id/execute", post(handlers::executions::execute))
        .route("/registrations/:node_id/events", post(handlers::registrations::submit_event));

    let app = Router::new()
        .nest("/api/v1", api_router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}
