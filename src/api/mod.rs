//! HTTP transport for the on-call and incident surface.
//!
//! Mounts the REST routes behind an axum router. The transport performs
//! no business logic of its own: handlers delegate to the stores and map
//! `AppError` onto HTTP status codes at this edge.

pub mod handlers;

use std::net::SocketAddr;

use axum::routing::{get, post, put};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::persistence::incident_store::IncidentStore;
use crate::persistence::schedule_store::ScheduleStore;
use crate::persistence::user_store::UserStore;
use crate::{AppError, Result};

/// Shared state handed to every API handler.
#[derive(Clone)]
pub struct ApiState {
    /// User directory.
    pub users: UserStore,
    /// On-call windows.
    pub schedules: ScheduleStore,
    /// Incident records.
    pub incidents: IncidentStore,
}

/// Build the application router.
#[must_use]
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/users",
            post(handlers::register_user).get(handlers::list_users),
        )
        .route("/users/{id}", get(handlers::get_user))
        .route("/users/{id}/schedules", post(handlers::create_schedule))
        .route("/scheduled", get(handlers::scheduled_now))
        .route("/scheduled/{timestamp}", get(handlers::scheduled_at))
        .route(
            "/schedules",
            get(handlers::list_schedules).delete(handlers::delete_schedules_by_range),
        )
        .route(
            "/schedules/{id}",
            get(handlers::get_schedule).delete(handlers::delete_schedule),
        )
        .route(
            "/incidents",
            get(handlers::list_incidents).post(handlers::create_incident),
        )
        .route("/incidents/acknowledge_all", post(handlers::acknowledge_all))
        .route("/incidents/{id}/assign", put(handlers::assign_incident))
        .route(
            "/incidents/{id}/acknowledge",
            put(handlers::acknowledge_incident),
        )
        .with_state(state)
}

/// Serve the HTTP transport on `port` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the listener fails to bind and
/// `AppError::Unknown` if the server exits with an error.
pub async fn serve_http(state: ApiState, port: u16, ct: CancellationToken) -> Result<()> {
    let bind = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind http listener: {err}")))?;
    info!(%bind, "http transport listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Unknown(format!("http server failed: {err}")))
}
