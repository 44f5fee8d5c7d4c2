//! Request handlers and the mapping from `AppError` onto HTTP statuses.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::incident::Incident;
use crate::models::schedule::{Schedule, TimeRange};
use crate::models::user::User;
use crate::AppError;

use super::ApiState;

/// JSON body returned by every failing handler.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Transport-edge wrapper mapping [`AppError`] onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) | AppError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Request body for registering a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegisterUserParams {
    /// Given name; must be non-empty.
    pub first_name: String,
    /// Family name; must be non-empty.
    pub last_name: String,
    /// Slack handle; must be non-empty.
    pub slack_handle: String,
}

/// Request body for creating an incident.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateIncidentParams {
    /// Free-text description of the problem.
    pub body: String,
}

/// Request body for assigning an incident.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssignParams {
    /// The new assignee's user id.
    pub user_id: i64,
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Register a user in the directory.
pub async fn register_user(
    State(state): State<ApiState>,
    Json(params): Json<RegisterUserParams>,
) -> ApiResult<User> {
    let user = state
        .users
        .register(&params.first_name, &params.last_name, &params.slack_handle)
        .await?;
    Ok(Json(user))
}

/// Resolve a single user by id.
pub async fn get_user(State(state): State<ApiState>, Path(id): Path<i64>) -> ApiResult<User> {
    Ok(Json(state.users.get_by_id(id).await?))
}

/// List every registered user.
pub async fn list_users(State(state): State<ApiState>) -> ApiResult<Vec<User>> {
    Ok(Json(state.users.list_all().await?))
}

/// Create a coverage window for the user in the path.
pub async fn create_schedule(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(time): Json<TimeRange>,
) -> ApiResult<Schedule> {
    Ok(Json(state.schedules.create(id, time).await?))
}

/// Who is on call right now; 404 when nobody is.
pub async fn scheduled_now(State(state): State<ApiState>) -> ApiResult<Schedule> {
    let schedule = state
        .schedules
        .scheduled_now()
        .await?
        .ok_or_else(|| ApiError::from(AppError::NotFound("no schedule found".into())))?;
    Ok(Json(schedule))
}

/// Who is on call at the instant in the path.
///
/// The timestamp must parse as an RFC 3339 date-time string.
pub async fn scheduled_at(
    State(state): State<ApiState>,
    Path(timestamp): Path<String>,
) -> ApiResult<Schedule> {
    let instant = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|_| {
            ApiError::from(AppError::InvalidArgument(
                "timestamp is not in a valid format".into(),
            ))
        })?
        .with_timezone(&Utc);

    let schedule = state
        .schedules
        .scheduled_at(instant)
        .await?
        .ok_or_else(|| ApiError::from(AppError::NotFound("no schedule found".into())))?;
    Ok(Json(schedule))
}

/// Point lookup of one schedule.
pub async fn get_schedule(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Schedule> {
    Ok(Json(state.schedules.get_by_id(id).await?))
}

/// Schedules strictly contained in the query range.
pub async fn list_schedules(
    State(state): State<ApiState>,
    Query(range): Query<TimeRange>,
) -> ApiResult<Vec<Schedule>> {
    Ok(Json(state.schedules.list_by_range(range).await?))
}

/// Delete one window, returning the deleted record.
pub async fn delete_schedule(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Schedule> {
    Ok(Json(state.schedules.delete_by_id(id).await?))
}

/// Bulk delete by range, returning the listed windows.
pub async fn delete_schedules_by_range(
    State(state): State<ApiState>,
    Query(range): Query<TimeRange>,
) -> ApiResult<Vec<Schedule>> {
    Ok(Json(state.schedules.delete_by_range(range).await?))
}

/// Every open incident.
pub async fn list_incidents(State(state): State<ApiState>) -> ApiResult<Vec<Incident>> {
    Ok(Json(state.incidents.list_open().await?))
}

/// Create an incident, auto-assigned to whoever is on call.
pub async fn create_incident(
    State(state): State<ApiState>,
    Json(params): Json<CreateIncidentParams>,
) -> ApiResult<Incident> {
    Ok(Json(state.incidents.create(&params.body).await?))
}

/// Set the assignee on an open incident.
pub async fn assign_incident(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(params): Json<AssignParams>,
) -> ApiResult<Incident> {
    Ok(Json(state.incidents.assign(id, params.user_id).await?))
}

/// Acknowledge an open incident.
pub async fn acknowledge_incident(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Incident> {
    Ok(Json(state.incidents.acknowledge(id).await?))
}

/// Acknowledge every open incident, returning the first affected row.
pub async fn acknowledge_all(State(state): State<ApiState>) -> ApiResult<Incident> {
    Ok(Json(state.incidents.acknowledge_all().await?))
}
