use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use demand_common::{
    CardPatch, CreateBoardRequest, Identity, MoveRequest, NewCard, ReorderRequest, Role,
};
use tracing::error;

use super::audit::{AuditOutcome, AuditSink};
use super::db::DbHandle;
use super::projection::ColumnLabels;
use super::{directory, ordering, projection};
use crate::errors::{BoardError, BoardResult};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub labels: Arc<ColumnLabels>,
    pub audit: Arc<dyn AuditSink>,
}

pub type SharedState = Arc<AppState>;

// ── Identity extraction ───────────────────────────────────────────────

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const COMPANY_ID_HEADER: &str = "x-company-id";

/// The acting identity, as asserted by the trusted upstream in request headers.
#[derive(Debug, Clone)]
pub struct Actor(pub Identity);

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl Actor {
    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let user_id = header(headers, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", USER_ID_HEADER)))?
            .parse::<i64>()
            .map_err(|_| ApiError::Unauthorized(format!("Malformed {} header", USER_ID_HEADER)))?;
        let role = header(headers, USER_ROLE_HEADER)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", USER_ROLE_HEADER)))?
            .parse::<Role>()
            .map_err(ApiError::Unauthorized)?;
        let company_id = header(headers, COMPANY_ID_HEADER)
            .map(|v| {
                v.parse::<i64>().map_err(|_| {
                    ApiError::Unauthorized(format!("Malformed {} header", COMPANY_ID_HEADER))
                })
            })
            .transpose()?;
        Ok(Actor(Identity::new(user_id, role, company_id)))
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Actor::from_headers(&parts.headers)
    }
}

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        if err.is_storage() {
            error!(error = %err, "Storage failure");
            return ApiError::Internal("Internal storage error".into());
        }
        let message = err.to_string();
        match err {
            BoardError::Validation(_) => ApiError::BadRequest(message),
            BoardError::Forbidden(_) => ApiError::Forbidden(message),
            _ => ApiError::NotFound(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON request body whose rejections use the same `{"error": ..}` shape as
/// every other failure.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// Report the outcome to the audit sink, then surface the result.
fn audited<T>(
    state: &AppState,
    actor_id: i64,
    action: &str,
    result: BoardResult<T>,
) -> Result<T, ApiError> {
    state
        .audit
        .record(actor_id, action, AuditOutcome::of(&result));
    result.map_err(ApiError::from)
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/boards", get(list_boards).post(create_board))
        .route("/api/boards/{id}", get(get_board).delete(delete_board))
        .route("/api/cards", post(create_card))
        .route("/api/cards/{id}", patch(update_card).delete(delete_card))
        .route("/api/cards/{id}/move", post(move_card))
        .route("/api/columns/{id}/reorder", post(reorder_column))
        .route("/api/my-demands", get(my_demands))
        .route("/api/roster", get(roster))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_boards(
    State(state): State<SharedState>,
    Actor(identity): Actor,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| directory::list_boards(db, &actor))
        .await;
    let boards = audited(&state, identity.user_id, "list_boards", result)?;
    Ok(Json(boards))
}

async fn create_board(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    JsonBody(req): JsonBody<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| {
            directory::create_board(db, &actor, &req.name, req.description.as_deref())
        })
        .await;
    let board = audited(&state, identity.user_id, "create_board", result)?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn get_board(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    Path(board_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let labels = Arc::clone(&state.labels);
    let result = state
        .db
        .call(move |db| projection::project_board(db, &actor, board_id, &labels))
        .await;
    let view = audited(&state, identity.user_id, "project_board", result)?;
    Ok(Json(view))
}

async fn delete_board(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    Path(board_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| directory::delete_board(db, &actor, board_id))
        .await;
    audited(&state, identity.user_id, "delete_board", result)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_card(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    JsonBody(req): JsonBody<NewCard>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| ordering::create_card(db, &actor, req))
        .await;
    let card = audited(&state, identity.user_id, "create_card", result)?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn update_card(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    Path(card_id): Path<i64>,
    JsonBody(req): JsonBody<CardPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| ordering::update_card(db, &actor, card_id, req))
        .await;
    let card = audited(&state, identity.user_id, "update_card", result)?;
    Ok(Json(card))
}

async fn delete_card(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    Path(card_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| ordering::delete_card(db, &actor, card_id))
        .await;
    audited(&state, identity.user_id, "delete_card", result)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_card(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    Path(card_id): Path<i64>,
    JsonBody(req): JsonBody<MoveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| ordering::move_card(db, &actor, card_id, req.column_id, req.position))
        .await;
    audited(&state, identity.user_id, "move_card", result)?;
    Ok(Json(serde_json::json!({"success": true})))
}

async fn reorder_column(
    State(state): State<SharedState>,
    Actor(identity): Actor,
    Path(column_id): Path<i64>,
    JsonBody(req): JsonBody<ReorderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| ordering::reorder_column(db, &actor, column_id, &req.card_order))
        .await;
    audited(&state, identity.user_id, "reorder_column", result)?;
    Ok(Json(serde_json::json!({"success": true})))
}

async fn my_demands(
    State(state): State<SharedState>,
    Actor(identity): Actor,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let labels = Arc::clone(&state.labels);
    let result = state
        .db
        .call(move |db| projection::project_personal_view(db, &actor, &labels))
        .await;
    let boards = audited(&state, identity.user_id, "project_personal_view", result)?;
    Ok(Json(boards))
}

async fn roster(
    State(state): State<SharedState>,
    Actor(identity): Actor,
) -> Result<impl IntoResponse, ApiError> {
    let actor = identity.clone();
    let result = state
        .db
        .call(move |db| directory::list_roster(db, &actor))
        .await;
    let roster = audited(&state, identity.user_id, "list_roster", result)?;
    Ok(Json(roster))
}

// ── Tests ─────────────────────────────────────────────────────────────
