//! Feedback API Handlers
//!
//! Append-only: there is no update or delete path.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Feedback, FeedbackCreate};

use crate::core::ServerState;
use crate::db::repository::feedback;
use crate::utils::{AppError, AppResult, ErrorCode};

const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

/// POST /api/feedback
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FeedbackCreate>,
) -> AppResult<(StatusCode, Json<Feedback>)> {
    if !RATING_RANGE.contains(&payload.rating) {
        return Err(AppError::new(ErrorCode::FeedbackInvalidRating).with_detail("rating", payload.rating));
    }
    // 桌台不存在时返回 TableNotFound
    state.tables.get_table(payload.table_id).await?;

    let entry = feedback::create(&state.db.pool, payload).await?;
    tracing::info!(feedback_id = entry.id, table_id = entry.table_id, rating = entry.rating, "Feedback received");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/feedback - 最新在前
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Feedback>>> {
    Ok(Json(feedback::find_all(&state.db.pool).await?))
}

/// GET /api/feedback/table/{table_id}
pub async fn list_for_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Vec<Feedback>>> {
    state.tables.get_table(table_id).await?;
    Ok(Json(feedback::find_by_table(&state.db.pool, table_id).await?))
}
