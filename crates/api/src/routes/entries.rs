//! Entry routes: class entry listing and check-in status updates.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use domain::models::{Entry, UpdateCheckinRequest};
use persistence::repositories::{EntryRepository, TrialClassRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Response for a class entry listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EntryListResponse {
    pub class_id: Uuid,
    pub entries: Vec<Entry>,
}

/// GET /api/v1/classes/:class_id/entries
pub async fn list_entries(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let classes = TrialClassRepository::new(state.pool.clone());
    if classes.find_by_id(class_id).await?.is_none() {
        return Err(ApiError::NotFound("Class not found".to_string()));
    }

    let entries = EntryRepository::new(state.pool.clone())
        .list_by_class(class_id)
        .await?
        .into_iter()
        .map(Entry::from)
        .collect();

    Ok(Json(EntryListResponse { class_id, entries }))
}

/// PUT /api/v1/entries/:entry_id/checkin
///
/// Plain status assignment; the check-in flow has no transition guards.
pub async fn update_checkin(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(request): Json<UpdateCheckinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = EntryRepository::new(state.pool.clone());
    let entry = repo
        .set_checkin_status(entry_id, request.status.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Entry not found".to_string()))?;

    info!(
        entry_id = %entry_id,
        status = %request.status,
        "Updated entry check-in status"
    );

    Ok(Json(Entry::from(entry)))
}
