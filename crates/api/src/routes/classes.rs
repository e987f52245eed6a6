//! Class administration routes: manual results release and the self
//! check-in cascade.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use domain::models::{ReleaseResultsRequest, SetSelfCheckinRequest, Show, Trial, TrialClass};
use domain::services::resolve_self_checkin;
use persistence::repositories::{ShowRepository, TrialClassRepository, TrialRepository};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::record_results_released;

/// POST /api/v1/classes/:class_id/release
///
/// Records the release timestamp that makes `manual_release`-gated fields
/// visible.
pub async fn release_results(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(request): Json<ReleaseResultsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let repo = TrialClassRepository::new(state.pool.clone());
    let class = repo
        .release_results(class_id, &request.released_by)
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    record_results_released();
    info!(
        class_id = %class_id,
        released_by = %request.released_by,
        "Released class results"
    );

    Ok(Json(TrialClass::from(class)))
}

/// DELETE /api/v1/classes/:class_id/release
///
/// Clears a manual release, hiding `manual_release`-gated fields again.
pub async fn clear_release(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TrialClassRepository::new(state.pool.clone());
    let class = repo
        .clear_release(class_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    info!(class_id = %class_id, "Cleared class results release");

    Ok(Json(TrialClass::from(class)))
}

/// GET /api/v1/classes/:class_id/self-checkin
///
/// Resolves the self check-in flag through class → trial → show,
/// defaulting to enabled. Broader-level read failures fall through rather
/// than failing the request.
pub async fn get_self_checkin(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let class = TrialClassRepository::new(state.pool.clone())
        .find_by_id(class_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    let trial = match TrialRepository::new(state.pool.clone())
        .find_by_id(class.trial_id)
        .await
    {
        Ok(trial) => trial,
        Err(err) => {
            warn!(trial_id = %class.trial_id, error = %err, "trial lookup failed, falling through");
            None
        }
    };

    let show = match &trial {
        Some(trial) => match ShowRepository::new(state.pool.clone())
            .find_by_key(&trial.show_key)
            .await
        {
            Ok(show) => show,
            Err(err) => {
                warn!(show_key = %trial.show_key, error = %err, "show lookup failed, falling through");
                None
            }
        },
        None => None,
    };

    let setting = resolve_self_checkin(
        class.self_checkin_enabled,
        trial.and_then(|t| t.self_checkin_enabled),
        show.and_then(|s| s.self_checkin_enabled),
    );

    Ok(Json(setting))
}

/// PUT /api/v1/classes/:class_id/self-checkin
pub async fn set_class_self_checkin(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(request): Json<SetSelfCheckinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TrialClassRepository::new(state.pool.clone());
    let class = repo
        .set_self_checkin(class_id, request.enabled)
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    info!(
        class_id = %class_id,
        enabled = ?request.enabled,
        "Set class self check-in flag"
    );

    Ok(Json(TrialClass::from(class)))
}

/// PUT /api/v1/trials/:trial_id/self-checkin
pub async fn set_trial_self_checkin(
    State(state): State<AppState>,
    Path(trial_id): Path<Uuid>,
    Json(request): Json<SetSelfCheckinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TrialRepository::new(state.pool.clone());
    let trial = repo
        .set_self_checkin(trial_id, request.enabled)
        .await?
        .ok_or_else(|| ApiError::NotFound("Trial not found".to_string()))?;

    info!(
        trial_id = %trial_id,
        enabled = ?request.enabled,
        "Set trial self check-in flag"
    );

    Ok(Json(Trial::from(trial)))
}

/// PUT /api/v1/shows/:show_key/self-checkin
pub async fn set_show_self_checkin(
    State(state): State<AppState>,
    Path(show_key): Path<String>,
    Json(request): Json<SetSelfCheckinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ShowRepository::new(state.pool.clone());
    let show = repo
        .set_self_checkin(&show_key, request.enabled)
        .await?
        .ok_or_else(|| ApiError::NotFound("Show not found".to_string()))?;

    info!(
        show_key = %show_key,
        enabled = ?request.enabled,
        "Set show self check-in flag"
    );

    Ok(Json(Show::from(show)))
}
