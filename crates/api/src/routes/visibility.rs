//! Result visibility routes.
//!
//! Admin writes (preset assignment, granular timings, removal, bulk
//! assignment) and the read side consumed by result pages (resolved
//! settings, per-viewer field visibility, gated results listing).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use domain::models::{
    BulkSetClassVisibilityRequest, GatedEntryResult, GranularVisibilityRequest, PrecedenceLevel,
    SetVisibilityRequest, UserRole, VisibilityPreset, VisibilitySettings, VisibleResultFields,
    WithheldField,
};
use domain::services::{resolve_override, withheld_fields};
use persistence::repositories::{
    EntryRepository, GranularTimings, ShowRepository, TrialClassRepository, TrialRepository,
    VisibilityRepository,
};
use serde::{Deserialize, Serialize};
use shared::validation::validate_show_key;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::record_visibility_changed;
use crate::services::{class_visibility_for, load_class_context};

/// Viewer identification for read endpoints. The role is a caller-supplied
/// claim; it defaults to the least privileged role when absent.
#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    #[serde(default)]
    pub role: UserRole,
}

/// Response for the visible-fields endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VisibleFieldsResponse {
    pub class_id: Uuid,
    pub role: UserRole,
    pub is_class_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_released_at: Option<DateTime<Utc>>,
    pub settings: VisibilitySettings,
    pub fields: VisibleResultFields,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub withheld: Vec<WithheldField>,
}

/// Response for the gated results listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassResultsResponse {
    pub class_id: Uuid,
    pub element: String,
    pub level: String,
    pub role: UserRole,
    pub is_class_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_released_at: Option<DateTime<Utc>>,
    pub fields: VisibleResultFields,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub withheld: Vec<WithheldField>,
    pub entries: Vec<GatedEntryResult>,
}

/// Response for a bulk preset assignment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BulkSetResponse {
    pub updated: u64,
}

fn granular_timings(request: &GranularVisibilityRequest) -> GranularTimings {
    GranularTimings {
        placement: request.placement_timing.map(Into::into),
        qualification: request.qualification_timing.map(Into::into),
        time: request.time_timing.map(Into::into),
        faults: request.faults_timing.map(Into::into),
    }
}

// ============================================================================
// Show scope
// ============================================================================

/// GET /api/v1/shows/:show_key/visibility
///
/// Effective show-level settings: the stored default, or the `standard`
/// preset when the show has never been configured.
pub async fn get_show_visibility(
    State(state): State<AppState>,
    Path(show_key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if validate_show_key(&show_key).is_err() {
        return Err(ApiError::Validation("Invalid show key format".to_string()));
    }

    let shows = ShowRepository::new(state.pool.clone());
    if shows.find_by_key(&show_key).await?.is_none() {
        return Err(ApiError::NotFound("Show not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let settings = match repo.get_show_default(&show_key).await? {
        Some(row) => resolve_override(&row.into(), PrecedenceLevel::Show),
        None => VisibilitySettings::from_preset(VisibilityPreset::Standard, PrecedenceLevel::Show),
    };

    Ok(Json(settings))
}

/// PUT /api/v1/shows/:show_key/visibility
///
/// Assign a preset as the show default. Granular timings on the row are
/// cleared so stale field overrides cannot survive the preset change.
pub async fn set_show_visibility(
    State(state): State<AppState>,
    Path(show_key): Path<String>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    if validate_show_key(&show_key).is_err() {
        return Err(ApiError::Validation("Invalid show key format".to_string()));
    }

    let shows = ShowRepository::new(state.pool.clone());
    if shows.find_by_key(&show_key).await?.is_none() {
        return Err(ApiError::NotFound("Show not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let row = repo
        .upsert_show_preset(&show_key, request.preset.into(), &request.updated_by)
        .await?;

    record_visibility_changed("show");
    info!(
        show_key = %show_key,
        preset = %request.preset,
        updated_by = %request.updated_by,
        "Assigned show visibility preset"
    );

    Ok(Json(resolve_override(&row.into(), PrecedenceLevel::Show)))
}

/// PATCH /api/v1/shows/:show_key/visibility/fields
pub async fn set_show_granular_visibility(
    State(state): State<AppState>,
    Path(show_key): Path<String>,
    Json(request): Json<GranularVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation(
            "At least one timing field must be provided".to_string(),
        ));
    }

    let shows = ShowRepository::new(state.pool.clone());
    if shows.find_by_key(&show_key).await?.is_none() {
        return Err(ApiError::NotFound("Show not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let row = repo
        .upsert_show_granular(&show_key, granular_timings(&request), &request.updated_by)
        .await?;

    record_visibility_changed("show");
    info!(
        show_key = %show_key,
        updated_by = %request.updated_by,
        "Updated show granular visibility timings"
    );

    Ok(Json(resolve_override(&row.into(), PrecedenceLevel::Show)))
}

// ============================================================================
// Trial scope
// ============================================================================

/// PUT /api/v1/trials/:trial_id/visibility
pub async fn set_trial_visibility(
    State(state): State<AppState>,
    Path(trial_id): Path<Uuid>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let trials = TrialRepository::new(state.pool.clone());
    if trials.find_by_id(trial_id).await?.is_none() {
        return Err(ApiError::NotFound("Trial not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let row = repo
        .upsert_trial_preset(trial_id, request.preset.into(), &request.updated_by)
        .await?;

    record_visibility_changed("trial");
    info!(
        trial_id = %trial_id,
        preset = %request.preset,
        updated_by = %request.updated_by,
        "Assigned trial visibility preset"
    );

    Ok(Json(resolve_override(&row.into(), PrecedenceLevel::Trial)))
}

/// PATCH /api/v1/trials/:trial_id/visibility/fields
pub async fn set_trial_granular_visibility(
    State(state): State<AppState>,
    Path(trial_id): Path<Uuid>,
    Json(request): Json<GranularVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation(
            "At least one timing field must be provided".to_string(),
        ));
    }

    let trials = TrialRepository::new(state.pool.clone());
    if trials.find_by_id(trial_id).await?.is_none() {
        return Err(ApiError::NotFound("Trial not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let row = repo
        .upsert_trial_granular(trial_id, granular_timings(&request), &request.updated_by)
        .await?;

    record_visibility_changed("trial");
    info!(
        trial_id = %trial_id,
        updated_by = %request.updated_by,
        "Updated trial granular visibility timings"
    );

    Ok(Json(resolve_override(&row.into(), PrecedenceLevel::Trial)))
}

/// DELETE /api/v1/trials/:trial_id/visibility
///
/// Removes the trial override; resolution falls through to the show.
pub async fn remove_trial_visibility(
    State(state): State<AppState>,
    Path(trial_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = VisibilityRepository::new(state.pool.clone());
    let deleted = repo.delete_trial_override(trial_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(
            "No visibility override for this trial".to_string(),
        ));
    }

    record_visibility_changed("trial");
    info!(trial_id = %trial_id, "Removed trial visibility override");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Class scope
// ============================================================================

/// PUT /api/v1/classes/:class_id/visibility
pub async fn set_class_visibility(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    let classes = TrialClassRepository::new(state.pool.clone());
    if classes.find_by_id(class_id).await?.is_none() {
        return Err(ApiError::NotFound("Class not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let row = repo
        .upsert_class_preset(class_id, request.preset.into(), &request.updated_by)
        .await?;

    record_visibility_changed("class");
    info!(
        class_id = %class_id,
        preset = %request.preset,
        updated_by = %request.updated_by,
        "Assigned class visibility preset"
    );

    Ok(Json(resolve_override(&row.into(), PrecedenceLevel::Class)))
}

/// PATCH /api/v1/classes/:class_id/visibility/fields
pub async fn set_class_granular_visibility(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(request): Json<GranularVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation(
            "At least one timing field must be provided".to_string(),
        ));
    }

    let classes = TrialClassRepository::new(state.pool.clone());
    if classes.find_by_id(class_id).await?.is_none() {
        return Err(ApiError::NotFound("Class not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let row = repo
        .upsert_class_granular(class_id, granular_timings(&request), &request.updated_by)
        .await?;

    record_visibility_changed("class");
    info!(
        class_id = %class_id,
        updated_by = %request.updated_by,
        "Updated class granular visibility timings"
    );

    Ok(Json(resolve_override(&row.into(), PrecedenceLevel::Class)))
}

/// DELETE /api/v1/classes/:class_id/visibility
///
/// Removes the class override; resolution falls through to the trial.
pub async fn remove_class_visibility(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = VisibilityRepository::new(state.pool.clone());
    let deleted = repo.delete_class_override(class_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(
            "No visibility override for this class".to_string(),
        ));
    }

    record_visibility_changed("class");
    info!(class_id = %class_id, "Removed class visibility override");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/trials/:trial_id/classes/visibility
///
/// Applies one preset to many classes in a single batch write. The batch
/// succeeds or fails as a whole; there is no partial-failure reporting.
pub async fn bulk_set_class_visibility(
    State(state): State<AppState>,
    Path(trial_id): Path<Uuid>,
    Json(request): Json<BulkSetClassVisibilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;

    if request.class_ids.len() > state.config.limits.max_bulk_classes {
        return Err(ApiError::Validation(format!(
            "At most {} classes can be updated per batch",
            state.config.limits.max_bulk_classes
        )));
    }

    let trials = TrialRepository::new(state.pool.clone());
    if trials.find_by_id(trial_id).await?.is_none() {
        return Err(ApiError::NotFound("Trial not found".to_string()));
    }

    let repo = VisibilityRepository::new(state.pool.clone());
    let updated = repo
        .bulk_upsert_class_presets(&request.class_ids, request.preset.into(), &request.updated_by)
        .await?;

    record_visibility_changed("class");
    info!(
        trial_id = %trial_id,
        preset = %request.preset,
        updated_by = %request.updated_by,
        classes = updated,
        "Bulk-assigned class visibility preset"
    );

    Ok(Json(BulkSetResponse { updated }))
}

// ============================================================================
// Read side
// ============================================================================

/// GET /api/v1/classes/:class_id/visibility-settings
///
/// Resolved settings for a class: class override, else trial override,
/// else show default, else the `standard` preset.
pub async fn get_class_visibility_settings(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = load_class_context(&state.pool, class_id).await?;

    let repo = VisibilityRepository::new(state.pool.clone());
    let settings = domain::services::resolve_class_visibility(
        &repo,
        ctx.class.id,
        ctx.class.trial_id,
        &ctx.show_key,
    )
    .await;

    Ok(Json(settings))
}

/// GET /api/v1/classes/:class_id/visible-fields?role=
///
/// Which result fields the viewer can see right now. Recomputed on every
/// request; class completion and release state change externally.
pub async fn get_visible_fields(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = load_class_context(&state.pool, class_id).await?;
    let visibility = class_visibility_for(&state.pool, &ctx, viewer.role).await;

    let withheld = withheld_fields(
        &visibility.settings,
        &visibility.fields,
        visibility.is_class_complete,
    );

    Ok(Json(VisibleFieldsResponse {
        class_id,
        role: viewer.role,
        is_class_complete: visibility.is_class_complete,
        results_released_at: visibility.results_released_at,
        settings: visibility.settings,
        fields: visibility.fields,
        withheld,
    }))
}

/// GET /api/v1/classes/:class_id/results?role=
///
/// The class's entries with result fields masked for the viewer.
pub async fn get_class_results(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = load_class_context(&state.pool, class_id).await?;
    let visibility = class_visibility_for(&state.pool, &ctx, viewer.role).await;

    let entries = EntryRepository::new(state.pool.clone())
        .list_by_class(class_id)
        .await?;

    let gated: Vec<GatedEntryResult> = entries
        .into_iter()
        .map(|entity| {
            let entry: domain::models::Entry = entity.into();
            GatedEntryResult::from_entry(&entry, &visibility.fields)
        })
        .collect();

    let withheld = withheld_fields(
        &visibility.settings,
        &visibility.fields,
        visibility.is_class_complete,
    );

    Ok(Json(ClassResultsResponse {
        class_id,
        element: ctx.class.element.clone(),
        level: ctx.class.level.clone(),
        role: viewer.role,
        is_class_complete: visibility.is_class_complete,
        results_released_at: visibility.results_released_at,
        fields: visibility.fields,
        withheld,
        entries: gated,
    }))
}
