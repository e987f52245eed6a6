//! Visibility orchestration shared by route handlers.

use chrono::{DateTime, Utc};
use domain::models::{TrialClass, UserRole, VisibilitySettings, VisibleResultFields};
use domain::services::{compute_visible_fields, resolve_class_visibility};
use persistence::repositories::{
    EntryRepository, TrialClassRepository, TrialRepository, VisibilityRepository,
};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;

/// A class joined with the identifiers resolution needs.
pub struct ClassContext {
    pub class: TrialClass,
    pub show_key: String,
}

/// Loads a class and derives its trial id and show key from the row chain.
pub async fn load_class_context(pool: &PgPool, class_id: Uuid) -> Result<ClassContext, ApiError> {
    let class = TrialClassRepository::new(pool.clone())
        .find_by_id(class_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    let trial = TrialRepository::new(pool.clone())
        .find_by_id(class.trial_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Trial not found".to_string()))?;

    Ok(ClassContext {
        class: class.into(),
        show_key: trial.show_key,
    })
}

/// Resolved settings plus the gate output for one viewer at this instant.
pub struct ClassVisibility {
    pub settings: VisibilitySettings,
    pub fields: VisibleResultFields,
    pub is_class_complete: bool,
    pub results_released_at: Option<DateTime<Utc>>,
}

/// Resolves settings and computes per-viewer field visibility.
///
/// Resolution itself never fails. A failed class-completion count is
/// treated as "not complete", which hides rather than leaks gated fields.
pub async fn class_visibility_for(
    pool: &PgPool,
    ctx: &ClassContext,
    role: UserRole,
) -> ClassVisibility {
    let repo = VisibilityRepository::new(pool.clone());
    let settings =
        resolve_class_visibility(&repo, ctx.class.id, ctx.class.trial_id, &ctx.show_key).await;

    let is_class_complete = match EntryRepository::new(pool.clone())
        .class_completion(ctx.class.id)
        .await
    {
        Ok(counts) => counts.is_complete(),
        Err(err) => {
            warn!(
                class_id = %ctx.class.id,
                error = %err,
                "class completion lookup failed, treating as incomplete"
            );
            false
        }
    };

    let fields = compute_visible_fields(
        &settings,
        role,
        is_class_complete,
        ctx.class.results_released_at,
    );

    ClassVisibility {
        settings,
        fields,
        is_class_complete,
        results_released_at: ctx.class.results_released_at,
    }
}
