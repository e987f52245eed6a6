//! Repository for result visibility override rows.
//!
//! Three tables, one per scope. Assigning a preset always clears the
//! granular timing columns so stale field overrides cannot survive a
//! preset change; granular writes leave the preset untouched.

use async_trait::async_trait;
use domain::models::VisibilityOverride;
use domain::services::VisibilityStore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    ClassVisibilityEntity, ShowVisibilityEntity, TrialVisibilityEntity, VisibilityPresetDb,
    VisibilityTimingDb,
};
use crate::metrics::QueryTimer;

/// Granular timing columns for an upsert, `None` meaning "leave as is".
#[derive(Debug, Clone, Copy, Default)]
pub struct GranularTimings {
    pub placement: Option<VisibilityTimingDb>,
    pub qualification: Option<VisibilityTimingDb>,
    pub time: Option<VisibilityTimingDb>,
    pub faults: Option<VisibilityTimingDb>,
}

/// Repository for visibility override database operations.
#[derive(Clone)]
pub struct VisibilityRepository {
    pool: PgPool,
}

impl VisibilityRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets the show-level default row, if configured.
    pub async fn get_show_default(
        &self,
        show_key: &str,
    ) -> Result<Option<ShowVisibilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_show_visibility_default");
        let result = sqlx::query_as::<_, ShowVisibilityEntity>(
            r#"
            SELECT show_key, preset_name, placement_timing, qualification_timing,
                   time_timing, faults_timing, updated_by, updated_at
            FROM show_visibility_defaults
            WHERE show_key = $1
            "#,
        )
        .bind(show_key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Gets the trial-level override row, if configured.
    pub async fn get_trial_override(
        &self,
        trial_id: Uuid,
    ) -> Result<Option<TrialVisibilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_trial_visibility_override");
        let result = sqlx::query_as::<_, TrialVisibilityEntity>(
            r#"
            SELECT trial_id, preset_name, placement_timing, qualification_timing,
                   time_timing, faults_timing, updated_by, updated_at
            FROM trial_visibility_overrides
            WHERE trial_id = $1
            "#,
        )
        .bind(trial_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Gets the class-level override row, if configured.
    pub async fn get_class_override(
        &self,
        class_id: Uuid,
    ) -> Result<Option<ClassVisibilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_class_visibility_override");
        let result = sqlx::query_as::<_, ClassVisibilityEntity>(
            r#"
            SELECT class_id, preset_name, placement_timing, qualification_timing,
                   time_timing, faults_timing, updated_by, updated_at
            FROM class_visibility_overrides
            WHERE class_id = $1
            "#,
        )
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    // =========================================================================
    // Preset assignment (clears granular columns)
    // =========================================================================

    /// Upserts the show default with a preset, clearing granular timings.
    pub async fn upsert_show_preset(
        &self,
        show_key: &str,
        preset: VisibilityPresetDb,
        updated_by: &str,
    ) -> Result<ShowVisibilityEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_show_visibility_preset");
        let result = sqlx::query_as::<_, ShowVisibilityEntity>(
            r#"
            INSERT INTO show_visibility_defaults (show_key, preset_name, updated_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (show_key) DO UPDATE SET
                preset_name = EXCLUDED.preset_name,
                placement_timing = NULL,
                qualification_timing = NULL,
                time_timing = NULL,
                faults_timing = NULL,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING show_key, preset_name, placement_timing, qualification_timing,
                      time_timing, faults_timing, updated_by, updated_at
            "#,
        )
        .bind(show_key)
        .bind(preset)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upserts a trial override with a preset, clearing granular timings.
    pub async fn upsert_trial_preset(
        &self,
        trial_id: Uuid,
        preset: VisibilityPresetDb,
        updated_by: &str,
    ) -> Result<TrialVisibilityEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_trial_visibility_preset");
        let result = sqlx::query_as::<_, TrialVisibilityEntity>(
            r#"
            INSERT INTO trial_visibility_overrides (trial_id, preset_name, updated_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (trial_id) DO UPDATE SET
                preset_name = EXCLUDED.preset_name,
                placement_timing = NULL,
                qualification_timing = NULL,
                time_timing = NULL,
                faults_timing = NULL,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING trial_id, preset_name, placement_timing, qualification_timing,
                      time_timing, faults_timing, updated_by, updated_at
            "#,
        )
        .bind(trial_id)
        .bind(preset)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upserts a class override with a preset, clearing granular timings.
    pub async fn upsert_class_preset(
        &self,
        class_id: Uuid,
        preset: VisibilityPresetDb,
        updated_by: &str,
    ) -> Result<ClassVisibilityEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_class_visibility_preset");
        let result = sqlx::query_as::<_, ClassVisibilityEntity>(
            r#"
            INSERT INTO class_visibility_overrides (class_id, preset_name, updated_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (class_id) DO UPDATE SET
                preset_name = EXCLUDED.preset_name,
                placement_timing = NULL,
                qualification_timing = NULL,
                time_timing = NULL,
                faults_timing = NULL,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING class_id, preset_name, placement_timing, qualification_timing,
                      time_timing, faults_timing, updated_by, updated_at
            "#,
        )
        .bind(class_id)
        .bind(preset)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Applies one preset to many classes in a single batch statement.
    /// Returns the number of rows written; the batch succeeds or fails as
    /// a whole.
    pub async fn bulk_upsert_class_presets(
        &self,
        class_ids: &[Uuid],
        preset: VisibilityPresetDb,
        updated_by: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("bulk_upsert_class_visibility_presets");
        let result = sqlx::query(
            r#"
            INSERT INTO class_visibility_overrides (class_id, preset_name, updated_by)
            SELECT class_id, $2, $3 FROM UNNEST($1::uuid[]) AS ids(class_id)
            ON CONFLICT (class_id) DO UPDATE SET
                preset_name = EXCLUDED.preset_name,
                placement_timing = NULL,
                qualification_timing = NULL,
                time_timing = NULL,
                faults_timing = NULL,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            "#,
        )
        .bind(class_ids)
        .bind(preset)
        .bind(updated_by)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    // =========================================================================
    // Granular timings (preset left as is)
    // =========================================================================

    /// Upserts per-field timings on the show default. Fields not provided
    /// keep their stored value.
    pub async fn upsert_show_granular(
        &self,
        show_key: &str,
        timings: GranularTimings,
        updated_by: &str,
    ) -> Result<ShowVisibilityEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_show_visibility_granular");
        let result = sqlx::query_as::<_, ShowVisibilityEntity>(
            r#"
            INSERT INTO show_visibility_defaults
                (show_key, placement_timing, qualification_timing, time_timing, faults_timing, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (show_key) DO UPDATE SET
                placement_timing = COALESCE($2, show_visibility_defaults.placement_timing),
                qualification_timing = COALESCE($3, show_visibility_defaults.qualification_timing),
                time_timing = COALESCE($4, show_visibility_defaults.time_timing),
                faults_timing = COALESCE($5, show_visibility_defaults.faults_timing),
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING show_key, preset_name, placement_timing, qualification_timing,
                      time_timing, faults_timing, updated_by, updated_at
            "#,
        )
        .bind(show_key)
        .bind(timings.placement)
        .bind(timings.qualification)
        .bind(timings.time)
        .bind(timings.faults)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upserts per-field timings on a trial override.
    pub async fn upsert_trial_granular(
        &self,
        trial_id: Uuid,
        timings: GranularTimings,
        updated_by: &str,
    ) -> Result<TrialVisibilityEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_trial_visibility_granular");
        let result = sqlx::query_as::<_, TrialVisibilityEntity>(
            r#"
            INSERT INTO trial_visibility_overrides
                (trial_id, placement_timing, qualification_timing, time_timing, faults_timing, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (trial_id) DO UPDATE SET
                placement_timing = COALESCE($2, trial_visibility_overrides.placement_timing),
                qualification_timing = COALESCE($3, trial_visibility_overrides.qualification_timing),
                time_timing = COALESCE($4, trial_visibility_overrides.time_timing),
                faults_timing = COALESCE($5, trial_visibility_overrides.faults_timing),
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING trial_id, preset_name, placement_timing, qualification_timing,
                      time_timing, faults_timing, updated_by, updated_at
            "#,
        )
        .bind(trial_id)
        .bind(timings.placement)
        .bind(timings.qualification)
        .bind(timings.time)
        .bind(timings.faults)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upserts per-field timings on a class override.
    pub async fn upsert_class_granular(
        &self,
        class_id: Uuid,
        timings: GranularTimings,
        updated_by: &str,
    ) -> Result<ClassVisibilityEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_class_visibility_granular");
        let result = sqlx::query_as::<_, ClassVisibilityEntity>(
            r#"
            INSERT INTO class_visibility_overrides
                (class_id, placement_timing, qualification_timing, time_timing, faults_timing, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (class_id) DO UPDATE SET
                placement_timing = COALESCE($2, class_visibility_overrides.placement_timing),
                qualification_timing = COALESCE($3, class_visibility_overrides.qualification_timing),
                time_timing = COALESCE($4, class_visibility_overrides.time_timing),
                faults_timing = COALESCE($5, class_visibility_overrides.faults_timing),
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING class_id, preset_name, placement_timing, qualification_timing,
                      time_timing, faults_timing, updated_by, updated_at
            "#,
        )
        .bind(class_id)
        .bind(timings.placement)
        .bind(timings.qualification)
        .bind(timings.time)
        .bind(timings.faults)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    // =========================================================================
    // Removal (restores inheritance; the show row is the root and stays)
    // =========================================================================

    /// Deletes a trial override so resolution falls through to the show.
    pub async fn delete_trial_override(&self, trial_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_trial_visibility_override");
        let result = sqlx::query(
            r#"
            DELETE FROM trial_visibility_overrides
            WHERE trial_id = $1
            "#,
        )
        .bind(trial_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Deletes a class override so resolution falls through to the trial.
    pub async fn delete_class_override(&self, class_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_class_visibility_override");
        let result = sqlx::query(
            r#"
            DELETE FROM class_visibility_overrides
            WHERE class_id = $1
            "#,
        )
        .bind(class_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}

#[async_trait]
impl VisibilityStore for VisibilityRepository {
    async fn class_override(
        &self,
        class_id: Uuid,
    ) -> Result<Option<VisibilityOverride>, sqlx::Error> {
        Ok(self.get_class_override(class_id).await?.map(Into::into))
    }

    async fn trial_override(
        &self,
        trial_id: Uuid,
    ) -> Result<Option<VisibilityOverride>, sqlx::Error> {
        Ok(self.get_trial_override(trial_id).await?.map(Into::into))
    }

    async fn show_default(
        &self,
        show_key: &str,
    ) -> Result<Option<VisibilityOverride>, sqlx::Error> {
        Ok(self.get_show_default(show_key).await?.map(Into::into))
    }
}
