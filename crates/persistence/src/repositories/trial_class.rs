//! Repository for class operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TrialClassEntity;
use crate::metrics::QueryTimer;

/// Repository for class database operations.
#[derive(Clone)]
pub struct TrialClassRepository {
    pool: PgPool,
}

impl TrialClassRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a class by id.
    pub async fn find_by_id(
        &self,
        class_id: Uuid,
    ) -> Result<Option<TrialClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_class_by_id");
        let result = sqlx::query_as::<_, TrialClassEntity>(
            r#"
            SELECT id, trial_id, element, level, self_checkin_enabled,
                   results_released_at, results_released_by, created_at, updated_at
            FROM trial_classes
            WHERE id = $1
            "#,
        )
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists the classes of a trial.
    pub async fn list_by_trial(
        &self,
        trial_id: Uuid,
    ) -> Result<Vec<TrialClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_classes_by_trial");
        let result = sqlx::query_as::<_, TrialClassEntity>(
            r#"
            SELECT id, trial_id, element, level, self_checkin_enabled,
                   results_released_at, results_released_by, created_at, updated_at
            FROM trial_classes
            WHERE trial_id = $1
            ORDER BY element, level
            "#,
        )
        .bind(trial_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates a class within a trial.
    pub async fn create(
        &self,
        trial_id: Uuid,
        element: &str,
        level: &str,
    ) -> Result<TrialClassEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_class");
        let result = sqlx::query_as::<_, TrialClassEntity>(
            r#"
            INSERT INTO trial_classes (trial_id, element, level)
            VALUES ($1, $2, $3)
            RETURNING id, trial_id, element, level, self_checkin_enabled,
                      results_released_at, results_released_by, created_at, updated_at
            "#,
        )
        .bind(trial_id)
        .bind(element)
        .bind(level)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Records a manual results release for the class.
    pub async fn release_results(
        &self,
        class_id: Uuid,
        released_by: &str,
    ) -> Result<Option<TrialClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("release_class_results");
        let result = sqlx::query_as::<_, TrialClassEntity>(
            r#"
            UPDATE trial_classes
            SET results_released_at = NOW(), results_released_by = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, trial_id, element, level, self_checkin_enabled,
                      results_released_at, results_released_by, created_at, updated_at
            "#,
        )
        .bind(class_id)
        .bind(released_by)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Clears a manual release, hiding `manual_release`-gated fields again.
    pub async fn clear_release(
        &self,
        class_id: Uuid,
    ) -> Result<Option<TrialClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("clear_class_release");
        let result = sqlx::query_as::<_, TrialClassEntity>(
            r#"
            UPDATE trial_classes
            SET results_released_at = NULL, results_released_by = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING id, trial_id, element, level, self_checkin_enabled,
                      results_released_at, results_released_by, created_at, updated_at
            "#,
        )
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Sets or clears the class's self check-in flag.
    pub async fn set_self_checkin(
        &self,
        class_id: Uuid,
        enabled: Option<bool>,
    ) -> Result<Option<TrialClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_class_self_checkin");
        let result = sqlx::query_as::<_, TrialClassEntity>(
            r#"
            UPDATE trial_classes
            SET self_checkin_enabled = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, trial_id, element, level, self_checkin_enabled,
                      results_released_at, results_released_by, created_at, updated_at
            "#,
        )
        .bind(class_id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
