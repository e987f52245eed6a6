//! Repository for trial operations.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TrialEntity;
use crate::metrics::QueryTimer;

/// Repository for trial database operations.
#[derive(Clone)]
pub struct TrialRepository {
    pool: PgPool,
}

impl TrialRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a trial by id.
    pub async fn find_by_id(&self, trial_id: Uuid) -> Result<Option<TrialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_trial_by_id");
        let result = sqlx::query_as::<_, TrialEntity>(
            r#"
            SELECT id, show_key, trial_date, self_checkin_enabled, created_at, updated_at
            FROM trials
            WHERE id = $1
            "#,
        )
        .bind(trial_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates a trial within a show.
    pub async fn create(
        &self,
        show_key: &str,
        trial_date: NaiveDate,
    ) -> Result<TrialEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_trial");
        let result = sqlx::query_as::<_, TrialEntity>(
            r#"
            INSERT INTO trials (show_key, trial_date)
            VALUES ($1, $2)
            RETURNING id, show_key, trial_date, self_checkin_enabled, created_at, updated_at
            "#,
        )
        .bind(show_key)
        .bind(trial_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Sets or clears the trial's self check-in flag.
    pub async fn set_self_checkin(
        &self,
        trial_id: Uuid,
        enabled: Option<bool>,
    ) -> Result<Option<TrialEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_trial_self_checkin");
        let result = sqlx::query_as::<_, TrialEntity>(
            r#"
            UPDATE trials
            SET self_checkin_enabled = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, show_key, trial_date, self_checkin_enabled, created_at, updated_at
            "#,
        )
        .bind(trial_id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
