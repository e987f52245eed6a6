//! Repository for entry operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    CheckinStatusDb, ClassCompletionEntity, EntryEntity, QualificationResultDb,
};
use crate::metrics::QueryTimer;

/// Repository for entry database operations.
#[derive(Clone)]
pub struct EntryRepository {
    pool: PgPool,
}

impl EntryRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists a class's entries in armband order.
    pub async fn list_by_class(&self, class_id: Uuid) -> Result<Vec<EntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_entries_by_class");
        let result = sqlx::query_as::<_, EntryEntity>(
            r#"
            SELECT id, class_id, armband, call_name, handler_name, checkin_status,
                   placement, qualification, search_time_secs, fault_count, scored_at,
                   created_at, updated_at
            FROM entries
            WHERE class_id = $1
            ORDER BY armband
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates an entry in a class.
    pub async fn create(
        &self,
        class_id: Uuid,
        armband: i32,
        call_name: &str,
        handler_name: &str,
    ) -> Result<EntryEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_entry");
        let result = sqlx::query_as::<_, EntryEntity>(
            r#"
            INSERT INTO entries (class_id, armband, call_name, handler_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, class_id, armband, call_name, handler_name, checkin_status,
                      placement, qualification, search_time_secs, fault_count, scored_at,
                      created_at, updated_at
            "#,
        )
        .bind(class_id)
        .bind(armband)
        .bind(call_name)
        .bind(handler_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Sets an entry's check-in status. Plain assignment, no transition
    /// guards.
    pub async fn set_checkin_status(
        &self,
        entry_id: Uuid,
        status: CheckinStatusDb,
    ) -> Result<Option<EntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_entry_checkin_status");
        let result = sqlx::query_as::<_, EntryEntity>(
            r#"
            UPDATE entries
            SET checkin_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, class_id, armband, call_name, handler_name, checkin_status,
                      placement, qualification, search_time_secs, fault_count, scored_at,
                      created_at, updated_at
            "#,
        )
        .bind(entry_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Records a scored run and moves the entry to `scored`.
    pub async fn record_score(
        &self,
        entry_id: Uuid,
        placement: Option<i32>,
        qualification: QualificationResultDb,
        search_time_secs: Option<f64>,
        fault_count: Option<i32>,
    ) -> Result<Option<EntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("record_entry_score");
        let result = sqlx::query_as::<_, EntryEntity>(
            r#"
            UPDATE entries
            SET checkin_status = 'scored', placement = $2, qualification = $3,
                search_time_secs = $4, fault_count = $5, scored_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, class_id, armband, call_name, handler_name, checkin_status,
                      placement, qualification, search_time_secs, fault_count, scored_at,
                      created_at, updated_at
            "#,
        )
        .bind(entry_id)
        .bind(placement)
        .bind(qualification)
        .bind(search_time_secs)
        .bind(fault_count)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Counts how many entries the class has and how many still block
    /// completion (not scored and not pulled).
    pub async fn class_completion(
        &self,
        class_id: Uuid,
    ) -> Result<ClassCompletionEntity, sqlx::Error> {
        let timer = QueryTimer::new("class_completion_counts");
        let result = sqlx::query_as::<_, ClassCompletionEntity>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (
                       WHERE checkin_status NOT IN ('scored', 'pulled')
                   ) AS blocking
            FROM entries
            WHERE class_id = $1
            "#,
        )
        .bind(class_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
