//! Repository for show operations.

use sqlx::PgPool;

use crate::entities::ShowEntity;
use crate::metrics::QueryTimer;

/// Repository for show database operations.
#[derive(Clone)]
pub struct ShowRepository {
    pool: PgPool,
}

impl ShowRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a show by its license key.
    pub async fn find_by_key(&self, license_key: &str) -> Result<Option<ShowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_show_by_key");
        let result = sqlx::query_as::<_, ShowEntity>(
            r#"
            SELECT license_key, name, self_checkin_enabled, created_at, updated_at
            FROM shows
            WHERE license_key = $1
            "#,
        )
        .bind(license_key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Creates a show.
    pub async fn create(&self, license_key: &str, name: &str) -> Result<ShowEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_show");
        let result = sqlx::query_as::<_, ShowEntity>(
            r#"
            INSERT INTO shows (license_key, name)
            VALUES ($1, $2)
            RETURNING license_key, name, self_checkin_enabled, created_at, updated_at
            "#,
        )
        .bind(license_key)
        .bind(name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Sets or clears the show's self check-in flag.
    pub async fn set_self_checkin(
        &self,
        license_key: &str,
        enabled: Option<bool>,
    ) -> Result<Option<ShowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_show_self_checkin");
        let result = sqlx::query_as::<_, ShowEntity>(
            r#"
            UPDATE shows
            SET self_checkin_enabled = $2, updated_at = NOW()
            WHERE license_key = $1
            RETURNING license_key, name, self_checkin_enabled, created_at, updated_at
            "#,
        )
        .bind(license_key)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
