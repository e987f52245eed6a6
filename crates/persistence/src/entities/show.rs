//! Show entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Show;
use sqlx::FromRow;

/// Row mapping for the `shows` table.
#[derive(Debug, Clone, FromRow)]
pub struct ShowEntity {
    pub license_key: String,
    pub name: String,
    pub self_checkin_enabled: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShowEntity> for Show {
    fn from(entity: ShowEntity) -> Self {
        Show {
            license_key: entity.license_key,
            name: entity.name,
            self_checkin_enabled: entity.self_checkin_enabled,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
