//! Trial entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::Trial;
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `trials` table.
#[derive(Debug, Clone, FromRow)]
pub struct TrialEntity {
    pub id: Uuid,
    pub show_key: String,
    pub trial_date: NaiveDate,
    pub self_checkin_enabled: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrialEntity> for Trial {
    fn from(entity: TrialEntity) -> Self {
        Trial {
            id: entity.id,
            show_key: entity.show_key,
            trial_date: entity.trial_date,
            self_checkin_enabled: entity.self_checkin_enabled,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
