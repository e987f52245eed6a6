//! Class entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::TrialClass;
use sqlx::FromRow;
use uuid::Uuid;

/// Row mapping for the `trial_classes` table.
#[derive(Debug, Clone, FromRow)]
pub struct TrialClassEntity {
    pub id: Uuid,
    pub trial_id: Uuid,
    pub element: String,
    pub level: String,
    pub self_checkin_enabled: Option<bool>,
    pub results_released_at: Option<DateTime<Utc>>,
    pub results_released_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrialClassEntity> for TrialClass {
    fn from(entity: TrialClassEntity) -> Self {
        TrialClass {
            id: entity.id,
            trial_id: entity.trial_id,
            element: entity.element,
            level: entity.level,
            self_checkin_enabled: entity.self_checkin_enabled,
            results_released_at: entity.results_released_at,
            results_released_by: entity.results_released_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_entity_to_domain_carries_release_stamp() {
        let now = Utc::now();
        let entity = TrialClassEntity {
            id: Uuid::new_v4(),
            trial_id: Uuid::new_v4(),
            element: "Interior".to_string(),
            level: "Advanced".to_string(),
            self_checkin_enabled: None,
            results_released_at: Some(now),
            results_released_by: Some("admin@example.com".to_string()),
            created_at: now,
            updated_at: now,
        };

        let class: TrialClass = entity.into();
        assert!(class.results_released());
        assert_eq!(class.results_released_by.as_deref(), Some("admin@example.com"));
    }
}
