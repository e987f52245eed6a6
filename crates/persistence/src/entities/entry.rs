//! Entry entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{CheckinStatus, Entry, QualificationResult};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum mapping for the `checkin_status` PostgreSQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "checkin_status", rename_all = "snake_case")]
pub enum CheckinStatusDb {
    None,
    CheckedIn,
    Conflict,
    Pulled,
    AtGate,
    Scored,
}

impl From<CheckinStatusDb> for CheckinStatus {
    fn from(db: CheckinStatusDb) -> Self {
        match db {
            CheckinStatusDb::None => CheckinStatus::None,
            CheckinStatusDb::CheckedIn => CheckinStatus::CheckedIn,
            CheckinStatusDb::Conflict => CheckinStatus::Conflict,
            CheckinStatusDb::Pulled => CheckinStatus::Pulled,
            CheckinStatusDb::AtGate => CheckinStatus::AtGate,
            CheckinStatusDb::Scored => CheckinStatus::Scored,
        }
    }
}

impl From<CheckinStatus> for CheckinStatusDb {
    fn from(status: CheckinStatus) -> Self {
        match status {
            CheckinStatus::None => CheckinStatusDb::None,
            CheckinStatus::CheckedIn => CheckinStatusDb::CheckedIn,
            CheckinStatus::Conflict => CheckinStatusDb::Conflict,
            CheckinStatus::Pulled => CheckinStatusDb::Pulled,
            CheckinStatus::AtGate => CheckinStatusDb::AtGate,
            CheckinStatus::Scored => CheckinStatusDb::Scored,
        }
    }
}

/// Database enum mapping for the `qualification_result` PostgreSQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "qualification_result", rename_all = "snake_case")]
pub enum QualificationResultDb {
    Qualified,
    NotQualified,
    Excused,
    Absent,
}

impl From<QualificationResultDb> for QualificationResult {
    fn from(db: QualificationResultDb) -> Self {
        match db {
            QualificationResultDb::Qualified => QualificationResult::Qualified,
            QualificationResultDb::NotQualified => QualificationResult::NotQualified,
            QualificationResultDb::Excused => QualificationResult::Excused,
            QualificationResultDb::Absent => QualificationResult::Absent,
        }
    }
}

impl From<QualificationResult> for QualificationResultDb {
    fn from(result: QualificationResult) -> Self {
        match result {
            QualificationResult::Qualified => QualificationResultDb::Qualified,
            QualificationResult::NotQualified => QualificationResultDb::NotQualified,
            QualificationResult::Excused => QualificationResultDb::Excused,
            QualificationResult::Absent => QualificationResultDb::Absent,
        }
    }
}

/// Row mapping for the `entries` table.
#[derive(Debug, Clone, FromRow)]
pub struct EntryEntity {
    pub id: Uuid,
    pub class_id: Uuid,
    pub armband: i32,
    pub call_name: String,
    pub handler_name: String,
    pub checkin_status: CheckinStatusDb,
    pub placement: Option<i32>,
    pub qualification: Option<QualificationResultDb>,
    pub search_time_secs: Option<f64>,
    pub fault_count: Option<i32>,
    pub scored_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EntryEntity> for Entry {
    fn from(entity: EntryEntity) -> Self {
        Entry {
            id: entity.id,
            class_id: entity.class_id,
            armband: entity.armband,
            call_name: entity.call_name,
            handler_name: entity.handler_name,
            checkin_status: entity.checkin_status.into(),
            placement: entity.placement,
            qualification: entity.qualification.map(Into::into),
            search_time_secs: entity.search_time_secs,
            fault_count: entity.fault_count,
            scored_at: entity.scored_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Aggregate counts used to decide class completion.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ClassCompletionEntity {
    /// All entries in the class.
    pub total: i64,
    /// Entries whose status still blocks completion (not scored, not pulled).
    pub blocking: i64,
}

impl ClassCompletionEntity {
    /// A class with no entries has nothing to rank and is not complete.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.blocking == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::Name;
    use fake::Fake;

    #[test]
    fn test_checkin_status_db_round_trip() {
        for status in CheckinStatus::all() {
            let db: CheckinStatusDb = (*status).into();
            let back: CheckinStatus = db.into();
            assert_eq!(back, *status);
        }
    }

    #[test]
    fn test_entry_entity_to_domain() {
        let now = Utc::now();
        let entity = EntryEntity {
            id: Uuid::new_v4(),
            class_id: Uuid::new_v4(),
            armband: 101,
            call_name: "Scout".to_string(),
            handler_name: Name().fake(),
            checkin_status: CheckinStatusDb::Scored,
            placement: Some(1),
            qualification: Some(QualificationResultDb::Qualified),
            search_time_secs: Some(31.9),
            fault_count: Some(0),
            scored_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let entry: Entry = entity.into();
        assert_eq!(entry.checkin_status, CheckinStatus::Scored);
        assert_eq!(entry.qualification, Some(QualificationResult::Qualified));
        assert_eq!(entry.placement, Some(1));
    }

    #[test]
    fn test_class_completion_requires_entries() {
        let empty = ClassCompletionEntity { total: 0, blocking: 0 };
        assert!(!empty.is_complete());

        let pending = ClassCompletionEntity { total: 12, blocking: 3 };
        assert!(!pending.is_complete());

        let done = ClassCompletionEntity { total: 12, blocking: 0 };
        assert!(done.is_complete());
    }
}
