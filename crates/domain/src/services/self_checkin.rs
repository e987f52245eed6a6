//! Self check-in resolution.
//!
//! Same class → trial → show precedence as result visibility, over a
//! single nullable boolean column per scope. Defaults to enabled when
//! nothing is configured anywhere.

use crate::models::{PrecedenceLevel, SelfCheckinSetting};

/// Resolve whether exhibitors may check themselves in for a class.
pub fn resolve_self_checkin(
    class: Option<bool>,
    trial: Option<bool>,
    show: Option<bool>,
) -> SelfCheckinSetting {
    if let Some(enabled) = class {
        return SelfCheckinSetting {
            enabled,
            inherited_from: Some(PrecedenceLevel::Class),
        };
    }
    if let Some(enabled) = trial {
        return SelfCheckinSetting {
            enabled,
            inherited_from: Some(PrecedenceLevel::Trial),
        };
    }
    if let Some(enabled) = show {
        return SelfCheckinSetting {
            enabled,
            inherited_from: Some(PrecedenceLevel::Show),
        };
    }

    SelfCheckinSetting {
        enabled: true,
        inherited_from: None,
    }
}
