//! Result visibility resolution service.
//!
//! Resolves the effective visibility settings for a class from the
//! override hierarchy and turns resolved settings into per-viewer field
//! visibility:
//! 1. Class-level override
//! 2. Trial-level override
//! 3. Show-level default
//! 4. `standard` preset when nothing is configured
//!
//! The first configured level wins in full; granular field overrides only
//! combine with the preset inside the same row, never across levels.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    PrecedenceLevel, PresetTimings, ResultField, UserRole, VisibilityOverride, VisibilityPreset,
    VisibilitySettings, VisibilityTiming, VisibleResultFields, WithheldField,
};

/// Defaults for override rows that carry granular timings without a
/// preset. These coincide with the `standard` preset today but are fixed
/// independently of it.
const GRANULAR_DEFAULTS: PresetTimings = PresetTimings {
    placement: VisibilityTiming::ClassComplete,
    qualification: VisibilityTiming::Immediate,
    time: VisibilityTiming::ClassComplete,
    faults: VisibilityTiming::ClassComplete,
};

/// Read access to the three override scopes.
///
/// Implemented by the persistence layer. Lookup failures are surfaced so
/// the resolver can degrade level by level instead of aborting.
#[async_trait]
pub trait VisibilityStore: Send + Sync {
    async fn class_override(
        &self,
        class_id: Uuid,
    ) -> Result<Option<VisibilityOverride>, sqlx::Error>;

    async fn trial_override(
        &self,
        trial_id: Uuid,
    ) -> Result<Option<VisibilityOverride>, sqlx::Error>;

    async fn show_default(&self, show_key: &str)
        -> Result<Option<VisibilityOverride>, sqlx::Error>;
}

/// Per-field merge: an explicit override on the row replaces the base
/// value; absence means inherit.
fn effective_timing(base: VisibilityTiming, over: Option<VisibilityTiming>) -> VisibilityTiming {
    over.unwrap_or(base)
}

/// Resolve a single override row at the given precedence level.
///
/// The row's preset (when named) supplies the base timings; each non-null
/// granular field replaces its base value. A persisted `immediate`
/// placement is coerced to `class_complete`: a placement cannot exist
/// before the class is complete.
pub fn resolve_override(row: &VisibilityOverride, level: PrecedenceLevel) -> VisibilitySettings {
    let base = match row.preset {
        Some(preset) => preset.timings(),
        None => GRANULAR_DEFAULTS,
    };

    let mut settings = VisibilitySettings {
        placement: effective_timing(base.placement, row.placement_timing),
        qualification: effective_timing(base.qualification, row.qualification_timing),
        time: effective_timing(base.time, row.time_timing),
        faults: effective_timing(base.faults, row.faults_timing),
        inherited_from: level,
        preset: row.preset,
    };

    if !settings.placement.allowed_for_placement() {
        tracing::warn!(
            level = %level,
            "placement timing 'immediate' coerced to 'class_complete'"
        );
        settings.placement = VisibilityTiming::ClassComplete;
    }

    settings
}

/// Resolve the effective visibility settings for one class.
///
/// Walks class → trial → show and stops at the first configured level. A
/// failed read at one level is logged and treated as "no row there"; when
/// nothing is configured (or readable) anywhere, the `standard` preset
/// applies at show precedence. Never returns an error: visibility
/// resolution degrades safely rather than blocking result display.
pub async fn resolve_class_visibility<S>(
    store: &S,
    class_id: Uuid,
    trial_id: Uuid,
    show_key: &str,
) -> VisibilitySettings
where
    S: VisibilityStore + ?Sized,
{
    match store.class_override(class_id).await {
        Ok(Some(row)) => return resolve_override(&row, PrecedenceLevel::Class),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(%class_id, error = %err, "class visibility lookup failed, falling through");
        }
    }

    match store.trial_override(trial_id).await {
        Ok(Some(row)) => return resolve_override(&row, PrecedenceLevel::Trial),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(%trial_id, error = %err, "trial visibility lookup failed, falling through");
        }
    }

    match store.show_default(show_key).await {
        Ok(Some(row)) => return resolve_override(&row, PrecedenceLevel::Show),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(show_key, error = %err, "show visibility lookup failed, falling through");
        }
    }

    tracing::warn!(
        %class_id,
        show_key,
        "no visibility configuration at any level, using standard preset"
    );
    VisibilitySettings::from_preset(VisibilityPreset::Standard, PrecedenceLevel::Show)
}

/// Compute which result fields a viewer can see at this moment.
///
/// Officials (admin, judge) see everything; everyone else gets each field
/// gated by its timing against the class-complete flag and the release
/// timestamp. Pure function; class completion and release state change
/// externally, so callers re-evaluate on every request.
pub fn compute_visible_fields(
    settings: &VisibilitySettings,
    role: UserRole,
    is_class_complete: bool,
    results_released_at: Option<DateTime<Utc>>,
) -> VisibleResultFields {
    if role.sees_full_results() {
        return VisibleResultFields::all_visible();
    }

    let visible = |timing: VisibilityTiming| match timing {
        VisibilityTiming::Immediate => true,
        VisibilityTiming::ClassComplete => is_class_complete,
        VisibilityTiming::ManualRelease => results_released_at.is_some(),
    };

    VisibleResultFields {
        show_placement: visible(settings.placement),
        show_qualification: visible(settings.qualification),
        show_time: visible(settings.time),
        show_faults: visible(settings.faults),
    }
}

/// Short human-readable note for a gated field, or `None` when the timing
/// would not hide it right now. Branches mirror [`compute_visible_fields`].
pub fn availability_message(
    is_class_complete: bool,
    timing: VisibilityTiming,
) -> Option<&'static str> {
    match timing {
        VisibilityTiming::Immediate => None,
        VisibilityTiming::ClassComplete if is_class_complete => None,
        VisibilityTiming::ClassComplete => Some("Available when class completes"),
        VisibilityTiming::ManualRelease => Some("Pending release"),
    }
}

/// Hidden fields with their availability notes, for a results listing.
pub fn withheld_fields(
    settings: &VisibilitySettings,
    visible: &VisibleResultFields,
    is_class_complete: bool,
) -> Vec<WithheldField> {
    ResultField::all()
        .iter()
        .filter(|field| !visible.shows(**field))
        .map(|field| WithheldField {
            field: *field,
            message: availability_message(is_class_complete, settings.timing_for(*field))
                .unwrap_or("Not yet available")
                .to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory store with per-level rows and injectable failures.
    #[derive(Default)]
    struct MockStore {
        class: Option<VisibilityOverride>,
        trial: Option<VisibilityOverride>,
        show: Option<VisibilityOverride>,
        fail_class: bool,
        fail_trial: bool,
        fail_show: bool,
    }

    #[async_trait]
    impl VisibilityStore for MockStore {
        async fn class_override(
            &self,
            _class_id: Uuid,
        ) -> Result<Option<VisibilityOverride>, sqlx::Error> {
            if self.fail_class {
                return Err(sqlx::Error::PoolClosed);
            }
            Ok(self.class.clone())
        }

        async fn trial_override(
            &self,
            _trial_id: Uuid,
        ) -> Result<Option<VisibilityOverride>, sqlx::Error> {
            if self.fail_trial {
                return Err(sqlx::Error::PoolClosed);
            }
            Ok(self.trial.clone())
        }

        async fn show_default(
            &self,
            _show_key: &str,
        ) -> Result<Option<VisibilityOverride>, sqlx::Error> {
            if self.fail_show {
                return Err(sqlx::Error::PoolClosed);
            }
            Ok(self.show.clone())
        }
    }

    async fn resolve(store: &MockStore) -> VisibilitySettings {
        resolve_class_visibility(store, Uuid::new_v4(), Uuid::new_v4(), "NW-202405").await
    }

    #[tokio::test]
    async fn test_class_override_short_circuits_broader_levels() {
        let store = MockStore {
            class: Some(VisibilityOverride::from_preset(VisibilityPreset::Open)),
            trial: Some(VisibilityOverride::from_preset(VisibilityPreset::Review)),
            show: Some(VisibilityOverride::from_preset(VisibilityPreset::Review)),
            ..Default::default()
        };

        let settings = resolve(&store).await;
        assert_eq!(settings.inherited_from, PrecedenceLevel::Class);
        assert_eq!(settings.preset, Some(VisibilityPreset::Open));
        assert_eq!(settings.time, VisibilityTiming::Immediate);
    }

    #[tokio::test]
    async fn test_trial_override_wins_over_show_default() {
        let store = MockStore {
            trial: Some(VisibilityOverride::from_preset(VisibilityPreset::Review)),
            show: Some(VisibilityOverride::from_preset(VisibilityPreset::Open)),
            ..Default::default()
        };

        let settings = resolve(&store).await;
        assert_eq!(settings.inherited_from, PrecedenceLevel::Trial);
        assert_eq!(settings.preset, Some(VisibilityPreset::Review));
        assert_eq!(settings.qualification, VisibilityTiming::ManualRelease);
    }

    #[tokio::test]
    async fn test_show_default_applies_when_no_narrower_row() {
        let store = MockStore {
            show: Some(VisibilityOverride::from_preset(VisibilityPreset::Open)),
            ..Default::default()
        };

        let settings = resolve(&store).await;
        assert_eq!(settings.inherited_from, PrecedenceLevel::Show);
        assert_eq!(settings.preset, Some(VisibilityPreset::Open));
    }

    #[tokio::test]
    async fn test_nothing_configured_falls_back_to_standard_at_show() {
        let settings = resolve(&MockStore::default()).await;
        assert_eq!(settings.inherited_from, PrecedenceLevel::Show);
        assert_eq!(settings.preset, Some(VisibilityPreset::Standard));
        assert_eq!(settings.placement, VisibilityTiming::ClassComplete);
        assert_eq!(settings.qualification, VisibilityTiming::Immediate);
    }

    #[tokio::test]
    async fn test_failed_class_read_falls_through_to_trial() {
        let store = MockStore {
            fail_class: true,
            trial: Some(VisibilityOverride::from_preset(VisibilityPreset::Review)),
            ..Default::default()
        };

        let settings = resolve(&store).await;
        assert_eq!(settings.inherited_from, PrecedenceLevel::Trial);
        assert_eq!(settings.preset, Some(VisibilityPreset::Review));
    }

    #[tokio::test]
    async fn test_all_reads_failing_degrades_to_standard() {
        let store = MockStore {
            fail_class: true,
            fail_trial: true,
            fail_show: true,
            class: Some(VisibilityOverride::from_preset(VisibilityPreset::Review)),
            ..Default::default()
        };

        let settings = resolve(&store).await;
        assert_eq!(settings.preset, Some(VisibilityPreset::Standard));
        assert_eq!(settings.inherited_from, PrecedenceLevel::Show);
    }

    #[test]
    fn test_granular_override_merges_with_preset_in_same_row() {
        let row = VisibilityOverride {
            preset: Some(VisibilityPreset::Standard),
            time_timing: Some(VisibilityTiming::Immediate),
            ..Default::default()
        };

        let settings = resolve_override(&row, PrecedenceLevel::Class);
        assert_eq!(settings.time, VisibilityTiming::Immediate);
        // The remaining fields keep the standard preset's values.
        assert_eq!(settings.placement, VisibilityTiming::ClassComplete);
        assert_eq!(settings.qualification, VisibilityTiming::Immediate);
        assert_eq!(settings.faults, VisibilityTiming::ClassComplete);
        assert_eq!(settings.preset, Some(VisibilityPreset::Standard));
    }

    #[test]
    fn test_granular_only_row_gets_safe_defaults() {
        let row = VisibilityOverride {
            faults_timing: Some(VisibilityTiming::ManualRelease),
            ..Default::default()
        };

        let settings = resolve_override(&row, PrecedenceLevel::Trial);
        assert_eq!(settings.faults, VisibilityTiming::ManualRelease);
        assert_eq!(settings.placement, VisibilityTiming::ClassComplete);
        assert_eq!(settings.qualification, VisibilityTiming::Immediate);
        assert_eq!(settings.time, VisibilityTiming::ClassComplete);
        assert_eq!(settings.preset, None);
        assert_eq!(settings.inherited_from, PrecedenceLevel::Trial);
    }

    #[test]
    fn test_persisted_immediate_placement_is_coerced() {
        let row = VisibilityOverride {
            preset: Some(VisibilityPreset::Open),
            placement_timing: Some(VisibilityTiming::Immediate),
            ..Default::default()
        };

        let settings = resolve_override(&row, PrecedenceLevel::Class);
        assert_eq!(settings.placement, VisibilityTiming::ClassComplete);
    }

    #[test]
    fn test_officials_bypass_every_gate() {
        let settings =
            VisibilitySettings::from_preset(VisibilityPreset::Review, PrecedenceLevel::Class);

        for role in [UserRole::Admin, UserRole::Judge] {
            for complete in [false, true] {
                let fields = compute_visible_fields(&settings, role, complete, None);
                assert_eq!(fields, VisibleResultFields::all_visible());
            }
        }
    }

    #[test]
    fn test_class_complete_gate() {
        let settings =
            VisibilitySettings::from_preset(VisibilityPreset::Standard, PrecedenceLevel::Show);

        let hidden = compute_visible_fields(&settings, UserRole::Exhibitor, false, None);
        assert!(!hidden.show_placement);
        assert!(!hidden.show_time);
        assert!(!hidden.show_faults);
        assert!(hidden.show_qualification);

        let shown = compute_visible_fields(&settings, UserRole::Exhibitor, true, None);
        assert_eq!(shown, VisibleResultFields::all_visible());
    }

    #[test]
    fn test_manual_release_gate() {
        let settings =
            VisibilitySettings::from_preset(VisibilityPreset::Review, PrecedenceLevel::Show);

        let before = compute_visible_fields(&settings, UserRole::Exhibitor, true, None);
        assert!(!before.show_placement);
        assert!(!before.show_qualification);
        assert!(!before.show_time);
        assert!(!before.show_faults);

        let released_at = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let after =
            compute_visible_fields(&settings, UserRole::Exhibitor, false, Some(released_at));
        assert_eq!(after, VisibleResultFields::all_visible());
    }

    #[test]
    fn test_immediate_timing_ignores_gate_inputs() {
        let settings =
            VisibilitySettings::from_preset(VisibilityPreset::Open, PrecedenceLevel::Show);

        let fields = compute_visible_fields(&settings, UserRole::Steward, false, None);
        assert!(fields.show_qualification);
        assert!(fields.show_time);
        assert!(fields.show_faults);
        assert!(!fields.show_placement);
    }

    #[test]
    fn test_availability_messages() {
        assert_eq!(availability_message(false, VisibilityTiming::Immediate), None);
        assert_eq!(
            availability_message(false, VisibilityTiming::ClassComplete),
            Some("Available when class completes")
        );
        assert_eq!(availability_message(true, VisibilityTiming::ClassComplete), None);
        assert_eq!(
            availability_message(true, VisibilityTiming::ManualRelease),
            Some("Pending release")
        );
    }

    #[test]
    fn test_withheld_fields_lists_only_hidden_ones() {
        let settings =
            VisibilitySettings::from_preset(VisibilityPreset::Standard, PrecedenceLevel::Show);
        let visible = compute_visible_fields(&settings, UserRole::Exhibitor, false, None);

        let withheld = withheld_fields(&settings, &visible, false);
        let fields: Vec<ResultField> = withheld.iter().map(|w| w.field).collect();
        assert_eq!(
            fields,
            vec![ResultField::Placement, ResultField::Time, ResultField::Faults]
        );
        assert!(withheld
            .iter()
            .all(|w| w.message == "Available when class completes"));
    }

    #[test]
    fn test_withheld_fields_empty_for_officials() {
        let settings =
            VisibilitySettings::from_preset(VisibilityPreset::Review, PrecedenceLevel::Show);
        let visible = compute_visible_fields(&settings, UserRole::Admin, false, None);
        assert!(withheld_fields(&settings, &visible, false).is_empty());
    }

    #[test]
    fn test_granular_defaults_pin_the_safe_values() {
        assert_eq!(GRANULAR_DEFAULTS.placement, VisibilityTiming::ClassComplete);
        assert_eq!(GRANULAR_DEFAULTS.qualification, VisibilityTiming::Immediate);
        assert_eq!(GRANULAR_DEFAULTS.time, VisibilityTiming::ClassComplete);
        assert_eq!(GRANULAR_DEFAULTS.faults, VisibilityTiming::ClassComplete);
    }
}
