//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum armband number assignable within a single show.
const MAX_ARMBAND: i32 = 9999;

/// Maximum plausible search time in seconds (one hour).
const MAX_SEARCH_TIME_SECS: f64 = 3600.0;

lazy_static! {
    /// Show license keys look like `NW-202405` or `AKC-1042`:
    /// an uppercase organization prefix, a dash, and a numeric serial.
    static ref SHOW_KEY_RE: Regex =
        Regex::new(r"^[A-Z]{2,5}-\d{4,8}$").expect("valid show key regex");
}

/// Validates a show license key against the expected format.
pub fn validate_show_key(key: &str) -> Result<(), ValidationError> {
    if SHOW_KEY_RE.is_match(key) {
        Ok(())
    } else {
        let mut err = ValidationError::new("show_key_format");
        err.message = Some("Show key must match PREFIX-SERIAL (e.g. NW-202405)".into());
        Err(err)
    }
}

/// Validates that an armband number is within the assignable range.
pub fn validate_armband(armband: i32) -> Result<(), ValidationError> {
    if (1..=MAX_ARMBAND).contains(&armband) {
        Ok(())
    } else {
        let mut err = ValidationError::new("armband_range");
        err.message = Some("Armband must be between 1 and 9999".into());
        Err(err)
    }
}

/// Validates that a recorded search time is plausible.
pub fn validate_search_time(seconds: f64) -> Result<(), ValidationError> {
    if (0.0..=MAX_SEARCH_TIME_SECS).contains(&seconds) {
        Ok(())
    } else {
        let mut err = ValidationError::new("search_time_range");
        err.message = Some("Search time must be between 0 and 3600 seconds".into());
        Err(err)
    }
}

/// Validates that a fault count is non-negative.
pub fn validate_fault_count(faults: i32) -> Result<(), ValidationError> {
    if faults >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("fault_count_range");
        err.message = Some("Fault count must be non-negative".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_show_key_accepts_expected_formats() {
        assert!(validate_show_key("NW-202405").is_ok());
        assert!(validate_show_key("AKC-1042").is_ok());
        assert!(validate_show_key("USDAA-20240501").is_ok());
    }

    #[test]
    fn test_validate_show_key_rejects_bad_formats() {
        assert!(validate_show_key("").is_err());
        assert!(validate_show_key("nw-202405").is_err());
        assert!(validate_show_key("NW202405").is_err());
        assert!(validate_show_key("NW-").is_err());
        assert!(validate_show_key("N-12345").is_err());
        assert!(validate_show_key("NW-202405-extra").is_err());
    }

    #[test]
    fn test_validate_armband_range() {
        assert!(validate_armband(1).is_ok());
        assert!(validate_armband(9999).is_ok());
        assert!(validate_armband(0).is_err());
        assert!(validate_armband(-5).is_err());
        assert!(validate_armband(10000).is_err());
    }

    #[test]
    fn test_validate_search_time_range() {
        assert!(validate_search_time(0.0).is_ok());
        assert!(validate_search_time(42.37).is_ok());
        assert!(validate_search_time(3600.0).is_ok());
        assert!(validate_search_time(-0.1).is_err());
        assert!(validate_search_time(3600.1).is_err());
    }

    #[test]
    fn test_validate_fault_count() {
        assert!(validate_fault_count(0).is_ok());
        assert!(validate_fault_count(3).is_ok());
        assert!(validate_fault_count(-1).is_err());
    }
}
