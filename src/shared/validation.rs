use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Share link access codes: exactly six digits
    /// - Valid: "000123", "987654"
    /// - Invalid: "12345", "1234567", "12a456", " 12345"
    pub static ref ACCESS_CODE_REGEX: Regex = Regex::new(r"^[0-9]{6}$").unwrap();

    /// Phone numbers: optional leading +, digits, spaces, dots and hyphens
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 .\-]{5,19}$").unwrap();
}

/// Permission levels accepted on shares and share links
pub const PERMISSION_LEVELS: &[&str] = &["read", "edit"];

pub fn validate_permission_level(value: &str) -> Result<(), ValidationError> {
    if PERMISSION_LEVELS.contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("permission_level");
        err.message = Some("permission_level must be 'read' or 'edit'".into());
        Err(err)
    }
}

pub fn validate_future_datetime(value: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *value > Utc::now() {
        Ok(())
    } else {
        let mut err = ValidationError::new("future_datetime");
        err.message = Some("expires_at must be in the future".into());
        Err(err)
    }
}

pub fn validate_role(value: i16) -> Result<(), ValidationError> {
    if value == 0 || value == 1 {
        Ok(())
    } else {
        let mut err = ValidationError::new("role");
        err.message = Some("role must be 0 (user) or 1 (admin)".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_access_code_regex_valid() {
        assert!(ACCESS_CODE_REGEX.is_match("000123"));
        assert!(ACCESS_CODE_REGEX.is_match("987654"));
    }

    #[test]
    fn test_access_code_regex_invalid() {
        assert!(!ACCESS_CODE_REGEX.is_match("12345")); // too short
        assert!(!ACCESS_CODE_REGEX.is_match("1234567")); // too long
        assert!(!ACCESS_CODE_REGEX.is_match("12a456")); // letter
        assert!(!ACCESS_CODE_REGEX.is_match(" 12345")); // space
        assert!(!ACCESS_CODE_REGEX.is_match(""));
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("+225 07 08 09 10"));
        assert!(PHONE_REGEX.is_match("0102030405"));
        assert!(!PHONE_REGEX.is_match("call me"));
    }

    #[test]
    fn test_permission_level() {
        assert!(validate_permission_level("read").is_ok());
        assert!(validate_permission_level("edit").is_ok());
        assert!(validate_permission_level("admin").is_err());
        assert!(validate_permission_level("READ").is_err());
    }

    #[test]
    fn test_future_datetime() {
        assert!(validate_future_datetime(&(Utc::now() + Duration::hours(1))).is_ok());
        assert!(validate_future_datetime(&(Utc::now() - Duration::seconds(1))).is_err());
    }

    #[test]
    fn test_role() {
        assert!(validate_role(0).is_ok());
        assert!(validate_role(1).is_ok());
        assert!(validate_role(2).is_err());
    }
}
