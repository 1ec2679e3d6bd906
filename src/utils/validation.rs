//! Input validation helpers
//!
//! Request-level checks shared by the services. Every failure is an
//! `AppError::Validation`, which renders as a 400.

use crate::utils::error::{AppError, Result};
use chrono::{DateTime, Utc};
use regex::Regex;

/// Validation utilities for user-provided fields
pub struct Validator;

impl Validator {
    /// Display names: 2 to 50 characters after trimming
    pub fn validate_name(name: &str) -> Result<()> {
        let len = name.trim().chars().count();
        if len < 2 {
            return Err(AppError::validation("Name must be at least 2 characters"));
        }
        if len > 50 {
            return Err(AppError::validation("Name cannot exceed 50 characters"));
        }
        Ok(())
    }

    /// Email addresses: a local part, an `@`, and a dotted domain
    pub fn validate_email(email: &str) -> Result<()> {
        let email_regex = Regex::new(r"^\S+@\S+\.\S+$")
            .map_err(|e| AppError::Internal(format!("Regex error: {}", e)))?;

        if !email_regex.is_match(email.trim()) {
            return Err(AppError::validation("Please provide a valid email"));
        }
        Ok(())
    }

    /// Passwords need at least six characters
    pub fn validate_password(password: &str) -> Result<()> {
        if password.chars().count() < 6 {
            return Err(AppError::validation(
                "Password must be at least 6 characters",
            ));
        }
        Ok(())
    }

    /// Required free-text fields such as titles and workspace names
    pub fn validate_required(field: &str, value: &str, max_len: usize) -> Result<()> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation(format!("{} is required", field)));
        }
        if trimmed.chars().count() > max_len {
            return Err(AppError::validation(format!(
                "{} cannot exceed {} characters",
                field, max_len
            )));
        }
        Ok(())
    }

    /// Optional descriptions, capped at `max_len`
    pub fn validate_description(value: Option<&str>, max_len: usize) -> Result<()> {
        if let Some(value) = value {
            if value.chars().count() > max_len {
                return Err(AppError::validation(format!(
                    "Description cannot exceed {} characters",
                    max_len
                )));
            }
        }
        Ok(())
    }

    /// `#RRGGBB` or `#RGB`
    pub fn validate_hex_color(color: &str) -> Result<()> {
        let color_regex = Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$")
            .map_err(|e| AppError::Internal(format!("Regex error: {}", e)))?;

        if !color_regex.is_match(color) {
            return Err(AppError::validation("Color must be a valid hex color"));
        }
        Ok(())
    }

    /// A schedule must not end before it starts
    pub fn validate_date_range(
        start: Option<DateTime<Utc>>,
        due: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if let (Some(start), Some(due)) = (start, due) {
            if start > due {
                return Err(AppError::validation(
                    "Start date must be before the due date",
                ));
            }
        }
        Ok(())
    }

    /// Lowercased, trimmed form used for storage and lookups
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_name() {
        assert!(Validator::validate_name("Al").is_ok());
        assert!(Validator::validate_name(" A ").is_err());
        assert!(Validator::validate_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(Validator::validate_email("ada@example.com").is_ok());
        assert!(Validator::validate_email("ada@example").is_err());
        assert!(Validator::validate_email("ada example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(Validator::validate_password("secret").is_ok());
        assert!(Validator::validate_password("short").is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(Validator::validate_hex_color("#6366F1").is_ok());
        assert!(Validator::validate_hex_color("#abc").is_ok());
        assert!(Validator::validate_hex_color("6366F1").is_err());
        assert!(Validator::validate_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let now = Utc::now();
        assert!(Validator::validate_date_range(Some(now), Some(now + Duration::days(1))).is_ok());
        assert!(Validator::validate_date_range(Some(now), None).is_ok());
        assert!(Validator::validate_date_range(Some(now + Duration::days(1)), Some(now)).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(Validator::normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
