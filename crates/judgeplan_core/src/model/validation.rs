//! Input validation for roster records.
//!
//! # Responsibility
//! - Normalize user-entered names and emails before persistence.
//! - Reject inputs that would break engine invariants.
//!
//! # Invariants
//! - Validation never touches storage.

use crate::model::category::{CategoryId, CategoryType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Rejected roster input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterValidationError {
    /// Name is blank after trim.
    BlankName(&'static str),
    /// Email does not look like `local@domain.tld`.
    InvalidEmail(String),
    /// Only the reserved category may have type `general`.
    ReservedGeneralCategory,
    /// The reserved General category cannot be retyped or deleted.
    GeneralCategoryImmutable(CategoryId),
}

impl Display for RosterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(field) => write!(f, "{field} must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::ReservedGeneralCategory => write!(
                f,
                "category type `{}` is reserved for the built-in General category",
                CategoryType::General.as_str()
            ),
            Self::GeneralCategoryImmutable(id) => {
                write!(f, "General category {id} cannot be retyped or deleted")
            }
        }
    }
}

impl Error for RosterValidationError {}

/// Trims a display name, rejecting blank values.
pub fn normalize_name(field: &'static str, value: &str) -> Result<String, RosterValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RosterValidationError::BlankName(field));
    }
    Ok(trimmed.to_string())
}

/// Trims and lowercases an email address, rejecting malformed values.
pub fn normalize_email(value: &str) -> Result<String, RosterValidationError> {
    let normalized = value.trim().to_ascii_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(RosterValidationError::InvalidEmail(value.trim().to_string()));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, normalize_name, RosterValidationError};

    #[test]
    fn normalize_name_trims_and_rejects_blank() {
        assert_eq!(normalize_name("judge name", "  Ada ").unwrap(), "Ada");
        assert_eq!(
            normalize_name("judge name", "   ").unwrap_err(),
            RosterValidationError::BlankName("judge name")
        );
    }

    #[test]
    fn normalize_email_lowercases_valid_addresses() {
        assert_eq!(
            normalize_email(" Ada@Example.ORG ").unwrap(),
            "ada@example.org"
        );
    }

    #[test]
    fn normalize_email_rejects_malformed_addresses() {
        for bad in ["", "ada", "ada@", "ada@example", "a da@example.org"] {
            assert!(
                matches!(normalize_email(bad), Err(RosterValidationError::InvalidEmail(_))),
                "`{bad}` should be rejected"
            );
        }
    }
}
