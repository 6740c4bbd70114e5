//! Payload validation for catalog writes.
//!
//! Create and update payloads implement [`Validatable`]; services call it on the
//! final record (after an update has been merged) so rules that span fields, such as
//! "prescription products carry no stock", see consistent values. All failures are
//! collected and reported together.

use serde::Serialize;
use std::fmt;

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a single check, if any.
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trait for payloads that can be validated before they reach the database.
pub trait Validatable {
    /// # Errors
    ///
    /// Returns every rule the value breaks.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Helper validators for common patterns
pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// Column width used for every name column.
    pub const MAX_NAME_LENGTH: usize = 255;

    /// Validate value is not blank
    ///
    /// # Errors
    ///
    /// Fails when the value is empty or whitespace only.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "This field is required"));
        }
        Ok(())
    }

    /// Validate string length is at most `max` characters
    ///
    /// # Errors
    ///
    /// Fails when the value is longer than `max`.
    pub fn validate_max_length(
        field: &str,
        value: &str,
        max: usize,
    ) -> Result<(), ValidationError> {
        if value.chars().count() > max {
            return Err(ValidationError::new(
                field,
                format!("Must be at most {max} characters"),
            ));
        }
        Ok(())
    }

    /// Validate a required, bounded name
    ///
    /// # Errors
    ///
    /// Fails when the name is blank or too long.
    pub fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
        validate_required(field, value)?;
        validate_max_length(field, value, MAX_NAME_LENGTH)
    }

    /// Validate `value > bound`
    ///
    /// # Errors
    ///
    /// Fails when the value is less than or equal to `bound`.
    pub fn validate_greater_than<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        bound: T,
    ) -> Result<(), ValidationError> {
        if value <= bound {
            return Err(ValidationError::new(
                field,
                format!("Must be greater than {bound}"),
            ));
        }
        Ok(())
    }

    /// Validate `value >= min`
    ///
    /// # Errors
    ///
    /// Fails when the value is below `min`.
    pub fn validate_at_least<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: T,
    ) -> Result<(), ValidationError> {
        if value < min {
            return Err(ValidationError::new(field, format!("Must be at least {min}")));
        }
        Ok(())
    }
}
