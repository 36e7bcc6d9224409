//! Error types for event construction, registration and decoding.

use std::fmt;

use thiserror::Error;

/// The rule a field value broke.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constraint {
    /// String length outside its bounds.
    Length,
    /// Number outside its bounds.
    Range,
    /// String empty or whitespace only.
    NotBlank,
    /// Timestamp later than the wall clock.
    NotInFuture,
    /// Floating point value is NaN or infinite.
    Finite,
    /// Value is not one of an enumerated set.
    OneOf,
    /// `newLevel` does not exceed `oldLevel`.
    LevelOrder,
    /// Any other rule code.
    Other(String),
}

impl Constraint {
    /// Maps a rule code to its constraint.
    pub fn from_code(code: &str) -> Self {
        match code {
            "length" => Constraint::Length,
            "range" => Constraint::Range,
            "not_blank" => Constraint::NotBlank,
            "not_in_future" => Constraint::NotInFuture,
            "finite" => Constraint::Finite,
            "one_of" => Constraint::OneOf,
            "level_order" => Constraint::LevelOrder,
            other => Constraint::Other(other.to_string()),
        }
    }

    /// Returns the rule code.
    pub fn code(&self) -> &str {
        match self {
            Constraint::Length => "length",
            Constraint::Range => "range",
            Constraint::NotBlank => "not_blank",
            Constraint::NotInFuture => "not_in_future",
            Constraint::Finite => "finite",
            Constraint::OneOf => "one_of",
            Constraint::LevelOrder => "level_order",
            Constraint::Other(code) => code,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single broken rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldViolation {
    /// Wire name of the field (e.g. `taskId`).
    pub field: String,
    pub constraint: Constraint,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.field, self.constraint)
    }
}

/// An event could not be constructed because one or more fields are invalid.
///
/// Always holds at least one violation. Violations are sorted by field name,
/// so the same input yields the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Creates an error with a single violation.
    pub fn single(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                constraint,
            }],
        }
    }

    /// Creates an error from a list of violations.
    ///
    /// Returns `None` when the list is empty.
    pub fn from_violations(mut violations: Vec<FieldViolation>) -> Option<Self> {
        if violations.is_empty() {
            return None;
        }
        violations.sort();
        violations.dedup();
        Some(Self { violations })
    }

    /// Wire name of the first offending field.
    pub fn field(&self) -> &str {
        &self.violations[0].field
    }

    /// Constraint broken by the first offending field.
    pub fn constraint(&self) -> &Constraint {
        &self.violations[0].constraint
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns true if `field` broke `constraint`.
    pub fn has_violation(&self, field: &str, constraint: &Constraint) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && &v.constraint == constraint)
    }

    pub(crate) fn merge(mut self, other: ValidationError) -> Self {
        self.violations.extend(other.violations);
        self.violations.sort();
        self.violations.dedup();
        self
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while building the discriminator registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two entries share a discriminator.
    #[error("discriminator registered twice: {0}")]
    DuplicateDiscriminator(String),

    /// An entry's key disagrees with the discriminator its variant reports.
    #[error("discriminator mismatch: registered as '{key}', variant reports '{declared}'")]
    MismatchedDiscriminator { key: String, declared: &'static str },
}

/// Errors that can occur when decoding a wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload has no `type` key.
    #[error("missing event type discriminator")]
    MissingDiscriminator,

    /// The `type` key names no registered variant.
    #[error("unknown event type: {0}")]
    UnknownDiscriminator(String),

    /// A field is present but cannot be parsed into its declared type.
    #[error("malformed field '{field}': {reason}")]
    MalformedField { field: String, reason: String },

    /// A required field is absent or null.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// The payload is valid JSON but not an object.
    #[error("event payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The payload text is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// All fields parsed but the event breaks a construction rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The discriminator registry could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl DecodeError {
    /// Returns true if decoding stopped at the discriminator.
    pub fn is_discriminator_error(&self) -> bool {
        matches!(
            self,
            DecodeError::MissingDiscriminator | DecodeError::UnknownDiscriminator(_)
        ) || matches!(
            self,
            DecodeError::MalformedField { field, .. } if field == crate::fields::TYPE
        )
    }

    /// Returns the validation error, if decoding failed on a construction rule.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            DecodeError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::InvalidJson(err.to_string())
    }
}

/// Serialization error while encoding an event.
#[derive(Debug, Error)]
#[error("failed to encode event: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_code_roundtrip() {
        for constraint in [
            Constraint::Length,
            Constraint::Range,
            Constraint::NotBlank,
            Constraint::NotInFuture,
            Constraint::Finite,
            Constraint::OneOf,
            Constraint::LevelOrder,
        ] {
            assert_eq!(Constraint::from_code(constraint.code()), constraint);
        }
        assert_eq!(
            Constraint::from_code("email"),
            Constraint::Other("email".to_string())
        );
    }

    #[test]
    fn test_violations_sorted_and_deduplicated() {
        let err = ValidationError::from_violations(vec![
            FieldViolation {
                field: "userId".to_string(),
                constraint: Constraint::NotBlank,
            },
            FieldViolation {
                field: "taskId".to_string(),
                constraint: Constraint::Length,
            },
            FieldViolation {
                field: "userId".to_string(),
                constraint: Constraint::NotBlank,
            },
        ])
        .unwrap();

        assert_eq!(err.violations().len(), 2);
        assert_eq!(err.field(), "taskId");
        assert_eq!(err.constraint(), &Constraint::Length);
        assert!(err.has_violation("userId", &Constraint::NotBlank));
    }

    #[test]
    fn test_empty_violations_is_not_an_error() {
        assert!(ValidationError::from_violations(Vec::new()).is_none());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::single("score", Constraint::Range);
        assert_eq!(err.to_string(), "validation failed: score (range)");
    }

    #[test]
    fn test_discriminator_errors() {
        assert!(DecodeError::MissingDiscriminator.is_discriminator_error());
        assert!(DecodeError::UnknownDiscriminator("X".into()).is_discriminator_error());
        assert!(!DecodeError::MissingField("userId".into()).is_discriminator_error());
    }
}
