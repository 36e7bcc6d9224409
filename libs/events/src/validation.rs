//! Construction-time validation.
//!
//! Field rules are declared on the event structs with `#[derive(Validate)]`.
//! Rules the derive cannot express (cross-field ordering, finiteness) are
//! checked by hand and merged into the same pass, so a caller always sees
//! every violation at once.

use chrono::{Local, NaiveDateTime};
use validator::{Validate, ValidationErrors};

use crate::envelope::EventVariant;
use crate::error::{Constraint, FieldViolation, ValidationError};

/// Rejects strings that are empty or whitespace only.
pub(crate) fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_blank"));
    }
    Ok(())
}

/// Rejects timestamps later than the local wall clock.
pub(crate) fn not_in_future(value: &NaiveDateTime) -> Result<(), validator::ValidationError> {
    if *value > Local::now().naive_local() {
        return Err(validator::ValidationError::new("not_in_future"));
    }
    Ok(())
}

/// Converts a Rust field name (`new_total_balance`) to its wire name
/// (`newTotalBalance`).
pub(crate) fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Accumulates violations during a single validation pass.
#[derive(Debug, Default)]
pub(crate) struct Violations(Vec<FieldViolation>);

impl Violations {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds every field error reported by the derive.
    pub(crate) fn collect(&mut self, result: Result<(), ValidationErrors>) {
        let Err(errors) = result else {
            return;
        };
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                self.0.push(FieldViolation {
                    field: wire_name(&field),
                    constraint: Constraint::from_code(&error.code),
                });
            }
        }
    }

    /// Records a violation unless `ok` holds.
    pub(crate) fn check(&mut self, ok: bool, field: &str, constraint: Constraint) {
        if !ok {
            self.0.push(FieldViolation {
                field: field.to_string(),
                constraint,
            });
        }
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        match ValidationError::from_violations(self.0) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Runs the envelope rules, the variant's declared rules and `extra`, then
/// returns the event only if nothing was violated.
pub(crate) fn validated<V>(
    event: V,
    extra: impl FnOnce(&V, &mut Violations),
) -> Result<V, ValidationError>
where
    V: EventVariant + Validate,
{
    let mut violations = Violations::new();
    violations.collect(event.envelope().validate());
    violations.collect(event.validate());
    extra(&event, &mut violations);
    violations.finish()?;
    Ok(event)
}
