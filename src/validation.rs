use thiserror::Error;

/// Input rejected before any computation; always names the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

pub(crate) fn in_range(
    field: &'static str,
    value: f64,
    ok: bool,
    expected: &'static str,
) -> Result<f64, ValidationError> {
    finite(field, value)?;
    if ok {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}
