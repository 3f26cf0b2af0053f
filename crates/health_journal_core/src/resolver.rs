//! crates/health_journal_core/src/resolver.rs
//!
//! Turns raw user input into a stored value for any kind, driven only by the kind's
//! descriptor. Every call either yields a value inside the descriptor's domain or a
//! `ValidationError`; re-asking the user is left to the caller.

use crate::domain::{FieldValue, MetricKindDescriptor};

/// Why a piece of input was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("A value is required")]
    Blank,
    #[error("Please enter {expected}")]
    Malformed { expected: &'static str },
    #[error("Value must not be negative")]
    Negative,
    #[error("Value must be between {min} and {max}")]
    OutOfRange { min: i64, max: i64 },
}

/// Resolves `input` against `descriptor`.
///
/// Blank input (`None` or whitespace) falls back to `previous` when it fits the
/// descriptor, then to:
/// - `Counted`: the descriptor's own repeats/sets,
/// - `Numeric`: zero,
/// - `Boolean`: `default`, or `ValidationError::Blank` without one,
/// - `Scale`: `default` clamped into `min..=max`, or `ValidationError::Blank` without one.
pub fn resolve(
    descriptor: &MetricKindDescriptor,
    previous: Option<FieldValue>,
    input: Option<&str>,
    default: Option<FieldValue>,
) -> Result<FieldValue, ValidationError> {
    let input = input.map(str::trim).filter(|s| !s.is_empty());
    match input {
        Some(raw) => parse(descriptor, raw),
        None => fallback(descriptor, previous, default),
    }
}

fn parse(descriptor: &MetricKindDescriptor, raw: &str) -> Result<FieldValue, ValidationError> {
    match *descriptor {
        MetricKindDescriptor::Counted { .. } => {
            const EXPECTED: &str = "repeats and sets separated by a space, e.g. '10 1'";
            const MALFORMED: ValidationError = ValidationError::Malformed { expected: EXPECTED };
            let parts: Vec<&str> = raw.split_whitespace().collect();
            match parts.as_slice() {
                [repeats, sets] => Ok(FieldValue::Counted {
                    repeats: parse_count(repeats).ok_or(MALFORMED)?,
                    sets: parse_count(sets).ok_or(MALFORMED)?,
                }),
                _ => Err(MALFORMED),
            }
        }
        MetricKindDescriptor::Numeric { .. } => {
            let value: f64 = raw
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or(ValidationError::Malformed { expected: "a numeric value" })?;
            if value < 0.0 {
                return Err(ValidationError::Negative);
            }
            // Folds "-0" into 0.
            Ok(FieldValue::Number(value + 0.0))
        }
        MetricKindDescriptor::Boolean => match raw.to_lowercase().as_str() {
            "y" | "yes" => Ok(FieldValue::Flag(true)),
            "n" | "no" => Ok(FieldValue::Flag(false)),
            _ => Err(ValidationError::Malformed { expected: "yes or no" }),
        },
        MetricKindDescriptor::Scale { min, max } => {
            let value: i64 = raw
                .parse()
                .map_err(|_| ValidationError::Malformed { expected: "a whole number" })?;
            if (min..=max).contains(&value) {
                Ok(FieldValue::Level(value))
            } else {
                Err(ValidationError::OutOfRange { min, max })
            }
        }
    }
}

/// Digits only; signs and overflow are rejected.
fn parse_count(part: &str) -> Option<u32> {
    if part.chars().all(|c| c.is_ascii_digit()) {
        part.parse().ok()
    } else {
        None
    }
}

fn fallback(
    descriptor: &MetricKindDescriptor,
    previous: Option<FieldValue>,
    default: Option<FieldValue>,
) -> Result<FieldValue, ValidationError> {
    if let Some(previous) = previous.filter(|value| fits(descriptor, value)) {
        return Ok(previous);
    }
    match *descriptor {
        MetricKindDescriptor::Counted { repeats, sets } => {
            Ok(FieldValue::Counted { repeats, sets })
        }
        MetricKindDescriptor::Numeric { .. } => Ok(FieldValue::Number(0.0)),
        MetricKindDescriptor::Boolean => match default {
            Some(FieldValue::Flag(flag)) => Ok(FieldValue::Flag(flag)),
            _ => Err(ValidationError::Blank),
        },
        MetricKindDescriptor::Scale { min, max } => match default {
            Some(FieldValue::Level(level)) => Ok(FieldValue::Level(clamp_level(level, min, max))),
            _ => Err(ValidationError::Blank),
        },
    }
}

/// Clamps into `min..=max`; an inverted range yields `min`.
fn clamp_level(level: i64, min: i64, max: i64) -> i64 {
    if min >= max {
        min
    } else {
        level.clamp(min, max)
    }
}

/// Whether `value` lies in the domain of `descriptor`.
pub fn fits(descriptor: &MetricKindDescriptor, value: &FieldValue) -> bool {
    match (*descriptor, *value) {
        (MetricKindDescriptor::Counted { .. }, FieldValue::Counted { .. }) => true,
        (MetricKindDescriptor::Numeric { .. }, FieldValue::Number(n)) => n.is_finite() && n >= 0.0,
        (MetricKindDescriptor::Boolean, FieldValue::Flag(_)) => true,
        (MetricKindDescriptor::Scale { min, max }, FieldValue::Level(l)) => {
            (min..=max).contains(&l)
        }
        _ => false,
    }
}
