//! Conversion of raw argv strings into values.
//!
//! A [`Castable`] node turns `Some(raw)` (the value given on the command
//! line) or `None` (the flag appeared without a value) into an optional JSON
//! value. Recoverable failures are reported as [`CastError`]s and surface as
//! issues; [`CastError::Internal`] marks a defect in the caster itself and
//! aborts the whole resolution.

use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};
use thiserror::Error;

use crate::schema::SchemaKind;

/// Errors produced while casting a raw value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    /// The raw value was rejected by the leaf.
    #[error("{message}")]
    Invalid {
        /// Human-readable rejection reason.
        message: String,
    },
    /// The leaf needs a value but none was supplied.
    #[error("a value is required")]
    Missing,
    /// Every option of a union rejected the value.
    #[error("none of the {} union options accepted the value", .0.len())]
    NoMatchingOption(Vec<CastError>),
    /// The caster itself misbehaved. Not recoverable.
    #[error("internal cast failure: {0}")]
    Internal(String),
}

impl CastError {
    /// Creates an [`Invalid`](CastError::Invalid) error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Whether this failure is a user input problem (as opposed to a defect).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// Result of [`Castable::try_cast`].
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    /// The value was accepted; `None` means "present, but nothing to assign".
    Success(Option<Value>),
    /// The value was rejected.
    Failure(CastError),
}

impl CastOutcome {
    /// Whether the cast succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// The castable capability facet.
pub trait Castable {
    /// Converts a raw value. `None` means the flag was given without a value.
    fn cast(&self, raw: Option<&str>) -> Result<Option<Value>, CastError>;

    /// Like [`cast`](Castable::cast), but boxes recoverable failures.
    ///
    /// # Errors
    ///
    /// Returns the error unchanged when it is not
    /// [recoverable](CastError::is_recoverable).
    fn try_cast(&self, raw: Option<&str>) -> Result<CastOutcome, CastError> {
        match self.cast(raw) {
            Ok(value) => Ok(CastOutcome::Success(value)),
            Err(err) if err.is_recoverable() => Ok(CastOutcome::Failure(err)),
            Err(err) => Err(err),
        }
    }
}

/// Signature of user-supplied casters.
pub type CastFn = dyn Fn(Option<&str>) -> Result<Option<Value>, CastError> + Send + Sync;

/// Built-in leaf conversions.
#[derive(Clone)]
pub enum LeafCaster {
    /// The raw string, unchanged. Requires a value.
    String,
    /// `"true"` / `"false"`; a bare flag means `true`.
    Boolean,
    /// Integer or finite float. Requires a value.
    Number,
    /// Any JSON document; a bare flag assigns nothing.
    Json,
    /// Accepts anything and assigns nothing.
    Ignore,
    /// A user-supplied conversion.
    Custom(Arc<CastFn>),
}

impl LeafCaster {
    /// The value schema this caster produces values for.
    pub fn schema_kind(&self) -> SchemaKind {
        match self {
            LeafCaster::String => SchemaKind::String,
            LeafCaster::Boolean => SchemaKind::Boolean,
            LeafCaster::Number => SchemaKind::Number,
            LeafCaster::Json | LeafCaster::Ignore | LeafCaster::Custom(_) => SchemaKind::Any,
        }
    }
}

impl fmt::Debug for LeafCaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafCaster::String => f.write_str("String"),
            LeafCaster::Boolean => f.write_str("Boolean"),
            LeafCaster::Number => f.write_str("Number"),
            LeafCaster::Json => f.write_str("Json"),
            LeafCaster::Ignore => f.write_str("Ignore"),
            LeafCaster::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Castable for LeafCaster {
    fn cast(&self, raw: Option<&str>) -> Result<Option<Value>, CastError> {
        match self {
            LeafCaster::String => raw
                .map(|raw| Some(Value::String(raw.to_string())))
                .ok_or(CastError::Missing),
            LeafCaster::Boolean => match raw {
                None | Some("true") => Ok(Some(Value::Bool(true))),
                Some("false") => Ok(Some(Value::Bool(false))),
                Some(other) => Err(CastError::invalid(format!(
                    "value \"{other}\" is not a boolean; expected \"true\" or \"false\""
                ))),
            },
            LeafCaster::Number => {
                let raw = raw.ok_or(CastError::Missing)?;
                cast_number(raw).map(Some)
            }
            LeafCaster::Json => raw.map(cast_json).transpose(),
            LeafCaster::Ignore => Ok(None),
            LeafCaster::Custom(func) => func(raw),
        }
    }
}

fn cast_number(raw: &str) -> Result<Value, CastError> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Value::from(int));
    }

    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| CastError::invalid(format!("value \"{raw}\" is not a finite number")))
}

/// Parses `raw` as a JSON document.
pub(crate) fn cast_json(raw: &str) -> Result<Value, CastError> {
    serde_json::from_str(raw)
        .map_err(|err| CastError::invalid(format!("cannot cast \"{raw}\" into JSON: {err}")))
}
