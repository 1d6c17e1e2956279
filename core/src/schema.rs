//! Value schemas and the validation layer.
//!
//! Resolution only produces a raw value; deciding whether that value is
//! acceptable is the job of a [`Validator`]. Every descriptor exposes a
//! [`ValueSchema`] (see [`Argument::schema`](crate::Argument::schema)) and
//! `ValueSchema` itself implements `Validator`, performing type checks,
//! required/optional handling with defaults, literal matching, and
//! object unknown-key policies.
//!
//! # Examples
//!
//! ```
//! use argz_core::{ValueSchema, Validator};
//! use serde_json::json;
//!
//! let schema = ValueSchema::number().with_default(json!(8080));
//! assert_eq!(schema.validate(None), Ok(Some(json!(8080))));
//! assert!(schema.validate(Some(json!("eighty"))).is_err());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::issue::{Issue, IssueCode, PathKey};

/// How an object treats keys that its shape does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Unknown flags are reported; unknown JSON keys fail validation.
    #[default]
    Strict,
    /// Unknown flags are accepted and ignored; unknown JSON keys are dropped.
    Strip,
    /// Unknown flags become string values; unknown JSON keys are kept.
    Passthrough,
}

/// Shape of an expected value.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Anything, including absence.
    Any,
    /// A JSON string.
    String,
    /// A JSON boolean.
    Boolean,
    /// A JSON number.
    Number,
    /// Exactly this value.
    Literal(Value),
    /// An array whose items all match.
    Array(Box<ValueSchema>),
    /// An object with declared fields.
    Object {
        /// Declared fields, in declaration order.
        fields: Vec<(String, ValueSchema)>,
        /// Policy for undeclared keys when no catchall is set.
        unknown_keys: UnknownKeys,
        /// Schema applied to every undeclared key.
        catchall: Option<Box<ValueSchema>>,
    },
    /// The first matching option wins.
    Union(Vec<ValueSchema>),
    /// Nothing is accepted.
    Never,
}

/// A value schema plus its modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSchema {
    /// Expected shape.
    pub kind: SchemaKind,
    /// Whether absence is acceptable.
    pub optional: bool,
    /// Value substituted when absent.
    pub default: Option<Value>,
    /// Whether `null` is accepted as is.
    pub nullable: bool,
    /// Value substituted when checking fails; its issues are discarded.
    pub catch: Option<Value>,
    /// Display name used in issue messages.
    pub label: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

impl ValueSchema {
    /// Creates a required schema of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            optional: false,
            default: None,
            nullable: false,
            catch: None,
            label: None,
            description: None,
        }
    }

    /// Accepts anything.
    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// Requires a string.
    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    /// Requires a boolean.
    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    /// Requires a number.
    pub fn number() -> Self {
        Self::new(SchemaKind::Number)
    }

    /// Requires exactly `value`.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Literal(value.into()))
    }

    /// Requires an array of `items`.
    pub fn array(items: ValueSchema) -> Self {
        Self::new(SchemaKind::Array(Box::new(items)))
    }

    /// Rejects everything.
    pub fn never() -> Self {
        Self::new(SchemaKind::Never)
    }

    /// Marks the schema optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Substitutes `value` when absent.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Accepts `null` in addition to the kind.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Substitutes `value` whenever checking fails.
    pub fn with_catch(mut self, value: impl Into<Value>) -> Self {
        self.catch = Some(value.into());
        self
    }

    /// Sets the display name used in messages.
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn subject(&self) -> String {
        match &self.label {
            Some(label) => format!("`{label}`"),
            None => "value".to_string(),
        }
    }

    fn check(
        &self,
        value: Option<Value>,
        path: &mut Vec<PathKey>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        if self.nullable && value == Some(Value::Null) {
            return Some(Value::Null);
        }
        let Some(catch) = &self.catch else {
            return self.check_kind(value, path, issues);
        };

        let mut local = Vec::new();
        let checked = self.check_kind(value, path, &mut local);
        if local.is_empty() {
            checked
        } else {
            Some(catch.clone())
        }
    }

    fn check_kind(
        &self,
        value: Option<Value>,
        path: &mut Vec<PathKey>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        let Some(value) = value else {
            if let Some(default) = &self.default {
                return Some(default.clone());
            }
            if !self.optional && self.kind != SchemaKind::Any {
                issues.push(Issue::new(
                    path.clone(),
                    IssueCode::Required,
                    format!("{} is required", self.subject()),
                ));
            }
            return None;
        };

        match &self.kind {
            SchemaKind::Any => Some(value),
            SchemaKind::String => self.expect_type(value, Value::is_string, "string", path, issues),
            SchemaKind::Boolean => {
                self.expect_type(value, Value::is_boolean, "boolean", path, issues)
            }
            SchemaKind::Number => self.expect_type(value, Value::is_number, "number", path, issues),
            SchemaKind::Literal(expected) => {
                if &value == expected {
                    Some(value)
                } else {
                    issues.push(Issue::new(
                        path.clone(),
                        IssueCode::InvalidLiteral,
                        format!("{} must be {expected}, got {value}", self.subject()),
                    ));
                    None
                }
            }
            SchemaKind::Array(items) => match value {
                Value::Array(values) => {
                    let mut out = Vec::with_capacity(values.len());
                    for (index, item) in values.into_iter().enumerate() {
                        path.push(PathKey::Index(index));
                        out.push(items.check(Some(item), path, issues).unwrap_or(Value::Null));
                        path.pop();
                    }
                    Some(Value::Array(out))
                }
                other => self.type_mismatch(&other, "array", path, issues),
            },
            SchemaKind::Object {
                fields,
                unknown_keys,
                catchall,
            } => match value {
                Value::Object(mut map) => {
                    let mut out = Map::new();
                    for (key, schema) in fields {
                        path.push(PathKey::Key(key.clone()));
                        if let Some(checked) = schema.check(map.remove(key), path, issues) {
                            out.insert(key.clone(), checked);
                        }
                        path.pop();
                    }

                    for (key, extra) in map {
                        path.push(PathKey::Key(key.clone()));
                        if let Some(catchall) = catchall {
                            if let Some(checked) = catchall.check(Some(extra), path, issues) {
                                out.insert(key, checked);
                            }
                        } else {
                            match unknown_keys {
                                UnknownKeys::Strip => {}
                                UnknownKeys::Passthrough => {
                                    out.insert(key, extra);
                                }
                                UnknownKeys::Strict => issues.push(Issue::new(
                                    path.clone(),
                                    IssueCode::UnrecognizedKey,
                                    format!("unrecognized key `{key}`"),
                                )),
                            }
                        }
                        path.pop();
                    }

                    Some(Value::Object(out))
                }
                other => self.type_mismatch(&other, "object", path, issues),
            },
            SchemaKind::Union(options) => {
                for option in options {
                    let mut local = Vec::new();
                    let checked = option.check(Some(value.clone()), path, &mut local);
                    if local.is_empty() {
                        return checked;
                    }
                }
                issues.push(Issue::new(
                    path.clone(),
                    IssueCode::InvalidUnion,
                    format!(
                        "{} matches none of the {} allowed options",
                        self.subject(),
                        options.len()
                    ),
                ));
                None
            }
            SchemaKind::Never => {
                issues.push(Issue::new(
                    path.clone(),
                    IssueCode::InvalidType,
                    format!("{} is not allowed", self.subject()),
                ));
                None
            }
        }
    }

    fn expect_type(
        &self,
        value: Value,
        predicate: fn(&Value) -> bool,
        expected: &str,
        path: &[PathKey],
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        if predicate(&value) {
            Some(value)
        } else {
            self.type_mismatch(&value, expected, path, issues)
        }
    }

    fn type_mismatch(
        &self,
        value: &Value,
        expected: &str,
        path: &[PathKey],
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        issues.push(Issue::new(
            path.to_vec(),
            IssueCode::InvalidType,
            format!("{} must be a {expected}, got {}", self.subject(), type_name(value)),
        ));
        None
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Final checking/refinement of an assembled raw value.
pub trait Validator {
    /// Validates `value` (`None` when nothing was assembled).
    ///
    /// # Errors
    ///
    /// Returns every issue found; implementations should not stop at the
    /// first one.
    fn validate(&self, value: Option<Value>) -> Result<Option<Value>, Vec<Issue>>;
}

impl Validator for ValueSchema {
    fn validate(&self, value: Option<Value>) -> Result<Option<Value>, Vec<Issue>> {
        let mut issues = Vec::new();
        let checked = self.check(value, &mut Vec::new(), &mut issues);
        if issues.is_empty() {
            Ok(checked)
        } else {
            Err(issues)
        }
    }
}
