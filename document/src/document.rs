//! Serializable descriptor trees.
//!
//! An [`ArgumentDocument`] mirrors the [`Argument`] tree in a form that can be
//! written by hand in JSON or YAML. Every node carries a `type` tag.
//!
//! # Example YAML
//!
//! ```yaml
//! type: object
//! fields:
//!   verbose:
//!     type: boolean
//!     aliases: [v]
//!   output:
//!     type: string
//!     aliases: [o]
//!     default: out.txt
//!   level:
//!     type: string
//!     choices: [debug, info, warn]
//!     optional: true
//!   files:
//!     type: positional
//!   rest:
//!     type: bypassed
//! ```

use argz_core::{
    Argument, BypassedArgument, NamedArgument, ObjectArgument, PositionalArgument, SchemaKind,
    UnionArgument, UnknownKeys, ValueSchema,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocumentError, Result};

/// Modifiers shared by every node type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// The value may be absent.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    /// Value substituted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// `null` is accepted.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    /// Value substituted when validation fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch: Option<Value>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A flag leaf (`string`, `boolean`, `number`, `json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeafDocument {
    /// Explicit flag name; derived from the field key when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Additional flag names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Allowed values, checked by validation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    /// Shared modifiers.
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

/// A token collection (`positional`, `bypassed`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    /// Allowed tokens; any string when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Shared modifiers.
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

/// A group of named children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDocument {
    /// Explicit group name (enables `--name.child`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Additional group names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Children by key.
    #[serde(default)]
    pub fields: IndexMap<String, ArgumentDocument>,
    /// Handling of child names not in `fields`.
    #[serde(default)]
    pub unknown_keys: UnknownKeys,
    /// Node used for every unknown child name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catchall: Option<Box<ArgumentDocument>>,
    /// Shared modifiers.
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

/// Alternatives presented as one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnionDocument {
    /// Explicit name, answered to in addition to the options' names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Additional names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Options in priority order.
    pub options: Vec<ArgumentDocument>,
    /// Shared modifiers.
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

/// One node of a schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgumentDocument {
    /// String flag.
    String(LeafDocument),
    /// Boolean flag.
    Boolean(LeafDocument),
    /// Numeric flag.
    Number(LeafDocument),
    /// Flag taking a JSON document.
    Json(LeafDocument),
    /// Positional tokens.
    Positional(CollectionDocument),
    /// Tokens after `--`.
    Bypassed(CollectionDocument),
    /// Group of children.
    Object(ObjectDocument),
    /// Alternatives.
    Union(UnionDocument),
}

impl ArgumentDocument {
    /// Builds the descriptor tree.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidUnion`] when a union mixes
    /// incompatible options.
    ///
    /// # Examples
    ///
    /// ```
    /// use argz_core::ArgumentVector;
    /// use argz_document::ArgumentDocument;
    /// use serde_json::json;
    ///
    /// let document: ArgumentDocument = serde_json::from_value(json!({
    ///     "type": "object",
    ///     "fields": {"port": {"type": "number", "aliases": ["p"]}}
    /// }))
    /// .unwrap();
    ///
    /// let argv = ArgumentVector::new(document.into_argument().unwrap());
    /// assert_eq!(argv.parse(&["-p", "80"]).unwrap(), json!({"port": 80}));
    /// ```
    pub fn into_argument(self) -> Result<Argument> {
        self.build("")
    }

    fn build(self, location: &str) -> Result<Argument> {
        let (argument, modifiers) = match self {
            ArgumentDocument::String(leaf) => leaf.build(NamedArgument::string()),
            ArgumentDocument::Boolean(leaf) => leaf.build(NamedArgument::boolean()),
            ArgumentDocument::Number(leaf) => leaf.build(NamedArgument::number()),
            ArgumentDocument::Json(leaf) => leaf.build(NamedArgument::json()),
            ArgumentDocument::Positional(collection) => {
                let items = collection.items();
                (PositionalArgument::new(items).into(), collection.modifiers)
            }
            ArgumentDocument::Bypassed(collection) => {
                let items = collection.items();
                (BypassedArgument::new(items).into(), collection.modifiers)
            }
            ArgumentDocument::Object(object) => object.build(location)?,
            ArgumentDocument::Union(union) => union.build(location)?,
        };
        Ok(modifiers.apply(argument))
    }
}

impl Modifiers {
    fn apply(self, mut argument: Argument) -> Argument {
        if self.optional {
            argument = argument.optional();
        }
        if let Some(default) = self.default {
            argument = argument.default_value(default);
        }
        if self.nullable {
            argument = argument.nullable();
        }
        if let Some(catch) = self.catch {
            argument = argument.catch(catch);
        }
        if let Some(description) = self.description {
            argument = argument.describe(description);
        }
        argument
    }
}

impl LeafDocument {
    fn build(self, mut leaf: NamedArgument) -> (Argument, Modifiers) {
        if let Some(name) = self.name {
            leaf = leaf.named(name);
        }
        for alias in self.aliases {
            leaf = leaf.alias(alias);
        }
        if !self.choices.is_empty() {
            leaf = leaf.with_kind(choices(self.choices));
        }
        (leaf.into(), self.modifiers)
    }
}

impl CollectionDocument {
    fn items(&self) -> ValueSchema {
        if self.choices.is_empty() {
            ValueSchema::string()
        } else {
            ValueSchema::new(choices(
                self.choices.iter().cloned().map(Value::String).collect(),
            ))
        }
    }
}

impl ObjectDocument {
    fn build(self, location: &str) -> Result<(Argument, Modifiers)> {
        let mut object = ObjectArgument::new().unknown_keys(self.unknown_keys);
        if let Some(name) = self.name {
            object = object.named(name);
        }
        for alias in self.aliases {
            object = object.alias(alias);
        }
        for (key, field) in self.fields {
            let child = field.build(&join(location, &key))?;
            object = object.field(key, child);
        }
        if let Some(catchall) = self.catchall {
            object = object.catchall(catchall.build(&join(location, "*"))?);
        }
        Ok((object.into(), self.modifiers))
    }
}

impl UnionDocument {
    fn build(self, location: &str) -> Result<(Argument, Modifiers)> {
        let options = self
            .options
            .into_iter()
            .map(|option| option.build(location))
            .collect::<Result<Vec<_>>>()?;
        let mut union = UnionArgument::new(options).map_err(|source| DocumentError::InvalidUnion {
            location: if location.is_empty() {
                "<root>".to_string()
            } else {
                location.to_string()
            },
            source,
        })?;
        if let Some(name) = self.name {
            union = union.named(name);
        }
        for alias in self.aliases {
            union = union.alias(alias);
        }
        Ok((union.into(), self.modifiers))
    }
}

fn choices(values: Vec<Value>) -> SchemaKind {
    SchemaKind::Union(values.into_iter().map(ValueSchema::literal).collect())
}

fn join(location: &str, key: &str) -> String {
    if location.is_empty() {
        key.to_string()
    } else {
        format!("{location}.{key}")
    }
}
