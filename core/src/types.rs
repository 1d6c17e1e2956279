//! Argument descriptor types.
//!
//! An [`Argument`] tree describes the expected shape of an argument vector.
//! Each variant supports a fixed set of capability facets, exposed through
//! [`Argument::api`]:
//!
//! | variant | kind | castable | named | grouped |
//! |---|---|---|---|---|
//! | [`NamedArgument`] | named | yes | yes | no |
//! | [`ObjectArgument`] | grouped | yes | yes | yes |
//! | [`PositionalArgument`] | positional | no | no | no |
//! | [`BypassedArgument`] | bypassed | no | no | no |
//! | [`UnionArgument`] | depends on its options | | | |
//!
//! Trees are immutable once built and may be shared across threads.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::cast::{CastError, CastFn, Castable, LeafCaster, cast_json};
use crate::convert::NameConverter;
use crate::schema::{SchemaKind, UnknownKeys, ValueSchema};
use crate::union::{UnionArgument, UnionError};

/// Kind tag of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    /// Reached by flag name, converts one value.
    Named,
    /// Receives all positional tokens.
    Positional,
    /// Receives all tokens after `--`.
    Bypassed,
    /// Reached by flag name and contains addressable children.
    Grouped,
}

impl ArgumentKind {
    /// Whether nodes of this kind expose the castable facet.
    pub fn is_castable(self) -> bool {
        matches!(self, ArgumentKind::Named | ArgumentKind::Grouped)
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgumentKind::Named => "named",
            ArgumentKind::Positional => "positional",
            ArgumentKind::Bypassed => "bypassed",
            ArgumentKind::Grouped => "grouped",
        })
    }
}

/// The named capability facet.
pub trait Named {
    /// Flag names this node answers to.
    ///
    /// `parent_key` is the key the node is stored under (absent for the
    /// root); it is converted into a name when no explicit name is set.
    fn names(&self, parent_key: Option<&str>, converter: &dyn NameConverter) -> Vec<String>;
}

/// A child of a grouped node together with the key it is assigned under.
#[derive(Debug, Clone)]
pub struct ChildArgument<'a> {
    /// Key in the assembled object.
    pub key: Cow<'a, str>,
    /// The child descriptor.
    pub argument: &'a Argument,
}

/// The grouped capability facet.
pub trait Grouped {
    /// Looks up the child answering to the flag segment `name`.
    fn child(&self, name: &str, converter: &dyn NameConverter) -> Option<ChildArgument<'_>>;

    /// All declared children, in declaration order.
    fn children(&self) -> Vec<ChildArgument<'_>>;
}

/// Facet view of a descriptor.
///
/// Each variant carries exactly the facets its kind supports.
#[derive(Clone, Copy)]
pub enum ArgumentApi<'a> {
    /// Castable and named.
    Named {
        /// Value conversion.
        castable: &'a dyn Castable,
        /// Flag names.
        named: &'a dyn Named,
    },
    /// Castable, named and grouped.
    Grouped {
        /// Whole-group conversion (JSON).
        castable: &'a dyn Castable,
        /// Flag names.
        named: &'a dyn Named,
        /// Child lookup.
        grouped: &'a dyn Grouped,
    },
    /// Positional collection.
    Positional,
    /// Post-separator collection.
    Bypassed,
}

impl<'a> ArgumentApi<'a> {
    /// Kind tag of this view.
    pub fn kind(&self) -> ArgumentKind {
        match self {
            ArgumentApi::Named { .. } => ArgumentKind::Named,
            ArgumentApi::Grouped { .. } => ArgumentKind::Grouped,
            ArgumentApi::Positional => ArgumentKind::Positional,
            ArgumentApi::Bypassed => ArgumentKind::Bypassed,
        }
    }

    /// The castable facet, if present.
    pub fn castable(&self) -> Option<&'a dyn Castable> {
        match *self {
            ArgumentApi::Named { castable, .. } | ArgumentApi::Grouped { castable, .. } => {
                Some(castable)
            }
            ArgumentApi::Positional | ArgumentApi::Bypassed => None,
        }
    }

    /// The named facet, if present.
    pub fn named(&self) -> Option<&'a dyn Named> {
        match *self {
            ArgumentApi::Named { named, .. } | ArgumentApi::Grouped { named, .. } => Some(named),
            ArgumentApi::Positional | ArgumentApi::Bypassed => None,
        }
    }

    /// The grouped facet, if present.
    pub fn grouped(&self) -> Option<&'a dyn Grouped> {
        match *self {
            ArgumentApi::Grouped { grouped, .. } => Some(grouped),
            _ => None,
        }
    }
}

/// Explicit name and aliases of a named node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
    /// Explicit name; when absent, the name is derived from the parent key.
    pub default_name: Option<String>,
    /// Additional names.
    pub aliases: Vec<String>,
}

impl NameSet {
    /// Resolved names: the default (or derived) name first, then aliases.
    pub fn resolve(&self, parent_key: Option<&str>, converter: &dyn NameConverter) -> Vec<String> {
        let default_name = self.default_name.clone().or_else(|| {
            parent_key
                .filter(|key| !key.is_empty())
                .map(|key| converter.convert(key))
        });

        let mut names = Vec::with_capacity(self.aliases.len() + 1);
        names.extend(default_name);
        names.extend(self.aliases.iter().cloned());
        names
    }
}

/// Modifiers that only affect the value schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Meta {
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
    pub(crate) nullable: bool,
    pub(crate) catch: Option<Value>,
    pub(crate) description: Option<String>,
}

impl Meta {
    fn apply(&self, mut schema: ValueSchema, display_name: Option<&str>) -> ValueSchema {
        schema.optional |= self.optional;
        schema.nullable |= self.nullable;
        if self.default.is_some() {
            schema.default = self.default.clone();
        }
        if self.catch.is_some() {
            schema.catch = self.catch.clone();
        }
        if self.description.is_some() {
            schema.description = self.description.clone();
        }
        if let Some(name) = display_name {
            schema.label = Some(name.to_string());
        }
        schema
    }
}

/// An argument descriptor.
#[derive(Debug, Clone)]
pub enum Argument {
    /// A single flag value.
    Named(NamedArgument),
    /// All positional tokens.
    Positional(PositionalArgument),
    /// All tokens after `--`.
    Bypassed(BypassedArgument),
    /// A group of named children.
    Object(ObjectArgument),
    /// Alternatives treated as one node.
    Union(UnionArgument),
}

impl Argument {
    /// Shorthand for [`UnionArgument::new`].
    ///
    /// # Errors
    ///
    /// See [`UnionArgument::new`].
    pub fn union(options: Vec<Argument>) -> Result<Argument, UnionError> {
        UnionArgument::new(options).map(Argument::Union)
    }

    /// Facet view of this node.
    pub fn api(&self) -> ArgumentApi<'_> {
        match self {
            Argument::Named(named) => ArgumentApi::Named {
                castable: named,
                named,
            },
            Argument::Positional(_) => ArgumentApi::Positional,
            Argument::Bypassed(_) => ArgumentApi::Bypassed,
            Argument::Object(object) => ArgumentApi::Grouped {
                castable: object,
                named: object,
                grouped: object,
            },
            Argument::Union(union) => union.api(),
        }
    }

    /// Kind tag of this node.
    pub fn kind(&self) -> ArgumentKind {
        self.api().kind()
    }

    /// The value schema the validation layer checks this node against,
    /// labelled with `display_name`.
    pub fn schema(&self, display_name: Option<&str>) -> ValueSchema {
        let schema = match self {
            Argument::Named(named) => ValueSchema::new(named.value_kind()),
            Argument::Positional(positional) => ValueSchema::array(positional.items.clone()),
            Argument::Bypassed(bypassed) => ValueSchema::array(bypassed.items.clone()),
            Argument::Object(object) => object.value_schema(),
            Argument::Union(union) => ValueSchema::new(SchemaKind::Union(
                union
                    .options()
                    .iter()
                    .map(|option| option.schema(display_name))
                    .collect(),
            )),
        };
        self.meta().apply(schema, display_name)
    }

    /// Marks the value optional for validation.
    pub fn optional(mut self) -> Self {
        self.meta_mut().optional = true;
        self
    }

    /// Substitutes `value` when nothing was given.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.meta_mut().default = Some(value.into());
        self
    }

    /// Clears the optional flag set with [`optional`](Argument::optional).
    pub fn required(mut self) -> Self {
        self.meta_mut().optional = false;
        self
    }

    /// Accepts `null` for validation.
    pub fn nullable(mut self) -> Self {
        self.meta_mut().nullable = true;
        self
    }

    /// Substitutes `value` whenever validation of this node fails.
    pub fn catch(mut self, value: impl Into<Value>) -> Self {
        self.meta_mut().catch = Some(value.into());
        self
    }

    /// Attaches a description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.meta_mut().description = Some(description.into());
        self
    }

    /// The description set with [`describe`](Argument::describe).
    pub fn description(&self) -> Option<&str> {
        self.meta().description.as_deref()
    }

    pub(crate) fn meta(&self) -> &Meta {
        match self {
            Argument::Named(a) => &a.meta,
            Argument::Positional(a) => &a.meta,
            Argument::Bypassed(a) => &a.meta,
            Argument::Object(a) => &a.meta,
            Argument::Union(a) => &a.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Argument::Named(a) => &mut a.meta,
            Argument::Positional(a) => &mut a.meta,
            Argument::Bypassed(a) => &mut a.meta,
            Argument::Object(a) => &mut a.meta,
            Argument::Union(a) => &mut a.meta,
        }
    }
}

impl From<NamedArgument> for Argument {
    fn from(value: NamedArgument) -> Self {
        Argument::Named(value)
    }
}

impl From<PositionalArgument> for Argument {
    fn from(value: PositionalArgument) -> Self {
        Argument::Positional(value)
    }
}

impl From<BypassedArgument> for Argument {
    fn from(value: BypassedArgument) -> Self {
        Argument::Bypassed(value)
    }
}

impl From<ObjectArgument> for Argument {
    fn from(value: ObjectArgument) -> Self {
        Argument::Object(value)
    }
}

impl From<UnionArgument> for Argument {
    fn from(value: UnionArgument) -> Self {
        Argument::Union(value)
    }
}

/// A leaf reached by flag name.
///
/// # Examples
///
/// ```
/// use argz_core::{Castable, NamedArgument};
/// use serde_json::json;
///
/// let port = NamedArgument::number().alias("p");
/// assert_eq!(port.cast(Some("8080")), Ok(Some(json!(8080))));
/// ```
#[derive(Debug, Clone)]
pub struct NamedArgument {
    names: NameSet,
    caster: LeafCaster,
    kind: Option<SchemaKind>,
    pub(crate) meta: Meta,
}

impl NamedArgument {
    /// Creates a leaf with the given caster.
    pub fn new(caster: LeafCaster) -> Self {
        Self {
            names: NameSet::default(),
            caster,
            kind: None,
            meta: Meta::default(),
        }
    }

    /// A string leaf.
    pub fn string() -> Self {
        Self::new(LeafCaster::String)
    }

    /// A boolean leaf; a bare flag means `true`.
    pub fn boolean() -> Self {
        Self::new(LeafCaster::Boolean)
    }

    /// A numeric leaf.
    pub fn number() -> Self {
        Self::new(LeafCaster::Number)
    }

    /// A leaf taking any JSON document.
    pub fn json() -> Self {
        Self::new(LeafCaster::Json)
    }

    /// A leaf that accepts anything and assigns nothing.
    pub fn ignored() -> Self {
        Self::new(LeafCaster::Ignore)
    }

    /// A leaf with a user-supplied conversion.
    pub fn custom<F>(func: F) -> Self
    where
        F: Fn(Option<&str>) -> Result<Option<Value>, CastError> + Send + Sync + 'static,
    {
        let func: Arc<CastFn> = Arc::new(func);
        Self::new(LeafCaster::Custom(func))
    }

    /// Overrides the value schema kind (defaults to the caster's).
    pub fn with_kind(mut self, kind: SchemaKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the explicit flag name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.names.default_name = Some(name.into());
        self
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.names.aliases.push(alias.into());
        self
    }

    /// Explicit name and aliases.
    pub fn name_set(&self) -> &NameSet {
        &self.names
    }

    /// The leaf's caster.
    pub fn caster(&self) -> &LeafCaster {
        &self.caster
    }

    fn value_kind(&self) -> SchemaKind {
        self.kind
            .clone()
            .unwrap_or_else(|| self.caster.schema_kind())
    }
}

impl Castable for NamedArgument {
    fn cast(&self, raw: Option<&str>) -> Result<Option<Value>, CastError> {
        self.caster.cast(raw)
    }
}

impl Named for NamedArgument {
    fn names(&self, parent_key: Option<&str>, converter: &dyn NameConverter) -> Vec<String> {
        self.names.resolve(parent_key, converter)
    }
}

/// Collects every positional token.
#[derive(Debug, Clone)]
pub struct PositionalArgument {
    items: ValueSchema,
    pub(crate) meta: Meta,
}

impl PositionalArgument {
    /// Positional tokens validated against `items`.
    pub fn new(items: ValueSchema) -> Self {
        Self {
            items,
            meta: Meta::default(),
        }
    }

    /// Schema every collected token is checked against.
    pub fn items(&self) -> &ValueSchema {
        &self.items
    }
}

impl Default for PositionalArgument {
    fn default() -> Self {
        Self::new(ValueSchema::string())
    }
}

/// Collects every token after `--`.
#[derive(Debug, Clone)]
pub struct BypassedArgument {
    items: ValueSchema,
    pub(crate) meta: Meta,
}

impl BypassedArgument {
    /// Bypassed tokens validated against `items`.
    pub fn new(items: ValueSchema) -> Self {
        Self {
            items,
            meta: Meta::default(),
        }
    }

    /// Schema every collected token is checked against.
    pub fn items(&self) -> &ValueSchema {
        &self.items
    }
}

impl Default for BypassedArgument {
    fn default() -> Self {
        Self::new(ValueSchema::string())
    }
}

static STRIP_FALLBACK: LazyLock<Argument> =
    LazyLock::new(|| Argument::Named(NamedArgument::ignored()));
static PASSTHROUGH_FALLBACK: LazyLock<Argument> =
    LazyLock::new(|| Argument::Named(NamedArgument::string()));

#[derive(Debug)]
struct NameCache {
    converter_id: String,
    names: HashMap<String, usize>,
}

/// A group of children addressed as `--child` or `--group.child`.
///
/// The object itself is castable: a JSON document given to the group's own
/// flag supplies the whole sub-object at once.
///
/// # Examples
///
/// ```
/// use argz_core::{Grouped, NameCase, NamedArgument, ObjectArgument};
///
/// let object = ObjectArgument::new()
///     .field("dryRun", NamedArgument::boolean())
///     .field("output", NamedArgument::string().alias("o"));
///
/// let child = object.child("dry-run", &NameCase::Kebab).unwrap();
/// assert_eq!(child.key, "dryRun");
/// assert_eq!(object.child("o", &NameCase::Kebab).unwrap().key, "output");
/// assert!(object.child("missing", &NameCase::Kebab).is_none());
/// ```
#[derive(Debug)]
pub struct ObjectArgument {
    names: NameSet,
    fields: Vec<(String, Argument)>,
    unknown_keys: UnknownKeys,
    catchall: Option<Box<Argument>>,
    name_cache: RwLock<Option<NameCache>>,
    pub(crate) meta: Meta,
}

impl Clone for ObjectArgument {
    fn clone(&self) -> Self {
        Self {
            names: self.names.clone(),
            fields: self.fields.clone(),
            unknown_keys: self.unknown_keys,
            catchall: self.catchall.clone(),
            name_cache: RwLock::new(None),
            meta: self.meta.clone(),
        }
    }
}

impl Default for ObjectArgument {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectArgument {
    /// An empty, strict object.
    pub fn new() -> Self {
        Self {
            names: NameSet::default(),
            fields: Vec::new(),
            unknown_keys: UnknownKeys::Strict,
            catchall: None,
            name_cache: RwLock::new(None),
            meta: Meta::default(),
        }
    }

    /// Adds (or replaces) the child stored under `key`.
    pub fn field(mut self, key: impl Into<String>, argument: impl Into<Argument>) -> Self {
        self.insert_field(key.into(), argument.into());
        self
    }

    /// Alias of [`field`](ObjectArgument::field).
    pub fn set_key(self, key: impl Into<String>, argument: impl Into<Argument>) -> Self {
        self.field(key, argument)
    }

    /// Adds every field of `other`, replacing same-keyed fields.
    pub fn extend(mut self, other: ObjectArgument) -> Self {
        for (key, argument) in other.fields {
            self.insert_field(key, argument);
        }
        self
    }

    /// Keeps only the listed keys.
    pub fn pick(mut self, keys: &[&str]) -> Self {
        self.fields.retain(|(key, _)| keys.contains(&key.as_str()));
        self.invalidate();
        self
    }

    /// Drops the listed keys.
    pub fn omit(mut self, keys: &[&str]) -> Self {
        self.fields.retain(|(key, _)| !keys.contains(&key.as_str()));
        self.invalidate();
        self
    }

    /// Marks every field optional.
    pub fn partial(mut self) -> Self {
        self.fields = std::mem::take(&mut self.fields)
            .into_iter()
            .map(|(key, argument)| (key, argument.optional()))
            .collect();
        self.invalidate();
        self
    }

    /// Clears the optional flag on every field.
    pub fn required(mut self) -> Self {
        self.fields = std::mem::take(&mut self.fields)
            .into_iter()
            .map(|(key, argument)| (key, argument.required()))
            .collect();
        self.invalidate();
        self
    }

    /// Unknown child names are unknown arguments (the default).
    pub fn strict(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strict;
        self
    }

    /// Unknown child names are accepted and ignored.
    pub fn strip(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strip;
        self
    }

    /// Unknown child names become string values under the raw name.
    pub fn passthrough(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    /// Sets the unknown-key policy.
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Uses `argument` for every child name not in the shape.
    pub fn catchall(mut self, argument: impl Into<Argument>) -> Self {
        self.catchall = Some(Box::new(argument.into()));
        self
    }

    /// Sets the explicit group name (enables `--name.child`).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.names.default_name = Some(name.into());
        self
    }

    /// Adds an alias for the group.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.names.aliases.push(alias.into());
        self
    }

    /// Declared fields, in declaration order.
    pub fn shape(&self) -> &[(String, Argument)] {
        &self.fields
    }

    /// The child stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Argument> {
        self.fields
            .iter()
            .find(|(field, _)| field == key)
            .map(|(_, argument)| argument)
    }

    /// Current unknown-key policy.
    pub fn unknown_key_policy(&self) -> UnknownKeys {
        self.unknown_keys
    }

    /// Node used for unknown child names, if any.
    pub fn catchall_argument(&self) -> Option<&Argument> {
        self.catchall.as_deref()
    }

    /// Explicit name and aliases.
    pub fn name_set(&self) -> &NameSet {
        &self.names
    }

    fn insert_field(&mut self, key: String, argument: Argument) {
        match self.fields.iter_mut().find(|(field, _)| *field == key) {
            Some(slot) => slot.1 = argument,
            None => self.fields.push((key, argument)),
        }
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.name_cache = RwLock::new(None);
    }

    fn value_schema(&self) -> ValueSchema {
        ValueSchema::new(SchemaKind::Object {
            fields: self
                .fields
                .iter()
                .map(|(key, argument)| (key.clone(), argument.schema(Some(key))))
                .collect(),
            unknown_keys: self.unknown_keys,
            catchall: self
                .catchall
                .as_ref()
                .map(|catchall| Box::new(catchall.schema(None))),
        })
    }

    fn lookup(&self, name: &str, converter: &dyn NameConverter) -> Option<usize> {
        if let Ok(guard) = self.name_cache.read() {
            if let Some(cache) = guard
                .as_ref()
                .filter(|cache| cache.converter_id == converter.id())
            {
                return cache.names.get(name).copied();
            }
        }

        let cache = self.build_name_cache(converter);
        let index = cache.names.get(name).copied();
        if let Ok(mut guard) = self.name_cache.write() {
            *guard = Some(cache);
        }
        index
    }

    fn build_name_cache(&self, converter: &dyn NameConverter) -> NameCache {
        trace!(converter = converter.id(), fields = self.fields.len(), "Building name table");
        let mut names = HashMap::new();
        for (index, (key, argument)) in self.fields.iter().enumerate() {
            if let Some(named) = argument.api().named() {
                for name in named.names(Some(key), converter) {
                    names.insert(name, index);
                }
            }
        }
        NameCache {
            converter_id: converter.id().to_string(),
            names,
        }
    }
}

impl Castable for ObjectArgument {
    fn cast(&self, raw: Option<&str>) -> Result<Option<Value>, CastError> {
        raw.map(cast_json).transpose()
    }
}

impl Named for ObjectArgument {
    fn names(&self, parent_key: Option<&str>, converter: &dyn NameConverter) -> Vec<String> {
        self.names.resolve(parent_key, converter)
    }
}

impl Grouped for ObjectArgument {
    fn child(&self, name: &str, converter: &dyn NameConverter) -> Option<ChildArgument<'_>> {
        if let Some(index) = self.lookup(name, converter) {
            let (key, argument) = &self.fields[index];
            return Some(ChildArgument {
                key: Cow::Borrowed(key),
                argument,
            });
        }

        if let Some(catchall) = &self.catchall {
            return Some(ChildArgument {
                key: Cow::Owned(name.to_string()),
                argument: catchall,
            });
        }

        let fallback: &'static Argument = match self.unknown_keys {
            UnknownKeys::Strict => return None,
            UnknownKeys::Strip => &*STRIP_FALLBACK,
            UnknownKeys::Passthrough => &*PASSTHROUGH_FALLBACK,
        };
        Some(ChildArgument {
            key: Cow::Owned(name.to_string()),
            argument: fallback,
        })
    }

    fn children(&self) -> Vec<ChildArgument<'_>> {
        self.fields
            .iter()
            .map(|(key, argument)| ChildArgument {
                key: Cow::Borrowed(key),
                argument,
            })
            .collect()
    }
}
