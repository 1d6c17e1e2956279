//! Unions of argument descriptors.
//!
//! A [`UnionArgument`] presents several descriptors as one node. Its facets
//! fan out to the options: names are the deduplicated union of the options'
//! names, casting returns the first option that accepts the value, and child
//! lookup searches grouped options in declaration order.
//!
//! Options must be compatible: either all castable (named or grouped), or
//! all positional, or all bypassed.
//!
//! # Examples
//!
//! ```
//! use argz_core::{Argument, NamedArgument, PositionalArgument, UnionArgument, UnionError};
//!
//! let ok = UnionArgument::new(vec![
//!     NamedArgument::number().into(),
//!     NamedArgument::string().into(),
//! ]);
//! assert!(ok.is_ok());
//!
//! let mixed = UnionArgument::new(vec![
//!     PositionalArgument::default().into(),
//!     NamedArgument::string().into(),
//! ]);
//! assert!(matches!(mixed, Err(UnionError::IncompatibleKinds { .. })));
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::cast::{CastError, CastOutcome, Castable};
use crate::convert::NameConverter;
use crate::types::{Argument, ArgumentApi, ArgumentKind, ChildArgument, Grouped, Meta, NameSet, Named};

/// Errors raised while building a union.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnionError {
    /// A union needs at least two options.
    #[error("a union needs at least two options, got {0}")]
    TooFewOptions(usize),
    /// Options of incompatible kinds were mixed.
    #[error(
        "cannot create union: {second} option is not compatible with {first} option; options must \
         be all castable (named or grouped), all positional, or all bypassed"
    )]
    IncompatibleKinds {
        /// Kind of the first option.
        first: ArgumentKind,
        /// Kind of the first option that conflicts with it.
        second: ArgumentKind,
    },
}

/// Several descriptors treated as one node.
#[derive(Debug, Clone)]
pub struct UnionArgument {
    options: Vec<Argument>,
    names: NameSet,
    kind: ArgumentKind,
    pub(crate) meta: Meta,
}

impl UnionArgument {
    /// Builds a union, checking option compatibility.
    ///
    /// # Errors
    ///
    /// Returns [`UnionError::TooFewOptions`] for fewer than two options and
    /// [`UnionError::IncompatibleKinds`] when positional or bypassed options
    /// are mixed with any other kind.
    pub fn new(options: Vec<Argument>) -> Result<Self, UnionError> {
        if options.len() < 2 {
            return Err(UnionError::TooFewOptions(options.len()));
        }

        let first = options[0].kind();
        for option in &options[1..] {
            let second = option.kind();
            if (!first.is_castable() || !second.is_castable()) && first != second {
                return Err(UnionError::IncompatibleKinds { first, second });
            }
        }

        let kind = if !first.is_castable() {
            first
        } else if options
            .iter()
            .any(|option| option.kind() == ArgumentKind::Grouped)
        {
            ArgumentKind::Grouped
        } else {
            ArgumentKind::Named
        };

        Ok(Self {
            options,
            names: NameSet::default(),
            kind,
            meta: Meta::default(),
        })
    }

    /// Sets an explicit name, answered to in addition to the options' names.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.names.default_name = Some(name.into());
        self
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.names.aliases.push(alias.into());
        self
    }

    /// Options in declaration order.
    pub fn options(&self) -> &[Argument] {
        &self.options
    }

    /// Effective kind of the union.
    pub fn kind(&self) -> ArgumentKind {
        self.kind
    }

    pub(crate) fn api(&self) -> ArgumentApi<'_> {
        match self.kind {
            ArgumentKind::Positional => ArgumentApi::Positional,
            ArgumentKind::Bypassed => ArgumentApi::Bypassed,
            ArgumentKind::Named => ArgumentApi::Named {
                castable: self,
                named: self,
            },
            ArgumentKind::Grouped => ArgumentApi::Grouped {
                castable: self,
                named: self,
                grouped: self,
            },
        }
    }
}

impl Castable for UnionArgument {
    fn cast(&self, raw: Option<&str>) -> Result<Option<Value>, CastError> {
        let mut failures = Vec::with_capacity(self.options.len());
        for castable in self.options.iter().filter_map(|option| option.api().castable()) {
            match castable.try_cast(raw)? {
                CastOutcome::Success(value) => return Ok(value),
                CastOutcome::Failure(err) => failures.push(err),
            }
        }
        Err(CastError::NoMatchingOption(failures))
    }
}

impl Named for UnionArgument {
    fn names(&self, parent_key: Option<&str>, converter: &dyn NameConverter) -> Vec<String> {
        let own = if self.names.default_name.is_some() || !self.names.aliases.is_empty() {
            self.names.resolve(parent_key, converter)
        } else {
            Vec::new()
        };

        let mut names: Vec<String> = Vec::new();
        let options = self
            .options
            .iter()
            .filter_map(|option| option.api().named())
            .flat_map(|named| named.names(parent_key, converter));
        for name in own.into_iter().chain(options) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl Grouped for UnionArgument {
    fn child(&self, name: &str, converter: &dyn NameConverter) -> Option<ChildArgument<'_>> {
        self.options
            .iter()
            .filter_map(|option| option.api().grouped())
            .find_map(|grouped| grouped.child(name, converter))
    }

    fn children(&self) -> Vec<ChildArgument<'_>> {
        self.options
            .iter()
            .filter_map(|option| option.api().grouped())
            .flat_map(|grouped| grouped.children())
            .collect()
    }
}
