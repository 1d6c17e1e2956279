//! Schema-driven resolution of command-line argument vectors.
//!
//! This crate turns a flat list of argv tokens into a structured
//! [`serde_json::Value`] according to a tree of argument descriptors:
//!
//! - [`NamedArgument`]: a flag converting one value (`--port 80`).
//! - [`ObjectArgument`]: a group of children addressed as `--child` or
//!   `--group.child`; the group itself accepts a JSON document.
//! - [`PositionalArgument`]: receives every positional token.
//! - [`BypassedArgument`]: receives every token after `--`.
//! - [`UnionArgument`]: alternatives presented as one node.
//!
//! [`ArgumentVector::resolve`] produces a [`Resolution`] carrying the raw
//! value and any [`Issue`]s; [`ArgumentVector::parse`] additionally checks
//! the value against the tree's [`ValueSchema`].
//!
//! Structural mistakes in a tree (unreachable names, sibling clashes) are
//! reported by [`validate_argument`].
//!
//! # Example
//!
//! ```
//! use argz_core::*;
//! use serde_json::json;
//!
//! let argv = ArgumentVector::new(
//!     ObjectArgument::new()
//!         .field("verbose", NamedArgument::boolean().alias("v"))
//!         .field(
//!             "server",
//!             ObjectArgument::new()
//!                 .field("host", NamedArgument::string())
//!                 .field("port", Argument::from(NamedArgument::number()).default_value(8080)),
//!         )
//!         .field("args", BypassedArgument::default()),
//! );
//!
//! let value = argv
//!     .parse(&["-v", "--server.host=localhost", "--", "--not-a-flag"])
//!     .unwrap();
//! assert_eq!(
//!     value,
//!     json!({
//!         "verbose": true,
//!         "server": {"host": "localhost", "port": 8080},
//!         "args": ["--not-a-flag"],
//!     })
//! );
//!
//! let resolution = argv.resolve(&["--bogus", "-v"]);
//! assert_eq!(resolution.status, ResolveStatus::Dirty);
//! assert_eq!(resolution.issues[0].code, IssueCode::UnknownArgument);
//! ```

mod assemble;
mod cast;
mod convert;
mod issue;
mod navigate;
mod schema;
mod tokenize;
mod types;
mod union;
mod validate;
mod vector;

pub use assemble::{PendingAssignment, assemble, set_path};
pub use cast::{CastError, CastFn, CastOutcome, Castable, LeafCaster};
pub use convert::{FnConverter, NameCase, NameConverter};
pub use issue::{Issue, IssueCode, PathKey};
pub use navigate::{Navigator, Resolved};
pub use schema::{SchemaKind, UnknownKeys, ValueSchema, Validator};
pub use tokenize::{FlagItem, SEPARATOR, Token, classify, looks_like_flag};
pub use types::*;
pub use union::{UnionArgument, UnionError};
pub use validate::{ValidationError, validate_argument};
pub use vector::{ArgumentVector, ParseError, Resolution, ResolveStatus};
