//! Schema documents and resolver configuration for argz.
//!
//! Descriptor trees can be written as JSON or YAML documents
//! ([`ArgumentDocument`]) and loaded from disk ([`load_document`],
//! [`load_argument`], [`DocumentSet`]). [`ResolverConfig`] holds the
//! settings shared by every resolution, such as the flag naming convention.
//!
//! # Quick start
//!
//! ```no_run
//! use argz_core::ArgumentVector;
//! use argz_document::{ResolverConfig, load_argument};
//!
//! let config = ResolverConfig::load("argz.yaml").unwrap();
//! let root = load_argument("schemas/deploy.yaml").unwrap();
//! let argv = ArgumentVector::with_converter(root, config.converter());
//!
//! let resolution = argv.resolve(&["--env=prod", "--", "extra"]);
//! println!("{:?}", resolution.value);
//! ```

mod config;
mod document;
mod error;
mod loader;

pub use config::ResolverConfig;
pub use document::{
    ArgumentDocument, CollectionDocument, LeafDocument, Modifiers, ObjectDocument, UnionDocument,
};
pub use error::{DocumentError, Result};
pub use loader::{DocumentFormat, DocumentSet, load_argument, load_document};
