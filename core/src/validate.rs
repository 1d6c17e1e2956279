//! Structural validation of descriptor trees.
//!
//! Catches descriptor mistakes that would otherwise surface as confusing
//! resolution results: flag names that the tokenizer can never produce, and
//! sibling fields competing for the same flag name.
//!
//! # Examples
//!
//! ```
//! use argz_core::*;
//!
//! let good: Argument = ObjectArgument::new()
//!     .field("verbose", NamedArgument::boolean().alias("v"))
//!     .into();
//! assert!(validate_argument(&good, &NameCase::Kebab).is_empty());
//!
//! // Both fields answer to `-v`.
//! let bad: Argument = ObjectArgument::new()
//!     .field("verbose", NamedArgument::boolean().alias("v"))
//!     .field("version", NamedArgument::boolean().alias("v"))
//!     .into();
//! let errors = validate_argument(&bad, &NameCase::Kebab);
//! assert!(matches!(errors[0], ValidationError::DuplicateName { .. }));
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::convert::NameConverter;
use crate::types::Argument;

const ROOT: &str = "<root>";

/// Descriptor validation errors.
///
/// `location` is the dotted key path of the node the name belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A name is empty or whitespace-only.
    #[error("empty flag name at {location}")]
    EmptyName {
        /// Where the name was declared.
        location: String,
    },
    /// A name contains whitespace, `=` or `.`, or starts with `-`.
    #[error("invalid flag name `{name}` at {location}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Where the name was declared.
        location: String,
    },
    /// Two siblings answer to the same name.
    #[error("duplicate flag name `{name}` in {location}")]
    DuplicateName {
        /// The shared name.
        name: String,
        /// The object holding both siblings.
        location: String,
    },
}

/// Validates every name in the tree under `converter`.
pub fn validate_argument(root: &Argument, converter: &dyn NameConverter) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(named) = root.api().named() {
        for name in named.names(None, converter) {
            check_name(&name, ROOT, &mut errors);
        }
    }
    validate_node(root, "", converter, &mut errors);

    errors
}

fn validate_node(
    node: &Argument,
    location: &str,
    converter: &dyn NameConverter,
    errors: &mut Vec<ValidationError>,
) {
    match node {
        Argument::Object(object) => {
            let scope = display(location);
            let mut seen: HashMap<String, &str> = HashMap::new();
            for (key, child) in object.shape() {
                let child_location = join(location, key);
                if let Some(named) = child.api().named() {
                    for name in named.names(Some(key), converter) {
                        check_name(&name, &child_location, errors);
                        match seen.get(&name) {
                            Some(owner) if *owner != key.as_str() => {
                                errors.push(ValidationError::DuplicateName {
                                    name: name.clone(),
                                    location: scope.to_string(),
                                });
                            }
                            _ => {
                                seen.insert(name, key);
                            }
                        }
                    }
                }
                validate_node(child, &child_location, converter, errors);
            }
            if let Some(catchall) = object.catchall_argument() {
                validate_node(catchall, &join(location, "*"), converter, errors);
            }
        }
        Argument::Union(union) => {
            for option in union.options() {
                validate_node(option, location, converter, errors);
            }
        }
        Argument::Named(_) | Argument::Positional(_) | Argument::Bypassed(_) => {}
    }
}

fn check_name(name: &str, location: &str, errors: &mut Vec<ValidationError>) {
    if name.trim().is_empty() {
        errors.push(ValidationError::EmptyName {
            location: display(location).to_string(),
        });
    } else if name.starts_with('-')
        || name
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '.')
    {
        errors.push(ValidationError::InvalidName {
            name: name.to_string(),
            location: display(location).to_string(),
        });
    }
}

fn join(location: &str, key: &str) -> String {
    if location.is_empty() {
        key.to_string()
    } else {
        format!("{location}.{key}")
    }
}

fn display(location: &str) -> &str {
    if location.is_empty() { ROOT } else { location }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::NameCase;
    use crate::types::{NamedArgument, ObjectArgument, PositionalArgument};

    #[test]
    fn test_accepts_valid_tree() {
        let root: Argument = ObjectArgument::new()
            .field("outputDir", NamedArgument::string().alias("o"))
            .field(
                "server",
                ObjectArgument::new().field("port", NamedArgument::number().alias("p")),
            )
            .field("files", PositionalArgument::default())
            .into();

        assert!(validate_argument(&root, &NameCase::Kebab).is_empty());
    }

    #[test]
    fn test_rejects_invalid_names() {
        let root: Argument = ObjectArgument::new()
            .field("a", NamedArgument::string().named("has space"))
            .field("b", NamedArgument::string().alias("-b"))
            .field("c", NamedArgument::string().alias("c.d"))
            .field("e", NamedArgument::string().alias(""))
            .into();

        let errors = validate_argument(&root, &NameCase::Kebab);
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidName {
                    name: "has space".to_string(),
                    location: "a".to_string(),
                },
                ValidationError::InvalidName {
                    name: "-b".to_string(),
                    location: "b".to_string(),
                },
                ValidationError::InvalidName {
                    name: "c.d".to_string(),
                    location: "c".to_string(),
                },
                ValidationError::EmptyName {
                    location: "e".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_rejects_duplicates_in_nested_object() {
        let root: Argument = ObjectArgument::new()
            .field(
                "server",
                ObjectArgument::new()
                    .field("host", NamedArgument::string().alias("h"))
                    .field("help", NamedArgument::boolean().alias("h")),
            )
            .into();

        assert_eq!(
            validate_argument(&root, &NameCase::Kebab),
            vec![ValidationError::DuplicateName {
                name: "h".to_string(),
                location: "server".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicates_depend_on_converter() {
        let root: Argument = ObjectArgument::new()
            .field("dry_run", NamedArgument::boolean())
            .field("dryRun", NamedArgument::boolean())
            .into();

        assert_eq!(validate_argument(&root, &NameCase::Kebab).len(), 1);
        assert!(validate_argument(&root, &NameCase::Verbatim).is_empty());
    }
}
