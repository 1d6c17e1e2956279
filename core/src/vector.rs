//! Resolution of argument vectors.
//!
//! [`ArgumentVector`] owns a descriptor tree and turns argv into a raw value:
//!
//! 1. each token is classified (see [`classify`]);
//! 2. flag names are resolved through a [`Navigator`] and their values cast;
//! 3. positional and post-`--` tokens are collected for every positional
//!    and bypassed node;
//! 4. everything is merged with [`assemble`].
//!
//! Problems with individual tokens are collected as [`Issue`]s and the scan
//! carries on; the outcome is then [`ResolveStatus::Dirty`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::assemble::{PendingAssignment, assemble};
use crate::cast::{CastError, CastOutcome, Castable};
use crate::convert::{NameCase, NameConverter};
use crate::issue::{Issue, IssueCode};
use crate::navigate::Navigator;
use crate::schema::Validator;
use crate::tokenize::{FlagItem, Token, classify, looks_like_flag};
use crate::types::{Argument, ArgumentKind};

/// Overall outcome of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStatus {
    /// Every token was understood.
    Valid,
    /// Some tokens produced issues; the value is a best effort.
    Dirty,
    /// The input could not be processed; there is no value.
    Aborted,
}

impl fmt::Display for ResolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResolveStatus::Valid => "valid",
            ResolveStatus::Dirty => "dirty",
            ResolveStatus::Aborted => "aborted",
        })
    }
}

/// Result of resolving one argument vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Overall outcome.
    pub status: ResolveStatus,
    /// Assembled raw value; `None` when nothing was assigned or on abort.
    pub value: Option<Value>,
    /// Every issue found, in argv order.
    pub issues: Vec<Issue>,
}

impl Resolution {
    fn aborted(mut issues: Vec<Issue>, issue: Issue) -> Self {
        issues.push(issue);
        Self {
            status: ResolveStatus::Aborted,
            value: None,
            issues,
        }
    }

    /// Whether the status is [`ResolveStatus::Valid`].
    pub fn is_valid(&self) -> bool {
        self.status == ResolveStatus::Valid
    }

    /// Converts into the raw value, failing unless valid.
    ///
    /// # Errors
    ///
    /// [`ParseError::Invalid`] for dirty resolutions and
    /// [`ParseError::Aborted`] for aborted ones.
    pub fn into_result(mut self) -> Result<Option<Value>, ParseError> {
        match self.status {
            ResolveStatus::Valid => Ok(self.value),
            ResolveStatus::Dirty => Err(ParseError::Invalid(self.issues)),
            ResolveStatus::Aborted => Err(ParseError::Aborted(self.issues.pop().unwrap_or_else(
                || Issue::new(Vec::new(), IssueCode::StructuralAbort, "resolution aborted"),
            ))),
        }
    }
}

/// Errors returned by [`ArgumentVector::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Resolution could not proceed.
    #[error("argument vector rejected: {0}")]
    Aborted(Issue),
    /// Resolution or validation reported issues.
    #[error("{} invalid argument(s): {}", .0.len(), join_issues(.0))]
    Invalid(Vec<Issue>),
}

impl ParseError {
    /// Every issue carried by the error.
    pub fn issues(&self) -> &[Issue] {
        match self {
            ParseError::Aborted(issue) => std::slice::from_ref(issue),
            ParseError::Invalid(issues) => issues,
        }
    }
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A descriptor tree ready to resolve argument vectors.
///
/// # Examples
///
/// ```
/// use argz_core::{ArgumentVector, NamedArgument, ObjectArgument, PositionalArgument};
/// use serde_json::json;
///
/// let argv = ArgumentVector::new(
///     ObjectArgument::new()
///         .field("dryRun", NamedArgument::boolean().alias("n"))
///         .field("jobs", NamedArgument::number().alias("j"))
///         .field("files", PositionalArgument::default()),
/// );
///
/// let resolution = argv.resolve(&["-nj", "4", "a.txt", "--", "--raw"]);
/// assert!(resolution.is_valid());
/// assert_eq!(
///     resolution.value,
///     Some(json!({"dryRun": true, "jobs": 4, "files": ["a.txt"]}))
/// );
/// ```
#[derive(Clone)]
pub struct ArgumentVector {
    root: Argument,
    converter: Arc<dyn NameConverter>,
}

impl ArgumentVector {
    /// Wraps `root`, converting keys to kebab-case flag names.
    pub fn new(root: impl Into<Argument>) -> Self {
        Self::with_converter(root, Arc::new(NameCase::Kebab))
    }

    /// Wraps `root` with a custom default converter.
    pub fn with_converter(root: impl Into<Argument>, converter: Arc<dyn NameConverter>) -> Self {
        Self {
            root: root.into(),
            converter,
        }
    }

    /// The descriptor tree.
    pub fn root(&self) -> &Argument {
        &self.root
    }

    /// The default converter.
    pub fn converter(&self) -> &dyn NameConverter {
        self.converter.as_ref()
    }

    /// Resolves `argv` with the default converter.
    pub fn resolve<S: AsRef<str>>(&self, argv: &[S]) -> Resolution {
        self.resolve_with(argv, self.converter.as_ref())
    }

    /// Resolves an untyped input, which must be an array of strings.
    pub fn resolve_json(&self, input: &Value) -> Resolution {
        let Value::Array(items) = input else {
            return Resolution::aborted(
                Vec::new(),
                Issue::new(
                    Vec::new(),
                    IssueCode::StructuralAbort,
                    "expected an array of strings",
                ),
            );
        };

        let mut argv = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(raw) => argv.push(raw),
                None => {
                    return Resolution::aborted(
                        Vec::new(),
                        Issue::at_token(
                            index,
                            IssueCode::StructuralAbort,
                            format!("expected a string, got {item}"),
                        ),
                    );
                }
            }
        }
        self.resolve(argv.as_slice())
    }

    /// Resolves `argv` using `converter` for flag names.
    pub fn resolve_with<S: AsRef<str>>(
        &self,
        argv: &[S],
        converter: &dyn NameConverter,
    ) -> Resolution {
        let navigator = Navigator::new(&self.root, converter);
        let mut scan = Scan::default();

        let mut index = 0;
        while index < argv.len() {
            let raw = argv[index].as_ref();
            match classify(raw) {
                Token::Separator => {
                    scan.bypassed = argv[index + 1..]
                        .iter()
                        .map(|token| Value::String(token.as_ref().to_string()))
                        .collect();
                    debug!(index, count = scan.bypassed.len(), "Separator reached");
                    break;
                }
                Token::Positional(value) => scan.positionals.push(Value::String(value.to_string())),
                Token::Malformed(token) => {
                    debug!(index, token, "Malformed argument");
                    scan.issues.push(Issue::at_token(
                        index,
                        IssueCode::MalformedArgument,
                        format!("invalid argument format `{token}`"),
                    ));
                }
                Token::Flags(items) => {
                    let next = argv.get(index + 1).map(AsRef::as_ref);
                    for item in items {
                        match scan.flag(&navigator, raw, &item, index, next) {
                            Ok(true) => index += 1,
                            Ok(false) => {}
                            Err(err) => {
                                debug!(index, error = %err, "Caster failed, aborting");
                                return Resolution::aborted(
                                    scan.issues,
                                    Issue::at_token(
                                        index,
                                        IssueCode::StructuralAbort,
                                        err.to_string(),
                                    ),
                                );
                            }
                        }
                    }
                }
            }
            index += 1;
        }

        scan.finish(&navigator)
    }

    /// Resolves `argv` and validates the result against the tree's own
    /// value schema.
    ///
    /// # Errors
    ///
    /// Fails when resolution is not valid or validation reports issues.
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> Result<Value, ParseError> {
        self.parse_with(argv, &self.root.schema(None))
    }

    /// Resolves `argv` and validates the result with `validator`.
    ///
    /// The final value is `null` when the validator returns nothing.
    ///
    /// # Errors
    ///
    /// Fails when resolution is not valid or validation reports issues.
    pub fn parse_with<S: AsRef<str>>(
        &self,
        argv: &[S],
        validator: &dyn Validator,
    ) -> Result<Value, ParseError> {
        self.validate_resolution(self.resolve(argv), validator)
            .into_result()
            .map(Option::unwrap_or_default)
    }

    /// Runs `validator` over the value of a resolution.
    ///
    /// An object root that received nothing is validated as `{}`. When the
    /// resolution is already dirty, or validation fails, the result is dirty,
    /// keeps the raw value and lists the validation issues after the scan
    /// issues. Aborted resolutions are returned unchanged.
    pub fn validate_resolution(
        &self,
        mut resolution: Resolution,
        validator: &dyn Validator,
    ) -> Resolution {
        if resolution.status == ResolveStatus::Aborted {
            return resolution;
        }

        let mut raw = resolution.value.take();
        if raw.is_none() && self.root.kind() == ArgumentKind::Grouped {
            raw = Some(Value::Object(Map::new()));
        }

        match validator.validate(raw.clone()) {
            Ok(value) if resolution.is_valid() => resolution.value = value,
            Ok(_) => resolution.value = raw,
            Err(issues) => {
                debug!(issues = issues.len(), "Validation failed");
                resolution.status = ResolveStatus::Dirty;
                resolution.value = raw;
                resolution.issues.extend(issues);
            }
        }
        resolution
    }
}

#[derive(Default)]
struct Scan {
    assignments: Vec<PendingAssignment>,
    issues: Vec<Issue>,
    positionals: Vec<Value>,
    bypassed: Vec<Value>,
}

impl Scan {
    /// Handles one flag item. Returns whether the next token was consumed.
    fn flag(
        &mut self,
        navigator: &Navigator<'_>,
        raw: &str,
        item: &FlagItem<'_>,
        index: usize,
        next: Option<&str>,
    ) -> Result<bool, CastError> {
        let spelling = spelling(raw, item.name);
        let Some(resolved) = navigator.resolve(item.name) else {
            debug!(index, flag = %spelling, "Unknown argument");
            self.issues.push(Issue::at_token(
                index,
                IssueCode::UnknownArgument,
                format!("unknown argument `{spelling}`"),
            ));
            return Ok(false);
        };

        if let Some(value) = item.value {
            match resolved.castable.try_cast(Some(value))? {
                CastOutcome::Success(value) => {
                    self.assignments
                        .push(PendingAssignment::new(resolved.path, value));
                }
                CastOutcome::Failure(err) => {
                    debug!(index, flag = %spelling, error = %err, "Incorrect value");
                    self.issues.push(Issue::at_token(
                        index,
                        IssueCode::IncorrectValue,
                        format!("incorrect value for `{spelling}`: {err}"),
                    ));
                }
            }
            return Ok(false);
        }

        if item.needs_value {
            if let Some(next) = next.filter(|next| !looks_like_flag(next)) {
                if let CastOutcome::Success(value) = resolved.castable.try_cast(Some(next))? {
                    self.assignments
                        .push(PendingAssignment::new(resolved.path, value));
                    return Ok(true);
                }
            }
        }

        match resolved.castable.try_cast(None)? {
            CastOutcome::Success(value) => {
                self.assignments
                    .push(PendingAssignment::new(resolved.path, value));
            }
            CastOutcome::Failure(err) => {
                debug!(index, flag = %spelling, error = %err, "Missing value");
                self.issues.push(Issue::at_token(
                    index,
                    IssueCode::MissingValue,
                    format!("missing value for `{spelling}`"),
                ));
            }
        }
        Ok(false)
    }

    fn finish(mut self, navigator: &Navigator<'_>) -> Resolution {
        for path in navigator.positional_paths() {
            self.assignments.push(PendingAssignment::new(
                path,
                Some(Value::Array(self.positionals.clone())),
            ));
        }
        for path in navigator.bypassed_paths() {
            self.assignments.push(PendingAssignment::new(
                path,
                Some(Value::Array(self.bypassed.clone())),
            ));
        }

        let status = if self.issues.is_empty() {
            ResolveStatus::Valid
        } else {
            ResolveStatus::Dirty
        };
        debug!(
            status = ?status,
            assignments = self.assignments.len(),
            issues = self.issues.len(),
            "Resolution finished"
        );

        Resolution {
            status,
            value: assemble(self.assignments),
            issues: self.issues,
        }
    }
}

fn spelling(raw: &str, name: &str) -> String {
    if raw.starts_with("--") {
        format!("--{name}")
    } else {
        format!("-{name}")
    }
}
