//! Dotted-name resolution and tree traversal.
//!
//! A flag such as `--build.target` is split on `.` and walked down the
//! descriptor tree one grouped node at a time. If the root declares names of
//! its own, the first segment must be one of them (`--root.child`); otherwise
//! the root is the starting point (`--child`).

use std::collections::VecDeque;

use tracing::trace;

use crate::cast::Castable;
use crate::convert::NameConverter;
use crate::issue::PathKey;
use crate::types::{Argument, ArgumentApi, ArgumentKind, Grouped};

/// A flag name resolved to a castable node.
pub struct Resolved<'a> {
    /// Keys from the root to the node; empty for the root itself.
    pub path: Vec<PathKey>,
    /// The node's castable facet.
    pub castable: &'a dyn Castable,
}

/// Walks a descriptor tree with a fixed name converter.
///
/// # Examples
///
/// ```
/// use argz_core::{Argument, NameCase, NamedArgument, Navigator, ObjectArgument, PathKey};
///
/// let root: Argument = ObjectArgument::new()
///     .field("build", ObjectArgument::new().field("outDir", NamedArgument::string()))
///     .into();
/// let navigator = Navigator::new(&root, &NameCase::Kebab);
///
/// let resolved = navigator.resolve("build.out-dir").unwrap();
/// assert_eq!(resolved.path, vec![PathKey::from("build"), PathKey::from("outDir")]);
/// assert!(navigator.resolve("out-dir").is_none());
/// ```
#[derive(Clone, Copy)]
pub struct Navigator<'a> {
    root: &'a Argument,
    converter: &'a dyn NameConverter,
}

impl<'a> Navigator<'a> {
    /// Creates a navigator over `root`.
    pub fn new(root: &'a Argument, converter: &'a dyn NameConverter) -> Self {
        Self { root, converter }
    }

    /// Resolves a dotted flag name to its path and castable facet.
    pub fn resolve(&self, dotted: &str) -> Option<Resolved<'a>> {
        match self.root.api() {
            ArgumentApi::Grouped { named, .. } => {
                let segments: Vec<&str> = dotted.split('.').collect();
                let own = named.names(None, self.converter);
                let rest = if own.is_empty() {
                    &segments[..]
                } else {
                    let (first, rest) = segments.split_first()?;
                    if !own.iter().any(|name| name == first) {
                        return None;
                    }
                    rest
                };
                self.descend(rest)
            }
            ArgumentApi::Named { castable, named } => {
                if dotted.contains('.') {
                    return None;
                }
                named
                    .names(None, self.converter)
                    .iter()
                    .any(|name| name == dotted)
                    .then(|| Resolved {
                        path: Vec::new(),
                        castable,
                    })
            }
            ArgumentApi::Positional | ArgumentApi::Bypassed => None,
        }
    }

    fn descend(&self, segments: &[&str]) -> Option<Resolved<'a>> {
        let mut current = self.root;
        let mut path = Vec::with_capacity(segments.len());
        for segment in segments {
            let child = current.api().grouped()?.child(segment, self.converter)?;
            path.push(PathKey::Key(child.key.into_owned()));
            current = child.argument;
        }
        let castable = current.api().castable()?;
        trace!(path = ?path, kind = %current.kind(), "Resolved flag");
        Some(Resolved { path, castable })
    }

    /// Paths of every node whose kind matches `predicate`, breadth first.
    pub fn find_all(&self, predicate: impl Fn(ArgumentKind) -> bool) -> Vec<Vec<PathKey>> {
        let mut found = Vec::new();
        let mut queue: VecDeque<(Vec<PathKey>, &Argument)> = VecDeque::new();
        queue.push_back((Vec::new(), self.root));

        while let Some((path, node)) = queue.pop_front() {
            let api = node.api();
            if predicate(api.kind()) {
                found.push(path.clone());
            }
            if let Some(grouped) = api.grouped() {
                for child in grouped.children() {
                    let mut child_path = path.clone();
                    child_path.push(PathKey::Key(child.key.into_owned()));
                    queue.push_back((child_path, child.argument));
                }
            }
        }

        found
    }

    /// Paths of every positional node.
    pub fn positional_paths(&self) -> Vec<Vec<PathKey>> {
        self.find_all(|kind| kind == ArgumentKind::Positional)
    }

    /// Paths of every bypassed node.
    pub fn bypassed_paths(&self) -> Vec<Vec<PathKey>> {
        self.find_all(|kind| kind == ArgumentKind::Bypassed)
    }

    /// Every dotted flag spelling the tree answers to, depth first.
    ///
    /// Names produced by unknown-key fallbacks are open-ended and not listed.
    pub fn flag_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        match self.root.api() {
            ArgumentApi::Grouped { named, grouped, .. } => {
                let own = named.names(None, self.converter);
                if own.is_empty() {
                    self.collect_names(grouped, "", &mut names);
                }
                for name in own {
                    names.push(name.clone());
                    self.collect_names(grouped, &name, &mut names);
                }
            }
            ArgumentApi::Named { named, .. } => names.extend(named.names(None, self.converter)),
            ArgumentApi::Positional | ArgumentApi::Bypassed => {}
        }
        names
    }

    fn collect_names(&self, grouped: &dyn Grouped, prefix: &str, out: &mut Vec<String>) {
        for child in grouped.children() {
            let api = child.argument.api();
            let Some(named) = api.named() else {
                continue;
            };
            for name in named.names(Some(child.key.as_ref()), self.converter) {
                let dotted = if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}.{name}")
                };
                out.push(dotted.clone());
                if let Some(inner) = api.grouped() {
                    self.collect_names(inner, &dotted, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::NameCase;
    use crate::types::{BypassedArgument, NamedArgument, ObjectArgument, PositionalArgument};
    use crate::union::UnionArgument;
    use serde_json::json;

    fn tree() -> Argument {
        ObjectArgument::new()
            .field("verbose", NamedArgument::boolean().alias("v"))
            .field(
                "server",
                ObjectArgument::new()
                    .field("port", NamedArgument::number())
                    .field("files", PositionalArgument::default()),
            )
            .field("rest", BypassedArgument::default())
            .into()
    }

    fn keys(path: &[PathKey]) -> Vec<String> {
        path.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_resolve_nested_names() {
        let root = tree();
        let navigator = Navigator::new(&root, &NameCase::Kebab);

        assert_eq!(keys(&navigator.resolve("verbose").unwrap().path), vec!["verbose"]);
        assert_eq!(keys(&navigator.resolve("v").unwrap().path), vec!["verbose"]);

        let port = navigator.resolve("server.port").unwrap();
        assert_eq!(keys(&port.path), vec!["server", "port"]);
        assert_eq!(port.castable.cast(Some("80")), Ok(Some(json!(80))));

        // The group itself takes a JSON document.
        assert_eq!(keys(&navigator.resolve("server").unwrap().path), vec!["server"]);

        assert!(navigator.resolve("port").is_none());
        assert!(navigator.resolve("server.files").is_none());
        assert!(navigator.resolve("verbose.deeper").is_none());
    }

    #[test]
    fn test_named_root_consumes_first_segment() {
        let root: Argument = ObjectArgument::new()
            .named("app")
            .field("debug", NamedArgument::boolean())
            .into();
        let navigator = Navigator::new(&root, &NameCase::Kebab);

        assert_eq!(keys(&navigator.resolve("app.debug").unwrap().path), vec!["debug"]);
        assert!(navigator.resolve("app").unwrap().path.is_empty());
        assert!(navigator.resolve("debug").is_none());
    }

    #[test]
    fn test_leaf_and_collection_roots() {
        let leaf: Argument = NamedArgument::string().named("name").into();
        let navigator = Navigator::new(&leaf, &NameCase::Kebab);
        assert!(navigator.resolve("name").unwrap().path.is_empty());
        assert!(navigator.resolve("other").is_none());
        assert!(navigator.resolve("name.x").is_none());

        let positional: Argument = PositionalArgument::default().into();
        let navigator = Navigator::new(&positional, &NameCase::Kebab);
        assert!(navigator.resolve("anything").is_none());
        assert_eq!(navigator.positional_paths(), vec![Vec::<PathKey>::new()]);
    }

    #[test]
    fn test_find_all_breadth_first() {
        let root = tree();
        let navigator = Navigator::new(&root, &NameCase::Kebab);

        let positional: Vec<Vec<String>> =
            navigator.positional_paths().iter().map(|p| keys(p)).collect();
        assert_eq!(positional, vec![vec!["server", "files"]]);

        let bypassed: Vec<Vec<String>> =
            navigator.bypassed_paths().iter().map(|p| keys(p)).collect();
        assert_eq!(bypassed, vec![vec!["rest"]]);
    }

    #[test]
    fn test_union_children_are_reachable() {
        let root: Argument = UnionArgument::new(vec![
            ObjectArgument::new()
                .field("nested", NamedArgument::string())
                .into(),
            ObjectArgument::new()
                .field("another", NamedArgument::string())
                .field("items", PositionalArgument::default())
                .into(),
        ])
        .unwrap()
        .into();
        let navigator = Navigator::new(&root, &NameCase::Kebab);

        assert!(navigator.resolve("nested").is_some());
        assert!(navigator.resolve("another").is_some());
        assert_eq!(navigator.positional_paths().len(), 1);
    }

    #[test]
    fn test_flag_names() {
        let root = tree();
        let navigator = Navigator::new(&root, &NameCase::Kebab);

        assert_eq!(
            navigator.flag_names(),
            vec!["verbose", "v", "server", "server.port"]
        );
    }
}
