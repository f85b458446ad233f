//! Hierarchical namespace tree, rooted at `::` (§3 "Namespace", §4.7).
//!
//! Deliberately named apart from the teacher's `namespace.rs` (that file is
//! a frame-local-variable arena unrelated to this module's job: an
//! actual `::`-qualified tree of commands, exports, and variables).

use ahash::AHashMap;

use crate::{command::Command, glob::glob_match, obj::Obj, trace_spec::TraceSpec};

/// One node in the namespace tree.
#[derive(Debug, Default)]
pub struct Namespace {
    /// Fully-qualified path; `"::"` for the root.
    pub path: String,
    pub children: AHashMap<String, usize>,
    pub vars: AHashMap<String, Obj>,
    pub commands: AHashMap<String, Command>,
    pub exports: Vec<String>,
    /// Trace specs for this namespace's own variables (§4.9 `trace`).
    pub traces: AHashMap<String, Vec<TraceSpec>>,
}

impl Namespace {
    fn new(path: String) -> Self {
        Self { path, ..Self::default() }
    }
}

/// Owns every [`Namespace`] node by index; the root is always index 0.
#[derive(Debug)]
pub struct NamespaceTree {
    nodes: Vec<Namespace>,
    parents: Vec<Option<usize>>,
}

const ROOT: usize = 0;

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Namespace::new("::".to_owned())],
            parents: vec![None],
        }
    }

    #[must_use]
    pub fn root(&self) -> usize {
        ROOT
    }

    #[must_use]
    pub fn node(&self, id: usize) -> &Namespace {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: usize) -> &mut Namespace {
        &mut self.nodes[id]
    }

    #[must_use]
    pub fn path_of(&self, id: usize) -> &str {
        &self.nodes[id].path
    }

    #[must_use]
    pub fn parent_of(&self, id: usize) -> Option<usize> {
        self.parents[id]
    }

    #[must_use]
    pub fn children_of(&self, id: usize) -> impl Iterator<Item = (&str, usize)> {
        self.nodes[id].children.iter().map(|(name, &child)| (name.as_str(), child))
    }

    /// Splits a `::`-separated qualified or relative name into its segments.
    #[must_use]
    pub fn split_path(name: &str) -> (bool, Vec<&str>) {
        let absolute = name.starts_with("::");
        let trimmed = name.trim_start_matches("::");
        let segments: Vec<&str> = trimmed.split("::").filter(|s| !s.is_empty()).collect();
        (absolute, segments)
    }

    /// Resolves a (possibly relative) namespace path to a node id, creating
    /// intermediate namespaces as needed (`namespace eval`'s auto-vivify rule, §4.7).
    pub fn ensure_path(&mut self, current: usize, name: &str) -> usize {
        let (absolute, segments) = Self::split_path(name);
        let mut cur = if absolute { ROOT } else { current };
        for seg in segments {
            cur = if let Some(&child) = self.nodes[cur].children.get(seg) {
                child
            } else {
                let child_path = if self.nodes[cur].path == "::" {
                    format!("::{seg}")
                } else {
                    format!("{}::{seg}", self.nodes[cur].path)
                };
                let id = self.nodes.len();
                self.nodes.push(Namespace::new(child_path));
                self.parents.push(Some(cur));
                self.nodes[cur].children.insert(seg.to_owned(), id);
                id
            };
        }
        cur
    }

    /// Resolves a path without creating anything; returns `None` if any
    /// segment is missing.
    #[must_use]
    pub fn find_path(&self, current: usize, name: &str) -> Option<usize> {
        let (absolute, segments) = Self::split_path(name);
        let mut cur = if absolute { ROOT } else { current };
        for seg in segments {
            cur = *self.nodes[cur].children.get(seg)?;
        }
        Some(cur)
    }

    /// Command lookup per §4.4/§4.7: qualified names resolve directly;
    /// unqualified names search the given namespace, then each ancestor, to root.
    #[must_use]
    pub fn lookup_command(&self, current: usize, name: &str) -> Option<(usize, &Command)> {
        if name.contains("::") {
            let (_, mut segments) = Self::split_path(name);
            let leaf = segments.pop()?;
            let ns_path = segments.join("::");
            let ns = if ns_path.is_empty() {
                if name.starts_with("::") { ROOT } else { current }
            } else {
                self.find_path(current, &ns_path)?
            };
            return self.nodes[ns].commands.get(leaf).map(|c| (ns, c));
        }
        let mut cur = Some(current);
        while let Some(id) = cur {
            if let Some(c) = self.nodes[id].commands.get(name) {
                return Some((id, c));
            }
            cur = self.parents[id];
        }
        None
    }

    pub fn set_command(&mut self, ns: usize, name: impl Into<String>, command: Command) {
        self.nodes[ns].commands.insert(name.into(), command);
    }

    pub fn remove_command(&mut self, ns: usize, name: &str) -> Option<Command> {
        self.nodes[ns].commands.remove(name)
    }

    /// `namespace import`: copies commands from `src_ns` matching `pattern`
    /// (only those the source namespace has exported) into `dest_ns`.
    pub fn import(&mut self, dest_ns: usize, src_ns: usize, pattern: &str) -> Vec<String> {
        let exported: Vec<String> = self.nodes[src_ns]
            .commands
            .keys()
            .filter(|name| glob_match(pattern, name) && self.nodes[src_ns].exports.iter().any(|exp| glob_match(exp, name)))
            .cloned()
            .collect();
        for name in &exported {
            if let Some(cmd) = self.nodes[src_ns].commands.get(name).cloned() {
                self.nodes[dest_ns].commands.insert(name.clone(), cmd);
            }
        }
        exported
    }

    /// Deletes a namespace and its descendants, along with their variables
    /// and commands. Re-entrancy (deleting a namespace whose command is on
    /// the active call stack) is left to the caller to reject (§4.7, §9
    /// open question): this method only performs the structural removal.
    pub fn delete(&mut self, id: usize) {
        if id == ROOT {
            return;
        }
        let children: Vec<usize> = self.nodes[id].children.values().copied().collect();
        for child in children {
            self.delete(child);
        }
        self.nodes[id].vars.clear();
        self.nodes[id].commands.clear();
        self.nodes[id].exports.clear();
        if let Some(parent) = self.parents[id] {
            let self_name = self.nodes[id].path.rsplit("::").next().unwrap_or_default().to_owned();
            self.nodes[parent].children.remove(&self_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_path_creates_intermediate_namespaces() {
        let mut tree = NamespaceTree::new();
        let id = tree.ensure_path(tree.root(), "foo::bar");
        assert_eq!(tree.path_of(id), "::foo::bar");
    }

    #[test]
    fn command_lookup_searches_ancestors() {
        let mut tree = NamespaceTree::new();
        let foo = tree.ensure_path(tree.root(), "foo");
        tree.set_command(tree.root(), "helper", Command::builtin_placeholder());
        let (found_in, _) = tree.lookup_command(foo, "helper").unwrap();
        assert_eq!(found_in, tree.root());
    }

    #[test]
    fn delete_removes_descendants() {
        let mut tree = NamespaceTree::new();
        let foo = tree.ensure_path(tree.root(), "foo");
        let _bar = tree.ensure_path(foo, "bar");
        tree.delete(foo);
        assert!(tree.find_path(tree.root(), "foo").is_none());
    }
}
