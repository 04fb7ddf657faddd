//! Structural invariants of the sandbox tree.
//!
//! Mutations are expected to preserve these; tests and debug builds of the
//! runner use [`validate_invariants`] to catch a corrupted tree early.

use std::collections::HashSet;

use crate::core::filesystem::{Filesystem, NodeId};

/// Check semantic invariants of the tree:
/// - Every child's parent link points back at the directory listing it
/// - No node is reachable twice (the graph is a tree)
/// - Sibling names are unique and contain no `/`
/// - Regular files have no children; their size matches the content length
/// - The current directory is a reachable directory whose path matches `pwd`
pub fn validate_invariants(fs: &Filesystem) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let root = fs.root();
    if fs.node(root).parent().is_some() {
        errors.push("/: root must not have a parent".to_string());
    }
    validate_node(fs, root, "/", &mut seen, &mut errors);

    let cwd = fs.cwd();
    if !seen.contains(&cwd) {
        errors.push(format!("{}: current directory is unreachable", fs.pwd()));
    } else {
        if !fs.node(cwd).is_dir() {
            errors.push(format!("{}: current directory is not a directory", fs.pwd()));
        }
        let actual = fs.path_of(cwd);
        if actual != fs.pwd() {
            errors.push(format!("pwd '{}' does not match node path '{}'", fs.pwd(), actual));
        }
    }
    errors
}

fn validate_node(
    fs: &Filesystem,
    id: NodeId,
    path: &str,
    seen: &mut HashSet<NodeId>,
    errors: &mut Vec<String>,
) {
    if !seen.insert(id) {
        errors.push(format!("{}: node reachable more than once", path));
        return;
    }
    let node = fs.node(id);
    match node.size() {
        Some(size) if size != node.content().len() => errors.push(format!(
            "{}: size {} does not match content length {}",
            path,
            size,
            node.content().len()
        )),
        None if !node.content().is_empty() => {
            errors.push(format!("{}: directory must not carry content", path));
        }
        _ => {}
    }
    if !node.is_dir() && !node.children().is_empty() {
        errors.push(format!("{}: regular file has children", path));
    }

    let mut names = HashSet::new();
    for child_id in node.children() {
        let child = fs.node(*child_id);
        let child_path = crate::core::path::join(path, child.name());
        if child.parent() != Some(id) {
            errors.push(format!("{}: parent link does not match", child_path));
        }
        if child.name().is_empty() || child.name().contains('/') {
            errors.push(format!("{}: invalid name '{}'", path, child.name()));
        }
        if !names.insert(child.name()) {
            errors.push(format!("{}: duplicate entry", child_path));
        }
        validate_node(fs, *child_id, &child_path, seen, errors);
    }
}
