//! In-memory sandbox filesystem.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A node's
//! parent is an index, never an owning pointer, so the tree has no reference
//! cycles. Removed nodes are detached from their parent and left unreachable;
//! cloning walks the reachable tree and rebuilds a compact arena. Once more
//! than [`COMPACT_THRESHOLD`] removed nodes make up over half the arena, the
//! next `rm` or `mv` compacts it the same way, so a [`NodeId`] is only valid
//! until the next mutation.
//!
//! Every mutating operation validates its inputs before touching the tree, so
//! a failed call leaves the filesystem exactly as it was.

use chrono::{DateTime, Utc};

use crate::core::error::FsError;
use crate::core::path;
use crate::core::types::{Metadata, NodeKind};
use crate::core::wildcard::Wildcard;

pub const DEFAULT_USER: &str = "learner";
pub const DEFAULT_HOME: &str = "/home/learner";

/// Unreachable nodes tolerated before the arena is rebuilt.
pub const COMPACT_THRESHOLD: usize = 256;

/// Index of a node inside a [`Filesystem`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One file or directory.
#[derive(Debug, Clone)]
pub struct FileNode {
    name: String,
    kind: NodeKind,
    content: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    modified: DateTime<Utc>,
    size: usize,
}

impl FileNode {
    fn new(name: &str, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            content: String::new(),
            children: Vec::new(),
            parent,
            modified: Utc::now(),
            size: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Content length in bytes; directories report no size.
    pub fn size(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Regular => Some(self.size),
            NodeKind::Directory => None,
        }
    }

    fn set_content(&mut self, content: String) {
        self.size = content.len();
        self.content = content;
        self.modified = Utc::now();
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            kind: self.kind,
            size: self.size(),
            modified: self.modified,
        }
    }
}

/// The sandbox tree plus the learner's shell position.
#[derive(Debug)]
pub struct Filesystem {
    nodes: Vec<FileNode>,
    root: NodeId,
    cwd: NodeId,
    cwd_path: String,
    home: String,
    user: String,
    /// Nodes removed since the arena was last rebuilt.
    garbage: usize,
}

impl Filesystem {
    /// Create a filesystem holding only the root directory.
    pub fn new(home: &str, user: &str) -> Self {
        let root = FileNode::new(path::ROOT, NodeKind::Directory, None);
        Self {
            nodes: vec![root],
            root: NodeId(0),
            cwd: NodeId(0),
            cwd_path: path::ROOT.to_string(),
            home: path::normalize(home),
            user: user.to_string(),
            garbage: 0,
        }
    }

    /// Create the standard learner environment and `cd` into the home directory.
    pub fn bootstrap(home: &str, user: &str) -> Result<Self, FsError> {
        let mut fs = Self::new(home, user);
        let home = fs.home.clone();
        fs.mkdir("/home")?;
        fs.mkdir(&home)?;
        fs.mkdir(&path::join(&home, "projects"))?;
        fs.mkdir(&path::join(&home, "documents"))?;
        fs.mkdir(&path::join(&home, "downloads"))?;
        fs.mkdir("/tmp")?;
        fs.mkdir("/var/log")?;
        fs.mkdir("/etc")?;
        fs.write_file(
            &path::join(&home, ".bashrc"),
            "# Bash configuration\nexport PATH=$PATH:~/bin\n",
        )?;
        fs.write_file(
            &path::join(&home, "readme.txt"),
            "Welcome to the terminal!\nThis is your home directory.\n",
        )?;
        let passwd = format!(
            "root:x:0:0:root:/root:/bin/bash\n{user}:x:1000:1000::{home}:/bin/bash\n",
            user = fs.user,
            home = home,
        );
        fs.write_file("/etc/passwd", &passwd)?;
        fs.cd(&home)?;
        Ok(fs)
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    pub fn node(&self, id: NodeId) -> &FileNode {
        &self.nodes[id.0]
    }

    /// Resolve `path` against the current directory and home.
    pub fn resolve(&self, path: &str) -> String {
        path::resolve(path, &self.cwd_path, &self.home)
    }

    /// Find the node a path refers to, if any.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.lookup_abs(&self.resolve(path))
    }

    /// Absolute path of a reachable node.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                break;
            }
            let node = self.node(node_id);
            names.push(node.name.as_str());
            current = node.parent;
        }
        if names.is_empty() {
            return path::ROOT.to_string();
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Create a directory and any missing ancestors.
    pub fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        let abs = self.resolve(path);
        self.ensure_dir(&abs).map(|_| ())
    }

    /// Create an empty file, or refresh the modification time of an existing node.
    pub fn touch(&mut self, path: &str) -> Result<(), FsError> {
        let abs = self.resolve(path);
        self.touch_abs(&abs).map(|_| ())
    }

    /// Replace the content of a file, creating it (and its ancestors) if absent.
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<(), FsError> {
        let abs = self.resolve(path);
        if let Some(id) = self.lookup_abs(&abs)
            && self.node(id).is_dir()
        {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        let id = self.touch_abs(&abs)?;
        self.node_mut(id).set_content(content.to_string());
        Ok(())
    }

    /// Append to a file, creating it if absent.
    pub fn append_file(&mut self, path: &str, content: &str) -> Result<(), FsError> {
        let existing = match self.read_file(path) {
            Ok(existing) => existing.to_string(),
            Err(FsError::NotFound(_)) => String::new(),
            Err(err) => return Err(err),
        };
        self.write_file(path, &format!("{existing}{content}"))
    }

    pub fn read_file(&self, path: &str) -> Result<&str, FsError> {
        let id = self
            .lookup(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let node = self.node(id);
        if node.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        Ok(&node.content)
    }

    /// Change the current directory. An empty path or `~` goes home.
    pub fn cd(&mut self, path: &str) -> Result<(), FsError> {
        let target = if path.is_empty() { "~" } else { path };
        let abs = self.resolve(target);
        let id = self
            .lookup_abs(&abs)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        if !self.node(id).is_dir() {
            return Err(FsError::NotADirectory(path.to_string()));
        }
        self.cwd = id;
        self.cwd_path = abs;
        Ok(())
    }

    pub fn pwd(&self) -> &str {
        &self.cwd_path
    }

    /// Sorted entry names; directories carry a trailing `/`.
    pub fn ls(&self, path: &str, show_hidden: bool) -> Result<Vec<String>, FsError> {
        Ok(self
            .entries(path, show_hidden)?
            .into_iter()
            .map(|entry| {
                if entry.is_dir() {
                    format!("{}/", entry.name)
                } else {
                    entry.name
                }
            })
            .collect())
    }

    /// Metadata for the children of a directory, sorted by name.
    ///
    /// A regular file lists as itself. Dotfiles are skipped unless
    /// `show_hidden` is set.
    pub fn entries(&self, path: &str, show_hidden: bool) -> Result<Vec<Metadata>, FsError> {
        let id = self
            .lookup(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        let node = self.node(id);
        if !node.is_dir() {
            return Ok(vec![node.metadata()]);
        }
        let mut entries: Vec<Metadata> = node
            .children
            .iter()
            .map(|child| self.node(*child))
            .filter(|child| show_hidden || !child.name.starts_with('.'))
            .map(FileNode::metadata)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        self.lookup(path)
            .map(|id| self.node(id).metadata())
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    /// Remove a regular file. Directories are refused.
    pub fn rm(&mut self, path: &str) -> Result<(), FsError> {
        let id = self
            .lookup(path)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        if id == self.root {
            return Err(FsError::RemoveRoot);
        }
        if self.node(id).is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        self.discard(id);
        self.compact_if_sparse();
        Ok(())
    }

    /// Copy a regular file. A directory destination receives the source's base name.
    pub fn cp(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        let src_id = self
            .lookup(src)
            .ok_or_else(|| FsError::NotFound(src.to_string()))?;
        let src_node = self.node(src_id);
        if src_node.is_dir() {
            return Err(FsError::IsADirectory(src.to_string()));
        }
        let content = src_node.content.clone();
        let name = src_node.name.clone();
        let target = self.destination(dst, &name);
        if let Some(id) = self.lookup_abs(&target)
            && self.node(id).is_dir()
        {
            return Err(FsError::IsADirectory(target));
        }
        self.write_file(&target, &content)
    }

    /// Move or rename a file or directory.
    pub fn mv(&mut self, src: &str, dst: &str) -> Result<(), FsError> {
        let src_abs = self.resolve(src);
        let src_id = self
            .lookup_abs(&src_abs)
            .ok_or_else(|| FsError::NotFound(src.to_string()))?;
        let src_name = self.node(src_id).name.clone();
        let target = self.destination(dst, &src_name);
        if target == src_abs {
            return Ok(());
        }
        let src_is_dir = self.node(src_id).is_dir();
        if src_id == self.root || (src_is_dir && path::is_within(&target, &src_abs)) {
            return Err(FsError::InvalidMove {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }
        let Some((parent_abs, new_name)) = path::split_parent(&target) else {
            return Err(FsError::IsADirectory(target));
        };
        let replaced = self.lookup_abs(&target);
        if let Some(existing) = replaced {
            if self.node(existing).is_dir() {
                return Err(FsError::IsADirectory(target.clone()));
            }
            if src_is_dir {
                return Err(FsError::NotADirectory(target.clone()));
            }
        }
        let new_name = new_name.to_string();
        let parent_id = self.ensure_dir(&parent_abs)?;

        if let Some(existing) = replaced {
            self.discard(existing);
        }
        self.detach(src_id);
        self.node_mut(src_id).name = new_name;
        self.attach(parent_id, src_id);
        // The current directory may have moved with the subtree.
        self.cwd_path = self.path_of(self.cwd);
        self.compact_if_sparse();
        Ok(())
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.lookup(path).is_some_and(|id| self.node(id).is_dir())
    }

    /// Lines of a file containing `pattern` as a literal substring.
    pub fn grep(&self, pattern: &str, path: &str) -> Result<Vec<String>, FsError> {
        let content = self.read_file(path)?;
        Ok(content
            .lines()
            .filter(|line| line.contains(pattern))
            .map(str::to_string)
            .collect())
    }

    /// Absolute paths under `start` (inclusive) whose base name matches `pattern`.
    ///
    /// The walk is pre-order with siblings visited by name.
    pub fn find(&self, start: &str, pattern: &str) -> Result<Vec<String>, FsError> {
        let matcher = Wildcard::compile(pattern)?;
        let start_abs = self.resolve(start);
        let start_id = self
            .lookup_abs(&start_abs)
            .ok_or_else(|| FsError::NotFound(start.to_string()))?;
        let mut results = Vec::new();
        self.find_inner(start_id, start_abs, &matcher, &mut results);
        Ok(results)
    }

    fn find_inner(&self, id: NodeId, abs: String, matcher: &Wildcard, results: &mut Vec<String>) {
        let node = self.node(id);
        if matcher.matches(&node.name) {
            results.push(abs.clone());
        }
        let mut children = node.children.clone();
        children.sort_by(|a, b| self.node(*a).name.cmp(&self.node(*b).name));
        for child in children {
            let child_path = path::join(&abs, &self.node(child).name);
            self.find_inner(child, child_path, matcher, results);
        }
    }

    /// Resolve a copy/move destination: an existing directory receives `name`.
    fn destination(&self, dst: &str, name: &str) -> String {
        let abs = self.resolve(dst);
        match self.lookup_abs(&abs) {
            Some(id) if self.node(id).is_dir() => path::join(&abs, name),
            _ => abs,
        }
    }

    fn lookup_abs(&self, abs: &str) -> Option<NodeId> {
        let mut current = self.root;
        for segment in path::segments(abs) {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    fn find_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.node(dir)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).name == name)
    }

    /// Walk `abs`, creating missing directories. Validates the whole path first.
    fn ensure_dir(&mut self, abs: &str) -> Result<NodeId, FsError> {
        let segments: Vec<&str> = path::segments(abs).collect();
        let mut current = self.root;
        let mut walked = String::from(path::ROOT);
        let mut existing = 0;
        for segment in &segments {
            let Some(child) = self.find_child(current, segment) else {
                break;
            };
            walked = path::join(&walked, segment);
            if !self.node(child).is_dir() {
                return Err(FsError::NotADirectory(walked));
            }
            current = child;
            existing += 1;
        }
        for segment in &segments[existing..] {
            let id = self.alloc(FileNode::new(segment, NodeKind::Directory, None));
            self.attach(current, id);
            current = id;
        }
        Ok(current)
    }

    fn touch_abs(&mut self, abs: &str) -> Result<NodeId, FsError> {
        if let Some(id) = self.lookup_abs(abs) {
            self.node_mut(id).modified = Utc::now();
            return Ok(id);
        }
        let Some((parent_abs, name)) = path::split_parent(abs) else {
            return Ok(self.root);
        };
        let parent = self.ensure_dir(&parent_abs)?;
        let id = self.alloc(FileNode::new(name, NodeKind::Regular, None));
        self.attach(parent, id);
        Ok(id)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut FileNode {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, node: FileNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
    }

    /// Detach a regular file for good.
    fn discard(&mut self, id: NodeId) {
        self.detach(id);
        self.garbage += 1;
    }

    fn compact_if_sparse(&mut self) {
        if self.garbage > COMPACT_THRESHOLD && self.garbage * 2 > self.nodes.len() {
            *self = self.clone();
        }
    }
}

impl Clone for Filesystem {
    /// Deep copy of the reachable tree with freshly assigned ids.
    fn clone(&self) -> Self {
        let mut copy = Self {
            nodes: Vec::with_capacity(self.nodes.len()),
            root: NodeId(0),
            cwd: NodeId(0),
            cwd_path: self.cwd_path.clone(),
            home: self.home.clone(),
            user: self.user.clone(),
            garbage: 0,
        };
        let root = copy_subtree(self, self.root, &mut copy, None);
        copy.root = root;
        copy.cwd = copy.lookup_abs(&copy.cwd_path).unwrap_or(root);
        copy
    }
}

fn copy_subtree(
    from: &Filesystem,
    id: NodeId,
    to: &mut Filesystem,
    parent: Option<NodeId>,
) -> NodeId {
    let source = from.node(id);
    let copied = to.alloc(FileNode {
        name: source.name.clone(),
        kind: source.kind,
        content: source.content.clone(),
        children: Vec::with_capacity(source.children.len()),
        parent,
        modified: source.modified,
        size: source.size,
    });
    for child in &source.children {
        let child_copy = copy_subtree(from, *child, to, Some(copied));
        to.node_mut(copied).children.push(child_copy);
    }
    copied
}
