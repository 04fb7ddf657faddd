//! Lexical path handling for the sandbox filesystem.
//!
//! Nothing here touches the tree: paths are rewritten as strings, so `..`
//! pops a segment even if the segment does not exist.

pub const ROOT: &str = "/";

/// Resolve `path` to a normalized absolute path.
///
/// `~` and `~/...` expand against `home`; other relative paths are joined to
/// `cwd`. An empty path resolves to `cwd`.
pub fn resolve(path: &str, cwd: &str, home: &str) -> String {
    if path.is_empty() {
        return normalize(cwd);
    }
    let expanded = if path == "~" {
        home.to_string()
    } else if let Some(rest) = path.strip_prefix("~/") {
        format!("{}/{}", home.trim_end_matches('/'), rest)
    } else {
        path.to_string()
    };
    if expanded.starts_with('/') {
        normalize(&expanded)
    } else {
        normalize(&format!("{}/{}", cwd, expanded))
    }
}

/// Collapse `.`, `..` and repeated separators; `..` is bounded at the root.
pub fn normalize(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    if stack.is_empty() {
        return ROOT.to_string();
    }
    format!("/{}", stack.join("/"))
}

/// Segments of a normalized absolute path (empty for the root).
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Split a normalized absolute path into parent path and base name.
///
/// Returns `None` for the root, which has no parent.
pub fn split_parent(path: &str) -> Option<(String, &str)> {
    if path == ROOT {
        return None;
    }
    let idx = path.rfind('/')?;
    let name = &path[idx + 1..];
    let parent = if idx == 0 {
        ROOT.to_string()
    } else {
        path[..idx].to_string()
    };
    Some((parent, name))
}

/// Join a child name onto a normalized absolute directory path.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// True if `path` equals `ancestor` or lies beneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}
