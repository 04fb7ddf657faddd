//! Goal DSL: mission-completion predicates over sandbox state.
//!
//! Goals arrive as untyped nested maps (already deserialized by the content
//! loader) and are parsed once into a [`GoalNode`] tree. Each map holds
//! exactly one key naming the operation; `null` and `{}` mean "always".
//!
//! ```text
//! {"and": [{"path_exists": "/documents/report.pdf"},
//!          {"not": {"path_exists": "/downloads/report.pdf"}}]}
//! ```

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::error::FsError;
use crate::core::filesystem::Filesystem;
use crate::core::path;

/// Read-only view of sandbox state needed to evaluate a goal.
pub trait GoalView {
    fn pwd(&self) -> &str;
    fn exists(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
    fn read_file(&self, path: &str) -> Result<&str, FsError>;

    /// Absolute form of a goal path. Views that know a home directory and
    /// current directory should expand `~` and relative paths.
    fn resolve(&self, path: &str) -> String {
        if path.starts_with('/') {
            path::normalize(path)
        } else {
            path.to_string()
        }
    }

    /// The most recently executed command line, if the view tracks one and
    /// that command succeeded.
    fn last_command(&self) -> Option<&str> {
        None
    }

    /// Pane count of the attached multiplexer session, if any.
    fn attached_panes(&self) -> Option<usize> {
        None
    }
}

impl GoalView for Filesystem {
    fn pwd(&self) -> &str {
        Filesystem::pwd(self)
    }

    fn exists(&self, path: &str) -> bool {
        Filesystem::exists(self, path)
    }

    fn is_dir(&self, path: &str) -> bool {
        Filesystem::is_dir(self, path)
    }

    fn read_file(&self, path: &str) -> Result<&str, FsError> {
        Filesystem::read_file(self, path)
    }

    fn resolve(&self, path: &str) -> String {
        Filesystem::resolve(self, path)
    }
}

/// Parsed goal expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalNode {
    Always,
    PwdEquals(String),
    PathExists(String),
    PathNotExists(String),
    IsDir(String),
    IsFile(String),
    FileContains { path: String, content: String },
    /// The verb (first token) of the last command line equals this name.
    RanCommand(String),
    /// An attached tmux session has at least this many panes.
    TmuxPanes(usize),
    And(Vec<GoalNode>),
    Or(Vec<GoalNode>),
    Not(Box<GoalNode>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalParseError {
    #[error("unknown goal operation: {0}")]
    UnknownKey(String),

    #[error("{key} expects {expected}, got {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("goal must be a map, got {0}")]
    NotAMap(&'static str),

    #[error("goal must have exactly one key, got {}", .0.join(", "))]
    MultipleKeys(Vec<String>),

    #[error("file_contains.{0} is required")]
    MissingField(&'static str),

    #[error("{location}: {source}")]
    At {
        location: String,
        source: Box<GoalParseError>,
    },
}

impl GoalParseError {
    fn at(location: impl Into<String>, err: GoalParseError) -> Self {
        Self::At {
            location: location.into(),
            source: Box::new(err),
        }
    }
}

impl GoalNode {
    /// Parse an untyped goal structure.
    pub fn parse(value: &Value) -> Result<Self, GoalParseError> {
        match value {
            Value::Null => Ok(Self::Always),
            Value::Object(map) => parse_map(map),
            other => Err(GoalParseError::NotAMap(type_name(other))),
        }
    }

    pub fn evaluate<V: GoalView + ?Sized>(&self, view: &V) -> bool {
        match self {
            Self::Always => true,
            Self::PwdEquals(expected) => view.pwd() == view.resolve(expected),
            Self::PathExists(p) => view.exists(p),
            Self::PathNotExists(p) => !view.exists(p),
            Self::IsDir(p) => view.is_dir(p),
            Self::IsFile(p) => view.exists(p) && !view.is_dir(p),
            Self::FileContains { path, content } => view
                .read_file(path)
                .is_ok_and(|body| body.contains(content.as_str())),
            Self::RanCommand(verb) => view
                .last_command()
                .and_then(|line| line.split_whitespace().next())
                .is_some_and(|first| first == verb),
            Self::TmuxPanes(min) => view.attached_panes().is_some_and(|panes| panes >= *min),
            Self::And(children) => children.iter().all(|child| child.evaluate(view)),
            Self::Or(children) => children.iter().any(|child| child.evaluate(view)),
            Self::Not(child) => !child.evaluate(view),
        }
    }
}

impl fmt::Display for GoalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::PwdEquals(p) => write!(f, "pwd_equals({p})"),
            Self::PathExists(p) => write!(f, "path_exists({p})"),
            Self::PathNotExists(p) => write!(f, "path_not_exists({p})"),
            Self::IsDir(p) => write!(f, "is_dir({p})"),
            Self::IsFile(p) => write!(f, "is_file({p})"),
            Self::FileContains { path, content } => {
                write!(f, "file_contains({path}, {content:?})")
            }
            Self::RanCommand(verb) => write!(f, "ran_command({verb})"),
            Self::TmuxPanes(min) => write!(f, "tmux_panes({min})"),
            Self::And(children) => write_list(f, "and", children),
            Self::Or(children) => write_list(f, "or", children),
            Self::Not(child) => write!(f, "not({child})"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, children: &[GoalNode]) -> fmt::Result {
    write!(f, "{name}(")?;
    for (idx, child) in children.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, ")")
}

fn parse_map(map: &Map<String, Value>) -> Result<GoalNode, GoalParseError> {
    let mut entries = map.iter();
    let Some((key, value)) = entries.next() else {
        return Ok(GoalNode::Always);
    };
    if map.len() > 1 {
        return Err(GoalParseError::MultipleKeys(map.keys().cloned().collect()));
    }
    parse_key(key, value)
}

fn parse_key(key: &str, value: &Value) -> Result<GoalNode, GoalParseError> {
    match key {
        "always" => Ok(GoalNode::Always),
        "pwd_equals" => expect_string(key, value).map(GoalNode::PwdEquals),
        "path_exists" => expect_string(key, value).map(GoalNode::PathExists),
        "path_not_exists" => expect_string(key, value).map(GoalNode::PathNotExists),
        "is_dir" => expect_string(key, value).map(GoalNode::IsDir),
        "is_file" => expect_string(key, value).map(GoalNode::IsFile),
        "ran_command" => expect_string(key, value).map(GoalNode::RanCommand),
        "tmux_panes" => expect_count(key, value).map(GoalNode::TmuxPanes),
        "file_contains" => parse_file_contains(value),
        "and" => parse_list(key, value).map(GoalNode::And),
        "or" => parse_list(key, value).map(GoalNode::Or),
        "not" => parse_not(value),
        other => Err(GoalParseError::UnknownKey(other.to_string())),
    }
}

fn expect_string(key: &str, value: &Value) -> Result<String, GoalParseError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GoalParseError::WrongType {
            key: key.to_string(),
            expected: "string",
            found: type_name(value),
        })
}

fn expect_count(key: &str, value: &Value) -> Result<usize, GoalParseError> {
    value
        .as_u64()
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| GoalParseError::WrongType {
            key: key.to_string(),
            expected: "non-negative integer",
            found: type_name(value),
        })
}

fn parse_file_contains(value: &Value) -> Result<GoalNode, GoalParseError> {
    let map = value.as_object().ok_or_else(|| GoalParseError::WrongType {
        key: "file_contains".to_string(),
        expected: "map with path and content",
        found: type_name(value),
    })?;
    let field = |name: &'static str| -> Result<String, GoalParseError> {
        let raw = map.get(name).ok_or(GoalParseError::MissingField(name))?;
        expect_string(&format!("file_contains.{name}"), raw)
    };
    Ok(GoalNode::FileContains {
        path: field("path")?,
        content: field("content")?,
    })
}

fn parse_list(key: &str, value: &Value) -> Result<Vec<GoalNode>, GoalParseError> {
    let items = value.as_array().ok_or_else(|| GoalParseError::WrongType {
        key: key.to_string(),
        expected: "array",
        found: type_name(value),
    })?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let location = format!("{key}[{idx}]");
            match item {
                Value::Object(map) => {
                    parse_map(map).map_err(|err| GoalParseError::at(location, err))
                }
                other => Err(GoalParseError::WrongType {
                    key: location,
                    expected: "map",
                    found: type_name(other),
                }),
            }
        })
        .collect()
}

fn parse_not(value: &Value) -> Result<GoalNode, GoalParseError> {
    let map = value.as_object().ok_or_else(|| GoalParseError::WrongType {
        key: "not".to_string(),
        expected: "map",
        found: type_name(value),
    })?;
    let child = parse_map(map).map_err(|err| GoalParseError::at("not", err))?;
    Ok(GoalNode::Not(Box::new(child)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
