//! Shell-style wildcard matching for `find -name`.
//!
//! Supported syntax: `*`, `?`, bracket classes (`[abc]`, `[a-z]`, `[!x]`,
//! `[^x]`) and backslash escapes. Patterns compile to an anchored regex.

use regex::Regex;

use crate::core::error::FsError;

/// A compiled wildcard pattern matched against a single base name.
#[derive(Debug, Clone)]
pub struct Wildcard {
    regex: Regex,
}

impl Wildcard {
    pub fn compile(pattern: &str) -> Result<Self, FsError> {
        let source = translate(pattern).map_err(|reason| invalid(pattern, reason))?;
        let regex = Regex::new(&source).map_err(|err| invalid(pattern, err.to_string()))?;
        Ok(Self { regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

fn invalid(pattern: &str, reason: impl Into<String>) -> FsError {
    FsError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

fn push_class_literal(out: &mut String, c: char) {
    if c.is_ascii_punctuation() {
        out.push('\\');
    }
    out.push(c);
}

fn translate(pattern: &str) -> Result<String, String> {
    let mut out = String::from("(?s)^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| "trailing backslash".to_string())?;
                out.push_str(&regex::escape(&escaped.to_string()));
            }
            '[' => {
                out.push('[');
                if matches!(chars.peek(), Some('!') | Some('^')) {
                    chars.next();
                    out.push('^');
                }
                let mut members = 0usize;
                let mut closed = false;
                while let Some(member) = chars.next() {
                    match member {
                        // A leading `]` is a literal member, not the terminator.
                        ']' if members > 0 => {
                            closed = true;
                            break;
                        }
                        '\\' => {
                            let escaped = chars
                                .next()
                                .ok_or_else(|| "trailing backslash".to_string())?;
                            push_class_literal(&mut out, escaped);
                        }
                        '-' => out.push('-'),
                        '[' | ']' | '^' | '&' | '~' => push_class_literal(&mut out, member),
                        other => out.push(other),
                    }
                    members += 1;
                }
                if !closed {
                    return Err("unterminated character class".to_string());
                }
                out.push(']');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    Ok(out)
}
