//! Glob matching confined to a single query level.
//!
//! Supported syntax: `*`, `?`, `[...]` character classes with ranges and
//! `!`/`^` negation, `{a,b}` alternation (empty alternatives allowed) and `\`
//! escapes. A level is translated to an anchored regular expression, so `?`
//! and class members match one Unicode character. A malformed level
//! compiles to `None` and matches nothing.

use std::str::Chars;

use metricspace_domain::utils::levels::{contains_expressions, is_match_all};
use regex::Regex;

/// Compiled pattern for one level of a search query.
#[derive(Debug, Clone)]
pub struct LevelPattern {
    glob: String,
    regex: Regex,
}

impl LevelPattern {
    /// Compiles a level, returning `None` if it is malformed (unclosed `[` or
    /// `{`, nested `{`, trailing `\`, reversed class range).
    pub fn compile(level: &str) -> Option<Self> {
        let source = translate(level)?;
        let regex = Regex::new(&source).ok()?;
        Some(Self { glob: level.to_owned(), regex })
    }

    /// Returns `true` when the whole level name matches.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

impl PartialEq for LevelPattern {
    fn eq(&self, other: &Self) -> bool {
        self.glob == other.glob
    }
}

impl Eq for LevelPattern {}

/// One level of a parsed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryLevel<'a> {
    /// Plain name, looked up by key.
    Literal(&'a str),
    /// Bare `*`.
    MatchAll,
    Pattern(LevelPattern),
    /// Unparseable pattern; the branch yields nothing.
    Malformed(&'a str),
}

impl<'a> QueryLevel<'a> {
    pub(crate) fn parse(level: &'a str) -> Self {
        if !contains_expressions(level) {
            Self::Literal(level)
        } else if is_match_all(level) {
            Self::MatchAll
        } else {
            LevelPattern::compile(level).map_or(Self::Malformed(level), Self::Pattern)
        }
    }
}

/// Rewrites a glob level as an anchored regex source.
fn translate(glob: &str) -> Option<String> {
    let mut out = String::from(r"\A(?s:");
    let mut chars = glob.chars();
    let mut in_group = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => push_literal(&mut out, chars.next()?),
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => translate_class(&mut chars, &mut out)?,
            '{' if in_group => return None,
            '{' => {
                in_group = true;
                out.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                out.push(')');
            }
            ',' if in_group => out.push('|'),
            _ => push_literal(&mut out, c),
        }
    }
    if in_group {
        return None;
    }
    out.push_str(r")\z");
    Some(out)
}

/// Consumes a character class up to its closing `]`. A `]` directly after the
/// opening bracket (or its negation mark) is a member, not the terminator.
fn translate_class(chars: &mut Chars<'_>, out: &mut String) -> Option<()> {
    out.push('[');
    let mut members = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '!' | '^' if members == 0 && out.ends_with('[') => out.push('^'),
            ']' if members > 0 => {
                out.push(']');
                return Some(());
            }
            '-' if members > 0 && !chars.as_str().starts_with(']') => out.push('-'),
            '\\' => {
                push_class_member(out, chars.next()?);
                members += 1;
            }
            _ => {
                push_class_member(out, c);
                members += 1;
            }
        }
    }
    None
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

fn push_class_member(out: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(c);
}
