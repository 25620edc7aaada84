//! Shell-style wildcard matching for search terms.
//!
//! `*` matches any run of characters (slashes included), `?` matches exactly
//! one character, and everything else is literal. Matching is
//! case-insensitive and anchored at both ends.

use normalize::whitespace;
use regex::{Regex, RegexBuilder};

#[derive(Debug)]
pub enum PatternError {
    Regex(regex::Error),
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::Regex(err) => write!(f, "pattern error: {}", err),
        }
    }
}

impl std::error::Error for PatternError {}

impl From<regex::Error> for PatternError {
    fn from(err: regex::Error) -> Self {
        PatternError::Regex(err)
    }
}

#[derive(Clone, Debug)]
pub struct WildcardPattern {
    text: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Turns a raw search term into a pattern, see [`pattern_text`].
    pub fn from_term(raw: &str) -> Result<Self, PatternError> {
        Self::new(&pattern_text(raw))
    }

    /// Compiles already prepared wildcard text as-is.
    pub fn new(text: &str) -> Result<Self, PatternError> {
        let regex = RegexBuilder::new(&wildcard_to_regex(text))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()?;
        Ok(Self {
            text: text.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whole-string match.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// True when the pattern is nothing but `*`, i.e. it matches everything.
    pub fn is_blank(&self) -> bool {
        is_blank(&self.text)
    }
}

pub fn is_blank(text: &str) -> bool {
    text.chars().all(|ch| ch == '*')
}

/// `"Some (Live) song"` becomes `"*Some*Live*song*"`.
///
/// Whitespace is canonicalized first; spaces, brackets, parentheses and
/// slashes turn into `*`, the term is wrapped in `*`, and runs of `*` are
/// collapsed.
pub fn pattern_text(raw: &str) -> String {
    let spaced = whitespace::normalize(raw);
    let mut text = String::with_capacity(spaced.len() + 2);
    text.push('*');
    for ch in spaced.chars() {
        match ch {
            ' ' | '[' | ']' | '(' | ')' | '/' | '\\' => text.push('*'),
            _ => text.push(ch),
        }
    }
    text.push('*');
    collapse_stars(&text)
}

pub fn collapse_stars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_star = false;
    for ch in text.chars() {
        if ch == '*' {
            if previous_star {
                continue;
            }
            previous_star = true;
        } else {
            previous_star = false;
        }
        out.push(ch);
    }
    out
}

fn wildcard_to_regex(text: &str) -> String {
    let mut regex = String::from(r"\A");
    let mut literal = String::new();
    for ch in text.chars() {
        match ch {
            '*' | '?' => {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
                regex.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    regex.push_str(&regex::escape(&literal));
    regex.push_str(r"\z");
    regex
}
