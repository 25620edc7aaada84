//! Search term compiler.
//!
//! A term is split on `|`. The first part is the main search; each further
//! part is a modifier introduced by a keyword and a single space:
//!
//! | modifier   | effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `a <text>` | extend the main search, `song|a live` searches `*song*live*` |
//! | `w <text>` | also accept matches for `<text>`                            |
//! | `wo <text>`| drop candidates with any search string matching `<text>`   |
//! | `wg <text>`| drop candidates whose genre matches `<text>`                |
//!
//! Anything else after a `|` is ignored.

pub mod wildcard;

use tracing::{debug, warn};

pub use wildcard::{PatternError, WildcardPattern};

use wildcard::{collapse_stars, is_blank, pattern_text};

/// Sorted so exclusions come first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseRole {
    ExcludeTerms,
    ExcludeGenre,
    Default,
    Include,
}

impl ClauseRole {
    pub fn is_exclusion(self) -> bool {
        matches!(self, ClauseRole::ExcludeTerms | ClauseRole::ExcludeGenre)
    }
}

#[derive(Clone, Debug)]
pub struct Clause {
    role: ClauseRole,
    pattern: WildcardPattern,
}

impl Clause {
    pub fn role(&self) -> ClauseRole {
        self.role
    }

    pub fn pattern(&self) -> &WildcardPattern {
        &self.pattern
    }
}

enum Modifier<'a> {
    Extend(&'a str),
    Include(&'a str),
    ExcludeTerms(&'a str),
    ExcludeGenre(&'a str),
}

fn parse_modifier(part: &str) -> Option<Modifier<'_>> {
    if let Some(text) = part.strip_prefix("a ") {
        Some(Modifier::Extend(text))
    } else if let Some(text) = part.strip_prefix("w ") {
        Some(Modifier::Include(text))
    } else if let Some(text) = part.strip_prefix("wo ") {
        Some(Modifier::ExcludeTerms(text))
    } else if let Some(text) = part.strip_prefix("wg ") {
        Some(Modifier::ExcludeGenre(text))
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct Query {
    base: String,
    clauses: Vec<Clause>,
}

impl Query {
    pub fn compile(term: &str) -> Self {
        let mut parts = term.split('|').filter(|part| !part.is_empty());
        let base = pattern_text(parts.next().unwrap_or(""));

        let mut clauses = Vec::new();
        let mut extended = false;
        for part in parts {
            let (role, text) = match parse_modifier(part) {
                Some(Modifier::Extend(text)) => {
                    extended = true;
                    let joined = format!("{}{}", base, pattern_text(text));
                    (ClauseRole::Default, collapse_stars(&joined))
                }
                Some(Modifier::Include(text)) => (ClauseRole::Include, pattern_text(text)),
                Some(Modifier::ExcludeTerms(text)) => (ClauseRole::ExcludeTerms, pattern_text(text)),
                Some(Modifier::ExcludeGenre(text)) => (ClauseRole::ExcludeGenre, pattern_text(text)),
                None => {
                    debug!("Ignoring unknown search modifier {:?}", part);
                    continue;
                }
            };
            push_clause(&mut clauses, role, &text);
        }

        if !extended {
            let mut main = Vec::with_capacity(clauses.len() + 1);
            push_clause(&mut main, ClauseRole::Default, &base);
            main.append(&mut clauses);
            clauses = main;
        }
        clauses.sort_by_key(|clause| clause.role);

        Self { base, clauses }
    }

    /// The main search without its wildcards is empty. Empty queries match nothing.
    pub fn is_empty(&self) -> bool {
        is_blank(&self.base)
    }

    pub fn base_pattern(&self) -> &str {
        &self.base
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn clauses_with(&self, role: ClauseRole) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(move |clause| clause.role == role)
    }

    pub fn has_exclusions(&self) -> bool {
        self.clauses.iter().any(|clause| clause.role.is_exclusion())
    }

    /// True when an exclusion clause rejects the candidate.
    pub fn excludes(&self, search_strings: &[String], genre: &str) -> bool {
        self.clauses.iter().any(|clause| match clause.role {
            ClauseRole::ExcludeTerms => search_strings
                .iter()
                .any(|value| clause.pattern.is_match(value)),
            ClauseRole::ExcludeGenre => clause.pattern.is_match(genre),
            ClauseRole::Default | ClauseRole::Include => false,
        })
    }

    /// True when any search string matches any main or include clause.
    pub fn matches(&self, search_strings: &[String]) -> bool {
        search_strings.iter().any(|value| {
            self.clauses
                .iter()
                .filter(|clause| !clause.role.is_exclusion())
                .any(|clause| clause.pattern.is_match(value))
        })
    }

    pub fn accepts(&self, search_strings: &[String], genre: &str) -> bool {
        !self.is_empty() && !self.excludes(search_strings, genre) && self.matches(search_strings)
    }
}

fn push_clause(clauses: &mut Vec<Clause>, role: ClauseRole, text: &str) {
    match WildcardPattern::new(text) {
        Ok(pattern) => clauses.push(Clause { role, pattern }),
        Err(err) => warn!("Dropping search pattern {:?}: {}", text, err),
    }
}
