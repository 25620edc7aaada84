//! Alternate spellings of paths and search terms.
//!
//! Each [`Normalizer`] turns one string into one or more variants. A
//! [`Pipeline`] runs several of them over the same input and keeps every
//! distinct result, so a file can be found by any of its spellings.

pub mod kana;
pub mod latin;
pub mod whitespace;

use std::collections::HashSet;

pub use kana::KanaNormalizer;
pub use latin::LatinWidthNormalizer;
pub use whitespace::WhitespaceNormalizer;

/// A pure string transformer. Must return at least one variant and must not
/// depend on anything but `input`.
pub trait Normalizer: Send + Sync {
    fn name(&self) -> &'static str;
    fn variants(&self, input: &str) -> Vec<String>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Normalizer>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Whitespace, kana, then Latin width.
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        pipeline.push(WhitespaceNormalizer);
        pipeline.push(KanaNormalizer);
        pipeline.push(LatinWidthNormalizer);
        pipeline
    }

    pub fn push<N: Normalizer + 'static>(&mut self, stage: N) {
        self.stages.push(Box::new(stage));
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// `input` first, then every stage's variants, duplicates removed.
    pub fn run(&self, input: &str) -> Vec<String> {
        let mut out = vec![input.to_string()];
        for stage in &self.stages {
            out.extend(stage.variants(input));
        }
        dedup_in_order(&mut out);
        out
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Drops repeated values, keeping the first occurrence of each.
pub fn dedup_in_order(values: &mut Vec<String>) {
    let mut seen = HashSet::with_capacity(values.len());
    values.retain(|value| seen.insert(value.clone()));
}
