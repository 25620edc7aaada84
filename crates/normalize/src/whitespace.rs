//! Whitespace canonicalization.
//!
//! Every code point with the Unicode `White_Space` property, plus a handful of
//! invisible separators that behave like spaces in file names, becomes an
//! ASCII space.

use crate::Normalizer;

const INVISIBLE_SEPARATORS: &[char] = &[
    '\u{180E}', // mongolian vowel separator
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // zero width no-break space
];

pub fn is_space_like(ch: char) -> bool {
    ch.is_whitespace() || INVISIBLE_SEPARATORS.contains(&ch)
}

pub fn normalize(input: &str) -> String {
    input
        .chars()
        .map(|ch| if is_space_like(ch) { ' ' } else { ch })
        .collect()
}

/// Same as [`normalize`] but keeps line feeds, for multi-line file contents.
pub fn normalize_text_file(input: &str) -> String {
    input
        .chars()
        .map(|ch| {
            if ch != '\n' && is_space_like(ch) {
                ' '
            } else {
                ch
            }
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceNormalizer;

impl Normalizer for WhitespaceNormalizer {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn variants(&self, input: &str) -> Vec<String> {
        vec![normalize(input)]
    }
}
