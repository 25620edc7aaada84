//! Basic Latin vs. CJK fullwidth forms.
//!
//! Printable ASCII `!`..`~` pairs with the Halfwidth and Fullwidth Forms block
//! at a fixed offset, except for a few punctuation marks that Japanese text
//! writes with other code points. The mapping is one-to-one, so converting a
//! string to one form and back is lossless for mapped characters.

use crate::Normalizer;

const FULLWIDTH_OFFSET: u32 = 0xFEE0;

// ASCII side first.
const SPECIAL_PAIRS: &[(char, char)] = &[(',', '、'), ('"', '”'), ('\'', '’'), ('·', '・')];

// Fullwidth code points displaced by SPECIAL_PAIRS; they are left unmapped.
const UNPAIRED_FULLWIDTH: &[char] = &['，', '＂', '＇'];

pub fn is_mapped(ch: char) -> bool {
    to_fullwidth(ch) != ch || to_basic_latin(ch) != ch
}

pub fn to_fullwidth(ch: char) -> char {
    if let Some(&(_, full)) = SPECIAL_PAIRS.iter().find(|(ascii, _)| *ascii == ch) {
        return full;
    }
    match ch {
        '!'..='~' => char::from_u32(ch as u32 + FULLWIDTH_OFFSET).unwrap_or(ch),
        _ => ch,
    }
}

pub fn to_basic_latin(ch: char) -> char {
    if let Some(&(ascii, _)) = SPECIAL_PAIRS.iter().find(|(_, full)| *full == ch) {
        return ascii;
    }
    if UNPAIRED_FULLWIDTH.contains(&ch) {
        return ch;
    }
    match ch {
        '！'..='～' => char::from_u32(ch as u32 - FULLWIDTH_OFFSET).unwrap_or(ch),
        _ => ch,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LatinWidthNormalizer;

impl Normalizer for LatinWidthNormalizer {
    fn name(&self) -> &'static str {
        "latin-width"
    }

    /// Always two variants: all Basic Latin, then all fullwidth.
    fn variants(&self, input: &str) -> Vec<String> {
        let basic: String = input.chars().map(to_basic_latin).collect();
        let full: String = input.chars().map(to_fullwidth).collect();
        vec![basic, full]
    }
}
