//! Japanese kana canonicalization.
//!
//! Some input methods emit a voiced kana as the base kana followed by a
//! standalone voicing mark. [`repair`] folds such pairs back into the
//! precomposed character, and [`KanaNormalizer`] then produces hiragana-only,
//! katakana-only and half-width katakana spellings so any of them finds the
//! same file.

use crate::Normalizer;

const VOICED_MARKS: &[char] = &[
    '\u{3099}', // combining
    '\u{309B}', // spacing
    '\u{FF9E}', // half-width
];

const SEMI_VOICED_MARKS: &[char] = &[
    '\u{309A}', // combining
    '\u{309C}', // spacing
    '\u{FF9F}', // half-width
];

const HALFWIDTH_VOICED_MARK: char = '\u{FF9E}';
const HALFWIDTH_SEMI_VOICED_MARK: char = '\u{FF9F}';

struct Voicing {
    base: char,
    voiced: char,
    semi_voiced: Option<char>,
}

const fn voiced(base: char, voiced: char) -> Voicing {
    Voicing {
        base,
        voiced,
        semi_voiced: None,
    }
}

const fn both(base: char, voiced: char, semi_voiced: char) -> Voicing {
    Voicing {
        base,
        voiced,
        semi_voiced: Some(semi_voiced),
    }
}

const VOICINGS: &[Voicing] = &[
    voiced('か', 'が'),
    voiced('き', 'ぎ'),
    voiced('く', 'ぐ'),
    voiced('け', 'げ'),
    voiced('こ', 'ご'),
    voiced('さ', 'ざ'),
    voiced('し', 'じ'),
    voiced('す', 'ず'),
    voiced('せ', 'ぜ'),
    voiced('そ', 'ぞ'),
    voiced('た', 'だ'),
    voiced('ち', 'ぢ'),
    voiced('つ', 'づ'),
    voiced('て', 'で'),
    voiced('と', 'ど'),
    both('は', 'ば', 'ぱ'),
    both('ひ', 'び', 'ぴ'),
    both('ふ', 'ぶ', 'ぷ'),
    both('へ', 'べ', 'ぺ'),
    both('ほ', 'ぼ', 'ぽ'),
    voiced('う', 'ゔ'),
    voiced('カ', 'ガ'),
    voiced('キ', 'ギ'),
    voiced('ク', 'グ'),
    voiced('ケ', 'ゲ'),
    voiced('コ', 'ゴ'),
    voiced('サ', 'ザ'),
    voiced('シ', 'ジ'),
    voiced('ス', 'ズ'),
    voiced('セ', 'ゼ'),
    voiced('ソ', 'ゾ'),
    voiced('タ', 'ダ'),
    voiced('チ', 'ヂ'),
    voiced('ツ', 'ヅ'),
    voiced('テ', 'デ'),
    voiced('ト', 'ド'),
    both('ハ', 'バ', 'パ'),
    both('ヒ', 'ビ', 'ピ'),
    both('フ', 'ブ', 'プ'),
    both('ヘ', 'ベ', 'ペ'),
    both('ホ', 'ボ', 'ポ'),
    voiced('ウ', 'ヴ'),
];

const HALFWIDTH_KATAKANA: &[(char, char)] = &[
    ('ア', 'ｱ'),
    ('イ', 'ｲ'),
    ('ウ', 'ｳ'),
    ('エ', 'ｴ'),
    ('オ', 'ｵ'),
    ('カ', 'ｶ'),
    ('キ', 'ｷ'),
    ('ク', 'ｸ'),
    ('ケ', 'ｹ'),
    ('コ', 'ｺ'),
    ('サ', 'ｻ'),
    ('シ', 'ｼ'),
    ('ス', 'ｽ'),
    ('セ', 'ｾ'),
    ('ソ', 'ｿ'),
    ('タ', 'ﾀ'),
    ('チ', 'ﾁ'),
    ('ツ', 'ﾂ'),
    ('テ', 'ﾃ'),
    ('ト', 'ﾄ'),
    ('ナ', 'ﾅ'),
    ('ニ', 'ﾆ'),
    ('ヌ', 'ﾇ'),
    ('ネ', 'ﾈ'),
    ('ノ', 'ﾉ'),
    ('ハ', 'ﾊ'),
    ('ヒ', 'ﾋ'),
    ('フ', 'ﾌ'),
    ('ヘ', 'ﾍ'),
    ('ホ', 'ﾎ'),
    ('マ', 'ﾏ'),
    ('ミ', 'ﾐ'),
    ('ム', 'ﾑ'),
    ('メ', 'ﾒ'),
    ('モ', 'ﾓ'),
    ('ヤ', 'ﾔ'),
    ('ユ', 'ﾕ'),
    ('ヨ', 'ﾖ'),
    ('ラ', 'ﾗ'),
    ('リ', 'ﾘ'),
    ('ル', 'ﾙ'),
    ('レ', 'ﾚ'),
    ('ロ', 'ﾛ'),
    ('ワ', 'ﾜ'),
    ('ヲ', 'ｦ'),
    ('ン', 'ﾝ'),
    ('ァ', 'ｧ'),
    ('ィ', 'ｨ'),
    ('ゥ', 'ｩ'),
    ('ェ', 'ｪ'),
    ('ォ', 'ｫ'),
    ('ャ', 'ｬ'),
    ('ュ', 'ｭ'),
    ('ョ', 'ｮ'),
    ('ッ', 'ｯ'),
    ('ー', 'ｰ'),
];

/// Which code points [`separate`] emits for the detached voicing marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkStyle {
    /// U+309B / U+309C
    Spacing,
    /// U+3099 / U+309A, what mobile keyboards produce
    Combining,
}

impl MarkStyle {
    fn voiced(self) -> char {
        match self {
            MarkStyle::Spacing => '\u{309B}',
            MarkStyle::Combining => '\u{3099}',
        }
    }

    fn semi_voiced(self) -> char {
        match self {
            MarkStyle::Spacing => '\u{309C}',
            MarkStyle::Combining => '\u{309A}',
        }
    }
}

fn voicing_for_base(ch: char) -> Option<&'static Voicing> {
    VOICINGS.iter().find(|voicing| voicing.base == ch)
}

/// Splits a precomposed voiced kana into (base, is_semi_voiced).
fn split_voiced(ch: char) -> Option<(char, bool)> {
    VOICINGS.iter().find_map(|voicing| {
        if voicing.voiced == ch {
            Some((voicing.base, false))
        } else if voicing.semi_voiced == Some(ch) {
            Some((voicing.base, true))
        } else {
            None
        }
    })
}

/// Folds "kana + standalone voicing mark" into the precomposed kana.
///
/// Pairs without a precomposed form (a semi-voiced mark after `か`, say) are
/// left as they are.
pub fn repair(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        let next = chars.peek().copied();
        if let (Some(voicing), Some(mark)) = (voicing_for_base(ch), next) {
            let combined = if VOICED_MARKS.contains(&mark) {
                Some(voicing.voiced)
            } else if SEMI_VOICED_MARKS.contains(&mark) {
                voicing.semi_voiced
            } else {
                None
            };
            if let Some(combined) = combined {
                out.push(combined);
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }
    out
}

/// Inverse of [`repair`]: every precomposed voiced kana becomes base + mark.
pub fn separate(input: &str, style: MarkStyle) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for ch in input.chars() {
        match split_voiced(ch) {
            Some((base, false)) => {
                out.push(base);
                out.push(style.voiced());
            }
            Some((base, true)) => {
                out.push(base);
                out.push(style.semi_voiced());
            }
            None => out.push(ch),
        }
    }
    out
}

pub fn to_katakana(ch: char) -> char {
    match ch {
        '\u{3041}'..='\u{3096}' | '\u{309D}'..='\u{309E}' => shift(ch, 0x60, true),
        _ => ch,
    }
}

pub fn to_hiragana(ch: char) -> char {
    match ch {
        '\u{30A1}'..='\u{30F6}' | '\u{30FD}'..='\u{30FE}' => shift(ch, 0x60, false),
        _ => ch,
    }
}

fn shift(ch: char, offset: u32, up: bool) -> char {
    let code = if up {
        ch as u32 + offset
    } else {
        ch as u32 - offset
    };
    char::from_u32(code).unwrap_or(ch)
}

fn push_halfwidth(out: &mut String, ch: char) {
    let katakana = to_katakana(ch);
    if let Some(&(_, half)) = HALFWIDTH_KATAKANA.iter().find(|(full, _)| *full == katakana) {
        out.push(half);
        return;
    }
    if let Some((base, semi)) = split_voiced(katakana) {
        if let Some(&(_, half)) = HALFWIDTH_KATAKANA.iter().find(|(full, _)| *full == base) {
            out.push(half);
            out.push(if semi {
                HALFWIDTH_SEMI_VOICED_MARK
            } else {
                HALFWIDTH_VOICED_MARK
            });
            return;
        }
    }
    out.push(katakana);
}

pub fn hiragana(input: &str) -> String {
    input.chars().map(to_hiragana).collect()
}

pub fn katakana(input: &str) -> String {
    input.chars().map(to_katakana).collect()
}

/// Half-width katakana spelling; kana without a half-width form stay full-width.
pub fn halfwidth(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        push_halfwidth(&mut out, ch);
    }
    out
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KanaNormalizer;

impl Normalizer for KanaNormalizer {
    fn name(&self) -> &'static str {
        "kana"
    }

    fn variants(&self, input: &str) -> Vec<String> {
        let repaired = repair(input);
        let hira = hiragana(&repaired);
        let kata = katakana(&repaired);
        let half = halfwidth(&repaired);
        vec![repaired, hira, kata, half]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn precomposed() -> String {
        let mut out = String::new();
        for voicing in VOICINGS {
            out.push(voicing.voiced);
            if let Some(semi) = voicing.semi_voiced {
                out.push(semi);
            }
        }
        out
    }

    #[test]
    fn repairs_every_mark_encoding() {
        assert_eq!(repair("か\u{3099}"), "が");
        assert_eq!(repair("か\u{309B}"), "が");
        assert_eq!(repair("カ\u{FF9E}"), "ガ");
        assert_eq!(repair("は\u{309A}"), "ぱ");
        assert_eq!(repair("ハ\u{309C}"), "パ");
        assert_eq!(repair("ウ\u{3099}ォーカル"), "ヴォーカル");
    }

    #[test]
    fn leaves_impossible_pairs_alone() {
        assert_eq!(repair("か\u{309A}"), "か\u{309A}");
        assert_eq!(repair("あ\u{3099}"), "あ\u{3099}");
        assert_eq!(repair("\u{3099}か"), "\u{3099}か");
        assert_eq!(repair("か"), "か");
    }

    #[test]
    fn repair_and_separate_round_trip() {
        let composed = precomposed();
        for style in [MarkStyle::Spacing, MarkStyle::Combining] {
            let decomposed = separate(&composed, style);
            assert_eq!(decomposed.chars().count(), composed.chars().count() * 2);
            assert_eq!(repair(&decomposed), composed);
            assert_eq!(separate(&repair(&decomposed), style), decomposed);
        }
    }

    #[test]
    fn converts_between_scripts() {
        assert_eq!(katakana("ひらがな"), "ヒラガナ");
        assert_eq!(hiragana("カタカナ"), "かたかな");
        assert_eq!(hiragana("ABC ー"), "ABC ー");
        assert_eq!(katakana("ゔぁ"), "ヴァ");
    }

    #[test]
    fn builds_halfwidth_katakana() {
        assert_eq!(halfwidth("カタカナ"), "ｶﾀｶﾅ");
        assert_eq!(halfwidth("がっこう"), "ｶﾞｯｺｳ");
        assert_eq!(halfwidth("パーティー"), "ﾊﾟｰﾃｨｰ");
        assert_eq!(halfwidth("ヶ月"), "ヶ月");
    }

    #[test]
    fn normalizer_emits_all_forms() {
        let variants = KanaNormalizer.variants("さくら/か\u{3099}っこう");
        assert_eq!(
            variants,
            vec![
                "さくら/がっこう".to_string(),
                "さくら/がっこう".to_string(),
                "サクラ/ガッコウ".to_string(),
                "ｻｸﾗ/ｶﾞｯｺｳ".to_string(),
            ]
        );
    }
}
