use unicode_normalization::UnicodeNormalization;

use crate::types::Phone;

const STRESS_MARKS: [char; 2] = ['ˈ', 'ˌ'];
const WORD_BREAKS: [char; 3] = [' ', '\t', '\n'];
const TIE_BARS: [char; 2] = ['\u{0361}', '\u{035C}'];
/// Length, nasalization and syllabicity marks join the preceding phone.
const ATTACHING_DIACRITICS: [char; 3] = ['ː', '\u{0303}', '\u{0329}'];

/// Multi-codepoint phones tried at each position; the longest match wins.
const MULTI_PHONES: [&str; 9] = [
    "t\u{0361}ʃ",
    "d\u{0361}ʒ",
    "tʃ",
    "dʒ",
    "aɪ",
    "aʊ",
    "ɔɪ",
    "oʊ",
    "eɪ",
];

/// Split an IPA string into comparable phone tokens.
///
/// Greedy left-to-right scan over the NFC form: whitespace is dropped, stress
/// marks stand alone, table phones and tie-barred clusters are kept whole, and
/// attaching diacritics are appended to the previous token. Anything else
/// becomes a single-character token, so the scan never fails.
pub fn tokenize_ipa(text: &str) -> Vec<Phone> {
    let chars: Vec<char> = text.nfc().collect();
    let mut tokens: Vec<Phone> = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];
        if WORD_BREAKS.contains(&ch) {
            i += 1;
            continue;
        }

        if STRESS_MARKS.contains(&ch) {
            tokens.push(ch.to_string());
            i += 1;
            continue;
        }

        if let Some(len) = longest_multi_phone(&chars[i..]) {
            tokens.push(chars[i..i + len].iter().collect());
            i += len;
            continue;
        }

        if i + 2 < chars.len()
            && TIE_BARS.contains(&chars[i + 1])
            && !WORD_BREAKS.contains(&chars[i + 2])
        {
            tokens.push(chars[i..i + 3].iter().collect());
            i += 3;
            continue;
        }

        if ATTACHING_DIACRITICS.contains(&ch) {
            if let Some(prev) = tokens.last_mut().filter(|prev| !is_stress_mark(prev)) {
                prev.push(ch);
                i += 1;
                continue;
            }
        }

        tokens.push(ch.to_string());
        i += 1;
    }

    tokens
}

fn is_stress_mark(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if STRESS_MARKS.contains(&c))
}

fn longest_multi_phone(rest: &[char]) -> Option<usize> {
    MULTI_PHONES
        .iter()
        .map(|phone| phone.chars().collect::<Vec<_>>())
        .filter(|phone| rest.starts_with(phone))
        .map(|phone| phone.len())
        .max()
}

/// NFC-normalize, trim and collapse whitespace runs to one space.
pub fn normalize_ipa_text(text: &str) -> String {
    let composed: String = text.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split reference text into word forms for G2P.
///
/// A word is a maximal run of alphanumerics, apostrophes and hyphens; all other
/// characters separate words and are dropped.
pub fn split_reference_words(reference: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut cur = String::new();
    for c in reference.trim().chars() {
        if c.is_alphanumeric() || matches!(c, '\'' | '’' | '-') {
            cur.push(c);
            continue;
        }
        if !cur.is_empty() {
            words.push(std::mem::take(&mut cur));
        }
    }
    if !cur.is_empty() {
        words.push(cur);
    }
    words
}
