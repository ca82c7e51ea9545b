use std::collections::HashMap;
use std::path::Path;

use crate::alignment::tokenization::normalize_ipa_text;
use crate::error::AssessmentError;

/// CMUdict ARPABET phone to IPA; stress digits are stripped before lookup.
const ARPABET_TO_IPA: [(&str, &str); 39] = [
    ("AA", "ɑ"),
    ("AE", "æ"),
    ("AH", "ʌ"),
    ("AO", "ɔ"),
    ("AW", "aʊ"),
    ("AY", "aɪ"),
    ("B", "b"),
    ("CH", "tʃ"),
    ("D", "d"),
    ("DH", "ð"),
    ("EH", "ɛ"),
    ("ER", "ɝ"),
    ("EY", "eɪ"),
    ("F", "f"),
    ("G", "ɡ"),
    ("HH", "h"),
    ("IH", "ɪ"),
    ("IY", "i"),
    ("JH", "dʒ"),
    ("K", "k"),
    ("L", "l"),
    ("M", "m"),
    ("N", "n"),
    ("NG", "ŋ"),
    ("OW", "oʊ"),
    ("OY", "ɔɪ"),
    ("P", "p"),
    ("R", "ɹ"),
    ("S", "s"),
    ("SH", "ʃ"),
    ("T", "t"),
    ("TH", "θ"),
    ("UH", "ʊ"),
    ("UW", "u"),
    ("V", "v"),
    ("W", "w"),
    ("Y", "j"),
    ("Z", "z"),
    ("ZH", "ʒ"),
];

/// Convert a space-separated ARPABET pronunciation to an IPA string.
/// Phones outside the table are dropped.
pub fn arpabet_to_ipa(pronunciation: &str) -> String {
    pronunciation
        .split_whitespace()
        .filter_map(|part| {
            let base = part.trim_end_matches(|c: char| matches!(c, '0'..='2'));
            ARPABET_TO_IPA
                .iter()
                .find(|(arpa, _)| arpa.eq_ignore_ascii_case(base))
                .map(|(_, ipa)| *ipa)
        })
        .collect()
}

/// User-supplied word to IPA overrides, keyed by lowercased word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    entries: HashMap<String, String>,
}

impl Lexicon {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), normalize_ipa_text(v.as_ref())))
                .collect(),
        }
    }

    /// Parse a JSON object mapping words to IPA strings.
    pub fn from_json_str(data: &str) -> Result<Self, AssessmentError> {
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_str(data).map_err(|e| AssessmentError::json("parse lexicon", e))?;
        Self::from_string_values(raw, |value| match value {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
    }

    /// Parse a YAML mapping of words to IPA strings. An empty document is an
    /// empty lexicon.
    pub fn from_yaml_str(data: &str) -> Result<Self, AssessmentError> {
        let raw: Option<HashMap<String, serde_yaml::Value>> =
            serde_yaml::from_str(data).map_err(|e| AssessmentError::yaml("parse lexicon", e))?;
        Self::from_string_values(raw.unwrap_or_default(), |value| match value {
            serde_yaml::Value::String(s) => Some(s),
            _ => None,
        })
    }

    fn from_string_values<V>(
        raw: HashMap<String, V>,
        as_ipa: impl Fn(V) -> Option<String>,
    ) -> Result<Self, AssessmentError> {
        let mut entries = Vec::with_capacity(raw.len());
        for (word, value) in raw {
            let Some(ipa) = as_ipa(value) else {
                return Err(AssessmentError::invalid_input(format!(
                    "lexicon entry '{word}' must map to an IPA string"
                )));
            };
            entries.push((word, ipa));
        }
        Ok(Self::from_entries(entries))
    }

    /// Load a `.json`, `.yml` or `.yaml` lexicon; the suffix picks the parser.
    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let format = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        let parse: fn(&str) -> Result<Self, AssessmentError> = match format.as_deref() {
            Some("json") => Self::from_json_str,
            Some("yml" | "yaml") => Self::from_yaml_str,
            _ => {
                return Err(AssessmentError::invalid_input(format!(
                    "lexicon '{}' must be .yml/.yaml or .json",
                    path.display()
                )))
            }
        };
        let data =
            std::fs::read_to_string(path).map_err(|e| AssessmentError::io("read lexicon", e))?;
        parse(&data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(&word.to_lowercase()).map(String::as_str)
    }

    /// Replace expected IPA for every reference word the lexicon knows.
    pub fn apply(&self, reference_words: &[String], expected_ipa_words: &[String]) -> Vec<String> {
        reference_words
            .iter()
            .zip(expected_ipa_words)
            .map(|(word, expected)| match self.lookup(word) {
                Some(ipa) => {
                    if ipa != expected.as_str() {
                        tracing::warn!(
                            word = word.as_str(),
                            g2p = expected.as_str(),
                            lexicon = ipa,
                            "lexicon: overriding G2P pronunciation"
                        );
                    }
                    ipa.to_string()
                }
                None => expected.clone(),
            })
            .collect()
    }
}
