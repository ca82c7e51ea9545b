use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

/// Built-in confusion categories as (rule, [(expected, predicted)]).
const DEFAULT_RULES: &[(&str, &[(&str, &str)])] = &[
    ("VOICING_ERROR_FRICATIVE", &[("z", "s"), ("s", "z")]),
    (
        "TH_FRONTING_OR_STOPPING",
        &[("θ", "s"), ("ð", "d"), ("ð", "z")],
    ),
    (
        "VOWEL_TENSE_LAX",
        &[("ɪ", "i"), ("i", "ɪ"), ("ʊ", "u"), ("u", "ʊ")],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeRule {
    pub name: String,
    /// Explicit (expected, predicted) phone pairs this rule claims.
    pub pairs: Vec<(String, String)>,
}

impl MistakeRule {
    pub fn matches(&self, expected: &str, predicted: &str) -> bool {
        self.pairs
            .iter()
            .any(|(e, p)| e == expected && p == predicted)
    }
}

/// Ordered table of confusion rules; the first rule claiming a pair names it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeRules {
    pub rules: Vec<MistakeRule>,
}

impl Default for MistakeRules {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(name, pairs)| MistakeRule {
                    name: name.to_string(),
                    pairs: pairs
                        .iter()
                        .map(|(e, p)| (e.to_string(), p.to_string()))
                        .collect(),
                })
                .collect(),
        }
    }
}

impl MistakeRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn classify(&self, expected: &str, predicted: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(expected, predicted))
            .map(|rule| rule.name.as_str())
    }

    pub fn from_json_str(data: &str) -> Result<Self, AssessmentError> {
        let rules: Self =
            serde_json::from_str(data).map_err(|e| AssessmentError::json("parse rules", e))?;
        if let Some(rule) = rules.rules.iter().find(|rule| rule.name.trim().is_empty()) {
            return Err(AssessmentError::invalid_input(format!(
                "mistake rule with pairs {:?} has an empty name",
                rule.pairs
            )));
        }
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AssessmentError::io("read rules", e))?;
        Self::from_json_str(&data)
    }
}
