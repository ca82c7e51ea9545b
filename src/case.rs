use std::path::Path;

use serde::Deserialize;

use crate::error::AssessmentError;
use crate::lexicon::arpabet_to_ipa;
use crate::types::{AssessmentInput, Transcription};

/// One assessment case as stored on disk.
///
/// Expected pronunciations come either as IPA strings or as CMUdict-style ARPABET
/// strings, one per reference word. IPA wins when both are present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssessmentCase {
    #[serde(default)]
    pub id: Option<String>,
    pub reference: String,
    #[serde(default)]
    pub expected_ipa: Option<Vec<String>>,
    #[serde(default)]
    pub expected_arpabet: Option<Vec<String>>,
    #[serde(default)]
    pub transcription: Transcription,
}

impl AssessmentCase {
    pub fn from_json_str(data: &str) -> Result<Self, AssessmentError> {
        serde_json::from_str(data).map_err(|e| AssessmentError::json("parse case", e))
    }

    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AssessmentError::io("read case", e))?;
        Self::from_json_str(&data)
    }

    /// Case id, or `fallback` when the file does not name one.
    pub fn id_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.id.as_deref().unwrap_or(fallback)
    }

    pub fn to_input(&self) -> Result<AssessmentInput, AssessmentError> {
        let expected_ipa_words = match (&self.expected_ipa, &self.expected_arpabet) {
            (Some(ipa), _) => ipa.clone(),
            (None, Some(arpabet)) => arpabet.iter().map(|p| arpabet_to_ipa(p)).collect(),
            (None, None) => {
                return Err(AssessmentError::invalid_input(
                    "case needs expected_ipa or expected_arpabet",
                ))
            }
        };
        Ok(AssessmentInput {
            reference: self.reference.clone(),
            expected_ipa_words,
            transcription: self.transcription.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arpabet_case_converts_to_ipa() {
        let case = AssessmentCase::from_json_str(
            r#"{
                "reference": "cheese",
                "expected_arpabet": ["CH IY1 Z"],
                "transcription": {"ipa_text": "tʃis", "words": [{"ipa": "tʃis", "start": 0.0, "end": 0.4}]}
            }"#,
        )
        .expect("valid case");
        assert_eq!(case.id_or("file-stem"), "file-stem");
        let input = case.to_input().expect("input");
        assert_eq!(input.expected_ipa_words, ["tʃiz"]);
        assert_eq!(input.transcription.words[0].end, Some(0.4));
    }

    #[test]
    fn ipa_takes_precedence_over_arpabet() {
        let case = AssessmentCase::from_json_str(
            r#"{"id": "c1", "reference": "zoo", "expected_ipa": ["zuː"], "expected_arpabet": ["Z UW1"]}"#,
        )
        .expect("valid case");
        assert_eq!(case.id_or("x"), "c1");
        let input = case.to_input().expect("input");
        assert_eq!(input.expected_ipa_words, ["zuː"]);
        assert!(input.transcription.ipa_text.is_empty());
    }

    #[test]
    fn case_without_pronunciations_is_rejected() {
        let case = AssessmentCase::from_json_str(r#"{"reference": "zoo"}"#).expect("valid case");
        assert!(matches!(
            case.to_input(),
            Err(AssessmentError::InvalidInput { .. })
        ));
    }
}
