use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    /// Word -> IPA overrides applied after G2P, as a `.json` or `.yml`/`.yaml` mapping.
    pub lexicon_path: Option<String>,
    /// JSON mistake-rule table replacing the built-in one.
    pub rules_path: Option<String>,
    pub fallback: UtteranceFallback,
}

impl AssessConfig {
    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AssessmentError::io("read config", e))?;
        let config: Self =
            serde_json::from_str(&data).map_err(|e| AssessmentError::json("parse config", e))?;
        config.fallback.validate()?;
        Ok(config)
    }
}

/// When to give up on word chunks and compare whole utterances.
///
/// Word-level alignment runs unless the transcription produced fewer than
/// `max(min_predicted_words, floor(reference_words * min_word_ratio))` chunks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtteranceFallback {
    pub enabled: bool,
    pub min_predicted_words: usize,
    pub min_word_ratio: f64,
}

impl UtteranceFallback {
    pub const DEFAULT_MIN_PREDICTED_WORDS: usize = 5;
    pub const DEFAULT_MIN_WORD_RATIO: f64 = 0.5;

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), AssessmentError> {
        if !self.min_word_ratio.is_finite() || !(0.0..=1.0).contains(&self.min_word_ratio) {
            return Err(AssessmentError::invalid_input(format!(
                "min_word_ratio must be within [0, 1], got {}",
                self.min_word_ratio
            )));
        }
        Ok(())
    }

    pub fn threshold(&self, reference_words: usize) -> usize {
        let scaled = (reference_words as f64 * self.min_word_ratio).floor() as usize;
        self.min_predicted_words.max(scaled)
    }

    pub fn applies(&self, reference_words: usize, predicted_words: usize) -> bool {
        self.enabled && predicted_words < self.threshold(reference_words)
    }
}

impl Default for UtteranceFallback {
    fn default() -> Self {
        Self {
            enabled: true,
            min_predicted_words: Self::DEFAULT_MIN_PREDICTED_WORDS,
            min_word_ratio: Self::DEFAULT_MIN_WORD_RATIO,
        }
    }
}
