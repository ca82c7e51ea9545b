use std::path::Path;

use crate::config::AssessConfig;
use crate::error::AssessmentError;
use crate::lexicon::Lexicon;
use crate::pipeline::defaults::{IpaTokenizer, LevenshteinAligner};
use crate::pipeline::runtime::{Assessor, AssessorParts};
use crate::pipeline::traits::{SequenceAligner, Tokenizer};
use crate::scoring::MistakeRules;

pub struct AssessorBuilder {
    config: AssessConfig,
    tokenizer: Option<Box<dyn Tokenizer>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    rules: Option<MistakeRules>,
    lexicon: Option<Lexicon>,
}

impl AssessorBuilder {
    pub fn new(config: AssessConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            sequence_aligner: None,
            rules: None,
            lexicon: None,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    /// Takes precedence over `rules_path` in the config.
    pub fn with_mistake_rules(mut self, rules: MistakeRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Takes precedence over `lexicon_path` in the config.
    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    pub fn build(self) -> Result<Assessor, AssessmentError> {
        self.config.fallback.validate()?;

        let rules = match (self.rules, self.config.rules_path.as_deref()) {
            (Some(rules), _) => rules,
            (None, Some(path)) => MistakeRules::load(Path::new(path))?,
            (None, None) => MistakeRules::default(),
        };
        let lexicon = match (self.lexicon, self.config.lexicon_path.as_deref()) {
            (Some(lexicon), _) => lexicon,
            (None, Some(path)) => Lexicon::load(Path::new(path))?,
            (None, None) => Lexicon::default(),
        };
        tracing::debug!(
            rules = rules.rules.len(),
            lexicon_entries = lexicon.len(),
            fallback_enabled = self.config.fallback.enabled,
            "assessor: built"
        );

        Ok(Assessor::from_parts(AssessorParts {
            tokenizer: self.tokenizer.unwrap_or_else(|| Box::new(IpaTokenizer)),
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(LevenshteinAligner)),
            rules,
            lexicon,
            fallback: self.config.fallback,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UtteranceFallback;
    use crate::types::{AssessmentInput, Phone, Transcription};

    struct SpaceTokenizer;

    impl Tokenizer for SpaceTokenizer {
        fn tokenize(&self, ipa: &str) -> Vec<Phone> {
            ipa.split_whitespace().map(str::to_string).collect()
        }
    }

    #[test]
    fn builder_defaults_to_builtin_rules_and_empty_lexicon() {
        let builder = AssessorBuilder::new(AssessConfig::default());
        assert!(builder.tokenizer.is_none());
        assert!(builder.rules.is_none());
        let assessor = builder.build().expect("build should succeed");
        assert_eq!(assessor.rules(), &MistakeRules::default());
        assert!(assessor.lexicon().is_empty());
    }

    #[test]
    fn build_loads_rules_and_lexicon_from_temp_files() {
        let temp_dir = std::env::temp_dir();
        let rules_path = temp_dir.join("ipa_assess_builder_rules.json");
        let lexicon_path = temp_dir.join("ipa_assess_builder_lexicon.json");
        std::fs::write(
            &rules_path,
            r#"{"rules": [{"name": "FINAL_DEVOICING", "pairs": [["d", "t"]]}]}"#,
        )
        .expect("write rules");
        std::fs::write(&lexicon_path, r#"{"bed": "bɛd"}"#).expect("write lexicon");

        let config = AssessConfig {
            lexicon_path: Some(lexicon_path.to_string_lossy().to_string()),
            rules_path: Some(rules_path.to_string_lossy().to_string()),
            fallback: UtteranceFallback::disabled(),
        };
        let assessor = AssessorBuilder::new(config).build().expect("build should succeed");
        assert_eq!(assessor.rules().classify("d", "t"), Some("FINAL_DEVOICING"));
        assert_eq!(assessor.lexicon().lookup("BED"), Some("bɛd"));

        let input = AssessmentInput {
            reference: "bed".to_string(),
            expected_ipa_words: vec!["bæd".to_string()],
            transcription: Transcription {
                ipa_text: "bɛt".to_string(),
                words: Vec::new(),
            },
        };
        let out = assessor.assess(&input).expect("assess");
        assert_eq!(out.words[0].expected_ipa, "bɛd");
        assert_eq!(out.mistakes.len(), 1);
        assert_eq!(out.mistakes[0].rule, "FINAL_DEVOICING");

        let _ = std::fs::remove_file(&rules_path);
        let _ = std::fs::remove_file(&lexicon_path);
    }

    #[test]
    fn build_fails_on_missing_rules_file() {
        let config = AssessConfig {
            rules_path: Some("/nonexistent/rules.json".to_string()),
            ..AssessConfig::default()
        };
        assert!(AssessorBuilder::new(config).build().is_err());
    }

    #[test]
    fn build_fails_on_invalid_fallback_ratio() {
        let config = AssessConfig {
            fallback: UtteranceFallback {
                min_word_ratio: 2.0,
                ..UtteranceFallback::default()
            },
            ..AssessConfig::default()
        };
        assert!(matches!(
            AssessorBuilder::new(config).build(),
            Err(AssessmentError::InvalidInput { .. })
        ));
    }

    #[test]
    fn explicit_parts_override_config_paths() {
        let config = AssessConfig {
            rules_path: Some("/nonexistent/rules.json".to_string()),
            fallback: UtteranceFallback::disabled(),
            ..AssessConfig::default()
        };
        let assessor = AssessorBuilder::new(config)
            .with_mistake_rules(MistakeRules::empty())
            .with_tokenizer(Box::new(SpaceTokenizer))
            .build()
            .expect("explicit rules skip the config path");
        assert!(assessor.rules().rules.is_empty());

        let input = AssessmentInput {
            reference: "ab".to_string(),
            expected_ipa_words: vec!["a b".to_string()],
            transcription: Transcription {
                ipa_text: "a c".to_string(),
                words: Vec::new(),
            },
        };
        let out = assessor.assess(&input).expect("assess");
        assert_eq!(out.metrics.substitutions, 1);
        assert!(out.substitution_histogram.contains_key("b→c"));
    }
}
