use crate::alignment::tokenization::{normalize_ipa_text, split_reference_words};
use crate::alignment::words::{align_utterance_with, align_words_with, WordAlignment};
use crate::config::UtteranceFallback;
use crate::error::AssessmentError;
use crate::lexicon::Lexicon;
use crate::pipeline::traits::{SequenceAligner, Tokenizer};
use crate::scoring::{score, MistakeRules};
use crate::types::{AlignmentMode, AssessmentInput, AssessmentOutput, Phone, PredictedWord};

pub struct Assessor {
    tokenizer: Box<dyn Tokenizer>,
    sequence_aligner: Box<dyn SequenceAligner>,
    rules: MistakeRules,
    lexicon: Lexicon,
    fallback: UtteranceFallback,
}

pub(crate) struct AssessorParts {
    pub tokenizer: Box<dyn Tokenizer>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub rules: MistakeRules,
    pub lexicon: Lexicon,
    pub fallback: UtteranceFallback,
}

impl Assessor {
    pub(crate) fn from_parts(parts: AssessorParts) -> Self {
        Self {
            tokenizer: parts.tokenizer,
            sequence_aligner: parts.sequence_aligner,
            rules: parts.rules,
            lexicon: parts.lexicon,
            fallback: parts.fallback,
        }
    }

    pub fn rules(&self) -> &MistakeRules {
        &self.rules
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn fallback(&self) -> &UtteranceFallback {
        &self.fallback
    }

    /// Align a learner's transcription against the reference text and score it.
    pub fn assess(&self, input: &AssessmentInput) -> Result<AssessmentOutput, AssessmentError> {
        let reference_words = split_reference_words(&input.reference);
        if input.expected_ipa_words.len() != reference_words.len() {
            return Err(AssessmentError::input_mismatch(
                reference_words.len(),
                input.expected_ipa_words.len(),
            ));
        }

        let expected: Vec<String> = self
            .lexicon
            .apply(&reference_words, &input.expected_ipa_words)
            .iter()
            .map(|w| normalize_ipa_text(w))
            .collect();
        let predicted_text = normalize_ipa_text(&input.transcription.ipa_text);
        let mut predicted: Vec<PredictedWord> = input
            .transcription
            .words
            .iter()
            .map(|w| PredictedWord::with_times(normalize_ipa_text(&w.ipa), w.start, w.end))
            .collect();
        if predicted.is_empty() {
            tracing::debug!("assess: transcription has no word chunks, using full text");
            predicted.push(PredictedWord::new(predicted_text.clone()));
        }

        let tokenize = |ipa: &str| self.tokenizer.tokenize(ipa);
        let align = |e: &[Phone], p: &[Phone]| self.sequence_aligner.align(e, p);

        let (mode, alignment) = if self
            .fallback
            .applies(reference_words.len(), predicted.len())
        {
            tracing::warn!(
                reference_words = reference_words.len(),
                predicted_words = predicted.len(),
                threshold = self.fallback.threshold(reference_words.len()),
                "assess: too few predicted words, falling back to utterance-level alignment"
            );
            let row = align_utterance_with(
                tokenize,
                align,
                &expected.join(" "),
                &predicted_text,
                predicted.first().and_then(|w| w.start),
                predicted.last().and_then(|w| w.end),
            );
            (AlignmentMode::Utterance, WordAlignment::from_rows(vec![row]))
        } else {
            let alignment =
                align_words_with(tokenize, align, &reference_words, &expected, &predicted)?;
            (AlignmentMode::Word, alignment)
        };

        let scored = score(alignment.rows(), &self.rules);
        let (words, inserted) = alignment.into_parts();
        tracing::debug!(
            mode = ?mode,
            words = words.len(),
            inserted = inserted.len(),
            per = scored.metrics.phoneme_error_rate,
            "assess: complete"
        );

        Ok(AssessmentOutput {
            mode,
            reference_words,
            words,
            inserted,
            metrics: scored.metrics,
            substitution_histogram: scored.substitution_histogram,
            mistakes: scored.mistakes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::words::UTTERANCE_ROW_LABEL;
    use crate::config::AssessConfig;
    use crate::pipeline::builder::AssessorBuilder;
    use crate::types::{EditKind, RowKind, Transcription, WordIndex};

    fn assessor(fallback: UtteranceFallback) -> Assessor {
        AssessorBuilder::new(AssessConfig {
            fallback,
            ..AssessConfig::default()
        })
        .build()
        .expect("build")
    }

    fn input(
        reference: &str,
        expected: &[&str],
        text: &str,
        words: Vec<PredictedWord>,
    ) -> AssessmentInput {
        AssessmentInput {
            reference: reference.to_string(),
            expected_ipa_words: expected.iter().map(|s| s.to_string()).collect(),
            transcription: Transcription {
                ipa_text: text.to_string(),
                words,
            },
        }
    }

    #[test]
    fn zoo_pronounced_with_s_is_a_voicing_error() {
        let out = assessor(UtteranceFallback::disabled())
            .assess(&input(
                "zoo",
                &["zuː"],
                "suː",
                vec![PredictedWord::with_times("suː", Some(0.0), Some(0.5))],
            ))
            .expect("assess");

        assert_eq!(out.mode, AlignmentMode::Word);
        assert_eq!(out.reference_words, ["zoo"]);
        assert_eq!(out.words.len(), 1);
        assert_eq!(out.words[0].kind, RowKind::Matched);
        assert_eq!(out.words[0].end, Some(0.5));
        assert!((out.metrics.phoneme_error_rate - 0.5).abs() < 1e-12);
        assert_eq!(out.substitution_histogram["z→s"], 1);
        assert_eq!(out.mistakes.len(), 1);
        assert_eq!(out.mistakes[0].rule, "VOICING_ERROR_FRICATIVE");
    }

    #[test]
    fn default_fallback_switches_short_transcriptions_to_utterance_mode() {
        let out = assessor(UtteranceFallback::default())
            .assess(&input(
                "the cat sat",
                &["ðə", "kæt", "sæt"],
                "də kæt sæt",
                vec![
                    PredictedWord::with_times("də kæt", Some(0.1), Some(0.6)),
                    PredictedWord::with_times("sæt", Some(0.7), Some(1.2)),
                ],
            ))
            .expect("assess");

        assert_eq!(out.mode, AlignmentMode::Utterance);
        assert_eq!(out.words.len(), 1);
        let row = &out.words[0];
        assert_eq!(row.kind, RowKind::Utterance);
        assert_eq!(row.index, WordIndex::Reference(0));
        assert_eq!(row.reference_word, UTTERANCE_ROW_LABEL);
        assert_eq!(row.expected_ipa, "ðə kæt sæt");
        assert_eq!(row.predicted_ipa, "də kæt sæt");
        assert_eq!(row.start, Some(0.1));
        assert_eq!(row.end, Some(1.2));
        assert_eq!(out.metrics.substitutions, 1);
        assert_eq!(out.mistakes[0].rule, "TH_FRONTING_OR_STOPPING");
    }

    #[test]
    fn empty_transcription_deletes_every_word() {
        let out = assessor(UtteranceFallback::disabled())
            .assess(&input("zoo keeper", &["zuː", "kiːpɚ"], "", Vec::new()))
            .expect("assess");

        assert_eq!(out.words.len(), 2);
        assert!(out.words.iter().all(|w| w.kind == RowKind::Deleted));
        assert_eq!(out.metrics.reference_phones, 6);
        assert_eq!(out.metrics.deletions, 6);
        assert!((out.metrics.phoneme_error_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_transcription_in_utterance_mode_is_all_deletions() {
        let out = assessor(UtteranceFallback::default())
            .assess(&input("zoo keeper", &["zuː", "kiːpɚ"], "   ", Vec::new()))
            .expect("assess");

        assert_eq!(out.mode, AlignmentMode::Utterance);
        assert!(out.words[0]
            .phoneme_ops
            .iter()
            .all(|op| op.kind() == EditKind::Deletion));
        assert!((out.metrics.phoneme_error_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let err = assessor(UtteranceFallback::default())
            .assess(&input("the zoo", &["zuː"], "zuː", Vec::new()))
            .expect_err("must fail");
        assert!(matches!(
            err,
            AssessmentError::InputMismatch {
                reference_words: 2,
                expected_ipa_words: 1
            }
        ));
    }

    #[test]
    fn chunks_are_trimmed_and_nfc_normalized() {
        let out = assessor(UtteranceFallback::disabled())
            .assess(&input(
                "non",
                &["n\u{00F5}"],
                "  no\u{0303}",
                vec![PredictedWord::new("  no\u{0303}")],
            ))
            .expect("assess");
        assert_eq!(out.words[0].predicted_ipa, "n\u{00F5}");
        assert_eq!(out.words[0].error_count(), 0);
        assert_eq!(out.metrics.phoneme_error_rate, 0.0);
    }

    #[test]
    fn inserted_words_are_reported_separately_and_counted() {
        let out = assessor(UtteranceFallback::disabled())
            .assess(&input(
                "the cat",
                &["ðə", "kæt"],
                "ðə ʌm kæt",
                vec![
                    PredictedWord::new("ðə"),
                    PredictedWord::new("ʌm"),
                    PredictedWord::new("kæt"),
                ],
            ))
            .expect("assess");

        assert_eq!(out.words.len(), 2);
        assert_eq!(out.inserted.len(), 1);
        assert_eq!(out.inserted[0].kind, RowKind::Inserted);
        assert_eq!(out.metrics.insertions, 2);
        assert_eq!(out.metrics.reference_phones, 5);
        assert!((out.metrics.phoneme_error_rate - 0.4).abs() < 1e-12);
    }
}
