use std::collections::HashMap;

use crate::alignment::edit_distance::{levenshtein_ops, min_cost_path, Step};
use crate::alignment::tokenization::tokenize_ipa;
use crate::error::AssessmentError;
use crate::types::{AlignedWord, EditOp, Phone, PredictedWord, RowKind, WordIndex};

pub const UTTERANCE_ROW_LABEL: &str = "(full utterance)";

const NO_PHONES: &[Phone] = &[];

/// Word-level alignment result.
///
/// Holds every row in reference order, including predicted-only rows that the
/// per-word table leaves out, so callers can still account for their ops.
#[derive(Debug, Clone, PartialEq)]
pub struct WordAlignment {
    rows: Vec<AlignedWord>,
}

impl WordAlignment {
    pub fn from_rows(rows: Vec<AlignedWord>) -> Self {
        Self { rows }
    }

    /// Every row, pure insertions included.
    pub fn rows(&self) -> &[AlignedWord] {
        &self.rows
    }

    /// Rows that have a reference word.
    pub fn words(&self) -> impl Iterator<Item = &AlignedWord> {
        self.rows.iter().filter(|row| !row.index.is_inserted())
    }

    pub fn inserted(&self) -> impl Iterator<Item = &AlignedWord> {
        self.rows.iter().filter(|row| row.index.is_inserted())
    }

    /// Phoneme ops across all rows, pure insertions included.
    pub fn all_ops(&self) -> impl Iterator<Item = &EditOp> {
        self.rows.iter().flat_map(|row| row.phoneme_ops.iter())
    }

    /// Split into (per-word table, predicted-only rows).
    pub fn into_parts(self) -> (Vec<AlignedWord>, Vec<AlignedWord>) {
        self.rows
            .into_iter()
            .partition(|row| !row.index.is_inserted())
    }
}

/// Align reference words to predicted words with the default IPA tokenizer and
/// Levenshtein phone aligner.
pub fn align_words(
    reference_words: &[String],
    expected_ipa_words: &[String],
    predicted_words: &[PredictedWord],
) -> Result<WordAlignment, AssessmentError> {
    align_words_with(
        tokenize_ipa,
        levenshtein_ops,
        reference_words,
        expected_ipa_words,
        predicted_words,
    )
}

/// Word-level DP whose diagonal cost is the phone-level error count between a
/// reference word's expected IPA and a predicted word's IPA.
///
/// Word insertions and deletions cost 1 and ties prefer pairing words. Each
/// distinct (expected, predicted) IPA pair is scored once.
pub fn align_words_with<T, A>(
    tokenize: T,
    align: A,
    reference_words: &[String],
    expected_ipa_words: &[String],
    predicted_words: &[PredictedWord],
) -> Result<WordAlignment, AssessmentError>
where
    T: Fn(&str) -> Vec<Phone>,
    A: Fn(&[Phone], &[Phone]) -> Vec<EditOp>,
{
    if expected_ipa_words.len() != reference_words.len() {
        return Err(AssessmentError::input_mismatch(
            reference_words.len(),
            expected_ipa_words.len(),
        ));
    }

    let expected_phones: Vec<Vec<Phone>> =
        expected_ipa_words.iter().map(|w| tokenize(w.as_str())).collect();
    let predicted_phones: Vec<Vec<Phone>> =
        predicted_words.iter().map(|w| tokenize(w.ipa.as_str())).collect();

    let mut memo: HashMap<(&str, &str), usize> = HashMap::new();
    let mut lookups = 0usize;
    let path = min_cost_path(reference_words.len(), predicted_words.len(), |i, j| {
        lookups += 1;
        let key = (expected_ipa_words[i].as_str(), predicted_words[j].ipa.as_str());
        *memo.entry(key).or_insert_with(|| {
            align(expected_phones[i].as_slice(), predicted_phones[j].as_slice())
                .iter()
                .filter(|op| op.is_error())
                .count()
        })
    });
    tracing::debug!(
        reference_words = reference_words.len(),
        predicted_words = predicted_words.len(),
        word_cost = path.cost,
        pair_lookups = lookups,
        pairs_scored = memo.len(),
        "word alignment: DP complete"
    );

    let mut rows = Vec::with_capacity(path.steps.len());
    let (mut i, mut j) = (0usize, 0usize);
    for step in path.steps {
        match step {
            Step::Diagonal => {
                let pred = &predicted_words[j];
                let ops = align(expected_phones[i].as_slice(), predicted_phones[j].as_slice());
                // Pairing with a chunk that holds no phones means nothing was
                // recognized for this word.
                let kind = if predicted_phones[j].is_empty() {
                    RowKind::Deleted
                } else {
                    RowKind::Matched
                };
                rows.push(AlignedWord {
                    index: WordIndex::Reference(i),
                    kind,
                    reference_word: reference_words[i].clone(),
                    expected_ipa: expected_ipa_words[i].clone(),
                    predicted_ipa: pred.ipa.clone(),
                    start: pred.start,
                    end: pred.end,
                    phoneme_ops: ops,
                });
                i += 1;
                j += 1;
            }
            Step::Delete => {
                rows.push(AlignedWord {
                    index: WordIndex::Reference(i),
                    kind: RowKind::Deleted,
                    reference_word: reference_words[i].clone(),
                    expected_ipa: expected_ipa_words[i].clone(),
                    predicted_ipa: String::new(),
                    start: None,
                    end: None,
                    phoneme_ops: align(expected_phones[i].as_slice(), NO_PHONES),
                });
                i += 1;
            }
            Step::Insert => {
                let pred = &predicted_words[j];
                rows.push(AlignedWord {
                    index: WordIndex::Inserted,
                    kind: RowKind::Inserted,
                    reference_word: String::new(),
                    expected_ipa: String::new(),
                    predicted_ipa: pred.ipa.clone(),
                    start: pred.start,
                    end: pred.end,
                    phoneme_ops: align(NO_PHONES, predicted_phones[j].as_slice()),
                });
                j += 1;
            }
        }
    }

    Ok(WordAlignment::from_rows(rows))
}

/// Single-row comparison of the whole expected utterance against the whole
/// predicted utterance, used when word chunks are too coarse to align.
pub fn align_utterance(
    expected_ipa: &str,
    predicted_ipa: &str,
    start: Option<f64>,
    end: Option<f64>,
) -> AlignedWord {
    align_utterance_with(
        tokenize_ipa,
        levenshtein_ops,
        expected_ipa,
        predicted_ipa,
        start,
        end,
    )
}

pub fn align_utterance_with<T, A>(
    tokenize: T,
    align: A,
    expected_ipa: &str,
    predicted_ipa: &str,
    start: Option<f64>,
    end: Option<f64>,
) -> AlignedWord
where
    T: Fn(&str) -> Vec<Phone>,
    A: Fn(&[Phone], &[Phone]) -> Vec<EditOp>,
{
    let expected = tokenize(expected_ipa);
    let predicted = tokenize(predicted_ipa);
    tracing::debug!(
        expected_phones = expected.len(),
        predicted_phones = predicted.len(),
        "word alignment: utterance-level comparison"
    );
    AlignedWord {
        index: WordIndex::Reference(0),
        kind: RowKind::Utterance,
        reference_word: UTTERANCE_ROW_LABEL.to_string(),
        expected_ipa: expected_ipa.to_string(),
        predicted_ipa: predicted_ipa.to_string(),
        start,
        end,
        phoneme_ops: align(expected.as_slice(), predicted.as_slice()),
    }
}
