use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

/// One discrete phonetic unit. Compared by exact value only.
pub type Phone = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKind {
    #[serde(rename = "match")]
    Match,
    #[serde(rename = "sub")]
    Substitution,
    #[serde(rename = "ins")]
    Insertion,
    #[serde(rename = "del")]
    Deletion,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Substitution => "sub",
            Self::Insertion => "ins",
            Self::Deletion => "del",
        }
    }
}

/// One step of an edit script between an expected and a predicted phone sequence.
///
/// The variants make the side-presence contract structural: match and substitution
/// always carry both tokens, insertion only the predicted one, deletion only the
/// expected one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum EditOp {
    #[serde(rename = "match")]
    Match { expected: Phone, predicted: Phone },
    #[serde(rename = "sub")]
    Substitution { expected: Phone, predicted: Phone },
    #[serde(rename = "ins")]
    Insertion { predicted: Phone },
    #[serde(rename = "del")]
    Deletion { expected: Phone },
}

impl EditOp {
    pub fn kind(&self) -> EditKind {
        match self {
            Self::Match { .. } => EditKind::Match,
            Self::Substitution { .. } => EditKind::Substitution,
            Self::Insertion { .. } => EditKind::Insertion,
            Self::Deletion { .. } => EditKind::Deletion,
        }
    }

    pub fn expected(&self) -> Option<&str> {
        match self {
            Self::Match { expected, .. }
            | Self::Substitution { expected, .. }
            | Self::Deletion { expected } => Some(expected),
            Self::Insertion { .. } => None,
        }
    }

    pub fn predicted(&self) -> Option<&str> {
        match self {
            Self::Match { predicted, .. }
            | Self::Substitution { predicted, .. }
            | Self::Insertion { predicted } => Some(predicted),
            Self::Deletion { .. } => None,
        }
    }

    /// True for every op that counts toward the error rate.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Match { .. })
    }
}

/// A recognized chunk of the utterance with optional time offsets in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedWord {
    pub ipa: String,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
}

impl PredictedWord {
    pub fn new(ipa: impl Into<String>) -> Self {
        Self {
            ipa: ipa.into(),
            start: None,
            end: None,
        }
    }

    pub fn with_times(ipa: impl Into<String>, start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            ipa: ipa.into(),
            start,
            end,
        }
    }
}

/// Output of the transcription collaborator, consumed as plain data.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transcription {
    pub ipa_text: String,
    #[serde(default)]
    pub words: Vec<PredictedWord>,
}

/// Reference position of an aligned row. Serialized as the reference index, or `-1`
/// for a row that exists only on the predicted side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordIndex {
    Reference(usize),
    Inserted,
}

impl WordIndex {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Reference(idx) => idx as i64,
            Self::Inserted => -1,
        }
    }

    pub fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

impl Serialize for WordIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// Reference word paired with a predicted word.
    Matched,
    /// Reference word with nothing recognized for it.
    Deleted,
    /// Predicted word with no reference counterpart.
    Inserted,
    /// Synthetic whole-utterance comparison.
    Utterance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedWord {
    #[serde(rename = "word_index")]
    pub index: WordIndex,
    pub kind: RowKind,
    pub reference_word: String,
    pub expected_ipa: String,
    pub predicted_ipa: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub phoneme_ops: Vec<EditOp>,
}

impl AlignedWord {
    pub fn error_count(&self) -> usize {
        self.phoneme_ops.iter().filter(|op| op.is_error()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    pub phoneme_error_rate: f64,
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
    /// Ops with an expected side; the error-rate denominator before the floor of 1.
    pub reference_phones: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MistakeRecord {
    pub rule: String,
    pub expected: Phone,
    pub predicted: Phone,
    pub count: usize,
}

/// Substitution counts keyed by `"<expected>→<predicted>"`.
pub type SubstitutionHistogram = BTreeMap<String, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMode {
    Word,
    Utterance,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AssessmentInput {
    pub reference: String,
    /// One expected-IPA string per reference word, from the G2P collaborator.
    pub expected_ipa_words: Vec<String>,
    pub transcription: Transcription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentOutput {
    pub mode: AlignmentMode,
    pub reference_words: Vec<String>,
    pub words: Vec<AlignedWord>,
    /// Predicted-only rows dropped from `words`; their ops still count toward metrics.
    pub inserted: Vec<AlignedWord>,
    pub metrics: Metrics,
    pub substitution_histogram: SubstitutionHistogram,
    pub mistakes: Vec<MistakeRecord>,
}
