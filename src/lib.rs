pub mod alignment;
pub mod case;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod types;

pub use alignment::edit_distance::levenshtein_ops;
pub use alignment::tokenization::{normalize_ipa_text, split_reference_words, tokenize_ipa};
pub use alignment::words::{align_utterance, align_words, WordAlignment};
pub use case::AssessmentCase;
pub use config::{AssessConfig, UtteranceFallback};
pub use error::AssessmentError;
pub use lexicon::{arpabet_to_ipa, Lexicon};
pub use pipeline::builder::AssessorBuilder;
pub use pipeline::runtime::Assessor;
pub use pipeline::traits::{SequenceAligner, Tokenizer};
pub use report::{aggregate_reports, build_report, BatchSummary, CaseFailure, Meta, Report};
pub use scoring::{score, MistakeRule, MistakeRules, Score};
pub use types::{
    AlignedWord, AlignmentMode, AssessmentInput, AssessmentOutput, EditKind, EditOp, Metrics,
    MistakeRecord, Phone, PredictedWord, RowKind, SubstitutionHistogram, Transcription,
    WordIndex,
};
