use crate::alignment::edit_distance::levenshtein_ops;
use crate::alignment::tokenization::tokenize_ipa;
use crate::pipeline::traits::{SequenceAligner, Tokenizer};
use crate::types::{EditOp, Phone};

pub struct IpaTokenizer;

impl Tokenizer for IpaTokenizer {
    fn tokenize(&self, ipa: &str) -> Vec<Phone> {
        tokenize_ipa(ipa)
    }
}

pub struct LevenshteinAligner;

impl SequenceAligner for LevenshteinAligner {
    fn align(&self, expected: &[Phone], predicted: &[Phone]) -> Vec<EditOp> {
        levenshtein_ops(expected, predicted)
    }
}
