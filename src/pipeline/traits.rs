use crate::types::{EditOp, Phone};

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, ipa: &str) -> Vec<Phone>;
}

pub trait SequenceAligner: Send + Sync {
    fn align(&self, expected: &[Phone], predicted: &[Phone]) -> Vec<EditOp>;
}
