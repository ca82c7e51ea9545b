pub mod edit_distance;
pub mod tokenization;
pub mod words;
