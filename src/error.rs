use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("YAML parse error while {context}: {source}")]
    Yaml {
        context: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(
        "expected IPA word count ({expected_ipa_words}) does not match reference word count ({reference_words})"
    )]
    InputMismatch {
        reference_words: usize,
        expected_ipa_words: usize,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl AssessmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn yaml(context: &'static str, source: serde_yaml::Error) -> Self {
        Self::Yaml { context, source }
    }

    pub(crate) fn input_mismatch(reference_words: usize, expected_ipa_words: usize) -> Self {
        Self::InputMismatch {
            reference_words,
            expected_ipa_words,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_mismatch_message_names_both_counts() {
        let err = AssessmentError::input_mismatch(3, 2);
        let msg = err.to_string();
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn io_error_keeps_source() {
        let err = AssessmentError::io(
            "read lexicon",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("I/O error while read lexicon"));
    }
}
