use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("unsupported language: {name}")]
    UnknownLanguage { name: String },

    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("invalid tree-sitter query: {message}")]
    InvalidQuery { message: String },

    #[error("pattern index {index} out of range: query has {count} patterns")]
    PatternOutOfRange { index: usize, count: usize },

    #[error("capture '@{name}' not found in query")]
    CaptureNotFound { name: String },

    #[error("capture index {index} out of range: query has {count} captures")]
    CaptureOutOfRange { index: u32, count: usize },

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
