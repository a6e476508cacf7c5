use crate::cache::get_or_compile_regex;
use crate::predicate::{PredicateCondition, Quantifier};
use crate::provider::ReaderProvider;
use crate::ts::{resolve_language, PredicateQuery, PredicateQueryBuilder, TreeSitterError};
use ast_grep_language::{LanguageExt, SupportLang};
use serde::Deserialize;
use std::fmt;
use std::io::{Read, Seek};
use std::ops::Range;

/// A query file: structural pattern, its text predicates, and run settings.
///
/// ```toml
/// language = "go"
/// query = "((identifier) @id)"
///
/// [provider]
/// chunk_size = 2
///
/// [[predicates]]
/// kind = "equals"
/// capture = "id"
/// value = "main"
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
pub struct QueryConfig {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub cursor: CursorConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub predicates: Vec<PredicateSpec>,
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.language.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                predicate: None,
                field: "language",
            });
        } else if let Err(e) = resolve_language(&self.language) {
            issues.push(ValidationIssue::InvalidValue {
                predicate: None,
                field: "language",
                message: e.to_string(),
            });
        }

        if self.query.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                predicate: None,
                field: "query",
            });
        }

        if self.cursor.match_limit == Some(0) {
            issues.push(ValidationIssue::InvalidValue {
                predicate: None,
                field: "cursor.match_limit",
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(range) = &self.cursor.byte_range {
            if range.start > range.end {
                issues.push(ValidationIssue::InvalidValue {
                    predicate: None,
                    field: "cursor.byte_range",
                    message: format!("start {} is past end {}", range.start, range.end),
                });
            }
        }

        if self.provider.chunk_size == 0 {
            issues.push(ValidationIssue::InvalidValue {
                predicate: None,
                field: "provider.chunk_size",
                message: "must be greater than zero".to_string(),
            });
        }

        for (idx, predicate) in self.predicates.iter().enumerate() {
            if predicate.capture.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    predicate: Some(idx),
                    field: "capture",
                });
            }
            match predicate.kind {
                PredicateKind::EqualsCapture if predicate.value.trim().is_empty() => {
                    issues.push(ValidationIssue::MissingField {
                        predicate: Some(idx),
                        field: "value",
                    });
                }
                PredicateKind::Matches => {
                    if let Err(e) = get_or_compile_regex(&predicate.value) {
                        issues.push(ValidationIssue::InvalidValue {
                            predicate: Some(idx),
                            field: "value",
                            message: e.to_string(),
                        });
                    }
                }
                _ => {}
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn lang(&self) -> Result<SupportLang, TreeSitterError> {
        resolve_language(&self.language)
    }

    /// Compile the query source and attach every predicate in file order.
    pub fn compile(&self) -> Result<PredicateQuery, TreeSitterError> {
        let language = self.lang()?.get_ts_language();
        let mut builder = PredicateQuery::builder(&language, &self.query)?;
        for predicate in &self.predicates {
            builder = predicate.attach(builder)?;
        }
        Ok(builder.build())
    }
}

/// Limits applied to the underlying tree-sitter cursor.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CursorConfig {
    pub match_limit: Option<u32>,
    pub max_start_depth: Option<u32>,
    pub byte_range: Option<Range<usize>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    4096
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

impl ProviderConfig {
    /// Stream-backed provider reading `chunk_size` bytes per call.
    pub fn reader_provider<R: Read + Seek>(&self, reader: R) -> ReaderProvider<R> {
        ReaderProvider::with_chunk_size(reader, self.chunk_size)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    Equals,
    Matches,
    /// `value` names another capture.
    EqualsCapture,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PredicateSpec {
    #[serde(default)]
    pub pattern: usize,
    pub kind: PredicateKind,
    pub capture: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub quantifier: Quantifier,
}

impl PredicateSpec {
    fn attach(
        &self,
        builder: PredicateQueryBuilder,
    ) -> Result<PredicateQueryBuilder, TreeSitterError> {
        let capture = builder.capture_index(&self.capture)?;
        let condition = match self.kind {
            PredicateKind::Equals => PredicateCondition::text_equals(capture, &self.value),
            PredicateKind::Matches => {
                PredicateCondition::text_matches(capture, get_or_compile_regex(&self.value)?)
            }
            PredicateKind::EqualsCapture => {
                PredicateCondition::capture_equals(capture, builder.capture_index(&self.value)?)
            }
        };
        let condition = if self.negate {
            condition.negated()
        } else {
            condition
        };
        builder.predicate(self.pattern, condition.with_quantifier(self.quantifier))
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField {
        predicate: Option<usize>,
        field: &'static str,
    },
    InvalidValue {
        predicate: Option<usize>,
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { predicate, field } => match predicate {
                Some(idx) => write!(f, "predicate #{idx} missing required field '{field}'"),
                None => write!(f, "query config missing required field '{field}'"),
            },
            ValidationIssue::InvalidValue {
                predicate,
                field,
                message,
            } => match predicate {
                Some(idx) => write!(f, "predicate #{idx} has invalid '{field}': {message}"),
                None => write!(f, "query config has invalid '{field}': {message}"),
            },
        }
    }
}
