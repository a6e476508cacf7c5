//! Tree-sitter integration.
//!
//! Parsing, query compilation and raw pattern matching are tree-sitter's
//! job. This module wires them to the chunked predicate machinery: tree
//! nodes become [`SyntaxNode`](crate::assemble::SyntaxNode)s and query
//! matches become a [`MatchSource`](crate::cursor::MatchSource).

pub mod errors;
pub mod node;
pub mod parser;
pub mod query;

pub use errors::TreeSitterError;
pub use parser::{resolve_language, ParsedSource, SourceParser};
pub use query::{
    PredicateCursor, PredicateQuery, PredicateQueryBuilder, QueryCaptures, QueryMatchSource,
};
