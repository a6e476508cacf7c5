//! Chunked Captures: tree-sitter query filtering over lazily fetched text
//!
//! Text predicates (`#eq?`, `#match?` and friends), whether written in the
//! query source or attached afterwards, need the source text of the
//! captured nodes. This crate does not assume that text sits in one
//! buffer: it asks a caller-supplied [`TextProvider`] for chunks, keyed by
//! byte offset and row/column, and reassembles each node's bytes on demand.
//!
//! # Architecture
//!
//! - [`provider`]: the chunk source capability and stock providers
//! - [`assemble`]: rebuilds a node's bytes from however the provider slices them
//! - [`predicate`]: compiled conditions and the evaluator that checks them
//! - [`cursor`]: the pull-based iterator that drops matches whose predicates fail
//! - [`ts`]: tree-sitter parsing, queries and the raw match source
//! - [`config`]: TOML query files and cursor/provider settings
//!
//! # Robustness
//!
//! - Chunks of any length are accepted, including one byte and overruns
//! - An empty chunk ends the node's text; short text fails predicates
//!   instead of raising errors
//! - Assembly never reads outside a node's range and always terminates
//!
//! # Example
//!
//! ```no_run
//! use chunked_captures::provider::from_fn;
//! use chunked_captures::ts::{PredicateCursor, PredicateQuery, SourceParser};
//! use chunked_captures::StreamingIterator;
//! use ast_grep_language::SupportLang;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = b"package main; func test() {}";
//! let mut parser = SourceParser::new(SupportLang::Go)?;
//! let tree = parser.parse(source)?;
//!
//! let query = PredicateQuery::builder(&parser.language(), "((identifier) @id)")?
//!     .equals(0, "id", "test")?
//!     .build();
//!
//! // Serve one byte per call.
//! let provider = from_fn(|offset, _position| {
//!     source.get(offset..offset + 1).unwrap_or_default()
//! });
//!
//! let mut cursor = PredicateCursor::new();
//! let mut matches = cursor.matches(&query, tree.root_node(), provider);
//! while let Some(m) = matches.next() {
//!     for capture in m.captures() {
//!         println!("{:?}", capture.node.byte_range());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod cache;
pub mod config;
pub mod cursor;
pub mod predicate;
pub mod provider;
pub mod ts;

// Re-exports
pub use assemble::{assemble, AssembledText, ChunkAssembler, SyntaxNode};
pub use config::{
    compile_from_path, load_from_path, load_from_str, ConfigError, CursorConfig, QueryConfig,
};
pub use cursor::{Capture, CaptureIterator, Match, MatchSource};
pub use predicate::{PatternPredicates, PredicateCondition, PredicateEvaluator, Quantifier};
pub use provider::{from_fn, ReaderProvider, SharedProvider, SliceProvider, TextProvider};
pub use tree_sitter::{Point, StreamingIterator};
pub use ts::{PredicateCursor, PredicateQuery, SourceParser, TreeSitterError};
