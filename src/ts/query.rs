use crate::assemble::ChunkAssembler;
use crate::cache::get_or_compile_regex;
use crate::config::CursorConfig;
use crate::cursor::{Capture, CaptureIterator, MatchSource};
use crate::predicate::{PatternPredicates, PredicateCondition};
use crate::provider::{SharedProvider, TextProvider};
use crate::ts::errors::TreeSitterError;
use tracing::trace;
use tree_sitter::{Language, Node, Query, QueryCursor, QueryMatches, StreamingIterator};

/// A tree-sitter query plus the text predicates of each of its patterns.
///
/// Text predicates come from two places. Those written in the query source
/// (`#eq?`, `#not-eq?`, `#match?`, `#any-of?` ...) are checked by
/// tree-sitter while it matches; those attached through
/// [`PredicateQuery::builder`] or a query file are checked afterwards by the
/// [`CaptureIterator`]. Both read node text from the same provider.
#[derive(Debug)]
pub struct PredicateQuery {
    query: Query,
    predicates: PatternPredicates,
}

impl PredicateQuery {
    /// Compile a query with no text predicates.
    pub fn new(language: &Language, source: &str) -> Result<Self, TreeSitterError> {
        Ok(Self::builder(language, source)?.build())
    }

    pub fn builder(
        language: &Language,
        source: &str,
    ) -> Result<PredicateQueryBuilder, TreeSitterError> {
        let query = Query::new(language, source).map_err(|e| TreeSitterError::InvalidQuery {
            message: e.to_string(),
        })?;
        let predicates = PatternPredicates::new(query.pattern_count());
        Ok(PredicateQueryBuilder { query, predicates })
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn predicates(&self) -> &PatternPredicates {
        &self.predicates
    }

    pub fn pattern_count(&self) -> usize {
        self.query.pattern_count()
    }

    pub fn capture_names(&self) -> &[&str] {
        self.query.capture_names()
    }

    pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
        self.query.capture_index_for_name(name)
    }
}

/// Attaches predicates to a compiled query, validating every capture and
/// pattern reference up front so evaluation never sees a dangling one.
pub struct PredicateQueryBuilder {
    query: Query,
    predicates: PatternPredicates,
}

impl PredicateQueryBuilder {
    /// Resolve a capture name (with or without the leading `@`).
    pub fn capture_index(&self, name: &str) -> Result<u32, TreeSitterError> {
        let name = name.strip_prefix('@').unwrap_or(name);
        self.query
            .capture_index_for_name(name)
            .ok_or_else(|| TreeSitterError::CaptureNotFound {
                name: name.to_string(),
            })
    }

    /// `(#eq? @capture "literal")`
    pub fn equals(
        self,
        pattern: usize,
        capture: &str,
        literal: impl AsRef<[u8]>,
    ) -> Result<Self, TreeSitterError> {
        let capture = self.capture_index(capture)?;
        self.predicate(pattern, PredicateCondition::text_equals(capture, literal))
    }

    /// `(#match? @capture "regex")`
    pub fn matches(
        self,
        pattern: usize,
        capture: &str,
        regex: &str,
    ) -> Result<Self, TreeSitterError> {
        let capture = self.capture_index(capture)?;
        let regex = get_or_compile_regex(regex)?;
        self.predicate(pattern, PredicateCondition::text_matches(capture, regex))
    }

    /// `(#eq? @capture @other)`
    pub fn equals_capture(
        self,
        pattern: usize,
        capture: &str,
        other: &str,
    ) -> Result<Self, TreeSitterError> {
        let capture = self.capture_index(capture)?;
        let other = self.capture_index(other)?;
        self.predicate(pattern, PredicateCondition::capture_equals(capture, other))
    }

    /// Attach an already-built condition to `pattern`.
    pub fn predicate(
        mut self,
        pattern: usize,
        condition: PredicateCondition,
    ) -> Result<Self, TreeSitterError> {
        let count = self.query.pattern_count();
        if pattern >= count {
            return Err(TreeSitterError::PatternOutOfRange {
                index: pattern,
                count,
            });
        }

        let captures = self.query.capture_names().len();
        if let Some(index) = condition
            .referenced_captures()
            .find(|&index| index as usize >= captures)
        {
            return Err(TreeSitterError::CaptureOutOfRange {
                index,
                count: captures,
            });
        }

        self.predicates.push(pattern, condition);
        Ok(self)
    }

    pub fn build(self) -> PredicateQuery {
        PredicateQuery {
            query: self.query,
            predicates: self.predicates,
        }
    }
}

/// Feeds tree-sitter's built-in text predicates.
///
/// Each node is assembled from the shared provider and handed over as one
/// chunk, clipped to the node's range. Truncated text is passed on as-is.
pub struct NodeText<P> {
    provider: SharedProvider<P>,
    assembler: ChunkAssembler,
}

impl<P: TextProvider> NodeText<P> {
    fn new(provider: SharedProvider<P>) -> Self {
        Self {
            provider,
            assembler: ChunkAssembler::new(),
        }
    }
}

impl<P: TextProvider> tree_sitter::TextProvider<Vec<u8>> for NodeText<P> {
    type I = std::iter::Once<Vec<u8>>;

    fn text(&mut self, node: Node<'_>) -> Self::I {
        let text = self
            .provider
            .with_mut(|provider| self.assembler.assemble(&node, provider).to_vec())
            .unwrap_or_default();
        trace!(
            start = node.start_byte(),
            len = text.len(),
            "assembled text for query predicate"
        );
        std::iter::once(text)
    }
}

/// Raw tree-sitter matches as a [`MatchSource`].
///
/// Matches that fail the query's built-in predicates never get here, so
/// they count toward neither `accepted` nor `rejected`.
pub struct QueryMatchSource<'query, 'tree: 'query, P: TextProvider> {
    matches: QueryMatches<'query, 'tree, NodeText<P>, Vec<u8>>,
}

impl<'query, 'tree: 'query, P: TextProvider> MatchSource for QueryMatchSource<'query, 'tree, P> {
    type Node = Node<'tree>;

    fn next_match(&mut self, captures: &mut Vec<Capture<Node<'tree>>>) -> Option<usize> {
        let raw = self.matches.next()?;
        captures.clear();
        captures.extend(raw.captures.iter().map(|capture| Capture {
            node: capture.node,
            index: capture.index,
        }));
        Some(raw.pattern_index)
    }
}

/// Iterator over the matches of a [`PredicateQuery`] whose predicates hold.
///
/// The provider comes back as a [`SharedProvider`]; once the iterator is
/// dropped or consumed through
/// [`into_provider`](CaptureIterator::into_provider), its
/// [`into_inner`](SharedProvider::into_inner) returns the original.
pub type QueryCaptures<'query, 'tree, P> =
    CaptureIterator<'query, QueryMatchSource<'query, 'tree, P>, SharedProvider<P>>;

/// Query cursor that filters matches through chunked text predicates.
pub struct PredicateCursor {
    cursor: QueryCursor,
}

impl PredicateCursor {
    pub fn new() -> Self {
        Self {
            cursor: QueryCursor::new(),
        }
    }

    pub fn with_config(config: &CursorConfig) -> Self {
        let mut cursor = Self::new();
        cursor.configure(config);
        cursor
    }

    /// Apply limits and ranges from `config`.
    pub fn configure(&mut self, config: &CursorConfig) {
        if let Some(limit) = config.match_limit {
            self.cursor.set_match_limit(limit);
        }
        if let Some(range) = &config.byte_range {
            self.cursor.set_byte_range(range.clone());
        }
        self.cursor.set_max_start_depth(config.max_start_depth);
    }

    /// Whether the last run dropped in-progress matches because of the
    /// match limit.
    pub fn did_exceed_match_limit(&self) -> bool {
        self.cursor.did_exceed_match_limit()
    }

    /// Run `query` on `node`, pulling predicate text from `provider`.
    pub fn matches<'query, 'cursor: 'query, 'tree: 'query, P: TextProvider>(
        &'cursor mut self,
        query: &'query PredicateQuery,
        node: Node<'tree>,
        provider: P,
    ) -> QueryCaptures<'query, 'tree, P> {
        let provider = SharedProvider::new(provider);
        let matches = self
            .cursor
            .matches(&query.query, node, NodeText::new(provider.clone()));
        CaptureIterator::new(QueryMatchSource { matches }, &query.predicates, provider)
    }
}

impl Default for PredicateCursor {
    fn default() -> Self {
        Self::new()
    }
}
