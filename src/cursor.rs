//! Pull-based filtering of raw matches by their text predicates.
//!
//! A [`MatchSource`] produces candidate matches. The [`CaptureIterator`]
//! pulls them one at a time, runs the pattern's predicates through the
//! [`PredicateEvaluator`], and only surfaces the matches that pass. Text is
//! fetched lazily: a match that is never pulled never touches the provider.

use crate::assemble::SyntaxNode;
use crate::predicate::{PatternPredicates, PredicateEvaluator};
use crate::provider::TextProvider;
use tracing::debug;
use tree_sitter::StreamingIterator;

/// A node bound to a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture<N> {
    pub node: N,
    pub index: u32,
}

/// A pattern index plus its captures, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<N> {
    pattern_index: usize,
    captures: Vec<Capture<N>>,
}

impl<N> Match<N> {
    pub fn new(pattern_index: usize, captures: Vec<Capture<N>>) -> Self {
        Self {
            pattern_index,
            captures,
        }
    }

    pub fn pattern_index(&self) -> usize {
        self.pattern_index
    }

    pub fn captures(&self) -> &[Capture<N>] {
        &self.captures
    }

    /// Nodes bound to `index`, in capture order.
    pub fn nodes_for_capture_index(&self, index: u32) -> impl Iterator<Item = &N> + '_ {
        self.captures
            .iter()
            .filter(move |capture| capture.index == index)
            .map(|capture| &capture.node)
    }
}

/// Producer of raw candidate matches, before any text predicate runs.
pub trait MatchSource {
    type Node: SyntaxNode;

    /// Replace `captures` with the next candidate's captures and return its
    /// pattern index, or `None` once the source is exhausted.
    fn next_match(&mut self, captures: &mut Vec<Capture<Self::Node>>) -> Option<usize>;
}

/// Matches whose text predicates hold.
///
/// The yielded match lives in a buffer reused on every pull; copy it out
/// (it is `Clone`) to keep it past the next [`advance`](StreamingIterator::advance).
pub struct CaptureIterator<'p, S: MatchSource, P> {
    source: S,
    predicates: &'p PatternPredicates,
    provider: P,
    evaluator: PredicateEvaluator,
    current: Match<S::Node>,
    has_current: bool,
    finished: bool,
    accepted: usize,
    rejected: usize,
}

impl<'p, S, P> CaptureIterator<'p, S, P>
where
    S: MatchSource,
    P: TextProvider,
{
    pub fn new(source: S, predicates: &'p PatternPredicates, provider: P) -> Self {
        Self {
            source,
            predicates,
            provider,
            evaluator: PredicateEvaluator::new(),
            current: Match::new(0, Vec::new()),
            has_current: false,
            finished: false,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Matches yielded so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Candidates discarded because a predicate failed.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }
}

impl<S, P> StreamingIterator for CaptureIterator<'_, S, P>
where
    S: MatchSource,
    P: TextProvider,
{
    type Item = Match<S::Node>;

    fn advance(&mut self) {
        self.has_current = false;
        if self.finished {
            return;
        }

        loop {
            let Some(pattern_index) = self.source.next_match(&mut self.current.captures) else {
                self.finished = true;
                return;
            };
            self.current.pattern_index = pattern_index;

            let predicates = self.predicates.for_pattern(pattern_index);
            if predicates.is_empty()
                || self
                    .evaluator
                    .evaluate(&self.current, predicates, &mut self.provider)
            {
                self.accepted += 1;
                self.has_current = true;
                return;
            }

            self.rejected += 1;
            debug!(pattern = pattern_index, "discarding match");
        }
    }

    fn get(&self) -> Option<&Self::Item> {
        self.has_current.then_some(&self.current)
    }
}
