use regex::bytes::Regex;
use serde::Deserialize;

/// How a condition treats a capture bound to several nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    /// Every bound node must pass.
    #[default]
    All,
    /// At least one bound node must pass.
    Any,
}

/// The text test applied to a capture.
#[derive(Debug, Clone)]
pub enum ConditionKind {
    /// Byte-for-byte equality with a literal.
    TextEquals(Box<[u8]>),
    /// Regex search over the capture text.
    TextMatches(Regex),
    /// Equality with the text of another capture in the same match.
    CaptureEquals(u32),
}

/// A compiled textual predicate attached to one pattern.
#[derive(Debug, Clone)]
pub struct PredicateCondition {
    capture: u32,
    kind: ConditionKind,
    negated: bool,
    quantifier: Quantifier,
}

impl PredicateCondition {
    pub fn new(capture: u32, kind: ConditionKind) -> Self {
        Self {
            capture,
            kind,
            negated: false,
            quantifier: Quantifier::All,
        }
    }

    pub fn text_equals(capture: u32, literal: impl AsRef<[u8]>) -> Self {
        Self::new(capture, ConditionKind::TextEquals(literal.as_ref().into()))
    }

    pub fn text_matches(capture: u32, regex: Regex) -> Self {
        Self::new(capture, ConditionKind::TextMatches(regex))
    }

    pub fn capture_equals(capture: u32, other: u32) -> Self {
        Self::new(capture, ConditionKind::CaptureEquals(other))
    }

    /// Invert the per-node outcome (`not-eq?`, `not-match?`).
    pub fn negated(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn with_quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = quantifier;
        self
    }

    pub fn capture(&self) -> u32 {
        self.capture
    }

    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    /// Every capture index this condition reads.
    pub fn referenced_captures(&self) -> impl Iterator<Item = u32> + '_ {
        let other = match self.kind {
            ConditionKind::CaptureEquals(other) => Some(other),
            _ => None,
        };
        std::iter::once(self.capture).chain(other)
    }
}

/// Predicates for every pattern of a query, indexed by pattern.
#[derive(Debug, Clone, Default)]
pub struct PatternPredicates {
    patterns: Vec<Vec<PredicateCondition>>,
}

impl PatternPredicates {
    pub fn new(pattern_count: usize) -> Self {
        Self {
            patterns: vec![Vec::new(); pattern_count],
        }
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Predicates for a pattern in declaration order. Unknown patterns have
    /// none.
    pub fn for_pattern(&self, pattern_index: usize) -> &[PredicateCondition] {
        self.patterns
            .get(pattern_index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Append a predicate, growing the table if needed.
    pub fn push(&mut self, pattern_index: usize, condition: PredicateCondition) {
        if pattern_index >= self.patterns.len() {
            self.patterns.resize_with(pattern_index + 1, Vec::new);
        }
        self.patterns[pattern_index].push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.iter().all(Vec::is_empty)
    }
}
