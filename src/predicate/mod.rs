//! Textual predicates and their evaluation.
//!
//! Predicates are compiled once per pattern ([`PatternPredicates`]) and
//! checked per candidate match by the [`PredicateEvaluator`], which pulls
//! capture text through a [`TextProvider`](crate::provider::TextProvider).

pub mod condition;
pub mod evaluator;

pub use condition::{ConditionKind, PatternPredicates, PredicateCondition, Quantifier};
pub use evaluator::PredicateEvaluator;
