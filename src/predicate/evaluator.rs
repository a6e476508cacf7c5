use crate::assemble::{ChunkAssembler, SyntaxNode};
use crate::cursor::Match;
use crate::predicate::condition::{ConditionKind, PredicateCondition, Quantifier};
use crate::provider::TextProvider;
use tracing::debug;

/// Checks a match's textual predicates against provider-assembled text.
///
/// Evaluation never fails. Missing or truncated text simply makes a
/// predicate false, and a predicate whose capture did not bind passes.
#[derive(Debug, Default)]
pub struct PredicateEvaluator {
    primary: ChunkAssembler,
    secondary: ChunkAssembler,
}

impl PredicateEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every predicate holds. Stops at the first failure.
    pub fn evaluate<N, P>(
        &mut self,
        candidate: &Match<N>,
        predicates: &[PredicateCondition],
        provider: &mut P,
    ) -> bool
    where
        N: SyntaxNode,
        P: TextProvider + ?Sized,
    {
        predicates.iter().enumerate().all(|(position, predicate)| {
            let passed = self.check(candidate, predicate, provider);
            if !passed {
                debug!(
                    pattern = candidate.pattern_index(),
                    predicate = position,
                    capture = predicate.capture(),
                    "predicate failed"
                );
            }
            passed
        })
    }

    fn check<N, P>(
        &mut self,
        candidate: &Match<N>,
        predicate: &PredicateCondition,
        provider: &mut P,
    ) -> bool
    where
        N: SyntaxNode,
        P: TextProvider + ?Sized,
    {
        let nodes = candidate.nodes_for_capture_index(predicate.capture());
        let negated = predicate.is_negated();
        let primary = &mut self.primary;

        match predicate.kind() {
            ConditionKind::TextEquals(literal) => {
                quantify(predicate.quantifier(), nodes, |node| {
                    (primary.assemble(node, provider) == &literal[..]) != negated
                })
            }
            ConditionKind::TextMatches(regex) => {
                quantify(predicate.quantifier(), nodes, |node| {
                    regex.is_match(primary.assemble(node, provider)) != negated
                })
            }
            // Nodes are paired up in capture order; extra nodes on either
            // side have no partner and are not compared.
            ConditionKind::CaptureEquals(other) => {
                let secondary = &mut self.secondary;
                let pairs = nodes.zip(candidate.nodes_for_capture_index(*other));
                quantify(predicate.quantifier(), pairs, |(left, right)| {
                    let left = primary.assemble(left, provider);
                    let right = secondary.assemble(right, provider);
                    (left == right) != negated
                })
            }
        }
    }
}

// An empty `items` passes under either quantifier.
fn quantify<T>(
    quantifier: Quantifier,
    mut items: impl Iterator<Item = T>,
    mut test: impl FnMut(T) -> bool,
) -> bool {
    match quantifier {
        Quantifier::All => items.all(test),
        Quantifier::Any => match items.next() {
            Some(first) => test(first) || items.any(test),
            None => true,
        },
    }
}
