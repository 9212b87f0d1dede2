//! Validator quorum selection

use rand::Rng;
use rewards_types::{same_address, ValidatorNode};

/// Pick up to `count` validators, each from a distinct operator and none
/// from `excluded_operators`.
///
/// Only the leading `min(len, count)` slots are shuffled before the walk;
/// selection is for load spreading, not security. Returns fewer than
/// `count` when not enough eligible operators exist.
pub fn select_validators<R: Rng + ?Sized>(
    validators: &[ValidatorNode],
    count: usize,
    excluded_operators: &[String],
    rng: &mut R,
) -> Vec<ValidatorNode> {
    let mut candidates = validators.to_vec();
    let len = candidates.len();
    for i in 0..count.min(len) {
        let j = rng.gen_range(i..len);
        candidates.swap(i, j);
    }

    let mut seen: Vec<String> = excluded_operators.to_vec();
    let mut selected = Vec::with_capacity(count.min(len));
    for node in candidates {
        if selected.len() >= count {
            break;
        }
        if seen.iter().any(|op| same_address(op, &node.operator_address)) {
            continue;
        }
        seen.push(node.operator_address.clone());
        selected.push(node);
    }
    selected
}
