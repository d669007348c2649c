//! The Action/Intent Emitter (§4.5) — the thin collaborator that appends
//! `engine::execute`'s or `registration::reduce`'s output onto whatever
//! running total a caller is accumulating.
//!
//! It performs no reordering and never merges entries from different
//! waves or different `reduce` calls; it exists only so callers share
//! one append point instead of re-deriving "push onto the end" at every
//! call site.

use contract::{Action, Intent};

/// Append one call's emitted actions onto an accumulator, preserving
/// both orders: the accumulator's existing entries stay first, `actions`
/// stays in the wave-major, declaration-order sequence the executor
/// produced it in (§4.3.3).
pub fn append_actions(accumulator: &mut Vec<Action>, actions: impl IntoIterator<Item = Action>) {
    accumulator.extend(actions);
}

/// Append one call's emitted intents onto an accumulator, same ordering
/// guarantee as [`append_actions`].
pub fn append_intents(accumulator: &mut Vec<Intent>, intents: impl IntoIterator<Item = Intent>) {
    accumulator.extend(intents);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn action() -> Action {
        Action {
            action_id: Uuid::new_v4(),
            action_type: contract::ActionType::Compute,
            target_node_type: "NodeCompute".to_string(),
            payload: json!({}),
            dependencies: Vec::new(),
            priority: 1,
            timeout_ms: 1_000,
            lease_id: Uuid::new_v4(),
            epoch: 0,
            retry_count: 0,
            metadata: json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn append_preserves_existing_entries_and_order() {
        let mut acc = vec![action()];
        let new_ones = vec![action(), action()];
        append_actions(&mut acc, new_ones.clone());
        assert_eq!(acc.len(), 3);
        assert_eq!(acc[1].action_id, new_ones[0].action_id);
        assert_eq!(acc[2].action_id, new_ones[1].action_id);
    }
}
