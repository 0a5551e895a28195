//! Proptest strategies for dispatch properties

use proptest::prelude::*;

/// Instance keys such as `req-17`
pub fn instance_key_strategy() -> impl Strategy<Value = String> {
    (0u32..10_000).prop_map(|n| format!("req-{n}"))
}

/// Distinct collaboration member keys, at least one
pub fn collaboration_members_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(instance_key_strategy(), 1..8)
        .prop_map(|keys| {
            let mut keys: Vec<_> = keys.into_iter().collect();
            keys.sort();
            keys
        })
}

/// Number of hooks in a chain
pub fn hook_chain_length_strategy() -> impl Strategy<Value = usize> {
    0usize..16
}
