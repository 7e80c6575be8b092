//! Property tests for the fold and the ordered merge.

use proptest::prelude::*;

use tempora_core::node::{fold, merge_ordered, CollectionDelta, CollectionPatch, NodeDelta, NodeState};
use tempora_core::{FieldValue, Guid};

fn guid_strategy() -> impl Strategy<Value = Guid> {
    (0u128..32).prop_map(Guid::from_u128)
}

fn field_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        any::<Option<bool>>().prop_map(FieldValue::Boolean),
        proptest::option::of("[a-z]{0,8}").prop_map(FieldValue::String),
        proptest::option::of(-1.0e6f64..1.0e6).prop_map(FieldValue::Number),
        proptest::option::of(prop::collection::vec("[a-z]{1,4}", 0..4)).prop_map(FieldValue::StringList),
    ]
}

fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-e]".prop_map(|s| format!("f_{s}"))
}

fn state_strategy() -> impl Strategy<Value = NodeState> {
    (
        any::<bool>(),
        prop::collection::vec((field_name_strategy(), field_value_strategy()), 0..6),
        prop::collection::vec(guid_strategy(), 0..8),
    )
        .prop_map(|(deleted, fields, items)| {
            let mut state = NodeState::default();
            state.deleted = deleted;
            for (name, value) in fields {
                state.fields.set(&name, value);
            }
            state.edge_collections.insert("items".to_string(), items);
            state
        })
}

fn delta_fields_strategy() -> impl Strategy<Value = NodeDelta> {
    prop::collection::vec((field_name_strategy(), field_value_strategy()), 0..6).prop_map(|fields| {
        let mut delta = NodeDelta::default();
        for (name, value) in fields {
            delta.fields.set(&name, value);
        }
        delta
    })
}

proptest! {
    #[test]
    fn prop_fold_empty_delta_is_identity(data in state_strategy()) {
        prop_assert_eq!(fold(&data, &NodeDelta::default()), data);
    }

    #[test]
    fn prop_fold_last_write_wins(data in state_strategy(), delta in delta_fields_strategy()) {
        let folded = fold(&data, &delta);
        for (name, value) in delta.fields.entries() {
            prop_assert_eq!(folded.fields.get(&name), Some(value));
        }
        for (name, value) in data.fields.entries() {
            if !delta.fields.contains(&name) {
                prop_assert_eq!(folded.fields.get(&name), Some(value));
            }
        }
    }

    #[test]
    fn prop_fold_never_clears_deleted(data in state_strategy(), delta in delta_fields_strategy()) {
        let folded = fold(&data, &delta);
        prop_assert_eq!(folded.deleted, data.deleted || delta.deleted);
    }

    #[test]
    fn prop_fold_empty_patch_keeps_collection(data in state_strategy()) {
        let mut delta = NodeDelta::default();
        delta
            .edge_collections
            .insert("items".to_string(), CollectionDelta::Patch(CollectionPatch::new()));
        prop_assert_eq!(&fold(&data, &delta).edge_collections, &data.edge_collections);
    }

    /// Items the patch does not touch keep their relative order.
    #[test]
    fn prop_merge_preserves_untouched_order(
        base in prop::collection::vec(0u128..16, 0..12),
        added in prop::collection::vec((16u128..32, proptest::option::of(0u128..32)), 0..6),
        removed in prop::collection::vec(0u128..16, 0..4),
    ) {
        let base: Vec<Guid> = base.into_iter().map(Guid::from_u128).collect();
        let mut patch = CollectionPatch::new();
        for r in &removed {
            patch.remove(Guid::from_u128(*r));
        }
        for (item, successor) in &added {
            patch.insert(Guid::from_u128(*item), successor.map(Guid::from_u128));
        }

        let mut merged = base.clone();
        let outcome = merge_ordered(&mut merged, &patch);

        let touched = |g: &Guid| patch.removed().contains(g) || patch.added().iter().any(|(a, _)| a == g);
        let expected: Vec<Guid> = base.iter().copied().filter(|g| !touched(g)).collect();
        let actual: Vec<Guid> = merged.iter().copied().filter(|g| !touched(g)).collect();
        prop_assert_eq!(actual, expected);

        for (item, _) in &outcome.unresolved {
            prop_assert!(!merged.contains(item));
        }
        for g in patch.removed() {
            let re_added = patch.added().iter().any(|(a, _)| a == g);
            prop_assert!(re_added || !merged.contains(g));
        }
    }

    #[test]
    fn prop_merge_is_deterministic(
        base in prop::collection::vec(0u128..16, 0..12),
        added in prop::collection::vec((16u128..32, proptest::option::of(0u128..32)), 0..6),
    ) {
        let base: Vec<Guid> = base.into_iter().map(Guid::from_u128).collect();
        let mut patch = CollectionPatch::new();
        for (item, successor) in &added {
            patch.insert(Guid::from_u128(*item), successor.map(Guid::from_u128));
        }
        let mut first = base.clone();
        let mut second = base;
        merge_ordered(&mut first, &patch);
        merge_ordered(&mut second, &patch);
        prop_assert_eq!(first, second);
    }
}
