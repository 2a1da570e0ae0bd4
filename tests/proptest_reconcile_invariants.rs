//! Property-based invariant tests for keyed reconciliation and update queues.
//!
//! Verifies:
//! 1. Any keyed list → any other keyed list renders exactly the new order
//! 2. Keys present in both lists keep their host instance
//! 3. Keys dropped from the list are removed exactly once
//! 4. Re-rendering the same list performs no host mutation
//! 5. Draining a queue equals folding its actions in enqueue order
//! 6. A drained queue is empty and replays nothing

use std::collections::HashMap;

use proptest::prelude::*;
use spark_reconciler::renderer::memory::HostId;
use spark_reconciler::{
    create_root_with_config, host, Action, HostOp, MemoryHost, ReconcilerConfig, Root,
    UpdateQueue,
};

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_keys() -> impl Strategy<Value = Vec<u32>> {
    prop::sample::subsequence((0u32..10).collect::<Vec<_>>(), 0..=10).prop_shuffle()
}

#[derive(Debug, Clone)]
enum Op {
    Set(i64),
    Add(i64),
    Mul(i64),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-100i64..100).prop_map(Op::Set),
        (-100i64..100).prop_map(Op::Add),
        (-3i64..4).prop_map(Op::Mul),
    ]
}

fn to_action(op: &Op) -> Action<i64> {
    match *op {
        Op::Set(v) => Action::Replace(v),
        Op::Add(v) => Action::updater(move |s: &i64| s.wrapping_add(v)),
        Op::Mul(v) => Action::updater(move |s: &i64| s.wrapping_mul(v)),
    }
}

fn fold(base: i64, ops: &[Op]) -> i64 {
    ops.iter().fold(base, |s, op| match *op {
        Op::Set(v) => v,
        Op::Add(v) => s.wrapping_add(v),
        Op::Mul(v) => s.wrapping_mul(v),
    })
}

// ── Render helpers ────────────────────────────────────────────────────

fn mount() -> (Root<MemoryHost>, HostId) {
    let mut memory = MemoryHost::new();
    let container = memory.create_container("root");
    let root = create_root_with_config(memory, container, ReconcilerConfig::default());
    (root, container)
}

fn render_keys(root: &Root<MemoryHost>, keys: &[u32]) {
    let items = keys.iter().map(|k| host("li").key(*k).child(*k as i64));
    root.render(host("ul").children(items)).unwrap();
}

fn expected_markup(keys: &[u32]) -> String {
    let items: String = keys.iter().map(|k| format!("<li>{k}</li>")).collect();
    format!("<ul>{items}</ul>")
}

fn instances_by_key(root: &Root<MemoryHost>, container: HostId, keys: &[u32]) -> HashMap<u32, HostId> {
    root.with_host(|h| {
        let ul = h.children_of(container)[0];
        keys.iter().copied().zip(h.children_of(ul).iter().copied()).collect()
    })
}

// ── Properties ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn keyed_lists_render_new_order(old in arb_keys(), new in arb_keys()) {
        let (root, container) = mount();
        render_keys(&root, &old);
        prop_assert_eq!(root.with_host(|h| h.inner_markup(container)), expected_markup(&old));
        let before = instances_by_key(&root, container, &old);
        root.with_host(|h| h.take_ops());

        render_keys(&root, &new);
        prop_assert_eq!(root.with_host(|h| h.inner_markup(container)), expected_markup(&new));
        let after = instances_by_key(&root, container, &new);

        for key in &new {
            if let Some(old_instance) = before.get(key) {
                prop_assert_eq!(Some(old_instance), after.get(key));
            }
        }

        let ops = root.with_host(|h| h.take_ops());
        let removed = ops.iter().filter(|op| matches!(op, HostOp::Remove { .. })).count();
        let dropped = old.iter().filter(|k| !new.contains(k)).count();
        prop_assert_eq!(removed, dropped);
    }

    #[test]
    fn rerender_is_stable(keys in arb_keys()) {
        let (root, _) = mount();
        render_keys(&root, &keys);
        root.with_host(|h| h.take_ops());

        render_keys(&root, &keys);
        prop_assert_eq!(root.with_host(|h| h.mutation_count()), 0);
    }

    #[test]
    fn drain_folds_in_order(base in -1000i64..1000, ops in prop::collection::vec(arb_op(), 0..16)) {
        let mut queue = UpdateQueue::new();
        for op in &ops {
            queue.enqueue(to_action(op));
        }
        prop_assert_eq!(queue.len(), ops.len());

        let state = queue.drain(base);
        prop_assert_eq!(state, fold(base, &ops));
        prop_assert!(queue.is_empty());
        prop_assert_eq!(queue.drain(state), state);
    }
}
