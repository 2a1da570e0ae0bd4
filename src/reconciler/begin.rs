//! Begin Phase - Top-down: compute each node's new children.

use tracing::trace;

use super::child::ChildReconciler;
use super::hooks::render_with_hooks;
use super::work_loop::RenderContext;
use crate::engine::{MemoizedState, NodeId};
use crate::error::Result;
use crate::renderer::HostConfig;
use crate::types::{Child, WorkTag};

/// Produce the children of `wip` and return the first one, if any.
pub fn begin_work<H: HostConfig>(ctx: &mut RenderContext<'_, H>, wip: NodeId) -> Result<Option<NodeId>> {
    let tag = ctx.tree.node(wip)?.tag;
    trace!(node = ?wip, ?tag, "begin");

    match tag {
        WorkTag::Root => update_host_root(ctx, wip),
        WorkTag::StatefulComponent => {
            let children = render_with_hooks(ctx.tree, wip, ctx.scheduler, ctx.config)?;
            reconcile_children(ctx, wip, &children)
        }
        WorkTag::HostContainerElement => {
            let children = ctx.tree.node(wip)?.pending_props.children.as_deref().cloned().unwrap_or_default();
            reconcile_children(ctx, wip, &children)
        }
        WorkTag::HostTextElement => Ok(None),
    }
}

/// Drain the root queue against the last rendered element and reconcile the
/// result.
fn update_host_root<H: HostConfig>(ctx: &mut RenderContext<'_, H>, wip: NodeId) -> Result<Option<NodeId>> {
    let node = ctx.tree.node(wip)?;
    let base = match &node.memoized_state {
        MemoizedState::Root(element) => element.clone(),
        _ => Child::Empty,
    };
    let element = match &node.update_queue {
        Some(queue) => queue.borrow_mut().drain(base),
        None => base,
    };

    ctx.tree.node_mut(wip)?.memoized_state = MemoizedState::Root(element.clone());
    reconcile_children(ctx, wip, &element)
}

/// Diff against the counterpart's children when there is one, otherwise
/// mount without tracking effects.
fn reconcile_children<H: HostConfig>(
    ctx: &mut RenderContext<'_, H>,
    wip: NodeId,
    children: &Child,
) -> Result<Option<NodeId>> {
    let current_first = match ctx.tree.node(wip)?.alternate {
        Some(alt) => Some(ctx.tree.node(alt)?.child),
        None => None,
    };

    let first = match current_first {
        Some(old_first) => ChildReconciler::reconcile(ctx.config)
            .reconcile_child_fibers(ctx.tree, wip, old_first, children)?,
        None => ChildReconciler::mount(ctx.config)
            .reconcile_child_fibers(ctx.tree, wip, None, children)?,
    };

    ctx.tree.node_mut(wip)?.child = first;
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{component, host};
    use crate::engine::FiberRoot;
    use crate::pipeline::ReconcilerConfig;
    use crate::reconciler::detached_scheduler;
    use crate::renderer::MemoryHost;
    use crate::types::{Component, Flags, Props};

    fn root() -> FiberRoot<MemoryHost> {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        FiberRoot::new(host, container, ReconcilerConfig::default(), detached_scheduler())
    }

    #[test]
    fn test_root_drains_queue_in_order() {
        let mut root = root();
        root.enqueue_render(host("a").into());
        root.enqueue_render(host("b").into());

        let current = root.current();
        let wip = root.tree.create_work_in_progress(current, Props::new()).unwrap();
        let mut ctx = root.context();
        let child = begin_work(&mut ctx, wip).unwrap().unwrap();

        let node = &ctx.tree[child];
        assert_eq!(node.element_type.as_ref().map(|t| t.name()), Some("b"));
        assert!(node.flags.contains(Flags::PLACEMENT));
        assert!(matches!(&ctx.tree[wip].memoized_state, MemoizedState::Root(Child::Element(_))));
    }

    #[test]
    fn test_component_output_becomes_children() {
        let greeting = Component::new("Greeting", |_, props| {
            let name = props.get("name").map(|v| v.to_string()).unwrap_or_default();
            Ok(host("p").child(format!("hi {name}")).into())
        });

        let mut root = root();
        let element = component(&greeting).attr("name", "ada").build();
        let node = root.tree.create_from_element(&element);
        let mut ctx = root.context();
        let child = begin_work(&mut ctx, node).unwrap().unwrap();

        assert_eq!(ctx.tree[child].element_type.as_ref().map(|t| t.name()), Some("p"));
        assert!(ctx.tree[child].flags.is_empty());
        assert!(matches!(ctx.tree[node].memoized_state, MemoizedState::Hooks(_)));
    }

    #[test]
    fn test_text_has_no_children() {
        let mut root = root();
        let text = root.tree.create_from_text("leaf");
        let mut ctx = root.context();
        assert_eq!(begin_work(&mut ctx, text).unwrap(), None);
    }
}
