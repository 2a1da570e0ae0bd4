//! Complete Phase - Bottom-up: build host instances and bubble flags.
//!
//! A host element seen for the first time gets its instance created here and
//! every host instance directly below it (looking through components)
//! appended, so a freshly mounted subtree reaches commit fully assembled.
//! A reused text node whose content changed is marked Update instead.

use super::work_loop::RenderContext;
use crate::engine::{FiberTree, NodeId};
use crate::error::Result;
use crate::renderer::HostConfig;
use crate::types::{Flags, WorkTag};

pub fn complete_work<H: HostConfig>(ctx: &mut RenderContext<'_, H>, wip: NodeId) -> Result<()> {
    let node = ctx.tree.node(wip)?;
    let tag = node.tag;

    match tag {
        WorkTag::HostContainerElement => {
            if node.alternate.is_none() || node.state_node.is_none() {
                let element_type = node
                    .element_type
                    .as_ref()
                    .map(|t| t.name().to_string())
                    .unwrap_or_default();
                let instance = ctx.host.create_instance(&element_type, &node.pending_props);
                append_all_children(ctx, &instance, wip)?;
                ctx.tree.node_mut(wip)?.state_node = Some(instance);
            }
        }
        WorkTag::HostTextElement => {
            let content = node.text_content().unwrap_or_default().to_string();
            match (node.alternate, node.state_node.is_some()) {
                (Some(alt), true) => {
                    let old = ctx
                        .tree
                        .node(alt)?
                        .memoized_props
                        .as_ref()
                        .and_then(|p| p.content())
                        .unwrap_or_default();
                    if old != content {
                        ctx.tree.node_mut(wip)?.flags |= Flags::UPDATE;
                    }
                }
                _ => {
                    let instance = ctx.host.create_text_instance(&content);
                    ctx.tree.node_mut(wip)?.state_node = Some(instance);
                }
            }
        }
        WorkTag::Root | WorkTag::StatefulComponent => {}
    }

    bubble_properties(ctx.tree, wip)
}

/// Append the nearest host instances under `wip` to `parent`, looking
/// through component nodes.
fn append_all_children<H: HostConfig>(
    ctx: &mut RenderContext<'_, H>,
    parent: &H::Instance,
    wip: NodeId,
) -> Result<()> {
    let mut next = ctx.tree.node(wip)?.child;

    while let Some(id) = next {
        let node = ctx.tree.node(id)?;
        if node.tag.is_host() {
            if let Some(instance) = &node.state_node {
                ctx.host.append_initial_child(parent, instance);
            }
        } else if let Some(child) = node.child {
            next = Some(child);
            continue;
        }

        // Climb until a sibling is found, never above `wip`.
        let mut cursor = id;
        next = loop {
            let node = ctx.tree.node(cursor)?;
            if let Some(sibling) = node.sibling {
                break Some(sibling);
            }
            match node.parent {
                Some(up) if up != wip => cursor = up,
                _ => break None,
            }
        };
    }
    Ok(())
}

/// Fold every child's own and subtree flags into `wip.subtree_flags`.
fn bubble_properties<I: Clone>(tree: &mut FiberTree<I>, wip: NodeId) -> Result<()> {
    let mut subtree = Flags::NONE;
    let mut child = tree.node(wip)?.child;
    while let Some(id) = child {
        let node = tree.node(id)?;
        subtree |= node.flags | node.subtree_flags;
        child = node.sibling;
    }
    tree.node_mut(wip)?.subtree_flags |= subtree;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::host;
    use crate::engine::FiberRoot;
    use crate::pipeline::ReconcilerConfig;
    use crate::reconciler::detached_scheduler;
    use crate::renderer::{HostOp, MemoryHost};
    use crate::types::Props;

    fn root() -> FiberRoot<MemoryHost> {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        FiberRoot::new(host, container, ReconcilerConfig::default(), detached_scheduler())
    }

    #[test]
    fn test_new_element_gets_instance_with_children() {
        let mut root = root();
        let li = root.tree.create_from_element(&host("li").build());
        let text = root.tree.create_from_text("a");
        root.tree[li].child = Some(text);
        root.tree[text].parent = Some(li);
        root.tree[text].flags = Flags::UPDATE;

        let mut ctx = root.context();
        complete_work(&mut ctx, text).unwrap();
        complete_work(&mut ctx, li).unwrap();

        let instance = ctx.tree[li].state_node.unwrap();
        assert_eq!(ctx.host.inner_markup(instance), "a");
        assert!(ctx.tree[li].subtree_flags.contains(Flags::UPDATE));
        assert!(matches!(ctx.host.ops()[0], HostOp::CreateText { .. }));
    }

    #[test]
    fn test_changed_text_is_marked_update() {
        let mut root = root();
        let old = root.tree.create_from_text("old");
        root.tree[old].memoized_props = Some(Props::text("old"));
        root.tree[old].state_node = Some(root.host.create_text_instance("old"));

        let wip = root.tree.create_work_in_progress(old, Props::text("new")).unwrap();
        let mut ctx = root.context();
        complete_work(&mut ctx, wip).unwrap();
        assert!(ctx.tree[wip].flags.contains(Flags::UPDATE));

        let same = ctx.tree.create_work_in_progress(old, Props::text("old")).unwrap();
        complete_work(&mut ctx, same).unwrap();
        assert!(!ctx.tree[same].flags.contains(Flags::UPDATE));
    }
}
