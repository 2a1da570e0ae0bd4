//! Commit Phase - Apply recorded effects to the host.
//!
//! The walk only enters subtrees whose `subtree_flags` carry a mutation, so
//! an unchanged branch costs one visit to its root. Per node:
//!
//! 1. **ChildDeletion** on the way down: detach the top-level host instances
//!    of every deleted child subtree from the nearest host parent.
//! 2. **Placement** on the way up: insert the node's host instances before
//!    the next stable host sibling, or append them when there is none.
//! 3. **Update** on the way up: push new text content into the instance.
//!
//! Flags are cleared as they are applied, so a committed generation carries
//! no leftover effects into the next pass.

use tracing::{trace, warn};

use super::work_loop::RenderContext;
use crate::engine::{FiberTree, NodeId};
use crate::error::Result;
use crate::renderer::HostConfig;
use crate::types::{Flags, WorkTag};

/// Walk the finished generation and perform its host mutations.
pub fn commit_mutation_effects<H: HostConfig>(
    ctx: &mut RenderContext<'_, H>,
    finished: NodeId,
) -> Result<()> {
    let mut node = finished;

    'enter: loop {
        commit_deletions(ctx, node)?;

        let current = ctx.tree.node(node)?;
        if current.subtree_flags.intersects(Flags::MUTATION_MASK) {
            if let Some(child) = current.child {
                node = child;
                continue 'enter;
            }
        }

        loop {
            commit_reconciliation_effects(ctx, node)?;
            if node == finished {
                return Ok(());
            }

            let current = ctx.tree.node(node)?;
            if let Some(sibling) = current.sibling {
                node = sibling;
                continue 'enter;
            }
            match current.parent {
                Some(parent) => node = parent,
                None => return Ok(()),
            }
        }
    }
}

// =============================================================================
// Deletion
// =============================================================================

fn commit_deletions<H: HostConfig>(ctx: &mut RenderContext<'_, H>, parent_fiber: NodeId) -> Result<()> {
    let deletions = {
        let node = ctx.tree.node_mut(parent_fiber)?;
        node.flags.remove(Flags::CHILD_DELETION);
        std::mem::take(&mut node.deletions)
    };
    if deletions.is_empty() {
        return Ok(());
    }

    let Some(host_parent) = host_parent_of(ctx, Some(parent_fiber))? else {
        if ctx.config.dev_warnings {
            warn!(node = ?parent_fiber, "no host parent for deleted children; skipping removal");
        }
        return Ok(());
    };

    for deleted in deletions {
        for instance in top_level_host_instances(ctx.tree, deleted)? {
            trace!(?instance, "remove");
            ctx.host.remove_child(&host_parent, &instance);
        }
    }
    Ok(())
}

/// Host instances of `root`'s subtree that have no host ancestor inside it.
fn top_level_host_instances<I: Clone>(tree: &FiberTree<I>, root: NodeId) -> Result<Vec<I>> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let node = tree.node(id)?;
        if node.tag.is_host() {
            out.extend(node.state_node.clone());
            continue;
        }
        let mut children = tree.children(id);
        children.reverse();
        stack.extend(children);
    }
    Ok(out)
}

// =============================================================================
// Placement / Update
// =============================================================================

fn commit_reconciliation_effects<H: HostConfig>(ctx: &mut RenderContext<'_, H>, node: NodeId) -> Result<()> {
    let flags = ctx.tree.node(node)?.flags;

    if flags.contains(Flags::PLACEMENT) {
        commit_placement(ctx, node)?;
    }
    if flags.contains(Flags::UPDATE) {
        commit_update(ctx, node)?;
    }

    let current = ctx.tree.node_mut(node)?;
    current.flags.remove(Flags::MUTATION_MASK);
    current.subtree_flags.remove(Flags::MUTATION_MASK);
    Ok(())
}

fn commit_placement<H: HostConfig>(ctx: &mut RenderContext<'_, H>, node: NodeId) -> Result<()> {
    let parent_fiber = ctx.tree.node(node)?.parent;
    let Some(host_parent) = host_parent_of(ctx, parent_fiber)? else {
        if ctx.config.dev_warnings {
            warn!(?node, "no host parent for placed node; skipping insertion");
        }
        return Ok(());
    };

    let before = get_host_sibling(ctx.tree, node)?;
    insert_or_append_placement_node(ctx, node, before.as_ref(), &host_parent)
}

fn commit_update<H: HostConfig>(ctx: &mut RenderContext<'_, H>, node: NodeId) -> Result<()> {
    let current = ctx.tree.node(node)?;
    if current.tag != WorkTag::HostTextElement {
        return Ok(());
    }
    if let Some(instance) = &current.state_node {
        let content = current.text_content().unwrap_or_default();
        ctx.host.commit_text_update(instance, content);
    }
    Ok(())
}

/// Nearest host instance at or above `start`; the root resolves to the
/// container.
fn host_parent_of<H: HostConfig>(
    ctx: &RenderContext<'_, H>,
    start: Option<NodeId>,
) -> Result<Option<H::Instance>> {
    let mut cursor = start;
    while let Some(id) = cursor {
        let node = ctx.tree.node(id)?;
        match node.tag {
            WorkTag::Root => return Ok(Some(ctx.container.clone())),
            WorkTag::HostContainerElement => return Ok(node.state_node.clone()),
            WorkTag::HostTextElement | WorkTag::StatefulComponent => cursor = node.parent,
        }
    }
    Ok(None)
}

fn is_host_parent(tag: WorkTag) -> bool {
    matches!(tag, WorkTag::Root | WorkTag::HostContainerElement)
}

/// Instance of the first host node after `fiber` in document order that is
/// not itself being placed in this commit.
///
/// Searches forward through siblings, descending into components, and climbs
/// through component parents; it stops at the first host parent.
fn get_host_sibling<I: Clone>(tree: &FiberTree<I>, fiber: NodeId) -> Result<Option<I>> {
    let mut node = fiber;

    'siblings: loop {
        loop {
            let current = tree.node(node)?;
            if current.sibling.is_some() {
                break;
            }
            let Some(parent) = current.parent else {
                return Ok(None);
            };
            if is_host_parent(tree.node(parent)?.tag) {
                return Ok(None);
            }
            node = parent;
        }

        node = match tree.node(node)?.sibling {
            Some(sibling) => sibling,
            None => return Ok(None),
        };

        loop {
            let current = tree.node(node)?;
            if current.tag.is_host() {
                break;
            }
            if current.flags.contains(Flags::PLACEMENT) {
                continue 'siblings;
            }
            match current.child {
                Some(child) => node = child,
                None => continue 'siblings,
            }
        }

        let current = tree.node(node)?;
        if !current.flags.contains(Flags::PLACEMENT) {
            return Ok(current.state_node.clone());
        }
    }
}

/// Insert (or append) the host instances of `node` into `parent`.
fn insert_or_append_placement_node<H: HostConfig>(
    ctx: &mut RenderContext<'_, H>,
    node: NodeId,
    before: Option<&H::Instance>,
    parent: &H::Instance,
) -> Result<()> {
    let current = ctx.tree.node(node)?;
    if current.tag.is_host() {
        if let Some(instance) = &current.state_node {
            match before {
                Some(before) => ctx.host.insert_child_to_container(instance, parent, before),
                None => ctx.host.append_child_to_container(parent, instance),
            }
        }
        return Ok(());
    }

    for child in ctx.tree.children(node) {
        insert_or_append_placement_node(ctx, child, before, parent)?;
    }
    Ok(())
}
