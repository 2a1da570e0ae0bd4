//! Work Loop - Drives one synchronous render pass over a root.
//!
//! ```text
//! schedule_update_on_node ─► perform_sync_work_on_root
//!                               │
//!                               ├─ create_work_in_progress(root)
//!                               ├─ loop: begin_work ─► child?  descend
//!                               │                   └► none   complete, then sibling or parent
//!                               └─ commit_root ─► commit_mutation_effects, swap current, sweep
//! ```
//!
//! Passes are never interrupted and never nest: a state update issued while a
//! pass runs is left queued for the next one.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::{debug, trace, warn};

use super::begin::begin_work;
use super::commit::commit_mutation_effects;
use super::complete::complete_work;
use super::hooks::ScheduleUpdate;
use crate::engine::{FiberRoot, FiberTree, NodeId};
use crate::error::{ReconcileError, Result};
use crate::pipeline::ReconcilerConfig;
use crate::renderer::HostConfig;
use crate::types::{Props, WorkTag};

/// Everything the phases of a pass need, borrowed from one [`FiberRoot`].
pub struct RenderContext<'a, H: HostConfig> {
    pub tree: &'a mut FiberTree<H::Instance>,
    pub host: &'a mut H,
    pub container: &'a H::Instance,
    pub scheduler: &'a Weak<dyn ScheduleUpdate>,
    pub config: &'a ReconcilerConfig,
}

impl<H: HostConfig> FiberRoot<H> {
    pub(crate) fn context(&mut self) -> RenderContext<'_, H> {
        RenderContext {
            tree: &mut self.tree,
            host: &mut self.host,
            container: &self.container,
            scheduler: &self.scheduler,
            config: &self.config,
        }
    }
}

// =============================================================================
// Scheduling
// =============================================================================

/// Run a pass for the root owning `node`.
///
/// Fails with [`ReconcileError::DetachedNode`] when `node` no longer leads
/// to a root (its subtree was removed and reclaimed).
pub fn schedule_update_on_node<H: HostConfig>(root: &mut FiberRoot<H>, node: NodeId) -> Result<()> {
    let mut cursor = node;
    loop {
        let current = root.tree.get(cursor).ok_or(ReconcileError::DetachedNode)?;
        if current.tag == WorkTag::Root {
            break;
        }
        cursor = current.parent.ok_or(ReconcileError::DetachedNode)?;
    }
    perform_sync_work_on_root(root)
}

impl<H: HostConfig> ScheduleUpdate for RefCell<FiberRoot<H>> {
    fn schedule_update_on_node(&self, node: NodeId) -> Result<()> {
        let mut root = self
            .try_borrow_mut()
            .map_err(|_| ReconcileError::RenderInProgress)?;
        schedule_update_on_node(&mut root, node)
    }
}

// =============================================================================
// Render Pass
// =============================================================================

/// Build a new generation from the current one and commit it.
///
/// On error nothing is committed and the previous tree stays visible.
pub fn perform_sync_work_on_root<H: HostConfig>(root: &mut FiberRoot<H>) -> Result<()> {
    let current = root.current;
    let wip_root = root.tree.create_work_in_progress(current, Props::new())?;

    debug!(nodes = root.tree.len(), "render pass start");

    let outcome = {
        let mut ctx = root.context();
        work_loop_sync(&mut ctx, wip_root)
    };

    if let Err(err) = outcome {
        if root.config.dev_warnings {
            warn!(%err, "render pass aborted; keeping the previous tree");
        }
        root.finished_work = None;
        root.tree.sweep(current);
        return Err(err);
    }

    root.finished_work = Some(wip_root);
    commit_root(root)
}

/// Position of the single traversal cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Run begin on this node next.
    Descending(NodeId),
    /// This node's children are done; run complete on it next.
    Completing(NodeId),
    Idle,
}

fn work_loop_sync<H: HostConfig>(ctx: &mut RenderContext<'_, H>, wip_root: NodeId) -> Result<()> {
    let mut cursor = Cursor::Descending(wip_root);
    loop {
        cursor = match cursor {
            Cursor::Descending(unit) => {
                let child = begin_work(ctx, unit)?;
                let node = ctx.tree.node_mut(unit)?;
                node.memoized_props = Some(node.pending_props.clone());
                match child {
                    Some(child) => Cursor::Descending(child),
                    None => Cursor::Completing(unit),
                }
            }
            Cursor::Completing(unit) => {
                complete_work(ctx, unit)?;
                if unit == wip_root {
                    Cursor::Idle
                } else {
                    let node = ctx.tree.node(unit)?;
                    match (node.sibling, node.parent) {
                        (Some(sibling), _) => Cursor::Descending(sibling),
                        (None, Some(parent)) => Cursor::Completing(parent),
                        (None, None) => Cursor::Idle,
                    }
                }
            }
            Cursor::Idle => return Ok(()),
        };
    }
}

// =============================================================================
// Commit
// =============================================================================

/// Apply the finished generation to the host and make it current.
///
/// A no-op when no finished generation is waiting, so calling it twice
/// performs the host mutations once.
pub fn commit_root<H: HostConfig>(root: &mut FiberRoot<H>) -> Result<()> {
    let Some(finished) = root.finished_work.take() else {
        return Ok(());
    };

    {
        let mut ctx = root.context();
        commit_mutation_effects(&mut ctx, finished)?;
    }

    root.current = finished;
    let freed = root.tree.sweep(finished);
    trace!(freed, live = root.tree.len(), "commit done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::host;
    use crate::reconciler::detached_scheduler;
    use crate::renderer::{HostOp, MemoryHost};
    use crate::types::Child;

    fn root() -> FiberRoot<MemoryHost> {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        FiberRoot::new(host, container, ReconcilerConfig::default(), detached_scheduler())
    }

    #[test]
    fn test_pass_swaps_current() {
        let mut root = root();
        let before = root.current();
        root.enqueue_render(host("div").child("hi").into());
        perform_sync_work_on_root(&mut root).unwrap();

        assert_ne!(root.current(), before);
        assert!(root.finished_work().is_none());
        assert_eq!(root.host().inner_markup(*root.container()), "<div>hi</div>");
    }

    #[test]
    fn test_second_commit_is_noop() {
        let mut root = root();
        root.enqueue_render(host("p").into());
        perform_sync_work_on_root(&mut root).unwrap();
        let ops = root.host().ops().len();

        commit_root(&mut root).unwrap();
        assert_eq!(root.host().ops().len(), ops);
    }

    #[test]
    fn test_schedule_from_detached_node_fails() {
        let mut root = root();
        root.enqueue_render(Child::from("x"));
        perform_sync_work_on_root(&mut root).unwrap();

        let err = schedule_update_on_node(&mut root, NodeId::default()).unwrap_err();
        assert_eq!(err, ReconcileError::DetachedNode);
    }

    #[test]
    fn test_arena_stays_bounded() {
        let mut root = root();
        for i in 0..10 {
            root.enqueue_render(host("ul").child(host("li").child(i)).into());
            perform_sync_work_on_root(&mut root).unwrap();
        }
        // Two generations of root, ul, li and text at most.
        assert!(root.tree().len() <= 8);
        assert!(root
            .host()
            .ops()
            .iter()
            .any(|op| matches!(op, HostOp::UpdateText { content, .. } if content == "9")));
    }
}
