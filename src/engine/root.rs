//! Fiber Root - One mounted tree.
//!
//! Owns the host adapter, the host container, both tree generations and the
//! pointer to whichever generation is currently visible.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::node::{MemoizedState, NodeId, WorkNode};
use super::tree::FiberTree;
use super::update_queue::{Action, UpdateQueue};
use crate::pipeline::ReconcilerConfig;
use crate::reconciler::ScheduleUpdate;
use crate::renderer::HostConfig;
use crate::types::{Child, Props, WorkTag};

/// Root handle of one mounted tree.
pub struct FiberRoot<H: HostConfig> {
    pub(crate) host: H,
    pub(crate) container: H::Instance,
    pub(crate) tree: FiberTree<H::Instance>,
    /// Root node of the visible generation.
    pub(crate) current: NodeId,
    /// Root node of a built generation waiting to be committed.
    pub(crate) finished_work: Option<NodeId>,
    pub(crate) config: ReconcilerConfig,
    pub(crate) scheduler: Weak<dyn ScheduleUpdate>,
}

impl<H: HostConfig> FiberRoot<H> {
    pub fn new(
        host: H,
        container: H::Instance,
        config: ReconcilerConfig,
        scheduler: Weak<dyn ScheduleUpdate>,
    ) -> Self {
        let mut tree = FiberTree::new();
        let mut root = WorkNode::new(WorkTag::Root, Props::new(), None);
        root.update_queue = Some(Rc::new(RefCell::new(UpdateQueue::new())));
        root.memoized_state = MemoizedState::Root(Child::Empty);
        let current = tree.insert(root);

        Self {
            host,
            container,
            tree,
            current,
            finished_work: None,
            config,
            scheduler,
        }
    }

    /// Queue `element` as the next thing this root renders.
    pub fn enqueue_render(&self, element: Child) {
        if let Some(queue) = self.tree.get(self.current).and_then(|n| n.update_queue.as_ref()) {
            queue.borrow_mut().enqueue(Action::Replace(element));
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn container(&self) -> &H::Instance {
        &self.container
    }

    pub fn tree(&self) -> &FiberTree<H::Instance> {
        &self.tree
    }

    /// Root node of the visible generation.
    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn finished_work(&self) -> Option<NodeId> {
        self.finished_work
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Element last committed into this root.
    pub fn rendered(&self) -> Option<&Child> {
        match &self.tree.get(self.current)?.memoized_state {
            MemoizedState::Root(child) => Some(child),
            _ => None,
        }
    }
}
