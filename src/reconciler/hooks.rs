//! Component State - Per-invocation state slots bound to a node.
//!
//! A stateful component receives a [`Hooks`] cursor each time it renders.
//! Every `use_state` call claims the next slot in allocation order:
//!
//! - **Mount** (node has no counterpart): a slot is allocated and seeded with
//!   the initial value.
//! - **Update** (counterpart exists): the slot at the same position in the
//!   counterpart's list is read and its pending updates drained.
//!
//! Slots are matched purely by position, so a component must request its
//! state in the same order on every render.
//!
//! # Example
//!
//! ```
//! use spark_reconciler::{element::host, Child, Component};
//!
//! let counter = Component::new("Counter", |hooks, _props| {
//!     let (count, _set_count) = hooks.use_state(0i64)?;
//!     Ok(host("span").child(count).into())
//! });
//! # let _ = counter;
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use crate::engine::{Action, FiberTree, Hook, MemoizedState, NodeId, UpdateQueue};
use crate::error::{ReconcileError, Result};
use crate::pipeline::ReconcilerConfig;
use crate::types::{Child, ElementType};

// =============================================================================
// Scheduling Seam
// =============================================================================

/// Something that can run a render pass for the root owning `node`.
pub trait ScheduleUpdate {
    fn schedule_update_on_node(&self, node: NodeId) -> Result<()>;
}

/// Stand-in scheduler for slots created without a root.
struct Unscheduled;

impl ScheduleUpdate for Unscheduled {
    fn schedule_update_on_node(&self, _node: NodeId) -> Result<()> {
        Err(ReconcileError::RootDropped)
    }
}

/// A scheduler handle that never upgrades.
pub fn detached_scheduler() -> Weak<dyn ScheduleUpdate> {
    Weak::<Unscheduled>::new()
}

// =============================================================================
// Setter
// =============================================================================

/// Setter returned by [`Hooks::use_state`].
///
/// Calling it enqueues an update on the slot and immediately re-renders the
/// owning root. It must be called outside of a render pass; a call made
/// during one returns [`ReconcileError::RenderInProgress`] and the update
/// waits for the next pass.
pub struct SetState<S> {
    node: NodeId,
    queue: Rc<RefCell<UpdateQueue<S>>>,
    scheduler: Weak<dyn ScheduleUpdate>,
}

impl<S> Clone for SetState<S> {
    fn clone(&self) -> Self {
        Self {
            node: self.node,
            queue: self.queue.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S> fmt::Debug for SetState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState").field("node", &self.node).finish()
    }
}

impl<S: 'static> SetState<S> {
    /// Replace the state.
    pub fn set(&self, value: S) -> Result<()> {
        self.dispatch(Action::Replace(value))
    }

    /// Derive the next state from the previous one.
    pub fn update(&self, f: impl Fn(&S) -> S + 'static) -> Result<()> {
        self.dispatch(Action::updater(f))
    }

    pub fn dispatch(&self, action: Action<S>) -> Result<()> {
        self.queue.borrow_mut().enqueue(action);
        let scheduler = self.scheduler.upgrade().ok_or(ReconcileError::RootDropped)?;
        scheduler.schedule_update_on_node(self.node)
    }

    /// Node the slot was allocated on.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

// =============================================================================
// Hooks Cursor
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookMode {
    Mount,
    Update,
}

/// State-slot cursor for one invocation of one component.
pub struct Hooks {
    node: NodeId,
    mode: HookMode,
    previous: Vec<Hook>,
    cursor: usize,
    built: Vec<Hook>,
    scheduler: Weak<dyn ScheduleUpdate>,
}

impl Hooks {
    /// `previous` is the counterpart's slot list, or `None` on mount.
    pub fn new(node: NodeId, previous: Option<Vec<Hook>>, scheduler: Weak<dyn ScheduleUpdate>) -> Self {
        let mode = if previous.is_some() {
            HookMode::Update
        } else {
            HookMode::Mount
        };
        Self {
            node,
            mode,
            previous: previous.unwrap_or_default(),
            cursor: 0,
            built: Vec::new(),
            scheduler,
        }
    }

    /// Node currently rendering.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Whether this invocation is the component's first.
    pub fn is_mount(&self) -> bool {
        self.mode == HookMode::Mount
    }

    /// Claim the next state slot, seeded with `initial` on mount.
    pub fn use_state<S: Clone + 'static>(&mut self, initial: S) -> Result<(S, SetState<S>)> {
        self.use_state_with(move || initial)
    }

    /// Claim the next state slot, seeded lazily on mount. `init` is not
    /// called on updates.
    pub fn use_state_with<S, F>(&mut self, init: F) -> Result<(S, SetState<S>)>
    where
        S: Clone + 'static,
        F: FnOnce() -> S,
    {
        let index = self.cursor;
        self.cursor += 1;

        let (value, queue) = match self.mode {
            HookMode::Mount => {
                let queue: Rc<RefCell<UpdateQueue<S>>> = Rc::new(RefCell::new(UpdateQueue::new()));
                (init(), queue)
            }
            HookMode::Update => {
                let prev = self.previous.get(index).ok_or(ReconcileError::HookOrderMismatch {
                    index,
                    expected: self.previous.len(),
                })?;
                let queue = prev
                    .queue
                    .clone()
                    .downcast::<RefCell<UpdateQueue<S>>>()
                    .map_err(|_| ReconcileError::HookTypeMismatch { index })?;
                let base = prev
                    .memoized_state
                    .downcast_ref::<S>()
                    .ok_or(ReconcileError::HookTypeMismatch { index })?
                    .clone();
                let next = queue.borrow_mut().drain(base);
                (next, queue)
            }
        };

        self.built.push(Hook {
            memoized_state: Rc::new(value.clone()),
            queue: queue.clone(),
        });

        let setter = SetState {
            node: self.node,
            queue,
            scheduler: self.scheduler.clone(),
        };
        Ok((value, setter))
    }

    /// Slot list built by this invocation.
    pub(crate) fn finish(self, config: &ReconcilerConfig) -> Vec<Hook> {
        if self.mode == HookMode::Update && self.built.len() != self.previous.len() && config.dev_warnings {
            warn!(
                node = ?self.node,
                previous = self.previous.len(),
                now = self.built.len(),
                "component requested a different number of state slots than on its last render"
            );
        }
        self.built
    }
}

// =============================================================================
// Render With Hooks
// =============================================================================

/// Invoke the component of `wip`, storing the slots it claimed on the node.
pub(crate) fn render_with_hooks<I: Clone>(
    tree: &mut FiberTree<I>,
    wip: NodeId,
    scheduler: &Weak<dyn ScheduleUpdate>,
    config: &ReconcilerConfig,
) -> Result<Child> {
    let node = tree.node(wip)?;
    let Some(ElementType::Component(component)) = node.element_type.clone() else {
        if config.dev_warnings {
            warn!(node = ?wip, "stateful node without a component type; rendering nothing");
        }
        return Ok(Child::Empty);
    };
    let props = node.pending_props.clone();
    let previous = node
        .alternate
        .and_then(|alt| tree.get(alt))
        .map(|current| current.memoized_state.hooks().to_vec());

    trace!(component = component.name(), mount = previous.is_none(), "render component");

    let mut hooks = Hooks::new(wip, previous, scheduler.clone());
    let children = component.call(&mut hooks, &props)?;
    let slots = hooks.finish(config);

    tree.node_mut(wip)?.memoized_state = MemoizedState::Hooks(slots);
    Ok(children)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WorkNode;
    use crate::types::{Props, WorkTag};
    use std::cell::Cell;

    fn node_id() -> NodeId {
        let mut tree: FiberTree<u32> = FiberTree::new();
        tree.insert(WorkNode::new(WorkTag::StatefulComponent, Props::new(), None))
    }

    #[test]
    fn test_mount_allocates_slots_in_order() {
        let mut hooks = Hooks::new(node_id(), None, detached_scheduler());
        assert!(hooks.is_mount());

        let (a, _) = hooks.use_state(1i32).unwrap();
        let (b, _) = hooks.use_state("two".to_string()).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, "two");

        let slots = hooks.finish(&ReconcilerConfig::default());
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_initializer_runs_once_on_mount_only() {
        let calls = Rc::new(Cell::new(0));
        let node = node_id();

        let mut mount = Hooks::new(node, None, detached_scheduler());
        let c = calls.clone();
        mount
            .use_state_with(move || {
                c.set(c.get() + 1);
                5i32
            })
            .unwrap();
        let slots = mount.finish(&ReconcilerConfig::default());
        assert_eq!(calls.get(), 1);

        let mut update = Hooks::new(node, Some(slots), detached_scheduler());
        let c = calls.clone();
        let (value, _) = update
            .use_state_with(move || {
                c.set(c.get() + 1);
                99i32
            })
            .unwrap();
        assert_eq!(value, 5);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_update_drains_queued_setter_calls() {
        let node = node_id();
        let mut mount = Hooks::new(node, None, detached_scheduler());
        let (_, set) = mount.use_state(0i32).unwrap();
        let slots = mount.finish(&ReconcilerConfig::default());

        // No root to schedule on, but the update is still queued.
        assert_eq!(set.update(|n| n + 1), Err(ReconcileError::RootDropped));
        assert_eq!(set.update(|n| n * 10), Err(ReconcileError::RootDropped));

        let mut update = Hooks::new(node, Some(slots), detached_scheduler());
        let (value, _) = update.use_state(0i32).unwrap();
        assert_eq!(value, 10);
        let slots = update.finish(&ReconcilerConfig::default());

        // Drained once; the next render sees no replay.
        let mut again = Hooks::new(node, Some(slots), detached_scheduler());
        let (value, _) = again.use_state(0i32).unwrap();
        assert_eq!(value, 10);
    }

    #[test]
    fn test_update_past_previous_slots_fails() {
        let node = node_id();
        let mut hooks = Hooks::new(node, Some(Vec::new()), detached_scheduler());
        let err = hooks.use_state(0i32).unwrap_err();
        assert_eq!(err, ReconcileError::HookOrderMismatch { index: 0, expected: 0 });
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let node = node_id();
        let mut mount = Hooks::new(node, None, detached_scheduler());
        mount.use_state(0i32).unwrap();
        let slots = mount.finish(&ReconcilerConfig::default());

        let mut update = Hooks::new(node, Some(slots), detached_scheduler());
        let err = update.use_state(String::new()).unwrap_err();
        assert_eq!(err, ReconcileError::HookTypeMismatch { index: 0 });
    }
}
