//! Work Node - One element instance for one render generation.
//!
//! Nodes live in a [`FiberTree`](super::FiberTree) arena and refer to each
//! other by [`NodeId`]. Ownership flows strictly parent → child through
//! `child`/`sibling`; `parent` and `alternate` are lookup-only links.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::update_queue::UpdateQueue;
use crate::types::{Child, ElementType, Flags, Key, Props, WorkTag};

slotmap::new_key_type! {
    /// Generational id of a work node. Stale ids simply fail to resolve.
    pub struct NodeId;
}

/// Queue of root renders, shared by the root node and its counterpart.
pub type RootQueue = Rc<RefCell<UpdateQueue<Child>>>;

// =============================================================================
// Hook
// =============================================================================

/// One state slot of a stateful component.
///
/// The value is type-erased; [`crate::reconciler::Hooks`] downcasts it back
/// to the type the slot was created with. The queue is shared between the
/// slot's copies in both generations and with every setter handed out.
#[derive(Clone)]
pub struct Hook {
    pub(crate) memoized_state: Rc<dyn Any>,
    pub(crate) queue: Rc<dyn Any>,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook")
    }
}

/// Per-kind memoized state.
#[derive(Debug, Clone, Default)]
pub enum MemoizedState {
    #[default]
    None,
    /// Root: the last element rendered into it.
    Root(Child),
    /// Stateful component: its slot list in allocation order.
    Hooks(Vec<Hook>),
}

impl MemoizedState {
    pub fn hooks(&self) -> &[Hook] {
        match self {
            MemoizedState::Hooks(hooks) => hooks,
            _ => &[],
        }
    }
}

// =============================================================================
// Work Node
// =============================================================================

/// A node of the shadow tree. `I` is the host's instance handle type.
#[derive(Debug, Clone)]
pub struct WorkNode<I> {
    pub tag: WorkTag,
    pub key: Option<Key>,
    /// `None` for the root and for text nodes.
    pub element_type: Option<ElementType>,
    pub pending_props: Props,
    pub memoized_props: Option<Props>,
    pub memoized_state: MemoizedState,
    /// Host instance of host-bearing kinds.
    pub state_node: Option<I>,

    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub sibling: Option<NodeId>,
    pub index: usize,

    /// Same identity in the other generation.
    pub alternate: Option<NodeId>,

    pub flags: Flags,
    pub subtree_flags: Flags,
    pub deletions: Vec<NodeId>,

    /// Present on the root only.
    pub update_queue: Option<RootQueue>,
}

impl<I> WorkNode<I> {
    pub fn new(tag: WorkTag, pending_props: Props, key: Option<Key>) -> Self {
        Self {
            tag,
            key,
            element_type: None,
            pending_props,
            memoized_props: None,
            memoized_state: MemoizedState::None,
            state_node: None,
            parent: None,
            child: None,
            sibling: None,
            index: 0,
            alternate: None,
            flags: Flags::NONE,
            subtree_flags: Flags::NONE,
            deletions: Vec::new(),
            update_queue: None,
        }
    }

    /// Whether this node can be reused for `other`'s element type.
    ///
    /// Text nodes match only text nodes.
    pub fn same_type(&self, tag: WorkTag, element_type: Option<&ElementType>) -> bool {
        if self.tag == WorkTag::HostTextElement || tag == WorkTag::HostTextElement {
            return self.tag == tag;
        }
        self.element_type.as_ref() == element_type
    }

    /// Text content of a text node.
    pub fn text_content(&self) -> Option<&str> {
        self.pending_props.content()
    }
}
