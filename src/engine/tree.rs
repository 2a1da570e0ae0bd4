//! Fiber Tree - Double-buffered arena of work nodes.
//!
//! Both generations of a root (current and work-in-progress) live in one
//! `SlotMap`. Nodes are created here, cloned across generations here, and
//! reclaimed here once nothing can reach them.
//!
//! # Double Buffering
//!
//! ```text
//!   current:  Root ──► App ──► div
//!              ▲        ▲       ▲
//!    alternate │        │       │
//!              ▼        ▼       ▼
//!   wip:      Root' ─► App' ─► div'
//! ```
//!
//! `create_work_in_progress` either allocates the counterpart of a current
//! node or resets and reuses the one left over from two renders ago.

use std::collections::HashSet;
use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use super::node::{NodeId, WorkNode};
use crate::error::{ReconcileError, Result};
use crate::types::{Element, ElementType, Flags, Props, WorkTag};

/// Arena holding every live work node of one root.
#[derive(Debug)]
pub struct FiberTree<I> {
    nodes: SlotMap<NodeId, WorkNode<I>>,
}

impl<I: Clone> FiberTree<I> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Insert a node, returning its id.
    pub fn insert(&mut self, node: WorkNode<I>) -> NodeId {
        self.nodes.insert(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&WorkNode<I>> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut WorkNode<I>> {
        self.nodes.get_mut(id)
    }

    /// Like `get`, but a missing node is an error.
    pub fn node(&self, id: NodeId) -> Result<&WorkNode<I>> {
        self.nodes.get(id).ok_or(ReconcileError::MissingNode)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut WorkNode<I>> {
        self.nodes.get_mut(id).ok_or(ReconcileError::MissingNode)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes across both generations.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Node Creation
    // =========================================================================

    /// Create a node for an element descriptor that had no reusable match.
    pub fn create_from_element(&mut self, element: &Element) -> NodeId {
        let tag = match element.element_type {
            ElementType::Host(_) => WorkTag::HostContainerElement,
            ElementType::Component(_) => WorkTag::StatefulComponent,
        };
        let mut node = WorkNode::new(tag, element.props.clone(), element.key.clone());
        node.element_type = Some(element.element_type.clone());
        self.insert(node)
    }

    /// Create a text node.
    pub fn create_from_text(&mut self, content: &str) -> NodeId {
        self.insert(WorkNode::new(
            WorkTag::HostTextElement,
            Props::text(content),
            None,
        ))
    }

    /// Get or build the work-in-progress counterpart of `current`.
    ///
    /// A fresh counterpart inherits type, key and host instance. A reused one
    /// has its flags and deletions reset. Either way the child list, memoized
    /// props/state and root queue are carried over from `current`.
    pub fn create_work_in_progress(&mut self, current: NodeId, pending_props: Props) -> Result<NodeId> {
        let cur = self.node(current)?.clone();

        let wip = match cur.alternate.filter(|id| self.nodes.contains_key(*id)) {
            None => {
                let mut node = WorkNode::new(cur.tag, pending_props, cur.key.clone());
                node.element_type = cur.element_type.clone();
                node.state_node = cur.state_node.clone();
                node.alternate = Some(current);
                let wip = self.insert(node);
                self.node_mut(current)?.alternate = Some(wip);
                wip
            }
            Some(wip) => {
                let node = self.node_mut(wip)?;
                node.pending_props = pending_props;
                node.flags = Flags::NONE;
                node.subtree_flags = Flags::NONE;
                node.deletions.clear();
                node.element_type = cur.element_type.clone();
                node.state_node = cur.state_node.clone();
                wip
            }
        };

        let node = self.node_mut(wip)?;
        node.child = cur.child;
        node.index = cur.index;
        node.memoized_props = cur.memoized_props;
        node.memoized_state = cur.memoized_state;
        node.update_queue = cur.update_queue;
        Ok(wip)
    }

    /// Clone `current` for reuse as a single child in the new list.
    pub fn use_fiber(&mut self, current: NodeId, pending_props: Props) -> Result<NodeId> {
        let clone = self.create_work_in_progress(current, pending_props)?;
        let node = self.node_mut(clone)?;
        node.index = 0;
        node.sibling = None;
        Ok(clone)
    }

    // =========================================================================
    // Traversal Helpers
    // =========================================================================

    /// Children of `parent`, in sibling order.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(parent).and_then(|n| n.child);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.get(id).and_then(|n| n.sibling);
        }
        out
    }

    /// Every node of the subtree rooted at `root`, depth-first pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut kids = self.children(id);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    // =========================================================================
    // Reclamation
    // =========================================================================

    /// Drop every node that is neither in the tree rooted at `current_root`
    /// nor the counterpart of such a node. Returns how many were freed.
    pub fn sweep(&mut self, current_root: NodeId) -> usize {
        let mut keep: HashSet<NodeId> = HashSet::new();
        for id in self.descendants(current_root) {
            keep.insert(id);
            if let Some(alt) = self.get(id).and_then(|n| n.alternate) {
                keep.insert(alt);
            }
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, _| keep.contains(&id));
        for node in self.nodes.values_mut() {
            node.deletions.clear();
            if node.alternate.is_some_and(|alt| !keep.contains(&alt)) {
                node.alternate = None;
            }
        }
        before - self.nodes.len()
    }
}

impl<I: Clone> Default for FiberTree<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Index<NodeId> for FiberTree<I> {
    type Output = WorkNode<I>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id]
    }
}

impl<I> IndexMut<NodeId> for FiberTree<I> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::host;

    fn tree() -> FiberTree<u32> {
        FiberTree::new()
    }

    #[test]
    fn test_create_from_element_sets_kind() {
        let mut tree = tree();
        let div = tree.create_from_element(&host("div").key("a").build());
        assert_eq!(tree[div].tag, WorkTag::HostContainerElement);
        assert_eq!(tree[div].key.as_ref().map(|k| k.as_str()), Some("a"));

        let text = tree.create_from_text("hi");
        assert_eq!(tree[text].tag, WorkTag::HostTextElement);
        assert_eq!(tree[text].text_content(), Some("hi"));
    }

    #[test]
    fn test_work_in_progress_links_counterparts() {
        let mut tree = tree();
        let current = tree.create_from_element(&host("div").build());
        tree[current].state_node = Some(7);

        let wip = tree.create_work_in_progress(current, Props::new()).unwrap();
        assert_ne!(wip, current);
        assert_eq!(tree[wip].alternate, Some(current));
        assert_eq!(tree[current].alternate, Some(wip));
        assert_eq!(tree[wip].state_node, Some(7));
    }

    #[test]
    fn test_work_in_progress_reuses_and_resets() {
        let mut tree = tree();
        let current = tree.create_from_element(&host("div").build());
        let wip = tree.create_work_in_progress(current, Props::new()).unwrap();
        tree[wip].flags = Flags::PLACEMENT;
        tree[wip].subtree_flags = Flags::UPDATE;
        tree[wip].deletions.push(current);

        let again = tree.create_work_in_progress(current, Props::new().with("id", "x")).unwrap();
        assert_eq!(again, wip);
        assert!(tree[again].flags.is_empty());
        assert!(tree[again].subtree_flags.is_empty());
        assert!(tree[again].deletions.is_empty());
        assert_eq!(tree[again].pending_props.get("id").and_then(|v| v.as_str()), Some("x"));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_use_fiber_detaches_sibling() {
        let mut tree = tree();
        let a = tree.create_from_element(&host("a").build());
        let b = tree.create_from_element(&host("b").build());
        tree[a].sibling = Some(b);
        tree[a].index = 3;

        let clone = tree.use_fiber(a, Props::new()).unwrap();
        assert_eq!(tree[clone].sibling, None);
        assert_eq!(tree[clone].index, 0);
        assert_eq!(tree[a].index, 3);
    }

    #[test]
    fn test_sweep_keeps_current_and_counterparts() {
        let mut tree = tree();
        let root = tree.insert(WorkNode::new(WorkTag::Root, Props::new(), None));
        let child = tree.create_from_element(&host("div").build());
        tree[root].child = Some(child);
        tree[child].parent = Some(root);
        let orphan = tree.create_from_text("gone");

        let wip_root = tree.create_work_in_progress(root, Props::new()).unwrap();

        let freed = tree.sweep(root);
        assert_eq!(freed, 1);
        assert!(tree.contains(root));
        assert!(tree.contains(child));
        assert!(tree.contains(wip_root));
        assert!(!tree.contains(orphan));
    }

    #[test]
    fn test_children_in_order() {
        let mut tree = tree();
        let parent = tree.create_from_element(&host("ul").build());
        let a = tree.create_from_text("a");
        let b = tree.create_from_text("b");
        tree[parent].child = Some(a);
        tree[a].sibling = Some(b);
        assert_eq!(tree.children(parent), vec![a, b]);
        assert_eq!(tree.descendants(parent), vec![parent, a, b]);
    }
}
