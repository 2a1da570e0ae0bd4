//! Child Reconciler - Keyed diff of old work nodes against new children.
//!
//! Given the first old child of a node and the new children value, produce
//! the new child list, reusing old nodes where identity allows and recording
//! the host mutations the difference implies.
//!
//! # Entry Points
//!
//! | new children          | algorithm                      |
//! |-----------------------|--------------------------------|
//! | one element           | [single element](ChildReconciler::reconcile_single_element) |
//! | one text value        | [single text](ChildReconciler::reconcile_single_text) |
//! | a list                | [array](ChildReconciler::reconcile_children_array) |
//! | nothing               | delete every old child         |
//!
//! # Effect Tracking
//!
//! With `track_effects` off (first mount of a subtree) no Placement or
//! ChildDeletion is recorded: the caller inserts the whole new subtree as
//! one unit.
//!
//! # Moves
//!
//! The array pass keeps `last_placed_index`, the largest old index among
//! reused nodes so far. A reused node whose old index is smaller has moved
//! left of something that stayed, so it gets Placement:
//!
//! ```text
//! old: a(0) b(1) c(2)
//! new: a    c    b
//!      ok   ok   moved (1 < 2)
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{trace, warn};

use crate::engine::{FiberTree, NodeId};
use crate::error::Result;
use crate::pipeline::ReconcilerConfig;
use crate::types::{Child, Element, ElementType, Flags, Key, Props, WorkTag};

/// Identity of an old child in the array lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LookupKey {
    Explicit(Key),
    Index(usize),
}

impl LookupKey {
    fn of(key: Option<&Key>, index: usize) -> Self {
        match key {
            Some(key) => LookupKey::Explicit(key.clone()),
            None => LookupKey::Index(index),
        }
    }
}

fn tag_of(element: &Element) -> WorkTag {
    match element.element_type {
        ElementType::Host(_) => WorkTag::HostContainerElement,
        ElementType::Component(_) => WorkTag::StatefulComponent,
    }
}

/// Keyed child diff, with or without effect tracking.
#[derive(Debug, Clone, Copy)]
pub struct ChildReconciler<'a> {
    track_effects: bool,
    config: &'a ReconcilerConfig,
}

impl<'a> ChildReconciler<'a> {
    /// Reconciler for update passes against an existing subtree.
    pub fn reconcile(config: &'a ReconcilerConfig) -> Self {
        Self {
            track_effects: true,
            config,
        }
    }

    /// Reconciler for the first mount of a subtree.
    pub fn mount(config: &'a ReconcilerConfig) -> Self {
        Self {
            track_effects: false,
            config,
        }
    }

    pub fn tracks_effects(&self) -> bool {
        self.track_effects
    }

    /// Diff `new_child` against the old list starting at `current_first_child`.
    ///
    /// Returns the first node of the new child list.
    pub fn reconcile_child_fibers<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        return_fiber: NodeId,
        current_first_child: Option<NodeId>,
        new_child: &Child,
    ) -> Result<Option<NodeId>> {
        match new_child {
            Child::Element(element) => {
                let fiber =
                    self.reconcile_single_element(tree, return_fiber, current_first_child, element)?;
                self.place_single_child(tree, fiber).map(Some)
            }
            Child::Text(content) => {
                let fiber =
                    self.reconcile_single_text(tree, return_fiber, current_first_child, content)?;
                self.place_single_child(tree, fiber).map(Some)
            }
            Child::List(children) => {
                self.reconcile_children_array(tree, return_fiber, current_first_child, children)
            }
            Child::Empty => {
                self.delete_remaining_children(tree, return_fiber, current_first_child)?;
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    fn delete_child<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        return_fiber: NodeId,
        child: NodeId,
    ) -> Result<()> {
        if !self.track_effects {
            return Ok(());
        }
        let parent = tree.node_mut(return_fiber)?;
        parent.deletions.push(child);
        parent.flags |= Flags::CHILD_DELETION;
        Ok(())
    }

    fn delete_remaining_children<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        return_fiber: NodeId,
        current_first_child: Option<NodeId>,
    ) -> Result<()> {
        if !self.track_effects {
            return Ok(());
        }
        let mut child = current_first_child;
        while let Some(id) = child {
            self.delete_child(tree, return_fiber, id)?;
            child = tree.node(id)?.sibling;
        }
        Ok(())
    }

    // =========================================================================
    // Single Child
    // =========================================================================

    fn place_single_child<I: Clone>(&self, tree: &mut FiberTree<I>, fiber: NodeId) -> Result<NodeId> {
        let node = tree.node_mut(fiber)?;
        if self.track_effects && node.alternate.is_none() {
            node.flags |= Flags::PLACEMENT;
        }
        Ok(fiber)
    }

    /// Match one element against the old list.
    ///
    /// Old candidates with a different key are deleted as the scan passes
    /// them. A key match with the same type is reused and everything after it
    /// deleted; a key match with a different type ends the scan with the
    /// candidate and everything after it deleted.
    pub fn reconcile_single_element<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        return_fiber: NodeId,
        current_first_child: Option<NodeId>,
        element: &Element,
    ) -> Result<NodeId> {
        let tag = tag_of(element);
        let mut current = current_first_child;

        while let Some(candidate) = current {
            let node = tree.node(candidate)?;
            let sibling = node.sibling;

            if node.key != element.key {
                self.delete_child(tree, return_fiber, candidate)?;
                current = sibling;
                continue;
            }

            if node.same_type(tag, Some(&element.element_type)) {
                let existing = tree.use_fiber(candidate, element.props.clone())?;
                tree.node_mut(existing)?.parent = Some(return_fiber);
                self.delete_remaining_children(tree, return_fiber, sibling)?;
                trace!(element = element.element_type.name(), "reuse single child");
                return Ok(existing);
            }

            self.delete_remaining_children(tree, return_fiber, Some(candidate))?;
            break;
        }

        let fiber = tree.create_from_element(element);
        tree.node_mut(fiber)?.parent = Some(return_fiber);
        Ok(fiber)
    }

    /// Match one text value against the old list. Any old text node is
    /// reusable; only its content changes.
    pub fn reconcile_single_text<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        return_fiber: NodeId,
        current_first_child: Option<NodeId>,
        content: &str,
    ) -> Result<NodeId> {
        let mut current = current_first_child;

        while let Some(candidate) = current {
            let node = tree.node(candidate)?;
            let sibling = node.sibling;

            if node.tag == WorkTag::HostTextElement {
                let existing = tree.use_fiber(candidate, Props::text(content))?;
                tree.node_mut(existing)?.parent = Some(return_fiber);
                self.delete_remaining_children(tree, return_fiber, sibling)?;
                return Ok(existing);
            }

            self.delete_child(tree, return_fiber, candidate)?;
            current = sibling;
        }

        let fiber = tree.create_from_text(content);
        tree.node_mut(fiber)?.parent = Some(return_fiber);
        Ok(fiber)
    }

    // =========================================================================
    // Array
    // =========================================================================

    /// Diff a list of children against the old list.
    ///
    /// New nodes come out in new-list order. Old nodes not claimed by any new
    /// child are deleted.
    pub fn reconcile_children_array<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        return_fiber: NodeId,
        current_first_child: Option<NodeId>,
        new_children: &[Child],
    ) -> Result<Option<NodeId>> {
        let mut old_order = Vec::new();
        let mut existing: HashMap<LookupKey, NodeId> = HashMap::new();
        let mut cursor = current_first_child;
        while let Some(id) = cursor {
            let node = tree.node(id)?;
            existing.insert(LookupKey::of(node.key.as_ref(), node.index), id);
            old_order.push(id);
            cursor = node.sibling;
        }

        let mut consumed: HashSet<NodeId> = HashSet::new();
        let mut seen_keys: HashSet<Key> = HashSet::new();
        let mut last_placed_index = 0;
        let mut first: Option<NodeId> = None;
        let mut previous: Option<NodeId> = None;

        for (index, child) in new_children.iter().enumerate() {
            if let Child::Element(Element { key: Some(key), .. }) = child {
                if !seen_keys.insert(key.clone()) && self.config.dev_warnings {
                    warn!(%key, "duplicate key in child list; keys must be unique among siblings");
                }
            }

            let Some(fiber) =
                self.update_from_map(tree, &mut existing, &mut consumed, index, child)?
            else {
                continue;
            };

            {
                let node = tree.node_mut(fiber)?;
                node.index = index;
                node.parent = Some(return_fiber);
                node.sibling = None;
            }
            last_placed_index = self.place_child(tree, fiber, last_placed_index)?;

            match previous {
                None => first = Some(fiber),
                Some(prev) => tree.node_mut(prev)?.sibling = Some(fiber),
            }
            previous = Some(fiber);
        }

        for old in old_order {
            if !consumed.contains(&old) {
                self.delete_child(tree, return_fiber, old)?;
            }
        }

        Ok(first)
    }

    /// Reuse the old node stored under this child's lookup key, or create one.
    fn update_from_map<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        existing: &mut HashMap<LookupKey, NodeId>,
        consumed: &mut HashSet<NodeId>,
        index: usize,
        child: &Child,
    ) -> Result<Option<NodeId>> {
        match child {
            Child::Text(content) => {
                let key = LookupKey::Index(index);
                if let Some(&old) = existing.get(&key) {
                    if tree.node(old)?.tag == WorkTag::HostTextElement {
                        existing.remove(&key);
                        consumed.insert(old);
                        return tree.use_fiber(old, Props::text(content.as_str())).map(Some);
                    }
                }
                Ok(Some(tree.create_from_text(content)))
            }
            Child::Element(element) => {
                let key = LookupKey::of(element.key.as_ref(), index);
                if let Some(&old) = existing.get(&key) {
                    if tree.node(old)?.same_type(tag_of(element), Some(&element.element_type)) {
                        existing.remove(&key);
                        consumed.insert(old);
                        return tree.use_fiber(old, element.props.clone()).map(Some);
                    }
                }
                Ok(Some(tree.create_from_element(element)))
            }
            Child::List(_) => {
                if self.config.dev_warnings {
                    warn!(index, "nested child lists are not supported; rendering nothing in their place");
                }
                Ok(None)
            }
            Child::Empty => Ok(None),
        }
    }

    /// Flag `fiber` for Placement if it is new or moved; returns the updated
    /// `last_placed_index`.
    fn place_child<I: Clone>(
        &self,
        tree: &mut FiberTree<I>,
        fiber: NodeId,
        last_placed_index: usize,
    ) -> Result<usize> {
        if !self.track_effects {
            return Ok(last_placed_index);
        }

        let old_index = tree
            .node(fiber)?
            .alternate
            .and_then(|alt| tree.get(alt))
            .map(|current| current.index);

        match old_index {
            Some(old_index) if old_index >= last_placed_index => Ok(old_index),
            _ => {
                tree.node_mut(fiber)?.flags |= Flags::PLACEMENT;
                Ok(last_placed_index)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
