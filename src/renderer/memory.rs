//! In-memory host - a tiny DOM with an operation log.
//!
//! Instances are indices into a flat node table. Inserting or appending an
//! instance that already has a parent moves it, like the DOM does, so the
//! table always describes a forest.

use std::fmt::Write as _;

use super::HostConfig;
use crate::types::{AttrValue, Props};

/// Handle to an instance of a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(pub usize);

#[derive(Debug, Clone, PartialEq)]
enum HostNodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, AttrValue)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct HostNode {
    kind: HostNodeKind,
    parent: Option<HostId>,
    children: Vec<HostId>,
}

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Create { id: HostId, tag: String },
    CreateText { id: HostId, content: String },
    AppendInitial { parent: HostId, child: HostId },
    Append { parent: HostId, child: HostId },
    Insert { parent: HostId, child: HostId, before: HostId },
    Remove { parent: HostId, child: HostId },
    UpdateText { id: HostId, content: String },
}

impl HostOp {
    /// Whether this op changes an attached tree, as opposed to building
    /// detached instances.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            HostOp::Append { .. }
                | HostOp::Insert { .. }
                | HostOp::Remove { .. }
                | HostOp::UpdateText { .. }
        )
    }
}

/// In-memory host environment.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container to mount a root into. Not logged.
    pub fn create_container(&mut self, tag: &str) -> HostId {
        self.push(HostNodeKind::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
        })
    }

    fn push(&mut self, kind: HostNodeKind) -> HostId {
        let id = HostId(self.nodes.len());
        self.nodes.push(HostNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Recorded operations, oldest first.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Take and clear the operation log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of logged ops that touched an attached tree.
    pub fn mutation_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_mutation()).count()
    }

    /// Total instances ever created (containers included).
    pub fn instance_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn children_of(&self, id: HostId) -> &[HostId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    pub fn parent_of(&self, id: HostId) -> Option<HostId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Text of a text instance.
    pub fn text_of(&self, id: HostId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            HostNodeKind::Text(s) => Some(s),
            HostNodeKind::Element { .. } => None,
        }
    }

    /// Serialize the subtree under `id` (exclusive) as compact markup.
    ///
    /// `<ul><li>a</li><li>b</li></ul>`; attributes render as `name="value"`.
    pub fn inner_markup(&self, id: HostId) -> String {
        let mut out = String::new();
        for child in self.children_of(id) {
            self.write_markup(*child, &mut out);
        }
        out
    }

    fn write_markup(&self, id: HostId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.kind {
            HostNodeKind::Text(s) => out.push_str(s),
            HostNodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for child in &node.children {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn detach(&mut self, child: HostId) {
        let Some(parent) = self.nodes.get_mut(child.0).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|c| *c != child);
        }
    }

    /// Ids this host never handed out are ignored.
    fn attach(&mut self, parent: HostId, child: HostId, before: Option<HostId>) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let at = before
            .and_then(|b| siblings.iter().position(|c| *c == b))
            .unwrap_or(siblings.len());
        siblings.insert(at, child);
        self.nodes[child.0].parent = Some(parent);
    }
}

impl HostConfig for MemoryHost {
    type Instance = HostId;

    fn create_instance(&mut self, element_type: &str, props: &Props) -> HostId {
        let attrs = props
            .attrs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let id = self.push(HostNodeKind::Element {
            tag: element_type.to_string(),
            attrs,
        });
        self.ops.push(HostOp::Create {
            id,
            tag: element_type.to_string(),
        });
        id
    }

    fn create_text_instance(&mut self, content: &str) -> HostId {
        let id = self.push(HostNodeKind::Text(content.to_string()));
        self.ops.push(HostOp::CreateText {
            id,
            content: content.to_string(),
        });
        id
    }

    fn append_initial_child(&mut self, parent: &HostId, child: &HostId) {
        self.attach(*parent, *child, None);
        self.ops.push(HostOp::AppendInitial {
            parent: *parent,
            child: *child,
        });
    }

    fn append_child_to_container(&mut self, container: &HostId, child: &HostId) {
        self.attach(*container, *child, None);
        self.ops.push(HostOp::Append {
            parent: *container,
            child: *child,
        });
    }

    fn insert_child_to_container(&mut self, child: &HostId, container: &HostId, before: &HostId) {
        self.attach(*container, *child, Some(*before));
        self.ops.push(HostOp::Insert {
            parent: *container,
            child: *child,
            before: *before,
        });
    }

    fn remove_child(&mut self, container: &HostId, child: &HostId) {
        if self.parent_of(*child) == Some(*container) {
            self.detach(*child);
        }
        self.ops.push(HostOp::Remove {
            parent: *container,
            child: *child,
        });
    }

    fn commit_text_update(&mut self, instance: &HostId, content: &str) {
        if let Some(node) = self.nodes.get_mut(instance.0) {
            node.kind = HostNodeKind::Text(content.to_string());
        }
        self.ops.push(HostOp::UpdateText {
            id: *instance,
            content: content.to_string(),
        });
    }
}
