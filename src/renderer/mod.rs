//! Host renderer - the "blind" mutation layer.
//!
//! The reconciler never touches a host environment directly. It computes
//! which instances to create, insert, move, update and remove, then asks a
//! [`HostConfig`] to do it. The host knows nothing about work nodes, keys or
//! flags; it only sees opaque instance handles.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Render Pass                              │
//! │   begin (top-down) → complete (bottom-up) → commit          │
//! └────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//!                       ┌────────────────┐
//!                       │   HostConfig   │  ← This module
//!                       └────────────────┘
//!                                │
//!                                ▼
//!                        Host environment
//! ```
//!
//! [`MemoryHost`] is an in-memory implementation used by tests and demos.

pub mod memory;

use std::fmt;

use crate::types::Props;

pub use memory::{HostOp, MemoryHost};

/// Capability interface a host environment provides to the reconciler.
///
/// Container and element instances share one handle type, since a container
/// is just the outermost instance the root renders into.
pub trait HostConfig {
    /// Opaque handle to a host instance.
    type Instance: Clone + PartialEq + fmt::Debug;

    /// Create a detached element instance.
    fn create_instance(&mut self, element_type: &str, props: &Props) -> Self::Instance;

    /// Create a detached text instance.
    fn create_text_instance(&mut self, content: &str) -> Self::Instance;

    /// Attach a child while building a detached subtree for the first time.
    fn append_initial_child(&mut self, parent: &Self::Instance, child: &Self::Instance);

    /// Append a child at the end of an attached parent.
    fn append_child_to_container(&mut self, container: &Self::Instance, child: &Self::Instance);

    /// Insert `child` into `container` right before `before`.
    fn insert_child_to_container(
        &mut self,
        child: &Self::Instance,
        container: &Self::Instance,
        before: &Self::Instance,
    );

    /// Detach `child` from `container`.
    fn remove_child(&mut self, container: &Self::Instance, child: &Self::Instance);

    /// Replace the content of a text instance.
    fn commit_text_update(&mut self, instance: &Self::Instance, content: &str);
}
