//! # spark-reconciler
//!
//! Fiber-style reconciliation and commit pipeline for element trees.
//!
//! ## Architecture
//!
//! Element descriptors are plain data. A mounted root keeps two generations
//! of work nodes in one arena: the tree currently shown by the host and the
//! tree being built. A render pass diffs new children against the shown tree
//! by key and type, records the host mutations the difference implies as
//! effect flags, and commits them in one walk:
//!
//! ```text
//! Element tree → begin (diff) → complete (instances, flags) → commit → HostConfig
//! ```
//!
//! Stateful components keep their state in positional slots; a setter
//! queues an update and immediately re-renders the owning root.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Element, Child, Props, Flags, etc.)
//! - [`element`] - Element construction
//! - [`engine`] - Work nodes, the double-buffered arena, update queues
//! - [`reconciler`] - Child diff, state slots, render and commit phases
//! - [`renderer`] - Host adapter interface and an in-memory host
//! - [`pipeline`] - Root lifecycle and configuration

pub mod element;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod reconciler;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{ReconcileError, Result};

pub use element::{component, create_element, host, ElementBuilder};

pub use engine::{Action, FiberRoot, FiberTree, NodeId, UpdateQueue, WorkNode};

pub use reconciler::{Hooks, ScheduleUpdate, SetState};

pub use renderer::{HostConfig, HostOp, MemoryHost};

pub use pipeline::{create_root, create_root_with_config, ReconcilerConfig, Root};
