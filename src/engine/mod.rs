//! Reconciler Engine - Work nodes, their arena and their queues.
//!
//! The engine manages the core data structures:
//! - WorkNode: one element instance for one render generation
//! - FiberTree: double-buffered arena holding both generations
//! - UpdateQueue: circular list of pending state changes
//! - FiberRoot: one mounted tree and its visible generation
//!
//! # Architecture
//!
//! Nodes are NOT reference-counted objects. They are generational ids into
//! one arena per root:
//!
//! ```text
//! NodeId(1v1): Root          (child=2, alternate=4)
//! NodeId(2v1): div  key=None (parent=1, child=3, alternate=5)
//! NodeId(3v1): "hi"          (parent=2)
//! ```
//!
//! Parent and counterpart links are plain ids used for lookup; a node stays
//! alive while the visible tree or a visible node's counterpart holds it.

mod node;
mod root;
mod tree;
mod update_queue;

pub use node::*;
pub use root::*;
pub use tree::*;
pub use update_queue::*;
