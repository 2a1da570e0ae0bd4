//! Root Pipeline
//!
//! This module connects element descriptors to a host container.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Root::render → root update queue → render pass → commit → HostConfig
//! ```
//!
//! ## Data Flow
//!
//! 1. **render** - Enqueues the element on the root's shared queue
//! 2. **render pass** - Drains the queue, diffs against the visible tree
//! 3. **commit** - Applies the recorded mutations and swaps generations
//!
//! State setters re-enter at step 2 through the root's weak scheduler handle.

pub mod config;
pub mod mount;

// Re-exports
pub use config::{ReconcilerConfig, DEV_WARNINGS_ENV};
pub use mount::{create_root, create_root_with_config, Root};
