//! Reconciler - Render passes over a [`FiberRoot`](crate::engine::FiberRoot).
//!
//! A pass runs in three phases:
//!
//! ```text
//! begin (top-down)     component output / host children → keyed child diff
//! complete (bottom-up) host instances built, effect flags bubbled
//! commit               flagged mutations applied to the host, current swapped
//! ```
//!
//! - [`child`] - keyed diff of old nodes against new children
//! - [`hooks`] - per-component state slots and setters
//! - [`begin`] / [`complete`] - per-node work of the render phase
//! - [`work_loop`] - drives a pass and the commit
//! - [`commit`] - host mutation walk

pub mod begin;
pub mod child;
pub mod commit;
pub mod complete;
pub mod hooks;
pub mod work_loop;

pub use child::ChildReconciler;
pub use commit::commit_mutation_effects;
pub use hooks::{detached_scheduler, Hooks, ScheduleUpdate, SetState};
pub use work_loop::{commit_root, perform_sync_work_on_root, schedule_update_on_node, RenderContext};
