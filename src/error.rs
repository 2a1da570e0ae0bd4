//! Error types for the reconciliation pipeline.

use thiserror::Error;

/// Errors raised by a render pass or by a state setter.
///
/// Any error raised during the begin or complete phase discards the whole
/// in-progress pass; the root keeps showing its previous tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("component `{name}` failed to render: {message}")]
    Component { name: String, message: String },

    #[error("state slot {index} requested but the previous render only allocated {expected}")]
    HookOrderMismatch { index: usize, expected: usize },

    #[error("state slot {index} was read with a different state type than it was created with")]
    HookTypeMismatch { index: usize },

    #[error("state update requested while the root is rendering; it stays queued for the next pass")]
    RenderInProgress,

    #[error("state update requested after its root was dropped")]
    RootDropped,

    #[error("state update requested on a node that is no longer mounted")]
    DetachedNode,

    #[error("work node missing from the arena")]
    MissingNode,
}

impl ReconcileError {
    /// Convenience constructor for component render failures.
    pub fn component(name: impl Into<String>, message: impl Into<String>) -> Self {
        ReconcileError::Component {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
