//! Mount API - Root lifecycle.
//!
//! This module provides the entry point for rendering element trees into a
//! host container.
//!
//! # Example
//!
//! ```
//! use spark_reconciler::element::host;
//! use spark_reconciler::pipeline::create_root;
//! use spark_reconciler::renderer::MemoryHost;
//!
//! let mut memory = MemoryHost::new();
//! let container = memory.create_container("app");
//! let root = create_root(memory, container);
//!
//! root.render(host("ul").child(host("li").key("a").child("first")))?;
//! assert_eq!(
//!     root.with_host(|h| h.inner_markup(container)),
//!     "<ul><li>first</li></ul>"
//! );
//!
//! // Clean up
//! root.unmount()?;
//! # Ok::<(), spark_reconciler::ReconcileError>(())
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::config::ReconcilerConfig;
use crate::engine::FiberRoot;
use crate::error::{ReconcileError, Result};
use crate::reconciler::{perform_sync_work_on_root, ScheduleUpdate};
use crate::renderer::HostConfig;
use crate::types::Child;

// =============================================================================
// Root Handle
// =============================================================================

/// Handle returned by [`create_root`].
///
/// Holds the only strong reference to the root; state setters hold weak
/// ones, so dropping the handle turns their calls into
/// [`ReconcileError::RootDropped`].
pub struct Root<H: HostConfig + 'static> {
    inner: Rc<RefCell<FiberRoot<H>>>,
}

impl<H: HostConfig + 'static> Root<H> {
    /// Render `element` into the container, replacing whatever was rendered
    /// before. Returns the element once the host has been mutated.
    pub fn render(&self, element: impl Into<Child>) -> Result<Child> {
        let element = element.into();
        let mut root = self
            .inner
            .try_borrow_mut()
            .map_err(|_| ReconcileError::RenderInProgress)?;
        root.enqueue_render(element.clone());
        perform_sync_work_on_root(&mut root)?;
        Ok(element)
    }

    /// Remove everything rendered into the container.
    pub fn unmount(&self) -> Result<()> {
        debug!("unmount root");
        self.render(Child::Empty).map(|_| ())
    }

    /// Run `f` with the host adapter.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a render pass, e.g. from a component's
    /// render function.
    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(self.inner.borrow_mut().host_mut())
    }

    /// Run `f` with the root itself, for inspecting both generations.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a render pass.
    pub fn with_root<R>(&self, f: impl FnOnce(&mut FiberRoot<H>) -> R) -> R {
        f(&mut *self.inner.borrow_mut())
    }

    /// # Panics
    ///
    /// Panics if called from inside a render pass.
    pub fn container(&self) -> H::Instance {
        self.inner.borrow().container().clone()
    }
}

// =============================================================================
// Create Root
// =============================================================================

/// Create a root rendering into `container`, configured from the
/// environment.
pub fn create_root<H: HostConfig + 'static>(host: H, container: H::Instance) -> Root<H> {
    create_root_with_config(host, container, ReconcilerConfig::from_env())
}

pub fn create_root_with_config<H: HostConfig + 'static>(
    host: H,
    container: H::Instance,
    config: ReconcilerConfig,
) -> Root<H> {
    let inner = Rc::new_cyclic(|weak: &Weak<RefCell<FiberRoot<H>>>| {
        let scheduler: Weak<dyn ScheduleUpdate> = weak.clone();
        RefCell::new(FiberRoot::new(host, container, config, scheduler))
    });
    Root { inner }
}
