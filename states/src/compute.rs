use std::any::{Any, TypeId};

use crate::{Dep, Updater};

/// Dependency declaration for a [`Compute`]: the state and compute types it
/// reads. The [`crate::StateCtx`] marks a compute dirty whenever one of its
/// dependencies changes.
#[derive(Debug, Clone, Default)]
pub struct ComputeDeps {
    pub states: Vec<TypeId>,
    pub computes: Vec<TypeId>,
}

impl ComputeDeps {
    /// No dependencies: a cache updated exclusively by commands.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on(states: Vec<TypeId>, computes: Vec<TypeId>) -> Self {
        Self { states, computes }
    }
}

/// A derived value owned by a [`crate::StateCtx`].
///
/// Two shapes exist:
/// - derived computes declare [`Compute::deps`] and recompute in
///   [`Compute::compute`], publishing the fresh value via `updater.set`;
/// - cache-shaped computes have no deps and a no-op `compute()`; commands
///   update them through an [`Updater`]. Side effects must never run inside
///   `compute()` because it executes implicitly.
pub trait Compute: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater);

    /// Clone of this compute for command snapshots.
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Replace `self` with a value published through an [`Updater`].
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Helper for [`Compute::assign_box`] implementations: downcast and replace.
pub fn assign_impl<T: Any>(dst: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *dst = *value,
        Err(_) => log::warn!(
            "compute assign: dropping update with wrong type for {}",
            std::any::type_name::<T>()
        ),
    }
}
