use std::any::{TypeId, type_name};
use std::collections::HashMap;

use crate::{Compute, State};

/// Read-only view over the registered states and computes, handed to
/// [`Compute::compute`] while a derived value recomputes.
pub struct Dep<'a> {
    states: &'a HashMap<TypeId, Box<dyn State>>,
    computes: &'a HashMap<TypeId, Box<dyn Compute>>,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(
        states: &'a HashMap<TypeId, Box<dyn State>>,
        computes: &'a HashMap<TypeId, Box<dyn Compute>>,
    ) -> Self {
        Self { states, computes }
    }

    /// Borrow a registered state.
    ///
    /// # Panics
    /// Panics if the type was never registered; declare it in
    /// [`Compute::deps`] and register it before the first sync.
    pub fn state<T: State>(&self) -> &T {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("state {} is not registered", type_name::<T>()))
    }

    /// Borrow a registered compute.
    ///
    /// # Panics
    /// Panics if the type was never registered.
    pub fn compute<T: Compute>(&self) -> &T {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.as_any().downcast_ref::<T>())
            .unwrap_or_else(|| panic!("compute {} is not registered", type_name::<T>()))
    }
}
