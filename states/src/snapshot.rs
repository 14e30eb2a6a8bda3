use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;

/// Owned copies of the snapshot-capable states and computes, taken when a
/// command is flushed. Commands read their inputs from here instead of
/// borrowing the context, so the context stays usable while tasks run.
pub struct CommandSnapshot {
    states: BTreeMap<TypeId, Box<dyn Any + Send>>,
    computes: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl CommandSnapshot {
    pub(crate) fn new(
        states: BTreeMap<TypeId, Box<dyn Any + Send>>,
        computes: BTreeMap<TypeId, Box<dyn Any + Send>>,
    ) -> Self {
        Self { states, computes }
    }

    /// # Panics
    /// Panics if the state was not registered or does not provide a snapshot.
    pub fn state<T: Any>(&self) -> &T {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .unwrap_or_else(|| panic!("no snapshot for state {}", type_name::<T>()))
    }

    /// # Panics
    /// Panics if the compute was not registered or does not provide a snapshot.
    pub fn compute<T: Any>(&self) -> &T {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .unwrap_or_else(|| panic!("no snapshot for compute {}", type_name::<T>()))
    }
}
