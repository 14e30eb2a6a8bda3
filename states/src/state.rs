use std::any::Any;

/// A unit of application state owned by a [`crate::StateCtx`].
///
/// States are read with `ctx.state::<T>()` and mutated with
/// `ctx.update::<T>(|s| ...)`. A state that commands need to read must
/// override [`State::snapshot`] to return a clone of itself.
pub trait State: Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Clone of this state for command snapshots. States no command reads may
    /// keep the default.
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Replace `self` with a value published through an [`crate::Updater`].
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        let _ = new_self;
    }
}

/// Helper for [`State::assign_box`] implementations: downcast and replace.
pub fn state_assign_impl<T: Any>(dst: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *dst = *value,
        Err(_) => log::warn!(
            "state assign: dropping update with wrong type for {}",
            std::any::type_name::<T>()
        ),
    }
}
