//! A small reactive state runtime for view-models.
//!
//! The model:
//! - [`State`]: a plain unit of application state, owned by [`StateCtx`] and
//!   mutated synchronously via [`StateCtx::update`].
//! - [`Compute`]: a derived value. Real computes declare dependencies and are
//!   recomputed when a dependency changes; cache-shaped computes are updated
//!   exclusively by commands and keep `compute()` a no-op.
//! - [`Command`]: a manual side effect (typically network IO). Commands read a
//!   [`CommandSnapshot`] taken at dispatch time and publish results through an
//!   [`Updater`]; the results are applied on the next [`StateCtx::sync_computes`].
//!
//! One `StateCtx` instance owns everything: there is no ambient global state.

mod command;
mod compute;
mod ctx;
mod dep;
mod graph;
mod snapshot;
mod state;

pub use command::{Command, CommandFuture};
pub use compute::{Compute, ComputeDeps, assign_impl};
pub use ctx::{StateCtx, Updater};
pub use dep::Dep;
pub use graph::{Graph, TopologyError};
pub use snapshot::CommandSnapshot;
pub use state::{State, state_assign_impl};
