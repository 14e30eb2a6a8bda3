//! The User Directory view-model.
//!
//! One `StateCtx` instance owns the whole directory:
//! - [`UserDirectoryState`] holds the query state (search, role filter, sort);
//! - [`UserDirectoryCompute`] is the authoritative user list, updated only by
//!   the load/create/update/delete commands and reconciled by record id;
//! - [`DirectoryProjectionCompute`] derives the display projection from the
//!   two above through the dependency graph;
//! - one command plus one input state plus one compute cache per mutation.

mod create;
mod delete;
mod directory_compute;
mod events;
mod projection;
mod query;
mod state;
mod update;

pub use create::{CreateUserCommand, CreateUserCompute, CreateUserInput, CreateUserStatus};
pub use delete::{DeleteUserCommand, DeleteUserCompute, DeleteUserInput, DeleteUserStatus};
pub use directory_compute::{LoadStatus, LoadUsersCommand, UserDirectoryCompute};
pub use events::{DirectoryEvent, DirectoryOp, Outcome};
pub use projection::{DirectoryProjectionCompute, project};
pub use query::{DirectoryQuery, SortDirection, SortField};
pub use state::UserDirectoryState;
pub use update::{UpdateUserCommand, UpdateUserCompute, UpdateUserInput, UpdateUserStatus};
