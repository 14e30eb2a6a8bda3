//! Business layer of the RBAC console.
//!
//! Presentation layers stay dumb: they read states and computes, dispatch
//! commands, and render. Everything with behavior lives here:
//! - [`records`]: the domain records the REST resources exchange;
//! - [`validate`]: local rules applied before any network call;
//! - [`directory`]: the User Directory view-model (query state, authoritative
//!   list, display projection, CRUD commands with reconcile-by-id);
//! - [`roles`] / [`permissions`]: the analogous catalog view-models;
//! - [`api`] / [`http`]: the REST client;
//! - [`registry`]: wiring everything into one `StateCtx`.

pub mod api;
pub mod config;
pub mod directory;
pub mod http;
pub mod permissions;
pub mod records;
pub mod registry;
pub mod roles;
pub mod validate;

pub use api::{ApiError, ApiResult};
pub use config::{API_URL_ENV, BusinessConfig};
pub use directory::{
    CreateUserCommand, CreateUserCompute, CreateUserInput, CreateUserStatus, DeleteUserCommand,
    DeleteUserCompute, DeleteUserInput, DeleteUserStatus, DirectoryEvent, DirectoryOp,
    DirectoryProjectionCompute, DirectoryQuery, LoadStatus, LoadUsersCommand, Outcome,
    SortDirection, SortField, UpdateUserCommand, UpdateUserCompute, UpdateUserInput,
    UpdateUserStatus, UserDirectoryCompute, UserDirectoryState, project,
};
pub use permissions::{
    CreatePermissionCommand, CreatePermissionCompute, CreatePermissionInput,
    CreatePermissionStatus, DeletePermissionCommand, DeletePermissionCompute,
    DeletePermissionInput, DeletePermissionStatus, LoadPermissionsCommand, PermissionsCompute,
    PermissionsStatus,
};
pub use records::{
    Permission, PermissionDraft, Role, RoleDraft, UserDraft, UserRecord, UserStatus,
};
pub use registry::build_console_ctx;
pub use roles::{
    DeleteRoleCommand, DeleteRoleCompute, DeleteRoleInput, DeleteRoleStatus, LoadRolesCommand,
    RolesCompute, RolesStatus, SaveRoleCommand, SaveRoleCompute, SaveRoleInput, SaveRoleStatus,
};
pub use validate::{
    ValidationError, is_valid_email, validate_permission_draft, validate_role_draft,
    validate_user_draft,
};
