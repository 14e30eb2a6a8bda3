//! Wires one complete console view-model into a `StateCtx`.

use rbacctl_states::{StateCtx, TopologyError};

use crate::config::BusinessConfig;
use crate::directory::{
    CreateUserCommand, CreateUserCompute, CreateUserInput, DeleteUserCommand, DeleteUserCompute,
    DeleteUserInput, DirectoryProjectionCompute, LoadUsersCommand, UpdateUserCommand,
    UpdateUserCompute, UpdateUserInput, UserDirectoryCompute, UserDirectoryState,
};
use crate::permissions::{
    CreatePermissionCommand, CreatePermissionCompute, CreatePermissionInput,
    DeletePermissionCommand, DeletePermissionCompute, DeletePermissionInput,
    LoadPermissionsCommand, PermissionsCompute,
};
use crate::roles::{
    DeleteRoleCommand, DeleteRoleCompute, DeleteRoleInput, LoadRolesCommand, RolesCompute,
    SaveRoleCommand, SaveRoleCompute, SaveRoleInput,
};

/// Build a `StateCtx` with every state, compute and command the console
/// uses. One instance per directory view; no ambient globals.
pub fn build_console_ctx(config: BusinessConfig) -> Result<StateCtx, TopologyError> {
    let mut ctx = StateCtx::new();

    ctx.add_state(config);

    // User directory
    ctx.add_state(UserDirectoryState::default());
    ctx.add_state(CreateUserInput::default());
    ctx.add_state(UpdateUserInput::default());
    ctx.add_state(DeleteUserInput::default());
    ctx.record_compute(UserDirectoryCompute::default())?;
    ctx.record_compute(DirectoryProjectionCompute::default())?;
    ctx.record_compute(CreateUserCompute::default())?;
    ctx.record_compute(UpdateUserCompute::default())?;
    ctx.record_compute(DeleteUserCompute::default())?;
    ctx.record_command(LoadUsersCommand);
    ctx.record_command(CreateUserCommand);
    ctx.record_command(UpdateUserCommand);
    ctx.record_command(DeleteUserCommand);

    // Roles
    ctx.add_state(SaveRoleInput::default());
    ctx.add_state(DeleteRoleInput::default());
    ctx.record_compute(RolesCompute::default())?;
    ctx.record_compute(SaveRoleCompute::default())?;
    ctx.record_compute(DeleteRoleCompute::default())?;
    ctx.record_command(LoadRolesCommand);
    ctx.record_command(SaveRoleCommand);
    ctx.record_command(DeleteRoleCommand);

    // Permissions
    ctx.add_state(CreatePermissionInput::default());
    ctx.add_state(DeletePermissionInput::default());
    ctx.record_compute(PermissionsCompute::default())?;
    ctx.record_compute(CreatePermissionCompute::default())?;
    ctx.record_compute(DeletePermissionCompute::default())?;
    ctx.record_command(LoadPermissionsCommand);
    ctx.record_command(CreatePermissionCommand);
    ctx.record_command(DeletePermissionCommand);

    Ok(ctx)
}
