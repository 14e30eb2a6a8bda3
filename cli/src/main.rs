#![allow(clippy::exit)]

mod output;
mod timing;

use anyhow::{Context as _, Result};
use clap::{CommandFactory as _, Parser, Subcommand, ValueEnum};
use clap_complete::{Generator, Shell};
use console::style;
use inquire::{Confirm, MultiSelect, Text};
use rbacctl_business::{
    API_URL_ENV, BusinessConfig, CreatePermissionCommand, CreatePermissionCompute,
    CreatePermissionInput, CreatePermissionStatus, CreateUserCommand, CreateUserCompute,
    CreateUserInput, CreateUserStatus, DeletePermissionCommand, DeletePermissionCompute,
    DeletePermissionInput, DeletePermissionStatus, DeleteRoleCommand, DeleteRoleCompute,
    DeleteRoleInput, DeleteRoleStatus, DeleteUserCommand, DeleteUserCompute, DeleteUserInput,
    DeleteUserStatus, DirectoryProjectionCompute, LoadPermissionsCommand, LoadRolesCommand,
    LoadStatus, LoadUsersCommand, Permission, PermissionDraft, PermissionsCompute,
    PermissionsStatus, Role, RoleDraft, RolesCompute, RolesStatus, SaveRoleCommand,
    SaveRoleCompute, SaveRoleInput, SaveRoleStatus, SortDirection, SortField, UpdateUserCommand,
    UpdateUserCompute, UpdateUserInput, UpdateUserStatus, UserDirectoryCompute, UserDirectoryState,
    UserDraft, UserRecord, UserStatus, build_console_ctx,
};
use rbacctl_states::StateCtx;
use tracing::{error, info, instrument};
use ustr::Ustr;

#[derive(Parser)]
#[command(name = "rbacctl")]
#[command(about = "Admin console for users, roles, and permissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the RBAC API
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Show timing/latency information
    #[arg(long, global = true)]
    timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage roles and their permission sets
    Roles {
        #[command(subcommand)]
        command: RoleCommands,
    },
    /// Manage the permission catalog
    Permissions {
        #[command(subcommand)]
        command: PermissionCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users, filtered and sorted locally
    List {
        /// Match a substring of name or email, case-insensitively
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only show users holding this role (exact name)
        #[arg(long, short = 'r')]
        role: Option<String>,

        /// Column to sort by
        #[arg(long, value_enum, default_value = "name")]
        sort_by: SortColumn,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },
    /// Create a user
    Create {
        /// Display name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Email address
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Role to grant (can be repeated)
        #[arg(long, short = 'r')]
        role: Vec<String>,

        /// Create the user as inactive
        #[arg(long)]
        inactive: bool,

        /// Interactive mode (prompt for all fields)
        #[arg(long, short = 'I')]
        interactive: bool,
    },
    /// Update a user; omitted flags keep the current values
    Update {
        /// User ID
        id: u64,

        /// New display name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// New email address
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Replacement role set (can be repeated; omit to keep current roles)
        #[arg(long, short = 'r')]
        role: Vec<String>,

        /// New account status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RoleCommands {
    /// List roles and their permissions
    List,
    /// Create a role
    Create {
        /// Role name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Permission to include (can be repeated)
        #[arg(long, short = 'p')]
        permission: Vec<String>,

        /// Interactive mode (prompt for all fields)
        #[arg(long, short = 'I')]
        interactive: bool,
    },
    /// Update a role; omitted flags keep the current values
    Update {
        /// Role ID
        id: u64,

        /// New role name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Replacement permission set (can be repeated)
        #[arg(long, short = 'p')]
        permission: Vec<String>,
    },
    /// Replace a role's permission set
    Assign {
        /// Role ID
        id: u64,

        /// Permission to assign (can be repeated; omit to pick interactively)
        #[arg(long, short = 'p')]
        permission: Vec<String>,
    },
    /// Delete a role
    Delete {
        /// Role ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PermissionCommands {
    /// List the permission catalog
    List,
    /// Create a permission
    Create {
        /// Permission name
        name: String,
    },
    /// Delete a permission
    Delete {
        /// Permission ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortColumn {
    Name,
    Email,
}

impl From<SortColumn> for SortField {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => SortField::Name,
            SortColumn::Email => SortField::Email,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for UserStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => UserStatus::Active,
            StatusArg::Inactive => UserStatus::Inactive,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with timing support
    timing::init_tracing(cli.verbose, cli.timing);

    info!(
        version = rbacctl_utils::version_info::build_version(),
        commit = rbacctl_utils::version_info::build_commit(),
        "starting rbacctl"
    );

    let config = cli
        .api_url
        .map(BusinessConfig::new)
        .unwrap_or_default();
    let ctx = build_console_ctx(config).context("Failed to wire up the state context")?;

    match cli.command {
        Commands::Users { command } => match command {
            UserCommands::List {
                search,
                role,
                sort_by,
                desc,
            } => run_users_list(ctx, search, role, sort_by, desc).await,
            UserCommands::Create {
                name,
                email,
                role,
                inactive,
                interactive,
            } => {
                if interactive {
                    run_users_create_interactive(ctx).await
                } else {
                    run_users_create(ctx, name, email, role, inactive).await
                }
            }
            UserCommands::Update {
                id,
                name,
                email,
                role,
                status,
            } => run_users_update(ctx, id, name, email, role, status).await,
            UserCommands::Delete { id, yes } => run_users_delete(ctx, id, yes).await,
        },
        Commands::Roles { command } => match command {
            RoleCommands::List => run_roles_list(ctx).await,
            RoleCommands::Create {
                name,
                permission,
                interactive,
            } => {
                if interactive {
                    run_roles_create_interactive(ctx).await
                } else {
                    run_roles_create(ctx, name, permission).await
                }
            }
            RoleCommands::Update {
                id,
                name,
                permission,
            } => run_roles_update(ctx, id, name, permission).await,
            RoleCommands::Assign { id, permission } => run_roles_assign(ctx, id, permission).await,
            RoleCommands::Delete { id, yes } => run_roles_delete(ctx, id, yes).await,
        },
        Commands::Permissions { command } => match command {
            PermissionCommands::List => run_permissions_list(ctx).await,
            PermissionCommands::Create { name } => run_permissions_create(ctx, name).await,
            PermissionCommands::Delete { id, yes } => run_permissions_delete(ctx, id, yes).await,
        },
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

fn generate_completions<G: Generator>(generator: G) {
    use std::io::Write as _;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_owned();
    clap_complete::generate(generator, &mut cmd, bin_name, &mut std::io::stdout());
    std::io::stdout().flush().ok();
}

/// Await all pending tasks in the `JoinSet` and sync computes.
#[instrument(skip_all, name = "await_tasks")]
async fn await_pending_tasks(ctx: &mut StateCtx) {
    while ctx.task_count() > 0 {
        if ctx.task_set_mut().join_next().await.is_some() {
            ctx.sync_computes();
        }
    }
}

/// Flush queued commands and await all spawned tasks.
#[instrument(skip_all, name = "flush")]
async fn flush_and_await(ctx: &mut StateCtx) {
    ctx.sync_computes();
    ctx.flush_commands();
    await_pending_tasks(ctx).await;
    ctx.sync_computes();
}

fn ok_mark() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}

fn err_mark() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}

/// Fetch the authoritative user list, exiting on failure.
#[instrument(skip_all, name = "load_users")]
async fn load_users(ctx: &mut StateCtx) -> Result<Vec<UserRecord>> {
    ctx.enqueue_command::<LoadUsersCommand>();
    flush_and_await(ctx).await;

    let directory = ctx.compute::<UserDirectoryCompute>();
    match directory.status() {
        LoadStatus::Loaded => Ok(directory.users().to_vec()),
        LoadStatus::Failed(msg) => {
            error!("Loading users failed: {msg}");
            eprintln!("{} Failed to load users: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        LoadStatus::Idle | LoadStatus::Pending => {
            eprintln!("{} Load did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }
}

/// Fetch the role catalog, exiting on failure.
#[instrument(skip_all, name = "load_roles")]
async fn load_roles(ctx: &mut StateCtx) -> Result<Vec<Role>> {
    ctx.enqueue_command::<LoadRolesCommand>();
    flush_and_await(ctx).await;

    let roles = ctx.compute::<RolesCompute>();
    match roles.status() {
        RolesStatus::Loaded => Ok(roles.roles().to_vec()),
        RolesStatus::Failed(msg) => {
            error!("Loading roles failed: {msg}");
            eprintln!("{} Failed to load roles: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        RolesStatus::Idle | RolesStatus::Pending => {
            eprintln!("{} Load did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }
}

/// Fetch the permission catalog, exiting on failure.
#[instrument(skip_all, name = "load_permissions")]
async fn load_permissions(ctx: &mut StateCtx) -> Result<Vec<Permission>> {
    ctx.enqueue_command::<LoadPermissionsCommand>();
    flush_and_await(ctx).await;

    let permissions = ctx.compute::<PermissionsCompute>();
    match permissions.status() {
        PermissionsStatus::Loaded => Ok(permissions.permissions().to_vec()),
        PermissionsStatus::Failed(msg) => {
            error!("Loading permissions failed: {msg}");
            eprintln!("{} Failed to load permissions: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        PermissionsStatus::Idle | PermissionsStatus::Pending => {
            eprintln!("{} Load did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }
}

#[instrument(skip_all, name = "users_list", fields(sort_by = ?sort_by, desc))]
async fn run_users_list(
    mut ctx: StateCtx,
    search: Option<String>,
    role: Option<String>,
    sort_by: SortColumn,
    desc: bool,
) -> Result<()> {
    ctx.update::<UserDirectoryState>(|state| {
        if let Some(text) = search {
            state.set_search(text);
        }
        state.set_role_filter(role.map(|name| Ustr::from(name.as_str())));
        let direction = if desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        state.set_sort(sort_by.into(), direction);
    });

    load_users(&mut ctx).await?;

    let projection = ctx.compute::<DirectoryProjectionCompute>();
    if projection.users().is_empty() {
        println!("No users matched.");
    } else {
        output::print_users(projection.users());
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "users_create")]
async fn run_users_create(
    mut ctx: StateCtx,
    name: Option<String>,
    email: Option<String>,
    roles: Vec<String>,
    inactive: bool,
) -> Result<()> {
    let name = name.context("--name is required (or use -I for interactive mode)")?;
    let email = email.context("--email is required (or use -I for interactive mode)")?;

    let draft = UserDraft {
        name,
        email,
        roles: roles.iter().map(|r| Ustr::from(r.as_str())).collect(),
        status: if inactive {
            UserStatus::Inactive
        } else {
            UserStatus::Active
        },
    };

    submit_user_create(&mut ctx, draft).await;
    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "users_create_interactive")]
async fn run_users_create_interactive(mut ctx: StateCtx) -> Result<()> {
    println!("Create New User\n");

    let catalog = load_roles(&mut ctx).await?;

    let name = Text::new("Name:")
        .with_help_message("Display name for the new user")
        .prompt()
        .context("Failed to read name")?;

    let email = Text::new("Email:")
        .with_help_message("Must look like user@domain.tld")
        .prompt()
        .context("Failed to read email")?;

    let role_names: Vec<String> = catalog.iter().map(|role| role.name.clone()).collect();
    let roles = if role_names.is_empty() {
        println!("No roles exist yet; the draft will be rejected until one is granted.");
        Vec::new()
    } else {
        MultiSelect::new("Roles:", role_names)
            .with_help_message("Space to toggle, Enter to confirm")
            .prompt()
            .context("Failed to select roles")?
    };

    let active = Confirm::new("Active?")
        .with_default(true)
        .prompt()
        .context("Failed to confirm status")?;

    let draft = UserDraft {
        name,
        email,
        roles: roles.iter().map(|r| Ustr::from(r.as_str())).collect(),
        status: if active {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        },
    };

    submit_user_create(&mut ctx, draft).await;
    ctx.shutdown().await;
    Ok(())
}

/// Dispatch the create command and report the outcome. Exits on failure.
async fn submit_user_create(ctx: &mut StateCtx, draft: UserDraft) {
    ctx.update::<CreateUserInput>(|input| {
        input.draft = draft;
    });
    ctx.enqueue_command::<CreateUserCommand>();
    flush_and_await(ctx).await;

    let compute = ctx.compute::<CreateUserCompute>();
    match &compute.status {
        CreateUserStatus::Created(record) => {
            info!(id = record.id, "user created");
            println!(
                "{} Created user {} <{}> (id {})",
                ok_mark(),
                record.name,
                record.email,
                record.id
            );
        }
        CreateUserStatus::Rejected(rule) => {
            eprintln!("{} Invalid {}: {rule}", err_mark(), rule.field());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        CreateUserStatus::Failed(msg) => {
            error!("Create failed: {msg}");
            eprintln!("{} Failed to create user: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        CreateUserStatus::Idle | CreateUserStatus::Pending => {
            eprintln!("{} Create did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    };
}

#[instrument(skip_all, name = "users_update", fields(id))]
async fn run_users_update(
    mut ctx: StateCtx,
    id: u64,
    name: Option<String>,
    email: Option<String>,
    roles: Vec<String>,
    status: Option<StatusArg>,
) -> Result<()> {
    // The API expects a full record, so merge the flags into the current one.
    let users = load_users(&mut ctx).await?;
    let Some(existing) = users.into_iter().find(|user| user.id == id) else {
        eprintln!("{} No user with id {id}", err_mark());
        ctx.shutdown().await;
        std::process::exit(1);
    };

    let draft = UserDraft {
        name: name.unwrap_or(existing.name),
        email: email.unwrap_or(existing.email),
        roles: if roles.is_empty() {
            existing.roles
        } else {
            roles.iter().map(|r| Ustr::from(r.as_str())).collect()
        },
        status: status.map_or(existing.status, Into::into),
    };

    ctx.update::<UpdateUserInput>(|input| {
        input.id = id;
        input.draft = draft;
    });
    ctx.enqueue_command::<UpdateUserCommand>();
    flush_and_await(&mut ctx).await;

    let compute = ctx.compute::<UpdateUserCompute>();
    match &compute.status {
        UpdateUserStatus::Updated(record) => {
            info!(id = record.id, "user updated");
            println!(
                "{} Updated user {} <{}> (id {})",
                ok_mark(),
                record.name,
                record.email,
                record.id
            );
        }
        UpdateUserStatus::Rejected(rule) => {
            eprintln!("{} Invalid {}: {rule}", err_mark(), rule.field());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        UpdateUserStatus::Failed(msg) => {
            error!("Update failed: {msg}");
            eprintln!("{} Failed to update user: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        UpdateUserStatus::Idle | UpdateUserStatus::Pending => {
            eprintln!("{} Update did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "users_delete", fields(id))]
async fn run_users_delete(mut ctx: StateCtx, id: u64, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new(&format!("Delete user {id}?"))
            .with_default(false)
            .prompt()
            .context("Failed to confirm")?;
        if !confirmed {
            println!("Cancelled.");
            ctx.shutdown().await;
            return Ok(());
        }
    }

    ctx.update::<DeleteUserInput>(|input| {
        input.id = id;
    });
    ctx.enqueue_command::<DeleteUserCommand>();
    flush_and_await(&mut ctx).await;

    let compute = ctx.compute::<DeleteUserCompute>();
    match &compute.status {
        DeleteUserStatus::Deleted(id) => {
            info!(id, "user deleted");
            println!("{} Deleted user {id}", ok_mark());
        }
        DeleteUserStatus::Failed(msg) => {
            error!("Delete failed: {msg}");
            eprintln!("{} Failed to delete user: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        DeleteUserStatus::Idle | DeleteUserStatus::Pending => {
            eprintln!("{} Delete did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "roles_list")]
async fn run_roles_list(mut ctx: StateCtx) -> Result<()> {
    let roles = load_roles(&mut ctx).await?;
    if roles.is_empty() {
        println!("No roles defined.");
    } else {
        output::print_roles(&roles);
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "roles_create")]
async fn run_roles_create(
    mut ctx: StateCtx,
    name: Option<String>,
    permissions: Vec<String>,
) -> Result<()> {
    let name = name.context("--name is required (or use -I for interactive mode)")?;

    let draft = RoleDraft {
        name,
        permissions: permissions.iter().map(|p| Ustr::from(p.as_str())).collect(),
    };

    submit_role_save(&mut ctx, None, draft).await;
    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "roles_create_interactive")]
async fn run_roles_create_interactive(mut ctx: StateCtx) -> Result<()> {
    println!("Create New Role\n");

    let catalog = load_permissions(&mut ctx).await?;

    let name = Text::new("Name:")
        .with_help_message("Name for the new role")
        .prompt()
        .context("Failed to read name")?;

    let permission_names: Vec<String> = catalog.iter().map(|p| p.name.clone()).collect();
    let permissions = if permission_names.is_empty() {
        println!("No permissions exist yet; the draft will be rejected until one is included.");
        Vec::new()
    } else {
        MultiSelect::new("Permissions:", permission_names)
            .with_help_message("Space to toggle, Enter to confirm")
            .prompt()
            .context("Failed to select permissions")?
    };

    let draft = RoleDraft {
        name,
        permissions: permissions.iter().map(|p| Ustr::from(p.as_str())).collect(),
    };

    submit_role_save(&mut ctx, None, draft).await;
    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "roles_update", fields(id))]
async fn run_roles_update(
    mut ctx: StateCtx,
    id: u64,
    name: Option<String>,
    permissions: Vec<String>,
) -> Result<()> {
    let roles = load_roles(&mut ctx).await?;
    let Some(existing) = roles.into_iter().find(|role| role.id == id) else {
        eprintln!("{} No role with id {id}", err_mark());
        ctx.shutdown().await;
        std::process::exit(1);
    };

    let draft = RoleDraft {
        name: name.unwrap_or(existing.name),
        permissions: if permissions.is_empty() {
            existing.permissions
        } else {
            permissions.iter().map(|p| Ustr::from(p.as_str())).collect()
        },
    };

    submit_role_save(&mut ctx, Some(id), draft).await;
    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "roles_assign", fields(id))]
async fn run_roles_assign(mut ctx: StateCtx, id: u64, permissions: Vec<String>) -> Result<()> {
    let roles = load_roles(&mut ctx).await?;
    let Some(existing) = roles.into_iter().find(|role| role.id == id) else {
        eprintln!("{} No role with id {id}", err_mark());
        ctx.shutdown().await;
        std::process::exit(1);
    };

    let assigned: Vec<Ustr> = if permissions.is_empty() {
        // Pick interactively, with the current set preselected.
        let catalog = load_permissions(&mut ctx).await?;
        let names: Vec<String> = catalog.iter().map(|p| p.name.clone()).collect();
        if names.is_empty() {
            eprintln!("{} No permissions exist to assign", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        let preselected: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| existing.permissions.iter().any(|p| p.as_str() == name.as_str()))
            .map(|(index, _)| index)
            .collect();
        let chosen = MultiSelect::new("Permissions:", names)
            .with_default(&preselected)
            .with_help_message("Space to toggle, Enter to confirm")
            .prompt()
            .context("Failed to select permissions")?;
        chosen.iter().map(|p| Ustr::from(p.as_str())).collect()
    } else {
        permissions.iter().map(|p| Ustr::from(p.as_str())).collect()
    };

    let draft = RoleDraft {
        name: existing.name,
        permissions: assigned,
    };

    submit_role_save(&mut ctx, Some(id), draft).await;
    ctx.shutdown().await;
    Ok(())
}

/// Dispatch the save command and report the outcome. Exits on failure.
async fn submit_role_save(ctx: &mut StateCtx, id: Option<u64>, draft: RoleDraft) {
    ctx.update::<SaveRoleInput>(|input| {
        input.id = id;
        input.draft = draft;
    });
    ctx.enqueue_command::<SaveRoleCommand>();
    flush_and_await(ctx).await;

    let compute = ctx.compute::<SaveRoleCompute>();
    match &compute.status {
        SaveRoleStatus::Saved(role) => {
            info!(id = role.id, "role saved");
            println!(
                "{} Saved role {} (id {}) with {} permission(s)",
                ok_mark(),
                role.name,
                role.id,
                role.permissions.len()
            );
        }
        SaveRoleStatus::Rejected(rule) => {
            eprintln!("{} Invalid {}: {rule}", err_mark(), rule.field());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        SaveRoleStatus::Failed(msg) => {
            error!("Save failed: {msg}");
            eprintln!("{} Failed to save role: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        SaveRoleStatus::Idle | SaveRoleStatus::Pending => {
            eprintln!("{} Save did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    };
}

#[instrument(skip_all, name = "roles_delete", fields(id))]
async fn run_roles_delete(mut ctx: StateCtx, id: u64, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new(&format!("Delete role {id}?"))
            .with_default(false)
            .prompt()
            .context("Failed to confirm")?;
        if !confirmed {
            println!("Cancelled.");
            ctx.shutdown().await;
            return Ok(());
        }
    }

    ctx.update::<DeleteRoleInput>(|input| {
        input.id = id;
    });
    ctx.enqueue_command::<DeleteRoleCommand>();
    flush_and_await(&mut ctx).await;

    let compute = ctx.compute::<DeleteRoleCompute>();
    match &compute.status {
        DeleteRoleStatus::Deleted(id) => {
            info!(id, "role deleted");
            println!("{} Deleted role {id}", ok_mark());
        }
        DeleteRoleStatus::Failed(msg) => {
            error!("Delete failed: {msg}");
            eprintln!("{} Failed to delete role: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        DeleteRoleStatus::Idle | DeleteRoleStatus::Pending => {
            eprintln!("{} Delete did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "permissions_list")]
async fn run_permissions_list(mut ctx: StateCtx) -> Result<()> {
    let permissions = load_permissions(&mut ctx).await?;
    if permissions.is_empty() {
        println!("No permissions defined.");
    } else {
        output::print_permissions(&permissions);
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "permissions_create")]
async fn run_permissions_create(mut ctx: StateCtx, name: String) -> Result<()> {
    ctx.update::<CreatePermissionInput>(|input| {
        input.draft = PermissionDraft { name };
    });
    ctx.enqueue_command::<CreatePermissionCommand>();
    flush_and_await(&mut ctx).await;

    let compute = ctx.compute::<CreatePermissionCompute>();
    match &compute.status {
        CreatePermissionStatus::Created(permission) => {
            info!(id = permission.id, "permission created");
            println!(
                "{} Created permission {} (id {})",
                ok_mark(),
                permission.name,
                permission.id
            );
        }
        CreatePermissionStatus::Rejected(rule) => {
            eprintln!("{} Invalid {}: {rule}", err_mark(), rule.field());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        CreatePermissionStatus::Failed(msg) => {
            error!("Create failed: {msg}");
            eprintln!("{} Failed to create permission: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        CreatePermissionStatus::Idle | CreatePermissionStatus::Pending => {
            eprintln!("{} Create did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[instrument(skip_all, name = "permissions_delete", fields(id))]
async fn run_permissions_delete(mut ctx: StateCtx, id: u64, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new(&format!("Delete permission {id}?"))
            .with_default(false)
            .prompt()
            .context("Failed to confirm")?;
        if !confirmed {
            println!("Cancelled.");
            ctx.shutdown().await;
            return Ok(());
        }
    }

    ctx.update::<DeletePermissionInput>(|input| {
        input.id = id;
    });
    ctx.enqueue_command::<DeletePermissionCommand>();
    flush_and_await(&mut ctx).await;

    let compute = ctx.compute::<DeletePermissionCompute>();
    match &compute.status {
        DeletePermissionStatus::Deleted(id) => {
            info!(id, "permission deleted");
            println!("{} Deleted permission {id}", ok_mark());
        }
        DeletePermissionStatus::Failed(msg) => {
            error!("Delete failed: {msg}");
            eprintln!("{} Failed to delete permission: {msg}", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
        DeletePermissionStatus::Idle | DeletePermissionStatus::Pending => {
            eprintln!("{} Delete did not complete", err_mark());
            ctx.shutdown().await;
            std::process::exit(1);
        }
    }

    ctx.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn users_list_parses_filters_and_sort() {
        let cli = Cli::parse_from([
            "rbacctl", "users", "list", "-s", "carol", "-r", "admin", "--sort-by", "email",
            "--desc",
        ]);
        let Commands::Users {
            command:
                UserCommands::List {
                    search,
                    role,
                    sort_by,
                    desc,
                },
        } = cli.command
        else {
            panic!("expected users list");
        };
        assert_eq!(search.as_deref(), Some("carol"));
        assert_eq!(role.as_deref(), Some("admin"));
        assert!(matches!(sort_by, SortColumn::Email));
        assert!(desc);
    }

    #[test]
    fn users_create_accepts_repeated_roles() {
        let cli = Cli::parse_from([
            "rbacctl", "users", "create", "-n", "Dana", "-e", "dana@example.com", "-r", "admin",
            "-r", "viewer",
        ]);
        let Commands::Users {
            command: UserCommands::Create { name, role, .. },
        } = cli.command
        else {
            panic!("expected users create");
        };
        assert_eq!(name.as_deref(), Some("Dana"));
        assert_eq!(role, vec!["admin".to_owned(), "viewer".to_owned()]);
    }

    #[test]
    fn api_url_is_a_global_flag() {
        let cli = Cli::parse_from([
            "rbacctl",
            "roles",
            "list",
            "--api-url",
            "http://localhost:9999",
        ]);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn delete_requires_an_id() {
        assert!(Cli::try_parse_from(["rbacctl", "users", "delete"]).is_err());
    }
}
