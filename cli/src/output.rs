//! Table rendering for list subcommands.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use rbacctl_business::{Permission, Role, UserRecord};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Roles")]
    roles: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn print_users(users: &[UserRecord]) {
    let rows: Vec<UserRow> = users
        .iter()
        .map(|user| UserRow {
            id: user.id,
            name: truncate(&user.name, 28),
            email: truncate(&user.email, 36),
            roles: join_names(user.roles.iter().map(|r| r.as_str())),
            status: user.status.to_string(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("\nTotal: {} user(s)", users.len());
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
}

pub fn print_roles(roles: &[Role]) {
    let rows: Vec<RoleRow> = roles
        .iter()
        .map(|role| RoleRow {
            id: role.id,
            name: truncate(&role.name, 28),
            permissions: truncate(&join_names(role.permissions.iter().map(|p| p.as_str())), 48),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("\nTotal: {} role(s)", roles.len());
}

#[derive(Tabled)]
struct PermissionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
}

pub fn print_permissions(permissions: &[Permission]) {
    let rows: Vec<PermissionRow> = permissions
        .iter()
        .map(|permission| PermissionRow {
            id: permission.id,
            name: truncate(&permission.name, 48),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("\nTotal: {} permission(s)", permissions.len());
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    } else {
        s.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("a very long role name", 10), "a very ...");
    }
}
