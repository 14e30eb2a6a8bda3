//! The display projection: `sort(filter(search(all_users)))`.

use std::any::{Any, TypeId};

use rbacctl_states::{Compute, ComputeDeps, Dep, Updater, assign_impl};

use crate::records::UserRecord;

use super::directory_compute::UserDirectoryCompute;
use super::query::{DirectoryQuery, SortDirection, SortField};
use super::state::UserDirectoryState;

/// Derive the display projection. Applied in fixed order because search and
/// filter narrow before sort orders the remainder:
/// 1. role filter, exact and case-sensitive membership;
/// 2. search, lower-cased substring over name or email;
/// 3. stable sort on the raw field value (case-sensitive), so ties preserve
///    prior relative order and re-sorting is idempotent.
pub fn project(users: &[UserRecord], query: &DirectoryQuery) -> Vec<UserRecord> {
    let mut rows: Vec<UserRecord> = users
        .iter()
        .filter(|user| {
            query
                .role_filter
                .as_ref()
                .is_none_or(|role| user.has_role(role.as_str()))
        })
        .cloned()
        .collect();

    let needle = query.search.to_lowercase();
    if !needle.is_empty() {
        rows.retain(|user| user.matches_search(&needle));
    }

    rows.sort_by(|a, b| {
        let ordering = match query.sort_field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Email => a.email.cmp(&b.email),
        };
        match query.sort_direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    rows
}

/// Derived compute holding the current projection. Recomputed through the
/// dependency graph whenever the query state or the authoritative list
/// changes; never hand-maintained.
#[derive(Debug, Clone, Default)]
pub struct DirectoryProjectionCompute {
    users: Vec<UserRecord>,
}

impl DirectoryProjectionCompute {
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }
}

impl Compute for DirectoryProjectionCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::on(
            vec![TypeId::of::<UserDirectoryState>()],
            vec![TypeId::of::<UserDirectoryCompute>()],
        )
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let state = deps.state::<UserDirectoryState>();
        let directory = deps.compute::<UserDirectoryCompute>();
        updater.set(DirectoryProjectionCompute {
            users: project(directory.users(), state.query()),
        });
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::UserStatus;
    use ustr::Ustr;

    fn user(id: u64, name: &str, email: &str, roles: &[&str]) -> UserRecord {
        UserRecord {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            roles: roles.iter().copied().map(Ustr::from).collect(),
            status: UserStatus::Active,
        }
    }

    fn sample_users() -> Vec<UserRecord> {
        vec![
            user(1, "Bob", "bob@example.com", &["Admin"]),
            user(2, "alice", "alice@example.com", &["Viewer"]),
            user(3, "Carol", "carol@example.com", &["Admin", "Viewer"]),
        ]
    }

    #[test]
    fn projection_is_deterministic() {
        let users = sample_users();
        let query = DirectoryQuery {
            search: "a".to_owned(),
            ..Default::default()
        };
        assert_eq!(project(&users, &query), project(&users, &query));
    }

    #[test]
    fn role_filter_is_a_pure_narrowing() {
        let users = sample_users();
        let all = project(&users, &DirectoryQuery::default());
        let narrowed = project(
            &users,
            &DirectoryQuery {
                role_filter: Some(Ustr::from("Admin")),
                ..Default::default()
            },
        );

        assert!(narrowed.iter().all(|u| all.contains(u)));
        assert!(narrowed.iter().all(|u| u.has_role("Admin")));
        assert_eq!(narrowed.len(), 2);
    }

    #[test]
    fn role_filter_is_case_sensitive() {
        let users = sample_users();
        let narrowed = project(
            &users,
            &DirectoryQuery {
                role_filter: Some(Ustr::from("admin")),
                ..Default::default()
            },
        );
        assert!(narrowed.is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let users = vec![user(1, "Alice Smith", "asmith@example.com", &["Viewer"])];

        for term in ["alice", "ALICE", "Smith", "asmith@"] {
            let query = DirectoryQuery {
                search: term.to_owned(),
                ..Default::default()
            };
            assert_eq!(project(&users, &query).len(), 1, "term {term:?}");
        }

        let query = DirectoryQuery {
            search: "bob".to_owned(),
            ..Default::default()
        };
        assert!(project(&users, &query).is_empty());
    }

    #[test]
    fn name_sort_is_case_sensitive_lexicographic() {
        let users = sample_users();
        let sorted = project(&users, &DirectoryQuery::default());
        let names: Vec<&str> = sorted.iter().map(|u| u.name.as_str()).collect();
        // Uppercase sorts before lowercase on raw byte order.
        assert_eq!(names, ["Bob", "Carol", "alice"]);
    }

    #[test]
    fn descending_reverses_the_order() {
        let users = sample_users();
        let sorted = project(
            &users,
            &DirectoryQuery {
                sort_direction: SortDirection::Descending,
                ..Default::default()
            },
        );
        let names: Vec<&str> = sorted.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["alice", "Carol", "Bob"]);
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let users = vec![
            user(1, "Same", "first@example.com", &["Viewer"]),
            user(2, "Same", "second@example.com", &["Viewer"]),
            user(3, "Same", "third@example.com", &["Viewer"]),
        ];
        let query = DirectoryQuery::default();

        let once = project(&users, &query);
        let twice = project(&once, &query);

        let ids: Vec<u64> = once.iter().map(|u| u.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(once, twice);
    }

    #[test]
    fn email_sort_orders_by_email() {
        let users = sample_users();
        let sorted = project(
            &users,
            &DirectoryQuery {
                sort_field: SortField::Email,
                ..Default::default()
            },
        );
        let emails: Vec<&str> = sorted.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(
            emails,
            ["alice@example.com", "bob@example.com", "carol@example.com"]
        );
    }

    #[test]
    fn filter_and_search_compose() {
        let users = sample_users();
        let query = DirectoryQuery {
            search: "example.com".to_owned(),
            role_filter: Some(Ustr::from("Viewer")),
            ..Default::default()
        };
        let rows = project(&users, &query);
        let names: Vec<&str> = rows.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Carol", "alice"]);
    }
}
