//! Domain records for the RBAC console.
//!
//! These are the JSON bodies the REST resources exchange. Records are never
//! mutated in place: every change round-trips through the remote resource and
//! the local copy is replaced (or removed) by id.
//!
//! Role and permission names are `Ustr` since they come from a small interned
//! set and are compared/cloned frequently.

use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as stored by the remote resource. The id is assigned server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub roles: Vec<Ustr>,
    pub status: UserStatus,
}

impl UserRecord {
    /// Case-insensitive substring match over name and email. `needle` must
    /// already be lower-cased by the caller.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }
}

/// Candidate user for create or update, not yet confirmed by the remote
/// resource. Serialized as the POST/PUT body (no id).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub roles: Vec<Ustr>,
    pub status: UserStatus,
}

/// A role grouping a set of permission names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
    pub permissions: Vec<Ustr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleDraft {
    pub name: String,
    pub permissions: Vec<Ustr>,
}

/// A named permission roles can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionDraft {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserRecord {
        UserRecord {
            id: 1,
            name: "Alice Smith".to_owned(),
            email: "alice@example.com".to_owned(),
            roles: vec![Ustr::from("Admin")],
            status: UserStatus::Active,
        }
    }

    #[test]
    fn search_matches_name_and_email_case_insensitively() {
        let user = alice();
        assert!(user.matches_search("alice"));
        assert!(user.matches_search("smith"));
        assert!(user.matches_search("example.com"));
        assert!(!user.matches_search("bob"));
    }

    #[test]
    fn role_match_is_case_sensitive() {
        let user = alice();
        assert!(user.has_role("Admin"));
        assert!(!user.has_role("admin"));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::from_str::<UserStatus>("\"inactive\"").unwrap(),
            UserStatus::Inactive
        );
    }
}
