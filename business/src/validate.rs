//! Local validation applied before any network call.
//!
//! Rules run in a fixed order so the first failing field is the one reported;
//! no partial submission ever happens.

use thiserror::Error;

use crate::records::{PermissionDraft, RoleDraft, UserDraft};

/// A draft failed a local rule. The draft is preserved by the caller so the
/// operator can correct it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email must look like local@domain.tld")]
    InvalidEmail,
    #[error("at least one role is required")]
    NoRoles,
    #[error("at least one permission is required")]
    NoPermissions,
}

impl ValidationError {
    /// The form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "name",
            ValidationError::InvalidEmail => "email",
            ValidationError::NoRoles => "roles",
            ValidationError::NoPermissions => "permissions",
        }
    }
}

/// Checked in order: name, then email, then roles.
pub fn validate_user_draft(draft: &UserDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !is_valid_email(draft.email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    if draft.roles.is_empty() {
        return Err(ValidationError::NoRoles);
    }
    Ok(())
}

/// Checked in order: name, then permissions.
pub fn validate_role_draft(draft: &RoleDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if draft.permissions.is_empty() {
        return Err(ValidationError::NoPermissions);
    }
    Ok(())
}

pub fn validate_permission_draft(draft: &PermissionDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Syntactic email check: one or more non-space/non-`@` characters, `@`, one
/// or more non-space/non-`@` characters, `.`, one or more non-space/non-`@`
/// characters. Deliberately shallow; the remote resource is the arbiter.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if !segment_ok(local) || !segment_ok(domain) {
        return false;
    }
    // The domain needs a dot with at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn segment_ok(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| !c.is_whitespace() && c != '@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use ustr::Ustr;

    fn valid_draft() -> UserDraft {
        UserDraft {
            name: "Dana".to_owned(),
            email: "dana@x.com".to_owned(),
            roles: vec![Ustr::from("Viewer")],
            status: Default::default(),
        }
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("bob@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn rejects_missing_dot_after_domain() {
        assert!(!is_valid_email("bob@example"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("bob"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("bob@"));
        assert!(!is_valid_email("bob@@example.com"));
        assert!(!is_valid_email("bob smith@example.com"));
        assert!(!is_valid_email("bob@example com"));
        assert!(!is_valid_email("bob@.com"));
        assert!(!is_valid_email("bob@example."));
    }

    #[test]
    fn valid_draft_passes() {
        assert_eq!(validate_user_draft(&valid_draft()), Ok(()));
    }

    #[test]
    fn first_failing_field_is_reported() {
        let mut draft = valid_draft();
        draft.name = "   ".to_owned();
        draft.email = "broken".to_owned();
        draft.roles.clear();
        // Name is checked first even though every rule fails.
        assert_eq!(validate_user_draft(&draft), Err(ValidationError::EmptyName));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut draft = valid_draft();
        draft.email = "dana@x".to_owned();
        assert_eq!(
            validate_user_draft(&draft),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn empty_roles_rejected_regardless_of_other_fields() {
        let mut draft = valid_draft();
        draft.roles.clear();
        assert_eq!(validate_user_draft(&draft), Err(ValidationError::NoRoles));
    }

    #[test]
    fn email_is_trimmed_before_matching() {
        let mut draft = valid_draft();
        draft.email = "  dana@x.com  ".to_owned();
        assert_eq!(validate_user_draft(&draft), Ok(()));
    }

    #[test]
    fn role_draft_needs_name_and_permissions() {
        let draft = RoleDraft {
            name: "Editor".to_owned(),
            permissions: vec![],
        };
        assert_eq!(
            validate_role_draft(&draft),
            Err(ValidationError::NoPermissions)
        );

        let draft = RoleDraft {
            name: String::new(),
            permissions: vec![Ustr::from("read")],
        };
        assert_eq!(validate_role_draft(&draft), Err(ValidationError::EmptyName));
    }

    #[test]
    fn validation_error_names_its_field() {
        assert_eq!(ValidationError::EmptyName.field(), "name");
        assert_eq!(ValidationError::InvalidEmail.field(), "email");
        assert_eq!(ValidationError::NoRoles.field(), "roles");
        assert_eq!(ValidationError::NoPermissions.field(), "permissions");
    }
}
