//! The authoritative user list and its load command.
//!
//! `UserDirectoryCompute` is a compute-shaped cache: its `compute()` is a
//! no-op and every change arrives as a [`DirectoryUpdate`] delta through
//! `Updater::merge()`. Deltas fold into the value the context holds at apply
//! time and reconcile by record id, never list position, so responses from
//! concurrent commands arriving in any order cannot corrupt an unrelated
//! entry.

use std::any::Any;

use rbacctl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, Updater, assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::config::BusinessConfig;
use crate::records::UserRecord;

use super::events::{DirectoryEvent, DirectoryOp};

/// Status of the last load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// No load attempted yet.
    #[default]
    Idle,

    /// A load is in flight.
    Pending,

    /// The last load succeeded.
    Loaded,

    /// The last load failed; the previous list is kept as-is.
    Failed(String),
}

/// One reconciliation step for [`UserDirectoryCompute`].
///
/// Commands publish these instead of whole replacement lists, so a command
/// that resolves late folds only its own change into the list and never
/// resurrects the snapshot it was dispatched with.
#[derive(Debug)]
pub(crate) enum DirectoryUpdate {
    LoadPending,
    /// Successful load replaces the list wholesale.
    Loaded(Vec<UserRecord>),
    /// Failed load keeps the existing list untouched.
    LoadFailed(String),
    /// Replace by id when present, append when not.
    Created(UserRecord),
    /// Replace by id; an absent id is a no-op on the list.
    Updated(UserRecord),
    /// Remove by id; an absent id is a no-op on the list.
    Removed(u64),
    /// Remote call failed; records the event, the list stays unchanged.
    Failed(DirectoryOp, String),
}

/// Authoritative in-memory copy of the user collection, plus the most recent
/// operation event for the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct UserDirectoryCompute {
    users: Vec<UserRecord>,
    status: LoadStatus,
    last_event: Option<DirectoryEvent>,
}

impl UserDirectoryCompute {
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Pending
    }

    pub fn last_event(&self) -> Option<&DirectoryEvent> {
        self.last_event.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub(crate) fn apply(&mut self, update: DirectoryUpdate) {
        match update {
            DirectoryUpdate::LoadPending => {
                self.status = LoadStatus::Pending;
            }
            DirectoryUpdate::Loaded(users) => {
                self.users = users;
                self.status = LoadStatus::Loaded;
                self.last_event = Some(DirectoryEvent::success(DirectoryOp::Load));
            }
            DirectoryUpdate::LoadFailed(message) => {
                self.status = LoadStatus::Failed(message.clone());
                self.last_event = Some(DirectoryEvent::failure(DirectoryOp::Load, message));
            }
            DirectoryUpdate::Created(record) => {
                match self.users.iter_mut().find(|u| u.id == record.id) {
                    Some(existing) => *existing = record,
                    None => self.users.push(record),
                }
                self.last_event = Some(DirectoryEvent::success(DirectoryOp::Create));
            }
            DirectoryUpdate::Updated(record) => {
                if let Some(existing) = self.users.iter_mut().find(|u| u.id == record.id) {
                    *existing = record;
                }
                self.last_event = Some(DirectoryEvent::success(DirectoryOp::Update));
            }
            DirectoryUpdate::Removed(id) => {
                self.users.retain(|u| u.id != id);
                self.last_event = Some(DirectoryEvent::success(DirectoryOp::Delete));
            }
            DirectoryUpdate::Failed(operation, message) => {
                self.last_event = Some(DirectoryEvent::failure(operation, message));
            }
        }
    }
}

impl Compute for UserDirectoryCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        // Cache updated by commands; no derived dependencies.
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op. Side effects (network) must not run inside a
        // Compute due to implicit execution; dispatch the commands instead.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        match new_self.downcast::<DirectoryUpdate>() {
            Ok(delta) => self.apply(*delta),
            Err(other) => assign_impl(self, other),
        }
    }
}

/// Manual-only command that fetches the full user collection.
///
/// On success the authoritative list is replaced wholesale; on failure it is
/// left untouched and a load-failure event is recorded. No automatic retry.
#[derive(Debug, Default)]
pub struct LoadUsersCommand;

impl Command for LoadUsersCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<BusinessConfig>().clone();
        let directory = snap.compute::<UserDirectoryCompute>().clone();

        Box::pin(async move {
            if directory.is_loading() {
                log::warn!("user load already in flight, skipping");
                return;
            }

            updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::LoadPending);

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("user load cancelled");
                    return;
                }
                result = api::list_users(api_base_url.as_str()) => result,
            };

            match result {
                Ok(users) => {
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::Loaded(users));
                }
                Err(err) => {
                    log::error!("loading users failed: {err}");
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::LoadFailed(
                        err.to_string(),
                    ));
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::events::Outcome;
    use super::*;
    use crate::records::UserStatus;
    use ustr::Ustr;

    fn user(id: u64, name: &str) -> UserRecord {
        UserRecord {
            id,
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            roles: vec![Ustr::from("Viewer")],
            status: UserStatus::Active,
        }
    }

    fn loaded(users: Vec<UserRecord>) -> UserDirectoryCompute {
        let mut directory = UserDirectoryCompute::default();
        directory.apply(DirectoryUpdate::Loaded(users));
        directory
    }

    #[test]
    fn created_record_is_appended_once() {
        let mut directory = loaded(vec![user(1, "Alice")]);
        directory.apply(DirectoryUpdate::Created(user(7, "Dana")));

        assert_eq!(directory.users().len(), 2);
        assert_eq!(
            directory.users().iter().filter(|u| u.id == 7).count(),
            1
        );
        assert_eq!(
            directory.last_event(),
            Some(&DirectoryEvent::success(DirectoryOp::Create))
        );
    }

    #[test]
    fn created_record_with_known_id_replaces_instead_of_duplicating() {
        let mut directory = loaded(vec![user(7, "Dana")]);
        directory.apply(DirectoryUpdate::Created(user(7, "Dana Updated")));

        assert_eq!(directory.users().len(), 1);
        assert_eq!(directory.users()[0].name, "Dana Updated");
    }

    #[test]
    fn update_of_absent_id_leaves_list_unchanged() {
        let mut directory = loaded(vec![user(1, "Alice")]);
        directory.apply(DirectoryUpdate::Updated(user(9, "Ghost")));

        assert_eq!(directory.users().len(), 1);
        assert_eq!(directory.users()[0].name, "Alice");
    }

    #[test]
    fn remove_of_absent_id_is_a_no_op() {
        let mut directory = loaded(vec![user(1, "Alice")]);
        directory.apply(DirectoryUpdate::Removed(9));

        assert_eq!(directory.users().len(), 1);
        assert_eq!(
            directory.last_event(),
            Some(&DirectoryEvent::success(DirectoryOp::Delete))
        );
    }

    #[test]
    fn interleaved_deltas_keep_both_reconciliations() {
        let mut directory = loaded(vec![user(1, "Alice"), user(2, "Bob")]);
        directory.apply(DirectoryUpdate::Created(user(7, "Dana")));
        directory.apply(DirectoryUpdate::Removed(1));

        let ids: Vec<u64> = directory.users().iter().map(|u| u.id).collect();
        assert_eq!(ids, [2, 7]);
    }

    #[test]
    fn load_failure_keeps_previous_list() {
        let mut directory = loaded(vec![user(1, "Alice")]);
        directory.apply(DirectoryUpdate::LoadFailed(
            "API returned status: 500".to_owned(),
        ));

        assert_eq!(directory.users().len(), 1);
        assert_eq!(
            directory.error_message(),
            Some("API returned status: 500")
        );
        assert!(matches!(
            directory.last_event(),
            Some(DirectoryEvent {
                operation: DirectoryOp::Load,
                outcome: Outcome::Failure(_)
            })
        ));
    }
}
