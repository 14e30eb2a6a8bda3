//! Update-user flow: full-record replacement through PUT.

use std::any::Any;

use rbacctl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::config::BusinessConfig;
use crate::records::{UserDraft, UserRecord};
use crate::validate::{ValidationError, validate_user_draft};

use super::directory_compute::{DirectoryUpdate, UserDirectoryCompute};
use super::events::DirectoryOp;

/// Target id and replacement draft for the next update submission.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub id: u64,
    pub draft: UserDraft,
}

impl State for UpdateUserInput {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UpdateUserStatus {
    #[default]
    Idle,
    Pending,
    Updated(UserRecord),
    Rejected(ValidationError),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserCompute {
    pub status: UpdateUserStatus,
}

impl UpdateUserCompute {
    pub fn is_pending(&self) -> bool {
        self.status == UpdateUserStatus::Pending
    }

    pub fn updated(&self) -> Option<&UserRecord> {
        match &self.status {
            UpdateUserStatus::Updated(record) => Some(record),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&ValidationError> {
        match &self.status {
            UpdateUserStatus::Rejected(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            UpdateUserStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for UpdateUserCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by UpdateUserCommand.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Validates, then PUTs the full record. On success the matching record is
/// replaced by id; on failure the authoritative list stays byte-for-byte
/// unchanged.
#[derive(Debug, Default)]
pub struct UpdateUserCommand;

impl Command for UpdateUserCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<UpdateUserInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<UpdateUserCompute>().clone();

        Box::pin(async move {
            if cache.is_pending() {
                log::warn!("update user request already in flight, skipping");
                return;
            }

            if let Err(err) = validate_user_draft(&input.draft) {
                updater.set(UpdateUserCompute {
                    status: UpdateUserStatus::Rejected(err),
                });
                return;
            }

            updater.set(UpdateUserCompute {
                status: UpdateUserStatus::Pending,
            });

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("update user cancelled");
                    return;
                }
                result = api::update_user(api_base_url.as_str(), input.id, &input.draft) => result,
            };

            match result {
                Ok(record) => {
                    updater.set(UpdateUserCompute {
                        status: UpdateUserStatus::Updated(record.clone()),
                    });
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::Updated(record));
                }
                Err(err) => {
                    log::error!("updating user {} failed: {err}", input.id);
                    updater.set(UpdateUserCompute {
                        status: UpdateUserStatus::Failed(err.to_string()),
                    });
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::Failed(
                        DirectoryOp::Update,
                        err.to_string(),
                    ));
                }
            }
        })
    }
}
