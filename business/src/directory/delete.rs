//! Delete-user flow.

use std::any::Any;

use rbacctl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::config::BusinessConfig;

use super::directory_compute::{DirectoryUpdate, UserDirectoryCompute};
use super::events::DirectoryOp;

/// Target id for the next delete submission.
#[derive(Debug, Clone, Default)]
pub struct DeleteUserInput {
    pub id: u64,
}

impl State for DeleteUserInput {
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
pub enum DeleteUserStatus {
    #[default]
    Idle,
    Pending,
    Deleted(u64),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct DeleteUserCompute {
    pub status: DeleteUserStatus,
}

impl DeleteUserCompute {
    pub fn is_pending(&self) -> bool {
        self.status == DeleteUserStatus::Pending
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            DeleteUserStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for DeleteUserCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by DeleteUserCommand.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Issues the DELETE unconditionally (a non-existent id still round-trips);
/// on success the matching record is removed by id, which is a no-op when
/// absent. A failed call leaves the list unchanged.
#[derive(Debug, Default)]
pub struct DeleteUserCommand;

impl Command for DeleteUserCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<DeleteUserInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<DeleteUserCompute>().clone();

        Box::pin(async move {
            if cache.is_pending() {
                log::warn!("delete user request already in flight, skipping");
                return;
            }

            updater.set(DeleteUserCompute {
                status: DeleteUserStatus::Pending,
            });

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("delete user cancelled");
                    return;
                }
                result = api::delete_user(api_base_url.as_str(), input.id) => result,
            };

            match result {
                Ok(()) => {
                    updater.set(DeleteUserCompute {
                        status: DeleteUserStatus::Deleted(input.id),
                    });
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::Removed(input.id));
                }
                Err(err) => {
                    log::error!("deleting user {} failed: {err}", input.id);
                    updater.set(DeleteUserCompute {
                        status: DeleteUserStatus::Failed(err.to_string()),
                    });
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::Failed(
                        DirectoryOp::Delete,
                        err.to_string(),
                    ));
                }
            }
        })
    }
}
