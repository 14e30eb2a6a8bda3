//! Create-user flow: input state, compute-shaped cache, manual command.

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

/// Draft for the next create submission. Set via
/// `ctx.update::<CreateUserInput>(..)` before enqueueing the command.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub draft: UserDraft,
}

impl State for CreateUserInput {
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
pub enum CreateUserStatus {
    #[default]
    Idle,

    /// Request in flight; a second dispatch is skipped while set.
    Pending,

    /// The remote resource confirmed the record, id assigned.
    Created(UserRecord),

    /// The draft failed a local rule; no network call was made and the draft
    /// is preserved for correction.
    Rejected(ValidationError),

    /// The remote call failed; the authoritative list is unchanged.
    Failed(String),
}

/// Compute-shaped cache for the create flow.
#[derive(Debug, Clone, Default)]
pub struct CreateUserCompute {
    pub status: CreateUserStatus,
}

impl CreateUserCompute {
    pub fn is_pending(&self) -> bool {
        self.status == CreateUserStatus::Pending
    }

    pub fn created(&self) -> Option<&UserRecord> {
        match &self.status {
            CreateUserStatus::Created(record) => Some(record),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&ValidationError> {
        match &self.status {
            CreateUserStatus::Rejected(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            CreateUserStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for CreateUserCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by CreateUserCommand.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Validates the draft, and only if valid POSTs it. An invalid draft is
/// rejected immediately with no network call; a confirmed record is
/// reconciled into the authoritative list by id, published as a delta so a
/// mutation resolving concurrently is never overwritten.
#[derive(Debug, Default)]
pub struct CreateUserCommand;

impl Command for CreateUserCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<CreateUserInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<CreateUserCompute>().clone();

        Box::pin(async move {
            if cache.is_pending() {
                log::warn!("create user request already in flight, skipping");
                return;
            }

            if let Err(err) = validate_user_draft(&input.draft) {
                updater.set(CreateUserCompute {
                    status: CreateUserStatus::Rejected(err),
                });
                return;
            }

            updater.set(CreateUserCompute {
                status: CreateUserStatus::Pending,
            });

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("create user cancelled");
                    return;
                }
                result = api::create_user(api_base_url.as_str(), &input.draft) => result,
            };

            match result {
                Ok(record) => {
                    updater.set(CreateUserCompute {
                        status: CreateUserStatus::Created(record.clone()),
                    });
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::Created(record));
                }
                Err(err) => {
                    log::error!("creating user failed: {err}");
                    updater.set(CreateUserCompute {
                        status: CreateUserStatus::Failed(err.to_string()),
                    });
                    updater.merge::<UserDirectoryCompute, _>(DirectoryUpdate::Failed(
                        DirectoryOp::Create,
                        err.to_string(),
                    ));
                }
            }
        })
    }
}
