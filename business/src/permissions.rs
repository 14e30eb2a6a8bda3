//! Permission catalog: list, create and delete.

use std::any::Any;

use rbacctl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::config::BusinessConfig;
use crate::records::{Permission, PermissionDraft};
use crate::validate::{ValidationError, validate_permission_draft};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PermissionsStatus {
    #[default]
    Idle,
    Pending,
    Loaded,
    Failed(String),
}

/// One reconciliation step for [`PermissionsCompute`], folded into the
/// current catalog at apply time so concurrent commands never erase each
/// other.
#[derive(Debug)]
enum PermissionsUpdate {
    LoadPending,
    Loaded(Vec<Permission>),
    LoadFailed(String),
    /// Replace by id when present, append when not.
    Created(Permission),
    Removed(u64),
}

/// Authoritative permission list, reconciled by id.
#[derive(Debug, Clone, Default)]
pub struct PermissionsCompute {
    permissions: Vec<Permission>,
    status: PermissionsStatus,
}

impl PermissionsCompute {
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn status(&self) -> &PermissionsStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == PermissionsStatus::Pending
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            PermissionsStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    fn apply(&mut self, update: PermissionsUpdate) {
        match update {
            PermissionsUpdate::LoadPending => self.status = PermissionsStatus::Pending,
            PermissionsUpdate::Loaded(permissions) => {
                self.permissions = permissions;
                self.status = PermissionsStatus::Loaded;
            }
            PermissionsUpdate::LoadFailed(message) => {
                self.status = PermissionsStatus::Failed(message);
            }
            PermissionsUpdate::Created(permission) => {
                match self
                    .permissions
                    .iter_mut()
                    .find(|p| p.id == permission.id)
                {
                    Some(existing) => *existing = permission,
                    None => self.permissions.push(permission),
                }
            }
            PermissionsUpdate::Removed(id) => self.permissions.retain(|p| p.id != id),
        }
    }
}

impl Compute for PermissionsCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by the permission commands.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        match new_self.downcast::<PermissionsUpdate>() {
            Ok(delta) => self.apply(*delta),
            Err(other) => assign_impl(self, other),
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadPermissionsCommand;

impl Command for LoadPermissionsCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<PermissionsCompute>().clone();

        Box::pin(async move {
            if cache.is_loading() {
                log::warn!("permission load already in flight, skipping");
                return;
            }

            updater.merge::<PermissionsCompute, _>(PermissionsUpdate::LoadPending);

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("permission load cancelled");
                    return;
                }
                result = api::list_permissions(api_base_url.as_str()) => result,
            };

            match result {
                Ok(permissions) => {
                    updater.merge::<PermissionsCompute, _>(PermissionsUpdate::Loaded(permissions));
                }
                Err(err) => {
                    log::error!("loading permissions failed: {err}");
                    updater.merge::<PermissionsCompute, _>(PermissionsUpdate::LoadFailed(
                        err.to_string(),
                    ));
                }
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreatePermissionInput {
    pub draft: PermissionDraft,
}

impl State for CreatePermissionInput {
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
pub enum CreatePermissionStatus {
    #[default]
    Idle,
    Pending,
    Created(Permission),
    Rejected(ValidationError),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct CreatePermissionCompute {
    pub status: CreatePermissionStatus,
}

impl CreatePermissionCompute {
    pub fn is_pending(&self) -> bool {
        self.status == CreatePermissionStatus::Pending
    }

    pub fn created(&self) -> Option<&Permission> {
        match &self.status {
            CreatePermissionStatus::Created(permission) => Some(permission),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&ValidationError> {
        match &self.status {
            CreatePermissionStatus::Rejected(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            CreatePermissionStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for CreatePermissionCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by CreatePermissionCommand.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

#[derive(Debug, Default)]
pub struct CreatePermissionCommand;

impl Command for CreatePermissionCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<CreatePermissionInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<CreatePermissionCompute>().clone();

        Box::pin(async move {
            if cache.is_pending() {
                log::warn!("permission create already in flight, skipping");
                return;
            }

            if let Err(err) = validate_permission_draft(&input.draft) {
                updater.set(CreatePermissionCompute {
                    status: CreatePermissionStatus::Rejected(err),
                });
                return;
            }

            updater.set(CreatePermissionCompute {
                status: CreatePermissionStatus::Pending,
            });

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("permission create cancelled");
                    return;
                }
                result = api::create_permission(api_base_url.as_str(), &input.draft) => result,
            };

            match result {
                Ok(permission) => {
                    updater.set(CreatePermissionCompute {
                        status: CreatePermissionStatus::Created(permission.clone()),
                    });
                    updater.merge::<PermissionsCompute, _>(PermissionsUpdate::Created(permission));
                }
                Err(err) => {
                    log::error!("creating permission failed: {err}");
                    updater.set(CreatePermissionCompute {
                        status: CreatePermissionStatus::Failed(err.to_string()),
                    });
                }
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeletePermissionInput {
    pub id: u64,
}

impl State for DeletePermissionInput {
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
pub enum DeletePermissionStatus {
    #[default]
    Idle,
    Pending,
    Deleted(u64),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct DeletePermissionCompute {
    pub status: DeletePermissionStatus,
}

impl DeletePermissionCompute {
    pub fn is_pending(&self) -> bool {
        self.status == DeletePermissionStatus::Pending
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            DeletePermissionStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for DeletePermissionCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by DeletePermissionCommand.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

#[derive(Debug, Default)]
pub struct DeletePermissionCommand;

impl Command for DeletePermissionCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<DeletePermissionInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<DeletePermissionCompute>().clone();

        Box::pin(async move {
            if cache.is_pending() {
                log::warn!("permission delete already in flight, skipping");
                return;
            }

            updater.set(DeletePermissionCompute {
                status: DeletePermissionStatus::Pending,
            });

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("permission delete cancelled");
                    return;
                }
                result = api::delete_permission(api_base_url.as_str(), input.id) => result,
            };

            match result {
                Ok(()) => {
                    updater.set(DeletePermissionCompute {
                        status: DeletePermissionStatus::Deleted(input.id),
                    });
                    updater.merge::<PermissionsCompute, _>(PermissionsUpdate::Removed(input.id));
                }
                Err(err) => {
                    log::error!("deleting permission {} failed: {err}", input.id);
                    updater.set(DeletePermissionCompute {
                        status: DeletePermissionStatus::Failed(err.to_string()),
                    });
                }
            }
        })
    }
}
