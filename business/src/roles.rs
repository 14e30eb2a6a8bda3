//! Role catalog: list, save (create or full-record update) and delete.
//!
//! The original console edits roles through one dialog that covers both
//! creation and renaming, and assigns permissions with a multi-select that
//! submits the full record. `SaveRoleCommand` mirrors that: no id means POST,
//! an id means PUT with the complete permission set.

use std::any::Any;

use rbacctl_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, State, Updater,
    assign_impl, state_assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::api;
use crate::config::BusinessConfig;
use crate::records::{Role, RoleDraft};
use crate::validate::{ValidationError, validate_role_draft};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RolesStatus {
    #[default]
    Idle,
    Pending,
    Loaded,
    Failed(String),
}

/// One reconciliation step for [`RolesCompute`], folded into the current
/// catalog at apply time so concurrent commands never erase each other.
#[derive(Debug)]
enum RolesUpdate {
    LoadPending,
    Loaded(Vec<Role>),
    LoadFailed(String),
    /// Replace by id when present, append when not.
    Saved(Role),
    Removed(u64),
}

/// Authoritative role list, reconciled by id.
#[derive(Debug, Clone, Default)]
pub struct RolesCompute {
    roles: Vec<Role>,
    status: RolesStatus,
}

impl RolesCompute {
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn status(&self) -> &RolesStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == RolesStatus::Pending
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            RolesStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn find(&self, id: u64) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    fn apply(&mut self, update: RolesUpdate) {
        match update {
            RolesUpdate::LoadPending => self.status = RolesStatus::Pending,
            RolesUpdate::Loaded(roles) => {
                self.roles = roles;
                self.status = RolesStatus::Loaded;
            }
            RolesUpdate::LoadFailed(message) => self.status = RolesStatus::Failed(message),
            RolesUpdate::Saved(role) => {
                match self.roles.iter_mut().find(|r| r.id == role.id) {
                    Some(existing) => *existing = role,
                    None => self.roles.push(role),
                }
            }
            RolesUpdate::Removed(id) => self.roles.retain(|r| r.id != id),
        }
    }
}

impl Compute for RolesCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by the role commands.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        match new_self.downcast::<RolesUpdate>() {
            Ok(delta) => self.apply(*delta),
            Err(other) => assign_impl(self, other),
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadRolesCommand;

impl Command for LoadRolesCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<RolesCompute>().clone();

        Box::pin(async move {
            if cache.is_loading() {
                log::warn!("role load already in flight, skipping");
                return;
            }

            updater.merge::<RolesCompute, _>(RolesUpdate::LoadPending);

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("role load cancelled");
                    return;
                }
                result = api::list_roles(api_base_url.as_str()) => result,
            };

            match result {
                Ok(roles) => updater.merge::<RolesCompute, _>(RolesUpdate::Loaded(roles)),
                Err(err) => {
                    log::error!("loading roles failed: {err}");
                    updater.merge::<RolesCompute, _>(RolesUpdate::LoadFailed(err.to_string()));
                }
            }
        })
    }
}

/// Draft for the next save. `id: None` creates, `id: Some` replaces the full
/// record (permission assignment goes through here too).
#[derive(Debug, Clone, Default)]
pub struct SaveRoleInput {
    pub id: Option<u64>,
    pub draft: RoleDraft,
}

impl State for SaveRoleInput {
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
pub enum SaveRoleStatus {
    #[default]
    Idle,
    Pending,
    Saved(Role),
    Rejected(ValidationError),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct SaveRoleCompute {
    pub status: SaveRoleStatus,
}

impl SaveRoleCompute {
    pub fn is_pending(&self) -> bool {
        self.status == SaveRoleStatus::Pending
    }

    pub fn saved(&self) -> Option<&Role> {
        match &self.status {
            SaveRoleStatus::Saved(role) => Some(role),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&ValidationError> {
        match &self.status {
            SaveRoleStatus::Rejected(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            SaveRoleStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for SaveRoleCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by SaveRoleCommand.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

#[derive(Debug, Default)]
pub struct SaveRoleCommand;

impl Command for SaveRoleCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<SaveRoleInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<SaveRoleCompute>().clone();

        Box::pin(async move {
            if cache.is_pending() {
                log::warn!("role save already in flight, skipping");
                return;
            }

            if let Err(err) = validate_role_draft(&input.draft) {
                updater.set(SaveRoleCompute {
                    status: SaveRoleStatus::Rejected(err),
                });
                return;
            }

            updater.set(SaveRoleCompute {
                status: SaveRoleStatus::Pending,
            });

            let api_base_url = config.api_url();
            let request = async {
                match input.id {
                    Some(id) => api::update_role(api_base_url.as_str(), id, &input.draft).await,
                    None => api::create_role(api_base_url.as_str(), &input.draft).await,
                }
            };
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("role save cancelled");
                    return;
                }
                result = request => result,
            };

            match result {
                Ok(role) => {
                    updater.set(SaveRoleCompute {
                        status: SaveRoleStatus::Saved(role.clone()),
                    });
                    updater.merge::<RolesCompute, _>(RolesUpdate::Saved(role));
                }
                Err(err) => {
                    log::error!("saving role failed: {err}");
                    updater.set(SaveRoleCompute {
                        status: SaveRoleStatus::Failed(err.to_string()),
                    });
                }
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteRoleInput {
    pub id: u64,
}

impl State for DeleteRoleInput {
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
pub enum DeleteRoleStatus {
    #[default]
    Idle,
    Pending,
    Deleted(u64),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct DeleteRoleCompute {
    pub status: DeleteRoleStatus,
}

impl DeleteRoleCompute {
    pub fn is_pending(&self) -> bool {
        self.status == DeleteRoleStatus::Pending
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            DeleteRoleStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl Compute for DeleteRoleCompute {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn deps(&self) -> ComputeDeps {
        ComputeDeps::none()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Intentionally no-op; updated by DeleteRoleCommand.
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

#[derive(Debug, Default)]
pub struct DeleteRoleCommand;

impl Command for DeleteRoleCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: Updater,
        cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<DeleteRoleInput>().clone();
        let config = snap.state::<BusinessConfig>().clone();
        let cache = snap.compute::<DeleteRoleCompute>().clone();

        Box::pin(async move {
            if cache.is_pending() {
                log::warn!("role delete already in flight, skipping");
                return;
            }

            updater.set(DeleteRoleCompute {
                status: DeleteRoleStatus::Pending,
            });

            let api_base_url = config.api_url();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    log::info!("role delete cancelled");
                    return;
                }
                result = api::delete_role(api_base_url.as_str(), input.id) => result,
            };

            match result {
                Ok(()) => {
                    updater.set(DeleteRoleCompute {
                        status: DeleteRoleStatus::Deleted(input.id),
                    });
                    updater.merge::<RolesCompute, _>(RolesUpdate::Removed(input.id));
                }
                Err(err) => {
                    log::error!("deleting role {} failed: {err}", input.id);
                    updater.set(DeleteRoleCompute {
                        status: DeleteRoleStatus::Failed(err.to_string()),
                    });
                }
            }
        })
    }
}
