//! Shared utilities for the rbacctl workspace.

pub mod version_info;
