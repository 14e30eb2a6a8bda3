//! Build metadata, populated at compile time by `build.rs`.

/// Build date in RFC3339 format.
pub fn build_date() -> &'static str {
    env!("BUILD_DATE")
}

/// Short git commit hash of the build, or `"unknown"` outside a checkout.
pub fn build_commit() -> &'static str {
    env!("BUILD_COMMIT")
}

/// Package version.
pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
