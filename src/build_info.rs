/// Build-time git commit SHA stamped by build.rs when available.
pub fn git_sha() -> Option<&'static str> {
    option_env!("PLANPILOT_BUILD_GIT_SHA")
}

/// Crate version as reported by `planpilot status`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
