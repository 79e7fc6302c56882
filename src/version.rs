//! Build information
//!
//! Release builds pass `TOPICSYNC_GIT_TAG`, `TOPICSYNC_GIT_COMMIT` and
//! `TOPICSYNC_GIT_BRANCH` through the compile environment. Local builds fall
//! back to the package version.

use std::fmt;

/// Version and build metadata of the running binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub git_tag: &'static str,
    pub git_commit: &'static str,
    pub git_branch: &'static str,
    pub os: &'static str,
    pub platform: &'static str,
}

impl VersionInfo {
    pub fn get() -> Self {
        Self {
            git_tag: option_env!("TOPICSYNC_GIT_TAG").unwrap_or(env!("CARGO_PKG_VERSION")),
            git_commit: option_env!("TOPICSYNC_GIT_COMMIT").unwrap_or("unknown"),
            git_branch: option_env!("TOPICSYNC_GIT_BRANCH").unwrap_or("unknown"),
            os: std::env::consts::OS,
            platform: std::env::consts::ARCH,
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (commit {}, branch {}, {}/{})",
            self.git_tag, self.git_commit, self.git_branch, self.os, self.platform
        )
    }
}
