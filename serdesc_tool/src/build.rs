//! Provides constants about the build environment.

/// The cargo package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The git hash of the repo at the time of the build, or "&lt;unknown&gt;".
pub const GIT_HASH: &str = match option_env!("GIT_HASH") {
    Some(git_hash) => git_hash,
    None => "<unknown>",
};
