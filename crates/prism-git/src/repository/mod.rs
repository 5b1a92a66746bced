//! Git repository management.
//!
//! Settings, label parsing, local clone handling, the smart-HTTP client
//! and the remote ref probe.

mod git_ops;
mod refs;
mod remote;
mod settings;
mod transport;

pub use git_ops::{GitRepository, RepoState};
pub use refs::GitRef;
pub use remote::{RemoteRefs, probe_remote_refs};
pub use settings::{GitRepoSettings, GitRepoSettingsBuilder, default_basedir};
