//! # Prism Git Backend
//!
//! Git-based configuration source for Prism Config.
//!
//! ## Features
//!
//! - Pure Rust shallow bare clone via `gix`; HTTP remotes are fetched over
//!   the backend's proxy-aware connection factory
//! - Labels read straight from the resolved commit's tree
//! - Pattern-scoped sub-repositories (`team-a-*`, `*/dev`)
//! - Cheap staleness check through the remote's ref advertisement
//! - Spring Cloud Config file resolution with `{application}`, `{profile}`
//!   and `{label}` search path placeholders
//! - The [`ConfigSource`] contract every backend kind implements
//!
//! ## Example
//!
//! ```ignore
//! use prism_git::{ConfigQuery, ConfigSource, GitHandle, GitRepoSettings};
//!
//! let settings = GitRepoSettings::builder()
//!     .uri("https://github.com/org/config-repo.git")
//!     .basedir("/var/lib/prism/config-repo")
//!     .build()?;
//! let handle = GitHandle::new("git[0]", settings, factory);
//!
//! let mut session = provider.session().await;
//! session.install(handle.connection_factory());
//! let snapshot = handle.fetch(&ConfigQuery::new("myapp", vec!["dev"]), &session).await?;
//! session.drain().await;
//! ```

pub mod backend;
pub mod error;
pub mod pattern;
pub mod reader;
pub mod repository;
pub mod source;

// Re-exports
pub use backend::GitHandle;
pub use error::ConfigSourceError;
pub use pattern::RepoPatterns;
pub use reader::{ConfigFileResolver, ConfigFormat, ConfigParser, FileTree};
pub use repository::{
    GitRef, GitRepoSettings, GitRepoSettingsBuilder, GitRepository, RemoteRefs, default_basedir,
};
pub use source::{ConfigQuery, ConfigSnapshot, ConfigSource};

// Re-export prism_core for consumers
pub use prism_core;
