//! # Prism Sources
//!
//! Wires declared backends into a composite and resolves queries against it.
//!
//! - [`BackendDescriptor`]: one entry of the `composite` configuration list
//! - [`BackendFactory`]: descriptors to live handles, with eager clones
//! - [`VaultHandle`]: secrets from a Vault KV engine
//! - [`CompositeResolver`]: ordered, first-key-wins resolution
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use prism_sources::{BackendFactory, CompositeResolver};
//! use prism_transport::ConnectionFactoryProvider;
//!
//! let handles = BackendFactory::new().build_all(&descriptors).await?;
//! let resolver = CompositeResolver::new(handles, Arc::new(ConnectionFactoryProvider::new()));
//! let snapshot = resolver.resolve("myapp", "dev,eu", None).await?;
//! ```

pub mod composite;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod overlay;
pub mod vault;

pub use composite::CompositeResolver;
pub use descriptor::{BackendDescriptor, BackendKind, BaseBackendFields, SubRepositoryDescriptor};
pub use error::CompositeError;
pub use factory::{BackendFactory, BackendHandle};
pub use vault::{VaultHandle, VaultSettings};
