//! # Prism Transport
//!
//! Proxy-aware outbound HTTP for Prism Config backends.
//!
//! - [`build_client`] turns per-scheme [`ProxySettings`] into a client for one
//!   of three topologies: direct, single proxy, or per-scheme routing with
//!   credentials keyed by proxy endpoint.
//! - [`ProxyAwareConnection`] is a single-shot request/response exchange with
//!   an explicit lifecycle and guaranteed resource release.
//! - [`ConnectionFactoryProvider`] serializes access to the active
//!   [`ProxyAwareConnectionFactory`] through [`TransportSession`]s.
//!
//! ## Example
//!
//! ```ignore
//! let provider = ConnectionFactoryProvider::new();
//! let mut session = provider.session().await;
//! session.install_client(build_client(&settings)?);
//!
//! let conn = session.open("https://git.example.com/config.git/info/refs").await?;
//! let status = conn.lock().await.status_code().await?;
//! session.drain().await;
//! ```

pub mod buffer;
pub mod client;
pub mod connection;
pub mod error;
pub mod factory;
pub mod provider;
pub mod settings;
pub mod topology;

pub use buffer::SpillBuffer;
pub use client::{DIRECT_CONNECTION_TTL, ProxyClient, build_client};
pub use connection::{ConnectionState, ProxyAwareConnection};
pub use error::{Result, TransportError};
pub use factory::{ProxyAwareConnectionFactory, SharedConnection};
pub use provider::{ConnectionFactoryProvider, TransportSession};
pub use settings::{ProxyHostSettings, ProxySettings};
pub use topology::{NonProxyHosts, ProxyCredentials, ProxyEndpoint, ProxyTopology};
