//! HTTP client construction for each proxy topology.

use std::time::Duration;

use reqwest::{Client, Proxy, Url};
use tracing::info;

use crate::error::{Result, TransportError};
use crate::settings::ProxySettings;
use crate::topology::{ProxyEndpoint, ProxyTopology};

/// Idle lifetime and connect timeout of pooled connections when no proxy is set.
pub const DIRECT_CONNECTION_TTL: Duration = Duration::from_millis(500);

/// An HTTP client together with the topology it was built for.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    topology: ProxyTopology,
}

impl ProxyClient {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn topology(&self) -> &ProxyTopology {
        &self.topology
    }
}

/// Builds a client for the given proxy settings.
///
/// * no configured scope: direct connections with [`DIRECT_CONNECTION_TTL`]
/// * one scope: that proxy for every target, with basic auth when set
/// * both scopes: the proxy is picked per request from the target scheme and
///   credentials are looked up by the chosen proxy's `(host, port)`
pub fn build_client(settings: &ProxySettings) -> Result<ProxyClient> {
    let topology = ProxyTopology::from_settings(settings);

    let builder = Client::builder();
    let builder = match &topology {
        ProxyTopology::Direct => builder
            .no_proxy()
            .pool_idle_timeout(DIRECT_CONNECTION_TTL)
            .connect_timeout(DIRECT_CONNECTION_TTL),
        ProxyTopology::Single(endpoint) => builder.proxy(single_proxy(endpoint)?),
        ProxyTopology::PerScheme { .. } => builder.proxy(scheme_routing_proxy(&topology)),
    };

    let client = builder.build().map_err(TransportError::Client)?;

    match &topology {
        ProxyTopology::Direct => info!(topology = topology.kind(), "Built HTTP client"),
        ProxyTopology::Single(endpoint) => info!(
            topology = topology.kind(),
            proxy = %endpoint.url(),
            authenticated = endpoint.credentials.is_some(),
            "Built HTTP client"
        ),
        ProxyTopology::PerScheme {
            http,
            https,
            credentials,
            ..
        } => info!(
            topology = topology.kind(),
            http_proxy = %http.url(),
            https_proxy = %https.url(),
            credential_scopes = credentials.len(),
            "Built HTTP client"
        ),
    }

    Ok(ProxyClient { client, topology })
}

fn single_proxy(endpoint: &ProxyEndpoint) -> Result<Proxy> {
    let url = parse_proxy_url(&endpoint.url())?;
    let exclusions = endpoint.non_proxy_hosts.clone();

    let proxy = Proxy::custom(move |target| {
        let host = target.host_str().unwrap_or_default();
        (!exclusions.matches(host)).then(|| url.clone())
    });

    Ok(match &endpoint.credentials {
        Some(creds) => proxy.basic_auth(&creds.username, &creds.password),
        None => proxy,
    })
}

/// Per-request route planner: the target scheme picks the proxy, and the
/// proxy URL carries the credentials registered for its `(host, port)`.
fn scheme_routing_proxy(topology: &ProxyTopology) -> Proxy {
    let topology = topology.clone();
    Proxy::custom(move |target| {
        let host = target.host_str().unwrap_or_default();
        topology.proxy_url(target.scheme(), host)
    })
}

fn parse_proxy_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| TransportError::invalid_url(raw, e))
}
