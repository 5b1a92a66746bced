//! Pure derivation of the proxy topology from settings.
//!
//! Kept separate from client construction so the decision (direct, single
//! proxy, or per-scheme routing) can be inspected without a network stack.

use std::collections::BTreeMap;
use std::fmt;

use glob::{MatchOptions, Pattern};
use reqwest::Url;
use tracing::warn;

use crate::settings::{ProxyHostSettings, ProxySettings};

/// Username and password for one proxy endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Hosts that bypass the proxy.
///
/// Patterns come from a `|`-separated list and are matched against the target
/// host case-insensitively; `*` and `?` are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonProxyHosts {
    patterns: Vec<Pattern>,
}

impl NonProxyHosts {
    pub fn parse(list: &str) -> Self {
        let patterns = list
            .split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter_map(|p| match Pattern::new(&p.to_ascii_lowercase()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = p, error = %e, "Ignoring invalid non-proxy host pattern");
                    None
                },
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    /// Returns true if requests to `host` must not use the proxy.
    pub fn matches(&self, host: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.patterns.iter().any(|p| p.matches_with(host, options))
    }
}

/// One forward proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
    pub credentials: Option<ProxyCredentials>,
    pub non_proxy_hosts: NonProxyHosts,
}

impl ProxyEndpoint {
    fn from_settings(settings: &ProxyHostSettings) -> Self {
        let credentials = settings.has_credentials().then(|| ProxyCredentials {
            username: settings.username.clone(),
            password: settings.password.clone(),
        });
        Self {
            host: settings.host.trim().to_string(),
            port: settings.port,
            credentials,
            non_proxy_hosts: NonProxyHosts::parse(&settings.non_proxy_hosts),
        }
    }

    /// Proxy URL without credentials, e.g. `http://proxy.local:3128`.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn key(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// The shape of the proxy configuration a client is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyTopology {
    /// No proxy; short-lived connections.
    Direct,
    /// One proxy set directly on the client for every target.
    Single(ProxyEndpoint),
    /// A proxy per target scheme, chosen per request, with one credential per
    /// distinct `(host, port)`.
    PerScheme {
        http: ProxyEndpoint,
        https: ProxyEndpoint,
        non_proxy_hosts: NonProxyHosts,
        credentials: BTreeMap<(String, u16), ProxyCredentials>,
    },
}

impl ProxyTopology {
    /// Derives the topology. Incomplete scopes are dropped with a warning.
    pub fn from_settings(settings: &ProxySettings) -> Self {
        let http = usable_scope("http", settings.http.as_ref());
        let https = usable_scope("https", settings.https.as_ref());

        match (http, https) {
            (None, None) => Self::Direct,
            (Some(only), None) | (None, Some(only)) => Self::Single(ProxyEndpoint::from_settings(only)),
            (Some(http), Some(https)) => {
                let http = ProxyEndpoint::from_settings(http);
                let https = ProxyEndpoint::from_settings(https);

                // HTTP scope wins on both exclusions and a shared endpoint's credentials.
                let non_proxy_hosts = if http.non_proxy_hosts.is_empty() {
                    https.non_proxy_hosts.clone()
                } else {
                    http.non_proxy_hosts.clone()
                };
                let mut credentials = BTreeMap::new();
                for endpoint in [&https, &http] {
                    if let Some(creds) = &endpoint.credentials {
                        credentials.insert(endpoint.key(), creds.clone());
                    }
                }

                Self::PerScheme {
                    http,
                    https,
                    non_proxy_hosts,
                    credentials,
                }
            },
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Single(_) => "single",
            Self::PerScheme { .. } => "per-scheme",
        }
    }

    /// The endpoint a request to `scheme://host` is routed through, if any.
    pub fn route(&self, scheme: &str, host: &str) -> Option<&ProxyEndpoint> {
        match self {
            Self::Direct => None,
            Self::Single(endpoint) => (!endpoint.non_proxy_hosts.matches(host)).then_some(endpoint),
            Self::PerScheme {
                http,
                https,
                non_proxy_hosts,
                ..
            } => {
                if non_proxy_hosts.matches(host) {
                    return None;
                }
                match scheme {
                    "http" => Some(http),
                    "https" => Some(https),
                    _ => None,
                }
            },
        }
    }

    /// Full proxy URL, credentials included as userinfo, for a request to
    /// `scheme://host`. `None` means "connect directly".
    pub fn proxy_url(&self, scheme: &str, host: &str) -> Option<Url> {
        let endpoint = self.route(scheme, host)?;
        let credentials = match self {
            Self::PerScheme { credentials, .. } => credentials.get(&endpoint.key()),
            _ => endpoint.credentials.as_ref(),
        };

        let mut url = Url::parse(&endpoint.url()).ok()?;
        if let Some(creds) = credentials {
            url.set_username(&creds.username).ok()?;
            url.set_password(Some(&creds.password)).ok()?;
        }
        Some(url)
    }
}

fn usable_scope<'a>(scheme: &str, scope: Option<&'a ProxyHostSettings>) -> Option<&'a ProxyHostSettings> {
    let scope = scope?;
    if scope.is_configured() {
        return Some(scope);
    }
    if !scope.is_blank() {
        warn!(
            scheme,
            host = %scope.host,
            port = scope.port,
            "Ignoring incomplete proxy settings"
        );
    }
    None
}
