//! Ref advertisement probe for smart-HTTP remotes.
//!
//! Asking `info/refs` is far cheaper than a fetch and tells whether the local
//! clone is behind. The request goes through the active connection factory,
//! so it honours the backend's proxy settings.

use prism_transport::TransportSession;
use tracing::debug;

use super::{GitRef, GitRepoSettings};
use crate::error::ConfigSourceError;

/// Refs advertised by a remote, in advertisement order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteRefs {
    refs: Vec<(String, String)>,
}

impl RemoteRefs {
    /// Parses a pkt-line encoded `git-upload-pack` advertisement.
    pub fn parse(body: &[u8]) -> Result<Self, ConfigSourceError> {
        let mut refs = Vec::new();
        let mut rest = body;

        while !rest.is_empty() {
            let header = rest
                .get(..4)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| usize::from_str_radix(h, 16).ok())
                .ok_or_else(|| ConfigSourceError::parse("info/refs", "malformed pkt-line length"))?;

            if header == 0 {
                rest = &rest[4..];
                continue;
            }
            if header < 4 || header > rest.len() {
                return Err(ConfigSourceError::parse("info/refs", "truncated pkt-line"));
            }

            let payload = &rest[4..header];
            rest = &rest[header..];

            let line = payload.strip_suffix(b"\n").unwrap_or(payload);
            let line = line.split(|b| *b == 0).next().unwrap_or_default();
            let Ok(line) = std::str::from_utf8(line) else {
                continue;
            };
            if let Some((oid, name)) = line.split_once(' ')
                && oid.len() == 40
                && oid.chars().all(|c| c.is_ascii_hexdigit())
            {
                refs.push((name.to_string(), oid.to_string()));
            }
        }

        Ok(Self { refs })
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// The commit the remote advertises for `git_ref`, if any.
    pub fn commit_for(&self, git_ref: &GitRef) -> Option<&str> {
        if let GitRef::Commit(sha) = git_ref {
            return self
                .refs
                .iter()
                .find(|(_, oid)| oid == sha)
                .map(|(_, oid)| oid.as_str());
        }
        git_ref.advertised_names().iter().find_map(|wanted| {
            self.refs
                .iter()
                .find(|(name, _)| name == wanted)
                .map(|(_, oid)| oid.as_str())
        })
    }
}

/// Fetches the ref advertisement of an `http(s)` remote.
pub async fn probe_remote_refs(
    session: &TransportSession<'_>,
    settings: &GitRepoSettings,
) -> Result<RemoteRefs, ConfigSourceError> {
    let url = format!(
        "{}/info/refs?service=git-upload-pack",
        settings.uri().trim_end_matches('/')
    );

    let connection = session.open(&url).await?;
    let mut connection = connection.lock().await;
    connection.set_request_property("Accept", "application/x-git-upload-pack-advertisement")?;
    connection.set_read_timeout(settings.fetch_timeout())?;
    if let Some((username, password)) = settings.credentials() {
        connection.set_basic_auth(username, password)?;
    }

    let status = connection.status_code().await?;
    if !(200..300).contains(&status) {
        return Err(ConfigSourceError::remote_status(url, status));
    }

    let refs = RemoteRefs::parse(connection.body().await?)?;
    debug!(uri = %settings.uri(), refs = refs.len(), "Probed remote refs");
    Ok(refs)
}
