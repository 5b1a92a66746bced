//! Local clone management using gix (pure Rust).

use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gix::protocol::transport::Protocol;
use gix::protocol::transport::client::Transport;
use gix::protocol::transport::client::http::Transport as HttpTransport;
use gix::remote::fetch::Shallow;
use gix::remote::{Direction, ref_map};
use parking_lot::RwLock;
use prism_transport::ProxyAwareConnectionFactory;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::transport::ProxiedHttp;
use super::{GitRef, GitRepoSettings};
use crate::error::ConfigSourceError;
use crate::reader::FileTree;

/// Remote refs mirrored into the local clone.
const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

/// State of the local clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoState {
    /// Repository has not been cloned yet.
    NotCloned,
    /// A clone is in progress.
    Cloning,
    /// Repository is ready for use.
    Ready,
    /// The last clone attempt failed.
    Error(String),
}

/// The local clone of one remote repository.
///
/// The clone is a shallow bare repository holding every branch and tag of the
/// remote; configuration is read straight from the commit a label resolves
/// to. A first clone is staged next to the base directory and moved into
/// place once complete, and refreshes fetch in place, so a failed network
/// operation never leaves a broken clone behind. Clones and fetches are
/// serialized per repository.
pub struct GitRepository {
    settings: GitRepoSettings,
    state: Arc<RwLock<RepoState>>,
    sync: Mutex<()>,
}

/// How to reach the remote from the blocking pool.
struct Endpoint {
    uri: String,
    http: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
    factory: Arc<ProxyAwareConnectionFactory>,
    runtime: Handle,
}

impl GitRepository {
    pub fn new(settings: GitRepoSettings) -> Self {
        let state = if is_repository(settings.basedir()) {
            RepoState::Ready
        } else {
            RepoState::NotCloned
        };

        Self {
            settings,
            state: Arc::new(RwLock::new(state)),
            sync: Mutex::new(()),
        }
    }

    pub fn state(&self) -> RepoState {
        self.state.read().clone()
    }

    pub fn settings(&self) -> &GitRepoSettings {
        &self.settings
    }

    pub fn basedir(&self) -> &Path {
        self.settings.basedir()
    }

    /// Checks if the repository exists locally.
    pub fn exists_locally(&self) -> bool {
        is_repository(self.basedir())
    }

    /// Clones the repository unless a clone already exists.
    ///
    /// HTTP traffic goes through connections opened on `factory`.
    pub async fn ensure_cloned(&self, factory: Arc<ProxyAwareConnectionFactory>) -> Result<(), ConfigSourceError> {
        let _guard = self.sync.lock().await;
        if self.exists_locally() {
            debug!(basedir = ?self.basedir(), "Repository already cloned");
            *self.state.write() = RepoState::Ready;
            return Ok(());
        }

        *self.state.write() = RepoState::Cloning;
        info!(uri = %self.settings.uri(), basedir = ?self.basedir(), "Cloning repository");

        let basedir = self.basedir().to_path_buf();
        let result = self
            .run_blocking(factory, self.settings.clone_timeout(), move |endpoint, interrupt| {
                clone_blocking(&basedir, &endpoint, &interrupt)
            })
            .await;

        match result {
            Ok(()) => {
                *self.state.write() = RepoState::Ready;
                info!(uri = %self.settings.uri(), "Repository cloned successfully");
                Ok(())
            },
            Err(e) => {
                warn!(uri = %self.settings.uri(), error = %e, "Clone failed");
                *self.state.write() = RepoState::Error(e.to_string());
                Err(e)
            },
        }
    }

    /// Fetches every branch and tag into the existing clone.
    ///
    /// On failure the clone is left as it was.
    pub async fn refresh(&self, factory: Arc<ProxyAwareConnectionFactory>) -> Result<(), ConfigSourceError> {
        if !self.exists_locally() {
            return self.ensure_cloned(factory).await;
        }

        let _guard = self.sync.lock().await;
        debug!(uri = %self.settings.uri(), "Fetching into local clone");

        let basedir = self.basedir().to_path_buf();
        self.run_blocking(factory, self.settings.fetch_timeout(), move |endpoint, interrupt| {
            let repo = open(&basedir)?;
            fetch_blocking(&repo, &endpoint, &interrupt)
        })
        .await
    }

    /// Runs `work` on the blocking pool, bounded by `timeout`.
    ///
    /// On timeout the work is interrupted and awaited before the error is
    /// returned, so it never outlives the caller's sync guard.
    async fn run_blocking<F>(
        &self,
        factory: Arc<ProxyAwareConnectionFactory>,
        timeout: Duration,
        work: F,
    ) -> Result<(), ConfigSourceError>
    where
        F: FnOnce(Endpoint, Arc<AtomicBool>) -> Result<(), ConfigSourceError> + Send + 'static,
    {
        let endpoint = Endpoint {
            uri: self.settings.uri().to_string(),
            http: self.settings.is_http_remote(),
            credentials: self
                .settings
                .credentials()
                .map(|(u, p)| (u.to_string(), p.to_string())),
            timeout: self.settings.fetch_timeout(),
            factory,
            runtime: Handle::current(),
        };
        let interrupt = Arc::new(AtomicBool::new(false));

        let flag = interrupt.clone();
        let mut task = tokio::task::spawn_blocking(move || work(endpoint, flag));
        match tokio::time::timeout(timeout, &mut task).await {
            Ok(joined) => joined.map_err(|e| ConfigSourceError::git(format!("Git task failed: {}", e)))?,
            Err(_) => {
                interrupt.store(true, Ordering::SeqCst);
                if let Err(e) = task.await {
                    warn!(uri = %self.settings.uri(), error = %e, "Interrupted git task failed");
                }
                Err(ConfigSourceError::Timeout {
                    seconds: timeout.as_secs(),
                })
            },
        }
    }

    /// Resolves a label to a commit id in the local clone.
    pub async fn resolve(&self, git_ref: &GitRef) -> Result<String, ConfigSourceError> {
        validate(git_ref)?;

        let basedir = self.basedir().to_path_buf();
        let git_ref = git_ref.clone();

        tokio::task::spawn_blocking(move || {
            let repo = open(&basedir)?;
            Ok(resolve_in(&repo, &git_ref)?.to_string())
        })
        .await
        .map_err(|e| ConfigSourceError::git(format!("Resolve task failed: {}", e)))?
    }

    /// Resolves a label and hands the files of that commit to `read`.
    ///
    /// Returns the commit id together with what `read` produced.
    pub async fn read_revision<F, T>(&self, git_ref: &GitRef, read: F) -> Result<(String, T), ConfigSourceError>
    where
        F: FnOnce(&dyn FileTree) -> Result<T, ConfigSourceError> + Send + 'static,
        T: Send + 'static,
    {
        validate(git_ref)?;

        let basedir = self.basedir().to_path_buf();
        let git_ref = git_ref.clone();

        tokio::task::spawn_blocking(move || {
            let repo = open(&basedir)?;
            let id = resolve_in(&repo, &git_ref)?;
            let tree = repo
                .find_object(id)
                .map_err(|e| ConfigSourceError::git(format!("Failed to read commit {}: {}", id, e)))?
                .peel_to_tree()
                .map_err(|e| ConfigSourceError::git(format!("Failed to read tree of {}: {}", id, e)))?;

            let value = read(&RevisionTree { tree })?;
            Ok((id.to_string(), value))
        })
        .await
        .map_err(|e| ConfigSourceError::git(format!("Read task failed: {}", e)))?
    }
}

fn is_repository(dir: &Path) -> bool {
    dir.join("HEAD").is_file() && dir.join("objects").is_dir()
}

fn open(basedir: &Path) -> Result<gix::Repository, ConfigSourceError> {
    gix::open(basedir).map_err(|e| ConfigSourceError::git(format!("Failed to open repo: {}", e)))
}

fn validate(git_ref: &GitRef) -> Result<(), ConfigSourceError> {
    git_ref
        .validate()
        .map_err(|e| ConfigSourceError::LabelNotFound(format!("{}: {}", git_ref.name(), e)))
}

/// Clones into a staging directory next to `basedir`, then moves it there.
fn clone_blocking(basedir: &Path, endpoint: &Endpoint, interrupt: &Arc<AtomicBool>) -> Result<(), ConfigSourceError> {
    let parent = basedir.parent().ok_or_else(|| {
        ConfigSourceError::InvalidConfig(format!("basedir {} has no parent", basedir.display()))
    })?;
    std::fs::create_dir_all(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".prism-clone-")
        .tempdir_in(parent)?;
    {
        let repo = gix::init_bare(staging.path())
            .map_err(|e| ConfigSourceError::git(format!("Failed to init repository: {}", e)))?;
        fetch_blocking(&repo, endpoint, interrupt)?;
    }

    let staged = staging.keep();
    if basedir.exists() {
        std::fs::remove_dir_all(basedir)?;
    }
    std::fs::rename(&staged, basedir)?;
    Ok(())
}

fn fetch_blocking(
    repo: &gix::Repository,
    endpoint: &Endpoint,
    interrupt: &Arc<AtomicBool>,
) -> Result<(), ConfigSourceError> {
    let url = gix::url::parse(endpoint.uri.as_str().into())
        .map_err(|e| ConfigSourceError::git(format!("Invalid URL: {}", e)))?;
    let remote = repo
        .remote_at(url.clone())
        .map_err(|e| ConfigSourceError::git(format!("Invalid remote: {}", e)))?
        .with_refspecs(FETCH_REFSPECS, Direction::Fetch)
        .map_err(|e| ConfigSourceError::git(format!("Invalid refspec: {}", e)))?;

    if endpoint.http {
        let http = ProxiedHttp::new(
            endpoint.factory.clone(),
            endpoint.runtime.clone(),
            endpoint.credentials.clone(),
            endpoint.timeout,
            interrupt.clone(),
        );
        let transport = HttpTransport::new_http(http, url, Protocol::V2, false);
        receive(remote.to_connection_with_transport(transport), interrupt)
    } else {
        let connection = remote
            .connect(Direction::Fetch)
            .map_err(|e| ConfigSourceError::git(format!("Failed to connect: {}", e)))?;
        receive(connection, interrupt)
    }
}

fn receive<T: Transport>(
    connection: gix::remote::Connection<'_, '_, T>,
    interrupt: &AtomicBool,
) -> Result<(), ConfigSourceError> {
    connection
        .prepare_fetch(gix::progress::Discard, ref_map::Options::default())
        .map_err(|e| ConfigSourceError::git(format!("Failed to list remote refs: {}", e)))?
        .with_shallow(Shallow::DepthAtRemote(NonZeroU32::MIN))
        .receive(gix::progress::Discard, interrupt)
        .map_err(|e| ConfigSourceError::git(format!("Fetch failed: {}", e)))?;
    Ok(())
}

fn resolve_in(repo: &gix::Repository, git_ref: &GitRef) -> Result<gix::ObjectId, ConfigSourceError> {
    let candidates = match git_ref {
        GitRef::Branch(name) => vec![
            format!("refs/remotes/origin/{}", name),
            format!("refs/heads/{}", name),
            format!("refs/tags/{}", name),
        ],
        GitRef::Tag(name) => vec![format!("refs/tags/{}", name)],
        GitRef::Commit(sha) => {
            let oid = gix::ObjectId::from_hex(sha.as_bytes())
                .map_err(|_| ConfigSourceError::LabelNotFound(sha.clone()))?;
            repo.find_object(oid)
                .map_err(|_| ConfigSourceError::LabelNotFound(sha.clone()))?;
            return Ok(oid);
        },
    };

    let reference = candidates
        .iter()
        .find_map(|name| repo.find_reference(name.as_str()).ok())
        .ok_or_else(|| ConfigSourceError::LabelNotFound(git_ref.name().to_string()))?;

    let id = reference
        .into_fully_peeled_id()
        .map_err(|e| ConfigSourceError::git(format!("Failed to peel reference: {}", e)))?;
    Ok(id.detach())
}

/// The files of one commit.
struct RevisionTree<'repo> {
    tree: gix::Tree<'repo>,
}

impl FileTree for RevisionTree<'_> {
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, ConfigSourceError> {
        let entry = self
            .tree
            .lookup_entry_by_path(path)
            .map_err(|e| ConfigSourceError::git(format!("Failed to look up {}: {}", path, e)))?;

        match entry {
            Some(entry) if entry.mode().is_blob() => {
                let object = entry
                    .object()
                    .map_err(|e| ConfigSourceError::git(format!("Failed to read {}: {}", path, e)))?;
                Ok(Some(object.detach().data))
            },
            _ => Ok(None),
        }
    }
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("uri", &self.settings.uri())
            .field("basedir", &self.settings.basedir())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_transport::ProxySettings;
    use tempfile::TempDir;

    fn settings(uri: &str, basedir: &Path) -> GitRepoSettings {
        GitRepoSettings::builder()
            .uri(uri)
            .basedir(basedir)
            .build()
            .unwrap()
    }

    fn factory() -> Arc<ProxyAwareConnectionFactory> {
        Arc::new(ProxyAwareConnectionFactory::from_settings(&ProxySettings::none()).unwrap())
    }

    #[test]
    fn test_new_repository() {
        let dir = TempDir::new().unwrap();
        let repo = GitRepository::new(settings("https://github.com/test/repo.git", &dir.path().join("clone")));

        assert_eq!(repo.state(), RepoState::NotCloned);
        assert!(!repo.exists_locally());
    }

    #[test]
    fn test_existing_clone_is_ready() {
        let dir = TempDir::new().unwrap();
        gix::init_bare(dir.path()).unwrap();

        let repo = GitRepository::new(settings("https://github.com/test/repo.git", dir.path()));
        assert_eq!(repo.state(), RepoState::Ready);
    }

    #[tokio::test]
    async fn test_clone_of_missing_remote_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-remote");
        let repo = GitRepository::new(settings(
            &format!("file://{}", missing.display()),
            &dir.path().join("clone"),
        ));

        let err = repo.ensure_cloned(factory()).await.unwrap_err();
        assert!(matches!(err, ConfigSourceError::Git(_)));
        assert!(matches!(repo.state(), RepoState::Error(_)));
        assert!(!dir.path().join("clone").exists());
    }

    #[tokio::test]
    async fn test_unknown_label_is_not_found() {
        let dir = TempDir::new().unwrap();
        gix::init_bare(dir.path()).unwrap();
        let repo = GitRepository::new(settings("https://github.com/test/repo.git", dir.path()));

        let err = repo.resolve(&GitRef::branch("nope")).await.unwrap_err();
        assert!(matches!(err, ConfigSourceError::LabelNotFound(_)));
    }
}
