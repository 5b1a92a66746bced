//! Configuration file resolution following Spring Cloud Config conventions.

use std::path::Path;

use prism_core::PropertySource;
use tracing::debug;

use super::{ConfigFormat, ConfigParser};
use crate::error::ConfigSourceError;
use crate::source::ConfigQuery;

/// Read access to the files of one revision.
///
/// Paths are relative and `/`-separated.
pub trait FileTree {
    /// Returns the content of the file at `path`, or `None` if there is no
    /// such file.
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, ConfigSourceError>;
}

/// A directory on disk.
impl FileTree for Path {
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, ConfigSourceError> {
        let full = self.join(path);
        if full.is_file() {
            Ok(Some(std::fs::read(full)?))
        } else {
            Ok(None)
        }
    }
}

/// Resolves and reads configuration files from a [`FileTree`].
///
/// For a query `myapp/dev,cloud` the files are consulted in this order,
/// highest precedence first:
///
/// 1. `myapp-cloud`, `myapp-dev`
/// 2. `myapp`
/// 3. `application-cloud`, `application-dev`
/// 4. `application`
///
/// Within one level, search paths are tried in their configured order. Each
/// file found becomes a property source named `<uri>/<relative path>`.
#[derive(Debug, Clone)]
pub struct ConfigFileResolver {
    search_paths: Vec<String>,
    source_prefix: String,
}

impl ConfigFileResolver {
    /// Creates a new file resolver.
    ///
    /// `source_prefix` is prepended to the relative path of every file read,
    /// usually the repository URI.
    pub fn new(search_paths: Vec<String>, source_prefix: impl Into<String>) -> Self {
        Self {
            search_paths,
            source_prefix: source_prefix.into(),
        }
    }

    /// Expands `{application}`, `{profile}` and `{label}` in the search paths.
    ///
    /// A path containing `{profile}` yields one entry per profile. The empty
    /// path (repository root) is always searched first.
    pub fn expand_search_paths(&self, query: &ConfigQuery, label: &str) -> Vec<String> {
        let mut expanded = vec![String::new()];

        for raw in &self.search_paths {
            let base = raw
                .replace("{application}", query.application())
                .replace("{label}", label);
            let candidates: Vec<String> = if base.contains("{profile}") {
                query
                    .profiles()
                    .iter()
                    .map(|p| base.replace("{profile}", p))
                    .collect()
            } else {
                vec![base]
            };

            for path in candidates {
                let path = path.trim_matches('/').to_string();
                if !expanded.contains(&path) {
                    expanded.push(path);
                }
            }
        }

        expanded
    }

    /// Resolves configuration for the given query, highest precedence first.
    pub fn resolve<T: FileTree + ?Sized>(
        &self,
        tree: &T,
        query: &ConfigQuery,
        label: &str,
    ) -> Result<Vec<PropertySource>, ConfigSourceError> {
        let search_paths = self.expand_search_paths(query, label);

        let mut names: Vec<(String, Option<&str>)> = Vec::new();
        for name in [query.application(), "application"] {
            if names.iter().any(|(n, _)| n == name) {
                continue;
            }
            for profile in query.profiles().iter().rev() {
                names.push((name.to_string(), Some(profile.as_str())));
            }
            names.push((name.to_string(), None));
        }

        let mut sources = Vec::new();
        for (name, profile) in &names {
            for search_path in &search_paths {
                if let Some(source) = self.try_read_config(tree, search_path, name, *profile)? {
                    sources.push(source);
                }
            }
        }

        debug!("Resolved {} property sources for {}", sources.len(), query);

        Ok(sources)
    }

    /// Tries to read a configuration file, returning None if not found.
    fn try_read_config<T: FileTree + ?Sized>(
        &self,
        tree: &T,
        dir: &str,
        name: &str,
        profile: Option<&str>,
    ) -> Result<Option<PropertySource>, ConfigSourceError> {
        let filename = match profile {
            Some(p) => format!("{}-{}", name, p),
            None => name.to_string(),
        };

        for format in ConfigFormat::all() {
            for ext in format.extensions() {
                let path = if dir.is_empty() {
                    format!("{}.{}", filename, ext)
                } else {
                    format!("{}/{}.{}", dir, filename, ext)
                };

                if let Some(bytes) = tree.read_file(&path)? {
                    debug!("Reading config file: {}", path);

                    let content = String::from_utf8(bytes)
                        .map_err(|e| ConfigSourceError::parse(&path, e.to_string()))?;
                    let config = ConfigParser::parse(&content, *format).map_err(|e| match e {
                        ConfigSourceError::Parse { reason, .. } => ConfigSourceError::parse(&path, reason),
                        other => other,
                    })?;
                    return Ok(Some(PropertySource::new(self.source_name(&path), config)));
                }
            }
        }

        Ok(None)
    }

    fn source_name(&self, path: &str) -> String {
        format!("{}/{}", self.source_prefix.trim_end_matches('/'), path)
    }
}
