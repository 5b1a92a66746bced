//! Labels as Git references.

use std::fmt;

/// What a label names: a branch, a tag, or a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GitRef {
    Branch(String),
    Tag(String),
    /// A full 40-character commit SHA.
    Commit(String),
}

impl GitRef {
    pub fn branch(name: impl Into<String>) -> Self {
        Self::Branch(name.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Parses a label string into a GitRef.
    ///
    /// - 40-character hex string → Commit
    /// - `refs/tags/x` or `tags/x` → Tag
    /// - `refs/heads/x` or anything else → Branch
    pub fn parse(label: &str) -> Self {
        let label = label.trim();

        if label.len() == 40 && label.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::Commit(label.to_ascii_lowercase());
        }
        if let Some(tag) = label.strip_prefix("refs/tags/").or_else(|| label.strip_prefix("tags/")) {
            return Self::Tag(tag.to_string());
        }
        Self::Branch(label.strip_prefix("refs/heads/").unwrap_or(label).to_string())
    }

    /// Returns the reference name without prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Branch(name) | Self::Tag(name) | Self::Commit(name) => name,
        }
    }

    /// Ref names a remote may advertise for this label, most specific first.
    pub fn advertised_names(&self) -> Vec<String> {
        match self {
            Self::Branch(name) => vec![format!("refs/heads/{}", name)],
            Self::Tag(name) => vec![format!("refs/tags/{}^{{}}", name), format!("refs/tags/{}", name)],
            Self::Commit(_) => Vec::new(),
        }
    }

    /// Validates the reference name.
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.name();

        if name.is_empty() {
            return Err("reference name cannot be empty");
        }
        if name.starts_with('/') || name.ends_with('/') {
            return Err("reference name cannot start or end with '/'");
        }
        if name.contains("..") || name.contains("//") {
            return Err("reference name cannot contain '..' or '//'");
        }
        if name
            .chars()
            .any(|c| c.is_control() || " ~^:?*[\\".contains(c))
        {
            return Err("reference name contains invalid characters");
        }

        Ok(())
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(name) => write!(f, "{}", name),
            Self::Tag(name) => write!(f, "tags/{}", name),
            Self::Commit(sha) => write!(f, "{}", &sha[..8.min(sha.len())]),
        }
    }
}
