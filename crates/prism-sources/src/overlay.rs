//! Selective overrides between descriptors and handle settings.
//!
//! A zero value (empty string, empty list, `false`, `0`) means "not set" and
//! never replaces a value that is already there.

use std::path::PathBuf;

use prism_git::{ConfigSourceError, GitRepoSettings, default_basedir};

use crate::descriptor::{BackendDescriptor, BaseBackendFields, SubRepositoryDescriptor};
use crate::vault::VaultSettings;

fn overlay_str(target: &mut String, value: &str) {
    if !value.trim().is_empty() {
        *target = value.to_string();
    }
}

fn overlay_list(target: &mut Vec<String>, value: &[String]) {
    if !value.is_empty() {
        *target = value.to_vec();
    }
}

fn overlay_flag(target: &mut bool, value: bool) {
    if value {
        *target = true;
    }
}

fn overlay_port(target: &mut u16, value: u16) {
    if value > 0 {
        *target = value;
    }
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

impl BaseBackendFields {
    /// Copies every field `other` sets onto `self`.
    pub fn overlay(&mut self, other: &BaseBackendFields) {
        overlay_str(&mut self.uri, &other.uri);
        overlay_str(&mut self.username, &other.username);
        overlay_str(&mut self.password, &other.password);
        overlay_list(&mut self.search_paths, &other.search_paths);
        overlay_str(&mut self.basedir, &other.basedir);
        overlay_str(&mut self.default_label, &other.default_label);
        overlay_flag(&mut self.clone_on_start, other.clone_on_start);
        overlay_flag(&mut self.force_pull, other.force_pull);
    }

    /// Builds Git repository settings from the fields that are set.
    pub fn to_git_settings(&self) -> Result<GitRepoSettings, ConfigSourceError> {
        let mut builder = GitRepoSettings::builder()
            .uri(self.uri.trim())
            .search_paths(self.search_paths.clone())
            .clone_on_start(self.clone_on_start)
            .force_pull(self.force_pull);

        if let Some(dir) = non_blank(&self.basedir) {
            builder = builder.basedir(PathBuf::from(dir));
        }
        if let Some(label) = non_blank(&self.default_label) {
            builder = builder.default_label(label);
        }
        if let Some(username) = non_blank(&self.username) {
            builder = builder.username(username);
        }
        if let Some(password) = non_blank(&self.password) {
            builder = builder.password(password);
        }
        builder.build()
    }
}

impl SubRepositoryDescriptor {
    /// The parent's fields with this override's set fields on top.
    ///
    /// The basedir is never inherited: a sub-repository without its own
    /// gets `<parent basedir>/<name>`.
    pub fn resolve_against(&self, name: &str, parent: &BaseBackendFields) -> BaseBackendFields {
        let mut fields = parent.clone();
        fields.basedir.clear();
        fields.overlay(&self.base);

        if fields.basedir.trim().is_empty() {
            let parent_dir = match non_blank(&parent.basedir) {
                Some(dir) => PathBuf::from(dir),
                None => default_basedir(&parent.uri),
            };
            fields.basedir = parent_dir.join(name).to_string_lossy().into_owned();
        }
        fields
    }

    /// The declared name, falling back to the map key.
    pub fn name_or<'a>(&'a self, key: &'a str) -> &'a str {
        non_blank(&self.name).unwrap_or(key)
    }
}

impl VaultSettings {
    /// Copies every connection field `descriptor` sets.
    pub fn overlay(&mut self, descriptor: &BackendDescriptor) {
        overlay_str(&mut self.scheme, &descriptor.scheme);
        overlay_str(&mut self.host, &descriptor.host);
        overlay_port(&mut self.port, descriptor.port);
        overlay_str(&mut self.backend, &descriptor.backend);
        overlay_str(&mut self.default_key, &descriptor.default_key);
        if !descriptor.profile_separator.is_empty() {
            self.profile_separator = descriptor.profile_separator.clone();
        }
        if descriptor.kv_version > 0 {
            self.kv_version = descriptor.kv_version;
        }
        if let Some(token) = non_blank(&descriptor.token) {
            self.token = Some(token.to_string());
        }
    }

    pub fn from_descriptor(descriptor: &BackendDescriptor) -> Self {
        let mut settings = Self::default();
        settings.overlay(descriptor);
        settings
    }
}
