//! Application/profile patterns that route queries to sub-repositories.

use glob::Pattern;

use crate::error::ConfigSourceError;

/// Glob patterns matched against `"{application}/{profile}"`.
///
/// A pattern without `/` matches every profile of the applications it names,
/// so `team-a-*` is read as `team-a-*/*`.
#[derive(Debug, Clone)]
pub struct RepoPatterns {
    patterns: Vec<Pattern>,
}

impl RepoPatterns {
    /// Compiles `raw`. A repository with no patterns matches its own name.
    pub fn new(name: &str, raw: &[String]) -> Result<Self, ConfigSourceError> {
        let mut sources: Vec<&str> = raw.iter().map(|p| p.trim()).filter(|p| !p.is_empty()).collect();
        if sources.is_empty() {
            sources.push(name);
        }

        let patterns = sources
            .into_iter()
            .map(|p| {
                let full = if p.contains('/') { p.to_string() } else { format!("{}/*", p) };
                Pattern::new(&full).map_err(|e| {
                    ConfigSourceError::InvalidConfig(format!("repository '{}' pattern '{}': {}", name, p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns true if any profile of the query matches any pattern.
    pub fn matches(&self, application: &str, profiles: &[String]) -> bool {
        profiles.iter().any(|profile| {
            let candidate = format!("{}/{}", application, profile);
            self.patterns.iter().any(|p| p.matches(&candidate))
        })
    }

    pub fn as_strs(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(raw: &[&str]) -> RepoPatterns {
        let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        RepoPatterns::new("repo", &raw).unwrap()
    }

    #[test]
    fn test_application_only_pattern_matches_any_profile() {
        let p = patterns(&["team-a-*"]);

        assert!(p.matches("team-a-billing", &["prod".to_string()]));
        assert!(!p.matches("team-b-billing", &["prod".to_string()]));
        assert_eq!(p.as_strs(), vec!["team-a-*/*"]);
    }

    #[test]
    fn test_profile_scoped_pattern() {
        let p = patterns(&["*/dev*"]);

        assert!(p.matches("anything", &["prod".to_string(), "development".to_string()]));
        assert!(!p.matches("anything", &["prod".to_string()]));
    }

    #[test]
    fn test_no_patterns_match_repository_name() {
        let p = RepoPatterns::new("billing", &[]).unwrap();

        assert!(p.matches("billing", &["default".to_string()]));
        assert!(!p.matches("orders", &["default".to_string()]));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = RepoPatterns::new("repo", &["[oops".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigSourceError::InvalidConfig(_)));
    }
}
