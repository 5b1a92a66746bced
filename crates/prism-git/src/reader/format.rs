//! Configuration file formats.

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// JSON format (.json)
    Json,
    /// Java Properties format (.properties)
    Properties,
}

impl ConfigFormat {
    /// Returns all file extensions for this format, preferred first.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Yaml => &["yml", "yaml"],
            Self::Json => &["json"],
            Self::Properties => &["properties"],
        }
    }

    /// Returns all supported formats in lookup order.
    pub fn all() -> &'static [Self] {
        &[Self::Properties, Self::Yaml, Self::Json]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_order() {
        let extensions: Vec<&str> = ConfigFormat::all()
            .iter()
            .flat_map(|f| f.extensions().iter().copied())
            .collect();
        assert_eq!(extensions, vec!["properties", "yml", "yaml", "json"]);
    }
}
