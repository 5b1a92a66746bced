use serde::Deserialize;

/// Route parameters of `/{application}/{profiles}` and
/// `/{application}/{profiles}/{label}`.
#[derive(Debug, Deserialize)]
pub struct ConfigPath {
    pub application: String,
    pub profiles: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl ConfigPath {
    /// The label with Spring's `(_)` escape turned back into `/`.
    pub fn label(&self) -> Option<String> {
        self.label.as_ref().map(|l| l.replace("(_)", "/"))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.application.trim().is_empty() {
            return Err("Application name cannot be empty".to_string());
        }
        if self.profiles.trim().is_empty() {
            return Err("Profile cannot be empty".to_string());
        }
        if let Some(label) = self.label() {
            if label.contains("..") {
                return Err("Label cannot contain '..'".to_string());
            }
            if label.chars().any(|c| c.is_control()) {
                return Err("Label cannot contain control characters".to_string());
            }
        }
        Ok(())
    }
}
