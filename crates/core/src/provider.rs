use crate::preferences::Preferences;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing API key: set {env_var} or save one in preferences")]
    MissingApiKey { env_var: &'static str },
}

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_base: String,
    pub upload_base: String,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            upload_base: "https://generativelanguage.googleapis.com/upload/v1beta".to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/files", self.upload_base)
    }

    /// `name` is the provider's resource name, e.g. `files/abc123`.
    pub fn file_url(&self, name: &str) -> String {
        format!("{}/{}", self.api_base, name)
    }
}

/// Resolve the API key, environment first, then stored preferences
pub fn resolve_api_key(prefs: &Preferences) -> Result<String, ProviderError> {
    pick_api_key(std::env::var(API_KEY_ENV_VAR).ok(), prefs)
}

fn pick_api_key(env_value: Option<String>, prefs: &Preferences) -> Result<String, ProviderError> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| prefs.api_key.clone().filter(|k| !k.trim().is_empty()))
        .ok_or(ProviderError::MissingApiKey {
            env_var: API_KEY_ENV_VAR,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_wins_over_stored_key() {
        let prefs = Preferences {
            api_key: Some("stored".to_string()),
            ..Preferences::default()
        };
        let key = pick_api_key(Some("from-env".to_string()), &prefs).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn blank_env_key_falls_back_to_preferences() {
        let prefs = Preferences {
            api_key: Some("stored".to_string()),
            ..Preferences::default()
        };
        assert_eq!(pick_api_key(Some("  ".to_string()), &prefs).unwrap(), "stored");
    }

    #[test]
    fn missing_key_names_the_env_var() {
        let err = pick_api_key(None, &Preferences::default()).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV_VAR));
    }

    #[test]
    fn urls_are_built_from_model() {
        let config = GeminiConfig::with_model("gemini-test");
        assert!(config.generate_url().ends_with("/models/gemini-test:generateContent"));
        assert!(config.file_url("files/abc").ends_with("/v1beta/files/abc"));
    }
}
