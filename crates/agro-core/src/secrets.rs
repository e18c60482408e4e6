//! LLM credential resolution.
//!
//! The key is looked up in the process environment first, then in a TOML
//! secrets file (`GROQ_API_KEY = "..."`). Blank values count as missing.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::config::SecretsConfig;
use crate::error::{AgroError, Result};

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolve the credential from the real environment and the configured secrets file.
pub fn resolve_credential(config: &SecretsConfig) -> Option<ApiKey> {
    resolve_with(config, |name| std::env::var(name).ok())
}

/// Like [`resolve_credential`] but fails with `MissingCredential` when absent.
pub fn require_credential(config: &SecretsConfig) -> Result<ApiKey> {
    resolve_credential(config).ok_or_else(|| AgroError::MissingCredential {
        name: config.api_key_name.clone(),
    })
}

/// Resolve using an injectable environment lookup.
pub fn resolve_with<F>(config: &SecretsConfig, env: F) -> Option<ApiKey>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = env(&config.api_key_name).filter(|v| !v.trim().is_empty()) {
        debug!(name = %config.api_key_name, "Credential found in environment");
        return Some(ApiKey::new(value));
    }

    let path = Path::new(&config.secrets_file);
    match read_secrets_file(path, &config.api_key_name) {
        Ok(Some(value)) => {
            debug!(name = %config.api_key_name, path = %path.display(), "Credential found in secrets file");
            Some(ApiKey::new(value))
        }
        Ok(None) => None,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Secrets file not usable");
            None
        }
    }
}

fn read_secrets_file(path: &Path, name: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content)?;
    Ok(table
        .get(name)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|v| !v.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_file(path: &Path) -> SecretsConfig {
        SecretsConfig {
            api_key_name: "GROQ_API_KEY".to_string(),
            secrets_file: path.to_string_lossy().to_string(),
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_env_takes_priority() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "GROQ_API_KEY = \"from-file\"\n").unwrap();

        let key = resolve_with(&config_with_file(&path), |name| {
            (name == "GROQ_API_KEY").then(|| "from-env".to_string())
        })
        .unwrap();
        assert_eq!(key.expose(), "from-env");
    }

    #[test]
    fn test_falls_back_to_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "GROQ_API_KEY = \"  from-file  \"\n").unwrap();

        let key = resolve_with(&config_with_file(&path), no_env).unwrap();
        assert_eq!(key.expose(), "from-file");
    }

    #[test]
    fn test_blank_env_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let key = resolve_with(&config_with_file(&path), |_| Some("   ".to_string()));
        assert!(key.is_none());
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(resolve_with(&config_with_file(&path), no_env).is_none());
    }

    #[test]
    fn test_file_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "OTHER = \"x\"\n").unwrap();
        assert!(resolve_with(&config_with_file(&path), no_env).is_none());
    }

    #[test]
    fn test_malformed_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "GROQ_API_KEY = [[[").unwrap();
        assert!(resolve_with(&config_with_file(&path), no_env).is_none());
    }

    #[test]
    fn test_require_reports_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = SecretsConfig {
            api_key_name: "AGRO_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            secrets_file: dir.path().join("absent.toml").to_string_lossy().to_string(),
        };
        let err = require_credential(&config).unwrap_err();
        match err {
            AgroError::MissingCredential { name } => {
                assert_eq!(name, "AGRO_TEST_KEY_THAT_IS_NEVER_SET")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts() {
        let key = ApiKey::new("sk-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }
}
