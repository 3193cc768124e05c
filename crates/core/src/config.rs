//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body in bytes, applied to raw and form uploads.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_size() -> usize {
    crate::DEFAULT_MAX_UPLOAD_SIZE
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_size: default_max_upload_size(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_size == 0 {
            return Err("server.max_upload_size must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/storage"),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { path } if path.as_os_str().is_empty() => {
                Err("filesystem storage requires a non-empty path".to_string())
            }
            StorageConfig::Filesystem { .. } => Ok(()),
        }
    }
}

/// Repository policy configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Replace existing artifacts on upload instead of rejecting with a conflict.
    #[serde(default)]
    pub allow_overwrite: bool,
    /// Multipart field carrying the chart package.
    #[serde(default = "default_chart_form_field")]
    pub chart_form_field: String,
    /// Multipart field carrying the provenance file.
    #[serde(default = "default_prov_form_field")]
    pub prov_form_field: String,
    /// Do not register the DELETE route.
    #[serde(default)]
    pub disable_delete: bool,
}

fn default_chart_form_field() -> String {
    "chart".to_string()
}

fn default_prov_form_field() -> String {
    "prov".to_string()
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            allow_overwrite: false,
            chart_form_field: default_chart_form_field(),
            prov_form_field: default_prov_form_field(),
            disable_delete: false,
        }
    }
}

impl RepoConfig {
    /// Validate repository configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.chart_form_field.trim().is_empty() {
            return Err("repo.chart_form_field cannot be empty".to_string());
        }
        if self.prov_form_field.trim().is_empty() {
            return Err("repo.prov_form_field cannot be empty".to_string());
        }
        if self.chart_form_field == self.prov_form_field {
            return Err(format!(
                "repo.chart_form_field and repo.prov_form_field must differ (both are {:?})",
                self.chart_form_field
            ));
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Repository policy.
    #[serde(default)]
    pub repo: RepoConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage under `./data/storage`;
    /// tests normally swap in their own store.
    pub fn for_testing() -> Self {
        Self::default()
    }

    /// Validate every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.repo.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.max_upload_size, 20 * 1024 * 1024);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_repo_config_defaults() {
        let config = RepoConfig::default();
        assert!(!config.allow_overwrite);
        assert!(!config.disable_delete);
        assert_eq!(config.chart_form_field, "chart");
        assert_eq!(config.prov_form_field, "prov");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_repo_config_deserialize_partial() {
        let json = r#"{"allow_overwrite": true}"#;
        let config: RepoConfig = serde_json::from_str(json).unwrap();
        assert!(config.allow_overwrite);
        assert_eq!(config.chart_form_field, "chart");
    }

    #[test]
    fn test_repo_config_rejects_identical_fields() {
        let config = RepoConfig {
            prov_form_field: "chart".to_string(),
            ..RepoConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_repo_config_rejects_empty_fields() {
        let config = RepoConfig {
            chart_form_field: " ".to_string(),
            ..RepoConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_config_roundtrip() {
        let json = r#"{"type": "filesystem", "path": "/var/lib/charts"}"#;
        let config: StorageConfig = serde_json::from_str(json).unwrap();
        let StorageConfig::Filesystem { path } = &config;
        assert_eq!(path, &PathBuf::from("/var/lib/charts"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_for_testing_is_valid() {
        assert!(AppConfig::for_testing().validate().is_ok());
    }
}
