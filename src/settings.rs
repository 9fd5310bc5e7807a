use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

const APP_SENTINEL: &str = "stashbrowse";

pub const DEFAULT_PAGE_SIZE: u32 = 40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "_app")]
    pub app: String,

    /// GraphQL endpoint of the catalog, e.g. `https://media.example.com/graphql`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphql_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: APP_SENTINEL.to_string(),
            graphql_url: None,
            api_key: None,
            per_page: None,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize settings")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        Ok(())
    }

    /// Endpoint resolution order: settings file, then environment.
    pub fn resolve_endpoint(&self) -> Option<String> {
        self.graphql_url
            .clone()
            .or_else(|| std::env::var("STASH_GRAPHQL_URL").ok())
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("STASH_API_KEY").ok())
    }

    pub fn page_size(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn validate(&self) -> Result<()> {
        if self.app != APP_SENTINEL {
            bail!(
                "Settings file appears to belong to another application (expected _app = '{}', found '{}')",
                APP_SENTINEL,
                self.app
            );
        }
        Ok(())
    }
}

pub fn config_dir(custom: Option<&PathBuf>) -> Option<PathBuf> {
    custom
        .cloned()
        .or_else(|| dirs::home_dir().map(|p| p.join(".config").join("stashbrowse")))
}

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join("settings.toml")
}

pub fn log_path(config_dir: &Path) -> PathBuf {
    config_dir.join("stashbrowse.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_returns_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.app, "stashbrowse");
        assert!(settings.graphql_url.is_none());
        assert_eq!(settings.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn load_valid_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        fs::write(
            &path,
            "_app = \"stashbrowse\"\ngraphql_url = \"https://media.example.com/graphql\"\nper_page = 25\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(
            settings.graphql_url.as_deref(),
            Some("https://media.example.com/graphql")
        );
        assert_eq!(settings.page_size(), 25);
    }

    #[test]
    fn wrong_sentinel_returns_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        fs::write(&path, "_app = \"other-app\"\n").unwrap();

        let result = Settings::load(&path);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("another application"));
    }

    #[test]
    fn save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("settings.toml");

        let settings = Settings {
            api_key: Some("k1".to_string()),
            ..Default::default()
        };

        settings.save(&path).unwrap();

        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("_app = \"stashbrowse\""));
        assert!(content.contains("api_key = \"k1\""));
    }

    #[test]
    fn round_trip_serialization() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");

        let original = Settings {
            graphql_url: Some("https://media.example.com/graphql".to_string()),
            per_page: Some(10),
            ..Default::default()
        };

        original.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();

        assert_eq!(loaded.graphql_url, original.graphql_url);
        assert_eq!(loaded.per_page, original.per_page);
    }

    #[test]
    fn config_dir_uses_custom_when_provided() {
        let custom = PathBuf::from("/custom/path");
        let result = config_dir(Some(&custom));
        assert_eq!(result, Some(PathBuf::from("/custom/path")));
    }

    #[test]
    fn config_dir_falls_back_to_default() {
        let result = config_dir(None);
        assert!(result.is_some());
        assert!(result.unwrap().ends_with("stashbrowse"));
    }
}
