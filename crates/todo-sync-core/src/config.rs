use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = ".todo-sync.yaml";

pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";
pub const API_URL_VAR: &str = "GITHUB_API_URL";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub caps `per_page` at 100.
pub const MAX_PER_PAGE: u32 = 100;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SourcesConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_suffix() -> String {
    "TODO.md".to_string()
}

fn default_exclude() -> Vec<String> {
    vec![
        ".git".to_string(),
        "target".to_string(),
        "node_modules".to_string(),
    ]
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            exclude: default_exclude(),
        }
    }
}

// ---------------------------------------------------------------------------
// TrackerSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_per_page() -> u32 {
    MAX_PER_PAGE
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncSettings
// ---------------------------------------------------------------------------

/// Project-level settings read from `.todo-sync.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub tracker: TrackerSettings,
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

impl SyncSettings {
    /// Load settings from `root`, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = settings_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: SyncSettings = serde_yaml::from_str(&data)?;
        Ok(settings)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.sources.suffix.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "sources.suffix is empty; every file would be treated as a TODO document"
                    .to_string(),
            });
        } else if !self.sources.suffix.ends_with(".md") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "sources.suffix '{}' does not end in .md",
                    self.sources.suffix
                ),
            });
        }

        if self.sources.exclude.iter().any(|e| e.trim().is_empty()) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "sources.exclude contains an empty entry".to_string(),
            });
        }

        if self.tracker.per_page == 0 || self.tracker.per_page > MAX_PER_PAGE {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "tracker.per_page={} is outside 1..={MAX_PER_PAGE}",
                    self.tracker.per_page
                ),
            });
        }

        warnings
    }

    /// Fail on the first error-level warning.
    pub fn ensure_valid(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|w| w.level == WarnLevel::Error)
        {
            Some(w) => Err(SyncError::InvalidSettings(w.message)),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// TrackerConfig
// ---------------------------------------------------------------------------

/// Credentials and target of the issue tracker.
#[derive(Clone)]
pub struct TrackerConfig {
    pub token: String,
    pub repository: String,
    pub api_url: String,
    pub per_page: u32,
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .field("api_url", &self.api_url)
            .field("per_page", &self.per_page)
            .finish()
    }
}

impl TrackerConfig {
    /// Build a config from already-resolved values.
    ///
    /// A missing or blank token/repository is reported by the name of the
    /// environment variable that would supply it.
    pub fn resolve(
        token: Option<String>,
        repository: Option<String>,
        api_url: Option<String>,
    ) -> Result<Self> {
        let token = non_blank(token).ok_or(SyncError::MissingSetting(TOKEN_VAR))?;
        let repository = non_blank(repository).ok_or(SyncError::MissingSetting(REPOSITORY_VAR))?;
        validate_repository(&repository)?;
        let api_url = non_blank(api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            token,
            repository,
            api_url,
            per_page: MAX_PER_PAGE,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::resolve(
            std::env::var(TOKEN_VAR).ok(),
            std::env::var(REPOSITORY_VAR).ok(),
            std::env::var(API_URL_VAR).ok(),
        )
    }

    pub fn with_settings(mut self, settings: &TrackerSettings) -> Self {
        self.per_page = settings.per_page;
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_repository(repository: &str) -> Result<()> {
    let mut parts = repository.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    );
    if valid {
        Ok(())
    } else {
        Err(SyncError::InvalidRepository(repository.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = SyncSettings::load(dir.path()).unwrap();
        assert_eq!(settings, SyncSettings::default());
        assert_eq!(settings.sources.suffix, "TODO.md");
        assert_eq!(settings.tracker.per_page, 100);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            settings_path(dir.path()),
            "sources:\n  exclude: [vendor]\n",
        )
        .unwrap();
        let settings = SyncSettings::load(dir.path()).unwrap();
        assert_eq!(settings.sources.exclude, vec!["vendor"]);
        assert_eq!(settings.sources.suffix, "TODO.md");
        assert_eq!(settings.tracker.per_page, 100);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(settings_path(dir.path()), "tracker:\n  per_page: lots\n").unwrap();
        assert!(matches!(
            SyncSettings::load(dir.path()),
            Err(SyncError::Yaml(_))
        ));
    }

    #[test]
    fn validate_defaults_clean() {
        assert!(SyncSettings::default().validate().is_empty());
    }

    #[test]
    fn validate_per_page_bounds() {
        let mut settings = SyncSettings::default();
        settings.tracker.per_page = 0;
        let w = settings.validate();
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].level, WarnLevel::Error);
        assert!(settings.ensure_valid().is_err());

        settings.tracker.per_page = 250;
        assert!(settings.ensure_valid().is_err());
    }

    #[test]
    fn validate_suffix() {
        let mut settings = SyncSettings::default();
        settings.sources.suffix = "TODO.txt".to_string();
        let w = settings.validate();
        assert_eq!(w[0].level, WarnLevel::Warning);
        assert!(settings.ensure_valid().is_ok());

        settings.sources.suffix = " ".to_string();
        assert!(settings.ensure_valid().is_err());
    }

    #[test]
    fn resolve_requires_token_then_repository() {
        let err = TrackerConfig::resolve(None, Some("a/b".into()), None).unwrap_err();
        assert!(matches!(err, SyncError::MissingSetting("GITHUB_TOKEN")));

        let err = TrackerConfig::resolve(Some("t".into()), Some("  ".into()), None).unwrap_err();
        assert!(matches!(err, SyncError::MissingSetting("GITHUB_REPOSITORY")));
    }

    #[test]
    fn resolve_rejects_bad_repository() {
        for bad in ["widgets", "acme/", "/widgets", "acme/widgets/extra"] {
            let err = TrackerConfig::resolve(Some("t".into()), Some(bad.into()), None).unwrap_err();
            assert!(
                matches!(err, SyncError::InvalidRepository(_)),
                "expected invalid: {bad}"
            );
        }
    }

    #[test]
    fn resolve_defaults_api_url() {
        let cfg = TrackerConfig::resolve(Some("t".into()), Some("acme/widgets".into()), None)
            .unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.per_page, 100);

        let cfg = TrackerConfig::resolve(
            Some("t".into()),
            Some("acme/widgets".into()),
            Some("https://ghe.example.com/api/v3/".into()),
        )
        .unwrap();
        assert_eq!(cfg.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = TrackerConfig::resolve(Some("ghp_secret".into()), Some("a/b".into()), None)
            .unwrap();
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("ghp_secret"));
    }
}
