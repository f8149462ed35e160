//! Run configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.repost/
//!   config.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function that touches the filesystem has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{config_io_err, ConfigError};

/// Placeholder the news link template substitutes with the post id.
pub const POST_ID_PLACEHOLDER: &str = "{0}";

/// List that holds site pages; field descriptors are looked up against it.
pub const DEFAULT_PAGES_LIST: &str = "Site Pages";

/// Settings consumed by the sync engine, plus the opaque connection settings
/// handed to the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_thumbprint: Option<String>,

    /// Content type assigned to every repost page.
    pub repost_content_type_id: String,
    /// Term set the post categories are resolved in.
    pub categories_term_set_id: String,
    /// URL used when a post has no permalink; `{0}` is replaced by the post id.
    pub news_link_template: String,
    #[serde(default = "default_pages_list")]
    pub pages_list: String,
}

fn default_pages_list() -> String {
    DEFAULT_PAGES_LIST.to_string()
}

impl AppConfig {
    /// Placeholder values written by `repost init`.
    pub fn starter() -> Self {
        Self {
            site_url: Some("https://contoso.sharepoint.com/sites/news".to_string()),
            client_id: None,
            tenant_id: None,
            certificate_thumbprint: None,
            repost_content_type_id: "0x0101009D1CB255DA76424F860D91F20E6C4118".to_string(),
            categories_term_set_id: "00000000-0000-0000-0000-000000000000".to_string(),
            news_link_template: "https://news.example.com/posts/{0}".to_string(),
            pages_list: default_pages_list(),
        }
    }

    /// Reject settings the engine cannot work without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repost_content_type_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "repost_content_type_id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.categories_term_set_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "categories_term_set_id",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.news_link_template.contains(POST_ID_PLACEHOLDER) {
            return Err(ConfigError::Invalid {
                field: "news_link_template",
                reason: format!("must contain the {POST_ID_PLACEHOLDER} placeholder"),
            });
        }
        if self.pages_list.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "pages_list",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Fallback source URL for a post without a permalink.
    pub fn source_url(&self, post_id: &str) -> String {
        self.news_link_template.replace(POST_ID_PLACEHOLDER, post_id)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.repost/config.yaml`; pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".repost").join("config.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load and validate a config file at an explicit path.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| config_io_err(path, e))?;
    let config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}

/// Load `<home>/.repost/config.yaml`.
pub fn load_at(home: &Path) -> Result<AppConfig, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<AppConfig, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<home>/.repost/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_path_at(home);
    let dir = home.join(".repost");
    std::fs::create_dir_all(&dir).map_err(|e| config_io_err(&dir, e))?;

    let yaml = serde_yaml::to_string(config)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| config_io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path).map_err(|e| config_io_err(&path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Write a starter config unless one already exists.
///
/// Idempotent: an existing file is loaded, validated and returned unchanged
/// unless `force` is set. The boolean reports whether a file was written.
pub fn init_at(home: &Path, force: bool) -> Result<(AppConfig, bool), ConfigError> {
    let path = config_path_at(home);
    if path.exists() && !force {
        return Ok((load_from(&path)?, false));
    }
    let config = AppConfig::starter();
    save_at(home, &config)?;
    Ok((config, true))
}

/// `init_at` convenience wrapper.
pub fn init(force: bool) -> Result<(AppConfig, bool), ConfigError> {
    init_at(&home()?, force)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| config_io_err(path, e))
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_url_substitutes_post_id() {
        let config = AppConfig::starter();
        assert_eq!(config.source_url("42"), "https://news.example.com/posts/42");
    }

    #[test]
    fn starter_config_is_valid() {
        AppConfig::starter().validate().unwrap();
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let config = AppConfig {
            news_link_template: "https://news.example.com/posts".to_string(),
            ..AppConfig::starter()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "news_link_template",
                ..
            }
        ));
    }

    #[test]
    fn pages_list_defaults_when_missing() {
        let yaml = "repost_content_type_id: 0x01\ncategories_term_set_id: ts\nnews_link_template: https://x/{0}\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.pages_list, DEFAULT_PAGES_LIST);
        assert!(config.site_url.is_none());
    }
}
