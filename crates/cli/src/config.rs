//! Proof's own user configuration: template-source abbreviations and the
//! clone cache location. Read from `~/.config/proof/config.toml` when
//! present. (The `--config-file` CLI flag is the *cookiecutter* user
//! config and is passed through to the generation engine untouched.)

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UserConfig {
    /// Where remote template repositories are cloned.
    pub cache_dir: Option<PathBuf>,
    /// `prefix` -> expansion with `{0}` standing for the rest of the
    /// template argument, e.g. `gh = "https://github.com/{0}.git"`.
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,
}

impl UserConfig {
    /// Effective clone cache directory.
    pub fn repos_dir(&self) -> PathBuf {
        let base = self
            .cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("proof")))
            .unwrap_or_else(|| PathBuf::from(".proof-cache"));
        base.join("repos")
    }

    /// Built-in abbreviations, overridable from the config file.
    pub fn abbreviation(&self, prefix: &str) -> Option<String> {
        if let Some(expansion) = self.abbreviations.get(prefix) {
            return Some(expansion.clone());
        }
        match prefix {
            "gh" => Some("https://github.com/{0}.git".to_owned()),
            "gl" => Some("https://gitlab.com/{0}.git".to_owned()),
            "bb" => Some("https://bitbucket.org/{0}".to_owned()),
            _ => None,
        }
    }
}

/// Load the config from the default location. A missing file is an empty
/// config; an unreadable or malformed file is an error string for the CLI
/// to report.
pub(crate) fn load_user_config() -> Result<UserConfig, String> {
    let Some(path) = dirs::config_dir().map(|d| d.join("proof").join("config.toml")) else {
        return Ok(UserConfig::default());
    };
    if !path.exists() {
        return Ok(UserConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| format!("could not read config '{}': {}", path.display(), e))?;
    toml::from_str(&raw).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}
