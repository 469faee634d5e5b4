use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::sites::Site;

pub const CONFIG_FILE_NAME: &str = ".loctlrc.json";

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// SQLite database holding keys, values and groups, relative to the
    /// config file location.
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Published sites. Many sites may share a language; exactly one must
    /// be marked primary.
    #[serde(default)]
    pub sites: Vec<Site>,
    /// Template source roots. Entries may be literal directories or glob
    /// patterns expanding to directories (e.g. "themes/*/templates").
    #[serde(default = "default_template_roots")]
    pub template_roots: Vec<String>,
    /// Installed-module roots; any nested `templates` directory below one
    /// of these is scanned too.
    #[serde(default)]
    pub module_roots: Vec<String>,
    #[serde(default = "default_template_extensions")]
    pub template_extensions: Vec<String>,
    /// Groups hidden from listing and cleanup.
    #[serde(default)]
    pub inactive_groups: Vec<String>,
    /// Site language code -> provider language code (e.g. "es-ES" -> "es").
    #[serde(default)]
    pub language_map: HashMap<String, String>,
    /// Environment variable holding the Google Translate API key.
    #[serde(default = "default_api_key_env")]
    pub google_api_key_env: String,
}

fn default_database_path() -> String {
    "loctl.db".to_string()
}

fn default_template_roots() -> Vec<String> {
    vec!["themes".to_string()]
}

fn default_template_extensions() -> Vec<String> {
    vec!["htm".to_string(), "twig".to_string()]
}

fn default_api_key_env() -> String {
    "GOOGLE_TRANSLATE_API_KEY".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            sites: vec![
                Site {
                    id: 1,
                    language: "en".to_string(),
                    primary: true,
                },
                Site {
                    id: 2,
                    language: "de".to_string(),
                    primary: false,
                },
            ],
            template_roots: default_template_roots(),
            module_roots: vec!["modules".to_string()],
            template_extensions: default_template_extensions(),
            inactive_groups: Vec::new(),
            language_map: HashMap::new(),
            google_api_key_env: default_api_key_env(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Checks site id uniqueness, the single-primary invariant, and any
    /// glob patterns among the template roots.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for site in &self.sites {
            if !seen.insert(site.id) {
                bail!("Duplicate site id {} in 'sites'", site.id);
            }
            if site.language.trim().is_empty() {
                bail!("Site {} has an empty language code", site.id);
            }
        }

        if !self.sites.is_empty() {
            let primaries = self.sites.iter().filter(|s| s.primary).count();
            if primaries != 1 {
                bail!(
                    "Exactly one site must be marked primary, found {}",
                    primaries
                );
            }
        }

        // Roots without wildcards are treated as literal directory paths.
        for pattern in &self.template_roots {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'templateRoots': \"{}\"", pattern)
                })?;
            }
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory the config file was found in; paths inside the config are
    /// resolved against this. Falls back to the start directory.
    pub root: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start_dir.to_path_buf());
            Ok(ConfigLoadResult {
                config,
                root,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            root: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}
