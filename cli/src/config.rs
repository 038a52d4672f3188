use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::ui;

pub const API_KEY_VAR: &str = "DOCUMATIC_API_KEY";
pub const LEGACY_API_KEY_VAR: &str = "DOCULOG_API_KEY";
pub const RUN_LOCALLY_VAR: &str = "DOCULOG_RUN_LOCALLY";

const CONFIG_FILE_NAME: &str = "doculog.toml";
const DEFAULT_CHANGELOG_NAME: &str = "CHANGELOG.md";
const DEFAULT_PROJECT_NAME: &str = "DefaultProject";

/// Resolved configuration, threaded into the document and the remote
/// gateway at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    pub changelog_name: String,
    pub project_name: String,
    pub local: bool,
    pub api_key: Option<String>,
}

/// Optional `doculog.toml` keys.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    project: Option<String>,
    changelog: Option<String>,
    local: Option<bool>,
}

/// Resolve configuration for a project root: `.env` file, `doculog.toml`,
/// then environment variables, with defaults for everything missing.
pub fn load(project_root: &Path) -> Config {
    let _ = dotenvy::from_path(project_root.join(".env"));

    let file = read_config_file(&project_root.join(CONFIG_FILE_NAME));

    let project_name = file
        .project
        .unwrap_or_else(|| default_project_name(project_root));

    let local = file.local.unwrap_or(false)
        || env::var(RUN_LOCALLY_VAR).is_ok_and(|value| value.eq_ignore_ascii_case("true"));

    Config {
        changelog_name: normalize_changelog_name(file.changelog),
        project_name,
        local,
        api_key: resolve_api_key(),
    }
}

fn read_config_file(path: &Path) -> ConfigFile {
    let Ok(content) = fs::read_to_string(path) else {
        return ConfigFile::default();
    };

    match toml::from_str(&content) {
        Ok(file) => file,
        Err(_) => {
            ui::warning_message(&format!("Could not parse {CONFIG_FILE_NAME}, using defaults"));
            ConfigFile::default()
        }
    }
}

fn normalize_changelog_name(name: Option<String>) -> String {
    let mut name = name.unwrap_or_else(|| DEFAULT_CHANGELOG_NAME.to_string());
    if !name.ends_with(".md") {
        name.push_str(".md");
    }
    name
}

fn default_project_name(project_root: &Path) -> String {
    fs::canonicalize(project_root)
        .ok()
        .and_then(|root| root.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
}

fn resolve_api_key() -> Option<String> {
    if let Ok(key) = env::var(API_KEY_VAR) {
        return Some(key);
    }

    if let Ok(key) = env::var(LEGACY_API_KEY_VAR) {
        ui::warning_message(&format!(
            "{LEGACY_API_KEY_VAR} is deprecated. Use {API_KEY_VAR} to set your api key instead."
        ));
        return Some(key);
    }

    ui::info_message(&format!(
        "Environment variable {API_KEY_VAR} not set. Advanced classification disabled."
    ));
    None
}
