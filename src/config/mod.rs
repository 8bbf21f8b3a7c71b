mod settings;

pub use settings::{ApiSettings, Config, PeopleSettings, ReportSettings};

use crate::error::{BizError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.bizdesk/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "bizdesk") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.bizdesk/
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        BizError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".bizdesk"))
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(BizError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(BizError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| BizError::ConfigParse { path, source: e })
}

/// Write the config directory with its template. Fails if it already exists.
pub fn init_config_dir(config_dir: &Path) -> Result<()> {
    if config_dir.exists() {
        return Err(BizError::AlreadyInitialized(config_dir.to_path_buf()));
    }
    fs::create_dir_all(config_dir)?;
    fs::write(config_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    Ok(())
}

fn token_path(config_dir: &Path) -> PathBuf {
    config_dir.join("token")
}

/// Read the stored bearer token, if any
pub fn load_token(config_dir: &Path) -> Result<Option<String>> {
    let path = token_path(config_dir);
    if !path.exists() {
        return Ok(None);
    }
    let token = fs::read_to_string(path)?.trim().to_string();
    Ok((!token.is_empty()).then_some(token))
}

pub fn save_token(config_dir: &Path, token: &str) -> Result<()> {
    if !config_dir.exists() {
        return Err(BizError::ConfigNotFound(config_dir.to_path_buf()));
    }
    fs::write(token_path(config_dir), token.trim())?;
    Ok(())
}

/// Remove the stored token. Returns false when there was none.
pub fn clear_token(config_dir: &Path) -> Result<bool> {
    let path = token_path(config_dir);
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:5000"
timeout_secs = 30

[people]
per_page = 5          # rows per page in 'bizdesk people'

[report]
# currency = "EUR"    # optional, currency id or name selected by default
"#;
