use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_DIR_NAME: &str = "todoweb";
const CONFIG_ENV_VAR: &str = "TODOWEB_CONFIG_PATH";
pub const API_URL_ENV_VAR: &str = "TODOWEB_API_URL";
pub const DESKTOP_NOTIFICATIONS_ENV_VAR: &str = "TODOWEB_DESKTOP_NOTIFICATIONS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Plain,
    Noir,
    Solarized,
}

impl Theme {
    /// Maps user spellings (`Dark-Mode`, `light`, ...) onto a theme.
    /// Unknown names fall back to plain output.
    pub fn from_name(raw: &str) -> Self {
        match canonical_name(raw).as_str() {
            "noir" | "dark" | "dark_mode" | "darkmode" => Self::Noir,
            "solarized" => Self::Solarized,
            _ => Self::Plain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "default",
            Self::Noir => "noir",
            Self::Solarized => "solarized",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Plain => Palette::default(),
            Self::Noir => Palette {
                accent: "\x1b[38;5;208m",
                muted: "\x1b[38;5;250m",
                alert: "\x1b[38;5;203m",
                reset: "\x1b[0m",
            },
            Self::Solarized => Palette {
                accent: "\x1b[38;5;108m",
                muted: "\x1b[38;5;245m",
                alert: "\x1b[38;5;160m",
                reset: "\x1b[0m",
            },
        }
    }
}

fn canonical_name(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

/// Terminal colors. Every field is empty for the plain theme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub alert: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        self.wrap(self.accent, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.wrap(self.muted, text)
    }

    pub fn alertize(&self, text: &str) -> String {
        self.wrap(self.alert, text)
    }

    fn wrap(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub desktop_notifications: bool,
}

impl Config {
    pub fn theme(&self) -> Theme {
        self.theme.as_deref().map(Theme::from_name).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub theme: Option<String>,
    pub desktop_notifications: Option<bool>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }
}

/// Never fails: problems are reported next to a default config.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config(config))
}

fn normalize_config(mut config: Config) -> Config {
    config.api_url = non_blank(config.api_url);
    config.theme = config
        .theme
        .map(|name| Theme::from_name(&name).name().to_string());
    config
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Applies environment variables on top of the file config.
pub fn apply_env(base: &Config) -> Config {
    let overrides = ConfigOverrides {
        api_url: std::env::var(API_URL_ENV_VAR).ok(),
        theme: None,
        desktop_notifications: std::env::var(DESKTOP_NOTIFICATIONS_ENV_VAR)
            .ok()
            .map(|value| parse_flag(&value)),
    };
    merge_overrides(base, &overrides)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(api_url) = non_blank(overrides.api_url.clone()) {
        merged.api_url = Some(api_url);
    }

    if let Some(theme) = overrides.theme.as_ref() {
        merged.theme = Some(Theme::from_name(theme).name().to_string());
    }

    if let Some(enabled) = overrides.desktop_notifications {
        merged.desktop_notifications = enabled;
    }

    merged
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// The configured API base, or an error telling the user how to set one.
pub fn require_api_url(config: &Config) -> Result<&str, AppError> {
    config.api_url.as_deref().ok_or_else(|| {
        AppError::invalid_input(format!(
            "api_url is not configured (use --api-url, {API_URL_ENV_VAR} or the config file)"
        ))
    })
}
