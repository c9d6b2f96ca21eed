use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerbaError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_index")]
    pub correction_index: String,
    #[serde(default = "default_interest")]
    pub interest_mode: String,
    #[serde(default)]
    pub admissao: String,
    #[serde(default)]
    pub demissao: String,
    /// Manual salary override, pt-BR formatted; empty means auto-detect.
    #[serde(default)]
    pub salario: String,
}

fn default_index() -> String {
    "SELIC".to_string()
}

fn default_interest() -> String {
    "1%_SIMPLE".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            correction_index: default_index(),
            interest_mode: default_interest(),
            admissao: String::new(),
            demissao: String::new(),
            salario: String::new(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("verba")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("verba")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| VerbaError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}
