/// Editor configuration: load, save, and sanitize.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "PAGEPAD_CONFIG";

const CONFIG_FILE_NAME: &str = "pagepad.json";

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Rows shown at once.
    pub viewport_size: usize,
    /// Spaces per indentation level.
    pub indentation: usize,
    /// Lines per compressed chunk in paged mode. Always above `viewport_size`.
    pub chunk_size: usize,
    /// Files with more lines than this open paged.
    pub paging_threshold_lines: usize,
    /// Shown in place of lines whose chunk is still loading.
    pub placeholder: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport_size: 20,
            indentation: 4,
            chunk_size: 1000,
            paging_threshold_lines: 200_000,
            placeholder: "…".to_string(),
        }
    }
}

impl EditorConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `PAGEPAD_CONFIG`, if set and non-empty
    /// 2. `pagepad.json` beside the executable, if that file exists
    /// 3. `pagepad/pagepad.json` in the user's config directory
    /// 4. `pagepad.json` beside the executable
    pub fn config_path() -> PathBuf {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE_NAME)));
        resolve_config_path(
            std::env::var_os(CONFIG_ENV_VAR),
            beside_exe,
            dirs::config_dir(),
        )
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<EditorConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Broken files are left alone.
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e:#}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create config dir: {}", dir.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config: {}", path.display()))
    }

    /// Clamps values to valid ranges.
    ///
    /// Sizes are at least 1, and the chunk size is raised above the viewport
    /// size so a viewport never spans more than two chunks.
    pub fn sanitize(&mut self) {
        self.viewport_size = self.viewport_size.clamp(1, 10_000);
        self.indentation = self.indentation.clamp(1, 16);
        if self.chunk_size <= self.viewport_size {
            tracing::warn!(
                "chunk_size {} is not above viewport_size {}; raising it",
                self.chunk_size,
                self.viewport_size
            );
            self.chunk_size = self.viewport_size + 1;
        }
        if self.placeholder.is_empty() {
            self.placeholder = Self::default().placeholder;
        }
    }
}

fn resolve_config_path(
    env: Option<OsString>,
    beside_exe: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(path) = beside_exe.as_ref().filter(|p| p.exists()) {
        return path.clone();
    }
    config_dir
        .map(|d| d.join("pagepad").join(CONFIG_FILE_NAME))
        .or(beside_exe)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}
