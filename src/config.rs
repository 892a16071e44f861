//! # Configuration Module
//!
//! Loads the editor configuration from a TOML file and provides the
//! defaults used when the file is missing or cannot be parsed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub server: ServerSettings,
    pub layout: LayoutSettings,
    pub workspace: WorkspaceSettings,
    pub persistence: PersistenceSettings,
}

/// Connection settings for the remote file service
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

/// Tab strip geometry, in pixels
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutSettings {
    pub min_tab_width: u32,
    pub tab_extra_width: u32,
    pub max_title_width: u32,
    pub max_tab_number: usize,
    /// Width available to the tab strip until the host reports its own.
    pub tab_bar_width: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Absolute working directory of the runner.
    pub workdir: String,
    /// Absolute directory of the current project, below `workdir`.
    pub project_dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PersistenceSettings {
    pub store_path: PathBuf,
    pub tab_list_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            layout: LayoutSettings::default(),
            workspace: WorkspaceSettings::default(),
            persistence: PersistenceSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:50000".to_string(),
            request_timeout_secs: 30,
            user_agent: "WorkspaceEditorShell/1.0".to_string(),
        }
    }
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            min_tab_width: 61,
            tab_extra_width: 25,
            max_title_width: 126,
            max_tab_number: 10,
            tab_bar_width: 800,
        }
    }
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            workdir: "/srv/runner/workspace".to_string(),
            project_dir: "/srv/runner/workspace/slapos".to_string(),
        }
    }
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("editor-store.json"),
            tab_list_debounce_ms: 2000,
        }
    }
}

impl WorkspaceSettings {
    /// Tree root of the current project, e.g. `workspace/slapos`.
    pub fn current_project(&self) -> String {
        let relative = self.project_dir.replacen(&self.workdir, "", 1);
        let project = relative.split('/').nth(1).unwrap_or_default();
        format!("workspace/{}", project)
    }
}

/// Parses a configuration file.
pub fn read_config(path: &Path) -> Result<EditorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Loads configuration from `path`, falling back to the defaults.
pub fn load_config(path: &Path) -> EditorConfig {
    match read_config(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{:#}, using default configuration", e);
            EditorConfig::default()
        }
    }
}
