use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::layout::LayoutParams;
use crate::svg::SvgOptions;
use crate::tree::TreeOptions;

/// Settings read from `config.toml`. Every field has a default, so an empty or
/// partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutParams,
    pub svg: SvgOptions,
    pub tree: TreeConfig,
    pub share: ShareConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: LayoutParams {
                level_gap_x: 230.0,
                ..LayoutParams::default()
            },
            svg: SvgOptions::default(),
            tree: TreeConfig::default(),
            share: ShareConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub root_label: String,
    pub ranked_fallback: usize,
    pub extra_use_cases: usize,
    /// Cards shown when focusing a single domain.
    pub focus_limit: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        let t = TreeOptions::default();
        Self {
            root_label: t.root_label,
            ranked_fallback: t.ranked_fallback,
            extra_use_cases: t.extra_use_cases,
            focus_limit: 8,
        }
    }
}

impl TreeConfig {
    pub fn tree_options(&self, category_id: Option<String>, exec_mode: bool) -> TreeOptions {
        TreeOptions {
            root_label: self.root_label.clone(),
            category_id,
            exec_mode,
            ranked_fallback: self.ranked_fallback,
            extra_use_cases: self.extra_use_cases,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Base URL that share links are built on.
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "index.html".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "oppmap")
}

/// `<config dir>/oppmap/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<Utf8PathBuf> {
    let dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(dirs.config_dir().join("config.toml")).ok()
}

impl Config {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parse config TOML")
    }

    pub fn load_from(path: &Utf8Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
        Self::from_toml_str(&text).with_context(|| format!("load config {}", path))
    }

    /// Load `explicit` if given (it must exist), else the default path if it
    /// exists, else defaults.
    pub fn load(explicit: Option<&Utf8Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(%path, "loading config");
                Self::load_from(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("serialize config TOML")
    }
}
