// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipewright contributors

//! Compiler configuration
//!
//! Settings resolve in layers: built-in defaults, then `pipewright.toml`,
//! then the environment, then command-line flags. Nothing is read from the
//! process environment unless a caller asks for it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::errors::PipewrightError;

/// Environment variable selecting the storage class of provisioned volumes
pub const STORAGE_CLASS_ENV: &str = "DEFAULT_STORAGE_CLASS";

/// Environment variable selecting the access mode of provisioned volumes
pub const ACCESS_MODES_ENV: &str = "DEFAULT_ACCESSMODES";

/// Default config file name
pub const CONFIG_FILE: &str = "pipewright.toml";

/// Target workflow format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowFormat {
    /// Tekton PipelineRun
    #[default]
    Tekton,
    /// Argo Workflow
    Argo,
}

impl std::fmt::Display for WorkflowFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tekton => write!(f, "tekton"),
            Self::Argo => write!(f, "argo"),
        }
    }
}

impl FromStr for WorkflowFormat {
    type Err = PipewrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tekton" => Ok(Self::Tekton),
            "argo" => Ok(Self::Argo),
            _ => Err(PipewrightError::invalid_config("format", s, &["tekton", "argo"])),
        }
    }
}

/// Persistent volume access mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum AccessMode {
    #[default]
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
    ReadWriteOncePod,
}

impl AccessMode {
    const NAMES: [&'static str; 4] = [
        "ReadWriteOnce",
        "ReadOnlyMany",
        "ReadWriteMany",
        "ReadWriteOncePod",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadWriteOnce => "ReadWriteOnce",
            Self::ReadOnlyMany => "ReadOnlyMany",
            Self::ReadWriteMany => "ReadWriteMany",
            Self::ReadWriteOncePod => "ReadWriteOncePod",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = PipewrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ReadWriteOnce" => Ok(Self::ReadWriteOnce),
            "ReadOnlyMany" => Ok(Self::ReadOnlyMany),
            "ReadWriteMany" => Ok(Self::ReadWriteMany),
            "ReadWriteOncePod" => Ok(Self::ReadWriteOncePod),
            other => Err(PipewrightError::invalid_config("access_mode", other, &Self::NAMES)),
        }
    }
}

/// Manifest compiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Target workflow format
    pub format: WorkflowFormat,

    /// Storage class of the shared pipeline volume
    pub storage_class: String,

    /// Access mode of the shared pipeline volume
    pub access_mode: AccessMode,

    /// Requested size of the shared pipeline volume
    pub volume_size: String,

    /// Image for components that do not declare one
    pub default_image: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            format: WorkflowFormat::default(),
            storage_class: "gp3".to_string(),
            access_mode: AccessMode::default(),
            volume_size: "2Gi".to_string(),
            default_image: None,
        }
    }
}

/// Layout of pipewright.toml
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    compiler: CompilerConfig,
}

impl CompilerConfig {
    /// Load the `[compiler]` table of a TOML config file
    pub fn load(path: &Path) -> Result<Self, PipewrightError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipewrightError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Self::from_toml(&content)
    }

    /// Parse the `[compiler]` table from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, PipewrightError> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.compiler)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, PipewrightError> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply storage overrides from an environment lookup
    ///
    /// Unset or blank variables leave the current value in place.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, PipewrightError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(storage_class) = lookup(STORAGE_CLASS_ENV) {
            self.storage_class = storage_class.trim().to_string();
        }
        if let Some(access_mode) = lookup(ACCESS_MODES_ENV) {
            self.access_mode = access_mode.parse()?;
        }

        Ok(self)
    }
}
