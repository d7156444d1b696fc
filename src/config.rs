// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::path::Path;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Config is the model for the optional sstatus configuration file. Every field has a default,
/// so an empty file (or no file at all) is a valid configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The `scontrol` executable to run.
    pub scontrol: String,
    /// When set, only nodes whose name matches this regular expression are summarized.
    pub compute_node_pattern: Option<String>,
    /// Digits after the decimal point when rendering floating point values.
    pub precision: usize,
    /// Columns that are left aligned in the ascii, mediawiki and motd formats; all others are
    /// right aligned.
    pub left_aligned_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scontrol: "scontrol".to_string(),
            compute_node_pattern: None,
            precision: 1,
            left_aligned_columns: ["name", "partitions", "Partition", "ratio"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load the configuration. An explicitly requested file must exist; the default file is
    /// optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_string(), true),
            None => (crate::default_config_path(), false),
        };

        if !explicit && !Path::new(&path).exists() {
            debug!("No config file at '{path}', using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            Error::configuration(format!("could not open config file '{path}': {e}"))
        })?;
        Self::from_toml(&contents)
            .map_err(|e| Error::configuration(format!("invalid config file '{path}': {e}")))
    }

    pub fn from_toml(contents: &str) -> std::result::Result<Self, String> {
        let config: Config = toml::from_str(contents).map_err(|e| e.to_string())?;
        config.compute_node_regex().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// The compiled `compute_node_pattern`, if any. The pattern must match the whole node name.
    pub fn compute_node_regex(&self) -> Result<Option<Regex>> {
        self.compute_node_pattern
            .as_ref()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                    Error::configuration(format!("invalid compute_node_pattern '{pattern}': {e}"))
                })
            })
            .transpose()
    }

    pub fn is_left_aligned(&self, column: &str) -> bool {
        self.left_aligned_columns.iter().any(|c| c == column)
    }
}
