// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

pub mod commands;
pub mod config;
pub mod error;
pub mod parse;
pub mod record;
pub mod render;
pub mod scontrol;
pub mod summary;

pub use error::{Error, Result};

/// Gets the path of the configuration file used when `--config` is not given.
pub fn default_config_path() -> String {
    match std::env::var("SSTATUS_CONFIG") {
        Ok(conf) => conf,
        Err(_) => "/etc/sstatus/sstatus.toml".to_string(),
    }
}
