// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_CHANNEL_BUFFER_LEN, MIN_CHANNEL_BUFFER_LEN};
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Options for building and running a stage graph.
///
/// The stage configuration values are defined by the pipeline author; these
/// options only tune the runtime that hosts them.
///
/// # Fields
/// * `channel_buffer_len` - Capacity of each stage's input channel (minimum 1)
/// * `cancel_on_failure` - Cancel the remaining stages when one fails (defaults to true)
///
/// # Example
/// ```yaml
/// channel_buffer_len: 16
/// cancel_on_failure: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub channel_buffer_len: usize,
    pub cancel_on_failure: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            channel_buffer_len: DEFAULT_CHANNEL_BUFFER_LEN,
            cancel_on_failure: true,
        }
    }
}

impl GraphOptions {
    /// Parse options from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Channel capacity actually used: tokio channels cannot be unbuffered.
    pub fn effective_buffer_len(&self) -> usize {
        self.channel_buffer_len.max(MIN_CHANNEL_BUFFER_LEN)
    }
}

/// Load graph options from a YAML file
pub fn load_options<P: AsRef<Path>>(path: P) -> Result<GraphOptions, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    GraphOptions::from_yaml_str(&content)
}
