// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod build;
mod config;
mod execution;
mod identity;

pub use build::BuildError;
pub use config::ConfigError;
pub use execution::{GraphError, StageError};
pub use identity::IdentityError;
