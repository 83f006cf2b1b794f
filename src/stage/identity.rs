// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stage identity resolution.
//!
//! Identifiers are how edges find their stages, so every enabled stage needs
//! one. Two sources are consulted, in order:
//!
//! 1. the configuration value itself, when it implements [`Instancer`];
//! 2. the `node_id` annotation of the pipeline field that holds the value.
//!
//! The annotation lets a value that knows nothing about identifiers (for
//! example a config struct shared by two stages) be identified by its
//! position in the containing pipeline struct.

use std::fmt;

use serde::Deserialize;

use crate::errors::IdentityError;
use crate::stage::StageConfig;

/// Self-identification capability of a configuration value.
pub trait Instancer {
    fn id(&self) -> &str;
}

/// Convenience identifier to embed in configuration structs.
///
/// ```rust
/// use the_stagehand::stage::{Instance, Instancer, StageConfig};
///
/// struct Printer {
///     instance: Instance,
/// }
///
/// impl StageConfig for Printer {
///     fn as_instancer(&self) -> Option<&dyn Instancer> {
///         Some(&self.instance)
///     }
/// }
///
/// let printer = Printer { instance: Instance::from("printer") };
/// assert_eq!(the_stagehand::stage::resolve(&printer, None), Some("printer"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Instance(pub String);

impl Instance {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Instancer for Instance {
    fn id(&self) -> &str {
        &self.0
    }
}

impl StageConfig for Instance {
    fn as_instancer(&self) -> Option<&dyn Instancer> {
        Some(self)
    }
}

impl From<&str> for Instance {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Instance {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the identifier of a stage.
///
/// `annotation` is the `node_id` declared for the field holding `cfg`, if any.
/// Returns `None` when neither source yields an identifier. A self-reported
/// empty identifier is returned as-is; [`require_id`] rejects it.
pub fn resolve<'a, C>(cfg: &'a C, annotation: Option<&'a str>) -> Option<&'a str>
where
    C: StageConfig + ?Sized,
{
    match cfg.as_instancer() {
        Some(instancer) => Some(instancer.id()),
        None => annotation,
    }
}

/// Build-time form of [`resolve`]: missing and empty identifiers are errors.
pub fn require_id<C>(cfg: &C, annotation: Option<&str>, field: &str) -> Result<String, IdentityError>
where
    C: StageConfig + ?Sized,
{
    match resolve(cfg, annotation) {
        Some("") => Err(IdentityError::Empty {
            field: field.to_string(),
        }),
        Some(id) => Ok(id.to_string()),
        None => Err(IdentityError::Missing {
            field: field.to_string(),
        }),
    }
}
