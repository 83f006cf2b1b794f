// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Binding between configuration values and runnable stages.
//!
//! A pipeline is described by plain, strongly typed configuration values. This
//! module decides, for each of them:
//!
//! * which identifier the stage answers to ([`identity`]),
//! * whether the stage takes part in the graph at all ([`enablement`]),
//! * which stage function it turns into ([`provider`]).
//!
//! Configuration types opt into the optional capabilities through
//! [`StageConfig`]. Both capabilities have a "does not implement" variant that
//! is the default, so the minimal configuration type is:
//!
//! ```rust
//! use the_stagehand::stage::StageConfig;
//!
//! struct Uppercase;
//! impl StageConfig for Uppercase {}
//! ```

pub mod enablement;
pub mod identity;
pub mod provider;

pub use enablement::{is_enabled, Enabler};
pub use identity::{require_id, resolve, Instance, Instancer};
pub use provider::{
    MiddleProvider, ProviderError, SourceMultiProvider, SourceProvider, TerminalProvider,
};

/// Capability probe implemented by every stage configuration type.
///
/// The default implementations report that the value implements neither
/// self-identification nor enablement. Override the probes to expose them:
///
/// ```rust
/// use the_stagehand::stage::{Enabler, Instancer, StageConfig};
///
/// struct Tail {
///     path: Option<String>,
/// }
///
/// impl Instancer for Tail {
///     fn id(&self) -> &str {
///         "tail"
///     }
/// }
///
/// impl Enabler for Tail {
///     fn enabled(&self) -> bool {
///         self.path.is_some()
///     }
/// }
///
/// impl StageConfig for Tail {
///     fn as_instancer(&self) -> Option<&dyn Instancer> {
///         Some(self)
///     }
///
///     fn as_enabler(&self) -> Option<&dyn Enabler> {
///         Some(self)
///     }
/// }
/// ```
pub trait StageConfig: Send + Sync + 'static {
    /// Self-identification capability, if the value carries its own identifier.
    fn as_instancer(&self) -> Option<&dyn Instancer> {
        None
    }

    /// Enablement capability, if the value can switch its stage off.
    fn as_enabler(&self) -> Option<&dyn Enabler> {
        None
    }
}

/// Position of a stage in the graph, given by the shape of its stage function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Source,
    SourceMulti,
    Middle,
    Terminal,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Source => "source",
            StageKind::SourceMulti => "source_multi",
            StageKind::Middle => "middle",
            StageKind::Terminal => "terminal",
        }
    }

    /// Whether the stage produces values, and therefore needs destinations.
    pub fn has_output(&self) -> bool {
        !matches!(self, StageKind::Terminal)
    }

    /// Whether the stage consumes values, and therefore may be a destination.
    pub fn has_input(&self) -> bool {
        matches!(self, StageKind::Middle | StageKind::Terminal)
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
