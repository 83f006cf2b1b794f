// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stage enablement.

use crate::stage::StageConfig;

/// Enablement capability of a configuration value.
///
/// A stage whose configuration reports `false` is left out of the graph: its
/// identifier is never resolved and its provider is never invoked. Useful for
/// configurations that are always present but only meaningful when e.g. a
/// property is set.
pub trait Enabler {
    fn enabled(&self) -> bool;
}

/// Whether the stage described by `cfg` belongs in the graph.
///
/// Values without the capability are always enabled.
pub fn is_enabled<C>(cfg: &C) -> bool
where
    C: StageConfig + ?Sized,
{
    cfg.as_enabler().map_or(true, |enabler| enabler.enabled())
}
