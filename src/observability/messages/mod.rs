// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `builder` - graph assembly: enablement, binding, validation
//! * `runtime` - graph execution: start, stage exits, completion

pub mod builder;
pub mod runtime;

use tracing::Span;

/// A log message that knows its level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
