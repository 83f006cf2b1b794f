// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph assembly events.
//!
//! This module contains message types for logging events related to:
//! * Stages left out of the graph by their configuration
//! * Provider invocation (success and failure)
//! * Connections that point nowhere
//! * Completed graph assembly

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Stage left out of the graph.
///
/// # Log Level
/// `debug!` - Expected configuration outcome
///
/// # Example
/// ```
/// use the_stagehand::observability::messages::builder::StageSkipped;
///
/// let msg = StageSkipped {
///     field: "tail",
///     reason: "disabled by configuration",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct StageSkipped<'a> {
    pub field: &'a str,
    pub reason: &'a str,
}

impl Display for StageSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping stage in field '{}': {}", self.field, self.reason)
    }
}

impl StructuredLog for StageSkipped<'_> {
    fn log(&self) {
        tracing::debug!(field = self.field, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage_skipped",
            span_name = name,
            field = self.field,
            reason = self.reason,
        )
    }
}

/// Provider produced the stage function(s) for a stage.
///
/// # Log Level
/// `debug!` - Detailed construction step
pub struct StageBound<'a> {
    pub stage_id: &'a str,
    pub field: &'a str,
    pub kind: &'a str,
}

impl Display for StageBound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bound {} stage '{}' from field '{}'",
            self.kind, self.stage_id, self.field
        )
    }
}

impl StructuredLog for StageBound<'_> {
    fn log(&self) {
        tracing::debug!(
            stage_id = self.stage_id,
            field = self.field,
            kind = self.kind,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage_bound",
            span_name = name,
            stage_id = self.stage_id,
            field = self.field,
            kind = self.kind,
        )
    }
}

/// Provider failed; the whole graph is abandoned.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_stagehand::observability::messages::builder::ProviderFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
/// let msg = ProviderFailed {
///     stage_id: "tail",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ProviderFailed<'a> {
    pub stage_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProviderFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Provider for stage '{}' failed, graph will not start: {}",
            self.stage_id, self.error
        )
    }
}

impl StructuredLog for ProviderFailed<'_> {
    fn log(&self) {
        tracing::error!(
            stage_id = self.stage_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "provider_failed",
            span_name = name,
            stage_id = self.stage_id,
            error = %self.error,
        )
    }
}

/// Connection declared for a stage that was skipped.
///
/// # Log Level
/// `debug!` - Expected when the source stage is disabled
pub struct DanglingConnectionIgnored<'a> {
    pub from: &'a str,
    pub destination_count: usize,
}

impl Display for DanglingConnectionIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring {} connection(s) from disabled stage '{}'",
            self.destination_count, self.from
        )
    }
}

impl StructuredLog for DanglingConnectionIgnored<'_> {
    fn log(&self) {
        tracing::debug!(
            from = self.from,
            destination_count = self.destination_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "dangling_connection",
            span_name = name,
            from = self.from,
            destination_count = self.destination_count,
        )
    }
}

/// Graph validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct GraphValidationFailed {
    pub error_count: usize,
}

impl Display for GraphValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Graph validation failed with {} error(s)", self.error_count)
    }
}

impl StructuredLog for GraphValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "graph_validation_failed",
            span_name = name,
            error_count = self.error_count,
        )
    }
}

/// Graph assembled; every provider succeeded.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_stagehand::observability::messages::builder::GraphBuilt;
///
/// let msg = GraphBuilt {
///     stage_count: 4,
///     skipped_count: 1,
///     connection_count: 3,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct GraphBuilt {
    pub stage_count: usize,
    pub skipped_count: usize,
    pub connection_count: usize,
}

impl Display for GraphBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph built: {} stages, {} skipped, {} connections",
            self.stage_count, self.skipped_count, self.connection_count
        )
    }
}

impl StructuredLog for GraphBuilt {
    fn log(&self) {
        tracing::info!(
            stage_count = self.stage_count,
            skipped_count = self.skipped_count,
            connection_count = self.connection_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_built",
            span_name = name,
            stage_count = self.stage_count,
            skipped_count = self.skipped_count,
            connection_count = self.connection_count,
        )
    }
}

/// A provider registration replaced an earlier one for the same configuration type.
///
/// # Log Level
/// `warn!` - Likely a wiring mistake
pub struct ProviderReplaced<'a> {
    pub config_type: &'a str,
}

impl Display for ProviderReplaced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Replacing provider already registered for configuration type `{}`",
            self.config_type
        )
    }
}

impl StructuredLog for ProviderReplaced<'_> {
    fn log(&self) {
        tracing::warn!(config_type = self.config_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("provider_replaced", span_name = name, config_type = self.config_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let cases: Vec<(Box<dyn Display>, &str)> = vec![
            (
                Box::new(StageSkipped {
                    field: "tail",
                    reason: "disabled by configuration",
                }),
                "Skipping stage in field 'tail': disabled by configuration",
            ),
            (
                Box::new(StageBound {
                    stage_id: "fanout",
                    field: "fanout",
                    kind: "source_multi",
                }),
                "Bound source_multi stage 'fanout' from field 'fanout'",
            ),
            (
                Box::new(ProviderFailed {
                    stage_id: "tail",
                    error: &error,
                }),
                "Provider for stage 'tail' failed, graph will not start: no such file",
            ),
            (
                Box::new(GraphBuilt {
                    stage_count: 3,
                    skipped_count: 0,
                    connection_count: 2,
                }),
                "Graph built: 3 stages, 0 skipped, 2 connections",
            ),
        ];

        for (message, expected) in cases {
            assert_eq!(message.to_string(), expected);
        }
    }
}
