// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph execution events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Graph started; one task per stage function.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphStarted {
    pub stage_count: usize,
    pub task_count: usize,
}

impl Display for GraphStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting graph: {} stages, {} tasks",
            self.stage_count, self.task_count
        )
    }
}

impl StructuredLog for GraphStarted {
    fn log(&self) {
        tracing::info!(
            stage_count = self.stage_count,
            task_count = self.task_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph",
            span_name = name,
            stage_count = self.stage_count,
            task_count = self.task_count,
        )
    }
}

/// Stage function returned normally, or stopped because of cancellation
/// or closed destinations.
///
/// # Log Level
/// `debug!` - Detailed execution step
pub struct StageFinished<'a> {
    pub stage_id: &'a str,
    pub instance: Option<usize>,
    pub outcome: &'a str,
}

impl Display for StageFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.instance {
            Some(instance) => write!(
                f,
                "Stage '{}' instance {} finished: {}",
                self.stage_id, instance, self.outcome
            ),
            None => write!(f, "Stage '{}' finished: {}", self.stage_id, self.outcome),
        }
    }
}

impl StructuredLog for StageFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            stage_id = self.stage_id,
            instance = ?self.instance,
            outcome = self.outcome,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage_finished",
            span_name = name,
            stage_id = self.stage_id,
            instance = ?self.instance,
            outcome = self.outcome,
        )
    }
}

/// Stage function failed while running.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_stagehand::observability::messages::runtime::StageFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
/// let msg = StageFailed {
///     stage_id: "fanout",
///     instance: Some(1),
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct StageFailed<'a> {
    pub stage_id: &'a str,
    pub instance: Option<usize>,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.instance {
            Some(instance) => write!(
                f,
                "Stage '{}' instance {} failed: {}",
                self.stage_id, instance, self.error
            ),
            None => write!(f, "Stage '{}' failed: {}", self.stage_id, self.error),
        }
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::error!(
            stage_id = self.stage_id,
            instance = ?self.instance,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "stage_failed",
            span_name = name,
            stage_id = self.stage_id,
            instance = ?self.instance,
            error = %self.error,
        )
    }
}

/// A stage failed and the remaining stages are being cancelled.
///
/// # Log Level
/// `warn!` - Degraded but handled
pub struct CancellingRemainingStages<'a> {
    pub cause: &'a dyn std::error::Error,
}

impl Display for CancellingRemainingStages<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cancelling remaining stages after failure: {}", self.cause)
    }
}

impl StructuredLog for CancellingRemainingStages<'_> {
    fn log(&self) {
        tracing::warn!(cause = %self.cause, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("cancelling_remaining_stages", span_name = name, cause = %self.cause)
    }
}

/// Every stage task has exited.
///
/// # Log Level
/// `info!` on success, `warn!` when a stage failed
pub struct GraphFinished {
    pub stage_count: usize,
    pub failed: bool,
    pub duration: std::time::Duration,
}

impl Display for GraphFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let status = if self.failed { "with failures" } else { "successfully" };
        write!(
            f,
            "Graph of {} stages finished {} in {:?}",
            self.stage_count, status, self.duration
        )
    }
}

impl StructuredLog for GraphFinished {
    fn log(&self) {
        if self.failed {
            tracing::warn!(
                stage_count = self.stage_count,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::info!(
                stage_count = self.stage_count,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_finished",
            span_name = name,
            stage_count = self.stage_count,
            failed = self.failed,
            duration = ?self.duration,
        )
    }
}
