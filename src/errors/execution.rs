// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised after the graph has started.

use std::error::Error;

use thiserror::Error;

/// Outcome of a stage function that did not complete normally.
///
/// Stage functions return these instead of aborting the process; what happens
/// to the rest of the graph is decided by the runtime.
#[derive(Debug, Error)]
pub enum StageError {
    /// The execution token was cancelled while the stage was suspended
    #[error("stage cancelled")]
    Cancelled,

    /// Every destination of the stage has stopped receiving
    #[error("all destinations closed")]
    Closed,

    #[error("{0}")]
    Failed(#[source] Box<dyn Error + Send + Sync>),

    #[error("stage panicked: {0}")]
    Panicked(String),
}

impl StageError {
    pub fn failed(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        StageError::Failed(error.into())
    }

    /// Whether the error only reports that the stage was told, or forced, to stop.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, StageError::Cancelled | StageError::Closed)
    }
}

/// Failure of a running graph, attributed to the stage that caused it.
#[derive(Debug, Error)]
pub enum GraphError {
    /// `instance` is the position of the failing function for multi sources
    #[error("stage '{stage_id}' failed: {source}")]
    StageFailed {
        stage_id: String,
        instance: Option<usize>,
        #[source]
        source: StageError,
    },

    #[error("stage task could not be joined: {0}")]
    Join(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_errors() {
        assert!(StageError::Cancelled.is_shutdown());
        assert!(StageError::Closed.is_shutdown());
        assert!(!StageError::failed("disk full").is_shutdown());
        assert!(!StageError::Panicked("boom".to_string()).is_shutdown());
    }

    #[test]
    fn test_graph_error_names_stage() {
        let err = GraphError::StageFailed {
            stage_id: "fanout".to_string(),
            instance: Some(2),
            source: StageError::failed("connection reset"),
        };
        assert_eq!(err.to_string(), "stage 'fanout' failed: connection reset");
    }
}
