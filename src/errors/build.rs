// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors that abort graph assembly.
//!
//! Every variant is fatal for the whole graph: a pipeline with one invalid
//! stage never partially starts.

use thiserror::Error;

use crate::errors::IdentityError;
use crate::stage::ProviderError;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("no provider registered for configuration type `{type_name}` (field '{field}')")]
    NoProvider {
        field: String,
        type_name: &'static str,
    },

    #[error("duplicate stage id '{stage_id}'")]
    DuplicateStageId { stage_id: String },

    /// The destination is unknown or its stage is disabled
    #[error("stage '{from}' sends to '{to}', which is not an enabled stage")]
    UnresolvedDestination { from: String, to: String },

    /// A builder-level connection starts from an id no field declares
    #[error("connection declared from unknown stage '{from}'")]
    UnknownConnectionSource { from: String },

    #[error("stage '{stage_id}' produces values but has no destinations")]
    MissingDestination { stage_id: String },

    #[error("terminal stage '{stage_id}' cannot send to '{to}'")]
    TerminalWithDestination { stage_id: String, to: String },

    #[error("stage '{from}' cannot send to source stage '{to}'")]
    SourceAsDestination { from: String, to: String },

    #[error("cyclic connection: {}", .cycle.join(" -> "))]
    CyclicConnection { cycle: Vec<String> },

    #[error("stage '{from}' emits `{output}` but '{to}' accepts `{input}`")]
    IncompatibleConnection {
        from: String,
        to: String,
        output: &'static str,
        input: &'static str,
    },

    #[error("stage '{stage_id}' was bound with a configuration that is not `{expected}`")]
    ConfigTypeMismatch {
        stage_id: String,
        expected: &'static str,
    },

    #[error("provider for stage '{stage_id}' failed: {source}")]
    Construction {
        stage_id: String,
        #[source]
        source: ProviderError,
    },

    #[error("graph construction cancelled before stage '{stage_id}'")]
    Cancelled { stage_id: String },

    #[error("invalid graph: {}", join_messages(.0))]
    Validation(Vec<BuildError>),
}

impl BuildError {
    /// Flattens the error into the individual problems it reports.
    pub fn errors(&self) -> Vec<&BuildError> {
        match self {
            BuildError::Validation(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }

    /// Identifier of the stage the error is attributed to, when there is one.
    pub fn stage_id(&self) -> Option<&str> {
        match self {
            BuildError::DuplicateStageId { stage_id }
            | BuildError::MissingDestination { stage_id }
            | BuildError::TerminalWithDestination { stage_id, .. }
            | BuildError::ConfigTypeMismatch { stage_id, .. }
            | BuildError::Construction { stage_id, .. }
            | BuildError::Cancelled { stage_id } => Some(stage_id.as_str()),
            BuildError::UnknownConnectionSource { from }
            | BuildError::UnresolvedDestination { from, .. }
            | BuildError::SourceAsDestination { from, .. }
            | BuildError::IncompatibleConnection { from, .. } => Some(from.as_str()),
            _ => None,
        }
    }
}

fn join_messages(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
