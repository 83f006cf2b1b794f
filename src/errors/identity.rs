// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors resolving the identifier of an enabled stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The value does not identify itself and its field carries no `node_id`
    #[error("stage in field '{field}' has no derivable identifier")]
    Missing { field: String },

    /// The value identifies itself with an empty string
    #[error("stage in field '{field}' reports an empty identifier")]
    Empty { field: String },
}
