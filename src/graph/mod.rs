// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph assembly and execution.
//!
//! [`GraphBuilder`] turns a [`PipelineConfig`] into a [`Graph`]:
//!
//! 1. every declared field is checked for enablement, disabled ones are
//!    skipped before anything else happens to them
//! 2. each enabled stage resolves its id (self-identification first, then the
//!    field's `node_id`)
//! 3. each stage finds the provider registered for its configuration type
//! 4. the stage set is validated: unique ids, resolvable and type-compatible
//!    destinations, no cycles
//! 5. providers run in declaration order; the first failure aborts the build
//! 6. nodes are wired together through bounded channels
//!
//! A [`Graph`] is inert until [`Graph::run`] spawns its stage functions.

mod binding;
mod builder;
mod connections;
mod fields;
mod runtime;
mod validation;


pub use builder::GraphBuilder;
pub use connections::Connections;
pub use fields::{FieldMeta, PipelineConfig, StageFields};
pub use runtime::Graph;
