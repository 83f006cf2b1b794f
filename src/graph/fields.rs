// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declared shape of a pipeline struct.
//!
//! A pipeline groups the configuration values of all its stages as fields of
//! one struct. Instead of inspecting the struct at runtime, the struct lists
//! its stage fields explicitly, together with the metadata attached to each:
//! the `node_id` used when the value does not identify itself, and the ids of
//! the stages the field's stage sends to.
//!
//! ```rust
//! use the_stagehand::graph::{PipelineConfig, StageFields};
//! use the_stagehand::stage::{Instance, StageConfig};
//!
//! struct Uppercase;
//! impl StageConfig for Uppercase {}
//!
//! struct Pipeline {
//!     input: Instance,
//!     upper: Uppercase,
//!     output: Option<Instance>,
//! }
//!
//! impl PipelineConfig for Pipeline {
//!     fn stages<'a>(&'a self, fields: &mut StageFields<'a>) {
//!         fields.add("input", &self.input).send_to(&["upper"]);
//!         fields.add("upper", &self.upper).node_id("upper").send_to(&["output"]);
//!         fields.add_optional("output", &self.output);
//!     }
//! }
//! ```

use std::any::{type_name, Any, TypeId};

use crate::stage::StageConfig;

/// Implemented by the struct holding the configuration of every stage.
pub trait PipelineConfig {
    /// Declare each stage field, in the order stages should be constructed.
    fn stages<'a>(&'a self, fields: &mut StageFields<'a>);
}

/// Configuration value held by a field, seen both as its capabilities and as
/// a value to hand back to its typed provider.
pub(crate) struct FieldValue<'a> {
    pub config: &'a dyn StageConfig,
    pub any: &'a dyn Any,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

pub(crate) struct StageField<'a> {
    pub name: &'static str,
    pub node_id: Option<&'a str>,
    pub send_to: Vec<&'a str>,
    /// `None` for an optional field holding no configuration
    pub value: Option<FieldValue<'a>>,
}

/// Collects the stage fields declared by a [`PipelineConfig`].
#[derive(Default)]
pub struct StageFields<'a> {
    fields: Vec<StageField<'a>>,
}

impl<'a> StageFields<'a> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declare a field holding a stage configuration.
    pub fn add<C: StageConfig>(&mut self, name: &'static str, config: &'a C) -> FieldMeta<'_, 'a> {
        self.push(StageField {
            name,
            node_id: None,
            send_to: Vec::new(),
            value: Some(FieldValue {
                config,
                any: config,
                type_id: TypeId::of::<C>(),
                type_name: type_name::<C>(),
            }),
        })
    }

    /// Declare a field whose stage is disabled when it holds `None`.
    pub fn add_optional<C: StageConfig>(
        &mut self,
        name: &'static str,
        config: &'a Option<C>,
    ) -> FieldMeta<'_, 'a> {
        match config {
            Some(config) => self.add(name, config),
            None => self.push(StageField {
                name,
                node_id: None,
                send_to: Vec::new(),
                value: None,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Vec<StageField<'a>> {
        self.fields
    }

    fn push(&mut self, field: StageField<'a>) -> FieldMeta<'_, 'a> {
        self.fields.push(field);
        let index = self.fields.len() - 1;
        FieldMeta {
            field: &mut self.fields[index],
        }
    }
}

/// Metadata attached to a declared field.
pub struct FieldMeta<'f, 'a> {
    field: &'f mut StageField<'a>,
}

impl<'f, 'a> FieldMeta<'f, 'a> {
    /// Identifier used when the configuration value does not identify itself.
    pub fn node_id(self, id: &'a str) -> Self {
        self.field.node_id = Some(id);
        self
    }

    /// Ids of the stages this field's stage sends its output to.
    pub fn send_to(self, destinations: &[&'a str]) -> Self {
        for destination in destinations {
            if !self.field.send_to.contains(destination) {
                self.field.send_to.push(*destination);
            }
        }
        self
    }
}
