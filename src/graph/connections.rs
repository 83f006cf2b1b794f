// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Edge table: stage id -> ids of the stages it sends to.
///
/// Destination order is kept; values are fanned out in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connections(pub HashMap<String, Vec<String>>);

impl Connections {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Add destinations for a stage, skipping ones already present.
    pub fn connect<I, S>(&mut self, from: impl Into<String>, destinations: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.0.entry(from.into()).or_default();
        for destination in destinations {
            let destination = destination.into();
            if !entry.contains(&destination) {
                entry.push(destination);
            }
        }
        self
    }

    /// Destinations declared for a stage
    pub fn destinations(&self, from: &str) -> &[String] {
        self.0.get(from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of all stages with declared destinations
    pub fn sources(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn edge_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl From<HashMap<String, Vec<String>>> for Connections {
    fn from(map: HashMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

impl From<Connections> for HashMap<String, Vec<String>> {
    fn from(connections: Connections) -> Self {
        connections.0
    }
}
