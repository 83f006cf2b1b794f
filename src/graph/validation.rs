// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation of the enabled stage set before any provider runs.
//!
//! Checks run in this order and accumulate errors so that every problem is
//! reported at once:
//!
//! 1. **Uniqueness**: stage ids are unique across enabled stages
//! 2. **References**: every destination names an enabled stage that accepts
//!    input of the sender's output type; sources and middles have
//!    destinations, terminals have none
//! 3. **Cycles**: DFS with recursion stack, reporting the cycle path
//!
//! Cycle detection needs a structurally valid graph, so it only runs when the
//! first two passes found nothing.

use std::collections::{HashMap, HashSet};

use crate::errors::BuildError;
use crate::graph::binding::PortType;
use crate::stage::StageKind;

/// What validation needs to know about an enabled stage.
#[derive(Debug, Clone)]
pub(crate) struct StageOutline {
    pub id: String,
    pub kind: StageKind,
    pub output: Option<PortType>,
    pub input: Option<PortType>,
    pub destinations: Vec<String>,
}

pub(crate) fn validate_stage_graph(stages: &[StageOutline]) -> Result<(), Vec<BuildError>> {
    let mut errors = Vec::new();

    if let Err(duplicate_errors) = validate_unique_stage_ids(stages) {
        errors.extend(duplicate_errors);
    }

    if let Err(reference_errors) = validate_destinations(stages) {
        errors.extend(reference_errors);
    }

    if errors.is_empty() {
        if let Err(cycle_errors) = validate_acyclic_graph(stages) {
            errors.extend(cycle_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_stage_ids(stages: &[StageOutline]) -> Result<(), Vec<BuildError>> {
    let mut seen_ids = HashSet::new();
    let mut errors = Vec::new();

    for stage in stages {
        if !seen_ids.insert(stage.id.as_str()) {
            errors.push(BuildError::DuplicateStageId {
                stage_id: stage.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_destinations(stages: &[StageOutline]) -> Result<(), Vec<BuildError>> {
    let by_id: HashMap<&str, &StageOutline> = stages.iter().map(|s| (s.id.as_str(), s)).collect();
    let mut errors = Vec::new();

    for stage in stages {
        if !stage.kind.has_output() {
            if let Some(to) = stage.destinations.first() {
                errors.push(BuildError::TerminalWithDestination {
                    stage_id: stage.id.clone(),
                    to: to.clone(),
                });
            }
            continue;
        }

        if stage.destinations.is_empty() {
            errors.push(BuildError::MissingDestination {
                stage_id: stage.id.clone(),
            });
            continue;
        }

        for to in &stage.destinations {
            let Some(destination) = by_id.get(to.as_str()) else {
                errors.push(BuildError::UnresolvedDestination {
                    from: stage.id.clone(),
                    to: to.clone(),
                });
                continue;
            };

            if !destination.kind.has_input() {
                errors.push(BuildError::SourceAsDestination {
                    from: stage.id.clone(),
                    to: to.clone(),
                });
                continue;
            }

            if let (Some(output), Some(input)) = (stage.output, destination.input) {
                if output != input {
                    errors.push(BuildError::IncompatibleConnection {
                        from: stage.id.clone(),
                        to: to.clone(),
                        output: output.name,
                        input: input.name,
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_acyclic_graph(stages: &[StageOutline]) -> Result<(), Vec<BuildError>> {
    let graph: HashMap<&str, Vec<&str>> = stages
        .iter()
        .map(|s| (s.id.as_str(), s.destinations.iter().map(String::as_str).collect()))
        .collect();

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    // declaration order keeps the reported cycle stable
    for stage in stages {
        if !visited.contains(stage.id.as_str()) {
            if let Some(cycle) =
                dfs_cycle_detection(&stage.id, &graph, &mut visited, &mut rec_stack, &mut path)
            {
                return Err(vec![BuildError::CyclicConnection { cycle }]);
            }
        }
    }

    Ok(())
}

fn dfs_cycle_detection<'g>(
    node: &'g str,
    graph: &HashMap<&'g str, Vec<&'g str>>,
    visited: &mut HashSet<&'g str>,
    rec_stack: &mut HashSet<&'g str>,
    path: &mut Vec<&'g str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|&id| id == neighbor).unwrap_or(0);
                let mut cycle: Vec<String> = path[cycle_start..].iter().map(|id| id.to_string()).collect();
                cycle.push(neighbor.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline<T: 'static>(id: &str, kind: StageKind, destinations: Vec<&str>) -> StageOutline {
        StageOutline {
            id: id.to_string(),
            kind,
            output: kind.has_output().then(PortType::of::<T>),
            input: kind.has_input().then(PortType::of::<T>),
            destinations: destinations.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn source(id: &str, destinations: Vec<&str>) -> StageOutline {
        outline::<String>(id, StageKind::Source, destinations)
    }

    fn middle(id: &str, destinations: Vec<&str>) -> StageOutline {
        outline::<String>(id, StageKind::Middle, destinations)
    }

    fn terminal(id: &str) -> StageOutline {
        outline::<String>(id, StageKind::Terminal, vec![])
    }

    #[test]
    fn test_valid_empty_graph() {
        assert!(validate_stage_graph(&[]).is_ok());
    }

    #[test]
    fn test_valid_linear_chain() {
        let stages = vec![source("a", vec!["b"]), middle("b", vec!["c"]), terminal("c")];
        assert!(validate_stage_graph(&stages).is_ok());
    }

    #[test]
    fn test_valid_diamond() {
        let stages = vec![
            source("a", vec!["b", "c"]),
            middle("b", vec!["d"]),
            middle("c", vec!["d"]),
            terminal("d"),
        ];
        assert!(validate_stage_graph(&stages).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let stages = vec![source("a", vec!["sink"]), source("a", vec!["sink"]), terminal("sink")];
        let errors = validate_stage_graph(&stages).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], BuildError::DuplicateStageId { stage_id } if stage_id == "a"));
    }

    #[test]
    fn test_unresolved_destination() {
        let stages = vec![source("reader", vec!["tail"]), terminal("printer")];
        let errors = validate_stage_graph(&stages).unwrap_err();
        assert!(matches!(
            &errors[0],
            BuildError::UnresolvedDestination { from, to } if from == "reader" && to == "tail"
        ));
    }

    #[test]
    fn test_structural_errors_accumulate() {
        let stages = vec![
            source("a", vec![]),
            source("b", vec!["a"]),
            StageOutline {
                destinations: vec!["a".to_string()],
                ..terminal("c")
            },
        ];
        let errors = validate_stage_graph(&stages).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(&errors[0], BuildError::MissingDestination { stage_id } if stage_id == "a"));
        assert!(matches!(&errors[1], BuildError::SourceAsDestination { to, .. } if to == "a"));
        assert!(matches!(&errors[2], BuildError::TerminalWithDestination { stage_id, .. } if stage_id == "c"));
    }

    #[test]
    fn test_incompatible_value_types() {
        let stages = vec![
            outline::<u64>("numbers", StageKind::Source, vec!["printer"]),
            terminal("printer"),
        ];
        let errors = validate_stage_graph(&stages).unwrap_err();
        match &errors[0] {
            BuildError::IncompatibleConnection { output, input, .. } => {
                assert_eq!(*output, "u64");
                assert!(input.contains("String"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_cycle_is_reported_with_path() {
        let stages = vec![
            source("a", vec!["b"]),
            middle("b", vec!["c"]),
            middle("c", vec!["b", "d"]),
            terminal("d"),
        ];
        let errors = validate_stage_graph(&stages).unwrap_err();
        match &errors[0] {
            BuildError::CyclicConnection { cycle } => assert_eq!(cycle, &vec!["b", "c", "b"]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_cycles_skipped_when_references_invalid() {
        let stages = vec![middle("b", vec!["c"]), middle("c", vec!["b", "missing"])];
        let errors = validate_stage_graph(&stages).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], BuildError::UnresolvedDestination { .. }));
    }
}
