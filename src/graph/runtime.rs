// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::GraphOptions;
use crate::errors::GraphError;
use crate::node::{GraphNode, StageExit};
use crate::observability::messages::runtime::{
    CancellingRemainingStages, GraphFinished, GraphStarted, StageFailed, StageFinished,
};
use crate::observability::messages::StructuredLog;
use crate::stage::StageKind;

/// A fully bound, connected set of stages, ready to run.
///
/// Produced by [`GraphBuilder::build`](crate::graph::GraphBuilder::build). No
/// stage function runs until [`Graph::run`] is called.
pub struct Graph {
    nodes: Vec<Box<dyn GraphNode>>,
    options: GraphOptions,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("stages", &self.stage_ids())
            .field("options", &self.options)
            .finish()
    }
}

impl Graph {
    pub(crate) fn new(nodes: Vec<Box<dyn GraphNode>>, options: GraphOptions) -> Self {
        Self { nodes, options }
    }

    /// Stage ids in declaration order.
    pub fn stage_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.id()).collect()
    }

    pub fn stage_kind(&self, stage_id: &str) -> Option<StageKind> {
        self.nodes
            .iter()
            .find(|node| node.id() == stage_id)
            .map(|node| node.kind())
    }

    pub fn contains(&self, stage_id: &str) -> bool {
        self.stage_kind(stage_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Runs every stage function until all of them have returned.
    ///
    /// Stages observe a child of `token`; cancelling `token` stops the whole
    /// graph. Stages returning [`StageError::Closed`](crate::errors::StageError::Closed)
    /// or [`StageError::Cancelled`](crate::errors::StageError::Cancelled) shut
    /// down normally. The first other error is returned, attributed to its
    /// stage (and producer index for multi sources). With `cancel_on_failure`
    /// it also cancels the remaining stages; otherwise they run to completion.
    pub async fn run(self, token: CancellationToken) -> Result<(), GraphError> {
        let Graph { nodes, options } = self;
        let started = Instant::now();
        let stage_count = nodes.len();
        let execution = token.child_token();

        let mut tasks: JoinSet<StageExit> = JoinSet::new();
        for node in nodes {
            node.spawn(&execution, &mut tasks);
        }

        GraphStarted {
            stage_count,
            task_count: tasks.len(),
        }
        .log();

        let mut first_failure: Option<GraphError> = None;
        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(exit) => stage_failure(exit),
                Err(join_error) => Some(GraphError::Join(join_error.to_string())),
            };

            let Some(failure) = failure else {
                continue;
            };

            if options.cancel_on_failure && !execution.is_cancelled() {
                CancellingRemainingStages { cause: &failure }.log();
                execution.cancel();
            }
            if first_failure.is_none() {
                first_failure = Some(failure);
            }
        }

        GraphFinished {
            stage_count,
            failed: first_failure.is_some(),
            duration: started.elapsed(),
        }
        .log();

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

/// Logs a stage exit; returns the failure, if it is one.
fn stage_failure(exit: StageExit) -> Option<GraphError> {
    match exit.result {
        Err(source) if !source.is_shutdown() => {
            StageFailed {
                stage_id: &exit.stage_id,
                instance: exit.instance,
                error: &source,
            }
            .log();
            Some(GraphError::StageFailed {
                stage_id: exit.stage_id.to_string(),
                instance: exit.instance,
                source,
            })
        }
        result => {
            let outcome = result
                .err()
                .map_or_else(|| "completed".to_string(), |shutdown| shutdown.to_string());
            StageFinished {
                stage_id: &exit.stage_id,
                instance: exit.instance,
                outcome: &outcome,
            }
            .log();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StageError;
    use crate::node::{self, Inbound, StartNode, TerminalNode};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn graph(nodes: Vec<Box<dyn GraphNode>>, cancel_on_failure: bool) -> Graph {
        Graph::new(
            nodes,
            GraphOptions {
                cancel_on_failure,
                ..GraphOptions::default()
            },
        )
    }

    fn blocking_sink(id: &str) -> TerminalNode<u8> {
        TerminalNode::new(
            id,
            node::terminal_func(|token: CancellationToken, _input: Inbound<u8>| async move {
                token.cancelled().await;
                Err(StageError::Cancelled)
            }),
            1,
        )
    }

    #[tokio::test]
    async fn test_empty_graph_runs() {
        let graph = graph(Vec::new(), true);
        assert!(graph.is_empty());
        assert!(graph.run(CancellationToken::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_is_attributed_and_cancels_the_rest() {
        let mut source = StartNode::new(
            "broken",
            node::start_func(|_token, _out| async move { Err(StageError::failed("disk full")) }),
        );
        let sink = blocking_sink("sink");
        source.send_to(sink.input());

        let nodes: Vec<Box<dyn GraphNode>> = vec![Box::new(source), Box::new(sink)];
        let graph = graph(nodes, true);
        assert_eq!(graph.stage_kind("sink"), Some(StageKind::Terminal));

        let result = tokio::time::timeout(Duration::from_secs(1), graph.run(CancellationToken::new()))
            .await
            .expect("failure should cancel the blocking sink");
        match result {
            Err(GraphError::StageFailed {
                stage_id, instance, ..
            }) => {
                assert_eq!(stage_id, "broken");
                assert_eq!(instance, None);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_without_cancellation_lets_siblings_finish() {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink_store = collected.clone();

        let mut source = StartNode::multi(
            "fanout",
            vec![
                node::start_func(|_token, _out| async move { Err(StageError::failed("disk full")) }),
                node::start_func(|_token, mut out| async move {
                    for n in 1..=5u8 {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        out.send(n).await?;
                    }
                    Ok(())
                }),
            ],
        );
        let sink = TerminalNode::new(
            "collect",
            node::terminal_func(move |_token, mut input: Inbound<u8>| async move {
                while let Some(n) = input.recv().await {
                    sink_store.lock().unwrap().push(n);
                }
                Ok(())
            }),
            1,
        );
        source.send_to(sink.input());

        let nodes: Vec<Box<dyn GraphNode>> = vec![Box::new(source), Box::new(sink)];
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            graph(nodes, false).run(CancellationToken::new()),
        )
        .await
        .expect("siblings should finish on their own");

        match result {
            Err(GraphError::StageFailed {
                stage_id, instance, ..
            }) => {
                assert_eq!(stage_id, "fanout");
                assert_eq!(instance, Some(0));
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(*collected.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_external_cancellation_is_normal_shutdown() {
        let sink = blocking_sink("sink");
        let mut source = StartNode::new(
            "idle",
            node::start_func(|token: CancellationToken, _out| async move {
                token.cancelled().await;
                Ok(())
            }),
        );
        source.send_to(sink.input());

        let nodes: Vec<Box<dyn GraphNode>> = vec![Box::new(source), Box::new(sink)];
        let graph = graph(nodes, false);
        let token = CancellationToken::new();
        let run = tokio::spawn(graph.run(token.clone()));

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), run)
            .await
            .expect("graph should stop after cancellation")
            .unwrap();
        assert!(result.is_ok());
    }
}
