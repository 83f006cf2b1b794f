// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::{type_name, Any};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::errors::StageError;
use crate::node::{Inbound, MiddleFunc, Outbound, StageFuture, StageResult, StartFunc, TerminalFunc};
use crate::stage::StageKind;

/// Result of one stage function task.
pub(crate) struct StageExit {
    pub stage_id: Arc<str>,
    /// Position of the function inside a multi source
    pub instance: Option<usize>,
    pub result: StageResult,
}

/// A destination accepted values of another type.
#[derive(Debug)]
pub(crate) struct PortMismatch {
    pub expected: &'static str,
}

/// Type-erased node, as held by a built graph.
///
/// Input ports travel as `Box<dyn Any>` holding an `mpsc::Sender<I>`; a node
/// only accepts a port whose value type matches its own output type.
pub(crate) trait GraphNode: Send {
    fn id(&self) -> &str;

    fn kind(&self) -> StageKind;

    /// Sender feeding this node's input channel, `None` for sources.
    fn input_port(&self) -> Option<Box<dyn Any + Send>>;

    fn connect(&mut self, input: Box<dyn Any + Send>) -> Result<(), PortMismatch>;

    /// Starts every stage function of the node on `tasks`.
    fn spawn(self: Box<Self>, token: &CancellationToken, tasks: &mut JoinSet<StageExit>);
}

fn downcast_port<T: 'static>(input: Box<dyn Any + Send>) -> Result<mpsc::Sender<T>, PortMismatch> {
    input
        .downcast::<mpsc::Sender<T>>()
        .map(|sender| *sender)
        .map_err(|_| PortMismatch {
            expected: type_name::<T>(),
        })
}

async fn supervise(stage_id: Arc<str>, instance: Option<usize>, future: StageFuture) -> StageExit {
    let result = match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(StageError::Panicked(panic_message(panic.as_ref()))),
    };
    StageExit {
        stage_id,
        instance,
        result,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Graph entry point running one or more producer functions.
pub(crate) struct StartNode<O> {
    id: String,
    multi: bool,
    funcs: Vec<StartFunc<O>>,
    destinations: Vec<mpsc::Sender<O>>,
}

impl<O: Clone + Send + 'static> StartNode<O> {
    pub fn new(id: impl Into<String>, func: StartFunc<O>) -> Self {
        Self {
            id: id.into(),
            multi: false,
            funcs: vec![func],
            destinations: Vec::new(),
        }
    }

    pub fn multi(id: impl Into<String>, funcs: Vec<StartFunc<O>>) -> Self {
        Self {
            id: id.into(),
            multi: true,
            funcs,
            destinations: Vec::new(),
        }
    }

    pub fn send_to(&mut self, destination: mpsc::Sender<O>) {
        self.destinations.push(destination);
    }
}

impl<O: Clone + Send + 'static> GraphNode for StartNode<O> {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StageKind {
        if self.multi {
            StageKind::SourceMulti
        } else {
            StageKind::Source
        }
    }

    fn input_port(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    fn connect(&mut self, input: Box<dyn Any + Send>) -> Result<(), PortMismatch> {
        self.send_to(downcast_port::<O>(input)?);
        Ok(())
    }

    fn spawn(self: Box<Self>, token: &CancellationToken, tasks: &mut JoinSet<StageExit>) {
        let StartNode {
            id,
            multi,
            funcs,
            destinations,
        } = *self;
        let stage_id: Arc<str> = Arc::from(id);
        let out = Outbound::new(destinations, token.clone());
        for (index, func) in funcs.into_iter().enumerate() {
            let instance = multi.then_some(index);
            let future = func(token.clone(), out.clone());
            tasks.spawn(supervise(stage_id.clone(), instance, future));
        }
    }
}

/// Intermediate node running a transformer function.
pub(crate) struct MiddleNode<I, O> {
    id: String,
    func: MiddleFunc<I, O>,
    input: mpsc::Sender<I>,
    receiver: mpsc::Receiver<I>,
    destinations: Vec<mpsc::Sender<O>>,
}

impl<I: Send + 'static, O: Clone + Send + 'static> MiddleNode<I, O> {
    pub fn new(id: impl Into<String>, func: MiddleFunc<I, O>, buffer_len: usize) -> Self {
        let (input, receiver) = mpsc::channel(buffer_len.max(1));
        Self {
            id: id.into(),
            func,
            input,
            receiver,
            destinations: Vec::new(),
        }
    }

    pub fn send_to(&mut self, destination: mpsc::Sender<O>) {
        self.destinations.push(destination);
    }

    pub fn input(&self) -> mpsc::Sender<I> {
        self.input.clone()
    }
}

impl<I: Send + 'static, O: Clone + Send + 'static> GraphNode for MiddleNode<I, O> {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StageKind {
        StageKind::Middle
    }

    fn input_port(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.input()))
    }

    fn connect(&mut self, input: Box<dyn Any + Send>) -> Result<(), PortMismatch> {
        self.send_to(downcast_port::<O>(input)?);
        Ok(())
    }

    fn spawn(self: Box<Self>, token: &CancellationToken, tasks: &mut JoinSet<StageExit>) {
        let MiddleNode {
            id,
            func,
            input,
            receiver,
            destinations,
        } = *self;
        // the channel closes once every upstream sender is gone
        drop(input);

        let inbound = Inbound::new(receiver, token.clone());
        let out = Outbound::new(destinations, token.clone());
        let future = func(token.clone(), inbound, out);
        tasks.spawn(supervise(Arc::from(id), None, future));
    }
}

/// Graph exit point running a sink function.
pub(crate) struct TerminalNode<I> {
    id: String,
    func: TerminalFunc<I>,
    input: mpsc::Sender<I>,
    receiver: mpsc::Receiver<I>,
}

impl<I: Send + 'static> TerminalNode<I> {
    pub fn new(id: impl Into<String>, func: TerminalFunc<I>, buffer_len: usize) -> Self {
        let (input, receiver) = mpsc::channel(buffer_len.max(1));
        Self {
            id: id.into(),
            func,
            input,
            receiver,
        }
    }

    pub fn input(&self) -> mpsc::Sender<I> {
        self.input.clone()
    }
}

impl<I: Send + 'static> GraphNode for TerminalNode<I> {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> StageKind {
        StageKind::Terminal
    }

    fn input_port(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.input()))
    }

    fn connect(&mut self, _input: Box<dyn Any + Send>) -> Result<(), PortMismatch> {
        Err(PortMismatch { expected: "nothing" })
    }

    fn spawn(self: Box<Self>, token: &CancellationToken, tasks: &mut JoinSet<StageExit>) {
        let TerminalNode {
            id,
            func,
            input,
            receiver,
        } = *self;
        drop(input);

        let inbound = Inbound::new(receiver, token.clone());
        let future = func(token.clone(), inbound);
        tasks.spawn(supervise(Arc::from(id), None, future));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{middle_func, start_func, terminal_func};
    use std::sync::Mutex;

    async fn join_all(mut tasks: JoinSet<StageExit>) -> Vec<(String, Option<usize>, StageResult)> {
        let mut exits = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let exit = joined.unwrap();
            exits.push((exit.stage_id.to_string(), exit.instance, exit.result));
        }
        exits
    }

    #[tokio::test]
    async fn test_typed_chain() {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink_store = collected.clone();

        let mut source = StartNode::new(
            "numbers",
            start_func(|_token, mut out| async move {
                for n in 1..=4 {
                    out.send(n).await?;
                }
                Ok(())
            }),
        );
        let mut double = MiddleNode::new(
            "double",
            middle_func(|_token, mut input: Inbound<i32>, mut out| async move {
                while let Some(n) = input.recv().await {
                    out.send(n * 2).await?;
                }
                Ok(())
            }),
            1,
        );
        let sink = TerminalNode::new(
            "collect",
            terminal_func(move |_token, mut input: Inbound<i32>| async move {
                while let Some(n) = input.recv().await {
                    sink_store.lock().unwrap().push(n);
                }
                Ok(())
            }),
            1,
        );

        source.send_to(double.input());
        double.send_to(sink.input());

        let token = CancellationToken::new();
        let mut tasks = JoinSet::new();
        Box::new(source).spawn(&token, &mut tasks);
        Box::new(double).spawn(&token, &mut tasks);
        Box::new(sink).spawn(&token, &mut tasks);

        let exits = join_all(tasks).await;
        assert_eq!(exits.len(), 3);
        assert!(exits.iter().all(|(_, _, result)| result.is_ok()));
        assert_eq!(*collected.lock().unwrap(), vec![2, 4, 6, 8]);
    }

    #[tokio::test]
    async fn test_erased_connect_checks_value_type() {
        let mut source: Box<dyn GraphNode> = Box::new(StartNode::new(
            "words",
            start_func(|_token, mut out| async move { out.send(String::from("hi")).await }),
        ));
        let numbers: Box<dyn GraphNode> = Box::new(TerminalNode::new(
            "numbers",
            terminal_func(|_token, _input: Inbound<u64>| async move { Ok(()) }),
            1,
        ));

        let port = numbers.input_port().unwrap();
        let err = source.connect(port).unwrap_err();
        assert!(err.expected.contains("String"));
    }

    #[tokio::test]
    async fn test_multi_source_instances_and_panics() {
        let funcs: Vec<StartFunc<u8>> = vec![
            start_func(|_token, _out| async move { Ok(()) }),
            start_func(|_token, _out| async move {
                if true {
                    panic!("producer blew up");
                }
                Ok(())
            }),
        ];
        let node = StartNode::multi("fanout", funcs);
        assert_eq!(node.kind(), StageKind::SourceMulti);

        let mut tasks = JoinSet::new();
        Box::new(node).spawn(&CancellationToken::new(), &mut tasks);

        let mut exits = join_all(tasks).await;
        exits.sort_by_key(|(_, instance, _)| *instance);
        assert_eq!(exits[0].1, Some(0));
        assert!(exits[0].2.is_ok());
        assert_eq!(exits[1].1, Some(1));
        match &exits[1].2 {
            Err(StageError::Panicked(message)) => assert_eq!(message, "producer blew up"),
            other => panic!("expected panic to be captured, got {:?}", other),
        }
    }

    #[test]
    fn test_terminal_has_no_output() {
        let mut sink = TerminalNode::new(
            "sink",
            terminal_func(|_token, _input: Inbound<u8>| async move { Ok(()) }),
            1,
        );
        let (tx, _rx) = mpsc::channel::<u8>(1);
        assert!(sink.connect(Box::new(tx)).is_err());
    }
}
