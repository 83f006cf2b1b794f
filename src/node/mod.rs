// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stage function shapes and the typed node runtime that executes them.
//!
//! Each stage function runs in its own tokio task. Stages talk through bounded
//! `mpsc` channels wrapped in [`Inbound`] and [`Outbound`] ports, which also
//! watch the execution [`CancellationToken`] so that a suspended stage returns
//! as soon as the graph is cancelled.

mod nodes;
mod ports;

pub(crate) use nodes::{GraphNode, MiddleNode, StageExit, StartNode, TerminalNode};
pub use ports::{Inbound, Outbound};

use std::future::Future;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::errors::StageError;

pub type StageResult = Result<(), StageError>;

pub type StageFuture = BoxFuture<'static, StageResult>;

/// Producer: emits values until it is exhausted or cancelled.
pub type StartFunc<O> = Box<dyn FnOnce(CancellationToken, Outbound<O>) -> StageFuture + Send>;

/// Transformer: consumes one typed sequence and emits another.
pub type MiddleFunc<I, O> =
    Box<dyn FnOnce(CancellationToken, Inbound<I>, Outbound<O>) -> StageFuture + Send>;

/// Sink: consumes a typed sequence.
pub type TerminalFunc<I> = Box<dyn FnOnce(CancellationToken, Inbound<I>) -> StageFuture + Send>;

/// Boxes an async closure into a [`StartFunc`].
pub fn start_func<O, F, Fut>(f: F) -> StartFunc<O>
where
    F: FnOnce(CancellationToken, Outbound<O>) -> Fut + Send + 'static,
    Fut: Future<Output = StageResult> + Send + 'static,
{
    Box::new(move |token, out| Box::pin(f(token, out)))
}

/// Boxes an async closure into a [`MiddleFunc`].
pub fn middle_func<I, O, F, Fut>(f: F) -> MiddleFunc<I, O>
where
    F: FnOnce(CancellationToken, Inbound<I>, Outbound<O>) -> Fut + Send + 'static,
    Fut: Future<Output = StageResult> + Send + 'static,
{
    Box::new(move |token, input, out| Box::pin(f(token, input, out)))
}

/// Boxes an async closure into a [`TerminalFunc`].
pub fn terminal_func<I, F, Fut>(f: F) -> TerminalFunc<I>
where
    F: FnOnce(CancellationToken, Inbound<I>) -> Fut + Send + 'static,
    Fut: Future<Output = StageResult> + Send + 'static,
{
    Box::new(move |token, input| Box::pin(f(token, input)))
}
