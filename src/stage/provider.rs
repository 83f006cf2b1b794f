// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Provider binding: configuration value in, stage function out.
//!
//! A provider is a function that, given a configuration value of a unique
//! type, returns the function that will run inside a graph node. The shape of
//! that function decides where the node sits in the graph:
//!
//! | Provider                | Returns                 | Node         |
//! |-------------------------|-------------------------|--------------|
//! | [`SourceProvider`]      | [`StartFunc<O>`]        | entry point  |
//! | [`SourceMultiProvider`] | `Vec<StartFunc<O>>`     | entry point  |
//! | [`MiddleProvider`]      | [`MiddleFunc<I, O>`]    | intermediate |
//! | [`TerminalProvider`]    | [`TerminalFunc<I>`]     | exit point   |
//!
//! Every trait is implemented for plain functions and closures of the matching
//! signature, so most providers are just `fn`s.
//!
//! The token passed to a provider governs construction only (validating
//! files, opening connections...). It is not the token the returned function
//! later runs under: cancelling it does not stop a running stage.
//!
//! ```rust
//! use the_stagehand::node::{self, StartFunc};
//! use the_stagehand::stage::{Instance, ProviderError};
//! use tokio_util::sync::CancellationToken;
//!
//! fn counter(_ctx: &CancellationToken, _cfg: &Instance) -> Result<StartFunc<u32>, ProviderError> {
//!     Ok(node::start_func(|_token, mut out| async move {
//!         for n in 0..3 {
//!             out.send(n).await?;
//!         }
//!         Ok(())
//!     }))
//! }
//! ```

use std::error::Error;

use tokio_util::sync::CancellationToken;

use crate::node::{MiddleFunc, StartFunc, TerminalFunc};

/// Error a provider reports when it cannot construct its stage.
pub type ProviderError = Box<dyn Error + Send + Sync>;

/// Provides the single producer function of a graph entry point.
pub trait SourceProvider<C, O>: Send + Sync + 'static {
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<StartFunc<O>, ProviderError>;
}

/// Provides several producer functions that behave as a single graph node.
///
/// The functions run concurrently and share the node's identifier and
/// destinations. Their order only matters for attributing failures.
pub trait SourceMultiProvider<C, O>: Send + Sync + 'static {
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<Vec<StartFunc<O>>, ProviderError>;
}

/// Provides the transformer function of an intermediate node.
pub trait MiddleProvider<C, I, O>: Send + Sync + 'static {
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<MiddleFunc<I, O>, ProviderError>;
}

/// Provides the consumer function of a graph exit point.
pub trait TerminalProvider<C, I>: Send + Sync + 'static {
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<TerminalFunc<I>, ProviderError>;
}

impl<C, O, F> SourceProvider<C, O> for F
where
    F: Fn(&CancellationToken, &C) -> Result<StartFunc<O>, ProviderError> + Send + Sync + 'static,
{
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<StartFunc<O>, ProviderError> {
        self(ctx, cfg)
    }
}

impl<C, O, F> SourceMultiProvider<C, O> for F
where
    F: Fn(&CancellationToken, &C) -> Result<Vec<StartFunc<O>>, ProviderError>
        + Send
        + Sync
        + 'static,
{
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<Vec<StartFunc<O>>, ProviderError> {
        self(ctx, cfg)
    }
}

impl<C, I, O, F> MiddleProvider<C, I, O> for F
where
    F: Fn(&CancellationToken, &C) -> Result<MiddleFunc<I, O>, ProviderError> + Send + Sync + 'static,
{
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<MiddleFunc<I, O>, ProviderError> {
        self(ctx, cfg)
    }
}

impl<C, I, F> TerminalProvider<C, I> for F
where
    F: Fn(&CancellationToken, &C) -> Result<TerminalFunc<I>, ProviderError> + Send + Sync + 'static,
{
    fn provide(&self, ctx: &CancellationToken, cfg: &C) -> Result<TerminalFunc<I>, ProviderError> {
        self(ctx, cfg)
    }
}
