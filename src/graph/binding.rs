// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Registered providers, keyed by configuration type.
//!
//! Each `register_*` call on the builder wraps the typed provider into one of
//! the bindings below. The binding remembers the stage shape and the value
//! types of its ports, so the graph can be validated before any provider
//! runs, and turns the provider's stage function(s) into a graph node.

use std::any::{type_name, Any, TypeId};
use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;

use crate::errors::BuildError;
use crate::node::{GraphNode, MiddleNode, StartNode, TerminalNode};
use crate::stage::{
    MiddleProvider, SourceMultiProvider, SourceProvider, StageConfig, StageKind, TerminalProvider,
};

/// Value type flowing through a port.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PortType {
    pub id: TypeId,
    pub name: &'static str,
}

impl PortType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }
}

impl PartialEq for PortType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

pub(crate) trait Binding: Send + Sync {
    fn kind(&self) -> StageKind;

    fn output(&self) -> Option<PortType>;

    fn input(&self) -> Option<PortType>;

    /// Invokes the provider and wraps its result into a node.
    fn bind(
        &self,
        ctx: &CancellationToken,
        stage_id: &str,
        config: &dyn Any,
        buffer_len: usize,
    ) -> Result<Box<dyn GraphNode>, BuildError>;
}

fn downcast_config<'c, C: 'static>(config: &'c dyn Any, stage_id: &str) -> Result<&'c C, BuildError> {
    config
        .downcast_ref::<C>()
        .ok_or_else(|| BuildError::ConfigTypeMismatch {
            stage_id: stage_id.to_string(),
            expected: type_name::<C>(),
        })
}

fn construction_error(stage_id: &str) -> impl FnOnce(crate::stage::ProviderError) -> BuildError + '_ {
    move |source| BuildError::Construction {
        stage_id: stage_id.to_string(),
        source,
    }
}

pub(crate) struct SourceBinding<C, O, P> {
    provider: P,
    _shape: PhantomData<fn(&C) -> O>,
}

impl<C, O, P> SourceBinding<C, O, P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _shape: PhantomData,
        }
    }
}

impl<C, O, P> Binding for SourceBinding<C, O, P>
where
    C: StageConfig,
    O: Clone + Send + 'static,
    P: SourceProvider<C, O>,
{
    fn kind(&self) -> StageKind {
        StageKind::Source
    }

    fn output(&self) -> Option<PortType> {
        Some(PortType::of::<O>())
    }

    fn input(&self) -> Option<PortType> {
        None
    }

    fn bind(
        &self,
        ctx: &CancellationToken,
        stage_id: &str,
        config: &dyn Any,
        _buffer_len: usize,
    ) -> Result<Box<dyn GraphNode>, BuildError> {
        let config = downcast_config::<C>(config, stage_id)?;
        let func = self
            .provider
            .provide(ctx, config)
            .map_err(construction_error(stage_id))?;
        Ok(Box::new(StartNode::new(stage_id, func)))
    }
}

pub(crate) struct SourceMultiBinding<C, O, P> {
    provider: P,
    _shape: PhantomData<fn(&C) -> O>,
}

impl<C, O, P> SourceMultiBinding<C, O, P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _shape: PhantomData,
        }
    }
}

impl<C, O, P> Binding for SourceMultiBinding<C, O, P>
where
    C: StageConfig,
    O: Clone + Send + 'static,
    P: SourceMultiProvider<C, O>,
{
    fn kind(&self) -> StageKind {
        StageKind::SourceMulti
    }

    fn output(&self) -> Option<PortType> {
        Some(PortType::of::<O>())
    }

    fn input(&self) -> Option<PortType> {
        None
    }

    fn bind(
        &self,
        ctx: &CancellationToken,
        stage_id: &str,
        config: &dyn Any,
        _buffer_len: usize,
    ) -> Result<Box<dyn GraphNode>, BuildError> {
        let config = downcast_config::<C>(config, stage_id)?;
        let funcs = self
            .provider
            .provide(ctx, config)
            .map_err(construction_error(stage_id))?;
        Ok(Box::new(StartNode::multi(stage_id, funcs)))
    }
}

pub(crate) struct MiddleBinding<C, I, O, P> {
    provider: P,
    _shape: PhantomData<fn(&C, I) -> O>,
}

impl<C, I, O, P> MiddleBinding<C, I, O, P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _shape: PhantomData,
        }
    }
}

impl<C, I, O, P> Binding for MiddleBinding<C, I, O, P>
where
    C: StageConfig,
    I: Send + 'static,
    O: Clone + Send + 'static,
    P: MiddleProvider<C, I, O>,
{
    fn kind(&self) -> StageKind {
        StageKind::Middle
    }

    fn output(&self) -> Option<PortType> {
        Some(PortType::of::<O>())
    }

    fn input(&self) -> Option<PortType> {
        Some(PortType::of::<I>())
    }

    fn bind(
        &self,
        ctx: &CancellationToken,
        stage_id: &str,
        config: &dyn Any,
        buffer_len: usize,
    ) -> Result<Box<dyn GraphNode>, BuildError> {
        let config = downcast_config::<C>(config, stage_id)?;
        let func = self
            .provider
            .provide(ctx, config)
            .map_err(construction_error(stage_id))?;
        Ok(Box::new(MiddleNode::new(stage_id, func, buffer_len)))
    }
}

pub(crate) struct TerminalBinding<C, I, P> {
    provider: P,
    _shape: PhantomData<fn(&C, I)>,
}

impl<C, I, P> TerminalBinding<C, I, P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _shape: PhantomData,
        }
    }
}

impl<C, I, P> Binding for TerminalBinding<C, I, P>
where
    C: StageConfig,
    I: Send + 'static,
    P: TerminalProvider<C, I>,
{
    fn kind(&self) -> StageKind {
        StageKind::Terminal
    }

    fn output(&self) -> Option<PortType> {
        None
    }

    fn input(&self) -> Option<PortType> {
        Some(PortType::of::<I>())
    }

    fn bind(
        &self,
        ctx: &CancellationToken,
        stage_id: &str,
        config: &dyn Any,
        buffer_len: usize,
    ) -> Result<Box<dyn GraphNode>, BuildError> {
        let config = downcast_config::<C>(config, stage_id)?;
        let func = self
            .provider
            .provide(ctx, config)
            .map_err(construction_error(stage_id))?;
        Ok(Box::new(TerminalNode::new(stage_id, func, buffer_len)))
    }
}
