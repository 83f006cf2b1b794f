// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};

use tokio_util::sync::CancellationToken;

use crate::config::GraphOptions;
use crate::errors::BuildError;
use crate::graph::binding::{
    Binding, MiddleBinding, SourceBinding, SourceMultiBinding, TerminalBinding,
};
use crate::graph::fields::{PipelineConfig, StageFields};
use crate::graph::validation::{validate_stage_graph, StageOutline};
use crate::graph::{Connections, Graph};
use crate::node::GraphNode;
use crate::observability::messages::builder::{
    DanglingConnectionIgnored, GraphBuilt, GraphValidationFailed, ProviderFailed, ProviderReplaced,
    StageBound, StageSkipped,
};
use crate::observability::messages::StructuredLog;
use crate::stage::{
    self, MiddleProvider, SourceMultiProvider, SourceProvider, StageConfig, TerminalProvider,
};

/// Outcome of applying enablement and identity to the declared fields.
struct Plan<'p> {
    stages: Vec<PlannedStage<'p>>,
    /// Ids the skipped fields would have had, where one is known
    skipped_ids: HashSet<&'p str>,
    skipped_count: usize,
}

/// Enabled stage waiting for its provider.
struct PlannedStage<'p> {
    outline: StageOutline,
    field: &'static str,
    binding: &'p dyn Binding,
    config: &'p dyn Any,
}

/// Assembles a [`Graph`] from a pipeline's configuration values.
///
/// Providers are registered once per configuration type; the shape of the
/// provider (source, multi source, middle, terminal) fixes the stage's place in
/// the graph. [`GraphBuilder::build`] then walks the pipeline's declared
/// fields and, for each one:
///
/// 1. skips it when its configuration is disabled (or absent),
/// 2. resolves its stage id,
/// 3. finds the provider registered for its configuration type.
///
/// The resulting stage set is validated as a whole, and only then are the
/// providers invoked, one after the other. Any error aborts the whole build.
///
/// # Examples
///
/// ```rust
/// use the_stagehand::graph::{GraphBuilder, PipelineConfig, StageFields};
/// use the_stagehand::node::{self, Inbound, StartFunc, TerminalFunc};
/// use the_stagehand::stage::{Instance, ProviderError, StageConfig};
/// use tokio_util::sync::CancellationToken;
///
/// struct Printer;
/// impl StageConfig for Printer {}
///
/// struct Pipeline {
///     numbers: Instance,
///     printer: Printer,
/// }
///
/// impl PipelineConfig for Pipeline {
///     fn stages<'a>(&'a self, fields: &mut StageFields<'a>) {
///         fields.add("numbers", &self.numbers).send_to(&["printer"]);
///         fields.add("printer", &self.printer).node_id("printer");
///     }
/// }
///
/// fn numbers(_: &CancellationToken, _: &Instance) -> Result<StartFunc<u32>, ProviderError> {
///     Ok(node::start_func(|_token, mut out| async move { out.send(7).await }))
/// }
///
/// fn printer(_: &CancellationToken, _: &Printer) -> Result<TerminalFunc<u32>, ProviderError> {
///     Ok(node::terminal_func(|_token, mut input: Inbound<u32>| async move {
///         while let Some(n) = input.recv().await {
///             println!("{}", n);
///         }
///         Ok(())
///     }))
/// }
///
/// let mut builder = GraphBuilder::default();
/// builder.register_source(numbers).register_terminal(printer);
///
/// let pipeline = Pipeline {
///     numbers: Instance::from("numbers"),
///     printer: Printer,
/// };
/// let graph = builder.build(&CancellationToken::new(), &pipeline).unwrap();
/// assert_eq!(graph.stage_ids(), vec!["numbers", "printer"]);
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    options: GraphOptions,
    bindings: HashMap<TypeId, Box<dyn Binding>>,
    connections: Connections,
}

impl GraphBuilder {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            bindings: HashMap::new(),
            connections: Connections::new(),
        }
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Registers the provider of graph entry points configured by `C`.
    pub fn register_source<C, O, P>(&mut self, provider: P) -> &mut Self
    where
        C: StageConfig,
        O: Clone + Send + 'static,
        P: SourceProvider<C, O>,
    {
        self.insert_binding::<C>(Box::new(SourceBinding::<C, O, P>::new(provider)))
    }

    /// Registers a provider returning several producers that act as one node.
    pub fn register_source_multi<C, O, P>(&mut self, provider: P) -> &mut Self
    where
        C: StageConfig,
        O: Clone + Send + 'static,
        P: SourceMultiProvider<C, O>,
    {
        self.insert_binding::<C>(Box::new(SourceMultiBinding::<C, O, P>::new(provider)))
    }

    /// Registers the provider of intermediate stages configured by `C`.
    pub fn register_middle<C, I, O, P>(&mut self, provider: P) -> &mut Self
    where
        C: StageConfig,
        I: Send + 'static,
        O: Clone + Send + 'static,
        P: MiddleProvider<C, I, O>,
    {
        self.insert_binding::<C>(Box::new(MiddleBinding::<C, I, O, P>::new(provider)))
    }

    /// Registers the provider of graph exit points configured by `C`.
    pub fn register_terminal<C, I, P>(&mut self, provider: P) -> &mut Self
    where
        C: StageConfig,
        I: Send + 'static,
        P: TerminalProvider<C, I>,
    {
        self.insert_binding::<C>(Box::new(TerminalBinding::<C, I, P>::new(provider)))
    }

    /// Declares that stage `from` sends its output to `destinations`.
    pub fn connect<I, S>(&mut self, from: impl Into<String>, destinations: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connections.connect(from, destinations);
        self
    }

    /// Adds every edge of `connections` to the ones already declared.
    pub fn with_connections(&mut self, connections: &Connections) -> &mut Self {
        for (from, destinations) in &connections.0 {
            self.connections.connect(from.clone(), destinations.iter().cloned());
        }
        self
    }

    /// Builds the graph described by `pipeline`.
    ///
    /// `ctx` only governs construction: it is checked before each provider
    /// call and handed to the providers. The built graph runs under the token
    /// later passed to [`Graph::run`].
    pub fn build<P>(&self, ctx: &CancellationToken, pipeline: &P) -> Result<Graph, BuildError>
    where
        P: PipelineConfig + ?Sized,
    {
        let mut fields = StageFields::new();
        pipeline.stages(&mut fields);

        let Plan {
            stages: mut planned,
            skipped_ids,
            skipped_count,
        } = self.plan(fields)?;
        let mut errors = self.merge_connections(&mut planned, &skipped_ids);

        let outlines: Vec<StageOutline> = planned.iter().map(|s| s.outline.clone()).collect();
        if let Err(validation_errors) = validate_stage_graph(&outlines) {
            errors.extend(validation_errors);
        }

        if !errors.is_empty() {
            GraphValidationFailed {
                error_count: errors.len(),
            }
            .log();
            return Err(match errors.len() {
                1 => errors.remove(0),
                _ => BuildError::Validation(errors),
            });
        }

        let mut nodes: Vec<Box<dyn GraphNode>> = Vec::with_capacity(planned.len());
        for stage in &planned {
            if ctx.is_cancelled() {
                return Err(BuildError::Cancelled {
                    stage_id: stage.outline.id.clone(),
                });
            }

            let node = stage
                .binding
                .bind(
                    ctx,
                    &stage.outline.id,
                    stage.config,
                    self.options.effective_buffer_len(),
                )
                .map_err(|error| {
                    ProviderFailed {
                        stage_id: &stage.outline.id,
                        error: &error,
                    }
                    .log();
                    error
                })?;

            StageBound {
                stage_id: &stage.outline.id,
                field: stage.field,
                kind: stage.outline.kind.as_str(),
            }
            .log();
            nodes.push(node);
        }

        let connection_count = connect_nodes(&mut nodes, &planned)?;

        GraphBuilt {
            stage_count: nodes.len(),
            skipped_count,
            connection_count,
        }
        .log();

        Ok(Graph::new(nodes, self.options.clone()))
    }

    fn insert_binding<C: StageConfig>(&mut self, binding: Box<dyn Binding>) -> &mut Self {
        if self.bindings.insert(TypeId::of::<C>(), binding).is_some() {
            ProviderReplaced {
                config_type: type_name::<C>(),
            }
            .log();
        }
        self
    }

    /// Applies enablement and identity to every declared field.
    fn plan<'p>(&'p self, fields: StageFields<'p>) -> Result<Plan<'p>, BuildError> {
        let mut planned = Vec::new();
        let mut skipped_ids = HashSet::new();
        let mut skipped_count = 0;

        for field in fields.into_fields() {
            let Some(value) = field.value else {
                StageSkipped {
                    field: field.name,
                    reason: "no configuration",
                }
                .log();
                skipped_ids.extend(field.node_id);
                skipped_count += 1;
                continue;
            };

            if !stage::is_enabled(value.config) {
                StageSkipped {
                    field: field.name,
                    reason: "disabled by configuration",
                }
                .log();
                skipped_ids.extend(stage::resolve(value.config, field.node_id));
                skipped_count += 1;
                continue;
            }

            let id = stage::require_id(value.config, field.node_id, field.name)?;

            let binding = self
                .bindings
                .get(&value.type_id)
                .ok_or_else(|| BuildError::NoProvider {
                    field: field.name.to_string(),
                    type_name: value.type_name,
                })?;

            planned.push(PlannedStage {
                outline: StageOutline {
                    id,
                    kind: binding.kind(),
                    output: binding.output(),
                    input: binding.input(),
                    destinations: field.send_to.iter().map(|s| s.to_string()).collect(),
                },
                field: field.name,
                binding: binding.as_ref(),
                config: value.any,
            });
        }

        Ok(Plan {
            stages: planned,
            skipped_ids,
            skipped_count,
        })
    }

    /// Adds the builder-level connections to the stages they start from.
    ///
    /// Connections from a skipped stage are dropped; connections from an id
    /// no field declares are reported.
    fn merge_connections(
        &self,
        planned: &mut [PlannedStage<'_>],
        skipped_ids: &HashSet<&str>,
    ) -> Vec<BuildError> {
        let mut sources: Vec<&String> = self.connections.sources().collect();
        sources.sort();

        let mut errors = Vec::new();
        for from in sources {
            let mut matched = false;
            for stage in planned.iter_mut().filter(|s| &s.outline.id == from) {
                matched = true;
                for destination in self.connections.destinations(from) {
                    if !stage.outline.destinations.contains(destination) {
                        stage.outline.destinations.push(destination.clone());
                    }
                }
            }

            if matched {
                continue;
            }

            if skipped_ids.contains(from.as_str()) {
                DanglingConnectionIgnored {
                    from,
                    destination_count: self.connections.destinations(from).len(),
                }
                .log();
            } else {
                errors.push(BuildError::UnknownConnectionSource { from: from.clone() });
            }
        }
        errors
    }
}

/// Hands each destination's input port to its sender. Returns the edge count.
fn connect_nodes(nodes: &mut [Box<dyn GraphNode>], planned: &[PlannedStage<'_>]) -> Result<usize, BuildError> {
    let index: HashMap<&str, usize> = planned
        .iter()
        .enumerate()
        .map(|(i, s)| (s.outline.id.as_str(), i))
        .collect();
    let mut connection_count = 0;

    for (from_index, stage) in planned.iter().enumerate() {
        for to in &stage.outline.destinations {
            let unresolved = || BuildError::UnresolvedDestination {
                from: stage.outline.id.clone(),
                to: to.clone(),
            };
            let to_index = *index.get(to.as_str()).ok_or_else(unresolved)?;
            let port = nodes[to_index].input_port().ok_or_else(unresolved)?;

            nodes[from_index]
                .connect(port)
                .map_err(|mismatch| BuildError::IncompatibleConnection {
                    from: stage.outline.id.clone(),
                    to: to.clone(),
                    output: mismatch.expected,
                    input: planned[to_index].outline.input.map_or("nothing", |p| p.name),
                })?;
            connection_count += 1;
        }
    }

    Ok(connection_count)
}
