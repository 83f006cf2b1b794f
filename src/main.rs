// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::fs;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use the_stagehand::config::{load_options, GraphOptions};
use the_stagehand::graph::{GraphBuilder, PipelineConfig, StageFields};
use the_stagehand::node::{self, Inbound, MiddleFunc, StartFunc, TerminalFunc};
use the_stagehand::stage::{Enabler, Instance, Instancer, ProviderError, StageConfig};

const DEMO_PIPELINE: &str = r#"
words:
  text: "the quick brown fox jumps over the lazy dog"
fanout:
  id: fanout
  producers: 3
  lines: 2
upper: {}
printer:
  prefix: ">>"
"#;

/// Emits each word of `text`.
#[derive(Debug, Deserialize)]
struct WordsConfig {
    text: String,
    #[serde(default)]
    delay_ms: u64,
}

impl StageConfig for WordsConfig {}

/// Runs `producers` concurrent producers, each emitting `lines` lines.
#[derive(Debug, Deserialize)]
struct FanoutConfig {
    id: Instance,
    producers: usize,
    lines: usize,
}

impl StageConfig for FanoutConfig {
    fn as_instancer(&self) -> Option<&dyn Instancer> {
        Some(&self.id)
    }
}

#[derive(Debug, Default, Deserialize)]
struct UppercaseConfig {}

impl StageConfig for UppercaseConfig {}

#[derive(Debug, Deserialize)]
struct PrinterConfig {
    #[serde(default)]
    prefix: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Enabler for PrinterConfig {
    fn enabled(&self) -> bool {
        self.enabled
    }
}

impl StageConfig for PrinterConfig {
    fn as_enabler(&self) -> Option<&dyn Enabler> {
        Some(self)
    }
}

#[derive(Debug, Deserialize)]
struct DemoPipeline {
    words: WordsConfig,
    fanout: Option<FanoutConfig>,
    upper: UppercaseConfig,
    printer: PrinterConfig,
}

impl PipelineConfig for DemoPipeline {
    fn stages<'a>(&'a self, fields: &mut StageFields<'a>) {
        fields.add("words", &self.words).node_id("words").send_to(&["upper"]);
        fields.add_optional("fanout", &self.fanout).send_to(&["upper"]);
        fields.add("upper", &self.upper).node_id("upper").send_to(&["printer"]);
        fields.add("printer", &self.printer).node_id("printer");
    }
}

fn words(_ctx: &CancellationToken, cfg: &WordsConfig) -> Result<StartFunc<String>, ProviderError> {
    if cfg.text.trim().is_empty() {
        return Err("words stage has no text to emit".into());
    }
    let words: Vec<String> = cfg.text.split_whitespace().map(str::to_string).collect();
    let delay = Duration::from_millis(cfg.delay_ms);

    Ok(node::start_func(move |_token, mut out| async move {
        for word in words {
            out.send(word).await?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }))
}

fn fanout(_ctx: &CancellationToken, cfg: &FanoutConfig) -> Result<Vec<StartFunc<String>>, ProviderError> {
    let lines = cfg.lines;
    Ok((0..cfg.producers)
        .map(|producer| {
            node::start_func(move |_token, mut out| async move {
                for line in 0..lines {
                    out.send(format!("producer {} line {}", producer, line)).await?;
                }
                Ok(())
            })
        })
        .collect())
}

fn uppercase(
    _ctx: &CancellationToken,
    _cfg: &UppercaseConfig,
) -> Result<MiddleFunc<String, String>, ProviderError> {
    Ok(node::middle_func(|_token, mut input: Inbound<String>, mut out| async move {
        while let Some(value) = input.recv().await {
            out.send(value.to_uppercase()).await?;
        }
        Ok(())
    }))
}

fn printer(_ctx: &CancellationToken, cfg: &PrinterConfig) -> Result<TerminalFunc<String>, ProviderError> {
    let prefix = cfg.prefix.clone();
    Ok(node::terminal_func(move |_token, mut input: Inbound<String>| async move {
        while let Some(value) = input.recv().await {
            println!("{} {}", prefix, value);
        }
        Ok(())
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 3 {
        eprintln!("Usage: {} [pipeline.yaml] [options.yaml]", args[0]);
        eprintln!("Example: {} demos/pipeline.yaml demos/options.yaml", args[0]);
        std::process::exit(1);
    }

    let pipeline_yaml = match args.get(1) {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading pipeline {}", path))?,
        None => DEMO_PIPELINE.to_string(),
    };
    let pipeline: DemoPipeline =
        serde_yaml::from_str(&pipeline_yaml).context("parsing pipeline configuration")?;

    let options = match args.get(2) {
        Some(path) => load_options(path)?,
        None => GraphOptions::default(),
    };

    let mut builder = GraphBuilder::new(options);
    builder
        .register_source(words)
        .register_source_multi(fanout)
        .register_middle(uppercase)
        .register_terminal(printer);

    let graph = builder
        .build(&CancellationToken::new(), &pipeline)
        .context("building stage graph")?;

    println!("Stages: {:?}", graph.stage_ids());

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    graph.run(token).await.context("running stage graph")?;
    Ok(())
}
