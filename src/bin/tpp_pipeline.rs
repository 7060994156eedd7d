//! Command-line front end for pipeline documents.
//!
//! Works against the built-in capability catalog: lists what can be selected,
//! checks that a document resolves, rewrites a document in canonical form, and
//! runs a configured pipeline over a mesh read from JSON.

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tpp_pipeline::{
    CapabilityKind, CapabilityRegistry, Mesh, PipelineBuilder, builtins, read_document,
    write_document,
};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    init_logging();
    let command = Command::parse(env::args_os().skip(1))?;
    let registry = Arc::new(builtins::default_registry()?);

    match command {
        Command::Help => print!("{}", usage()),
        Command::List { kind } => {
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => CapabilityKind::ALL.to_vec(),
            };
            for kind in kinds {
                println!("{}:", kind.as_str());
                for name in registry.names(kind) {
                    println!("  {name}");
                }
            }
        }
        Command::Check { config } => {
            let builder = configured_builder(registry, &config)?;
            println!("planner: {}", builder.planner_name().unwrap_or("<none>"));
            println!("mesh modifiers: [{}]", builder.mesh_modifier_names().join(", "));
            println!(
                "tool path modifiers: [{}]",
                builder.tool_path_modifier_names().join(", ")
            );
        }
        Command::Normalize { config, output } => {
            let mut document = read_document(&config)
                .with_context(|| format!("reading {}", config.display()))?;
            let mut builder = PipelineBuilder::new(registry);
            builder
                .configure(&document)
                .map_err(|err| anyhow!(err.chain_message()))?;
            builder.save(&mut document)?;
            match output {
                Some(path) => write_document(&path, &document)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{}", serde_json::to_string_pretty(&document)?),
            }
        }
        Command::Run { config, mesh } => {
            let builder = configured_builder(registry, &config)?;
            let pipeline = builder.build()?;
            let raw = fs::read_to_string(&mesh)
                .with_context(|| format!("reading {}", mesh.display()))?;
            let mesh: Mesh = serde_json::from_str(&raw).context("failed to parse mesh JSON")?;
            let tool_paths = pipeline
                .run(&mesh)
                .map_err(|err| anyhow!(err.chain_message()))?;
            println!("{}", serde_json::to_string_pretty(&tool_paths)?);
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn configured_builder(registry: Arc<CapabilityRegistry>, config: &Path) -> Result<PipelineBuilder> {
    let document: Value =
        read_document(config).with_context(|| format!("reading {}", config.display()))?;
    let mut builder = PipelineBuilder::new(registry);
    builder
        .configure(&document)
        .map_err(|err| anyhow!(err.chain_message()))
        .with_context(|| format!("configuring pipeline from {}", config.display()))?;
    Ok(builder)
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    List { kind: Option<CapabilityKind> },
    Check { config: PathBuf },
    Normalize { config: PathBuf, output: Option<PathBuf> },
    Run { config: PathBuf, mesh: PathBuf },
}

impl Command {
    fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter();
        let Some(subcommand) = args.next() else {
            bail!("missing command\n{}", usage());
        };
        let subcommand = subcommand
            .into_string()
            .map_err(|_| anyhow!("argument is not valid UTF-8"))?;

        let mut positional: Vec<String> = Vec::new();
        let mut config: Option<PathBuf> = None;
        let mut output: Option<PathBuf> = None;
        let mut mesh: Option<PathBuf> = None;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(next_value(&mut args, "--config")?)),
                "--output" => output = Some(PathBuf::from(next_value(&mut args, "--output")?)),
                "--mesh" => mesh = Some(PathBuf::from(next_value(&mut args, "--mesh")?)),
                "--help" | "-h" => return Ok(Command::Help),
                other if other.starts_with("--") => bail!("unknown flag: {other}"),
                _ => positional.push(arg),
            }
        }

        let require = |value: Option<PathBuf>, flag: &str| {
            value.ok_or_else(|| anyhow!("{subcommand} requires {flag}"))
        };

        let command = match subcommand.as_str() {
            "help" | "--help" | "-h" => Command::Help,
            "list" => {
                let kind = match positional.pop() {
                    Some(raw) => Some(
                        CapabilityKind::parse(&raw)
                            .ok_or_else(|| anyhow!("unknown capability kind '{raw}'"))?,
                    ),
                    None => None,
                };
                Command::List { kind }
            }
            "check" => Command::Check {
                config: require(config, "--config")?,
            },
            "normalize" => Command::Normalize {
                config: require(config, "--config")?,
                output,
            },
            "run" => Command::Run {
                config: require(config, "--config")?,
                mesh: require(mesh, "--mesh")?,
            },
            other => bail!("unknown command: {other}\n{}", usage()),
        };

        if !positional.is_empty() {
            bail!("unexpected arguments: {}", positional.join(" "));
        }
        Ok(command)
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: tpp-pipeline <command> [options]\n\
Commands:\n  \
  list [mesh-modifiers|planners|tool-path-modifiers]  List registered capability names\n  \
  check --config FILE                 Resolve a pipeline document and print it\n  \
  normalize --config FILE [--output FILE]\n      \
      Rewrite a pipeline document in canonical form\n  \
  run --config FILE --mesh FILE       Run a pipeline over a JSON mesh, print tool paths\n\
Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.\n"
}
