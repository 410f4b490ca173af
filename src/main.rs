//! Patchbay - compile patch graphs into engine definitions
//!
//! Entry point for the command-line tool.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use patchbay::dsp::{PortDirection, Unit, UnitRegistry};
use patchbay::modules::{InstrumentUnit, SequenceUnit};
use patchbay::persistence::{self, ChannelSettings, GraphKind, Session};

#[derive(Parser)]
#[command(name = "patchbay")]
#[command(author, version, about = "Compile modular patch graphs into engine definitions", long_about = None)]
struct Cli {
    /// Print single-line JSON instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand an instrument definition into a graph and compile it back
    Instrument(InstrumentArgs),

    /// Compile a saved graph file
    Graph(GraphArgs),

    /// Assemble a session from channel definitions
    Session(SessionArgs),

    /// List every unit kind with its sockets and dials
    Units,
}

#[derive(Args)]
struct InstrumentArgs {
    /// Instrument definition (JSON)
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Args)]
struct GraphArgs {
    /// Saved graph file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Compile as a sequence even if the file says otherwise
    #[arg(long)]
    sequence: bool,

    /// Override the channel notes are played on
    #[arg(long, value_name = "N")]
    channel: Option<u8>,
}

#[derive(Args)]
struct SessionArgs {
    /// List of channel definitions (JSON)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Tempo in beats per minute
    #[arg(long)]
    bpm: Option<f64>,

    /// Sequencer ticks per beat
    #[arg(long)]
    granularity: Option<u32>,

    /// Existing sequence definitions (JSON list) to route onto the channels
    #[arg(long, value_name = "FILE")]
    sequences: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let document = match cli.command {
        Commands::Instrument(args) => compile_instrument(args)?,
        Commands::Graph(args) => compile_graph(args)?,
        Commands::Session(args) => compile_session(args)?,
        Commands::Units => {
            list_units("Instrument units", &InstrumentUnit::registry());
            println!();
            list_units("Sequence units", &SequenceUnit::registry());
            return Ok(());
        }
    };

    let text = if cli.compact {
        serde_json::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    println!("{text}");
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn compile_instrument(args: InstrumentArgs) -> anyhow::Result<Value> {
    let definition = read_json(&args.file)?;
    let instrument = persistence::load_instrument(&definition)?;
    tracing::info!(
        "Loaded instrument: {} modules, {} patches",
        instrument.graph.module_count(),
        instrument.graph.patch_count()
    );
    Ok(instrument.compile().unwrap_or(Value::Null))
}

fn compile_graph(args: GraphArgs) -> anyhow::Result<Value> {
    let file = persistence::load_from_file(&args.file)
        .with_context(|| format!("Failed to load graph {}", args.file.display()))?;
    tracing::info!(
        "Loaded graph '{}' ({})",
        file.name.as_deref().unwrap_or("untitled"),
        file.kind.name()
    );

    if args.sequence || file.kind == GraphKind::Sequence {
        let mut sequence = file.into_sequence()?;
        if let Some(channel) = args.channel {
            sequence.channel = channel;
        }
        Ok(Value::Array(sequence.compile()))
    } else {
        Ok(file.into_instrument()?.compile().unwrap_or(Value::Null))
    }
}

fn compile_session(args: SessionArgs) -> anyhow::Result<Value> {
    let definitions: Vec<ChannelSettings> = serde_json::from_value(read_json(&args.file)?)
        .context("Expected a list of channel definitions")?;
    let mut session = Session::from_definitions(definitions)?;
    if let Some(bpm) = args.bpm {
        session.bpm = bpm;
    }
    if let Some(granularity) = args.granularity {
        session.granularity = granularity;
    }
    if let Some(path) = &args.sequences {
        let defs: Vec<Value> = serde_json::from_value(read_json(path)?)
            .context("Expected a list of sequence definitions")?;
        let dropped = session.assign_sequences(defs);
        if dropped > 0 {
            tracing::warn!("{dropped} sequence definitions matched no channel");
        }
    }
    Ok(session.compile())
}

fn list_units<U: Unit>(title: &str, registry: &UnitRegistry<U>) {
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    for unit in registry.instances() {
        println!();
        println!("  {}", unit.kind());
        for port in unit.ports() {
            let arrow = match port.direction {
                PortDirection::Input => "<-",
                PortDirection::Output => "->",
            };
            println!("    {arrow} {:8} {}", port.name, port.signal_type);
        }
        for dial in unit.dials() {
            println!(
                "    {:11} {} [{}, {}]",
                dial.id, dial.value, dial.min, dial.max
            );
        }
    }
}
