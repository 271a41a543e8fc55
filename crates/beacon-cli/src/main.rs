//! Beacon CLI.
//!
//! - `beacon simulate` - run the reference world and print a summary
//! - `beacon encode` - pack a JSON message into a flag
//! - `beacon decode` - unpack a flag relative to a receiver position
//! - `beacon layout` - print the wire layout of every message kind

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beacon_protocol::{DecodeContext, GridPos, Message, ProtocolConfig, Registry};
use beacon_sim::{ScenarioConfig, Simulation, SimulationSummary};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Single-slot broadcast coordination tools", version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Protocol config (YAML); defaults to a 24-bit channel with a 7-bit window
    #[arg(long, global = true)]
    protocol: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference simulation
    Simulate {
        /// Scenario file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the scenario's round count
        #[arg(long)]
        rounds: Option<u64>,

        /// Override the scenario's seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Encode a JSON message, e.g. '{"type":"patrol_assignment","outbound_direction_degrees":90}'
    Encode {
        message: String,
    },

    /// Decode a flag (decimal or 0x-prefixed hex)
    Decode {
        #[arg(value_parser = parse_flag)]
        value: u32,

        /// Receiver position used to reconstruct coordinates, as `x,y`
        #[arg(long, value_parser = parse_grid_pos, default_value = "0,0")]
        reference: GridPos,
    },

    /// Show opcode and field widths of every registered message kind
    Layout,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Simulate {
            config,
            rounds,
            seed,
        } => simulate(config.as_deref(), cli.protocol.as_deref(), rounds, seed, cli.json),
        Commands::Encode { message } => {
            let registry = registry(cli.protocol.as_deref())?;
            encode(&registry, &message, cli.json)
        }
        Commands::Decode { value, reference } => {
            let registry = registry(cli.protocol.as_deref())?;
            decode(&registry, value, reference)
        }
        Commands::Layout => {
            let registry = registry(cli.protocol.as_deref())?;
            layout(&registry, cli.json)
        }
    }
}

fn protocol_config(path: Option<&Path>) -> Result<ProtocolConfig> {
    let Some(path) = path else {
        return Ok(ProtocolConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading protocol config {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("parsing protocol config {}", path.display()))
}

fn registry(protocol: Option<&Path>) -> Result<Registry> {
    let config = protocol_config(protocol)?;
    Registry::standard(&config).context("building flag registry")
}

fn encode(registry: &Registry, json: &str, as_json: bool) -> Result<()> {
    let message: Message = serde_json::from_str(json).context("parsing message JSON")?;
    let raw = registry.encode(&message)?;
    if as_json {
        println!("{}", serde_json::json!({ "value": raw, "hex": format!("{raw:#08x}") }));
    } else {
        println!("{raw} ({raw:#08x})");
    }
    Ok(())
}

fn decode(registry: &Registry, raw: u32, reference: GridPos) -> Result<()> {
    let message = registry
        .decode(raw, &DecodeContext::at(reference))
        .with_context(|| format!("decoding flag {raw:#08x}"))?;
    println!("{}", serde_json::to_string(&message)?);
    Ok(())
}

fn layout(registry: &Registry, as_json: bool) -> Result<()> {
    let layouts = registry.layouts();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&layouts)?);
        return Ok(());
    }

    println!(
        "channel: {} bits, opcode: {} bits",
        registry.channel_width(),
        registry.opcode_bits()
    );
    for layout in &layouts {
        let fields: Vec<String> = layout
            .field_widths
            .iter()
            .map(|bits| bits.to_string())
            .collect();
        let fields = if fields.is_empty() {
            "-".to_string()
        } else {
            fields.join("+")
        };
        println!(
            "  {:>2}  {:<16} payload {:<8} total {}",
            layout.opcode,
            format!("{:?}", layout.kind),
            fields,
            layout.total_bits
        );
    }
    Ok(())
}

fn simulate(
    config: Option<&Path>,
    protocol: Option<&Path>,
    rounds: Option<u64>,
    seed: Option<u64>,
    as_json: bool,
) -> Result<()> {
    let mut scenario = match config {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if protocol.is_some() {
        scenario.protocol = protocol_config(protocol)?;
    }
    if let Some(rounds) = rounds {
        scenario.rounds = rounds;
    }
    if let Some(seed) = seed {
        scenario.seed = seed;
    }

    tracing::info!(seed = scenario.seed, rounds = scenario.rounds, "starting simulation");
    let mut sim = Simulation::from_scenario(&scenario).context("building simulation")?;
    let summary = sim.run(scenario.rounds);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &SimulationSummary) {
    println!("Beacon Simulation");
    println!("=================");
    println!();
    println!("Rounds: {}", summary.rounds);
    println!(
        "Roles: {} commander, {} leader, {} follower, {} unassigned",
        summary.count_role("commander"),
        summary.count_role("leader"),
        summary.count_role("follower"),
        summary.count_role("unassigned"),
    );
    println!();
    println!("Agents:");
    for agent in &summary.agents {
        println!(
            "  {:>3} {:<11} at {}",
            agent.id,
            agent.role.name(),
            agent.position
        );
    }
    println!();
    for queue in &summary.queues {
        println!(
            "Commander {} queue: {} target(s)",
            queue.commander,
            queue.targets.len()
        );
        for target in &queue.targets {
            println!("  - {:?} at {}", target.unit_kind(), target.position());
        }
    }
    println!();
    println!("Rejected flags: {}", summary.rejected_flags);
    println!("Failed steps: {}", summary.failed_steps);
}

fn parse_flag(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid flag value `{s}`: {e}"))
}

fn parse_grid_pos(s: &str) -> Result<GridPos, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: i32 = x.trim().parse().map_err(|e| format!("invalid x `{x}`: {e}"))?;
    let y: i32 = y.trim().parse().map_err(|e| format!("invalid y `{y}`: {e}"))?;
    Ok(GridPos::new(x, y))
}
