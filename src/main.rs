//! Binary entrypoint for the craftledger CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `check` - validate the configuration and print the active rule set
//! - `simulate --world <file.json> [--ticks N] [--realtime] [--shuffle] [--ephemeral]` -
//!   replay a world snapshot through the rules and print every host event
//!
//! See the library crate docs for module-level details: `craftledger::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};

use craftledger::config::Config;
use craftledger::host::sim::SimulatedWorld;
use craftledger::metrics;
use craftledger::rules::{Requirement, RuleEngine};
use craftledger::storage::WorldStore;

#[derive(Parser)]
#[command(name = "craftledger")]
#[command(about = "Currency, transfer and achievement rules for hosted block-game servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Validate the configuration and list the active rules
    Check,
    /// Replay a JSON world snapshot through the rules
    Simulate {
        /// World snapshot (players, positions, inventories)
        #[arg(short, long)]
        world: String,
        /// Number of game ticks to run
        #[arg(short, long, default_value_t = 200)]
        ticks: u64,
        /// Pace ticks at the configured ticks per second instead of running flat out
        #[arg(long)]
        realtime: bool,
        /// Enumerate players in a random order every poll
        #[arg(long)]
        shuffle: bool,
        /// Use a throwaway store instead of `<data_dir>/world`
        #[arg(long)]
        ephemeral: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init runs before a config file exists
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            info!("Writing default configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Check => {
            let config = match pre_config {
                Some(cfg) => cfg,
                None => Config::load(&cli.config).await?,
            };
            config.validate()?;
            print_rules(&config);
        }
        Commands::Simulate {
            world,
            ticks,
            realtime,
            shuffle,
            ephemeral,
        } => {
            let config = match pre_config {
                Some(cfg) => cfg,
                None => {
                    warn!("No usable config at {}; using defaults", cli.config);
                    Config::default()
                }
            };
            config.validate()?;

            let store = if ephemeral {
                WorldStore::temporary()?
            } else {
                let path = std::path::Path::new(&config.storage.data_dir).join("world");
                info!("Opening world store at {}", path.display());
                WorldStore::open(path)?
            };
            let file = SimulatedWorld::load_world_file(&world).await?;
            let mut sim = SimulatedWorld::from_world_file(store, file)?;
            sim.set_shuffle_players(shuffle);

            let mut engine = RuleEngine::new(&config);
            info!("Simulating {} ticks of {}", ticks, world);

            let tick_ms = 1000 / u64::from(config.schedule.ticks_per_second.max(1));
            let period = tokio::time::Duration::from_millis(tick_ms.max(1));
            let mut pacer = tokio::time::interval(period);
            pacer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            for _ in 0..ticks {
                if realtime {
                    pacer.tick().await;
                }
                let report = engine.tick(&mut sim);
                for event in sim.drain_outbox() {
                    println!("[{:>6}] {}", report.tick, serde_json::to_string(&event)?);
                }
            }

            let summary = serde_json::json!({
                "ticks": engine.current_tick(),
                "players_observed": engine.obtained().players(),
                "metrics": metrics::snapshot(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn print_rules(config: &Config) {
    let tps = u64::from(config.schedule.ticks_per_second.max(1));
    println!("Server: {}", config.server.name);
    println!(
        "Ledger: objective '{}' ({}), sound {}",
        config.ledger.objective, config.ledger.display_name, config.ledger.sound.name
    );
    if config.transfer.enabled {
        println!(
            "Transfers: hold {} named send<N>{} within {} blocks",
            config.transfer.marker_item, config.ledger.currency_suffix, config.transfer.range
        );
    }
    if config.discovery.enabled {
        println!(
            "Discovery: +{} per new item type, {} milestones",
            config.discovery.first_item_reward,
            config.discovery.milestones.len()
        );
    }
    for rule in &config.achievements {
        let kind = match &rule.requirement {
            Requirement::AnyOf { items } => format!("any of {} items", items.len()),
            Requirement::AllOf { items } => format!("all of {} items", items.len()),
            Requirement::SlotRange { first, last, allowed } => {
                format!("slots {}-{} filled with {}", first, last, allowed.join(" / "))
            }
        };
        println!(
            "Achievement '{}': {} -> +{} (every {:.1}s)",
            rule.title,
            kind,
            rule.reward,
            rule.interval_ticks as f64 / tps as f64
        );
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(f) = log_file {
        let file = std::sync::Mutex::new(f);
        // Mirror to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
