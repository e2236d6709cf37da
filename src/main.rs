//! Binary entrypoint for the creativebot CLI.
//!
//! Commands:
//! - `init` - write a starter `creativebot.toml`
//! - `simulate [--ack] [--to x,y,z] [--reject <id>...]` - run a scripted creative session
//!   against the in-process simulated host and print a JSON summary
//!
//! See the library crate docs for module-level details: `creativebot::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use creativebot::config::Config;
use creativebot::geometry::Vec3;

#[derive(Parser)]
#[command(name = "creativebot")]
#[command(about = "Creative-mode inventory and flight control for game agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "creativebot.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Run a scripted session against the simulated host
    Simulate {
        /// Simulated host acknowledges creative slot requests
        #[arg(long)]
        ack: bool,
        /// Flight destination as x,y,z
        #[arg(long, default_value = "4,70,-3")]
        to: Vec3,
        /// Item ids the simulated host refuses (adds to the configured list)
        #[arg(long)]
        reject: Vec<u32>,
        /// Seconds to allow the flight before giving up
        #[arg(long, default_value_t = 30)]
        flight_timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config is optional for every command; fall back to defaults when absent.
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
        Commands::Simulate {
            ack,
            to,
            reject,
            flight_timeout,
        } => {
            #[cfg(not(feature = "simulation"))]
            {
                let _ = (ack, to, reject, flight_timeout);
                log::error!("simulate requires the 'simulation' feature");
                std::process::exit(2);
            }
            #[cfg(feature = "simulation")]
            {
                let mut config = pre_config.unwrap_or_default();
                config.simulation.acknowledge |= ack;
                config.simulation.reject_item_ids.extend(reject);
                let summary = simulate(config, to, flight_timeout).await?;
                println!("{}", summary);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "simulation")]
async fn simulate(
    config: Config,
    destination: Vec3,
    flight_timeout: u64,
) -> Result<serde_json::Value> {
    use creativebot::creative::Creative;
    use creativebot::inventory::InventoryView;
    use creativebot::physics::Body;
    use creativebot::sim::{self, SimulatedHost};
    use std::sync::Arc;
    use std::time::Duration;

    info!("Starting creativebot v{} simulation", env!("CARGO_PKG_VERSION"));
    let inventory = Arc::new(InventoryView::new());
    let body = Arc::new(Body::at(Vec3::new(0.0, 64.0, 0.0)));
    let (link, host) = SimulatedHost::start(config.simulation.clone(), Arc::clone(&inventory));
    let ticker = sim::start_ticker(Arc::clone(&body), config.simulation.tick());
    let creative = Creative::new(
        link.clone(),
        Arc::clone(&inventory),
        Arc::clone(&body),
        &config,
    );

    let mut placements = Vec::new();
    for (slot, (id, name)) in (36..=44).zip(sim::ITEMS.iter()) {
        let item = creativebot::item::Item::new(*id, name, 1);
        let outcome = creative.set_inventory_slot(slot, Some(item)).await;
        if let Err(ref e) = outcome {
            log::warn!("slot {}: {}", slot, e);
        }
        placements.push(serde_json::json!({
            "slot": slot,
            "item": name,
            "result": outcome.map(|_| "ok".to_string()).unwrap_or_else(|e| e.to_string()),
        }));
    }
    let filled = inventory.occupied().len();

    let cleared = creative.clear_inventory().await;

    let flight = tokio::time::timeout(
        Duration::from_secs(flight_timeout),
        creative.fly_to(destination),
    )
    .await;
    let flight_result = match flight {
        Ok(Ok(())) => "arrived".to_string(),
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("no move confirmation within {}s", flight_timeout),
    };
    creative.stop_flying();

    ticker.abort();
    let packets_sent = link.sent().len();
    drop(creative);
    drop(link);
    let _ = host.await;

    Ok(serde_json::json!({
        "acknowledge": config.simulation.acknowledge,
        "placements": placements,
        "slots_filled": filled,
        "clear_inventory": cleared.map(|_| "ok".to_string()).unwrap_or_else(|e| e.to_string()),
        "slots_left": inventory.occupied().len(),
        "flight": flight_result,
        "position": body.position(),
        "flying": body.has_override(creativebot::physics::GRAVITY_OVERRIDE),
        "packets_sent": packets_sent,
        "metrics": creativebot::metrics::snapshot(),
    }))
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.clone())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });
    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
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
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
