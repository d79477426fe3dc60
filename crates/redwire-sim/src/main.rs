mod config;
mod error;
mod layout;
mod sim;

use std::time::Duration;

use config::SimConfig;
use layout::Layout;
use sim::{Simulation, StepReport};
use tracing::{debug, error, info};

fn log_report(report: &StepReport) {
    if report.is_quiet() {
        return;
    }
    info!(
        tick = report.tick,
        actions = report.actions,
        dispatched = report.dispatched,
        changes = report.changes.len(),
        "tick"
    );
    for (pos, block) in &report.changes {
        debug!(tick = report.tick, %pos, block = block.name(), "block changed");
    }
    for (pos, sound) in &report.sounds {
        debug!(tick = report.tick, %pos, ?sound, "sound");
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "sim.toml".into());
    let config = match SimConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("redwire-sim v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Circuit: {}", config.circuit.path);

    let mut sim = match Layout::load(&config.circuit.path).and_then(|l| Simulation::new(&l)) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to build circuit: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "Tick interval: {}ms, max ticks: {}",
        config.world.tick_interval_ms,
        config
            .world
            .max_ticks
            .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut tick_interval =
        tokio::time::interval(Duration::from_millis(config.world.tick_interval_ms));
    let mut script_done = false;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = tick_interval.tick() => {
                let report = sim.step();
                log_report(&report);

                if !script_done && !sim.has_pending_actions() && sim.world().pending_ticks() == 0 {
                    script_done = true;
                    info!("Circuit settled at tick {} with no scripted actions left", report.tick);
                }

                if config.world.max_ticks.is_some_and(|max| report.tick >= max) {
                    info!("Reached max ticks ({})", report.tick);
                    break;
                }
            }
        }
    }

    info!(
        "Stopped at tick {} with {} blocks and {} pending scheduled ticks",
        sim.current_tick(),
        sim.world().len(),
        sim.world().pending_ticks()
    );
}
