use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use gridlog_core::{Config, Reconciler, Store};

use super::open_store;

#[derive(Subcommand)]
pub enum ReconcileAction {
    /// Run a single reconciliation tick
    Run {
        /// Count without inserting
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the tick on a fixed interval until interrupted
    Watch {
        /// Seconds between ticks (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
        #[arg(long)]
        dry_run: bool,
        /// Stop after this many ticks
        #[arg(long)]
        max_iterations: Option<u64>,
    },
}

pub fn run(action: ReconcileAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store()?;
    let reconciler = Reconciler::with_config(config.reconciler.clone());

    match action {
        ReconcileAction::Run { dry_run } => {
            let dry_run = dry_run || config.reconciler.dry_run;
            let summary = reconciler.run_tick(&store, &store, &store, Utc::now(), dry_run)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        ReconcileAction::Watch {
            interval,
            dry_run,
            max_iterations,
        } => {
            let interval = interval.unwrap_or(config.reconciler.interval_secs);
            let dry_run = dry_run || config.reconciler.dry_run;
            watch(store, reconciler, interval, dry_run, max_iterations)
        }
    }
}

/// Sleep-and-repeat loop around the tick.
///
/// Single-threaded and non-reentrant: each tick runs to completion before
/// the next sleep starts, and the shutdown signal is only observed between
/// ticks.
fn watch(
    store: Store,
    reconciler: Reconciler,
    interval_secs: u64,
    dry_run: bool,
    max_iterations: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let suffix = if dry_run { " (dry-run)" } else { "" };
        println!("Reconciliation watch started{suffix}, interval {interval_secs}s");
        let mut iteration: u64 = 0;

        loop {
            iteration += 1;
            match reconciler.run_tick(&store, &store, &store, Utc::now(), dry_run) {
                Ok(summary) => println!("[tick #{iteration}] {}", summary.message()),
                Err(e) => {
                    tracing::error!(iteration, error = %e, "reconciliation tick failed");
                }
            }

            if let Some(max) = max_iterations {
                if iteration >= max {
                    println!("Reached {max} iterations, stopping");
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {}
                _ = tokio::signal::ctrl_c() => {
                    println!("Interrupt received, stopping watch loop");
                    break;
                }
            }
        }
    });

    Ok(())
}
