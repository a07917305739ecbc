use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gridlog", version, about = "Electricity supply availability logger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a power event
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Availability statistics for a period
    Stats {
        /// User to report on
        #[arg(long)]
        user: String,
        /// Aggregation window: day, week or month
        #[arg(long, default_value = "week")]
        period: String,
        /// Trailing raw events to include
        #[arg(long, default_value_t = 10)]
        recent: usize,
    },
    /// Summary report across the 1/7/30-day windows
    Report {
        #[arg(long)]
        user: String,
    },
    /// Most recent events
    Recent {
        #[arg(long)]
        user: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// User management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Region catalog
    Region {
        #[command(subcommand)]
        action: commands::region::RegionAction,
    },
    /// Reconciliation of timelines with regional schedules
    Reconcile {
        #[command(subcommand)]
        action: commands::reconcile::ReconcileAction,
    },
    /// Generate sample events for all users
    Sample {
        /// Days back to fill
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Minimum events per day
        #[arg(long, default_value_t = 2)]
        min_events: u32,
        /// Maximum events per day
        #[arg(long, default_value_t = 8)]
        max_events: u32,
        /// Fixed RNG seed for reproducible streams
        #[arg(long)]
        seed: Option<u64>,
        /// Count without inserting
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Log { action } => commands::log::run(action),
        Commands::Stats {
            user,
            period,
            recent,
        } => commands::stats::run(&user, &period, recent),
        Commands::Report { user } => commands::report::run(&user),
        Commands::Recent { user, limit } => commands::recent::run(&user, limit),
        Commands::User { action } => commands::user::run(action),
        Commands::Region { action } => commands::region::run(action),
        Commands::Reconcile { action } => commands::reconcile::run(action),
        Commands::Sample {
            days,
            min_events,
            max_events,
            seed,
            dry_run,
        } => commands::sample::run(days, min_events, max_events, seed, dry_run),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
