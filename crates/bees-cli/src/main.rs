use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use bees_swarm::PollPolicy;

mod commands;
mod logging;

use commands::up::Provider;
use logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "bees",
    about = "Bees — raise swarms of load-generating cloud instances",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Project directory holding beesconfig.json and the hive record
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project_dir: PathBuf,
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = logging::DEFAULT_FILTER)]
    log_level: String,
    /// Line format of bees.log
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Log to the console only, without writing bees.log
    #[arg(long, global = true)]
    no_log_file: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Raise the configured swarm unless one is already active.
    ///
    /// Instances created before a failure are not terminated; tear them
    /// down with your provider's tooling. A successful run records the hive
    /// in current_hive.json, even with the simulated provider; run
    /// `bees forget` to clear it.
    Up {
        /// Cloud provider to reserve instances from
        #[arg(long, value_enum)]
        provider: Provider,
        /// Seconds between status polls
        #[arg(long, default_value = "5")]
        poll_interval: u64,
        /// Give up after this many seconds of polling
        #[arg(long, default_value = "600")]
        timeout: u64,
        /// Give up after this many status polls
        #[arg(long, default_value = "120")]
        max_polls: u32,
    },
    /// Show the active hive, if any
    Status {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Inspect or write beesconfig.json
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Delete the hive record after the swarm was torn down elsewhere
    Forget,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the current (defaulted) config to beesconfig.json
    Init {
        /// Overwrite an existing beesconfig.json
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config, derived region, and key path
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = (!cli.no_log_file).then(|| PathBuf::from(logging::LOG_FILE));
    logging::init(&cli.log_level, log_file.as_deref(), cli.log_format)?;

    match cli.command {
        Commands::Up {
            provider,
            poll_interval,
            timeout,
            max_polls,
        } => {
            let policy = PollPolicy::default()
                .with_interval(Duration::from_secs(poll_interval))
                .with_deadline(Duration::from_secs(timeout))
                .with_max_attempts(max_polls);
            commands::up::up(&cli.project_dir, provider, policy).await
        }
        Commands::Status { format } => commands::hive::status(&cli.project_dir, &format),
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config::init(&cli.project_dir, force),
            ConfigAction::Show => commands::config::show(&cli.project_dir),
        },
        Commands::Forget => commands::hive::forget(&cli.project_dir),
    }
}
