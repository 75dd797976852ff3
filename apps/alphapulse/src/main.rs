mod commands;
mod infra;
mod obs;

use clap::{Parser, Subcommand};
use commands::Command;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alphapulse")]
#[command(about = "AlphaPulse CLI", version, arg_required_else_help = true)]
#[command(
    after_help = "Examples:\n  alphapulse simulate --config platform/ops/configs/sample.toml --out runs/\n  alphapulse validate --config platform/ops/configs/sample.toml --strict\n  alphapulse train-report --config platform/ops/configs/sample.toml\n  alphapulse collect --config platform/ops/configs/sample.toml --max-polls 30\n  alphapulse migrate --config platform/ops/configs/sample.toml --sql platform/ops/migrations/0001_alphapulse.sql\n"
)]
struct Cli {
    /// Log filter used when ALPHAPULSE_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Log output format: text | json
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
    /// Serve Prometheus metrics on host:port.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Roll the configured baseline policy through the environment.
    Simulate {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Evaluate one episode per epoch and append it to the growth log.
    TrainReport {
        #[arg(long)]
        config: PathBuf,
        /// Overrides training.epochs.
        #[arg(long)]
        epochs: Option<u32>,
    },
    /// Poll the order book and append ticks to the local log.
    Collect {
        #[arg(long)]
        config: PathBuf,
        /// Overrides collector.max_polls.
        #[arg(long)]
        max_polls: Option<u64>,
    },
    /// Apply a SQL migration to the configured Postgres database.
    Migrate {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides remote.db_url and ALPHAPULSE_DB_URL.
        #[arg(long)]
        db_url: Option<String>,
        #[arg(long, default_value = "platform/ops/migrations/0001_alphapulse.sql")]
        sql: PathBuf,
    },
    /// Check the OHLCV dataset and print its data-quality report.
    Validate {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, default_value_t = false)]
        strict: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let command = match cli.command {
        CliCommand::Simulate { config, out } => Command::Simulate { config, out },
        CliCommand::TrainReport { config, epochs } => Command::TrainReport { config, epochs },
        CliCommand::Collect { config, max_polls } => Command::Collect { config, max_polls },
        CliCommand::Migrate {
            config,
            db_url,
            sql,
        } => Command::Migrate {
            config,
            db_url,
            sql,
        },
        CliCommand::Validate {
            config,
            strict,
            out,
        } => Command::Validate {
            config,
            strict,
            out,
        },
    };

    if let Err(err) = commands::run(command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
