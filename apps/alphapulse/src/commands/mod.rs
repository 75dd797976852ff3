mod collect;
mod common;
mod migrate;
mod simulate;
mod train;
mod validate;

use std::path::PathBuf;

pub enum Command {
    Simulate {
        config: PathBuf,
        out: Option<PathBuf>,
    },
    TrainReport {
        config: PathBuf,
        epochs: Option<u32>,
    },
    Collect {
        config: PathBuf,
        max_polls: Option<u64>,
    },
    Migrate {
        config: Option<PathBuf>,
        db_url: Option<String>,
        sql: PathBuf,
    },
    Validate {
        config: PathBuf,
        strict: bool,
        out: Option<PathBuf>,
    },
}

pub fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Simulate { config, out } => simulate::run_simulate(config, out),
        Command::TrainReport { config, epochs } => train::run_train_report(config, epochs),
        Command::Collect { config, max_polls } => collect::run_collect(config, max_polls),
        Command::Migrate {
            config,
            db_url,
            sql,
        } => migrate::run_migrate(config, db_url, sql),
        Command::Validate {
            config,
            strict,
            out,
        } => validate::run_validate(config, strict, out),
    }
}
