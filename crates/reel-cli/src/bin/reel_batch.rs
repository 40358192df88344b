//! Batch vertical conversion into one output directory.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use reel_cli::{init_tracing, run_batch, BatchArgs, ReelConfig};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = match BatchArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = ReelConfig::from_env();
    info!("Reel config: {:?}", config);

    match run_batch(&args, &config).await {
        Ok(summary) if summary.all_succeeded() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("Batch failed: {:#}", e);
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
