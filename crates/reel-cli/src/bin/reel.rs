//! Single-file vertical conversion.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use reel_cli::{init_tracing, run_single, ReelConfig, SingleArgs};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = match SingleArgs::try_parse() {
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

    match run_single(&args, &config).await {
        Ok(()) => {
            println!("SUCCESS: Video processed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(input = %args.input.display(), "Conversion failed: {:#}", e);
            eprintln!("ERROR: {:#}", e);
            eprintln!("FAILED: Video processing failed");
            ExitCode::FAILURE
        }
    }
}
