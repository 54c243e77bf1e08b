// ABOUTME: Entry point for the IN450 database viewer
// ABOUTME: Parses arguments and starts the console, smoke test or desktop front-end

use anyhow::Result;
use clap::Parser;

use in450_viewer_lib::cli::{Cli, Commands};
use in450_viewer_lib::{console, logging, smoke};

fn main() -> Result<()> {
    // .env is optional; values already in the environment win
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    match cli.command.clone().unwrap_or(Commands::Console) {
        Commands::Console => {
            logging::init(cli.global.verbose);
            console::run_stdio(cli.global.startup())
        }
        Commands::Smoke(args) => {
            logging::init(cli.global.verbose);
            smoke::execute(&args, &cli.global.startup())
        }
        #[cfg(feature = "desktop")]
        Commands::Desktop => Ok(in450_viewer_lib::run(cli.global.startup())?),
    }
}
