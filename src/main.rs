//! medchat binary entry point.

use clap::Parser;
use medchat::cli::telemetry::{self, LogTarget};
use medchat::cli::{app, format_error_help, Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config();

    let result = match cli.command() {
        Commands::Chat => {
            let target = match cli.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Discard,
            };
            match telemetry::init(target) {
                Ok(()) => app::run_chat(config).await,
                Err(e) => Err(e),
            }
        }
        Commands::Search(args) => {
            let target = match cli.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Stderr,
            };
            match telemetry::init(target) {
                Ok(()) => app::run_search(config, args).await,
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error_help(&e));
        std::process::exit(1);
    }
}
