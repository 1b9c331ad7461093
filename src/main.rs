//! FAAS command-line entry point.

use clap::Parser;
use faas::cli;
use faas::core::user_friendly_error;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    if let Err(e) = cli.execute().await {
        // Convert to user-friendly error with context and suggestions
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(error_ctx.error.exit_code());
    }
}
