use clap::Parser;

use nse_tracker::app;
use nse_tracker::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(err) = app::run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
