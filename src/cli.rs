use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "nse-tracker")]
#[command(about = "Poll NSE stock quotes and keep a live table of the latest observation per symbol")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Provider descriptor name under assets/configs, or a path to a JSON file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Track one symbol until Ctrl-C
    Track {
        symbol: String,

        /// Refresh minutes (defaults to the config)
        #[arg(short, long)]
        minutes: Option<String>,

        /// Refresh seconds (defaults to the config)
        #[arg(short, long)]
        seconds: Option<String>,
    },

    /// Fetch a single quote and exit
    Once {
        symbol: String,

        /// Print the observation as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Line-driven console
    Interactive,
}
