use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser)]
#[command(
    author = "portico maintainers",
    version,
    about = "Offline cache driver for the portico news portal",
    long_about = "Drives the portico offline caching worker from the command line.\n\
                  \n\
                  The worker keeps versioned cache partitions on disk, routes requests\n\
                  through per-class caching strategies (app shell, exchange-rate APIs,\n\
                  images, everything else), and answers offline with deterministic\n\
                  fallbacks. Useful for priming a cache directory, inspecting it, and\n\
                  exercising the strategies against the live portal."
)]
pub struct CliArgs {
    /// Directory backing the cache partitions
    #[arg(
        long,
        default_value = "./portico-cache",
        help = "Directory where cache partitions are stored"
    )]
    pub cache_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install this version (pre-populate the static partition) and activate it
    Install,

    /// Route a URL through the offline worker and print the outcome
    Fetch {
        /// URL to resolve through the caching strategies
        url: String,

        /// Treat the request as a full-page navigation
        #[arg(long)]
        navigate: bool,

        /// Write the response body to stdout
        #[arg(short, long)]
        print_body: bool,
    },

    /// Print the current dollar-rate board
    Rates,

    /// Show worker version, state, and partition usage
    Status,

    /// Wipe every cache partition
    Clear,
}
