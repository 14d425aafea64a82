use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "veristat")]
#[command(about = "Risk scoring and safer-combination recommendation for resource-group audit data")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (json, terminal)
    #[arg(short, long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Write output to file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Catalog YAML overriding the built-in feature/category tables
    #[arg(long)]
    pub catalog: Option<String>,

    /// Upper bound on category combinations per feature set
    #[arg(long)]
    pub max_combinations: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score the failure rate of an exact feature set
    Score {
        /// Audit dataset CSV
        #[arg(long)]
        data: String,

        /// Feature names forming the query set
        #[arg(required = true)]
        features: Vec<String>,
    },

    /// Rank safer feature groups sharing the query's category profile
    Recommend {
        /// Audit dataset CSV
        #[arg(long)]
        data: String,

        /// Override the primary-parent category profile
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Feature names forming the query set
        #[arg(required = true)]
        features: Vec<String>,
    },

    /// Build the engine and report table statistics
    Inspect {
        /// Audit dataset CSV
        #[arg(long)]
        data: String,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output for machine consumption
    Json,
    /// Human-readable terminal output
    Terminal,
}
