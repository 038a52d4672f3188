use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "doculog")]
#[command(author, version, about = "Generate a changelog from your git history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate or update the project changelog from git history
    Generate {
        /// Discard the existing changelog instead of merging into it
        #[clap(long, default_value_t = false)]
        overwrite: bool,

        /// Project root directory (defaults to the current directory)
        #[clap(short, long)]
        path: Option<String>,

        /// Enable verbose output with additional information
        #[clap(short, long, default_value_t = false)]
        verbose: bool,
    },
}
