mod cli;
mod config;
mod error;
mod generate;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            overwrite,
            path,
            verbose,
        } => generate::execute(overwrite, path, verbose),
    };

    if let Err(err) = result {
        eprintln!("{} {}", "Error:".bold().red(), err.user_message());
        process::exit(1);
    }
}
