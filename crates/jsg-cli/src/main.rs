use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    generate::{self, GenerateArgs},
    space::{self, SpaceArgs},
    validate::{self, ValidateArgs},
    version::{self, VersionArgs},
};

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "jsg",
    about = "Expand experiment configurations into batch job scripts",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Option<Command>,
    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write node scripts and the master script (default).
    Generate(GenerateArgs),
    /// Export the expanded parameter space as CSV.
    Space(SpaceArgs),
    /// Parse and expand a configuration without writing scripts.
    Validate(ValidateArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.quiet);
    match cli.command {
        None => generate::run(&cli.generate),
        Some(Command::Generate(args)) => generate::run(&args),
        Some(Command::Space(args)) => space::run(&args),
        Some(Command::Validate(args)) => validate::run(&args),
        Some(Command::Version(args)) => version::run(&args),
    }
}
