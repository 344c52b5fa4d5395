use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Args;
use jsg_config::load_config;
use jsg_space::span_parameter_space;

#[derive(Args, Debug)]
pub struct SpaceArgs {
    /// Configuration document.
    #[arg(short, long, default_value = "run_config.json")]
    pub input: PathBuf,
    /// CSV destination; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &SpaceArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.input)?;
    let table = span_parameter_space(&config)?;
    match &args.output {
        Some(path) => table.write_csv_path(path)?,
        None => table.write_csv(io::stdout().lock())?,
    }
    Ok(())
}
