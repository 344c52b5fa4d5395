use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use jsg_config::{load_config, split_separators};
use jsg_script::{generate, timestamped_output_dir, GenerateOptions};
use jsg_space::span_parameter_space;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Configuration document.
    #[arg(short, long, default_value = "run_config.json")]
    pub input: PathBuf,
    /// Suffix of every script name.
    #[arg(short, long, visible_alias = "name_suffix", default_value = "script")]
    pub name_suffix: String,
    /// Whitespace separated columns to split scripts on; `algorithms`
    /// splits per executable. Defaults to the document's `separators`,
    /// then to `graphs`.
    #[arg(short, long)]
    pub separator: Option<String>,
    /// Output directory [default: rs_<YYYYmmdd_HHMMSS>].
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args.input)?;
    let table = span_parameter_space(&config)?;
    let out_dir = args.output.clone().unwrap_or_else(timestamped_output_dir);
    info!(input = %args.input.display(), out_dir = %out_dir.display(), "writing script set");
    let options = GenerateOptions {
        name_suffix: args.name_suffix.clone(),
        separators: args.separator.as_deref().map(split_separators),
        config_source: Some(args.input.clone()),
        ..GenerateOptions::default()
    };
    let report = generate(&config, &table, &options, &out_dir)?;
    println!("{}", report.master.display());
    Ok(())
}
