// src/args.rs
use clap::{Parser, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "opsminer",
    version,
    about = "Count operator call sites in archived repository snapshots"
)]
pub struct Args {
    /// Configuration file (distribution, fileExtensions, ...)
    #[arg(
        long,
        short,
        value_hint = ValueHint::FilePath,
        default_value = "configs/config.json"
    )]
    pub config: PathBuf,

    /// Count imports of Java collection-like libraries and report the
    /// operator counts of the sampled files for false-positive review
    #[arg(long)]
    pub check_false_positives: bool,
}
