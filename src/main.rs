use anyhow::Context;
use clap::Parser;
use opsminer::args::Args;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match opsminer::app::run(&args)
        .with_context(|| format!("mining run with '{}' failed", args.config.display()))
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
