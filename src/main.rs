use anyhow::Result;
use clap::Parser;
use blockgen_rs_core::cli::Args;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    blockgen_rs_core::run_cli(&args)
}
