#![doc = include_str!("../README.md")]

mod app;

use app::config::{CliArgs, Command, GenerateConfig};
use clap::Parser;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    app::telemetry::init_telemetry()?;

    match args.command {
        Command::Generate(args) => {
            let config = GenerateConfig::try_from(args)?;
            app::generate::run(config).await
        }
        Command::Inspect(args) => app::inspect::run(&args),
    }
}
