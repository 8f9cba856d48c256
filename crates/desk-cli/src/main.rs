use anyhow::Result;
use clap::Parser;
use desk_cli::{Cli, DeskConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    desk_cli::run(cli, DeskConfig::default(), &mut stdout)
}
