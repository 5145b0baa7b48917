use anyhow::Result;
use clap::Parser;
use quest_preview::{cli::Cli, runner};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quest_preview=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let summary = runner::run(&cli, &mut stdout.lock())?;

    eprintln!(
        "Previewed {} pages ({} with quest content)",
        summary.pages, summary.with_content
    );

    Ok(())
}
