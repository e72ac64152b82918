use anyhow::Context;
use clap::Parser;

use tagcache::cache;
use tagcache::cli::{Cli, execute_command, load_and_merge_config};
use tagcache::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli).context("Failed to load configuration")?;
    init_logger(&settings.logger.to_logger_config()).context("Failed to initialize logger")?;

    let mut client = cache::connect(&settings)
        .await
        .context("Failed to connect cache backend")?;
    tracing::debug!(
        version = tagcache::pkg_version(),
        domain = client.domain(),
        mode = ?client.mode(),
        "Cache client ready"
    );

    let outcome = execute_command(&cli.command, &mut client).await;

    if !cli.quiet {
        eprintln!("stats: {}", serde_json::to_string(&client.stats())?);
    }
    for error in client.take_errors() {
        eprintln!("error: {}", error);
    }

    let value = outcome.context("Command failed")?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
