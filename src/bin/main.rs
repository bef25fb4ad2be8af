use lifeos_finance::{
    agent::FinanceAgent,
    classifier::KeywordClassifier,
    config::FinanceConfig,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CLI_CONVERSATION: &str = "cli";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = FinanceConfig::from_env()?;
    let agent = FinanceAgent::from_config(&config, Arc::new(KeywordClassifier::new()))?;

    info!(timezone = %config.timezone, "Finance intake ready, reading stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = agent.handle(CLI_CONVERSATION, &line).await?;
        writeln!(stdout, "{}", serde_json::to_string(&outcome)?)?;
        stdout.flush()?;
    }

    Ok(())
}
