use lifeos_finance::{
    agent::FinanceAgent,
    api::start_server,
    classifier::KeywordClassifier,
    config::FinanceConfig,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = FinanceConfig::from_env()?;

    info!("LifeOS Finance - API Server");
    info!(
        port = config.port,
        timezone = %config.timezone,
        confidence_threshold = config.confidence_threshold,
        "Configuration loaded"
    );

    let agent = Arc::new(FinanceAgent::from_config(
        &config,
        Arc::new(KeywordClassifier::new()),
    )?);

    info!("Finance agent initialized");

    start_server(agent, config.port).await?;

    Ok(())
}
