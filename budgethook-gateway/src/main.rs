use anyhow::{Context, Result};
use budgethook_domain::telemetry::{get_subscriber, init_subscriber};
use budgethook_gateway::{config::Config, server::Server, submitter::google::GoogleBudgetSubmitter};
use dotenvy::dotenv;
use envconfig::Envconfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::init_from_env().context("Could not load config")?;

    let subscriber = get_subscriber(
        "budgethook-gateway".into(),
        "info".into(),
        config.environment,
        std::io::stdout,
    );
    init_subscriber(subscriber);

    info!("Starting budgethook-gateway with config:\n{config}");

    let submitter = GoogleBudgetSubmitter::new(&config);
    let server = Server::new(config, submitter);

    server.run().await
}
