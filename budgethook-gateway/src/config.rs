use budgethook_domain::environment::Environment;
use envconfig::Envconfig;
use google_token_fetcher::TokenFetcherConfig;
use std::{
    fmt::{Display, Formatter},
    net::SocketAddr,
};

#[derive(Envconfig, Clone)] // Intentionally no Debug so the access token is not printed
pub struct Config {
    #[envconfig(from = "SERVER_ADDRESS", default = "0.0.0.0:8080")]
    pub address: SocketAddr,
    #[envconfig(from = "ENVIRONMENT", default = "live")]
    pub environment: Environment,
    #[envconfig(from = "EXPECTED_USER_AGENT", default = "Backlog Webhook")]
    pub expected_user_agent: String,
    /// Answer every webhook with an empty 200, reporting failures only in the logs.
    #[envconfig(from = "SILENT_FAILURES", default = "true")]
    pub silent_failures: bool,
    /// Larger bodies are rejected with 413, or an empty 200 in silent mode.
    #[envconfig(from = "MAX_BODY_BYTES", default = "2097152")]
    pub max_body_bytes: usize,
    #[envconfig(from = "CURRENCY_CODE", default = "JPY")]
    pub currency_code: String,
    #[envconfig(
        from = "BILLING_API_BASE_URL",
        default = "https://billingbudgets.googleapis.com/v1"
    )]
    pub billing_api_base_url: String,
    #[envconfig(nested = true)]
    pub token: TokenFetcherConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SERVER_ADDRESS: {}", self.address)?;
        writeln!(f, "ENVIRONMENT: {}", self.environment)?;
        writeln!(f, "EXPECTED_USER_AGENT: {}", self.expected_user_agent)?;
        writeln!(f, "SILENT_FAILURES: {}", self.silent_failures)?;
        writeln!(f, "MAX_BODY_BYTES: {}", self.max_body_bytes)?;
        writeln!(f, "CURRENCY_CODE: {}", self.currency_code)?;
        writeln!(f, "BILLING_API_BASE_URL: {}", self.billing_api_base_url)?;
        writeln!(f, "{}", self.token)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            environment: Environment::Test,
            expected_user_agent: "Backlog Webhook".to_owned(),
            silent_failures: true,
            max_body_bytes: 2 * 1024 * 1024,
            currency_code: "JPY".to_owned(),
            billing_api_base_url: "https://billingbudgets.googleapis.com/v1".to_owned(),
            token: TokenFetcherConfig::default(),
        }
    }
}
