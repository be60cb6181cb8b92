use anyhow::{Context, Result};
use envconfig::Envconfig;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use tracing::debug;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const HEADER_KEY: &str = "Metadata-Flavor";
const HEADER_VALUE: &str = "Google";

#[derive(Envconfig, Clone)] // Intentionally no Debug so the token is not printed
pub struct TokenFetcherConfig {
    #[envconfig(from = "GOOGLE_METADATA_URL", default = "http://metadata.google.internal")]
    pub metadata_url: String,
    /// Skips the metadata server entirely, for running outside Google Cloud.
    #[envconfig(from = "GOOGLE_ACCESS_TOKEN")]
    pub access_token: Option<String>,
}

impl Default for TokenFetcherConfig {
    fn default() -> Self {
        Self {
            metadata_url: "http://metadata.google.internal".to_owned(),
            access_token: None,
        }
    }
}

impl Display for TokenFetcherConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "GOOGLE_METADATA_URL: {}", self.metadata_url)?;
        match self.access_token {
            Some(_) => write!(f, "GOOGLE_ACCESS_TOKEN: ****"),
            None => write!(f, "GOOGLE_ACCESS_TOKEN: <unset>"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    access_token: String,
    expires_in: u64,
    token_type: String,
}

#[derive(Debug, Clone)]
pub struct GoogleTokenFetcher {
    client: Client,
    metadata_url: String,
    access_token: Option<String>,
}

impl GoogleTokenFetcher {
    pub fn new(config: &TokenFetcherConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &TokenFetcherConfig) -> Self {
        Self {
            client,
            metadata_url: config.metadata_url.trim_end_matches('/').to_owned(),
            access_token: config.access_token.clone(),
        }
    }

    /// Returns a ready-to-use `Authorization` header value.
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = &self.access_token {
            return Ok(format!("Bearer {token}"));
        }

        let res = self
            .client
            .get(format!("{}{TOKEN_PATH}", self.metadata_url))
            .header(HEADER_KEY, HEADER_VALUE)
            .send()
            .await
            .context("Could not reach the metadata server")?
            .error_for_status()
            .context("Metadata server refused the token request")?
            .json::<GoogleTokenResponse>()
            .await
            .context("Invalid token response from the metadata server")?;

        debug!(
            "Fetched {} access token valid for {}s",
            res.token_type, res.expires_in
        );

        Ok(format!("Bearer {}", res.access_token))
    }
}
