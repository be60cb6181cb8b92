use super::SubmitBudget;
use crate::config::Config;
use async_trait::async_trait;
use budgethook_domain::{
    budget::{Budget, CreateBudgetRequest},
    BudgetHookError, InternalError,
};
use google_token_fetcher::{GoogleTokenFetcher, TokenFetcherConfig};
use http::header::AUTHORIZATION;
use reqwest::Client as ReqwestClient;
use tracing::{error, info, warn};

/// Submits budgets to the Cloud Billing Budget API.
///
/// Nothing is shared between calls: each submission builds its own HTTP client
/// and access token and drops both once the call returns.
#[derive(Clone)]
pub struct GoogleBudgetSubmitter {
    base_url: String,
    token: TokenFetcherConfig,
}

impl GoogleBudgetSubmitter {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.billing_api_base_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        }
    }

    async fn connect(&self) -> Result<(ReqwestClient, String), BudgetHookError> {
        let client = ReqwestClient::builder().build().map_err(|err| {
            error!("NewBudgetClient: {err}");
            InternalError::connection_error(
                &format!("Failed to create client: {err}"),
                Some("client"),
            )
        })?;

        let token = GoogleTokenFetcher::with_client(client.clone(), &self.token)
            .get_token()
            .await
            .map_err(|err| {
                error!("NewBudgetClient: {err:#}");
                InternalError::connection_error(
                    &format!("Failed to get access token: {err:#}"),
                    Some("token"),
                )
            })?;

        Ok((client, token))
    }
}

#[async_trait]
impl SubmitBudget for GoogleBudgetSubmitter {
    async fn submit_budget(
        &self,
        request: &CreateBudgetRequest,
    ) -> Result<Budget, BudgetHookError> {
        info!("createBudget start: {request:?}");

        let (client, token) = self.connect().await?;
        let url = format!("{}/{}/budgets", self.base_url, request.parent);

        let response = client
            .post(&url)
            .header(AUTHORIZATION, token)
            .json(&request.budget)
            .send()
            .await
            .map_err(|err| {
                error!("CreateBudget failed for {request:?}: {err}");
                InternalError::upstream_error(
                    &format!("Failed to send request: {err}"),
                    Some("CreateBudget"),
                )
            })?;

        let status = response.status();
        let content = response.text().await.map_err(|err| {
            error!("CreateBudget failed for {request:?}: {err}");
            InternalError::upstream_error(
                &format!("Failed to read response: {err}"),
                Some("CreateBudget"),
            )
        })?;

        if !status.is_success() {
            error!(
                "CreateBudget failed for {request:?}: status {}, body {content}",
                status.as_u16()
            );
            return Err(InternalError::upstream_error(
                &format!("Response Status: {}", status.as_u16()),
                Some("CreateBudget"),
            ));
        }

        // The budget exists once the API answers 2xx, whatever the body looks like
        let budget = match serde_json::from_str::<Budget>(&content) {
            Ok(budget) => budget,
            Err(err) => {
                warn!("CreateBudget returned an unreadable budget ({err}): {content}");
                request.budget.clone()
            }
        };

        info!("CreateBudget: {budget:?}");

        Ok(budget)
    }
}
