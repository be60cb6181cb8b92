use crate::{config::Config, submitter::SubmitBudget};
use anyhow::{anyhow, Result};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{
        header::{AUTHORIZATION, COOKIE, USER_AGENT},
        HeaderMap, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json, Router,
};
use budgethook_domain::{
    backlog::BacklogIssueWebhook,
    budget::{Budget, CreateBudgetRequest},
    description::DescriptionInfo,
    ApplicationError, BudgetHookError, InternalError,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{sensitive_headers::SetSensitiveRequestHeadersLayer, trace::TraceLayer};
use tracing::{error, info, warn};

pub struct AppState {
    pub config: Config,
    pub submitter: Arc<dyn SubmitBudget + Sync + Send>,
}

impl AppState {
    pub fn new(config: Config, submitter: Arc<dyn SubmitBudget + Sync + Send>) -> Self {
        Self { config, submitter }
    }
}

#[derive(Clone)]
pub struct Server {
    config: Config,
    submitter: Arc<dyn SubmitBudget + Sync + Send>,
}

impl Server {
    pub fn new(config: Config, submitter: impl SubmitBudget + Sync + Send + 'static) -> Self {
        Self {
            config,
            submitter: Arc::new(submitter),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let app = self.router();
        info!("Webhook server listening on {}", self.config.address);

        let tcp_listener = TcpListener::bind(&self.config.address)
            .await
            .map_err(|e| anyhow!("Failed to bind to address: {}", e))?;

        let token = CancellationToken::new();
        let cloned_token = token.clone();
        ctrlc::try_set_handler(move || {
            info!("Received Ctrl+C, shutting down...");
            cloned_token.cancel();
        })?;

        axum::serve(tcp_listener, app.into_make_service())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
            .map_err(|e| anyhow!("Server error: {}", e))
    }

    /// Every path and method reaches the same handler, which does its own checks.
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState::new(self.config.clone(), self.submitter.clone()));
        Router::new()
            .fallback(receive_webhook)
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION, COOKIE]))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Runs one webhook through validation, parsing and submission.
    pub async fn handle_webhook(
        method: &Method,
        headers: &HeaderMap,
        body: Result<&Bytes, &BytesRejection>,
        state: &AppState,
    ) -> Result<Budget, BudgetHookError> {
        let user_agent = headers.get(USER_AGENT).map(|value| value.to_str());
        if !matches!(user_agent, Some(Ok(value)) if value == state.config.expected_user_agent) {
            error!("Invalid userAgent: {user_agent:?}");
            return Err(ApplicationError::forbidden(
                "Invalid user agent",
                Some("UserAgent"),
            ));
        }

        if *method != Method::POST {
            error!("Invalid method: {method}");
            return Err(ApplicationError::method_not_allowed(
                &format!("Method {method} is not supported"),
                None,
            ));
        }

        let body = body.map_err(|rejection| {
            let reason = rejection.body_text();
            error!("Failed to read webhook body: {reason}");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApplicationError::payload_too_large(&reason, Some("Body"))
            } else {
                ApplicationError::bad_request(&reason, Some("Body"))
            }
        })?;

        let webhook = serde_json::from_slice::<BacklogIssueWebhook>(body).map_err(|e| {
            error!("Failed to deserialize webhook payload: {e}");
            InternalError::deserialize_error(
                &format!("Failed to deserialize payload: {e}"),
                Some("BacklogIssueWebhook"),
            )
        })?;

        info!("Parsing description of issue {}", webhook.id);
        let description = webhook
            .description()
            .parse::<DescriptionInfo>()
            .map_err(|e| {
                error!("Failed to parse description {:?}: {e}", webhook.description());
                BudgetHookError::from(e)
            })?;

        let request = CreateBudgetRequest::new(&description, &state.config.currency_code);
        let budget = state.submitter.submit_budget(&request).await.map_err(|e| {
            error!("createBudget failed: {e}");
            e
        })?;

        info!(
            "Created budget {} for project {}",
            budget.name.as_deref().unwrap_or("<unnamed>"),
            description.project_id
        );

        Ok(budget)
    }
}

async fn receive_webhook(
    method: Method,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = Server::handle_webhook(&method, &headers, body.as_ref(), &state).await;

    if state.config.silent_failures {
        if let Err(e) = &result {
            warn!("Answering 200 despite failure: {e}");
        }
        return StatusCode::OK.into_response();
    }

    match result {
        Ok(budget) => Json(budget).into_response(),
        Err(e) => e.into_response(),
    }
}
