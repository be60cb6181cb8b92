use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, USER_AGENT},
        Method, Request, StatusCode,
    },
};
use budgethook_domain::description::DescriptionInfo;
use budgethook_gateway::{
    config::Config, server::Server, submitter::google::GoogleBudgetSubmitter,
};
use google_token_fetcher::TokenFetcherConfig;
use http_body_util::BodyExt;
use mockito::{Matcher, Server as MockServer, ServerGuard};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

struct TestServer {
    server: Server,
    mock_server: ServerGuard,
}

impl TestServer {
    async fn new() -> Self {
        let mock_server = MockServer::new_async().await;

        let mut config = Config::new();
        config.silent_failures = false;
        config.billing_api_base_url = format!("{}/v1", mock_server.url());
        config.token = TokenFetcherConfig {
            metadata_url: mock_server.url(),
            access_token: None,
        };

        let submitter = GoogleBudgetSubmitter::new(&config);

        Self {
            server: Server::new(config, submitter),
            mock_server,
        }
    }

    async fn send(&self, method: Method, user_agent: &str, body: String) -> (StatusCode, Value) {
        let response = self
            .server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method(method)
                    .header(CONTENT_TYPE, "application/json")
                    .header(USER_AGENT, user_agent)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, body)
    }
}

fn issue_created(description: &str) -> String {
    json!({
        "id": 51232,
        "project": {"id": 12, "projectKey": "INFRA", "name": "Infrastructure"},
        "type": 1,
        "content": {
            "id": 3312,
            "key_id": 44,
            "summary": "New budget",
            "description": description,
            "issueType": {"id": 7, "projectId": 12, "name": "Task", "color": "#7ea800", "displayOrder": 0},
            "priority": {"id": 3, "name": "Normal"},
            "status": {"id": 1, "name": "Open"},
            "customFields": [],
            "attachments": []
        },
        "notifications": [],
        "createdUser": {"id": 9, "userId": null, "name": "Hanako", "roleType": 1},
        "created": "2024-04-01T09:30:00Z"
    })
    .to_string()
}

#[tokio::test]
async fn creates_budget_on_billing_account() {
    let mut test = TestServer::new().await;
    let info = DescriptionInfo::new("proj-1", "012345-ABCDEF", 50000);

    let token = test
        .mock_server
        .mock("GET", TOKEN_PATH)
        .match_header("metadata-flavor", "Google")
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.e2e","expires_in":3599,"token_type":"Bearer"}"#)
        .create_async()
        .await;
    let budget = test
        .mock_server
        .mock("POST", "/v1/billingAccounts/012345-ABCDEF/budgets")
        .match_header("authorization", "Bearer ya29.e2e")
        .match_body(Matcher::PartialJson(json!({
            "displayName": "proj-1",
            "amount": {"specifiedAmount": {"currencyCode": "JPY", "units": "50000"}}
        })))
        .with_status(200)
        .with_body(
            json!({
                "name": "billingAccounts/012345-ABCDEF/budgets/created-1",
                "displayName": "proj-1",
                "amount": {"specifiedAmount": {"currencyCode": "JPY", "units": "50000"}}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (status, body) = test
        .send(
            Method::POST,
            "Backlog Webhook",
            issue_created(&info.to_string()),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["name"],
        "billingAccounts/012345-ABCDEF/budgets/created-1"
    );
    token.assert_async().await;
    budget.assert_async().await;
}

#[tokio::test]
async fn billing_api_failure_is_reported_as_bad_gateway() {
    let mut test = TestServer::new().await;

    test.mock_server
        .mock("GET", TOKEN_PATH)
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.e2e","expires_in":3599,"token_type":"Bearer"}"#)
        .create_async()
        .await;
    let budget = test
        .mock_server
        .mock("POST", "/v1/billingAccounts/012345-ABCDEF/budgets")
        .with_status(400)
        .with_body(r#"{"error": {"code": 400, "status": "INVALID_ARGUMENT"}}"#)
        .create_async()
        .await;

    let (status, body) = test
        .send(
            Method::POST,
            "Backlog Webhook",
            issue_created("ProjectId: proj-1\nBillingAccountId: 012345-ABCDEF\nBudget[¥]: 50000"),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["error"]["key"],
        "err::application::bad_gateway::create_budget"
    );
    budget.assert_async().await;
}

#[tokio::test]
async fn rejected_webhooks_never_reach_billing_api() {
    let mut test = TestServer::new().await;

    let token = test
        .mock_server
        .mock("GET", TOKEN_PATH)
        .expect(0)
        .create_async()
        .await;
    let budget = test
        .mock_server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let description = "ProjectId: proj-1\nBillingAccountId: 012345-ABCDEF\nBudget[¥]: 50000";

    let (status, _) = test
        .send(Method::POST, "Mozilla/5.0", issue_created(description))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = test
        .send(Method::PUT, "Backlog Webhook", issue_created(description))
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = test
        .send(Method::POST, "Backlog Webhook", "<xml/>".to_string())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = test
        .send(
            Method::POST,
            "Backlog Webhook",
            issue_created("Please set a budget of 50000 yen"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    token.assert_async().await;
    budget.assert_async().await;
}
