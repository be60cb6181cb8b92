use crate::BudgetHookError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

impl IntoResponse for BudgetHookError {
    fn into_response(self) -> Response {
        (&self).into_response()
    }
}

impl IntoResponse for &BudgetHookError {
    fn into_response(self) -> Response {
        let body = self.as_application().as_json();

        // Status comes from the original error, the body from its application view
        let status: StatusCode = self.into();

        (status, Json(body)).into_response()
    }
}
