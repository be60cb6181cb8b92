#[cfg(feature = "axum-error")]
pub mod axum_error;

use crate::prelude::StringExt;
use http::StatusCode;
use serde::Serialize;
use std::{
    error::Error as StdError,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
};
use strum::AsRefStr;
use thiserror::Error as ThisError;

pub trait ErrorMeta {
    fn code(&self) -> ErrorCode;
    fn key(&self) -> ErrorKey;
    fn message(&self) -> ErrorMessage;
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct ErrorKey(String);

impl ErrorKey {
    pub fn internal(key: &str, subtype: Option<&str>) -> Self {
        if let Some(subtype) = subtype {
            ErrorKey(format!("err::internal::{}::{}", key, subtype))
        } else {
            ErrorKey(format!("err::internal::{}", key))
        }
    }

    pub fn application(key: &str, subtype: Option<&str>) -> Self {
        if let Some(subtype) = subtype {
            ErrorKey(format!("err::application::{}::{}", key, subtype))
        } else {
            ErrorKey(format!("err::application::{}", key))
        }
    }
}

impl Display for ErrorKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
pub struct ErrorMessage(String);

impl AsRef<str> for ErrorMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Failures that originate inside the service or in one of its upstream
/// dependencies. Their messages are not exposed to webhook callers.
#[derive(ThisError, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "PascalCase")]
pub enum InternalError {
    #[error("A connection error occurred: {}", .message)]
    ConnectionError {
        message: String,
        subtype: Option<String>,
    },
    #[error("The upstream service rejected the request: {}", .message)]
    UpstreamError {
        message: String,
        subtype: Option<String>,
    },
    #[error("Configuration error: {}", .message)]
    ConfigurationError {
        message: String,
        subtype: Option<String>,
    },
    #[error("Deserialization error: {}", .message)]
    DeserializeError {
        message: String,
        subtype: Option<String>,
    },
}

impl InternalError {
    pub fn connection_error(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::internal(InternalError::ConnectionError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }

    pub fn upstream_error(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::internal(InternalError::UpstreamError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }

    pub fn configuration_error(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::internal(InternalError::ConfigurationError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }

    pub fn deserialize_error(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::internal(InternalError::DeserializeError {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }
}

impl ErrorMeta for InternalError {
    fn code(&self) -> ErrorCode {
        match self {
            InternalError::ConnectionError { .. } => ErrorCode(1001),
            InternalError::UpstreamError { .. } => ErrorCode(1002),
            InternalError::ConfigurationError { .. } => ErrorCode(1003),
            InternalError::DeserializeError { .. } => ErrorCode(1004),
        }
    }

    fn key(&self) -> ErrorKey {
        match self {
            InternalError::ConnectionError { subtype, .. } => {
                ErrorKey::internal("connection_error", subtype.as_deref())
            }
            InternalError::UpstreamError { subtype, .. } => {
                ErrorKey::internal("upstream_error", subtype.as_deref())
            }
            InternalError::ConfigurationError { subtype, .. } => {
                ErrorKey::internal("configuration_error", subtype.as_deref())
            }
            InternalError::DeserializeError { subtype, .. } => {
                ErrorKey::internal("deserialize_error", subtype.as_deref())
            }
        }
    }

    fn message(&self) -> ErrorMessage {
        match self {
            InternalError::ConnectionError { message, .. }
            | InternalError::UpstreamError { message, .. }
            | InternalError::ConfigurationError { message, .. }
            | InternalError::DeserializeError { message, .. } => ErrorMessage(message.to_string()),
        }
    }
}

impl Debug for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}\n", &self)?;
        let mut current = self.source();

        while let Some(cause) = current {
            writeln!(f, "Caused by:\n\t{}", cause)?;
            current = cause.source();
        }

        Ok(())
    }
}

/// Failures caused by the webhook caller. These are safe to show in a response body.
#[derive(ThisError, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "PascalCase")]
pub enum ApplicationError {
    #[error("Bad Request: {}", .message)]
    BadRequest {
        message: String,
        subtype: Option<String>,
    },
    #[error("Forbidden: {}", .message)]
    Forbidden {
        message: String,
        subtype: Option<String>,
    },
    #[error("Method Not Allowed: {}", .message)]
    MethodNotAllowed {
        message: String,
        subtype: Option<String>,
    },
    #[error("Unprocessable Entity: {}", .message)]
    UnprocessableEntity {
        message: String,
        subtype: Option<String>,
    },
    #[error("Internal Server Error: {}", .message)]
    InternalServerError {
        message: String,
        subtype: Option<String>,
    },
    #[error("Bad Gateway: {}", .message)]
    BadGateway {
        message: String,
        subtype: Option<String>,
    },
    #[error("Payload Too Large: {}", .message)]
    PayloadTooLarge {
        message: String,
        subtype: Option<String>,
    },
}

impl ApplicationError {
    pub fn bad_request(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::application(ApplicationError::BadRequest {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }

    pub fn forbidden(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::application(ApplicationError::Forbidden {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }

    pub fn method_not_allowed(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::application(ApplicationError::MethodNotAllowed {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }

    pub fn unprocessable_entity(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::application(ApplicationError::UnprocessableEntity {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }

    pub fn payload_too_large(message: &str, subtype: Option<&str>) -> BudgetHookError {
        BudgetHookError::application(ApplicationError::PayloadTooLarge {
            message: message.to_string(),
            subtype: subtype.map(|s| s.to_string().snake_case()),
        })
    }
}

impl ErrorMeta for ApplicationError {
    fn code(&self) -> ErrorCode {
        match self {
            ApplicationError::BadRequest { .. } => ErrorCode(2000),
            ApplicationError::Forbidden { .. } => ErrorCode(2001),
            ApplicationError::MethodNotAllowed { .. } => ErrorCode(2002),
            ApplicationError::UnprocessableEntity { .. } => ErrorCode(2003),
            ApplicationError::InternalServerError { .. } => ErrorCode(2004),
            ApplicationError::BadGateway { .. } => ErrorCode(2005),
            ApplicationError::PayloadTooLarge { .. } => ErrorCode(2006),
        }
    }

    fn key(&self) -> ErrorKey {
        match self {
            ApplicationError::BadRequest { subtype, .. } => {
                ErrorKey::application("bad_request", subtype.as_deref())
            }
            ApplicationError::Forbidden { subtype, .. } => {
                ErrorKey::application("forbidden", subtype.as_deref())
            }
            ApplicationError::MethodNotAllowed { subtype, .. } => {
                ErrorKey::application("method_not_allowed", subtype.as_deref())
            }
            ApplicationError::UnprocessableEntity { subtype, .. } => {
                ErrorKey::application("unprocessable_entity", subtype.as_deref())
            }
            ApplicationError::InternalServerError { subtype, .. } => {
                ErrorKey::application("internal_server_error", subtype.as_deref())
            }
            ApplicationError::BadGateway { subtype, .. } => {
                ErrorKey::application("bad_gateway", subtype.as_deref())
            }
            ApplicationError::PayloadTooLarge { subtype, .. } => {
                ErrorKey::application("payload_too_large", subtype.as_deref())
            }
        }
    }

    fn message(&self) -> ErrorMessage {
        match self {
            ApplicationError::BadRequest { message, .. }
            | ApplicationError::Forbidden { message, .. }
            | ApplicationError::MethodNotAllowed { message, .. }
            | ApplicationError::UnprocessableEntity { message, .. }
            | ApplicationError::InternalServerError { message, .. }
            | ApplicationError::BadGateway { message, .. }
            | ApplicationError::PayloadTooLarge { message, .. } => ErrorMessage(message.to_string()),
        }
    }
}

impl Debug for ApplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}\n", &self)?;
        let mut current = self.source();

        while let Some(cause) = current {
            writeln!(f, "Caused by:\n\t{}", cause)?;
            current = cause.source();
        }

        Ok(())
    }
}

impl From<InternalError> for ApplicationError {
    fn from(error: InternalError) -> Self {
        match error {
            InternalError::ConnectionError { subtype, .. } => ApplicationError::BadGateway {
                message: "Could not connect to the billing API".into(),
                subtype,
            },
            InternalError::UpstreamError { subtype, .. } => ApplicationError::BadGateway {
                message: "The billing API rejected the budget".into(),
                subtype,
            },
            InternalError::DeserializeError { message, subtype } => {
                ApplicationError::BadRequest { message, subtype }
            }
            InternalError::ConfigurationError { .. } => ApplicationError::InternalServerError {
                message: "An unknown error occurred".into(),
                subtype: None,
            },
        }
    }
}

#[derive(ThisError, Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum BudgetHookError {
    Internal(InternalError),
    Application(ApplicationError),
}

impl AsRef<str> for BudgetHookError {
    fn as_ref(&self) -> &str {
        match self {
            BudgetHookError::Internal(e) => e.as_ref(),
            BudgetHookError::Application(e) => e.as_ref(),
        }
    }
}

impl<'a> From<&'a BudgetHookError> for StatusCode {
    fn from(value: &'a BudgetHookError) -> Self {
        match value {
            BudgetHookError::Internal(e) => match e {
                InternalError::ConnectionError { .. } | InternalError::UpstreamError { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                InternalError::DeserializeError { .. } => StatusCode::BAD_REQUEST,
                InternalError::ConfigurationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            BudgetHookError::Application(e) => match e {
                ApplicationError::BadRequest { .. } => StatusCode::BAD_REQUEST,
                ApplicationError::Forbidden { .. } => StatusCode::FORBIDDEN,
                ApplicationError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
                ApplicationError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ApplicationError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                ApplicationError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
                ApplicationError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            },
        }
    }
}

impl From<BudgetHookError> for StatusCode {
    fn from(value: BudgetHookError) -> Self {
        (&value).into()
    }
}

impl BudgetHookError {
    fn internal(internal: InternalError) -> Self {
        BudgetHookError::Internal(internal)
    }

    fn application(application: ApplicationError) -> Self {
        BudgetHookError::Application(application)
    }

    pub fn as_application(&self) -> BudgetHookError {
        match self {
            BudgetHookError::Application(e) => BudgetHookError::Application(e.clone()),
            BudgetHookError::Internal(e) => BudgetHookError::Application(e.clone().into()),
        }
    }

    pub fn as_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "type": self.as_ref(),
                "code": self.code().as_u16(),
                "status": StatusCode::from(self).as_u16(),
                "key": self.key().to_string(),
                "message": self.message().to_string()
            }
        })
    }
}

impl ErrorMeta for BudgetHookError {
    fn code(&self) -> ErrorCode {
        match self {
            BudgetHookError::Internal(e) => e.code(),
            BudgetHookError::Application(e) => e.code(),
        }
    }

    fn key(&self) -> ErrorKey {
        match self {
            BudgetHookError::Internal(e) => e.key(),
            BudgetHookError::Application(e) => e.key(),
        }
    }

    fn message(&self) -> ErrorMessage {
        match self {
            BudgetHookError::Internal(e) => e.message(),
            BudgetHookError::Application(e) => e.message(),
        }
    }
}

impl Display for BudgetHookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BudgetHookError::Internal(e) => write!(f, "{}", e),
            BudgetHookError::Application(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_function() {
        let internal_error: BudgetHookError = InternalError::connection_error("test", None);

        assert_eq!(internal_error.code(), ErrorCode(1001));
        assert_eq!(
            internal_error.key(),
            ErrorKey::internal("connection_error", None)
        );
        assert_eq!(internal_error.message(), ErrorMessage("test".to_string()));
        assert!(matches!(internal_error, BudgetHookError::Internal(_)));
    }

    #[test]
    fn test_subtype_is_snake_cased_into_key() {
        let err = ApplicationError::unprocessable_entity("missing marker", Some("ProjectId"));

        assert_eq!(
            err.key().to_string(),
            "err::application::unprocessable_entity::project_id"
        );
        assert!(matches!(err, BudgetHookError::Application(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            StatusCode::from(ApplicationError::forbidden("test", None)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            StatusCode::from(ApplicationError::method_not_allowed("test", None)),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            StatusCode::from(InternalError::deserialize_error("test", None)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatusCode::from(ApplicationError::unprocessable_entity("test", None)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            StatusCode::from(InternalError::connection_error("test", None)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            StatusCode::from(InternalError::upstream_error("test", None)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            StatusCode::from(InternalError::configuration_error("test", None)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StatusCode::from(ApplicationError::bad_request("test", None)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatusCode::from(ApplicationError::payload_too_large("test", None)),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_internal_message_is_hidden_from_application() {
        let err = InternalError::connection_error("token endpoint refused", Some("token"));
        let app = err.as_application();

        assert_eq!(
            app,
            BudgetHookError::Application(ApplicationError::BadGateway {
                message: "Could not connect to the billing API".to_string(),
                subtype: Some("token".to_string()),
            })
        );
        assert_eq!(StatusCode::from(&app), StatusCode::from(&err));
    }

    #[test]
    fn test_as_json() {
        let err = ApplicationError::forbidden("Invalid user agent", Some("UserAgent"));

        assert_eq!(
            err.as_json(),
            serde_json::json!({
                "error": {
                    "type": "Forbidden",
                    "code": 2001,
                    "status": 403,
                    "key": "err::application::forbidden::user_agent",
                    "message": "Invalid user agent"
                }
            })
        );
    }
}
