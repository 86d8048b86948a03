use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::application::usecases::subscriptions::SubscriptionError;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Json(ErrorResponse {
        code: status.as_u16(),
        message: message.into(),
    });

    (status, body).into_response()
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            SubscriptionError::InvalidInput(_) | SubscriptionError::NotFound { .. } => {
                self.to_string()
            }
            // Don't leak storage detail to the client
            SubscriptionError::Storage { .. } => "Internal server error".to_string(),
        };

        error_response(status, message)
    }
}
