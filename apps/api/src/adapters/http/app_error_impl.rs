use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    /// Status, code and client-facing message. Server-side details never leave the process.
    pub fn response_parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Conflict, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, "Unauthorized".into()),
            AppError::NotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not found".into()),
            AppError::MissingSignature => (
                StatusCode::BAD_REQUEST,
                ErrorCode::MissingSignature,
                "Missing stripe-signature header".into(),
            ),
            AppError::InvalidSignature(_) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidSignature,
                "Invalid webhook signature".into(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                INTERNAL_MESSAGE.into(),
            ),
            AppError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ConfigurationError,
                INTERNAL_MESSAGE.into(),
            ),
            AppError::Decryption(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DecryptionError,
                INTERNAL_MESSAGE.into(),
            ),
            AppError::TransientDelivery(_) | AppError::PermanentDelivery(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DeliveryFailed,
                INTERNAL_MESSAGE.into(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                INTERNAL_MESSAGE.into(),
            ),
            AppError::Public { message, source } => {
                let (status, code, _) = source.response_parts();
                (status, code, (*message).to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.response_parts();

        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        error_resp(status, code, message)
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: String) -> Response {
    let body = serde_json::json!({ "error": message, "code": code.as_str() });
    (status, Json(body)).into_response()
}
