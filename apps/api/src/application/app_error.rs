use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Missing stripe-signature header")]
    MissingSignature,

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Email delivery failed after retries: {0}")]
    TransientDelivery(String),

    #[error("Email delivery failed: {0}")]
    PermanentDelivery(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Server-side failure reported to the client with a fixed message.
    #[error("{message}")]
    Public {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Replace the client-facing message of server-side failures.
    /// Client errors (4xx) keep their own message.
    pub fn with_public_message(self, message: &'static str) -> Self {
        if self.is_client_error() {
            self
        } else {
            AppError::Public {
                message,
                source: Box::new(self),
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_)
                | AppError::Conflict(_)
                | AppError::Unauthorized
                | AppError::NotFound
                | AppError::MissingSignature
                | AppError::InvalidSignature(_)
        )
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    InvalidInput,
    Conflict,
    Unauthorized,
    NotFound,
    ConfigurationError,
    DecryptionError,
    MissingSignature,
    InvalidSignature,
    DeliveryFailed,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::DecryptionError => "DECRYPTION_ERROR",
            ErrorCode::MissingSignature => "MISSING_SIGNATURE",
            ErrorCode::InvalidSignature => "INVALID_SIGNATURE",
            ErrorCode::DeliveryFailed => "DELIVERY_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
