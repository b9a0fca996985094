use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read/write store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode/decode store file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored value for '{key}' has the wrong shape")]
    Malformed { key: &'static str },

    #[error("store rejected write: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("goal must be a positive number of millilitres, got {0}")]
    InvalidGoal(f64),

    #[error("amount must be between 0 and 9999 millilitres, got {0}")]
    InvalidAmount(f64),

    #[error("failed to load persisted state: {0}")]
    PersistenceRead(#[source] StoreError),

    #[error("failed to persist state: {0}")]
    PersistenceWrite(#[source] StoreError),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidGoal(_) | TrackerError::InvalidAmount(_) => {
                Self::bad_request(err.to_string())
            }
            other => Self::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
