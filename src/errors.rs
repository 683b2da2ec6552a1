use thiserror::Error;

/// Local faults only. Business-rule rejections from the server (wrong OTP,
/// expired code, already used) are not errors — they travel as
/// [`crate::http::ApiFailure`] values and are displayed verbatim.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed server response: {0}")]
    MalformedResponse(String),

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Error: {0}")]
    Internal(String),
}

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
