use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sheets error: invalid credentials: {0}")]
    Credentials(String),
    #[error("Sheets error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sheets error: invalid url: {0}")]
    InvalidUrl(String),
    #[error("Sheets error: could not obtain access token: {0}")]
    Token(String),
    #[error("Sheets error: could not sign token request: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Sheets error: [{status}] from {endpoint}: {body}")]
    Api {
        endpoint: &'static str,
        status: u16,
        body: String
    },
    #[error("Sheets error: spreadsheet [{0}] was not found")]
    SpreadsheetNotFound(String),
    #[error("Sheets error: worksheet [{0}] was not found")]
    WorksheetNotFound(String)
}

/// The only error a caller of the row sink has to handle.
#[derive(Debug, Error)]
#[error("Submission could not be written")]
pub struct WriteFailure {
    #[source]
    pub source: SinkError
}

impl From<SinkError> for WriteFailure {
    fn from(source: SinkError) -> Self {
        Self { source }
    }
}
