use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport error: {0}")]
    Http(reqwest::Error),
    #[error("Transport error: [{method}] rejected: {description}")]
    Api {
        method: &'static str,
        description: String
    },
    #[error("Transport error: [{0}] returned no result")]
    MissingResult(&'static str)
}

impl From<reqwest::Error> for TransportError {
    //NOTE: Request urls embed the bot token and must never reach the logs
    fn from(error: reqwest::Error) -> Self {
        TransportError::Http(error.without_url())
    }
}
