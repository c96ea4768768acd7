use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::sink::SinkError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The subset of a Google service-account key file used for signing token requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, SinkError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|error| SinkError::Credentials(error.to_string()))?;

        if key.client_email.trim().is_empty() {
            return Err(SinkError::Credentials("client_email is empty".to_string()));
        }

        if !key.private_key.contains("PRIVATE KEY") {
            return Err(SinkError::Credentials("private_key is not a PEM key".to_string()));
        }

        Ok(key)
    }

    pub fn from_file(path: &Path) -> Result<Self, SinkError> {
        let json = fs::read_to_string(path)
            .map_err(|error| SinkError::Credentials(format!("{}: {error}", path.display())))?;

        Self::from_json(&json)
    }
}
