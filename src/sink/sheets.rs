use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use moka::future::Cache;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::SubmissionRow;
use crate::sink::{RowSink, ServiceAccountKey, SinkError};

const DEFAULT_SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

const TOKEN_LIFETIME_SECS: i64 = 3600;
//NOTE: Cached tokens are refreshed well before Google expires them
const TOKEN_CACHE_TTL: Duration = Duration::from_secs(50 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the target spreadsheet is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetLocator {
    Id(String),
    Title(String)
}

/// Base urls of the Google APIs used by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub sheets: String,
    pub drive_files: String
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            sheets: DEFAULT_SHEETS_API.to_string(),
            drive_files: DEFAULT_DRIVE_FILES_API.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetMetadata>
}

#[derive(Debug, Deserialize)]
struct SheetMetadata {
    properties: SheetProperties
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendRequest<'a> {
    major_dimension: &'static str,
    values: [&'a SubmissionRow; 1]
}

/// Appends submission rows to one worksheet of a Google spreadsheet.
pub struct GoogleSheetsSink {
    client: Client,
    key: ServiceAccountKey,
    endpoints: GoogleEndpoints,
    tokens: Cache<String, String>,
    append_url: Url
}

impl GoogleSheetsSink {
    /// Authenticates and resolves the spreadsheet and worksheet up front, so a bad
    /// credential or a missing spreadsheet fails at startup rather than on the first submission.
    pub async fn connect(
        key: ServiceAccountKey,
        endpoints: GoogleEndpoints,
        spreadsheet: SpreadsheetLocator,
        worksheet: Option<String>
    ) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let tokens = Cache::builder()
            .max_capacity(1)
            .time_to_live(TOKEN_CACHE_TTL)
            .build();

        //NOTE: Replaced once the worksheet is resolved
        let unresolved = parse_url(&endpoints.sheets)?;

        let mut sink = Self {
            client,
            key,
            endpoints,
            tokens,
            append_url: unresolved
        };

        let spreadsheet_id = match spreadsheet {
            SpreadsheetLocator::Id(id) => id,
            SpreadsheetLocator::Title(title) => sink.find_spreadsheet(&title).await?
        };

        let worksheet = sink.resolve_worksheet(&spreadsheet_id, worksheet).await?;
        sink.append_url = append_url(&sink.endpoints.sheets, &spreadsheet_id, &worksheet)?;

        info!("Appending submissions to worksheet [{worksheet}] of spreadsheet [{spreadsheet_id}]");

        Ok(sink)
    }

    async fn access_token(&self) -> Result<String, SinkError> {
        self.tokens.try_get_with(self.key.client_email.clone(), self.request_token())
            .await
            .map_err(|error| SinkError::Token(error.to_string()))
    }

    async fn request_token(&self) -> Result<String, SinkError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        debug!("Requesting access token for [{}]", self.key.client_email);

        let response = self.client.post(&self.key.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let token: TokenResponse = ensure_success(response, "token").await?.json().await?;

        Ok(token.access_token)
    }

    async fn find_spreadsheet(&self, title: &str) -> Result<String, SinkError> {
        let token = self.access_token().await?;
        let query = spreadsheet_query(title);

        let response = self.client.get(&self.endpoints.drive_files)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id)"),
                ("pageSize", "1"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true")
            ])
            .send()
            .await?;

        let files: FileList = ensure_success(response, "drive files").await?.json().await?;

        files.files.into_iter().next()
            .map(|file| file.id)
            .ok_or_else(|| SinkError::SpreadsheetNotFound(title.to_string()))
    }

    async fn resolve_worksheet(&self, spreadsheet_id: &str, worksheet: Option<String>) -> Result<String, SinkError> {
        let token = self.access_token().await?;

        let response = self.client.get(format!("{}/{spreadsheet_id}", self.endpoints.sheets.trim_end_matches('/')))
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;

        let metadata: SpreadsheetMetadata = ensure_success(response, "spreadsheet").await?.json().await?;
        let titles: Vec<String> = metadata.sheets.into_iter().map(|sheet| sheet.properties.title).collect();

        select_worksheet(titles, worksheet)
    }
}

#[async_trait]
impl RowSink for GoogleSheetsSink {
    async fn append_row(&self, row: &SubmissionRow) -> Result<(), SinkError> {
        let token = self.access_token().await?;
        let body = AppendRequest { major_dimension: "ROWS", values: [row] };

        let response = self.client.post(self.append_url.clone())
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;

        ensure_success(response, "values append").await?;

        Ok(())
    }
}

async fn ensure_success(response: Response, endpoint: &'static str) -> Result<Response, SinkError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(SinkError::Api { endpoint, status: status.as_u16(), body })
}

/// Drive search for a non-trashed spreadsheet with exactly this title.
pub(crate) fn spreadsheet_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");

    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false")
}

/// Picks the requested worksheet, or the first one when none is requested.
pub(crate) fn select_worksheet(titles: Vec<String>, requested: Option<String>) -> Result<String, SinkError> {
    match requested {
        Some(requested) => titles.into_iter()
            .find(|title| *title == requested)
            .ok_or(SinkError::WorksheetNotFound(requested)),
        None => titles.into_iter()
            .next()
            .ok_or_else(|| SinkError::WorksheetNotFound("<first>".to_string()))
    }
}

/// A1 range naming a whole worksheet, quoted so any title is accepted.
pub(crate) fn worksheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn parse_url(url: &str) -> Result<Url, SinkError> {
    Url::parse(url).map_err(|error| SinkError::InvalidUrl(format!("{url}: {error}")))
}

pub(crate) fn append_url(sheets_api: &str, spreadsheet_id: &str, worksheet: &str) -> Result<Url, SinkError> {
    let mut url = parse_url(sheets_api)?;

    url.path_segments_mut()
        .map_err(|_| SinkError::InvalidUrl(sheets_api.to_string()))?
        .pop_if_empty()
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{}:append", worksheet_range(worksheet)));

    Ok(url)
}
