mod credentials;
mod errors;
mod sheets;

use async_trait::async_trait;
use chrono::Local;
use tracing::{error, info};

use crate::models::{Purchase, SubmissionRow, Submitter};

pub use credentials::ServiceAccountKey;
pub use errors::{SinkError, WriteFailure};
pub use sheets::{GoogleEndpoints, GoogleSheetsSink, SpreadsheetLocator};

/// Append-only destination for confirmed submissions.
#[async_trait]
pub trait RowSink: Send + Sync + 'static {
    /// Appends one row with a single remote call.
    async fn append_row(&self, row: &SubmissionRow) -> Result<(), SinkError>;

    /// Builds the submission row, stamped with the local time of the append, and writes it once.
    async fn append_submission(&self, purchase: &Purchase, submitter: &Submitter) -> Result<(), WriteFailure> {
        let row = SubmissionRow::new(purchase, submitter, Local::now().naive_local());

        match self.append_row(&row).await {
            Ok(()) => {
                info!("Submission for user [{}] dated [{}] appended", submitter.user_id, purchase.date);
                Ok(())
            }
            Err(error) => {
                error!("Submission for user [{}] could not be appended: {error}", submitter.user_id);
                Err(WriteFailure::from(error))
            }
        }
    }
}
