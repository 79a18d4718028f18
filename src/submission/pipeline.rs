use bytes::Bytes;

use crate::error::SubmitError;
use crate::models::SubmissionId;
use crate::state::SharedState;

use super::{parser, validate};

/// Parse, validate, store, notify. Stops at the first failing gate.
///
/// A stored submission is not removed when the notification fails.
pub async fn run(
    state: &SharedState,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<SubmissionId, SubmitError> {
    let raw = parser::parse_form(content_type, body).await?;
    let submission = validate::validate(raw)?;

    let id = state.store.store(&submission).await?;
    tracing::info!(submission_id = %id, "Submission stored");

    state.notifier.notify(&submission).await.inspect_err(|_| {
        tracing::warn!(submission_id = %id, "Submission stored but notification failed");
    })?;

    Ok(id)
}
