//! Key builders for every record PrintQuote persists.
//!
//! Backends apply their configured prefix on top of these.

use printquote_core::types::JobId;

// ── Job keys ───────────────────────────────────────────────

/// Key of the status record (`queued`, `processing`, `completed`, `failed`).
pub fn status(job_id: JobId) -> String {
    format!("status:{job_id}")
}

/// Key of the result record, present only for completed jobs.
pub fn result(job_id: JobId) -> String {
    format!("result:{job_id}")
}

/// Key of the failure reason, present only for failed jobs.
pub fn failure(job_id: JobId) -> String {
    format!("failure:{job_id}")
}
