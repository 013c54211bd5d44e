//! Ratings and comments on generated summaries.
//!
//! The row in `feedback` is authoritative. A JSON snapshot of each row is
//! also dropped into the upload directory; failing to write it only
//! produces a warning.

use crate::error::{AppError, AppResult};
use crate::files::feedback_snapshot_name;
use crate::App;
use store::{Feedback, NewFeedback};
use tracing::{info, warn};

/// Warning reported when the row was stored but its snapshot was not.
pub const SNAPSHOT_WARNING: &str = "DB insert succeeded but failed to write feedback file";

#[derive(Debug, Clone)]
pub struct FeedbackReceipt {
    pub feedback: Feedback,
    pub snapshot_written: bool,
}

impl FeedbackReceipt {
    pub fn warning(&self) -> Option<&'static str> {
        (!self.snapshot_written).then_some(SNAPSHOT_WARNING)
    }
}

impl App {
    pub async fn give_feedback(
        &self,
        user_id: i64,
        summary_id: i64,
        rating: i64,
        comments: &str,
    ) -> AppResult<FeedbackReceipt> {
        let feedback = self
            .store()
            .insert_feedback(&NewFeedback {
                summary_id,
                user_id,
                rating,
                comments: comments.to_string(),
            })
            .await
            .map_err(|e| AppError::storage("Insert failed", e))?;

        let name = feedback_snapshot_name(feedback.feedback_id);
        let snapshot_written = match serde_json::to_vec_pretty(&feedback) {
            Ok(json) => match self.files().put(&name, &json).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(feedback_id = feedback.feedback_id, error = %err, "failed to write feedback snapshot");
                    false
                }
            },
            Err(err) => {
                warn!(feedback_id = feedback.feedback_id, error = %err, "failed to encode feedback snapshot");
                false
            }
        };

        info!(user_id, summary_id, feedback_id = feedback.feedback_id, rating, "feedback recorded");
        Ok(FeedbackReceipt {
            feedback,
            snapshot_written,
        })
    }

    pub async fn list_feedback(&self, user_id: i64, summary_id: Option<i64>) -> AppResult<Vec<Feedback>> {
        Ok(self.store().feedback_for_user(user_id, summary_id).await?)
    }
}
