use crate::{now, Feedback, NewFeedback, Result, Store};

impl Store {
    pub async fn insert_feedback(&self, new: &NewFeedback) -> Result<Feedback> {
        let row = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (summary_id, user_id, rating, comments, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING feedback_id, summary_id, user_id, rating, comments, created_at
            "#,
        )
        .bind(new.summary_id)
        .bind(new.user_id)
        .bind(new.rating)
        .bind(&new.comments)
        .bind(now())
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    /// Feedback left by `user_id`, optionally for a single summary.
    pub async fn feedback_for_user(
        &self,
        user_id: i64,
        summary_id: Option<i64>,
    ) -> Result<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, Feedback>(
            r#"
            SELECT * FROM feedback
            WHERE user_id = ? AND (? IS NULL OR summary_id = ?)
            ORDER BY feedback_id
            "#,
        )
        .bind(user_id)
        .bind(summary_id)
        .bind(summary_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
