use crate::{now, Flashcard, NewSummary, Result, Store, Summary};

impl Store {
    pub async fn insert_summary(&self, new: &NewSummary) -> Result<Summary> {
        let row = sqlx::query_as::<_, Summary>(
            r#"
            INSERT INTO summaries (document_id, user_id, summary_text, length, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING summary_id, document_id, user_id, summary_text, length, created_at
            "#,
        )
        .bind(new.document_id)
        .bind(new.user_id)
        .bind(&new.summary_text)
        .bind(&new.length)
        .bind(now())
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn get_summary(&self, summary_id: i64) -> Result<Option<Summary>> {
        let row = sqlx::query_as::<_, Summary>("SELECT * FROM summaries WHERE summary_id = ?")
            .bind(summary_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    /// Summaries requested by `user_id`, optionally narrowed to one document.
    pub async fn summaries_for_user(
        &self,
        user_id: i64,
        document_id: Option<i64>,
    ) -> Result<Vec<Summary>> {
        let rows = sqlx::query_as::<_, Summary>(
            r#"
            SELECT * FROM summaries
            WHERE user_id = ? AND (? IS NULL OR document_id = ?)
            ORDER BY summary_id
            "#,
        )
        .bind(user_id)
        .bind(document_id)
        .bind(document_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Insert all question/answer pairs for a summary atomically.
    pub async fn insert_flashcards(
        &self,
        summary_id: i64,
        cards: &[(String, String)],
    ) -> Result<Vec<Flashcard>> {
        let created_at = now();
        let mut tx = self.pool().begin().await?;
        let mut rows = Vec::with_capacity(cards.len());
        for (question, answer) in cards {
            let row = sqlx::query_as::<_, Flashcard>(
                r#"
                INSERT INTO flashcards (summary_id, question, answer, created_at)
                VALUES (?, ?, ?, ?)
                RETURNING flashcard_id, summary_id, question, answer, created_at
                "#,
            )
            .bind(summary_id)
            .bind(question)
            .bind(answer)
            .bind(&created_at)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }
        tx.commit().await?;
        Ok(rows)
    }

    /// Flashcards belonging to summaries owned by `user_id`.
    pub async fn flashcards_for_user(
        &self,
        user_id: i64,
        summary_id: Option<i64>,
    ) -> Result<Vec<Flashcard>> {
        let rows = sqlx::query_as::<_, Flashcard>(
            r#"
            SELECT f.flashcard_id, f.summary_id, f.question, f.answer, f.created_at
            FROM flashcards f
            JOIN summaries s ON s.summary_id = f.summary_id
            WHERE s.user_id = ? AND (? IS NULL OR f.summary_id = ?)
            ORDER BY f.flashcard_id
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

#[cfg(test)]
mod tests {
    use crate::test_support::temp_store;
    use crate::NewSummary;

    fn summary(document_id: i64, user_id: i64) -> NewSummary {
        NewSummary {
            document_id,
            user_id,
            summary_text: "This is a test summary.".into(),
            length: "medium".into(),
        }
    }

    #[tokio::test]
    async fn summaries_are_scoped_to_user_and_document() {
        let (store, _dir) = temp_store().await;
        let a = store.insert_summary(&summary(1, 1)).await.unwrap();
        let b = store.insert_summary(&summary(2, 1)).await.unwrap();
        store.insert_summary(&summary(1, 2)).await.unwrap();

        let all = store.summaries_for_user(1, None).await.unwrap();
        assert_eq!(all, vec![a.clone(), b]);

        let doc1 = store.summaries_for_user(1, Some(1)).await.unwrap();
        assert_eq!(doc1, vec![a.clone()]);

        assert_eq!(store.get_summary(a.summary_id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn flashcards_follow_summary_ownership() {
        let (store, _dir) = temp_store().await;
        let mine = store.insert_summary(&summary(1, 1)).await.unwrap();
        let theirs = store.insert_summary(&summary(1, 2)).await.unwrap();

        let cards = store
            .insert_flashcards(
                mine.summary_id,
                &[
                    ("Q1?".to_string(), "A1.".to_string()),
                    ("Q2?".to_string(), "A2.".to_string()),
                ],
            )
            .await
            .unwrap();
        assert_eq!(cards.len(), 2);
        store
            .insert_flashcards(theirs.summary_id, &[("Q?".into(), "A.".into())])
            .await
            .unwrap();

        let listed = store.flashcards_for_user(1, None).await.unwrap();
        assert_eq!(listed, cards);

        let filtered = store
            .flashcards_for_user(1, Some(theirs.summary_id))
            .await
            .unwrap();
        assert!(filtered.is_empty());
    }
}
