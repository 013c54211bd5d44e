use crate::{now, Annotation, AnnotationPatch, NewAnnotation, OwnedWrite, Result, Store};
use sqlx::SqliteConnection;

impl Store {
    /// Insert without any bounds or length checks.
    pub async fn insert_annotation(&self, new: &NewAnnotation) -> Result<Annotation> {
        let row = sqlx::query_as::<_, Annotation>(
            r#"
            INSERT INTO annotations (user_id, document_id, text, x, y, page, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, document_id, text, x, y, page, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.document_id)
        .bind(&new.text)
        .bind(new.x)
        .bind(new.y)
        .bind(new.page)
        .bind(now())
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    /// All annotations on a document in insertion order.
    pub async fn annotations_for_document(&self, document_id: i64) -> Result<Vec<Annotation>> {
        let rows = sqlx::query_as::<_, Annotation>(
            "SELECT * FROM annotations WHERE document_id = ? ORDER BY id",
        )
        .bind(document_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn get_annotation(&self, id: i64) -> Result<Option<Annotation>> {
        let row = sqlx::query_as::<_, Annotation>("SELECT * FROM annotations WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row)
    }

    /// Update an annotation on behalf of `user_id`. The owner check and the
    /// update share one transaction.
    pub async fn update_annotation(
        &self,
        id: i64,
        user_id: i64,
        patch: &AnnotationPatch,
    ) -> Result<OwnedWrite> {
        let mut tx = self.pool().begin().await?;
        let outcome = match annotation_owner(&mut tx, id).await? {
            None => OwnedWrite::Missing,
            Some(owner) if owner != user_id => OwnedWrite::NotOwner,
            Some(_) => {
                let result = sqlx::query(
                    "UPDATE annotations SET text = ?, x = ?, y = ?, page = ? WHERE id = ?",
                )
                .bind(&patch.text)
                .bind(patch.x)
                .bind(patch.y)
                .bind(patch.page)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                OwnedWrite::Applied(result.rows_affected())
            }
        };
        tx.commit().await?;
        Ok(outcome)
    }

    /// Delete an annotation on behalf of `user_id`.
    pub async fn delete_annotation(&self, id: i64, user_id: i64) -> Result<OwnedWrite> {
        let mut tx = self.pool().begin().await?;
        let outcome = match annotation_owner(&mut tx, id).await? {
            None => OwnedWrite::Missing,
            Some(owner) if owner != user_id => OwnedWrite::NotOwner,
            Some(_) => {
                let result = sqlx::query("DELETE FROM annotations WHERE id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                OwnedWrite::Applied(result.rows_affected())
            }
        };
        tx.commit().await?;
        Ok(outcome)
    }
}

async fn annotation_owner(conn: &mut SqliteConnection, id: i64) -> Result<Option<i64>> {
    let owner: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM annotations WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(owner.map(|(user_id,)| user_id))
}

#[cfg(test)]
mod tests {
    use crate::test_support::temp_store;
    use crate::{AnnotationPatch, NewAnnotation, OwnedWrite};

    fn note(user_id: i64, document_id: i64, text: &str) -> NewAnnotation {
        NewAnnotation {
            user_id,
            document_id,
            text: text.to_string(),
            x: 10.5,
            y: 20.0,
            page: 2,
        }
    }

    #[tokio::test]
    async fn created_annotation_is_returned_for_its_document() {
        let (store, _dir) = temp_store().await;
        let created = store.insert_annotation(&note(1, 3, "note")).await.unwrap();
        store.insert_annotation(&note(1, 4, "elsewhere")).await.unwrap();

        let rows = store.annotations_for_document(3).await.unwrap();
        assert_eq!(rows, vec![created.clone()]);
        assert_eq!(rows[0].text, "note");
        assert_eq!(rows[0].x, 10.5);
        assert_eq!(rows[0].y, 20.0);
        assert_eq!(rows[0].page, 2);

        assert!(store.annotations_for_document(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_can_update_and_delete() {
        let (store, _dir) = temp_store().await;
        let created = store.insert_annotation(&note(1, 3, "draft")).await.unwrap();
        let patch = AnnotationPatch {
            text: "final".into(),
            x: 1.0,
            y: 2.0,
            page: 5,
        };

        let outcome = store.update_annotation(created.id, 1, &patch).await.unwrap();
        assert_eq!(outcome, OwnedWrite::Applied(1));
        let updated = store.get_annotation(created.id).await.unwrap().unwrap();
        assert_eq!(updated.text, "final");
        assert_eq!(updated.page, 5);

        let outcome = store.delete_annotation(created.id, 1).await.unwrap();
        assert_eq!(outcome, OwnedWrite::Applied(1));
        assert!(store.get_annotation(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_and_foreign_rows_are_reported() {
        let (store, _dir) = temp_store().await;
        let created = store.insert_annotation(&note(1, 3, "mine")).await.unwrap();
        let patch = AnnotationPatch {
            text: "hijack".into(),
            x: 0.0,
            y: 0.0,
            page: 0,
        };

        assert_eq!(
            store.update_annotation(4242, 1, &patch).await.unwrap(),
            OwnedWrite::Missing
        );
        assert_eq!(
            store.delete_annotation(4242, 1).await.unwrap(),
            OwnedWrite::Missing
        );
        assert_eq!(
            store.update_annotation(created.id, 2, &patch).await.unwrap(),
            OwnedWrite::NotOwner
        );
        assert_eq!(
            store.delete_annotation(created.id, 2).await.unwrap(),
            OwnedWrite::NotOwner
        );

        let untouched = store.get_annotation(created.id).await.unwrap().unwrap();
        assert_eq!(untouched.text, "mine");
    }
}
