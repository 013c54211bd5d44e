use crate::{now, Document, NewDocument, Result, Store};
use std::collections::HashSet;

impl Store {
    pub async fn insert_document(&self, doc: &NewDocument) -> Result<Document> {
        let row = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (user_id, file_name, file_path, file_type, uploaded_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING document_id, user_id, file_name, file_path, file_type, uploaded_at
            "#,
        )
        .bind(doc.user_id)
        .bind(&doc.file_name)
        .bind(&doc.file_path)
        .bind(&doc.file_type)
        .bind(now())
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn get_document(&self, document_id: i64) -> Result<Option<Document>> {
        let doc = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE document_id = ?")
            .bind(document_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(doc)
    }

    /// Documents uploaded by `user_id`, oldest first.
    pub async fn documents_for_user(&self, user_id: i64) -> Result<Vec<Document>> {
        let docs = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE user_id = ? ORDER BY document_id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(docs)
    }

    /// Every stored file name referenced by a document row.
    pub async fn referenced_file_paths(&self) -> Result<HashSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT file_path FROM documents")
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(|(path,)| path).collect())
    }
}
