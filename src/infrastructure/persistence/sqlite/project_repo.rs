//! SQLite Project Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{ProjectRecord, ProjectRepositoryPort, RepositoryError};
use crate::domain::audiobook::AudiobookDocument;

/// SQLite Project Repository
pub struct SqliteProjectRepository {
    pool: DbPool,
}

impl SqliteProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    document: String,
    created_at: String,
    updated_at: String,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn encode_document(document: &AudiobookDocument) -> Result<String, RepositoryError> {
    document
        .to_json()
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

impl TryFrom<ProjectRow> for ProjectRecord {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(ProjectRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            name: row.name,
            document: AudiobookDocument::from_json(&row.document)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            created_at: parse_time(&row.created_at)?,
            updated_at: parse_time(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl ProjectRepositoryPort for SqliteProjectRepository {
    async fn save(&self, project: &ProjectRecord) -> Result<(), RepositoryError> {
        let document = encode_document(&project.document)?;

        sqlx::query(
            r#"
            INSERT INTO projects (id, name, document, character_count, dialogue_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(project.id.to_string())
        .bind(&project.name)
        .bind(document)
        .bind(project.document.characters.len() as i64)
        .bind(project.document.dialogues.len() as i64)
        .bind(project.created_at.to_rfc3339())
        .bind(project.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(format!("project {}", project.id))
            }
            _ => RepositoryError::DatabaseError(e.to_string()),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepositoryError> {
        let row: Option<ProjectRow> = sqlx::query_as(
            "SELECT id, name, document, created_at, updated_at FROM projects WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(ProjectRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            "SELECT id, name, document, created_at, updated_at FROM projects ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ProjectRecord::try_from).collect()
    }

    async fn replace_document(
        &self,
        id: Uuid,
        document: &AudiobookDocument,
        expected_updated_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let encoded = encode_document(document)?;

        // 条件更新：updated_at 已变化说明期间有其他写入
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET document = ?, character_count = ?, dialogue_count = ?, updated_at = ?
            WHERE id = ? AND updated_at = ?
            "#,
        )
        .bind(encoded)
        .bind(document.characters.len() as i64)
        .bind(document.dialogues.len() as i64)
        .bind(updated_at.to_rfc3339())
        .bind(id.to_string())
        .bind(expected_updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM projects WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            return Err(match exists {
                Some(_) => RepositoryError::Conflict(format!("project {}", id)),
                None => RepositoryError::NotFound(format!("project {}", id)),
            });
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
