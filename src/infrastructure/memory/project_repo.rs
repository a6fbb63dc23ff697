//! In-Memory Project Repository
//!
//! 不落盘的项目仓储，`database.path = ":memory:"` 时使用，也用于测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::application::ports::{ProjectRecord, ProjectRepositoryPort, RepositoryError};
use crate::domain::audiobook::AudiobookDocument;

/// 内存项目仓储
#[derive(Default)]
pub struct InMemoryProjectRepository {
    /// project_id -> ProjectRecord
    projects: DashMap<Uuid, ProjectRecord>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[async_trait]
impl ProjectRepositoryPort for InMemoryProjectRepository {
    async fn save(&self, project: &ProjectRecord) -> Result<(), RepositoryError> {
        match self.projects.entry(project.id) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(project.id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(project.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepositoryError> {
        Ok(self.projects.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_all(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
        let mut projects: Vec<ProjectRecord> =
            self.projects.iter().map(|entry| entry.value().clone()).collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn replace_document(
        &self,
        id: Uuid,
        document: &AudiobookDocument,
        expected_updated_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        // 持有分片写锁，比较与写入之间不会插入其他写入
        let mut entry = self
            .projects
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        if entry.updated_at != expected_updated_at {
            return Err(RepositoryError::Conflict(id.to_string()));
        }
        entry.document = document.clone();
        entry.updated_at = updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.projects.remove(&id);
        Ok(())
    }
}
