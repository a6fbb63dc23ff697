//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite、内存）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::audiobook::{AudiobookDocument, Project, ProjectId, ProjectName};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// 记录已被其他写入修改
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Project Repository
// ============================================================================

/// 项目实体（用于持久化）
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub name: String,
    pub document: AudiobookDocument,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            id: *project.id().as_uuid(),
            name: project.name().as_str().to_string(),
            document: project.document().clone(),
            created_at: project.created_at(),
            updated_at: project.updated_at(),
        }
    }
}

impl TryFrom<ProjectRecord> for Project {
    type Error = RepositoryError;

    fn try_from(record: ProjectRecord) -> Result<Self, Self::Error> {
        let name = ProjectName::new(record.name)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        Ok(Project::restore(
            ProjectId::from_uuid(record.id),
            name,
            record.document,
            record.created_at,
            record.updated_at,
        ))
    }
}

/// Project Repository Port
#[async_trait]
pub trait ProjectRepositoryPort: Send + Sync {
    /// 保存项目（新建）
    async fn save(&self, project: &ProjectRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找项目
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepositoryError>;

    /// 获取所有项目，按创建时间倒序
    async fn find_all(&self) -> Result<Vec<ProjectRecord>, RepositoryError>;

    /// 整体替换项目文档
    ///
    /// 仅当存储中的 `updated_at` 仍等于 `expected_updated_at` 时写入，
    /// 否则返回 `Conflict`；项目不存在时返回 `NotFound`
    async fn replace_document(
        &self,
        id: Uuid,
        document: &AudiobookDocument,
        expected_updated_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// 删除项目
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
