//! Project Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{ProjectRecord, ProjectRepositoryPort};
use crate::application::queries::{GetProject, ListProjects, ValidateDocument};
use crate::domain::audiobook::{check_fields, AudiobookDocument, ReferentialValidator, Violation};

// ============================================================================
// Response DTOs
// ============================================================================

/// 项目详情响应
#[derive(Debug, Clone)]
pub struct ProjectDetails {
    pub id: Uuid,
    pub name: String,
    pub document: AudiobookDocument,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProjectRecord> for ProjectDetails {
    fn from(record: ProjectRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            document: record.document,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 项目列表条目
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub character_count: usize,
    pub episode_count: usize,
    pub scene_count: usize,
    pub dialogue_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&ProjectRecord> for ProjectSummary {
    fn from(record: &ProjectRecord) -> Self {
        let doc = &record.document;
        Self {
            id: record.id,
            name: record.name.clone(),
            character_count: doc.characters.len(),
            episode_count: doc.episodes.len(),
            scene_count: doc.scenes.len(),
            dialogue_count: doc.dialogues.len(),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 校验结果
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetProject Handler
pub struct GetProjectHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl GetProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(&self, query: GetProject) -> Result<ProjectDetails, ApplicationError> {
        let project = self
            .project_repo
            .find_by_id(query.project_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Project", query.project_id))?;

        Ok(ProjectDetails::from(project))
    }
}

/// ListProjects Handler
pub struct ListProjectsHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl ListProjectsHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(&self, _query: ListProjects) -> Result<Vec<ProjectSummary>, ApplicationError> {
        let projects = self.project_repo.find_all().await?;
        Ok(projects.iter().map(ProjectSummary::from).collect())
    }
}

/// ValidateDocument Handler
///
/// 与创建项目使用同一套检查，但不写入任何数据
pub struct ValidateDocumentHandler {
    validator: ReferentialValidator,
}

impl ValidateDocumentHandler {
    pub fn new(validator: ReferentialValidator) -> Self {
        Self { validator }
    }

    pub fn handle(&self, query: ValidateDocument) -> ValidationReport {
        let mut violations = check_fields(&query.document);
        violations.extend(self.validator.validate(&query.document));

        tracing::debug!(violations = violations.len(), "Document validated");

        ValidationReport {
            valid: violations.is_empty(),
            violations,
        }
    }
}
