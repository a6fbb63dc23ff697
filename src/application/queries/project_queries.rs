//! Project Queries

use uuid::Uuid;

use crate::domain::audiobook::AudiobookDocument;

/// 获取项目详情查询
#[derive(Debug, Clone)]
pub struct GetProject {
    pub project_id: Uuid,
}

/// 列出所有项目查询
#[derive(Debug, Clone)]
pub struct ListProjects;

/// 只校验文档，不保存
#[derive(Debug, Clone)]
pub struct ValidateDocument {
    pub document: AudiobookDocument,
}
