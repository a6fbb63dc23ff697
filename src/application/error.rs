//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;
use uuid::Uuid;

use crate::domain::audiobook::{AudiobookError, CastError, ProjectError, Violation};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 文档未通过校验，携带全部问题
    #[error("Invalid document: {} violation(s)", .0.len())]
    InvalidDocument(Vec<Violation>),

    /// 业务规则违反
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    /// 并发修改冲突，重试后仍未成功
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建业务规则违反错误
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        match err {
            crate::application::ports::RepositoryError::Conflict(_) => {
                Self::Conflict(err.to_string())
            }
            _ => Self::RepositoryError(err.to_string()),
        }
    }
}

impl From<ProjectError> for ApplicationError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::InvalidName(msg) => Self::ValidationError(msg),
            ProjectError::InvalidDocument(violations) => Self::InvalidDocument(violations),
            ProjectError::Document(e) => e.into(),
            ProjectError::Cast(e) => e.into(),
        }
    }
}

impl From<CastError> for ApplicationError {
    fn from(err: CastError) -> Self {
        match err {
            CastError::StillReferenced { .. } => Self::BusinessRuleViolation(err.to_string()),
            _ => Self::ValidationError(err.to_string()),
        }
    }
}

impl From<AudiobookError> for ApplicationError {
    fn from(err: AudiobookError) -> Self {
        match err {
            AudiobookError::NoVoiceAssigned(_) => Self::BusinessRuleViolation(err.to_string()),
            _ => Self::ValidationError(err.to_string()),
        }
    }
}
