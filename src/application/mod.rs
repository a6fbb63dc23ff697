//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（ProjectRepository）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    AssignVoice,
    CreateProject,
    DeleteProject,
    MoveCharacter,
    RemoveCharacter,
    UpdateVoiceSetting,
    // Handlers
    handlers::{
        AssignVoiceHandler, CharacterRemovedResponse, CharacterUpdatedResponse,
        CreateProjectHandler, CreateProjectResponse, DeleteProjectHandler, MoveCharacterHandler,
        RemoveCharacterHandler, UpdateVoiceSettingHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{ProjectRecord, ProjectRepositoryPort, RepositoryError};

pub use queries::{
    GetProject,
    ListProjects,
    ValidateDocument,
    // Handlers
    handlers::{
        GetProjectHandler, ListProjectsHandler, ProjectDetails, ProjectSummary,
        ValidateDocumentHandler, ValidationReport,
    },
};
