//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    AssignVoiceHandler, CreateProjectHandler, DeleteProjectHandler, MoveCharacterHandler,
    RemoveCharacterHandler, UpdateVoiceSettingHandler,
    // Query handlers
    GetProjectHandler, ListProjectsHandler, ValidateDocumentHandler,
    // Ports
    ProjectRepositoryPort,
};
use crate::domain::audiobook::ReferentialValidator;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub project_repo: Arc<dyn ProjectRepositoryPort>,

    // ========== Command Handlers ==========
    pub create_project_handler: CreateProjectHandler,
    pub assign_voice_handler: AssignVoiceHandler,
    pub update_voice_setting_handler: UpdateVoiceSettingHandler,
    pub move_character_handler: MoveCharacterHandler,
    pub remove_character_handler: RemoveCharacterHandler,
    pub delete_project_handler: DeleteProjectHandler,

    // ========== Query Handlers ==========
    pub get_project_handler: GetProjectHandler,
    pub list_projects_handler: ListProjectsHandler,
    pub validate_document_handler: ValidateDocumentHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// 创建与校验接口共用同一个校验器
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>, validator: ReferentialValidator) -> Self {
        Self {
            project_repo: project_repo.clone(),

            // Command handlers
            create_project_handler: CreateProjectHandler::new(project_repo.clone(), validator),
            assign_voice_handler: AssignVoiceHandler::new(project_repo.clone()),
            update_voice_setting_handler: UpdateVoiceSettingHandler::new(project_repo.clone()),
            move_character_handler: MoveCharacterHandler::new(project_repo.clone()),
            remove_character_handler: RemoveCharacterHandler::new(project_repo.clone()),
            delete_project_handler: DeleteProjectHandler::new(project_repo.clone()),

            // Query handlers
            get_project_handler: GetProjectHandler::new(project_repo.clone()),
            list_projects_handler: ListProjectsHandler::new(project_repo),
            validate_document_handler: ValidateDocumentHandler::new(validator),
        }
    }
}
