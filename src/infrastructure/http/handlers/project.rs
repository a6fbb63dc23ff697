//! Project HTTP Handlers

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    AssignVoice, CharacterRemovedResponse, CharacterUpdatedResponse, CreateProject,
    CreateProjectResponse, DeleteProject, GetProject, ListProjects, MoveCharacter,
    ProjectDetails, ProjectSummary, RemoveCharacter, UpdateVoiceSetting, ValidateDocument,
    ValidationReport,
};
use crate::domain::audiobook::{
    AudiobookDocument, Character, CharacterVoice, VoiceSettingChange, Violation,
};
use crate::infrastructure::http::dto::{ApiResponse, Empty};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

/// 创建项目请求
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub document: AudiobookDocument,
}

#[derive(Debug, Deserialize)]
pub struct ProjectIdRequest {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVoiceRequest {
    pub id: Uuid,
    pub character_index: usize,
    /// `null` 清除音色
    pub voice: Option<CharacterVoice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettingRequest {
    pub id: Uuid,
    pub character_index: usize,
    pub setting: VoiceSettingChange,
}

#[derive(Debug, Deserialize)]
pub struct MoveCharacterRequest {
    pub id: Uuid,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCharacterRequest {
    pub id: Uuid,
    pub character_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreatedResponse {
    pub id: Uuid,
    pub name: String,
    pub character_count: usize,
    pub episode_count: usize,
    pub scene_count: usize,
    pub dialogue_count: usize,
}

impl From<CreateProjectResponse> for ProjectCreatedResponse {
    fn from(r: CreateProjectResponse) -> Self {
        Self {
            id: r.id,
            name: r.name,
            character_count: r.character_count,
            episode_count: r.episode_count,
            scene_count: r.scene_count,
            dialogue_count: r.dialogue_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub document: AudiobookDocument,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProjectDetails> for ProjectResponse {
    fn from(d: ProjectDetails) -> Self {
        Self {
            id: d.id,
            name: d.name,
            document: d.document,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListItem {
    pub id: Uuid,
    pub name: String,
    pub character_count: usize,
    pub episode_count: usize,
    pub scene_count: usize,
    pub dialogue_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProjectSummary> for ProjectListItem {
    fn from(s: ProjectSummary) -> Self {
        Self {
            id: s.id,
            name: s.name,
            character_count: s.character_count,
            episode_count: s.episode_count,
            scene_count: s.scene_count,
            dialogue_count: s.dialogue_count,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl From<ValidationReport> for ValidationResponse {
    fn from(r: ValidationReport) -> Self {
        Self {
            valid: r.valid,
            violations: r.violations,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterResponse {
    pub id: Uuid,
    pub character_index: usize,
    pub character: Character,
    pub updated_at: String,
}

impl From<CharacterUpdatedResponse> for CharacterResponse {
    fn from(r: CharacterUpdatedResponse) -> Self {
        Self {
            id: r.project_id,
            character_index: r.character_index,
            character: r.character,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRemovedResult {
    pub id: Uuid,
    pub removed: Character,
    pub character_count: usize,
    pub updated_at: String,
}

impl From<CharacterRemovedResponse> for CharacterRemovedResult {
    fn from(r: CharacterRemovedResponse) -> Self {
        Self {
            id: r.project_id,
            removed: r.removed,
            character_count: r.character_count,
            updated_at: r.updated_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// 从 JSON 请求体创建项目
///
/// 请求体自行解析，结构错误也走统一响应格式
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse<ProjectCreatedResponse>>, ApiError> {
    let req: CreateProjectRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed request: {}", e)))?;

    let response = state
        .create_project_handler
        .handle(CreateProject {
            name: req.name,
            document: req.document,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 上传 JSON 文档文件创建项目（multipart: `name` 可选, `file` 必填）
pub async fn upload_project(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProjectCreatedResponse>>, ApiError> {
    let mut name: Option<String> = None;
    let mut document: Option<AudiobookDocument> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read name: {}", e)))?,
                );
            }
            "file" => {
                let filename = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

                tracing::debug!(filename = ?filename, size = bytes.len(), "Document uploaded");
                document = Some(AudiobookDocument::from_slice(&bytes)?);
            }
            _ => {}
        }
    }

    let document =
        document.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;

    let response = state
        .create_project_handler
        .handle(CreateProject { name, document })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 只校验文档，请求体即文档本身
pub async fn validate_document(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse<ValidationResponse>>, ApiError> {
    let document = AudiobookDocument::from_slice(&body)?;
    let report = state
        .validate_document_handler
        .handle(ValidateDocument { document });

    Ok(Json(ApiResponse::success(report.into())))
}

/// 获取项目详情（含完整文档）
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<Json<ApiResponse<ProjectResponse>>, ApiError> {
    let details = state
        .get_project_handler
        .handle(GetProject { project_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(details.into())))
}

/// 列出所有项目
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProjectListItem>>>, ApiError> {
    let projects = state.list_projects_handler.handle(ListProjects).await?;

    Ok(Json(ApiResponse::success(
        projects.into_iter().map(ProjectListItem::from).collect(),
    )))
}

/// 删除项目
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProjectIdRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_project_handler
        .handle(DeleteProject { project_id: req.id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 为角色分配或清除音色
pub async fn assign_voice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignVoiceRequest>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let response = state
        .assign_voice_handler
        .handle(AssignVoice {
            project_id: req.id,
            character_index: req.character_index,
            voice: req.voice,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 修改角色音色的一个 TTS 参数
pub async fn update_voice_setting(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceSettingRequest>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let response = state
        .update_voice_setting_handler
        .handle(UpdateVoiceSetting {
            project_id: req.id,
            character_index: req.character_index,
            change: req.setting,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 调整角色顺序，对话引用跟随角色
pub async fn move_character(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoveCharacterRequest>,
) -> Result<Json<ApiResponse<CharacterResponse>>, ApiError> {
    let response = state
        .move_character_handler
        .handle(MoveCharacter {
            project_id: req.id,
            from: req.from,
            to: req.to,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}

/// 删除未被对话引用的角色
pub async fn remove_character(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveCharacterRequest>,
) -> Result<Json<ApiResponse<CharacterRemovedResult>>, ApiError> {
    let response = state
        .remove_character_handler
        .handle(RemoveCharacter {
            project_id: req.id,
            character_index: req.character_index,
        })
        .await?;

    Ok(Json(ApiResponse::success(response.into())))
}
