//! Project Command Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{
    AssignVoice, CreateProject, DeleteProject, MoveCharacter, RemoveCharacter, UpdateVoiceSetting,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{ProjectRecord, ProjectRepositoryPort, RepositoryError};
use crate::domain::audiobook::{Character, Project, ReferentialValidator};

// ============================================================================
// CreateProject
// ============================================================================

/// 创建项目响应
#[derive(Debug, Clone)]
pub struct CreateProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub character_count: usize,
    pub episode_count: usize,
    pub scene_count: usize,
    pub dialogue_count: usize,
}

/// CreateProject Handler
///
/// 文档必须通过字段检查和引用校验，否则不写入任何数据
pub struct CreateProjectHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
    validator: ReferentialValidator,
}

impl CreateProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>, validator: ReferentialValidator) -> Self {
        Self {
            project_repo,
            validator,
        }
    }

    pub async fn handle(&self, command: CreateProject) -> Result<CreateProjectResponse, ApplicationError> {
        let project = match Project::create(command.name, command.document, &self.validator) {
            Ok(project) => project,
            Err(e) => {
                tracing::info!(error = %e, "Project rejected");
                return Err(e.into());
            }
        };

        self.project_repo.save(&ProjectRecord::from(&project)).await?;

        let doc = project.document();
        tracing::info!(
            project_id = %project.id(),
            name = %project.name(),
            characters = doc.characters.len(),
            dialogues = doc.dialogues.len(),
            "Project created"
        );

        Ok(CreateProjectResponse {
            id: *project.id().as_uuid(),
            name: project.name().as_str().to_string(),
            character_count: doc.characters.len(),
            episode_count: doc.episodes.len(),
            scene_count: doc.scenes.len(),
            dialogue_count: doc.dialogues.len(),
        })
    }
}

// ============================================================================
// Copy-on-write 更新
// ============================================================================

/// 并发写入冲突时的最大尝试次数
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// 读取项目、修改副本、按版本条件替换
///
/// 存储中的 `updated_at` 已变化时重新读取并重做修改，
/// 超过尝试次数返回 `Conflict`
async fn replace_project<T, F>(
    project_repo: &dyn ProjectRepositoryPort,
    project_id: Uuid,
    edit: F,
) -> Result<(Project, T), ApplicationError>
where
    F: Fn(&Project) -> Result<(Project, T), ApplicationError>,
{
    let mut attempt = 1;
    loop {
        let record = project_repo
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Project", project_id))?;
        let current = Project::try_from(record)?;

        let (next, output) = edit(&current)?;

        match project_repo
            .replace_document(
                project_id,
                next.document(),
                current.updated_at(),
                next.updated_at(),
            )
            .await
        {
            Ok(()) => return Ok((next, output)),
            Err(RepositoryError::Conflict(_)) if attempt < MAX_UPDATE_ATTEMPTS => {
                tracing::debug!(
                    project_id = %project_id,
                    attempt,
                    "Concurrent project update, retrying"
                );
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// 角色更新响应
#[derive(Debug, Clone)]
pub struct CharacterUpdatedResponse {
    pub project_id: Uuid,
    pub character_index: usize,
    pub character: Character,
    pub updated_at: String,
}

impl CharacterUpdatedResponse {
    fn from_project(project: &Project, character_index: usize) -> Result<Self, ApplicationError> {
        let character = project
            .document()
            .character(character_index)
            .cloned()
            .ok_or_else(|| ApplicationError::internal("character vanished after update"))?;

        Ok(Self {
            project_id: *project.id().as_uuid(),
            character_index,
            character,
            updated_at: project.updated_at().to_rfc3339(),
        })
    }
}

// ============================================================================
// AssignVoice / UpdateVoiceSetting
// ============================================================================

/// AssignVoice Handler
pub struct AssignVoiceHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl AssignVoiceHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(&self, command: AssignVoice) -> Result<CharacterUpdatedResponse, ApplicationError> {
        let index = command.character_index;
        let voice = command.voice;

        let (project, ()) = replace_project(self.project_repo.as_ref(), command.project_id, |p| {
            Ok((p.assign_voice(index, voice.clone())?, ()))
        })
        .await?;

        tracing::info!(
            project_id = %command.project_id,
            character_index = index,
            voice_id = ?voice.as_ref().map(|v| v.voice_id()),
            "Character voice assigned"
        );

        CharacterUpdatedResponse::from_project(&project, index)
    }
}

/// UpdateVoiceSetting Handler
pub struct UpdateVoiceSettingHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl UpdateVoiceSettingHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(
        &self,
        command: UpdateVoiceSetting,
    ) -> Result<CharacterUpdatedResponse, ApplicationError> {
        let index = command.character_index;
        let change = command.change;

        let (project, ()) = replace_project(self.project_repo.as_ref(), command.project_id, |p| {
            Ok((p.change_voice_setting(index, change)?, ()))
        })
        .await?;

        tracing::debug!(
            project_id = %command.project_id,
            character_index = index,
            change = ?change,
            "Voice setting changed"
        );

        CharacterUpdatedResponse::from_project(&project, index)
    }
}

// ============================================================================
// MoveCharacter / RemoveCharacter
// ============================================================================

/// 角色删除响应
#[derive(Debug, Clone)]
pub struct CharacterRemovedResponse {
    pub project_id: Uuid,
    pub removed: Character,
    pub character_count: usize,
    pub updated_at: String,
}

/// MoveCharacter Handler
pub struct MoveCharacterHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl MoveCharacterHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(&self, command: MoveCharacter) -> Result<CharacterUpdatedResponse, ApplicationError> {
        let (from, to) = (command.from, command.to);

        let (project, ()) = replace_project(self.project_repo.as_ref(), command.project_id, |p| {
            Ok((p.move_character(from, to)?, ()))
        })
        .await?;

        tracing::info!(
            project_id = %command.project_id,
            from,
            to,
            "Character moved"
        );

        CharacterUpdatedResponse::from_project(&project, to)
    }
}

/// RemoveCharacter Handler
pub struct RemoveCharacterHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl RemoveCharacterHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(
        &self,
        command: RemoveCharacter,
    ) -> Result<CharacterRemovedResponse, ApplicationError> {
        let index = command.character_index;

        let (project, removed) =
            replace_project(self.project_repo.as_ref(), command.project_id, |p| {
                p.remove_character(index).map_err(ApplicationError::from)
            })
            .await?;

        tracing::info!(
            project_id = %command.project_id,
            character_index = index,
            name = %removed.name,
            "Character removed"
        );

        Ok(CharacterRemovedResponse {
            project_id: command.project_id,
            removed,
            character_count: project.document().characters.len(),
            updated_at: project.updated_at().to_rfc3339(),
        })
    }
}

// ============================================================================
// DeleteProject
// ============================================================================

/// DeleteProject Handler
pub struct DeleteProjectHandler {
    project_repo: Arc<dyn ProjectRepositoryPort>,
}

impl DeleteProjectHandler {
    pub fn new(project_repo: Arc<dyn ProjectRepositoryPort>) -> Self {
        Self { project_repo }
    }

    pub async fn handle(&self, command: DeleteProject) -> Result<(), ApplicationError> {
        let project_id = command.project_id;

        // 检查项目是否存在
        let project = self
            .project_repo
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Project", project_id))?;

        self.project_repo.delete(project_id).await?;

        tracing::info!(
            project_id = %project_id,
            name = %project.name,
            "Project deleted"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audiobook::fixtures::{character, well_formed};
    use crate::domain::audiobook::{
        AudiobookDocument, CharacterVoice, ElevenLabsVoice, VoiceSettingChange,
    };
    use crate::infrastructure::memory::InMemoryProjectRepository;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::time::Duration;

    /// 读取后停顿，让并发更新读到同一版本
    struct SlowRepository {
        inner: InMemoryProjectRepository,
    }

    #[async_trait]
    impl ProjectRepositoryPort for SlowRepository {
        async fn save(&self, project: &ProjectRecord) -> Result<(), RepositoryError> {
            self.inner.save(project).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepositoryError> {
            let record = self.inner.find_by_id(id).await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            record
        }

        async fn find_all(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
            self.inner.find_all().await
        }

        async fn replace_document(
            &self,
            id: Uuid,
            document: &AudiobookDocument,
            expected_updated_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            self.inner
                .replace_document(id, document, expected_updated_at, updated_at)
                .await
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.inner.delete(id).await
        }
    }

    /// 每次替换都报告版本冲突
    struct ContendedRepository {
        inner: InMemoryProjectRepository,
    }

    #[async_trait]
    impl ProjectRepositoryPort for ContendedRepository {
        async fn save(&self, project: &ProjectRecord) -> Result<(), RepositoryError> {
            self.inner.save(project).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<ProjectRecord>, RepositoryError> {
            self.inner.find_all().await
        }

        async fn replace_document(
            &self,
            id: Uuid,
            _document: &AudiobookDocument,
            _expected_updated_at: DateTime<Utc>,
            _updated_at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Conflict(id.to_string()))
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.inner.delete(id).await
        }
    }

    fn repo() -> Arc<InMemoryProjectRepository> {
        Arc::new(InMemoryProjectRepository::new())
    }

    fn eleven(voice_id: &str) -> CharacterVoice {
        CharacterVoice::ElevenLabs(ElevenLabsVoice {
            voice_id: voice_id.to_string(),
            name: None,
            voice_settings: None,
        })
    }

    async fn create(repo: Arc<InMemoryProjectRepository>) -> Uuid {
        let handler = CreateProjectHandler::new(repo, ReferentialValidator::default());
        handler
            .handle(CreateProject {
                name: None,
                document: well_formed(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_project() {
        let repo = repo();
        let handler = CreateProjectHandler::new(repo.clone(), ReferentialValidator::default());

        let response = handler
            .handle(CreateProject {
                name: Some("Lights".to_string()),
                document: well_formed(),
            })
            .await
            .unwrap();

        assert_eq!(response.name, "Lights");
        assert_eq!(response.character_count, 2);
        assert_eq!(response.dialogue_count, 4);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_document_is_not_stored() {
        let repo = repo();
        let handler = CreateProjectHandler::new(repo.clone(), ReferentialValidator::default());

        let mut document = well_formed();
        document.dialogues[0].character = 2;
        document.dialogues[1].character = -1;

        let err = handler
            .handle(CreateProject {
                name: None,
                document,
            })
            .await
            .unwrap_err();

        match err {
            ApplicationError::InvalidDocument(violations) => assert_eq!(violations.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_assign_voice_then_tune() {
        let repo = repo();
        let project_id = create(repo.clone()).await;

        let assign = AssignVoiceHandler::new(repo.clone());
        let response = assign
            .handle(AssignVoice {
                project_id,
                character_index: 1,
                voice: Some(eleven("v-brom")),
            })
            .await
            .unwrap();
        assert_eq!(response.character.voice.as_ref().unwrap().voice_id(), "v-brom");

        let tune = UpdateVoiceSettingHandler::new(repo.clone());
        let response = tune
            .handle(UpdateVoiceSetting {
                project_id,
                character_index: 1,
                change: VoiceSettingChange::Stability(0.2),
            })
            .await
            .unwrap();
        let settings = response.character.voice.unwrap().settings().cloned().unwrap();
        assert_eq!(settings.stability, 0.2);

        let stored = repo.find_by_id(project_id).await.unwrap().unwrap();
        let stored_settings = stored.document.characters[1]
            .voice
            .as_ref()
            .and_then(|v| v.settings())
            .unwrap()
            .clone();
        assert_eq!(stored_settings, settings);
    }

    #[tokio::test]
    async fn test_tune_without_voice_is_business_error() {
        let repo = repo();
        let project_id = create(repo.clone()).await;

        let err = UpdateVoiceSettingHandler::new(repo)
            .handle(UpdateVoiceSetting {
                project_id,
                character_index: 0,
                change: VoiceSettingChange::Speed(1.1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::BusinessRuleViolation(_)));
    }

    #[tokio::test]
    async fn test_assign_voice_bad_index_and_missing_project() {
        let repo = repo();
        let project_id = create(repo.clone()).await;
        let handler = AssignVoiceHandler::new(repo);

        let err = handler
            .handle(AssignVoice {
                project_id,
                character_index: 9,
                voice: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        let err = handler
            .handle(AssignVoice {
                project_id: Uuid::new_v4(),
                character_index: 0,
                voice: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_project() {
        let repo = repo();
        let project_id = create(repo.clone()).await;
        let handler = DeleteProjectHandler::new(repo.clone());

        handler.handle(DeleteProject { project_id }).await.unwrap();
        assert!(repo.is_empty());

        let err = handler.handle(DeleteProject { project_id }).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_voice_assignments_are_both_kept() {
        let repo = Arc::new(SlowRepository {
            inner: InMemoryProjectRepository::new(),
        });
        let project_id = CreateProjectHandler::new(repo.clone(), ReferentialValidator::default())
            .handle(CreateProject {
                name: None,
                document: well_formed(),
            })
            .await
            .unwrap()
            .id;

        let handler = AssignVoiceHandler::new(repo.clone());
        let (first, second) = tokio::join!(
            handler.handle(AssignVoice {
                project_id,
                character_index: 0,
                voice: Some(eleven("v-ada")),
            }),
            handler.handle(AssignVoice {
                project_id,
                character_index: 1,
                voice: Some(eleven("v-brom")),
            }),
        );
        first.unwrap();
        second.unwrap();

        let stored = repo.inner.find_by_id(project_id).await.unwrap().unwrap();
        let voice_ids: Vec<_> = stored
            .document
            .characters
            .iter()
            .map(|c| c.voice.as_ref().map(|v| v.voice_id().to_string()))
            .collect();
        assert_eq!(
            voice_ids,
            vec![Some("v-ada".to_string()), Some("v-brom".to_string())]
        );
    }

    #[tokio::test]
    async fn test_persistent_conflict_is_reported() {
        let repo = Arc::new(ContendedRepository {
            inner: InMemoryProjectRepository::new(),
        });
        let project_id = CreateProjectHandler::new(repo.clone(), ReferentialValidator::default())
            .handle(CreateProject {
                name: None,
                document: well_formed(),
            })
            .await
            .unwrap()
            .id;

        let err = AssignVoiceHandler::new(repo.clone())
            .handle(AssignVoice {
                project_id,
                character_index: 0,
                voice: Some(eleven("v-ada")),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Conflict(_)));

        let stored = repo.inner.find_by_id(project_id).await.unwrap().unwrap();
        assert!(stored.document.characters[0].voice.is_none());
    }

    #[tokio::test]
    async fn test_move_character_keeps_dialogue_speakers() {
        let repo = repo();
        let project_id = create(repo.clone()).await;

        let response = MoveCharacterHandler::new(repo.clone())
            .handle(MoveCharacter {
                project_id,
                from: 0,
                to: 1,
            })
            .await
            .unwrap();
        assert_eq!(response.character_index, 1);
        assert_eq!(response.character.name, "Ada");

        let stored = repo.find_by_id(project_id).await.unwrap().unwrap();
        let names: Vec<_> = stored.document.characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Brom", "Ada"]);
        let speakers: Vec<_> = stored.document.dialogues.iter().map(|d| d.character).collect();
        assert_eq!(speakers, vec![1, 0, 1, 0]);

        let err = MoveCharacterHandler::new(repo)
            .handle(MoveCharacter {
                project_id,
                from: 0,
                to: 5,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_remove_character() {
        let repo = repo();
        let mut document = well_formed();
        document.characters.push(character("Gull"));
        let project_id = CreateProjectHandler::new(repo.clone(), ReferentialValidator::default())
            .handle(CreateProject {
                name: None,
                document,
            })
            .await
            .unwrap()
            .id;
        let handler = RemoveCharacterHandler::new(repo.clone());

        let response = handler
            .handle(RemoveCharacter {
                project_id,
                character_index: 2,
            })
            .await
            .unwrap();
        assert_eq!(response.removed.name, "Gull");
        assert_eq!(response.character_count, 2);

        let err = handler
            .handle(RemoveCharacter {
                project_id,
                character_index: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::BusinessRuleViolation(_)));

        let stored = repo.find_by_id(project_id).await.unwrap().unwrap();
        assert_eq!(stored.document.characters.len(), 2);
    }
}
