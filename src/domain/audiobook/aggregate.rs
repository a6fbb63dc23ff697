//! Audiobook Context - Aggregate Root

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::schema::check_fields;
use super::{
    AudiobookDocument, Character, CastError, CharacterVoice, ProjectError, ProjectId,
    ProjectName, ReferentialValidator, ResolvedAudiobook, VoiceSettingChange,
};

/// Project 聚合根（一本有声书）
///
/// 不变量:
/// - 创建时文档必须通过字段检查和引用校验
/// - 修改采用整体替换: 复制文档、修改副本、替换原记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    document: AudiobookDocument,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    /// 校验文档并创建项目
    ///
    /// 名称优先使用参数，其次使用文档内的 `name`，都没有时为 "Untitled"
    pub fn create(
        name: Option<String>,
        document: AudiobookDocument,
        validator: &ReferentialValidator,
    ) -> Result<Self, ProjectError> {
        let mut violations = check_fields(&document);
        violations.extend(validator.validate(&document));
        if !violations.is_empty() {
            return Err(ProjectError::InvalidDocument(violations));
        }

        let raw_name = name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| document.name.clone().filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| "Untitled".to_string());
        let name =
            ProjectName::new(raw_name).map_err(|e| ProjectError::InvalidName(e.to_string()))?;

        let now = Utc::now();
        Ok(Self {
            id: ProjectId::new(),
            name,
            document,
            created_at: now,
            updated_at: now,
        })
    }

    /// 从存储恢复，不再校验
    pub fn restore(
        id: ProjectId,
        name: ProjectName,
        document: AudiobookDocument,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            document,
            created_at,
            updated_at,
        }
    }

    /// 返回替换了角色音色的新版本
    pub fn assign_voice(
        &self,
        character_index: usize,
        voice: Option<CharacterVoice>,
    ) -> Result<Self, ProjectError> {
        let document = self.document.with_voice(character_index, voice)?;
        Ok(self.replaced(document))
    }

    /// 返回修改了一个 TTS 参数的新版本
    pub fn change_voice_setting(
        &self,
        character_index: usize,
        change: VoiceSettingChange,
    ) -> Result<Self, ProjectError> {
        let document = self.document.with_voice_setting(character_index, change)?;
        Ok(self.replaced(document))
    }

    /// 调整角色顺序，对话引用随角色移动
    pub fn move_character(&self, from: usize, to: usize) -> Result<Self, ProjectError> {
        let mut book = self.resolve()?;
        book.move_character(from, to)?;
        Ok(self.replaced(book.to_document()?))
    }

    /// 删除没有对话引用的角色，其余对话的角色下标随之调整
    pub fn remove_character(&self, index: usize) -> Result<(Self, Character), ProjectError> {
        let mut book = self.resolve()?;
        let len = self.document.characters.len();
        let id = book
            .character_ids()
            .nth(index)
            .ok_or(CastError::PositionOutOfRange {
                position: index,
                len,
            })?;
        let removed = book.remove_character(id)?;
        Ok((self.replaced(book.to_document()?), removed))
    }

    fn resolve(&self) -> Result<ResolvedAudiobook, ProjectError> {
        ResolvedAudiobook::resolve(&self.document).map_err(ProjectError::InvalidDocument)
    }

    /// 新版本的 `updated_at` 严格大于旧版本，作为并发写入的版本号
    fn replaced(&self, document: AudiobookDocument) -> Self {
        let now = Utc::now();
        let updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };

        Self {
            id: self.id,
            name: self.name.clone(),
            document,
            created_at: self.created_at,
            updated_at,
        }
    }

    // Getters
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn document(&self) -> &AudiobookDocument {
        &self.document
    }

    pub fn into_document(self) -> AudiobookDocument {
        self.document
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audiobook::entities::fixtures::*;
    use crate::domain::audiobook::{AudiobookError, ElevenLabsVoice, ViolationKind};

    #[test]
    fn test_project_creation_uses_document_name() {
        let project =
            Project::create(None, well_formed(), &ReferentialValidator::default()).unwrap();
        assert_eq!(project.name().as_str(), "Harbor Lights");

        let project = Project::create(
            Some("Override".to_string()),
            well_formed(),
            &ReferentialValidator::default(),
        )
        .unwrap();
        assert_eq!(project.name().as_str(), "Override");

        let mut doc = well_formed();
        doc.name = None;
        let project = Project::create(None, doc, &ReferentialValidator::default()).unwrap();
        assert_eq!(project.name().as_str(), "Untitled");
    }

    #[test]
    fn test_blank_names_fall_back_to_untitled() {
        let mut doc = well_formed();
        doc.name = Some("   ".to_string());

        let project =
            Project::create(None, doc.clone(), &ReferentialValidator::default()).unwrap();
        assert_eq!(project.name().as_str(), "Untitled");

        let project = Project::create(
            Some(" ".to_string()),
            doc,
            &ReferentialValidator::default(),
        )
        .unwrap();
        assert_eq!(project.name().as_str(), "Untitled");
    }

    #[test]
    fn test_move_character_keeps_speakers() {
        let project =
            Project::create(None, well_formed(), &ReferentialValidator::default()).unwrap();

        let moved = project.move_character(1, 0).unwrap();
        let doc = moved.document();
        assert_eq!(doc.characters[0].name, "Brom");
        // "Only the tide." 仍由 Brom 说
        assert_eq!(doc.dialogues[1].character, 0);
        assert_eq!(doc.dialogues[0].character, 1);
        assert!(moved.updated_at() > project.updated_at());
        assert!(crate::domain::audiobook::validate(doc).is_empty());

        assert!(matches!(
            project.move_character(0, 5),
            Err(ProjectError::Cast(CastError::PositionOutOfRange { position: 5, len: 2 }))
        ));
    }

    #[test]
    fn test_remove_character() {
        let mut doc = well_formed();
        doc.characters.insert(0, character("Narrator"));
        for d in doc.dialogues.iter_mut() {
            d.character += 1;
        }
        let project = Project::create(None, doc, &ReferentialValidator::default()).unwrap();

        let (updated, removed) = project.remove_character(0).unwrap();
        assert_eq!(removed.name, "Narrator");
        let doc = updated.document();
        assert_eq!(doc.characters.len(), 2);
        let speakers: Vec<i64> = doc.dialogues.iter().map(|d| d.character).collect();
        assert_eq!(speakers, vec![0, 1, 0, 1]);

        assert!(matches!(
            updated.remove_character(0),
            Err(ProjectError::Cast(CastError::StillReferenced { dialogues: 2, .. }))
        ));
        assert!(matches!(
            updated.remove_character(2),
            Err(ProjectError::Cast(CastError::PositionOutOfRange { position: 2, len: 2 }))
        ));
    }

    #[test]
    fn test_invalid_document_collects_both_stages() {
        let mut doc = well_formed();
        doc.characters[0].name = "x".repeat(65);
        doc.dialogues[0].character = 3;

        let err = Project::create(None, doc, &ReferentialValidator::default()).unwrap_err();
        let ProjectError::InvalidDocument(violations) = err else {
            panic!("expected InvalidDocument");
        };
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::Field, ViolationKind::CharacterIndex]);
    }

    #[test]
    fn test_assign_voice_leaves_original_untouched() {
        let project =
            Project::create(None, well_formed(), &ReferentialValidator::default()).unwrap();
        let voice = CharacterVoice::ElevenLabs(ElevenLabsVoice {
            voice_id: "v-ada".to_string(),
            name: Some("Rachel".to_string()),
            voice_settings: None,
        });

        let updated = project.assign_voice(0, Some(voice)).unwrap();
        assert_eq!(updated.id(), project.id());
        assert!(project.document().characters[0].voice.is_none());
        assert!(updated.document().characters[0].voice.is_some());
        assert!(updated.updated_at() >= project.updated_at());

        let err = updated
            .change_voice_setting(1, VoiceSettingChange::Speed(1.2))
            .unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Document(AudiobookError::NoVoiceAssigned(1))
        ));
    }
}
