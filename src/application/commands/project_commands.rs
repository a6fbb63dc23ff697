//! Project Commands

use uuid::Uuid;

use crate::domain::audiobook::{AudiobookDocument, CharacterVoice, VoiceSettingChange};

/// 创建项目命令
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// 为空时使用文档内的名称
    pub name: Option<String>,
    pub document: AudiobookDocument,
}

/// 为角色分配音色，`voice` 为 `None` 时清除
#[derive(Debug, Clone)]
pub struct AssignVoice {
    pub project_id: Uuid,
    pub character_index: usize,
    pub voice: Option<CharacterVoice>,
}

/// 修改角色音色的一个 TTS 参数
#[derive(Debug, Clone)]
pub struct UpdateVoiceSetting {
    pub project_id: Uuid,
    pub character_index: usize,
    pub change: VoiceSettingChange,
}

/// 删除项目命令
#[derive(Debug, Clone)]
pub struct DeleteProject {
    pub project_id: Uuid,
}

/// 调整角色顺序，对话引用随角色移动
#[derive(Debug, Clone)]
pub struct MoveCharacter {
    pub project_id: Uuid,
    pub from: usize,
    pub to: usize,
}

/// 删除没有对话引用的角色
#[derive(Debug, Clone)]
pub struct RemoveCharacter {
    pub project_id: Uuid,
    pub character_index: usize,
}
