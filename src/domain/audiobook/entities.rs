//! Audiobook Context - Entities
//!
//! 有声书文档的上传格式。角色、对话、场景之间通过数组下标互相引用。

use serde::{Deserialize, Serialize};

use super::{AgeGroup, AudiobookError, CharacterVoice, Gender, VoiceSettingChange};

/// 角色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// 角色名（最多 64 字符）
    pub name: String,
    pub gender: Gender,
    pub age_group: AgeGroup,
    pub description: String,
    pub voice_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<CharacterVoice>,
}

/// 对话
///
/// `character` 为 characters 数组下标，上传时可能越界或为负，由校验器报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    pub character: i64,
    pub text: String,
}

/// 场景，覆盖对话区间 `[dialogue_begin, dialogue_end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// 场景名（最多 128 字符）
    pub name: String,
    pub description: String,
    pub time: String,
    pub location: String,
    pub dialogue_begin: i64,
    pub dialogue_end: i64,
}

/// 分集，覆盖场景区间 `[scene_begin, scene_end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub name: String,
    pub description: String,
    pub scene_begin: i64,
    pub scene_end: i64,
}

/// 有声书文档
///
/// 四个序列都必须出现在上传内容中，缺失属于结构错误，在解析阶段拒绝。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudiobookDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub characters: Vec<Character>,
    pub episodes: Vec<Episode>,
    pub scenes: Vec<Scene>,
    pub dialogues: Vec<Dialogue>,
}

impl AudiobookDocument {
    /// 解析上传的 JSON 文档（结构校验阶段）
    pub fn from_json(json: &str) -> Result<Self, AudiobookError> {
        serde_json::from_str(json).map_err(|e| AudiobookError::Malformed(e.to_string()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AudiobookError> {
        serde_json::from_slice(bytes).map_err(|e| AudiobookError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, AudiobookError> {
        serde_json::to_string(self).map_err(|e| AudiobookError::Malformed(e.to_string()))
    }

    pub fn character(&self, index: usize) -> Option<&Character> {
        self.characters.get(index)
    }

    /// 某个角色的对话条数
    pub fn dialogue_count_for(&self, index: usize) -> usize {
        self.dialogues
            .iter()
            .filter(|d| d.character >= 0 && d.character as usize == index)
            .count()
    }

    /// 复制文档并替换指定角色的音色，`None` 表示清除
    pub fn with_voice(
        &self,
        index: usize,
        voice: Option<CharacterVoice>,
    ) -> Result<Self, AudiobookError> {
        let mut next = self.clone();
        let len = next.characters.len();
        let character = next
            .characters
            .get_mut(index)
            .ok_or(AudiobookError::CharacterOutOfRange { index, len })?;

        if let Some(settings) = voice.as_ref().and_then(|v| v.settings()) {
            settings
                .validate()
                .map_err(|e| AudiobookError::InvalidVoiceSetting(e.to_string()))?;
        }

        character.voice = voice;
        Ok(next)
    }

    /// 复制文档并修改指定角色的一个 TTS 参数
    pub fn with_voice_setting(
        &self,
        index: usize,
        change: VoiceSettingChange,
    ) -> Result<Self, AudiobookError> {
        let mut next = self.clone();
        let len = next.characters.len();
        let character = next
            .characters
            .get_mut(index)
            .ok_or(AudiobookError::CharacterOutOfRange { index, len })?;

        let voice = character
            .voice
            .as_mut()
            .ok_or(AudiobookError::NoVoiceAssigned(index))?;

        voice
            .settings_mut()
            .apply(change)
            .map_err(|e| AudiobookError::InvalidVoiceSetting(e.to_string()))?;

        Ok(next)
    }
}
