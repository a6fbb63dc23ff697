//! Audiobook Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 项目唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 项目名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err("项目名称不能为空");
        }
        if trimmed.chars().count() > 200 {
            return Err("项目名称长度不能超过200字符");
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 角色性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// 年龄段 `[min, max]`
///
/// 不变量（由 schema 检查保证）:
/// - min >= 6
/// - max <= 96
/// - min <= max
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroup(pub u32, pub u32);

impl AgeGroup {
    pub const MIN_AGE: u32 = 6;
    pub const MAX_AGE: u32 = 96;

    pub fn min(&self) -> u32 {
        self.0
    }

    pub fn max(&self) -> u32 {
        self.1
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.0 < Self::MIN_AGE {
            return Err("最小年龄不能小于6");
        }
        if self.1 > Self::MAX_AGE {
            return Err("最大年龄不能大于96");
        }
        if self.0 > self.1 {
            return Err("最小年龄不能大于最大年龄");
        }
        Ok(())
    }
}

/// 文本转语音参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceSettings {
    /// 语速 (0.5 - 2.0)
    pub speed: f32,
    /// 稳定性 (0.0 - 1.0)
    pub stability: f32,
    /// 相似度增强 (0.0 - 1.0)
    pub similarity_boost: f32,
    /// 风格夸张度 (0.0 - 1.0)
    pub style: f32,
    /// 说话人增强
    pub speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            speaker_boost: true,
        }
    }
}

impl VoiceSettings {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.5..=2.0).contains(&self.speed) {
            return Err("speed must be between 0.5 and 2.0");
        }
        if !(0.0..=1.0).contains(&self.stability) {
            return Err("stability must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.similarity_boost) {
            return Err("similarityBoost must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.style) {
            return Err("style must be between 0.0 and 1.0");
        }
        Ok(())
    }

    /// 应用单个参数修改，越界时保持原值
    pub fn apply(&mut self, change: VoiceSettingChange) -> Result<(), &'static str> {
        let mut next = self.clone();
        match change {
            VoiceSettingChange::Speed(v) => next.speed = v,
            VoiceSettingChange::Stability(v) => next.stability = v,
            VoiceSettingChange::SimilarityBoost(v) => next.similarity_boost = v,
            VoiceSettingChange::Style(v) => next.style = v,
            VoiceSettingChange::SpeakerBoost(v) => next.speaker_boost = v,
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// 单个 TTS 参数修改
///
/// JSON 形式: `{"key": "stability", "value": 0.3}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum VoiceSettingChange {
    Speed(f32),
    Stability(f32),
    SimilarityBoost(f32),
    Style(f32),
    SpeakerBoost(bool),
}

/// ElevenLabs 音色绑定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevenLabsVoice {
    #[serde(rename = "voiceID", alias = "voiceId")]
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,
}

/// 角色音色绑定，按 `provider` 区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum CharacterVoice {
    #[serde(rename = "ELEVENLABS")]
    ElevenLabs(ElevenLabsVoice),
}

impl CharacterVoice {
    pub fn provider(&self) -> &'static str {
        match self {
            CharacterVoice::ElevenLabs(_) => "ELEVENLABS",
        }
    }

    pub fn voice_id(&self) -> &str {
        match self {
            CharacterVoice::ElevenLabs(v) => &v.voice_id,
        }
    }

    pub fn settings(&self) -> Option<&VoiceSettings> {
        match self {
            CharacterVoice::ElevenLabs(v) => v.voice_settings.as_ref(),
        }
    }

    /// 获取可修改的参数，不存在时先填入默认值
    pub fn settings_mut(&mut self) -> &mut VoiceSettings {
        match self {
            CharacterVoice::ElevenLabs(v) => v.voice_settings.get_or_insert_with(VoiceSettings::default),
        }
    }
}
