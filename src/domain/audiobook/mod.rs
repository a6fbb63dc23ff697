//! Audiobook Context - 有声书限界上下文
//!
//! 职责:
//! - 有声书文档（角色、分集、场景、对话）
//! - 字段检查与引用校验
//! - 项目聚合与音色分配

mod aggregate;
mod cast;
mod entities;
mod errors;
mod schema;
mod validator;
mod value_objects;
mod violation;

pub use aggregate::Project;
pub use cast::{CharacterId, Line, ResolvedAudiobook};
pub use entities::{AudiobookDocument, Character, Dialogue, Episode, Scene};
pub use errors::{AudiobookError, CastError, ProjectError};
pub use schema::{check_fields, MAX_CHARACTER_NAME_CHARS, MAX_SCENE_NAME_CHARS};
pub use validator::{validate, ReferentialValidator, ValidationRules};
pub use value_objects::{
    AgeGroup, CharacterVoice, ElevenLabsVoice, Gender, ProjectId, ProjectName, VoiceSettingChange,
    VoiceSettings,
};
pub use violation::{Collection, FieldPath, Violation, ViolationKind};

#[cfg(test)]
pub(crate) use entities::fixtures;
