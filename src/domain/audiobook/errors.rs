//! Audiobook Context - Errors

use thiserror::Error;

use super::{CharacterId, Violation};

#[derive(Debug, Error)]
pub enum AudiobookError {
    #[error("无法解析有声书文档: {0}")]
    Malformed(String),

    #[error("角色索引越界: {index}，共 {len} 个角色")]
    CharacterOutOfRange { index: usize, len: usize },

    #[error("角色未分配音色: {0}")]
    NoVoiceAssigned(usize),

    #[error("无效的音色参数: {0}")]
    InvalidVoiceSetting(String),
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("无效的项目名称: {0}")]
    InvalidName(String),

    #[error("文档校验失败: {} 处问题", .0.len())]
    InvalidDocument(Vec<Violation>),

    #[error(transparent)]
    Document(#[from] AudiobookError),

    #[error(transparent)]
    Cast(#[from] CastError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CastError {
    #[error("角色不存在: {0}")]
    UnknownCharacter(CharacterId),

    #[error("角色位置越界: {position}，共 {len} 个角色")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("角色 {id} 仍被 {dialogues} 条对话引用")]
    StillReferenced { id: CharacterId, dialogues: usize },
}
