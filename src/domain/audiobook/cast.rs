//! 角色表（稳定 ID）
//!
//! 上传格式用数组下标引用角色，调整顺序或删除角色会让引用悄悄指向别人。
//! 这里把通过校验的文档解析成带稳定 [`CharacterId`] 的结构，
//! 对话通过 ID 引用说话人，重排角色不会破坏引用。需要写回时再生成下标。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validator::character_index_violations;
use super::{
    AudiobookDocument, CastError, Character, Collection, Dialogue, Episode, FieldPath, Scene,
    Violation, ViolationKind,
};

/// 角色稳定标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 通过 ID 引用说话人的对话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub speaker: CharacterId,
    pub text: String,
}

/// 解析后的有声书
#[derive(Debug, Clone)]
pub struct ResolvedAudiobook {
    name: Option<String>,
    characters: Vec<(CharacterId, Character)>,
    lines: Vec<Line>,
    scenes: Vec<Scene>,
    episodes: Vec<Episode>,
}

impl ResolvedAudiobook {
    /// 为每个角色分配 ID 并把对话的下标换成 ID
    ///
    /// 存在越界的角色下标时返回所有相关问题
    pub fn resolve(document: &AudiobookDocument) -> Result<Self, Vec<Violation>> {
        let violations = character_index_violations(document);
        if !violations.is_empty() {
            return Err(violations);
        }

        let characters: Vec<(CharacterId, Character)> = document
            .characters
            .iter()
            .map(|c| (CharacterId::new(), c.clone()))
            .collect();

        let lines = document
            .dialogues
            .iter()
            .map(|d| Line {
                speaker: characters[d.character as usize].0,
                text: d.text.clone(),
            })
            .collect();

        Ok(Self {
            name: document.name.clone(),
            characters,
            lines,
            scenes: document.scenes.clone(),
            episodes: document.episodes.clone(),
        })
    }

    pub fn character_ids(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.characters.iter().map(|(id, _)| *id)
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c)
    }

    pub fn position_of(&self, id: CharacterId) -> Option<usize> {
        self.characters.iter().position(|(cid, _)| *cid == id)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// 第 `index` 条对话的说话人
    pub fn speaker(&self, index: usize) -> Option<&Character> {
        self.lines
            .get(index)
            .and_then(|line| self.character(line.speaker))
    }

    /// 调整角色顺序，对话引用不受影响
    pub fn move_character(&mut self, from: usize, to: usize) -> Result<(), CastError> {
        let len = self.characters.len();
        if from >= len {
            return Err(CastError::PositionOutOfRange { position: from, len });
        }
        if to >= len {
            return Err(CastError::PositionOutOfRange { position: to, len });
        }

        let entry = self.characters.remove(from);
        self.characters.insert(to, entry);
        Ok(())
    }

    /// 删除没有对话引用的角色
    pub fn remove_character(&mut self, id: CharacterId) -> Result<Character, CastError> {
        let position = self
            .position_of(id)
            .ok_or(CastError::UnknownCharacter(id))?;

        let dialogues = self.lines.iter().filter(|l| l.speaker == id).count();
        if dialogues > 0 {
            return Err(CastError::StillReferenced { id, dialogues });
        }

        Ok(self.characters.remove(position).1)
    }

    /// 按 ID 检查每条对话的说话人是否存在
    pub fn check_references(&self) -> Vec<Violation> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.position_of(line.speaker).is_none())
            .map(|(i, line)| {
                Violation::new(
                    ViolationKind::UnknownSpeaker,
                    FieldPath::field(Collection::Dialogues, i, "character"),
                    format!(
                        "'dialogue' at index {} references unknown 'character' {}",
                        i, line.speaker
                    ),
                )
            })
            .collect()
    }

    /// 按当前角色顺序生成下标形式的文档
    pub fn to_document(&self) -> Result<AudiobookDocument, CastError> {
        let positions: HashMap<CharacterId, usize> = self
            .characters
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (*id, i))
            .collect();

        let dialogues = self
            .lines
            .iter()
            .map(|line| {
                positions
                    .get(&line.speaker)
                    .map(|&p| Dialogue {
                        character: p as i64,
                        text: line.text.clone(),
                    })
                    .ok_or(CastError::UnknownCharacter(line.speaker))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AudiobookDocument {
            name: self.name.clone(),
            characters: self.characters.iter().map(|(_, c)| c.clone()).collect(),
            episodes: self.episodes.clone(),
            scenes: self.scenes.clone(),
            dialogues,
        })
    }
}
