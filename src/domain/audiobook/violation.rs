//! 校验问题记录
//!
//! 每条记录包含可机器判读的位置（哪个序列、哪个下标、哪个字段）和一条可读信息。

use serde::Serialize;

/// 文档中的序列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Characters,
    Episodes,
    Scenes,
    Dialogues,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Characters => "characters",
            Collection::Episodes => "episodes",
            Collection::Scenes => "scenes",
            Collection::Dialogues => "dialogues",
        }
    }

    /// 单数形式，用于拼接错误信息
    pub fn singular(&self) -> &'static str {
        match self {
            Collection::Characters => "character",
            Collection::Episodes => "episode",
            Collection::Scenes => "scene",
            Collection::Dialogues => "dialogue",
        }
    }
}

/// 问题位置，如 `scenes[1].dialogueBegin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FieldPath {
    pub collection: Collection,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl FieldPath {
    pub fn entry(collection: Collection, index: usize) -> Self {
        Self {
            collection,
            index,
            field: None,
        }
    }

    pub fn field(collection: Collection, index: usize, field: &'static str) -> Self {
        Self {
            collection,
            index,
            field: Some(field),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.collection.as_str(), self.index)?;
        if let Some(field) = self.field {
            write!(f, ".{}", field)?;
        }
        Ok(())
    }
}

/// 问题类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// 字段约束（长度、年龄段、参数范围）
    Field,
    /// 对话引用的角色下标越界
    CharacterIndex,
    /// 对话引用的角色 ID 不存在
    UnknownSpeaker,
    /// 相邻场景的对话区间不衔接
    SceneContiguity,
    /// 场景没有完整覆盖对话序列
    SceneCoverage,
    /// 相邻分集的场景区间不衔接
    EpisodeContiguity,
    /// 分集没有完整覆盖场景序列
    EpisodeCoverage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub path: FieldPath,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = FieldPath::field(Collection::Scenes, 1, "dialogueBegin");
        assert_eq!(path.to_string(), "scenes[1].dialogueBegin");
        assert_eq!(FieldPath::entry(Collection::Dialogues, 3).to_string(), "dialogues[3]");
    }

    #[test]
    fn test_serialized_shape() {
        let v = Violation::new(
            ViolationKind::CharacterIndex,
            FieldPath::field(Collection::Dialogues, 1, "character"),
            "out of range",
        );
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "character_index");
        assert_eq!(json["path"]["collection"], "dialogues");
        assert_eq!(json["path"]["index"], 1);
        assert_eq!(json["path"]["field"], "character");
    }
}
