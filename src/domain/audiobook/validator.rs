//! 引用校验器
//!
//! 检查文档内部按下标的交叉引用:
//! - 对话引用的角色下标必须在 `[0, len(characters))` 内
//! - 场景按 `[dialogueBegin, dialogueEnd)` 连续切分对话序列
//! - 分集按 `[sceneBegin, sceneEnd)` 连续切分场景序列
//!
//! 校验是纯函数: 不修改文档，不提前返回，一次给出所有问题。

use serde::Deserialize;

use super::{AudiobookDocument, Collection, FieldPath, Violation, ViolationKind};

/// 校验规则开关
///
/// 关闭两个开关时只保留对话角色下标和相邻场景衔接两项检查。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ValidationRules {
    /// 首个场景从 0 开始、最后一个场景结束于对话总数、区间不倒置
    #[serde(default = "default_true")]
    pub scene_coverage: bool,
    /// 分集对场景的衔接与覆盖
    #[serde(default = "default_true")]
    pub episode_ranges: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            scene_coverage: true,
            episode_ranges: true,
        }
    }
}

/// 文档引用校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferentialValidator {
    rules: ValidationRules,
}

impl ReferentialValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    /// 只做对话角色下标和相邻场景衔接检查
    pub fn observed() -> Self {
        Self::new(ValidationRules {
            scene_coverage: false,
            episode_ranges: false,
        })
    }

    pub fn rules(&self) -> ValidationRules {
        self.rules
    }

    /// 校验文档，返回空列表表示合法
    pub fn validate(&self, document: &AudiobookDocument) -> Vec<Violation> {
        let mut violations = character_index_violations(document);

        let scenes = scene_partition(document);
        check_contiguity(&scenes, ViolationKind::SceneContiguity, &mut violations);
        if self.rules.scene_coverage {
            check_coverage(&scenes, ViolationKind::SceneCoverage, &mut violations);
        }

        if self.rules.episode_ranges {
            let episodes = episode_partition(document);
            check_contiguity(&episodes, ViolationKind::EpisodeContiguity, &mut violations);
            check_coverage(&episodes, ViolationKind::EpisodeCoverage, &mut violations);
        }

        violations
    }
}

/// 使用默认规则校验
pub fn validate(document: &AudiobookDocument) -> Vec<Violation> {
    ReferentialValidator::default().validate(document)
}

/// 对话角色下标检查，每条越界对话一条记录
pub(crate) fn character_index_violations(document: &AudiobookDocument) -> Vec<Violation> {
    let len = document.characters.len();

    document
        .dialogues
        .iter()
        .enumerate()
        .filter(|(_, d)| d.character < 0 || d.character as u64 >= len as u64)
        .map(|(i, d)| {
            Violation::new(
                ViolationKind::CharacterIndex,
                FieldPath::field(Collection::Dialogues, i, "character"),
                format!(
                    "'dialogue' at index {} references invalid 'character' index {}; valid range: [0, {})",
                    i, d.character, len
                ),
            )
        })
        .collect()
}

/// 一个序列按半开区间切分另一个序列
struct Partition {
    owner: Collection,
    target: Collection,
    begin_field: &'static str,
    end_field: &'static str,
    target_len: usize,
    ranges: Vec<(i64, i64)>,
}

fn scene_partition(document: &AudiobookDocument) -> Partition {
    Partition {
        owner: Collection::Scenes,
        target: Collection::Dialogues,
        begin_field: "dialogueBegin",
        end_field: "dialogueEnd",
        target_len: document.dialogues.len(),
        ranges: document
            .scenes
            .iter()
            .map(|s| (s.dialogue_begin, s.dialogue_end))
            .collect(),
    }
}

fn episode_partition(document: &AudiobookDocument) -> Partition {
    Partition {
        owner: Collection::Episodes,
        target: Collection::Scenes,
        begin_field: "sceneBegin",
        end_field: "sceneEnd",
        target_len: document.scenes.len(),
        ranges: document
            .episodes
            .iter()
            .map(|e| (e.scene_begin, e.scene_end))
            .collect(),
    }
}

/// 相邻区间必须首尾相接: `ranges[i].end == ranges[i + 1].begin`
fn check_contiguity(p: &Partition, kind: ViolationKind, out: &mut Vec<Violation>) {
    let owner = p.owner.singular();
    let target = p.target.singular();

    for (i, pair) in p.ranges.windows(2).enumerate() {
        let (_, end) = pair[0];
        let (begin, _) = pair[1];
        if end != begin {
            out.push(Violation::new(
                kind,
                FieldPath::field(p.owner, i + 1, p.begin_field),
                format!(
                    "'{owner}' at index {} ends at '{target}' index {} but the next '{owner}' at index {} begins at '{target}' index {}; they should be equal",
                    i,
                    end,
                    i + 1,
                    begin
                ),
            ));
        }
    }
}

/// 区间整体覆盖目标序列: 从 0 开始，到 `target_len` 结束，且每个区间不倒置
fn check_coverage(p: &Partition, kind: ViolationKind, out: &mut Vec<Violation>) {
    let owner = p.owner.singular();
    let target = p.target.singular();

    let (Some(&(first_begin, _)), Some(&(_, last_end))) = (p.ranges.first(), p.ranges.last())
    else {
        return;
    };

    if p.target_len == 0 {
        for (i, &(begin, end)) in p.ranges.iter().enumerate() {
            out.push(Violation::new(
                kind,
                FieldPath::entry(p.owner, i),
                format!(
                    "'{owner}' at index {} references '{target}' range [{}, {}) but there are no '{}' entries",
                    i,
                    begin,
                    end,
                    p.target.as_str()
                ),
            ));
        }
    } else {
        if first_begin != 0 {
            out.push(Violation::new(
                kind,
                FieldPath::field(p.owner, 0, p.begin_field),
                format!(
                    "first '{owner}' begins at '{target}' index {}; it should begin at 0",
                    first_begin
                ),
            ));
        }

        if last_end != p.target_len as i64 {
            let last = p.ranges.len() - 1;
            out.push(Violation::new(
                kind,
                FieldPath::field(p.owner, last, p.end_field),
                format!(
                    "last '{owner}' at index {} ends at '{target}' index {}; it should end at {}",
                    last, last_end, p.target_len
                ),
            ));
        }
    }

    for (i, &(begin, end)) in p.ranges.iter().enumerate() {
        if begin > end {
            out.push(Violation::new(
                kind,
                FieldPath::field(p.owner, i, p.end_field),
                format!(
                    "'{owner}' at index {} has an inverted '{target}' range [{}, {})",
                    i, begin, end
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audiobook::entities::fixtures::*;
    use crate::domain::audiobook::AudiobookDocument;

    fn doc_with_scenes(dialogue_count: usize, scenes: Vec<(i64, i64)>) -> AudiobookDocument {
        AudiobookDocument {
            name: None,
            characters: vec![character("A")],
            episodes: vec![episode(0, scenes.len() as i64)],
            scenes: scenes.into_iter().map(|(b, e)| scene(b, e)).collect(),
            dialogues: (0..dialogue_count).map(|_| dialogue(0, "line")).collect(),
        }
    }

    #[test]
    fn test_well_formed_document_is_valid() {
        assert!(validate(&well_formed()).is_empty());
        assert!(ReferentialValidator::observed()
            .validate(&well_formed())
            .is_empty());
    }

    #[test]
    fn test_exactly_one_violation_for_out_of_range_character() {
        let doc = AudiobookDocument {
            name: None,
            characters: vec![character("A"), character("B")],
            episodes: vec![],
            scenes: vec![],
            dialogues: vec![dialogue(0, "x"), dialogue(2, "y")],
        };

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::CharacterIndex);
        assert_eq!(violations[0].path.to_string(), "dialogues[1].character");
        assert!(violations[0].message.contains("index 2"));
        assert!(violations[0].message.contains("[0, 2)"));
    }

    #[test]
    fn test_index_equal_to_len_and_negative_are_rejected() {
        let doc = AudiobookDocument {
            name: None,
            characters: vec![character("A")],
            episodes: vec![],
            scenes: vec![],
            dialogues: vec![dialogue(1, "off by one"), dialogue(-1, "negative")],
        };

        let violations = validate(&doc);
        let indices: Vec<usize> = violations.iter().map(|v| v.path.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_no_characters_flags_every_dialogue() {
        let doc = AudiobookDocument {
            name: None,
            characters: vec![],
            episodes: vec![],
            scenes: vec![],
            dialogues: vec![dialogue(0, "a"), dialogue(0, "b"), dialogue(0, "c")],
        };

        let violations = validate(&doc);
        assert_eq!(violations.len(), 3);
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::CharacterIndex));
    }

    #[test]
    fn test_contiguous_scenes_pass() {
        let doc = doc_with_scenes(9, vec![(0, 5), (5, 9)]);
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn test_gap_between_scenes_reported_once() {
        let doc = doc_with_scenes(9, vec![(0, 5), (6, 9)]);

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.kind, ViolationKind::SceneContiguity);
        assert_eq!(v.path.to_string(), "scenes[1].dialogueBegin");
        assert!(v.message.contains("index 0 ends at 'dialogue' index 5"));
        assert!(v.message.contains("index 1 begins at 'dialogue' index 6"));
    }

    #[test]
    fn test_observed_rules_ignore_coverage() {
        let doc = doc_with_scenes(2, vec![(3, 5), (5, 9)]);
        assert!(ReferentialValidator::observed().validate(&doc).is_empty());
    }

    #[test]
    fn test_single_scene_with_bogus_range() {
        let doc = doc_with_scenes(4, vec![(1, 7)]);

        let violations = validate(&doc);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path.to_string(), "scenes[0].dialogueBegin");
        assert_eq!(violations[1].path.to_string(), "scenes[0].dialogueEnd");
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::SceneCoverage));
    }

    #[test]
    fn test_scenes_without_dialogues_are_flagged() {
        let doc = doc_with_scenes(0, vec![(0, 0), (0, 0)]);

        let violations = validate(&doc);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path.to_string(), "scenes[0]");
        assert_eq!(violations[1].path.to_string(), "scenes[1]");
    }

    #[test]
    fn test_inverted_scene_range() {
        let doc = doc_with_scenes(4, vec![(0, 3), (3, 2), (2, 4)]);

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.to_string(), "scenes[1].dialogueEnd");
        assert!(violations[0].message.contains("inverted"));
    }

    #[test]
    fn test_episode_ranges() {
        let mut doc = well_formed();
        doc.episodes = vec![episode(0, 1), episode(2, 3)];

        let violations = validate(&doc);
        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::EpisodeContiguity, ViolationKind::EpisodeCoverage]
        );
        assert_eq!(violations[0].path.to_string(), "episodes[1].sceneBegin");
        assert_eq!(violations[1].path.to_string(), "episodes[1].sceneEnd");

        let lenient = ReferentialValidator::new(ValidationRules {
            scene_coverage: true,
            episode_ranges: false,
        });
        assert!(lenient.validate(&doc).is_empty());
    }

    #[test]
    fn test_episodes_without_scenes_are_flagged() {
        let mut doc = well_formed();
        doc.scenes.clear();
        doc.episodes = vec![episode(0, 0), episode(0, 1)];

        let violations = validate(&doc);
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::EpisodeCoverage));
        assert_eq!(violations[0].path.to_string(), "episodes[0]");
        assert_eq!(violations[1].path.to_string(), "episodes[1]");
        assert!(violations[1].message.contains("no 'scenes' entries"));
    }

    #[test]
    fn test_first_episode_must_start_at_zero() {
        let mut doc = well_formed();
        doc.episodes = vec![episode(1, 2)];

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::EpisodeCoverage);
        assert_eq!(violations[0].path.to_string(), "episodes[0].sceneBegin");
        assert!(violations[0].message.contains("it should begin at 0"));
    }

    #[test]
    fn test_inverted_episode_range() {
        let mut doc = well_formed();
        doc.episodes = vec![episode(0, 2), episode(2, 1), episode(1, 2)];

        let violations = validate(&doc);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::EpisodeCoverage);
        assert_eq!(violations[0].path.to_string(), "episodes[1].sceneEnd");
        assert!(violations[0].message.contains("inverted 'scene' range [2, 1)"));
    }

    #[test]
    fn test_all_problems_are_collected() {
        let mut doc = well_formed();
        doc.dialogues[3].character = 7;
        doc.scenes[1].dialogue_begin = 3;

        let kinds: Vec<ViolationKind> = validate(&doc).iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::CharacterIndex, ViolationKind::SceneContiguity]
        );
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut doc = well_formed();
        doc.dialogues[0].character = 9;
        doc.scenes[0].dialogue_end = 1;

        let first = validate(&doc);
        let second = validate(&doc);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_rules_deserialize_with_defaults() {
        let rules: ValidationRules = serde_json::from_str(r#"{"episode_ranges": false}"#).unwrap();
        assert!(rules.scene_coverage);
        assert!(!rules.episode_ranges);
    }
}
