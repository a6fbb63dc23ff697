//! 字段约束检查
//!
//! 反序列化只保证类型正确，长度、年龄段、参数范围在这里检查。
//! 与引用校验分开，结果使用同样的 [`Violation`] 结构。

use super::{AudiobookDocument, Collection, FieldPath, Violation, ViolationKind};

pub const MAX_CHARACTER_NAME_CHARS: usize = 64;
pub const MAX_SCENE_NAME_CHARS: usize = 128;

/// 检查所有字段约束，返回全部问题
pub fn check_fields(document: &AudiobookDocument) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (i, character) in document.characters.iter().enumerate() {
        let name_chars = character.name.chars().count();
        if name_chars > MAX_CHARACTER_NAME_CHARS {
            violations.push(Violation::new(
                ViolationKind::Field,
                FieldPath::field(Collection::Characters, i, "name"),
                format!(
                    "'character' at index {} has a name of {} characters; maximum is {}",
                    i, name_chars, MAX_CHARACTER_NAME_CHARS
                ),
            ));
        }

        if let Err(reason) = character.age_group.validate() {
            violations.push(Violation::new(
                ViolationKind::Field,
                FieldPath::field(Collection::Characters, i, "ageGroup"),
                format!(
                    "'character' at index {} has invalid age group [{}, {}]: {}",
                    i,
                    character.age_group.min(),
                    character.age_group.max(),
                    reason
                ),
            ));
        }

        if let Some(settings) = character.voice.as_ref().and_then(|v| v.settings()) {
            if let Err(reason) = settings.validate() {
                violations.push(Violation::new(
                    ViolationKind::Field,
                    FieldPath::field(Collection::Characters, i, "voice"),
                    format!("'character' at index {} has invalid voice settings: {}", i, reason),
                ));
            }
        }
    }

    for (i, scene) in document.scenes.iter().enumerate() {
        let name_chars = scene.name.chars().count();
        if name_chars > MAX_SCENE_NAME_CHARS {
            violations.push(Violation::new(
                ViolationKind::Field,
                FieldPath::field(Collection::Scenes, i, "name"),
                format!(
                    "'scene' at index {} has a name of {} characters; maximum is {}",
                    i, name_chars, MAX_SCENE_NAME_CHARS
                ),
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audiobook::entities::fixtures::*;
    use crate::domain::audiobook::{AgeGroup, CharacterVoice, ElevenLabsVoice, VoiceSettings};

    #[test]
    fn test_well_formed_has_no_field_violations() {
        assert!(check_fields(&well_formed()).is_empty());
    }

    #[test]
    fn test_name_limits_count_chars_not_bytes() {
        let mut doc = well_formed();
        // 64 个汉字占 192 字节，仍然合法
        doc.characters[0].name = "龙".repeat(64);
        assert!(check_fields(&doc).is_empty());

        doc.characters[0].name = "龙".repeat(65);
        doc.scenes[1].name = "s".repeat(129);
        let violations = check_fields(&doc);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path.to_string(), "characters[0].name");
        assert_eq!(violations[1].path.to_string(), "scenes[1].name");
    }

    #[test]
    fn test_age_group_and_settings() {
        let mut doc = well_formed();
        doc.characters[0].age_group = AgeGroup(4, 30);
        doc.characters[1].voice = Some(CharacterVoice::ElevenLabs(ElevenLabsVoice {
            voice_id: "v".to_string(),
            name: None,
            voice_settings: Some(VoiceSettings {
                speed: 3.0,
                ..VoiceSettings::default()
            }),
        }));

        let violations = check_fields(&doc);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path.to_string(), "characters[0].ageGroup");
        assert_eq!(violations[1].path.to_string(), "characters[1].voice");
        assert!(violations.iter().all(|v| v.kind == ViolationKind::Field));
    }
}
