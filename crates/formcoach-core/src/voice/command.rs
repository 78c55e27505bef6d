//! Recognized-text -> intent matching.
//!
//! Matching is substring based on the normalized utterance, so "开始深蹲吧"
//! matches both the squat selection and the generic start phrase.

use serde::Serialize;

use crate::exercise::ExerciseType;
use crate::session::SystemStatus;

pub const CONFIRM_PHRASES: &[&str] = &["确认校准", "确认", "校准完成", "准备好了"];
pub const START_PHRASES: &[&str] = &["开始训练", "开始运动", "开始", "启动"];
pub const STOP_PHRASES: &[&str] = &["结束训练", "结束运动", "结束"];
pub const PAUSE_PHRASES: &[&str] = &["暂停"];
pub const RESUME_PHRASES: &[&str] = &["继续", "继续训练"];

/// Selection phrases per exercise.
pub fn selection_phrases(exercise: ExerciseType) -> &'static [&'static str] {
    match exercise {
        ExerciseType::Squat => &["深蹲", "开始深蹲"],
        ExerciseType::BicepCurl => &["弯举", "二头弯举", "开始弯举"],
        ExerciseType::LateralRaise => &["侧平举", "开始侧平举"],
        ExerciseType::OverheadPress => &["推举", "过头推举", "开始推举"],
        ExerciseType::JumpingJack => &["开合跳", "开始开合跳"],
        // "公布" is a frequent mis-recognition of "弓步".
        ExerciseType::Lunge => &["弓步", "开始弓步", "公布"],
        ExerciseType::FrontKick => &["前踢腿", "开始前踢腿"],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum VoiceIntent {
    Confirm,
    /// Select an exercise; `start` when the utterance also asked to begin.
    Select { exercise: ExerciseType, start: bool },
    Start,
    Stop,
    Pause,
    Resume,
}

/// Lowercase and drop whitespace and punctuation.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn matches_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

/// Interpret an utterance in the context of the current system status.
///
/// Only the confirmation set is live while waiting for confirmation. In
/// `ready`, exercise selection wins over the generic commands. Everything
/// else yields `None`.
pub fn interpret(status: SystemStatus, text: &str) -> Option<VoiceIntent> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }
    match status {
        SystemStatus::WaitingConfirmation => {
            matches_any(&text, CONFIRM_PHRASES).then_some(VoiceIntent::Confirm)
        }
        SystemStatus::Ready => {
            let selected = ExerciseType::ALL
                .into_iter()
                .find(|&e| matches_any(&text, selection_phrases(e)));
            if let Some(exercise) = selected {
                return Some(VoiceIntent::Select {
                    exercise,
                    start: matches_any(&text, START_PHRASES),
                });
            }
            if matches_any(&text, START_PHRASES) {
                Some(VoiceIntent::Start)
            } else if matches_any(&text, STOP_PHRASES) {
                Some(VoiceIntent::Stop)
            } else if matches_any(&text, PAUSE_PHRASES) {
                Some(VoiceIntent::Pause)
            } else if matches_any(&text, RESUME_PHRASES) {
                Some(VoiceIntent::Resume)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_spaces_and_punctuation() {
        assert_eq!(normalize(" 开始 训练。"), "开始训练");
        assert_eq!(normalize("确认，OK!"), "确认ok");
        assert_eq!(normalize("  ，。 "), "");
    }

    #[test]
    fn confirmation_only_while_waiting() {
        assert_eq!(
            interpret(SystemStatus::WaitingConfirmation, "我准备好了"),
            Some(VoiceIntent::Confirm)
        );
        assert_eq!(interpret(SystemStatus::WaitingConfirmation, "开始深蹲"), None);
        assert_eq!(interpret(SystemStatus::Ready, "确认"), None);
        assert_eq!(interpret(SystemStatus::Searching, "确认"), None);
    }

    #[test]
    fn selection_beats_generic_start() {
        assert_eq!(
            interpret(SystemStatus::Ready, "开始深蹲"),
            Some(VoiceIntent::Select {
                exercise: ExerciseType::Squat,
                start: true
            })
        );
        assert_eq!(
            interpret(SystemStatus::Ready, "侧平举"),
            Some(VoiceIntent::Select {
                exercise: ExerciseType::LateralRaise,
                start: false
            })
        );
        assert_eq!(
            interpret(SystemStatus::Ready, "公布"),
            Some(VoiceIntent::Select {
                exercise: ExerciseType::Lunge,
                start: false
            })
        );
    }

    #[test]
    fn generic_commands_in_priority_order() {
        assert_eq!(interpret(SystemStatus::Ready, "开始训练"), Some(VoiceIntent::Start));
        assert_eq!(interpret(SystemStatus::Ready, "结束训练"), Some(VoiceIntent::Stop));
        assert_eq!(interpret(SystemStatus::Ready, "暂停一下"), Some(VoiceIntent::Pause));
        assert_eq!(interpret(SystemStatus::Ready, "继续"), Some(VoiceIntent::Resume));
        assert_eq!(interpret(SystemStatus::Ready, "今天天气不错"), None);
        assert_eq!(interpret(SystemStatus::Ready, "，"), None);
    }
}
