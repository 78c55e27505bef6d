//! Device command codes.
//!
//! The numeric values are a fixed contract with the display/speaker board
//! and must never be renumbered.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum DeviceCommand {
    /// Calibration finished; the board stops gesture recognition and starts streaming.
    StopGestureRecognition = 0,
    /// Session over; the board returns to its gesture-recognition idle state.
    ResetBoardState = 1,
    SpeechCalibrationLocked = 2,
    SpeechCalibrationSuccess = 3,
    SpeechWorkoutSelected = 4,
    SpeechWorkoutStart = 5,
    SpeechWorkoutPause = 6,
    SpeechWorkoutEnd = 7,
    SpeechCommandNotRecognized = 8,
    SpeechErrorNoWorkout = 9,
    #[serde(rename = "SPEECH_REP_MILESTONE_5")]
    SpeechRepMilestone5 = 10,
    #[serde(rename = "SPEECH_REP_MILESTONE_10")]
    SpeechRepMilestone10 = 11,
    #[serde(rename = "SPEECH_REP_MILESTONE_15")]
    SpeechRepMilestone15 = 12,
    #[serde(rename = "SPEECH_REP_MILESTONE_20")]
    SpeechRepMilestone20 = 13,
    SpeechFormSquatTooShallow = 20,
    SpeechFormArmsNotHighEnough = 21,
    SpeechFormLegsNotWideEnough = 22,
    SpeechFormBicepTooLow = 23,
    SpeechFormBicepNotStraight = 24,
}

/// Corrective feedback strings that have a board announcement.
const FEEDBACK_COMMANDS: [(&str, DeviceCommand); 5] = [
    ("蹲得再深一点！", DeviceCommand::SpeechFormSquatTooShallow),
    ("双臂再举高一点！", DeviceCommand::SpeechFormArmsNotHighEnough),
    ("双腿再打开一些！", DeviceCommand::SpeechFormLegsNotWideEnough),
    ("再举高一点！", DeviceCommand::SpeechFormBicepTooLow),
    ("手臂要伸直哦！", DeviceCommand::SpeechFormBicepNotStraight),
];

impl DeviceCommand {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Stable key used in the operation log.
    pub fn key(self) -> &'static str {
        match self {
            Self::StopGestureRecognition => "STOP_GESTURE_RECOGNITION",
            Self::ResetBoardState => "RESET_BOARD_STATE",
            Self::SpeechCalibrationLocked => "SPEECH_CALIBRATION_LOCKED",
            Self::SpeechCalibrationSuccess => "SPEECH_CALIBRATION_SUCCESS",
            Self::SpeechWorkoutSelected => "SPEECH_WORKOUT_SELECTED",
            Self::SpeechWorkoutStart => "SPEECH_WORKOUT_START",
            Self::SpeechWorkoutPause => "SPEECH_WORKOUT_PAUSE",
            Self::SpeechWorkoutEnd => "SPEECH_WORKOUT_END",
            Self::SpeechCommandNotRecognized => "SPEECH_COMMAND_NOT_RECOGNIZED",
            Self::SpeechErrorNoWorkout => "SPEECH_ERROR_NO_WORKOUT",
            Self::SpeechRepMilestone5 => "SPEECH_REP_MILESTONE_5",
            Self::SpeechRepMilestone10 => "SPEECH_REP_MILESTONE_10",
            Self::SpeechRepMilestone15 => "SPEECH_REP_MILESTONE_15",
            Self::SpeechRepMilestone20 => "SPEECH_REP_MILESTONE_20",
            Self::SpeechFormSquatTooShallow => "SPEECH_FORM_SQUAT_TOO_SHALLOW",
            Self::SpeechFormArmsNotHighEnough => "SPEECH_FORM_ARMS_NOT_HIGH_ENOUGH",
            Self::SpeechFormLegsNotWideEnough => "SPEECH_FORM_LEGS_NOT_WIDE_ENOUGH",
            Self::SpeechFormBicepTooLow => "SPEECH_FORM_BICEP_TOO_LOW",
            Self::SpeechFormBicepNotStraight => "SPEECH_FORM_BICEP_NOT_STRAIGHT",
        }
    }

    /// Announcement for an exact repetition count, if that count is a milestone.
    pub fn milestone(rep_count: u32) -> Option<Self> {
        match rep_count {
            5 => Some(Self::SpeechRepMilestone5),
            10 => Some(Self::SpeechRepMilestone10),
            15 => Some(Self::SpeechRepMilestone15),
            20 => Some(Self::SpeechRepMilestone20),
            _ => None,
        }
    }

    /// Announcement for a corrective feedback string.
    pub fn for_feedback(feedback: &str) -> Option<Self> {
        FEEDBACK_COMMANDS
            .iter()
            .find(|(text, _)| *text == feedback)
            .map(|(_, command)| *command)
    }
}

/// Wire payload sent to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePayload {
    pub command: u8,
}

impl From<DeviceCommand> for DevicePayload {
    fn from(command: DeviceCommand) -> Self {
        Self {
            command: command.code(),
        }
    }
}
