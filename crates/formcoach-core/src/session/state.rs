use serde::{Deserialize, Serialize};

/// Top-level session phase.
///
/// ```text
/// Initializing -> Searching <-> WaitingConfirmation -> Ready -> ShowingReport -> Searching
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    #[default]
    Initializing,
    Searching,
    WaitingConfirmation,
    Ready,
    ShowingReport,
}

impl SystemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Searching => "searching",
            Self::WaitingConfirmation => "waiting_confirmation",
            Self::Ready => "ready",
            Self::ShowingReport => "showing_report",
        }
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workout phase, orthogonal to [`SystemStatus`]. Only leaves `Idle` while
/// the system is `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseState {
    #[default]
    Idle,
    Running,
    Paused,
}
