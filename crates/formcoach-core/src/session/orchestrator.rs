//! Session orchestrator.
//!
//! Owns the two session state machines and drives the active analyzer.
//! Every entry point runs to completion; calls that do not apply in the
//! current state return without effect.
//!
//! ## Flow
//!
//! ```text
//! on_detector_ready()          Initializing -> Searching
//! process_landmarks(ready)     Searching -> WaitingConfirmation (voice on)
//! confirm_calibration()        WaitingConfirmation -> Ready
//! select_workout / start / pause / tick ...
//! stop_workout()               Ready -> ShowingReport (record handed off)
//! end_report_and_prepare...()  ShowingReport -> Searching
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::report::{calories_burned, format_elapsed, WorkoutRecord};
use super::{
    Collaborators, ExerciseState, SessionInput, SessionSettings, SystemStatus, WorkoutHistory,
};
use crate::clock::Clock;
use crate::events::Event;
use crate::exercise::{AnalyzerRegistry, ExerciseType, RepetitionEvent, FEEDBACK_REP_COMPLETE};
use crate::notify::{DeviceCommand, Notifier, OperationLog};
use crate::pose::{is_ready_pose, Pose};
use crate::voice::{interpret, VoiceControl, VoiceEvent, VoiceIntent, VoiceStatus};

pub const TEXT_INITIALIZING: &str = "正在初始化AI引擎...";
pub const TEXT_LOOKING_FOR_USER: &str = "正在寻找用户...";
pub const TEXT_SEARCHING: &str = "请以完整站姿进入画面中央...";
pub const TEXT_POSE_LOCKED: &str = "姿态已锁定！请说“确认”或点击按钮。";
pub const TEXT_READY: &str = "收到！系统已就绪，请选择运动。";
pub const TEXT_SELECT_FIRST: &str = "请先选择一个运动项目";
pub const TEXT_WORKOUT_START: &str = "训练开始！";
pub const TEXT_WORKOUT_PAUSE: &str = "训练已暂停。";
pub const TEXT_WORKOUT_END: &str = "本组训练结束！";
pub const TEXT_SHOWING_REPORT: &str = "查看您的本组成绩，关闭后可重新校准。";
pub const TEXT_REENTER_FRAME: &str = "请重新进入画面以开始新的训练。";

pub struct Orchestrator {
    registry: AnalyzerRegistry,
    notifier: Notifier,
    voice: Box<dyn VoiceControl>,
    history: Box<dyn WorkoutHistory>,
    clock: Box<dyn Clock>,
    weight_kg: f64,

    status: SystemStatus,
    exercise_state: ExerciseState,
    current: Option<ExerciseType>,
    rep_count: u32,
    elapsed_secs: u64,
    calories: f64,
    rep_details: Vec<RepetitionEvent>,
    voice_status: VoiceStatus,
    feedback: String,
    last_spoken: &'static str,
    summary: Option<WorkoutRecord>,
    events: Vec<Event>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, settings: SessionSettings) -> Self {
        let Collaborators {
            speech,
            device,
            voice,
            history,
            clock,
        } = collaborators;
        Self {
            registry: AnalyzerRegistry::new(),
            notifier: Notifier::new(speech, device, settings.speech_enabled, settings.log_capacity),
            voice,
            history,
            clock,
            weight_kg: settings.weight_kg,
            status: SystemStatus::Initializing,
            exercise_state: ExerciseState::Idle,
            current: None,
            rep_count: 0,
            elapsed_secs: 0,
            calories: 0.0,
            rep_details: Vec::new(),
            voice_status: VoiceStatus::Inactive,
            feedback: TEXT_INITIALIZING.to_string(),
            last_spoken: "",
            summary: None,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    pub fn exercise_state(&self) -> ExerciseState {
        self.exercise_state
    }

    pub fn current_exercise(&self) -> Option<ExerciseType> {
        self.current
    }

    pub fn available_workouts(&self) -> Vec<ExerciseType> {
        self.registry.available_workouts()
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn formatted_elapsed(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }

    pub fn calories(&self) -> f64 {
        self.calories
    }

    pub fn rep_details(&self) -> &[RepetitionEvent] {
        &self.rep_details
    }

    pub fn voice_status(&self) -> VoiceStatus {
        self.voice_status
    }

    /// Text currently shown to the user.
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// Record of the last finished workout, until the report is closed.
    pub fn summary(&self) -> Option<&WorkoutRecord> {
        self.summary.as_ref()
    }

    pub fn log(&self) -> &OperationLog {
        self.notifier.log()
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn set_weight_kg(&mut self, weight_kg: f64) {
        self.weight_kg = weight_kg;
    }

    /// Take all events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Pose detection finished loading.
    pub fn on_detector_ready(&mut self) {
        if self.status != SystemStatus::Initializing {
            tracing::debug!("detector ready ignored in {}", self.status);
            return;
        }
        self.set_status(SystemStatus::Searching);
        self.feedback = TEXT_LOOKING_FOR_USER.to_string();
    }

    /// One frame of landmarks; `None` when detection found nobody.
    pub fn process_landmarks(&mut self, pose: Option<&Pose>) {
        match self.status {
            SystemStatus::Searching => {
                self.feedback = TEXT_SEARCHING.to_string();
                if is_ready_pose(pose) {
                    self.set_status(SystemStatus::WaitingConfirmation);
                    self.announce(TEXT_POSE_LOCKED, DeviceCommand::SpeechCalibrationLocked);
                    self.activate_voice();
                }
            }
            SystemStatus::WaitingConfirmation => {
                self.feedback = TEXT_POSE_LOCKED.to_string();
                if !is_ready_pose(pose) {
                    self.set_status(SystemStatus::Searching);
                    self.voice.stop_listening();
                }
            }
            SystemStatus::Ready if self.exercise_state == ExerciseState::Running => {
                if let Some(pose) = pose {
                    self.analyze_frame(pose);
                }
            }
            _ => {}
        }
    }

    /// Confirm calibration, from a button or a recognized phrase.
    pub fn confirm_calibration(&mut self) {
        if self.status != SystemStatus::WaitingConfirmation {
            tracing::debug!("confirm ignored in {}", self.status);
            return;
        }
        self.notifier.send(DeviceCommand::StopGestureRecognition);
        self.set_status(SystemStatus::Ready);
        self.feedback = TEXT_READY.to_string();
        self.announce(TEXT_READY, DeviceCommand::SpeechCalibrationSuccess);
    }

    pub fn on_voice_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::Command(text) => self.on_voice_command(&text),
            VoiceEvent::Status(status) => self.on_voice_status(status),
        }
    }

    pub fn on_voice_status(&mut self, status: VoiceStatus) {
        self.voice_status = status;
    }

    pub fn on_voice_command(&mut self, text: &str) {
        let Some(intent) = interpret(self.status, text) else {
            tracing::debug!("no command matched {text:?} in {}", self.status);
            return;
        };
        tracing::info!("voice command {text:?} -> {intent:?}");
        match intent {
            VoiceIntent::Confirm => self.confirm_calibration(),
            VoiceIntent::Select { exercise, start } => {
                self.select_workout(Some(exercise));
                if start {
                    self.start_workout();
                }
            }
            VoiceIntent::Start | VoiceIntent::Resume => self.start_workout(),
            VoiceIntent::Stop => self.stop_workout(),
            VoiceIntent::Pause => self.pause_workout(),
        }
    }

    /// Choose (or clear) the exercise. Only while ready and idle.
    pub fn select_workout(&mut self, exercise: Option<ExerciseType>) {
        if self.exercise_state != ExerciseState::Idle || self.status != SystemStatus::Ready {
            tracing::debug!(
                "select ignored in {} / {:?}",
                self.status,
                self.exercise_state
            );
            return;
        }
        self.current = exercise;
        self.push_event(|at| Event::WorkoutSelected { exercise, at });
        let Some(exercise) = exercise else {
            return;
        };
        if let Some(analyzer) = self.registry.get_mut(exercise) {
            analyzer.reset();
        }
        let text = format!("已选择: {}。", exercise.display_name());
        self.feedback = text.clone();
        self.announce(&text, DeviceCommand::SpeechWorkoutSelected);
    }

    pub fn start_workout(&mut self) {
        if self.status != SystemStatus::Ready {
            tracing::debug!("start ignored in {}", self.status);
            return;
        }
        let Some(exercise) = self.current else {
            self.announce(TEXT_SELECT_FIRST, DeviceCommand::SpeechErrorNoWorkout);
            return;
        };
        let resumed = match self.exercise_state {
            ExerciseState::Running => return,
            ExerciseState::Paused => true,
            ExerciseState::Idle => {
                let now = self.clock.now_ms();
                self.rep_count = 0;
                self.elapsed_secs = 0;
                self.calories = 0.0;
                self.rep_details.clear();
                self.last_spoken = "";
                if let Some(analyzer) = self.registry.get_mut(exercise) {
                    analyzer.reset();
                    analyzer.start(now);
                }
                false
            }
        };
        self.exercise_state = ExerciseState::Running;
        self.announce(TEXT_WORKOUT_START, DeviceCommand::SpeechWorkoutStart);
        self.push_event(|at| Event::WorkoutStarted {
            exercise,
            resumed,
            at,
        });
    }

    pub fn pause_workout(&mut self) {
        if self.exercise_state != ExerciseState::Running {
            tracing::debug!("pause ignored while {:?}", self.exercise_state);
            return;
        }
        self.exercise_state = ExerciseState::Paused;
        self.announce(TEXT_WORKOUT_PAUSE, DeviceCommand::SpeechWorkoutPause);
        let elapsed_secs = self.elapsed_secs;
        self.push_event(|at| Event::WorkoutPaused { elapsed_secs, at });
    }

    /// Finish the workout and show its report.
    pub fn stop_workout(&mut self) {
        if self.exercise_state == ExerciseState::Idle {
            tracing::debug!("stop ignored while idle");
            return;
        }
        if let Some(exercise) = self.current {
            let record = WorkoutRecord {
                id: Uuid::new_v4().to_string(),
                exercise,
                ended_at: self.now(),
                total_reps: self.rep_count,
                total_secs: self.elapsed_secs,
                total_calories: self.calories,
                rep_details: self.rep_details.clone(),
            };
            tracing::info!(
                "workout finished: {} x{} in {}, {} kcal",
                exercise,
                record.total_reps,
                record.formatted_time(),
                record.total_calories
            );
            if let Err(e) = self.history.add_record(&record) {
                tracing::warn!("failed to save workout record {}: {e}", record.id);
            }
            self.summary = Some(record.clone());
            self.push_event(|at| Event::WorkoutFinished { record, at });
        }
        self.announce(TEXT_WORKOUT_END, DeviceCommand::SpeechWorkoutEnd);
        self.voice.stop_listening();
        self.set_status(SystemStatus::ShowingReport);
        self.exercise_state = ExerciseState::Idle;
        self.feedback = TEXT_SHOWING_REPORT.to_string();
    }

    /// One second of wall time. Only counts while running.
    pub fn tick(&mut self) {
        if self.exercise_state != ExerciseState::Running {
            return;
        }
        let Some(exercise) = self.current else {
            return;
        };
        self.elapsed_secs += 1;
        self.calories = calories_burned(exercise, self.weight_kg, self.elapsed_secs);
    }

    /// Close the report and look for the user again.
    pub fn end_report_and_prepare_for_next_set(&mut self) {
        if self.status != SystemStatus::ShowingReport {
            tracing::debug!("close report ignored in {}", self.status);
            return;
        }
        self.return_to_searching();
    }

    /// Abandon whatever is happening and look for the user again.
    pub fn reset_session(&mut self) {
        self.exercise_state = ExerciseState::Idle;
        self.return_to_searching();
    }

    /// Apply one UI/pose input.
    pub fn apply(&mut self, input: SessionInput) {
        match input {
            SessionInput::DetectorReady => self.on_detector_ready(),
            SessionInput::Frame { pose } => self.process_landmarks(pose.as_ref()),
            SessionInput::Confirm => self.confirm_calibration(),
            SessionInput::Select { exercise } => self.select_workout(exercise),
            SessionInput::Start => self.start_workout(),
            SessionInput::Pause => self.pause_workout(),
            SessionInput::Stop => self.stop_workout(),
            SessionInput::CloseReport => self.end_report_and_prepare_for_next_set(),
            SessionInput::Reset => self.reset_session(),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn analyze_frame(&mut self, pose: &Pose) {
        let Some(exercise) = self.current else {
            return;
        };
        let now = self.clock.now_ms();
        let Some(analyzer) = self.registry.get_mut(exercise) else {
            return;
        };
        let result = analyzer.analyze(pose, now);

        let previous = self.rep_count;
        self.rep_count = result.rep_count;
        if let Some(rep) = result.new_rep {
            self.rep_details.push(rep);
            let rep_count = self.rep_count;
            self.push_event(|at| Event::RepCompleted {
                exercise,
                rep_count,
                rep,
                at,
            });
        }

        if !result.feedback.is_empty() {
            self.feedback = result.feedback.to_string();
            if result.feedback != self.last_spoken && result.feedback != FEEDBACK_REP_COMPLETE {
                if let Some(command) = DeviceCommand::for_feedback(result.feedback) {
                    self.announce(result.feedback, command);
                }
                self.last_spoken = result.feedback;
            }
        }

        if self.rep_count > previous {
            if let Some(command) = DeviceCommand::milestone(self.rep_count) {
                let text = format!("已经完成 {} 个了！", self.rep_count);
                self.announce(&text, command);
            }
        }
    }

    fn return_to_searching(&mut self) {
        self.activate_voice();
        self.voice_status = VoiceStatus::Inactive;
        self.set_status(SystemStatus::Searching);
        self.current = None;
        self.summary = None;
        self.feedback = TEXT_REENTER_FRAME.to_string();
        self.announce(TEXT_REENTER_FRAME, DeviceCommand::ResetBoardState);
        self.push_event(|at| Event::SessionReset { at });
    }

    fn activate_voice(&mut self) {
        if self.voice_status == VoiceStatus::Listening {
            tracing::debug!("voice control already listening");
            return;
        }
        self.voice.start_listening();
    }

    fn announce(&mut self, text: &str, command: DeviceCommand) {
        let now = self.clock.now_ms();
        self.notifier.announce(self.status, text, command, true, now);
    }

    fn set_status(&mut self, to: SystemStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        tracing::info!("status {from} -> {to}");
        self.status = to;
        self.push_event(|at| Event::StatusChanged { from, to, at });
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms() as i64).unwrap_or_default()
    }

    fn push_event(&mut self, make: impl FnOnce(DateTime<Utc>) -> Event) {
        let at = self.now();
        self.events.push(make(at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::pose::Landmark;

    fn orchestrator() -> (Orchestrator, ManualClock) {
        let clock = ManualClock::new(1_000);
        let collaborators = Collaborators {
            clock: Box::new(clock.clone()),
            ..Collaborators::default()
        };
        (Orchestrator::new(collaborators, SessionSettings::default()), clock)
    }

    fn standing() -> Pose {
        let mut pose = Pose::neutral();
        for i in [11, 12, 23, 24] {
            pose.set(i, Landmark::new(0.5, 0.4).with_visibility(0.9));
        }
        pose.set(0, Landmark::new(0.5, 0.1));
        pose.set(28, Landmark::new(0.5, 0.9));
        pose
    }

    #[test]
    fn starts_initializing() {
        let (o, _) = orchestrator();
        assert_eq!(o.status(), SystemStatus::Initializing);
        assert_eq!(o.feedback(), TEXT_INITIALIZING);
        assert!(o.available_workouts().contains(&ExerciseType::FrontKick));
    }

    #[test]
    fn poses_are_ignored_until_detector_ready() {
        let (mut o, _) = orchestrator();
        o.process_landmarks(Some(&standing()));
        assert_eq!(o.status(), SystemStatus::Initializing);
        o.on_detector_ready();
        o.on_detector_ready();
        assert_eq!(o.status(), SystemStatus::Searching);
        assert_eq!(o.feedback(), TEXT_LOOKING_FOR_USER);
    }

    #[test]
    fn lock_then_lose_pose() {
        let (mut o, _) = orchestrator();
        o.on_detector_ready();
        o.process_landmarks(Some(&standing()));
        assert_eq!(o.status(), SystemStatus::WaitingConfirmation);
        assert_eq!(o.log().last().unwrap().command_value, 2);
        assert_eq!(o.log().last().unwrap().status, SystemStatus::WaitingConfirmation);

        o.process_landmarks(None);
        assert_eq!(o.status(), SystemStatus::Searching);
    }

    #[test]
    fn tick_only_counts_while_running() {
        let (mut o, _) = orchestrator();
        o.tick();
        assert_eq!(o.elapsed_secs(), 0);
    }

    #[test]
    fn select_outside_ready_is_ignored() {
        let (mut o, _) = orchestrator();
        o.on_detector_ready();
        o.select_workout(Some(ExerciseType::Squat));
        assert_eq!(o.current_exercise(), None);
        assert!(o.log().is_empty());
    }

    #[test]
    fn events_record_status_changes_with_clock_time() {
        let (mut o, clock) = orchestrator();
        clock.set(5_000);
        o.on_detector_ready();
        let events = o.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].at().timestamp_millis(), 5_000);
        assert!(o.drain_events().is_empty());
    }
}
