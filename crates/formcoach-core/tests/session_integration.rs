//! Integration tests for the session orchestrator.
//!
//! These drive a full session through the public API with recording fakes
//! for every collaborator and a manual clock.

use std::sync::{Arc, Mutex};

use formcoach_core::exercise::FEEDBACK_SQUAT_DEEPER;
use formcoach_core::session::{met, TEXT_READY};
use formcoach_core::{
    Collaborators, Database, DeviceChannel, DeviceCommand, DeviceError, ExerciseState, ExerciseType,
    Landmark, ManualClock, Orchestrator, Pose, SessionSettings, SpeechOutput, SystemStatus,
    VoiceControl, WorkoutHistory, WorkoutRecord,
};

type Shared<T> = Arc<Mutex<Vec<T>>>;

#[derive(Clone, Default)]
struct Speech(Shared<String>);

impl SpeechOutput for Speech {
    fn speak(&mut self, text: &str, _interrupt: bool) {
        self.0.lock().unwrap().push(text.to_string());
    }
}

#[derive(Clone, Default)]
struct Device {
    sent: Shared<u8>,
    connected: bool,
}

impl DeviceChannel for Device {
    fn send(&mut self, command: DeviceCommand) -> Result<(), DeviceError> {
        if !self.connected {
            return Err(DeviceError::NotConnected);
        }
        self.sent.lock().unwrap().push(command.code());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Voice(Shared<&'static str>);

impl VoiceControl for Voice {
    fn start_listening(&mut self) {
        self.0.lock().unwrap().push("start");
    }
    fn stop_listening(&mut self) {
        self.0.lock().unwrap().push("stop");
    }
}

#[derive(Clone, Default)]
struct History(Shared<WorkoutRecord>);

impl WorkoutHistory for History {
    fn add_record(&mut self, record: &WorkoutRecord) -> formcoach_core::error::Result<()> {
        self.0.lock().unwrap().push(record.clone());
        Ok(())
    }
}

struct Harness {
    session: Orchestrator,
    clock: ManualClock,
    speech: Speech,
    device: Device,
    voice: Voice,
    history: History,
}

impl Harness {
    fn with_settings(settings: SessionSettings) -> Self {
        let clock = ManualClock::new(10_000);
        let speech = Speech::default();
        let device = Device {
            connected: true,
            ..Device::default()
        };
        let voice = Voice::default();
        let history = History::default();
        let session = Orchestrator::new(
            Collaborators {
                speech: Box::new(speech.clone()),
                device: Box::new(device.clone()),
                voice: Box::new(voice.clone()),
                history: Box::new(history.clone()),
                clock: Box::new(clock.clone()),
            },
            settings,
        );
        Self {
            session,
            clock,
            speech,
            device,
            voice,
            history,
        }
    }

    fn new() -> Self {
        Self::with_settings(SessionSettings::default())
    }

    /// Detector ready, user steps in, confirms by voice.
    fn ready() -> Self {
        let mut h = Self::new();
        h.session.on_detector_ready();
        h.session.process_landmarks(Some(&standing()));
        h.session.on_voice_command("确认");
        assert_eq!(h.session.status(), SystemStatus::Ready);
        h
    }

    fn sent(&self) -> Vec<u8> {
        self.device.sent.lock().unwrap().clone()
    }

    fn spoken(&self) -> Vec<String> {
        self.speech.0.lock().unwrap().clone()
    }

    fn voice_calls(&self) -> Vec<&'static str> {
        self.voice.0.lock().unwrap().clone()
    }

    fn squat_rep(&mut self) {
        self.clock.advance(2_000);
        self.session.process_landmarks(Some(&squat(170.0, false)));
        self.session.process_landmarks(Some(&squat(80.0, false)));
        self.session.process_landmarks(Some(&squat(170.0, false)));
    }
}

fn standing() -> Pose {
    let mut pose = Pose::new(vec![Landmark::new(0.5, 0.5); 33]);
    for i in [11, 12, 23, 24] {
        pose.set(i, Landmark::new(0.5, 0.4).with_visibility(0.95));
    }
    pose.set(0, Landmark::new(0.5, 0.1));
    pose.set(27, Landmark::new(0.45, 0.9));
    pose.set(28, Landmark::new(0.55, 0.9));
    pose
}

/// Both knees at `angle`. With `hip_low` the hips sit below the knees.
fn squat(angle: f64, hip_low: bool) -> Pose {
    let mut pose = standing();
    for (hip, knee, ankle, x) in [(23, 25, 27, 0.45_f64), (24, 26, 28, 0.55)] {
        let k: (f64, f64) = (x, 0.7);
        let h: (f64, f64) = if hip_low { (x + 0.2, 0.72) } else { (x, 0.5) };
        let base = (h.1 - k.1).atan2(h.0 - k.0);
        let turn = base + angle.to_radians();
        let a = (k.0 + 0.2 * turn.cos(), k.1 + 0.2 * turn.sin());
        pose.set(hip, Landmark::new(h.0, h.1).with_visibility(0.95));
        pose.set(knee, Landmark::new(k.0, k.1));
        pose.set(ankle, Landmark::new(a.0, a.1));
    }
    pose
}

#[test]
fn start_before_ready_is_a_noop() {
    let mut h = Harness::new();
    h.session.on_detector_ready();
    h.session.start_workout();
    assert_eq!(h.session.exercise_state(), ExerciseState::Idle);
    assert_eq!(h.session.status(), SystemStatus::Searching);
    assert!(h.session.log().is_empty());
    assert!(h.sent().is_empty());
    assert!(h.spoken().is_empty());
}

#[test]
fn start_without_selection_asks_for_one() {
    let mut h = Harness::ready();
    h.session.start_workout();
    assert_eq!(h.session.exercise_state(), ExerciseState::Idle);
    assert_eq!(h.sent().last(), Some(&DeviceCommand::SpeechErrorNoWorkout.code()));
}

#[test]
fn calibration_flow_notifies_and_toggles_voice() {
    let mut h = Harness::new();
    h.session.on_detector_ready();
    h.session.process_landmarks(Some(&standing()));
    assert_eq!(h.session.status(), SystemStatus::WaitingConfirmation);
    assert_eq!(h.voice_calls(), ["start"]);

    // Lost before confirming.
    h.session.process_landmarks(Some(&Pose::new(vec![])));
    assert_eq!(h.session.status(), SystemStatus::Searching);
    assert_eq!(h.voice_calls(), ["start", "stop"]);

    h.session.process_landmarks(Some(&standing()));
    h.session.on_voice_command("开始深蹲");
    assert_eq!(h.session.status(), SystemStatus::WaitingConfirmation);

    h.session.confirm_calibration();
    assert_eq!(h.session.status(), SystemStatus::Ready);
    assert_eq!(h.session.feedback(), TEXT_READY);
    // locked, locked, stop gesture, calibration success
    assert_eq!(h.sent(), [2, 2, 0, 3]);
}

#[test]
fn confirmation_without_device_still_proceeds() {
    let speech = Speech::default();
    let mut session = Orchestrator::new(
        Collaborators {
            speech: Box::new(speech.clone()),
            device: Box::new(Device::default()),
            ..Collaborators::default()
        },
        SessionSettings::default(),
    );
    session.on_detector_ready();
    session.process_landmarks(Some(&standing()));
    session.on_voice_command("准备好了");
    assert_eq!(session.status(), SystemStatus::Ready);
    assert!(speech.0.lock().unwrap().iter().any(|s| s == TEXT_READY));
    assert_eq!(session.log().len(), 2);
}

#[test]
fn milestone_five_fires_once() {
    let mut h = Harness::ready();
    h.session.select_workout(Some(ExerciseType::Squat));
    h.session.start_workout();
    for _ in 0..5 {
        h.squat_rep();
    }
    for _ in 0..10 {
        h.session.process_landmarks(Some(&squat(170.0, false)));
    }
    assert_eq!(h.session.rep_count(), 5);
    let milestones = h.sent().iter().filter(|&&c| c == 10).count();
    assert_eq!(milestones, 1);
    assert!(h.spoken().iter().any(|s| s == "已经完成 5 个了！"));
}

#[test]
fn stop_on_idle_is_a_noop() {
    let mut h = Harness::ready();
    let before = h.session.log().len();
    h.session.stop_workout();
    assert_eq!(h.session.status(), SystemStatus::Ready);
    assert_eq!(h.session.log().len(), before);
    assert!(h.history.0.lock().unwrap().is_empty());
}

#[test]
fn stop_hands_record_to_history_and_summary() {
    let mut h = Harness::ready();
    h.session.on_voice_command("开始弓步");
    assert_eq!(h.session.current_exercise(), Some(ExerciseType::Lunge));
    assert_eq!(h.session.exercise_state(), ExerciseState::Running);

    let mut emitted = Vec::new();
    for _ in 0..3 {
        h.clock.advance(1_200);
        for angle in [170.0, 100.0, 170.0] {
            h.session.process_landmarks(Some(&squat(angle, false)));
        }
        emitted.extend(h.session.rep_details().last().copied());
        h.session.tick();
    }
    h.session.on_voice_command("结束");

    assert_eq!(h.session.status(), SystemStatus::ShowingReport);
    assert_eq!(h.session.exercise_state(), ExerciseState::Idle);
    let stored = h.history.0.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    let record = &stored[0];
    assert_eq!(record.total_reps, 3);
    assert_eq!(record.rep_details, emitted);
    assert!(record.rep_details.windows(2).all(|w| w[0].timestamp_ms < w[1].timestamp_ms));
    assert_eq!(record.total_secs, 3);
    assert_eq!(record.formatted_time(), "00:00:03");
    assert_eq!(h.session.summary(), Some(record));
    assert_eq!(h.voice_calls().last(), Some(&"stop"));
    assert_eq!(h.sent().last(), Some(&DeviceCommand::SpeechWorkoutEnd.code()));
}

#[test]
fn one_hour_of_squats_burns_met_times_weight() {
    let mut h = Harness::with_settings(SessionSettings {
        weight_kg: 80.0,
        ..SessionSettings::default()
    });
    h.session.on_detector_ready();
    h.session.process_landmarks(Some(&standing()));
    h.session.confirm_calibration();
    h.session.select_workout(Some(ExerciseType::Squat));
    h.session.start_workout();
    for _ in 0..3_600 {
        h.session.tick();
    }
    assert_eq!(h.session.elapsed_secs(), 3_600);
    assert_eq!(h.session.formatted_elapsed(), "01:00:00");
    assert_eq!(h.session.calories(), met(ExerciseType::Squat) * 80.0);
}

#[test]
fn pause_freezes_time_and_resume_keeps_counts() {
    let mut h = Harness::ready();
    h.session.select_workout(Some(ExerciseType::Squat));
    h.session.start_workout();
    h.squat_rep();
    h.session.tick();
    h.session.on_voice_command("暂停");
    assert_eq!(h.session.exercise_state(), ExerciseState::Paused);
    h.session.tick();
    h.squat_rep();
    assert_eq!(h.session.elapsed_secs(), 1);
    assert_eq!(h.session.rep_count(), 1);

    h.session.on_voice_command("继续训练");
    assert_eq!(h.session.exercise_state(), ExerciseState::Running);
    h.squat_rep();
    assert_eq!(h.session.rep_count(), 2);

    // Selection is locked while a workout is in progress.
    h.session.select_workout(Some(ExerciseType::Lunge));
    assert_eq!(h.session.current_exercise(), Some(ExerciseType::Squat));
}

#[test]
fn corrective_cue_is_not_repeated_every_frame() {
    let mut h = Harness::ready();
    h.session.select_workout(Some(ExerciseType::Squat));
    h.session.start_workout();
    for _ in 0..2 {
        h.session.process_landmarks(Some(&squat(170.0, false)));
        for _ in 0..5 {
            h.session.process_landmarks(Some(&squat(80.0, true)));
        }
        h.session.process_landmarks(Some(&squat(170.0, false)));
    }
    assert_eq!(h.session.rep_count(), 2);
    let cues = h.sent().iter().filter(|&&c| c == 20).count();
    assert_eq!(cues, 1);
    assert_eq!(
        h.spoken().iter().filter(|s| *s == FEEDBACK_SQUAT_DEEPER).count(),
        1
    );
}

#[test]
fn speech_disabled_keeps_device_and_log() {
    let mut h = Harness::with_settings(SessionSettings {
        speech_enabled: false,
        ..SessionSettings::default()
    });
    h.session.on_detector_ready();
    h.session.process_landmarks(Some(&standing()));
    h.session.confirm_calibration();
    assert!(h.spoken().is_empty());
    assert_eq!(h.sent(), [2, 0, 3]);
    assert_eq!(h.session.log().len(), 2);
}

#[test]
fn unmatched_voice_is_silent() {
    let mut h = Harness::ready();
    let before = h.session.log().len();
    h.session.on_voice_command("今天吃什么");
    h.session.on_voice_command("，。 ");
    assert_eq!(h.session.log().len(), before);
}

#[test]
fn report_close_and_reset_return_to_searching() {
    let mut h = Harness::ready();
    h.session.select_workout(Some(ExerciseType::BicepCurl));
    h.session.start_workout();
    h.session.end_report_and_prepare_for_next_set();
    assert_eq!(h.session.status(), SystemStatus::Ready);

    h.session.stop_workout();
    h.session.end_report_and_prepare_for_next_set();
    assert_eq!(h.session.status(), SystemStatus::Searching);
    assert_eq!(h.session.current_exercise(), None);
    assert!(h.session.summary().is_none());
    assert_eq!(h.sent().last(), Some(&DeviceCommand::ResetBoardState.code()));

    // Reset works from anywhere, even mid-workout.
    let mut h = Harness::ready();
    h.session.select_workout(Some(ExerciseType::FrontKick));
    h.session.start_workout();
    h.session.reset_session();
    assert_eq!(h.session.status(), SystemStatus::Searching);
    assert_eq!(h.session.exercise_state(), ExerciseState::Idle);
    h.session.tick();
    assert_eq!(h.session.elapsed_secs(), 0);
}

#[test]
fn operation_log_is_bounded_by_settings() {
    let mut h = Harness::with_settings(SessionSettings {
        log_capacity: 3,
        ..SessionSettings::default()
    });
    h.session.on_detector_ready();
    for _ in 0..5 {
        h.session.process_landmarks(Some(&standing()));
        h.session.process_landmarks(None);
    }
    assert_eq!(h.session.log().len(), 3);
    assert!(h
        .session
        .log()
        .entries()
        .all(|e| e.command_key == "SPEECH_CALIBRATION_LOCKED"));
}

#[test]
fn database_keeps_finished_workouts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formcoach.db");
    let clock = ManualClock::new(0);
    let mut session = Orchestrator::new(
        Collaborators {
            history: Box::new(Database::open_at(&path).unwrap()),
            clock: Box::new(clock.clone()),
            ..Collaborators::default()
        },
        SessionSettings::default(),
    );
    session.on_detector_ready();
    session.process_landmarks(Some(&standing()));
    session.confirm_calibration();
    for _ in 0..2 {
        session.select_workout(Some(ExerciseType::Squat));
        session.start_workout();
        for _ in 0..2 {
            clock.advance(1_500);
            for angle in [170.0, 80.0, 170.0] {
                session.process_landmarks(Some(&squat(angle, false)));
            }
        }
        session.tick();
        session.stop_workout();
        session.end_report_and_prepare_for_next_set();
        session.process_landmarks(Some(&standing()));
        session.confirm_calibration();
    }
    drop(session);

    let db = Database::open_at(&path).unwrap();
    let records = db.list_records(10).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.total_reps == 2 && r.total_secs == 1));
    assert_eq!(records[0].rep_details[0].tempo, 0.0);
    assert_eq!(records[0].rep_details[1].tempo, 1.5);
    assert_ne!(records[0].id, records[1].id);
}
