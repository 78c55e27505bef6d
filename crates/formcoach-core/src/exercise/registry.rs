//! Exercise type -> analyzer lookup.

use indexmap::IndexMap;

use super::{
    Analyzer, BicepCurlAnalyzer, ExerciseType, FrontKickAnalyzer, JumpingJackAnalyzer,
    LateralRaiseAnalyzer, LungeAnalyzer, OverheadPressAnalyzer, SquatAnalyzer,
};

/// One analyzer instance per exercise, built once at startup.
///
/// The mapping never changes after construction; only the analyzers' own
/// repetition state is mutated through [`AnalyzerRegistry::get_mut`].
pub struct AnalyzerRegistry {
    analyzers: IndexMap<ExerciseType, Box<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        let mut analyzers: IndexMap<ExerciseType, Box<dyn Analyzer>> = IndexMap::new();
        analyzers.insert(ExerciseType::Squat, Box::new(SquatAnalyzer::new()));
        analyzers.insert(ExerciseType::LateralRaise, Box::new(LateralRaiseAnalyzer::new()));
        analyzers.insert(ExerciseType::OverheadPress, Box::new(OverheadPressAnalyzer::new()));
        analyzers.insert(ExerciseType::BicepCurl, Box::new(BicepCurlAnalyzer::new()));
        analyzers.insert(ExerciseType::JumpingJack, Box::new(JumpingJackAnalyzer::new()));
        analyzers.insert(ExerciseType::Lunge, Box::new(LungeAnalyzer::new()));
        analyzers.insert(ExerciseType::FrontKick, Box::new(FrontKickAnalyzer::new()));
        Self { analyzers }
    }

    /// Exercises in registration order.
    pub fn available_workouts(&self) -> Vec<ExerciseType> {
        self.analyzers.keys().copied().collect()
    }

    pub fn get(&self, exercise: ExerciseType) -> Option<&dyn Analyzer> {
        self.analyzers.get(&exercise).map(|a| &**a)
    }

    pub fn get_mut(&mut self, exercise: ExerciseType) -> Option<&mut (dyn Analyzer + 'static)> {
        self.analyzers.get_mut(&exercise).map(|a| &mut **a)
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
