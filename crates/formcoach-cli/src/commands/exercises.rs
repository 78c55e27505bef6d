use formcoach_core::session::met;
use formcoach_core::AnalyzerRegistry;
use serde::Serialize;

#[derive(Serialize)]
struct ExerciseInfo {
    id: &'static str,
    name: &'static str,
    met: f64,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let list: Vec<_> = AnalyzerRegistry::new()
        .available_workouts()
        .into_iter()
        .map(|exercise| ExerciseInfo {
            id: exercise.as_str(),
            name: exercise.display_name(),
            met: met(exercise),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
