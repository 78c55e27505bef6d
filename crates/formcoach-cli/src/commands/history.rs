use clap::Subcommand;
use formcoach_core::Database;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List finished workouts, newest first
    List {
        /// Maximum number of records
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show one workout with its per-repetition details
    Show {
        /// Record id
        id: String,
    },
    /// Delete all stored workouts
    Clear,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::List { limit } => {
            let records = db.list_records(limit)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        HistoryAction::Show { id } => match db.get_record(&id)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => return Err(format!("workout not found: {id}").into()),
        },
        HistoryAction::Clear => {
            let removed = db.clear_history()?;
            println!("{{\"removed\": {removed}}}");
        }
    }
    Ok(())
}
