use clap::Subcommand;
use formcoach_core::Database;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the stored profile as JSON
    Get,
    /// Update body weight and/or height
    Set {
        /// Body weight in kilograms
        #[arg(long, allow_negative_numbers = true)]
        weight: Option<f64>,
        /// Height in centimeters
        #[arg(long, allow_negative_numbers = true)]
        height: Option<f64>,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProfileAction::Get => {
            let profile = db.profile()?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileAction::Set { weight, height } => {
            if weight.is_none() && height.is_none() {
                return Err("nothing to set: pass --weight and/or --height".into());
            }
            let mut profile = db.profile()?;
            if let Some(weight) = weight {
                if !(weight.is_finite() && weight > 0.0) {
                    return Err(format!("invalid weight: {weight}").into());
                }
                profile.weight_kg = weight;
            }
            if let Some(height) = height {
                if !(height.is_finite() && height > 0.0) {
                    return Err(format!("invalid height: {height}").into());
                }
                profile.height_cm = height;
            }
            db.set_profile(&profile)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }
    Ok(())
}
