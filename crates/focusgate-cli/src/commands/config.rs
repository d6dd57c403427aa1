use clap::Subcommand;
use focusgate_core::storage::{get_value, set_value};
use focusgate_core::SettingsStore;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a value by dot-separated key (e.g. pomodoro.focus_duration)
    Get { key: String },
    /// Set a value by dot-separated key
    Set { key: String, value: String },
    /// Print the full settings document as JSON
    Show,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SettingsStore::open()?;
    let mut settings = store.load();

    match action {
        ConfigAction::Get { key } => match get_value(&settings, &key) {
            Some(value) => {
                println!("{value}");
                Ok(())
            }
            None => Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            set_value(&mut settings, &key, &value)?;
            store.save(&settings)?;
            println!("{key} = {value}");
            Ok(())
        }
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
