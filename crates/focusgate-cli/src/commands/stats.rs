use clap::Subcommand;
use focusgate_core::{Request, UsageStats};

use super::{dispatch, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Full statistics as JSON
    Show,
    /// One-line summary
    Summary,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let data = dispatch(Request::GetStats)?;
    match action {
        StatsAction::Show => print_json(&data),
        StatsAction::Summary => {
            let stats: UsageStats = serde_json::from_value(data)?;
            println!(
                "{} sessions, {} focus minutes, {} pomodoros, {} sites blocked, streak {} (best {})",
                stats.total_sessions,
                stats.total_focus_minutes,
                stats.total_pomodoros_completed,
                stats.total_sites_blocked,
                stats.current_streak,
                stats.longest_streak,
            );
            Ok(())
        }
    }
}
