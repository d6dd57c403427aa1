use clap::Subcommand;
use focusgate_core::{Request, SessionMode};

use super::{dispatch, print_json};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a focus session
    Start {
        /// pomodoro, custom or indefinite
        #[arg(long, default_value = "pomodoro")]
        mode: String,
        /// Duration in minutes (custom mode)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Pause the running focus phase
    Pause,
    /// Resume a paused focus phase
    Resume,
    /// Stop the session
    Stop,
    /// Start a break
    Break,
    /// Skip the current break
    SkipBreak,
    /// Print current timer state as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let request = match action {
        TimerAction::Start { mode, minutes } => Request::StartFocus {
            mode: parse_mode(&mode)?,
            duration_min: minutes,
        },
        TimerAction::Pause => Request::PauseFocus,
        TimerAction::Resume => Request::ResumeFocus,
        TimerAction::Stop => Request::StopFocus,
        TimerAction::Break => Request::StartBreak,
        TimerAction::SkipBreak => Request::SkipBreak,
        TimerAction::Status => Request::GetTimerState,
    };
    let data = dispatch(request)?;
    print_json(&data)
}

fn parse_mode(value: &str) -> Result<SessionMode, Box<dyn std::error::Error>> {
    match value {
        "pomodoro" => Ok(SessionMode::Pomodoro),
        "custom" => Ok(SessionMode::Custom),
        "indefinite" => Ok(SessionMode::Indefinite),
        other => Err(format!("unknown mode '{other}' (pomodoro, custom, indefinite)").into()),
    }
}
