use clap::Subcommand;
use focusgate_core::Request;
use uuid::Uuid;

use super::{coordinator, dispatch, print_json};

/// Which rule list a subcommand operates on.
#[derive(Clone, Copy)]
pub enum List {
    Block,
    Allow,
}

#[derive(Subcommand)]
pub enum RuleAction {
    /// Add a rule
    Add {
        pattern: String,
        /// Treat the pattern as a regular expression over the full URL
        #[arg(long)]
        regex: bool,
    },
    /// Remove a rule by id
    Remove { id: Uuid },
    /// List rules as JSON
    List,
}

pub fn run(action: RuleAction, list: List) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RuleAction::Add { pattern, regex } => {
            let request = match list {
                List::Block => Request::AddToBlocklist {
                    pattern,
                    is_regex: regex,
                },
                List::Allow => Request::AddToWhitelist {
                    pattern,
                    is_regex: regex,
                },
            };
            let data = dispatch(request)?;
            print_json(&data)
        }
        RuleAction::Remove { id } => {
            let request = match list {
                List::Block => Request::RemoveFromBlocklist { id },
                List::Allow => Request::RemoveFromWhitelist { id },
            };
            dispatch(request)?;
            println!("removed {id}");
            Ok(())
        }
        RuleAction::List => {
            let mut coordinator = coordinator()?;
            let response = coordinator.handle(Request::GetSettings, chrono::Utc::now());
            let settings = response.data.unwrap_or(serde_json::Value::Null);
            let rules = match list {
                List::Block => &settings["blocklist"],
                List::Allow => &settings["whitelist"],
            };
            print_json(rules)
        }
    }
}
