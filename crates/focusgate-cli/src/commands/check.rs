use focusgate_core::Request;

use super::{dispatch, print_json};

pub fn run_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let data = dispatch(Request::CheckNavigation {
        url: url.to_string(),
    })?;
    print_json(&data)
}

pub fn run_unlock(password: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let data = dispatch(Request::EmergencyUnlock { password })?;
    print_json(&data)
}

pub fn run_quote() -> Result<(), Box<dyn std::error::Error>> {
    let data = dispatch(Request::GetQuote)?;
    let text = data["text"].as_str().unwrap_or_default();
    let author = data["author"].as_str().unwrap_or_default();
    println!("\"{text}\" -- {author}");
    Ok(())
}
