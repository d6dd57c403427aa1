pub mod check;
pub mod config;
pub mod rules;
pub mod stats;
pub mod timer;

use focusgate_core::{
    Coordinator, Database, LicenseProvider, Request, Response, SettingsStore, StaticLicense, Tier,
};

/// Build a coordinator from persisted state. Each CLI invocation is a
/// stateless client: it revives the coordinator (including any live engine
/// snapshot), applies one command and exits.
pub fn coordinator() -> Result<Coordinator, Box<dyn std::error::Error>> {
    let store = SettingsStore::open()?;
    let db = Database::open()?;
    Ok(Coordinator::new(store, db, license_from_env().tier()))
}

/// License lookup for the CLI: a fixed tier taken from FOCUSGATE_TIER.
fn license_from_env() -> StaticLicense {
    StaticLicense(match std::env::var("FOCUSGATE_TIER").as_deref() {
        Ok("pro") => Tier::Pro,
        _ => Tier::Free,
    })
}

/// Apply one request against wall-clock now and unwrap the envelope.
pub fn dispatch(request: Request) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    tracing::debug!(?request, "dispatching");
    let mut coordinator = coordinator()?;
    let Response {
        success,
        data,
        error,
    } = coordinator.handle(request, chrono::Utc::now());
    if !success {
        return Err(error.unwrap_or_else(|| "request failed".to_string()).into());
    }
    Ok(data.unwrap_or(serde_json::Value::Null))
}

/// Print a response payload as pretty JSON.
pub fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
