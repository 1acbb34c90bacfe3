//! `viewer-build check`: validate a configuration the way `build` would.

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;

use crate::{
    Result,
    bundle::{DEFAULT_CONFIG, validate_default_config},
};

/// Arguments for `viewer-build check`.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Configuration file to validate.
    #[arg(value_name = "PATH", default_value = DEFAULT_CONFIG)]
    pub path: PathBuf,
}

/// Run `viewer-build check`.
pub fn check_cmd(args: &CheckArgs) -> Result<()> {
    let raw = validate_default_config(&args.path)?;
    println!("==> {} is valid ({})", args.path.display(), describe(&raw));
    Ok(())
}

/// One-line summary of a validated document.
fn describe(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with {} keys: {}", keys.len(), keys.join(", "))
        }
        Ok(Value::Array(items)) => format!("array of {} items", items.len()),
        Ok(_) => "scalar".to_string(),
        Err(e) => e.to_string(),
    }
}
