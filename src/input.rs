//! JSON input for the command line tool

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Read a JSON document from `path`, or from stdin when no path is given
pub fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> anyhow::Result<T> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_json(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
        }
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            parse_json(&content).context("Invalid JSON on stdin")
        }
    }
}

/// Parse JSON, treating blank input as an empty object
fn parse_json<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    let content = if content.trim().is_empty() {
        "{}"
    } else {
        content
    };
    Ok(serde_json::from_str(content)?)
}
