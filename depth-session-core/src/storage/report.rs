use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::error::SessionError;

/// Write a run report as pretty-printed JSON, creating parent directories.
pub fn write_report<T: Serialize>(report: &T, path: &Path) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| SessionError::Io(format!("failed to create directory: {}", e)))?;
        }
    }
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| SessionError::Io(format!("failed to serialize report: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| SessionError::Io(format!("failed to write report: {}", e)))?;
    Ok(())
}

/// Read a run report back from JSON.
pub fn read_report<T: DeserializeOwned>(path: &Path) -> Result<T, SessionError> {
    let json = fs::read_to_string(path)
        .map_err(|e| SessionError::Io(format!("failed to read report: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| SessionError::Io(format!("failed to parse report: {}", e)))
}
