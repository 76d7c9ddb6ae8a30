//! Endpoint and data-directory configuration.

use std::path::PathBuf;

/// Base URL of the question service.
///
/// Priority:
/// 1. QUICKDRILL_SERVER_URL env variable if set
/// 2. http://127.0.0.1:8000 as fallback
pub fn server_url() -> String {
    std::env::var("QUICKDRILL_SERVER_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
}

/// Directory holding the performance history.
///
/// Priority:
/// 1. QUICKDRILL_DATA_DIR env variable if set
/// 2. the platform data directory, under "quickdrill"
/// 3. ./data as fallback
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("QUICKDRILL_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = dirs::data_dir() {
        return dir.join("quickdrill");
    }
    PathBuf::from("./data")
}

pub fn history_path() -> PathBuf {
    data_dir().join("history.json")
}
