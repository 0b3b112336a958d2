//! Path utilities for on-disk state.

use std::fs;
use std::path::PathBuf;

use agproxy_types::AccountError;

/// Directory name under the platform config dir.
pub const DATA_DIR: &str = "antigravity-proxy";
/// Filename for the event log snapshot.
pub const EVENTS_FILE: &str = "events.json";
/// Filename for the account pool.
pub const ACCOUNTS_FILE: &str = "accounts.json";
/// Filename for the config object.
pub const CONFIG_FILE: &str = "config.json";

/// Resolve the data directory, creating it when missing.
///
/// Priority:
/// 1. `AGPROXY_DATA_DIR` environment variable (container deployments)
/// 2. `~/.config/antigravity-proxy` (default)
pub fn resolve_data_dir() -> Result<PathBuf, AccountError> {
    let data_dir = if let Ok(custom_dir) = std::env::var("AGPROXY_DATA_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let config_dir = dirs::config_dir().ok_or_else(|| AccountError::StorageError {
            message: "Cannot resolve user config directory".to_string(),
        })?;
        config_dir.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).map_err(|e| AccountError::StorageError {
            message: format!("Failed to create data directory: {e}"),
        })?;
    }

    Ok(data_dir)
}

/// Write `content` to `path` atomically via a sibling temp file.
pub(crate) fn atomic_write(path: &std::path::Path, content: &str) -> Result<(), String> {
    let temp_path = path.with_extension("json.tmp");

    if let Err(e) = fs::write(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(format!("Failed to write temp file: {e}"));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        format!("Failed to replace {}: {e}", path.display())
    })
}
