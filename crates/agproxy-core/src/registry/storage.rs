//! Account file storage operations.

use std::path::Path;

use agproxy_types::Account;

use crate::paths::atomic_write;

/// Load the account array; missing file means an empty pool.
pub(super) fn load_accounts(path: &Path) -> Vec<Account> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::error!("Failed to read account file {}: {e}", path.display());
            return Vec::new();
        },
    };

    match serde_json::from_str(&content) {
        Ok(accounts) => accounts,
        Err(e) => {
            tracing::error!(
                "Corrupt account file {}, starting with an empty pool: {e}",
                path.display()
            );
            Vec::new()
        },
    }
}

/// Save the account array atomically.
pub(super) fn save_accounts(path: &Path, accounts: &[Account]) -> Result<(), String> {
    let content = serde_json::to_string_pretty(accounts)
        .map_err(|e| format!("Failed to serialize accounts: {e}"))?;
    atomic_write(path, &content)
}
