//! Test helpers for agproxy-server unit tests.

use tempfile::TempDir;

use agproxy_types::Account;

use crate::state::AppState;

/// Create a minimal `AppState` for testing.
///
/// Returns `(AppState, TempDir)` - keep `TempDir` alive for the test duration.
pub fn test_app_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let state = AppState::new(temp_dir.path().to_path_buf());
    (state, temp_dir)
}

/// Same, seeded with enabled accounts.
pub fn test_app_state_with_accounts(emails: &[&str]) -> (AppState, TempDir) {
    let (state, temp_dir) = test_app_state();
    for email in emails {
        state
            .registry()
            .add(Account::new(*email))
            .expect("failed to seed test account");
    }
    (state, temp_dir)
}
