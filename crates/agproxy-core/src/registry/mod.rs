//! The account pool.
//!
//! Accounts are keyed by email in a [`DashMap`], giving O(1) lookup and
//! single-writer semantics per account through the shard lock. Cross-account
//! operations work on snapshots and never hold two entries at once.

mod storage;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use agproxy_types::{Account, AccountError};

use crate::events::EventStore;
use crate::paths::ACCOUNTS_FILE;

pub struct AccountRegistry {
    accounts: DashMap<String, Account>,
    accounts_path: PathBuf,
    events: Arc<EventStore>,
    dirty: AtomicBool,
}

impl AccountRegistry {
    /// Load the pool from `data_dir`. A corrupt credential file is logged
    /// and yields an empty pool; the file is left untouched for inspection.
    pub fn new(data_dir: impl Into<PathBuf>, events: Arc<EventStore>) -> Self {
        let accounts_path = data_dir.into().join(ACCOUNTS_FILE);
        let accounts = DashMap::new();

        for account in storage::load_accounts(&accounts_path) {
            accounts.insert(account.email.clone(), account);
        }

        Self { accounts, accounts_path, events, dirty: AtomicBool::new(false) }
    }

    /// All accounts, sorted by email for stable output.
    pub fn list(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> =
            self.accounts.iter().map(|e| e.value().clone()).collect();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        accounts
    }

    pub fn get(&self, email: &str) -> Option<Account> {
        self.accounts.get(email).map(|e| e.value().clone())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.accounts.contains_key(email)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Register a new account and persist the pool.
    pub fn add(&self, account: Account) -> Result<(), AccountError> {
        let email = account.email.clone();
        match self.accounts.entry(email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(AccountError::AlreadyExists { email });
            },
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(account);
            },
        }

        self.persist();
        self.events.record_system(
            format!("Account {email} added to the pool"),
            serde_json::json!({ "account": email }),
        );
        Ok(())
    }

    /// Drop an account; all its health records go with it.
    pub fn remove(&self, email: &str) -> Result<Account, AccountError> {
        let (_, account) = self
            .accounts
            .remove(email)
            .ok_or_else(|| AccountError::NotFound { email: email.to_string() })?;

        self.persist();
        self.events.record_system(
            format!("Account {email} removed from the pool"),
            serde_json::json!({ "account": email }),
        );
        Ok(account)
    }

    /// Flip the router-facing enabled flag.
    pub fn set_enabled(&self, email: &str, enabled: bool) -> Result<Account, AccountError> {
        let account = {
            let mut entry = self
                .accounts
                .get_mut(email)
                .ok_or_else(|| AccountError::NotFound { email: email.to_string() })?;
            entry.enabled = enabled;
            entry.clone()
        };

        self.persist();
        let state = if enabled { "enabled" } else { "disabled" };
        self.events.record_system(
            format!("Account {email} {state} by operator"),
            serde_json::json!({ "account": email, "enabled": enabled }),
        );
        Ok(account)
    }

    /// Reread the credential file, replacing the in-memory pool.
    pub fn reload(&self) -> usize {
        let loaded = storage::load_accounts(&self.accounts_path);
        let count = loaded.len();

        self.accounts.clear();
        for account in loaded {
            self.accounts.insert(account.email.clone(), account);
        }

        self.dirty.store(false, Ordering::Release);
        self.events.record_system(
            format!("Account pool reloaded ({count} accounts)"),
            serde_json::json!({ "count": count }),
        );
        count
    }

    /// Run `f` against one account under its entry lock.
    ///
    /// This is the single mutation path for health records; the entry guard
    /// serializes concurrent writers of the same account.
    pub fn with_account_mut<R>(
        &self,
        email: &str,
        f: impl FnOnce(&mut Account) -> R,
    ) -> Option<R> {
        let result = {
            let mut entry = self.accounts.get_mut(email)?;
            f(entry.value_mut())
        };
        self.dirty.store(true, Ordering::Release);
        Some(result)
    }

    /// Every model id that has a health record on any account.
    pub fn tracked_model_ids(&self) -> Vec<String> {
        let mut models = BTreeSet::new();
        for entry in self.accounts.iter() {
            for model in entry.value().health.keys() {
                models.insert(model.clone());
            }
        }
        models.into_iter().collect()
    }

    /// Flush health-record mutations accumulated since the last snapshot.
    pub fn save_if_dirty(&self) -> bool {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.persist_inner()
    }

    /// Best-effort persist; in-memory state stays authoritative on failure.
    fn persist(&self) {
        self.dirty.store(false, Ordering::Release);
        self.persist_inner();
    }

    fn persist_inner(&self) -> bool {
        if let Err(e) = storage::save_accounts(&self.accounts_path, &self.list()) {
            tracing::error!("Failed to persist account pool: {e}");
            self.dirty.store(true, Ordering::Release);
            return false;
        }
        true
    }
}
