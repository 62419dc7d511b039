//! Credential store.
//!
//! Accounts are `loginId -> password` pairs. An unseen id is registered on
//! its first `#login`; a known id is accepted when the password matches
//! case-insensitively. Accounts are never removed at runtime.
//!
//! # File format
//!
//! One `loginId:password` per line, split at the first `:`. The file is
//! read once at startup and rewritten at shutdown.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::StoreError;

/// Outcome of [`AccountManager::authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The id was unseen and has been registered with this password.
    Registered,
    /// The id exists and the password matches.
    Accepted,
    /// The id exists and the password does not match.
    Rejected,
}

/// Whether `login_id` can be stored in the credential file.
pub fn is_valid_login_id(login_id: &str) -> bool {
    !login_id.is_empty() && !login_id.contains(':')
}

fn passwords_match(stored: &str, given: &str) -> bool {
    stored
        .chars()
        .flat_map(char::to_lowercase)
        .eq(given.chars().flat_map(char::to_lowercase))
}

/// Credential store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct AccountManager {
    accounts: DashMap<String, String>,
}

impl AccountManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a login, registering the id if it has never been seen.
    ///
    /// Registration happens under the shard lock for `login_id`, so two
    /// concurrent first logins register exactly one password.
    pub fn authenticate(&self, login_id: &str, password: &str) -> AuthOutcome {
        match self.accounts.entry(login_id.to_owned()) {
            Entry::Occupied(entry) => {
                if passwords_match(entry.get(), password) {
                    AuthOutcome::Accepted
                } else {
                    AuthOutcome::Rejected
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(password.to_owned());
                AuthOutcome::Registered
            }
        }
    }

    pub fn contains(&self, login_id: &str) -> bool {
        self.accounts.contains_key(login_id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Load the credential file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let store = Self::new();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No credential file, starting empty");
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((login_id, password)) if is_valid_login_id(login_id) => {
                    store
                        .accounts
                        .insert(login_id.to_owned(), password.to_owned());
                }
                _ => {
                    warn!(path = %path.display(), line = lineno + 1, "Skipping malformed credential line");
                }
            }
        }

        info!(path = %path.display(), accounts = store.len(), "Loaded credential file");
        Ok(store)
    }

    /// Write every account, sorted by login id, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let mut entries: Vec<(String, String)> = self
            .accounts
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut content = String::new();
        for (login_id, password) in &entries {
            content.push_str(login_id);
            content.push(':');
            content.push_str(password);
            content.push('\n');
        }

        let tmp = tmp_path(path);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;

        info!(path = %path.display(), accounts = entries.len(), "Saved credential file");
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
