//! crates/drift_core/src/store.rs
//!
//! The journal's persistence layer: entries, the user profile and the theme,
//! each stored as a JSON blob under a fixed key of a `KeyValueStore`.
//!
//! Reads never fail. A missing key, a store error or an unparsable blob all
//! read as "absent" and yield the empty or default value.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::domain::{EntryLog, JournalEntry, Theme, User};
use crate::ports::{KeyValueStore, PortError, PortResult};

pub const ENTRIES_KEY: &str = "ed_entries";
pub const USER_KEY: &str = "ed_user";
pub const THEME_KEY: &str = "ed_theme";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days between two instants, rounded up. Order does not matter.
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let millis = (a - b).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Persistence for a single local user. Single-writer; no locking is done here.
pub struct JournalStore<S> {
    kv: S,
}

impl<S: KeyValueStore> JournalStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Storage read failed; treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Stored value is not valid JSON; treating as absent");
                None
            }
        }
    }

    async fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) -> PortResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.kv.set(key, &raw).await
    }

    // --- Entries ---

    /// All entries, newest first. Empty when nothing is stored.
    pub async fn get_entries(&self) -> EntryLog {
        self.read_json(ENTRIES_KEY).await.unwrap_or_default()
    }

    /// Prepends `entry`, persists the collection, then updates the streak.
    /// Duplicate ids are not checked.
    pub async fn save_entry(&self, entry: JournalEntry) -> PortResult<()> {
        let mut entries = self.get_entries().await;
        entries.prepend(entry);
        self.write_json(ENTRIES_KEY, &entries).await?;
        self.update_streak().await
    }

    // --- User ---

    /// The stored profile, or a freshly persisted default one.
    pub async fn get_user(&self) -> PortResult<User> {
        if let Some(user) = self.read_json(USER_KEY).await {
            return Ok(user);
        }
        let user = User::default();
        self.save_user(&user).await?;
        Ok(user)
    }

    pub async fn save_user(&self, user: &User) -> PortResult<()> {
        self.write_json(USER_KEY, user).await
    }

    pub async fn update_streak(&self) -> PortResult<()> {
        self.update_streak_at(Utc::now()).await
    }

    /// Advances or resets the streak relative to the newest entry, as seen at `now`.
    /// A gap of at most one (rounded-up) day increments; anything longer resets to 1.
    pub async fn update_streak_at(&self, now: DateTime<Utc>) -> PortResult<()> {
        let entries = self.get_entries().await;
        let Some(newest) = entries.newest() else {
            return Ok(());
        };
        let mut user = self.get_user().await?;

        if days_between(now, newest.timestamp) <= 1 {
            user.streak += 1;
        } else {
            user.streak = 1;
        }
        user.last_entry_date = Some(newest.timestamp);
        self.save_user(&user).await
    }

    // --- Theme ---

    pub async fn get_theme(&self) -> Theme {
        match self.kv.get(THEME_KEY).await {
            Ok(Some(raw)) => Theme::parse(raw.trim()).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Theme read failed; using default");
                Theme::default()
            }
        }
    }

    pub async fn save_theme(&self, theme: Theme) -> PortResult<()> {
        self.kv.set(THEME_KEY, theme.as_str()).await
    }

    pub async fn toggle_theme(&self) -> PortResult<Theme> {
        let theme = self.get_theme().await.toggled();
        self.save_theme(theme).await?;
        Ok(theme)
    }

    // --- Purge ---

    /// Irreversibly deletes all entries and the user profile. The theme survives.
    pub async fn clear_data(&self) -> PortResult<()> {
        self.kv.remove(ENTRIES_KEY).await?;
        self.kv.remove(USER_KEY).await?;
        info!("Journal data cleared.");
        Ok(())
    }
}
