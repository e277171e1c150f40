//! Observation store: per-kind memory of what has already been announced.
//!
//! One JSON object per kind, keyed by entity id. Each entry records when
//! the id was last seen and how many places it had then. `should_notify`
//! must be asked before `update` for the same id in a cycle, otherwise
//! every sighting compares against itself and nothing is ever announced.

use chrono::{DateTime, Months, Utc};
use courtwatch_core::error::{CourtWatchError, Result};
use courtwatch_core::traits::{Clock, SystemClock};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Entries not seen for this many calendar months are dropped on save.
pub const RETENTION_MONTHS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(alias = "lastSeenAt")]
    pub last_seen: DateTime<Utc>,
    #[serde(alias = "availableSlots", deserialize_with = "non_negative")]
    pub available_places: u32,
}

/// Older state files could hold negative counts for overbooked classes.
fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    let value = i64::deserialize(deserializer)?;
    Ok(value.clamp(0, i64::from(u32::MAX)) as u32)
}

pub struct ObservationStore {
    entries: BTreeMap<String, Observation>,
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl ObservationStore {
    /// An empty store that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: BTreeMap::new(),
            path: path.into(),
            clock: Box::new(SystemClock),
        }
    }

    /// Load the store at `path`. A missing file yields an empty store; an
    /// unreadable or malformed one is an error, since starting empty would
    /// re-announce everything.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::new(path);
        let content = match std::fs::read_to_string(&store.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %store.path.display(), "No state file yet, starting empty");
                return Ok(store);
            }
            Err(e) => {
                return Err(CourtWatchError::state(format!(
                    "reading {}: {e}",
                    store.path.display()
                )));
            }
        };

        store.entries = serde_json::from_str(&content).map_err(|e| {
            CourtWatchError::state(format!("corrupt state file {}: {e}", store.path.display()))
        })?;
        tracing::debug!(path = %store.path.display(), entries = store.entries.len(), "State loaded");
        Ok(store)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True for an id never seen before, or one whose places went up since
    /// the last recorded sighting.
    pub fn should_notify(&self, id: &str, available: u32) -> bool {
        match self.entries.get(id) {
            None => true,
            Some(prev) => available > prev.available_places,
        }
    }

    /// Record a sighting now, overwriting any previous entry for `id`.
    pub fn update(&mut self, id: &str, available: u32) {
        let observation = Observation {
            last_seen: self.clock.now(),
            available_places: available,
        };
        self.entries.insert(id.to_string(), observation);
    }

    pub fn get(&self, id: &str) -> Option<&Observation> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Observation)> {
        self.entries.iter().map(|(id, obs)| (id.as_str(), obs))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries last seen before the retention cutoff. Returns how many
    /// were removed.
    pub fn prune(&mut self) -> usize {
        let now = self.clock.now();
        let cutoff = now
            .checked_sub_months(Months::new(RETENTION_MONTHS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let before = self.entries.len();
        self.entries.retain(|_, obs| obs.last_seen >= cutoff);
        before - self.entries.len()
    }

    /// Prune, then atomically replace the file on disk. A crash mid-save
    /// leaves the previous file intact.
    pub fn save(&mut self) -> Result<()> {
        let evicted = self.prune();
        let json = serde_json::to_vec_pretty(&self.entries)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| CourtWatchError::state(format!("creating {}: {e}", dir.display())))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| CourtWatchError::state(format!("creating temp file in {}: {e}", dir.display())))?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| CourtWatchError::state(format!("writing {}: {e}", self.path.display())))?;
        tmp.persist(&self.path)
            .map_err(|e| CourtWatchError::state(format!("replacing {}: {e}", self.path.display())))?;

        tracing::info!(
            path = %self.path.display(),
            entries = self.entries.len(),
            evicted,
            "State saved"
        );
        Ok(())
    }
}

impl std::fmt::Debug for ObservationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationStore")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish()
    }
}
