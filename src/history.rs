use anyhow::{Context, Result};
use serde_json::Value;

use crate::content::Checklist;
use crate::data::{new_entry_id, now_timestamp, AnalysisEntry, SkillConfidenceMap};
use crate::storage::KeyValueStore;
use crate::validator::{validate_analysis_entry, validate_and_clean_history};

/// Slot holding the JSON array of entries, newest first.
pub const HISTORY_KEY: &str = "placement_readiness_history";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryListing {
    pub entries: Vec<AnalysisEntry>,
    pub corrupted_count: usize,
    /// Set when the whole slot could not be parsed
    pub load_error: Option<String>,
}

/// Fields `update` may change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub final_score: Option<i32>,
    pub skill_confidence_map: Option<SkillConfidenceMap>,
    pub checklist: Option<Checklist>,
}

impl EntryPatch {
    fn apply(self, entry: &mut AnalysisEntry) {
        if let Some(company) = self.company {
            entry.company = company;
        }
        if let Some(role) = self.role {
            entry.role = role;
        }
        if let Some(final_score) = self.final_score {
            entry.final_score = final_score;
        }
        if let Some(map) = self.skill_confidence_map {
            entry.skill_confidence_map = map;
        }
        if let Some(checklist) = self.checklist {
            entry.checklist = checklist;
        }
    }
}

/// Give stored objects without an `id` (or `createdAt`) a fixed one, so the
/// entry reads back the same way every time. Returns how many were changed.
fn stamp_missing_identity(values: &mut [Value]) -> usize {
    let mut stamped = 0;
    for value in values.iter_mut() {
        let Value::Object(map) = value else {
            continue;
        };
        let mut changed = false;
        if map.get("id").map_or(true, Value::is_null) {
            map.insert("id".to_string(), Value::String(new_entry_id()));
            changed = true;
        }
        if map.get("createdAt").map_or(true, Value::is_null) {
            map.insert("createdAt".to_string(), Value::String(now_timestamp()));
            changed = true;
        }
        if changed {
            stamped += 1;
        }
    }
    stamped
}

/// Analysis history persisted in a single key-value slot.
pub struct HistoryStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All readable entries. Corrupted entries are counted and skipped; an
    /// unparseable slot yields an empty listing with `load_error` set.
    pub fn list(&self) -> Result<HistoryListing> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(HistoryListing::default());
        };

        let mut values = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(values)) => values,
            Ok(_) => {
                tracing::error!(key = HISTORY_KEY, "History slot is not a JSON array");
                return Ok(Self::failed_listing("history is not a list".to_string()));
            }
            Err(e) => {
                tracing::error!(key = HISTORY_KEY, error = %e, "Failed to parse history slot");
                return Ok(Self::failed_listing(e.to_string()));
            }
        };

        let stamped = stamp_missing_identity(&mut values);
        if stamped > 0 {
            let json = serde_json::to_string_pretty(&values).context("Failed to encode history")?;
            self.store.set(HISTORY_KEY, &json)?;
            tracing::info!(stamped, "Assigned ids to stored entries that had none");
        }

        let cleaned = validate_and_clean_history(&values);
        if cleaned.invalid > 0 {
            tracing::warn!(
                corrupted = cleaned.invalid,
                "Some history entries could not be loaded"
            );
        }

        Ok(HistoryListing {
            entries: cleaned.valid,
            corrupted_count: cleaned.invalid,
            load_error: None,
        })
    }

    fn failed_listing(message: String) -> HistoryListing {
        HistoryListing {
            load_error: Some(message),
            ..HistoryListing::default()
        }
    }

    fn save(&self, entries: &[AnalysisEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).context("Failed to encode history")?;
        self.store.set(HISTORY_KEY, &json)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<AnalysisEntry>> {
        Ok(self.list()?.entries.into_iter().find(|e| e.id == id))
    }

    /// Prepend an entry. A colliding id is replaced with a fresh one.
    pub fn create(&self, mut entry: AnalysisEntry) -> Result<AnalysisEntry> {
        let mut entries = self.list()?.entries;

        if entries.iter().any(|e| e.id == entry.id) {
            let fresh = new_entry_id();
            tracing::warn!(old_id = %entry.id, new_id = %fresh, "Entry id collision, reassigning");
            entry.id = fresh;
        }

        entries.insert(0, entry.clone());
        self.save(&entries)?;

        tracing::info!(id = %entry.id, company = %entry.company, "Analysis saved");
        Ok(entry)
    }

    /// Merge the patch into an entry and refresh `updatedAt`. `None` when no
    /// entry has the id.
    pub fn update(&self, id: &str, patch: EntryPatch) -> Result<Option<AnalysisEntry>> {
        let mut entries = self.list()?.entries;

        let Some(entry) = entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };

        patch.apply(entry);
        entry.touch();

        let report = validate_analysis_entry(entry);
        if !report.is_valid {
            anyhow::bail!("Update rejected for {}: {}", id, report.errors.join("; "));
        }

        let updated = entry.clone();
        self.save(&entries)?;

        tracing::info!(id = %id, final_score = updated.final_score, "Analysis updated");
        Ok(Some(updated))
    }

    /// Returns false when nothing was removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut entries = self.list()?.entries;
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == before {
            return Ok(false);
        }

        self.save(&entries)?;
        tracing::info!(id = %id, "Analysis deleted");
        Ok(true)
    }

    /// Remove the whole slot. Returns false when there was no history.
    pub fn clear(&self) -> Result<bool> {
        let removed = self.store.delete(HISTORY_KEY)?;
        tracing::info!(removed, "History cleared");
        Ok(removed)
    }
}
