use crate::error::{QuipError, Result};
use crate::models::{TriggerEntry, TriggerMap};
use parking_lot::RwLock;
use std::sync::Arc;

/// Immutable view of the triggers at one point in time.
///
/// Triggers are pre-sorted longest first so matching never has to sort on
/// the keystroke path.
#[derive(Debug, Default)]
pub struct TriggerSet {
    entries: TriggerMap,
    by_length: Vec<String>,
    longest: usize,
}

impl TriggerSet {
    pub fn from_map(mut entries: TriggerMap) -> Self {
        entries.retain(|trigger, expansion| {
            let keep = !trigger.is_empty() && !expansion.is_empty();
            if !keep {
                log::warn!("Dropping trigger entry with an empty side: {:?}", trigger);
            }
            keep
        });

        let mut by_length: Vec<String> = entries.keys().cloned().collect();
        by_length.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        let longest = by_length.first().map_or(0, |t| t.chars().count());

        Self {
            entries,
            by_length,
            longest,
        }
    }

    pub fn get(&self, trigger: &str) -> Option<&str> {
        self.entries.get(trigger).map(String::as_str)
    }

    /// Triggers with their expansions, longest trigger first
    pub fn by_length(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.by_length
            .iter()
            .filter_map(|t| self.entries.get_key_value(t))
            .map(|(t, e)| (t.as_str(), e.as_str()))
    }

    /// Length in characters of the longest trigger, 0 when empty
    pub fn longest(&self) -> usize {
        self.longest
    }

    pub fn entries(&self) -> &TriggerMap {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared, thread-safe trigger store.
///
/// Writers copy the current set, modify the copy and swap it in; readers
/// take an `Arc` to whichever set is current and never see a partial update.
#[derive(Debug, Clone, Default)]
pub struct TriggerStore {
    current: Arc<RwLock<Arc<TriggerSet>>>,
}

impl TriggerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: TriggerMap) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(TriggerSet::from_map(entries)))),
        }
    }

    pub fn snapshot(&self) -> Arc<TriggerSet> {
        Arc::clone(&self.current.read())
    }

    /// Insert or replace an entry. Returns the expansion it replaced.
    pub fn add(&self, entry: TriggerEntry) -> Option<String> {
        if !entry.is_reachable() {
            log::warn!(
                "Trigger '{}' contains uppercase characters and will never match typed input",
                entry.trigger
            );
        }

        let mut current = self.current.write();
        let mut entries = current.entries.clone();
        let previous = entries.insert(entry.trigger, entry.expansion);
        *current = Arc::new(TriggerSet::from_map(entries));
        previous
    }

    /// Remove a trigger, returning its expansion
    pub fn remove(&self, trigger: &str) -> Result<String> {
        let mut current = self.current.write();
        let mut entries = current.entries.clone();
        let removed = entries
            .shift_remove(trigger)
            .ok_or_else(|| QuipError::TriggerNotFound(trigger.to_string()))?;
        *current = Arc::new(TriggerSet::from_map(entries));
        Ok(removed)
    }

    /// All entries in insertion order
    pub fn list(&self) -> Vec<TriggerEntry> {
        self.snapshot()
            .entries()
            .iter()
            .map(|(trigger, expansion)| TriggerEntry {
                trigger: trigger.clone(),
                expansion: expansion.clone(),
            })
            .collect()
    }

    pub fn to_map(&self) -> TriggerMap {
        self.snapshot().entries().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
