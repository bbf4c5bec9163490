use crate::error::{QuipError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Trigger to expansion mapping, kept in insertion order.
pub type TriggerMap = IndexMap<String, String>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TriggerEntry {
    pub trigger: String,
    pub expansion: String,
}

impl TriggerEntry {
    /// Build a validated entry. Both sides must be non-empty.
    pub fn new(trigger: impl Into<String>, expansion: impl Into<String>) -> Result<Self> {
        let trigger = trigger.into();
        let expansion = expansion.into();

        if trigger.is_empty() {
            return Err(QuipError::EmptyTrigger);
        }
        if expansion.is_empty() {
            return Err(QuipError::EmptyExpansion);
        }

        Ok(Self { trigger, expansion })
    }

    /// Number of keystrokes needed to erase the typed trigger
    pub fn trigger_len(&self) -> usize {
        self.trigger.chars().count()
    }

    /// Typed input is lowercased before matching, so a trigger that changes
    /// under lowercasing can never fire.
    pub fn is_reachable(&self) -> bool {
        self.trigger.to_lowercase() == self.trigger
    }

    /// First `width` characters of the expansion, with `...` if truncated
    pub fn preview(&self, width: usize) -> String {
        let mut chars = self.expansion.chars();
        let head: String = chars.by_ref().take(width).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_sides() {
        assert!(matches!(
            TriggerEntry::new("", "text"),
            Err(QuipError::EmptyTrigger)
        ));
        assert!(matches!(
            TriggerEntry::new("sig", ""),
            Err(QuipError::EmptyExpansion)
        ));
    }

    #[test]
    fn trigger_len_counts_characters() {
        let entry = TriggerEntry::new("çé", "accents").unwrap();
        assert_eq!(entry.trigger_len(), 2);
    }

    #[test]
    fn uppercase_trigger_is_unreachable() {
        assert!(TriggerEntry::new("sig", "x").unwrap().is_reachable());
        assert!(!TriggerEntry::new("Sig", "x").unwrap().is_reachable());
    }

    #[test]
    fn preview_truncates_long_expansions() {
        let entry = TriggerEntry::new("sig", "Best regards, A.").unwrap();
        assert_eq!(entry.preview(30), "Best regards, A.");
        assert_eq!(entry.preview(4), "Best...");

        let wide = TriggerEntry::new("jp", "こんにちは世界").unwrap();
        assert_eq!(wide.preview(5), "こんにちは...");
    }
}
