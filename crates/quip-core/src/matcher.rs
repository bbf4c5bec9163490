use crate::store::TriggerSet;

/// A trigger found at the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub trigger: &'a str,
    pub expansion: &'a str,
}

impl Match<'_> {
    /// Backspaces needed to erase the typed trigger
    pub fn delete_count(&self) -> usize {
        self.trigger.chars().count()
    }
}

/// Find the longest trigger the buffer ends with.
///
/// Triggers of equal length cannot both be suffixes of the same buffer, so
/// the order among them does not affect the result.
pub fn resolve<'a>(buffer: &str, triggers: &'a TriggerSet) -> Option<Match<'a>> {
    if buffer.is_empty() || triggers.is_empty() {
        return None;
    }

    triggers
        .by_length()
        .find(|(trigger, _)| buffer.ends_with(trigger))
        .map(|(trigger, expansion)| Match { trigger, expansion })
}
