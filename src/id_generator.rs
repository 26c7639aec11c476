//! Session-scoped node id generator.
//! Produces "dndnode_0", "dndnode_1", ... and never reissues an id within a session.

use log::warn;

pub const DEFAULT_PREFIX: &str = "dndnode_";

#[derive(Debug, Clone)]
pub struct IdGenerator {
    /// Prefix placed before the counter
    prefix: String,
    /// Counter for next ID
    counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }

    /// Generate the next ID, or `None` once the counter space is used up
    pub fn next_id(&mut self) -> Option<String> {
        let next = self.counter.checked_add(1)?;
        let id = format!("{}{}", self.prefix, self.counter);
        self.counter = next;
        Some(id)
    }

    /// Value the next call to `next_id` will use
    pub fn peek_counter(&self) -> u64 {
        self.counter
    }

    /// Start a new editing session from zero
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Resume after existing IDs so none of them is reissued.
    ///
    /// An id at the very top of the counter range cannot be advanced past; it is
    /// skipped, and `next_id` stops before ever reaching it.
    pub fn from_existing_ids<'a>(
        prefix: impl Into<String>,
        existing_ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut generator = Self::with_prefix(prefix);

        let max_counter = existing_ids
            .into_iter()
            .filter_map(|id| generator.decode(id))
            .filter_map(|counter| {
                let next = counter.checked_add(1);
                if next.is_none() {
                    warn!("Node id counter {} is out of range, skipping it", counter);
                }
                next
            })
            .max();

        if let Some(next) = max_counter {
            generator.counter = next;
        }
        generator
    }

    /// Decode an ID back to its counter value
    fn decode(&self, id: &str) -> Option<u64> {
        id.strip_prefix(self.prefix.as_str())?.parse().ok()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_generation() {
        let mut gen = IdGenerator::new();
        assert_eq!(gen.next_id().as_deref(), Some("dndnode_0"));
        assert_eq!(gen.next_id().as_deref(), Some("dndnode_1"));
        assert_eq!(gen.next_id().as_deref(), Some("dndnode_2"));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = IdGenerator::new();
        first.next_id();
        first.next_id();

        let mut second = IdGenerator::new();
        assert_eq!(second.next_id().as_deref(), Some("dndnode_0"));
    }

    #[test]
    fn test_reset() {
        let mut gen = IdGenerator::with_prefix("n");
        gen.next_id();
        gen.reset();
        assert_eq!(gen.peek_counter(), 0);
        assert_eq!(gen.next_id().as_deref(), Some("n0"));
    }

    #[test]
    fn test_from_existing() {
        let existing = ["dndnode_3", "dndnode_11", "custom", "dndnode_x"];

        let mut gen = IdGenerator::from_existing_ids(DEFAULT_PREFIX, existing);
        let next = gen.next_id().unwrap();

        assert_eq!(next, "dndnode_12");
        assert!(!existing.contains(&next.as_str()));
    }

    #[test]
    fn test_from_no_matching_ids() {
        let mut gen = IdGenerator::from_existing_ids(DEFAULT_PREFIX, ["a", "b"]);
        assert_eq!(gen.next_id().as_deref(), Some("dndnode_0"));
    }

    #[test]
    fn test_from_existing_skips_id_at_counter_limit() {
        let top = format!("dndnode_{}", u64::MAX);
        let existing = [top.as_str(), "dndnode_7"];

        let mut gen = IdGenerator::from_existing_ids(DEFAULT_PREFIX, existing);

        assert_eq!(gen.next_id().as_deref(), Some("dndnode_8"));
    }

    #[test]
    fn test_exhausted_counter_yields_none() {
        let below_top = format!("dndnode_{}", u64::MAX - 2);
        let mut gen = IdGenerator::from_existing_ids(DEFAULT_PREFIX, [below_top.as_str()]);

        assert_eq!(gen.next_id(), Some(format!("dndnode_{}", u64::MAX - 1)));
        assert_eq!(gen.next_id(), None);
        assert_eq!(gen.next_id(), None);
    }
}
