use crate::day_key::DayKey;
use std::collections::BTreeSet;
use tracing::warn;

/// Days on which any intake was logged before rollover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedDaySet {
    days: BTreeSet<DayKey>,
}

impl CompletedDaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from persisted strings, skipping entries that are not day keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days = BTreeSet::new();
        for raw in keys {
            match raw.as_ref().parse::<DayKey>() {
                Ok(key) => {
                    days.insert(key);
                }
                Err(err) => warn!("skipping persisted completed day: {err}"),
            }
        }
        Self { days }
    }

    /// Persisted form, oldest first.
    pub fn to_keys(&self) -> Vec<String> {
        self.days.iter().map(ToString::to_string).collect()
    }

    pub fn contains(&self, key: DayKey) -> bool {
        self.days.contains(&key)
    }

    /// Returns `true` if the key was not already present.
    pub fn insert(&mut self, key: DayKey) -> bool {
        self.days.insert(key)
    }

    /// Returns `true` if anything was removed.
    pub fn reset_all(&mut self) -> bool {
        let had_any = !self.days.is_empty();
        self.days.clear();
        had_any
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
