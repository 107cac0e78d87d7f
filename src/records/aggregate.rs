use std::collections::{HashMap, hash_map::Entry};

use super::identity::IdentityKey;
use super::store::ParsedRecord;

/// The newest record for each identity key.
///
/// Recency is a plain string comparison of effective timestamps, which is only
/// meaningful for zero-padded `YYYY-MM-DD_HH:MM:SS` style values. When two
/// records for a key carry the same timestamp, the one inserted last wins.
#[derive(Debug, Default, Clone)]
pub struct AggregatedView {
    current: HashMap<String, (IdentityKey, ParsedRecord)>,
}

impl AggregatedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a record; it replaces the stored one unless that one is strictly newer.
    pub fn insert(&mut self, key: IdentityKey, record: ParsedRecord) {
        match self.current.entry(key.as_str().to_string()) {
            Entry::Occupied(mut slot) => {
                if slot.get().1.effective_timestamp() <= record.effective_timestamp() {
                    slot.insert((key, record));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert((key, record));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ParsedRecord> {
        self.current.get(key).map(|(_, record)| record)
    }

    /// Consume the view, ordered by key string.
    pub fn into_sorted(self) -> Vec<(IdentityKey, ParsedRecord)> {
        let mut entries: Vec<_> = self.current.into_values().collect();
        entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        entries
    }
}

impl FromIterator<(IdentityKey, ParsedRecord)> for AggregatedView {
    fn from_iter<I: IntoIterator<Item = (IdentityKey, ParsedRecord)>>(iter: I) -> Self {
        let mut view = Self::new();
        for (key, record) in iter {
            view.insert(key, record);
        }
        view
    }
}

/// Reduce keyed records to one current record per key.
pub fn aggregate(pairs: impl IntoIterator<Item = (IdentityKey, ParsedRecord)>) -> AggregatedView {
    pairs.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{IdentitySource, Probes};
    use serde_json::json;

    fn keyed(key: &str, name: &str, stamp: &str) -> (IdentityKey, ParsedRecord) {
        let record = ParsedRecord::new(
            name,
            json!({"Timestamp": stamp}),
            None,
            &Probes::default(),
        )
        .unwrap();
        (IdentityKey::new(key, IdentitySource::Owner), record)
    }

    #[test]
    fn keeps_newest_per_key() {
        let view = aggregate([
            keyed("a", "a-new.json", "2024-06-01_09:30:00"),
            keyed("a", "a-old.json", "2024-01-01_10:00:00"),
            keyed("b", "b.json", "2023-01-01_00:00:00"),
        ]);
        assert_eq!(view.len(), 2);
        assert_eq!(view.get("a").unwrap().source_filename(), "a-new.json");
        assert_eq!(view.get("b").unwrap().source_filename(), "b.json");
    }

    #[test]
    fn equal_timestamps_keep_last_seen() {
        let stamp = "2024-06-01_09:30:00";
        let view = aggregate([keyed("a", "first.json", stamp), keyed("a", "second.json", stamp)]);
        assert_eq!(view.get("a").unwrap().source_filename(), "second.json");

        let view = aggregate([keyed("a", "second.json", stamp), keyed("a", "first.json", stamp)]);
        assert_eq!(view.get("a").unwrap().source_filename(), "first.json");
    }

    #[test]
    fn comparison_is_lexicographic() {
        // Not zero padded, so "2024-6-..." sorts after "2024-12-...".
        let view = aggregate([
            keyed("a", "december.json", "2024-12-01_00:00:00"),
            keyed("a", "june.json", "2024-6-01_00:00:00"),
        ]);
        assert_eq!(view.get("a").unwrap().source_filename(), "june.json");
    }

    #[test]
    fn sorted_output_orders_by_key() {
        let keys: Vec<_> = aggregate([
            keyed("zeta", "z.json", "2024-01-01_00:00:00"),
            keyed("alpha", "a.json", "2024-01-01_00:00:00"),
            keyed("mid", "m.json", "2024-01-01_00:00:00"),
        ])
        .into_sorted()
        .into_iter()
        .map(|(key, _)| key.as_str().to_string())
        .collect();
        assert_eq!(keys, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn empty_input_is_empty_view() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
