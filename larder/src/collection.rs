use log::debug;
use serde::Serialize;

use crate::{Map, Record, RecordKind};

/// A collection is an ordered group of records of the same kind.
///
/// It is analogous to the result of a single query against a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Collection {
    #[serde(skip)]
    kind: RecordKind,
    records: Vec<Record>,
}

impl Collection {
    /// Constructor. Records are kept in the order given.
    pub fn new(kind: RecordKind, records: Vec<Record>) -> Self {
        Self { kind, records }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

/// Maps a style ID to the items that reference it, in collection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupingIndex(Map<i64, Vec<Record>>);

impl GroupingIndex {
    /// Groups the given items by their kind's grouping key. Items without a
    /// key are left out of the index.
    pub fn from_items(items: &Collection) -> Self {
        let mut index = Map::<i64, Vec<Record>>::new();
        let key = match items.kind().group_key() {
            Some(k) => k,
            None => return Self(index),
        };
        let mut ungrouped = 0_usize;
        for item in items.iter() {
            match item.integer(key) {
                Some(id) => index.entry(id).or_default().push(item.clone()),
                None => ungrouped += 1,
            }
        }
        if ungrouped > 0 {
            debug!(
                "{} {} record(s) have no {} and were left ungrouped",
                ungrouped,
                items.kind(),
                key
            );
        }
        Self(index)
    }

    /// Inserts an empty group for every record in `owners` that does not have
    /// one yet, so that every owner can be looked up.
    pub fn ensure_keys(&mut self, owners: &Collection) {
        for id in owners.iter().filter_map(Record::id) {
            self.0.entry(id).or_default();
        }
    }

    /// Items grouped under the given key. Keys with no entry yield an empty
    /// slice.
    pub fn get(&self, key: i64) -> &[Record] {
        self.0.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.0.contains_key(&key)
    }

    /// The total number of grouped items.
    pub fn item_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn insert(&mut self, key: i64, items: Vec<Record>) -> Option<Vec<Record>> {
        self.0.insert(key, items)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn wine(id: i64, style_id: Option<i64>) -> Record {
        let r = Record::default().with("id", id).with("title", format!("w{}", id));
        match style_id {
            Some(s) => r.with("style_id", s),
            None => r,
        }
    }

    #[test]
    fn groups_by_style_and_skips_unassigned() {
        let wines = Collection::new(
            RecordKind::Wine,
            vec![wine(1, Some(2)), wine(2, None), wine(3, Some(2)), wine(4, Some(5))],
        );
        let index = GroupingIndex::from_items(&wines);
        let ids = index.get(2).iter().filter_map(Record::id).collect::<Vec<i64>>();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(index.get(5).len(), 1);
        assert_eq!(index.item_count(), 3);
        // Ungrouped items still belong to the source collection.
        assert_eq!(wines.len(), 4);
    }

    #[test]
    fn ensure_keys_adds_empty_groups() {
        let styles = Collection::new(
            RecordKind::WineStyle,
            vec![Record::default().with("id", 1), Record::default().with("id", 2)],
        );
        let mut index = GroupingIndex::default();
        index.insert(1, vec![wine(9, Some(1))]);
        index.ensure_keys(&styles);
        assert!(index.contains_key(2));
        assert!(index.get(2).is_empty());
        assert_eq!(index.get(1).len(), 1);
    }
}
