//! The data a template is rendered against.

use serde::Serialize;

use crate::{Collection, GroupingIndex, Map};

/// A read-only snapshot of named collections and named grouping indices.
///
/// Serializes as a single mapping, so that a template sees e.g. `styles` as a
/// list of records and `style_wines` as a mapping from style ID to a list of
/// records.
#[derive(Debug, Clone, Default)]
pub struct Context {
    collections: Map<String, Collection>,
    groups: Map<String, GroupingIndex>,
}

impl Context {
    /// Convenience method for adding a named collection.
    pub fn with_collection<N: AsRef<str>>(mut self, name: N, collection: Collection) -> Self {
        self.collections
            .insert(name.as_ref().to_string(), collection);
        self
    }

    /// Convenience method for adding a named grouping index.
    pub fn with_group<N: AsRef<str>>(mut self, name: N, group: GroupingIndex) -> Self {
        self.groups.insert(name.as_ref().to_string(), group);
        self
    }

    pub fn collection<N: AsRef<str>>(&self, name: N) -> Option<&Collection> {
        self.collections.get(name.as_ref())
    }

    pub fn group<N: AsRef<str>>(&self, name: N) -> Option<&GroupingIndex> {
        self.groups.get(name.as_ref())
    }
}

impl Serialize for Context {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut m = serializer.serialize_map(Some(self.collections.len() + self.groups.len()))?;
        for (name, collection) in &self.collections {
            m.serialize_entry(name, collection)?;
        }
        for (name, group) in &self.groups {
            m.serialize_entry(name, group)?;
        }
        m.end()
    }
}
