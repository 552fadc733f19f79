use std::collections::HashMap;

use crate::errors::MappingError;

/// Insertion-ordered string table with O(1) lookups in both directions.
///
/// Backs the `sources` and `names` arrays: indices are dense, zero-based and handed
/// out in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    values: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a serialized array, keeping every position.
    ///
    /// Repeated entries keep their slot so that indices already written into a
    /// mappings string stay valid; lookups resolve to the first occurrence.
    pub fn from_values(values: Vec<String>) -> Self {
        let mut lookup = HashMap::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            lookup.entry(value.clone()).or_insert(index as u32);
        }
        Self { values, lookup }
    }

    /// Index of `value`, assigning the next free index if it has not been seen.
    pub fn to_index(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.lookup.get(value) {
            return index;
        }
        let index = self.values.len() as u32;
        self.values.push(value.to_string());
        self.lookup.insert(value.to_string(), index);
        index
    }

    /// Index of `value` without inserting it.
    pub fn get_index(&self, value: &str) -> Option<u32> {
        self.lookup.get(value).copied()
    }

    pub fn from_index(&self, index: u32) -> Result<&str, MappingError> {
        self.values
            .get(index as usize)
            .map(String::as_str)
            .ok_or(MappingError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (index as u32, value.as_str()))
    }
}
