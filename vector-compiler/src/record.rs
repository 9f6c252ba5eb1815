// vector-compiler/src/record.rs
// Per-test records and the ordered set they are collected in

use std::collections::HashMap;
use std::rc::Rc;

use crate::registers::RegisterContext;

/// One test routine found in a compiled unit.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub name: String,
    /// Whole flattened image of the unit, shared by all of its tests.
    pub binary: Rc<[u8]>,
    /// Entry point of the routine within `binary`.
    pub offset: u64,
    /// Registers loaded before the routine runs.
    pub input: RegisterContext,
    /// Registers expected once it returns.
    pub output: RegisterContext,
}

impl TestRecord {
    pub fn new(name: impl Into<String>, binary: Rc<[u8]>, offset: u64) -> Self {
        Self {
            name: name.into(),
            binary,
            offset,
            input: RegisterContext::default(),
            output: RegisterContext::default(),
        }
    }
}

/// Tests of one unit in symbol table order, addressable by name.
#[derive(Debug, Default)]
pub struct TestSet {
    records: Vec<TestRecord>,
    index: HashMap<String, usize>,
}

impl TestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, handing it back if the name is already taken.
    pub fn insert(&mut self, record: TestRecord) -> Result<(), TestRecord> {
        if self.index.contains_key(&record.name) {
            return Err(record);
        }
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TestRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TestRecord> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.records[i]),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestRecord> {
        self.records.iter()
    }
}

impl IntoIterator for TestSet {
    type Item = TestRecord;
    type IntoIter = std::vec::IntoIter<TestRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_rejects_duplicates() {
        let image: Rc<[u8]> = Rc::from(vec![0u8; 8]);
        let mut set = TestSet::new();
        set.insert(TestRecord::new("test_b", image.clone(), 4)).unwrap();
        set.insert(TestRecord::new("test_a", image.clone(), 0)).unwrap();

        let dup = set.insert(TestRecord::new("test_b", image, 2)).unwrap_err();
        assert_eq!(dup.offset, 2);

        let names: Vec<_> = set.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["test_b", "test_a"]);
        assert_eq!(set.get("test_b").map(|t| t.offset), Some(4));
        assert!(set.get_mut("test_c").is_none());
    }
}
