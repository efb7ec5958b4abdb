use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;

use crate::job::{JobKey, JobRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("job key {0} is already in the collection")]
    DuplicateKey(JobKey),
}

/// Ordered, keyed set of jobs. Insertion order is display and export order.
///
/// Storage is copy-on-write: a [`Snapshot`] taken before a mutation keeps
/// seeing the records exactly as they were.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobCollection {
    records: Arc<Vec<JobRecord>>,
}

impl JobCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: JobKey) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: JobKey) -> Option<&JobRecord> {
        self.records.iter().find(|record| record.key() == key)
    }

    pub fn add(&mut self, record: JobRecord) -> Result<(), CollectionError> {
        if self.contains(record.key()) {
            return Err(CollectionError::DuplicateKey(record.key()));
        }
        Arc::make_mut(&mut self.records).push(record);
        Ok(())
    }

    /// Removes `key` if present. Unknown keys are a no-op.
    pub fn remove(&mut self, key: JobKey) -> Option<JobRecord> {
        let index = self.position(key)?;
        Some(Arc::make_mut(&mut self.records).remove(index))
    }

    pub fn clear(&mut self) {
        // Dropping our handle leaves outstanding snapshots intact.
        self.records = Arc::new(Vec::new());
    }

    /// Applies `patch` to the record for `key`. Returns false if absent.
    pub fn update<F>(&mut self, key: JobKey, patch: F) -> bool
    where
        F: FnOnce(&mut JobRecord),
    {
        match self.position(key) {
            Some(index) => {
                patch(&mut Arc::make_mut(&mut self.records)[index]);
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> Vec<JobKey> {
        self.records.iter().map(JobRecord::key).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobRecord> {
        self.records.iter()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: Arc::clone(&self.records),
        }
    }

    fn position(&self, key: JobKey) -> Option<usize> {
        self.records.iter().position(|record| record.key() == key)
    }
}

impl<'a> IntoIterator for &'a JobCollection {
    type Item = &'a JobRecord;
    type IntoIter = std::slice::Iter<'a, JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Point-in-time, immutable view of a [`JobCollection`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    records: Arc<Vec<JobRecord>>,
}

impl Snapshot {
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }
}

impl Deref for Snapshot {
    type Target = [JobRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl From<Vec<JobRecord>> for Snapshot {
    fn from(records: Vec<JobRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}
