//! The RSVP ledger
//!
//! An ordered sequence of [`RsvpRecord`]s, unique by id, persisted as a
//! pretty-printed JSON array and rewritten whole on every change.

use crate::error::{RsvpError, StorageError};
use crate::model::RsvpRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: Vec<RsvpRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the stored JSON form
    pub fn from_json(bytes: &[u8]) -> Result<Self, StorageError> {
        let records: Vec<RsvpRecord> = serde_json::from_slice(bytes)?;
        Ok(Self { records })
    }

    /// Encode as a pretty-printed JSON array
    pub fn to_json(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec_pretty(&self.records)?)
    }

    pub fn records(&self) -> &[RsvpRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RsvpRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RsvpRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// First record for the same (case-folded names, phone) pair
    pub fn find_duplicate(&self, names: &str, phone: &str) -> Option<&RsvpRecord> {
        self.records.iter().find(|r| r.same_party(names, phone))
    }

    /// Append a record; ids are never reused.
    pub fn push(&mut self, record: RsvpRecord) -> Result<(), RsvpError> {
        if self.get(&record.id).is_some() {
            return Err(RsvpError::AlreadyExists(format!("RSVP '{}'", record.id)));
        }
        self.records.push(record);
        Ok(())
    }

    /// Remove the first record with `id`
    pub fn remove(&mut self, id: &str) -> Result<RsvpRecord, RsvpError> {
        match self.records.iter().position(|r| r.id == id) {
            Some(index) => Ok(self.records.remove(index)),
            None => Err(RsvpError::NotFound(format!("RSVP '{id}'"))),
        }
    }
}

impl From<Vec<RsvpRecord>> for Ledger {
    fn from(records: Vec<RsvpRecord>) -> Self {
        Self { records }
    }
}
