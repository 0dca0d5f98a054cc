//! PBX directory
//!
//! In-memory copy of the PBX user table, fed by replication and read by the
//! event pipeline. A read-write lock guards the whole map: lookups share the
//! read lock, every mutation (including a full reload) happens under one write
//! lock, so readers never see a half-applied change.
//!
//! Each record remembers the replication source (the PBX connection) that
//! last wrote it, so one PBX can resync without touching the users learned
//! from another.

use parking_lot::RwLock;
use std::collections::HashMap;

use presence_core::{DomainError, DomainResult, SubscriberRecord};

#[derive(Debug, Default)]
struct Entries {
    records: HashMap<String, SubscriberRecord>,
    /// guid -> source that last wrote it
    sources: HashMap<String, String>,
}

/// Subscribers of the PBX, keyed by guid
#[derive(Debug, Default)]
pub struct PbxDirectory {
    entries: RwLock<Entries>,
}

impl PbxDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record stored under `guid`
    ///
    /// The guid keeps the source it already had, if any.
    pub fn upsert(&self, guid: impl Into<String>, record: SubscriberRecord) {
        self.entries.write().records.insert(guid.into(), record);
    }

    /// Insert or replace the record stored under `guid` on behalf of `source`
    pub fn upsert_from(
        &self,
        source: impl Into<String>,
        guid: impl Into<String>,
        record: SubscriberRecord,
    ) {
        let guid = guid.into();
        let mut entries = self.entries.write();
        entries.sources.insert(guid.clone(), source.into());
        entries.records.insert(guid, record);
    }

    /// Remove the record stored under `guid`; returns whether one existed
    pub fn remove(&self, guid: &str) -> bool {
        let mut entries = self.entries.write();
        entries.sources.remove(guid);
        entries.records.remove(guid).is_some()
    }

    /// Replace the whole set with `records`
    pub fn bulk_load(&self, records: impl IntoIterator<Item = SubscriberRecord>) {
        let loaded: HashMap<String, SubscriberRecord> = records
            .into_iter()
            .map(|record| (record.guid.clone(), record))
            .collect();

        *self.entries.write() = Entries {
            records: loaded,
            sources: HashMap::new(),
        };
    }

    /// Replace the records of `source` with `records`
    ///
    /// Records written by other sources, or by no source, stay. Returns the
    /// number of records dropped from the previous snapshot of `source`.
    pub fn replace_source(
        &self,
        source: &str,
        records: impl IntoIterator<Item = SubscriberRecord>,
    ) -> usize {
        let records: Vec<SubscriberRecord> = records.into_iter().collect();

        let mut entries = self.entries.write();
        let Entries {
            records: current,
            sources,
        } = &mut *entries;

        let before = current.len();
        current.retain(|guid, _| sources.get(guid).map(String::as_str) != Some(source));
        sources.retain(|_, owner| owner != source);
        let dropped = before - current.len();

        for record in records {
            sources.insert(record.guid.clone(), source.to_string());
            current.insert(record.guid.clone(), record);
        }
        dropped
    }

    /// Find the subscriber owning `email`
    ///
    /// An entry matches exactly, or, when it is a bare username, if
    /// `entry@system_domain` equals `email`. With several matching records
    /// any one of them is returned.
    pub fn find_by_email(&self, system_domain: &str, email: &str) -> DomainResult<SubscriberRecord> {
        let entries = self.entries.read();
        tracing::debug!(
            num_records = entries.records.len(),
            email = %email,
            "Searching PBX directory"
        );

        entries
            .records
            .values()
            .find(|record| record.matches_email(system_domain, email))
            .cloned()
            .ok_or_else(|| DomainError::DirectoryMiss {
                email: email.to_string(),
            })
    }

    /// Get a record by guid
    pub fn get(&self, guid: &str) -> Option<SubscriberRecord> {
        self.entries.read().records.get(guid).cloned()
    }

    /// Source that last wrote `guid`
    pub fn source_of(&self, guid: &str) -> Option<String> {
        self.entries.read().sources.get(guid).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().records.is_empty()
    }
}
