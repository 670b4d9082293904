//! In-memory response store.
//!
//! Non-durable; used for `:memory:` deployments and service tests.

use super::response_repo::{ResponseStore, StoreError, StoreResult};
use crate::model::response::{now_timestamp, ResponseDraft, ResponseRecord};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

/// `RwLock`-guarded record list with an atomic id counter.
#[derive(Default)]
pub struct MemoryResponseStore {
    next_id: AtomicI64,
    records: RwLock<Vec<ResponseRecord>>,
}

impl MemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseStore for MemoryResponseStore {
    fn append(&self, draft: ResponseDraft) -> StoreResult<ResponseRecord> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = draft.into_record(id, now_timestamp());
        records.push(record.clone());
        Ok(record)
    }

    fn list_all(&self) -> StoreResult<Vec<ResponseRecord>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(newest_first(records.iter()))
    }

    fn list_by_proposal(&self, proposal_id: &str) -> StoreResult<Vec<ResponseRecord>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(newest_first(
            records
                .iter()
                .filter(|record| record.proposal_id == proposal_id),
        ))
    }

    fn count(&self) -> StoreResult<u64> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.len() as u64)
    }
}

fn newest_first<'a>(records: impl Iterator<Item = &'a ResponseRecord>) -> Vec<ResponseRecord> {
    let mut sorted: Vec<ResponseRecord> = records.cloned().collect();
    sorted.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    sorted
}
