use std::collections::HashSet;
use std::sync::Arc;

use super::model::HistoryRecord;
use crate::error::{MedscanError, Result};
use crate::feedback::FeedbackState;
use crate::store::{self, HISTORY_KEY, KeyValueStore};

/// Ordered, persisted collection of past analyses, newest first.
///
/// Every mutation updates the in-memory sequence first and then writes the
/// whole sequence through to the store. When the write fails the in-memory
/// sequence keeps the change and the `Persistence` error is returned so the
/// caller can warn the user that the change will not survive a restart.
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
    store: Arc<dyn KeyValueStore>,
}

impl HistoryLog {
    /// Restores the log from `store`.
    ///
    /// Never fails: missing state yields an empty log, corrupt state is
    /// logged and discarded. Records repeating an earlier ID are dropped.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let records = match store::load_json::<Vec<HistoryRecord>>(store.as_ref(), HISTORY_KEY).await
        {
            Ok(Some(records)) => dedup_by_id(records),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable prediction history");
                Vec::new()
            }
        };

        tracing::debug!(count = records.len(), "Loaded prediction history");
        Self { records, store }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Prepends `record` and persists the log.
    ///
    /// A record whose ID is already present is refused with `Internal` and
    /// the log is left untouched.
    pub async fn append(&mut self, record: HistoryRecord) -> Result<()> {
        if self.get(record.id()).is_some() {
            return Err(MedscanError::internal(format!(
                "history already contains record {}",
                record.id()
            )));
        }

        self.records.insert(0, record);
        self.persist().await
    }

    /// Replaces the feedback of the record with `id` and persists the log.
    ///
    /// Returns the updated record, or `None` (without writing) when no record
    /// matches.
    pub async fn update_feedback(
        &mut self,
        id: &str,
        feedback: FeedbackState,
    ) -> Result<Option<HistoryRecord>> {
        let Some(record) = self.records.iter_mut().find(|record| record.id() == id) else {
            tracing::debug!(id, "Feedback for unknown record ignored");
            return Ok(None);
        };

        record.set_feedback(feedback);
        let updated = record.clone();
        self.persist().await?;
        Ok(Some(updated))
    }

    /// Empties the log and persists the empty state.
    pub async fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        store::save_json(self.store.as_ref(), HISTORY_KEY, &self.records)
            .await
            .map_err(|e| match e {
                MedscanError::Persistence(_) => e,
                other => MedscanError::persistence(format!(
                    "Failed to save prediction history: {}",
                    other
                )),
            })
    }
}

fn dedup_by_id(records: Vec<HistoryRecord>) -> Vec<HistoryRecord> {
    let mut seen = HashSet::new();
    let total = records.len();
    let unique: Vec<HistoryRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.id().to_string()))
        .collect();

    if unique.len() != total {
        tracing::warn!(
            dropped = total - unique.len(),
            "Dropped history records with duplicate IDs"
        );
    }
    unique
}
