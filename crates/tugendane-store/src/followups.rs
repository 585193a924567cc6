//! Durable queue of scheduled follow-up check-ins.

use std::sync::Mutex;

use uuid::Uuid;

use tugendane_core::Timestamp;

use crate::error::StoreError;

/// One queued check-in, due at a wall-clock instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledFollowUp {
    pub interaction_id: Uuid,
    pub due_at: Timestamp,
}

/// Queue of follow-ups the scheduler polls.
///
/// Entries survive independently of any running scheduler task: a scheduler
/// restarted over the same queue picks up everything still due.
pub struct FollowUpQueue {
    entries: Mutex<Vec<ScheduledFollowUp>>,
}

impl FollowUpQueue {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Enqueue a check-in for an interaction. Idempotent per interaction:
    /// a second schedule for the same id is ignored.
    pub fn schedule(&self, interaction_id: Uuid, due_at: Timestamp) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().map_err(StoreError::poisoned)?;
        if entries.iter().any(|e| e.interaction_id == interaction_id) {
            return Ok(false);
        }
        entries.push(ScheduledFollowUp {
            interaction_id,
            due_at,
        });
        Ok(true)
    }

    /// Remove and return every entry due at or before `now`, oldest first.
    pub fn claim_due(&self, now: Timestamp) -> Result<Vec<ScheduledFollowUp>, StoreError> {
        let mut entries = self.entries.lock().map_err(StoreError::poisoned)?;
        let mut due: Vec<ScheduledFollowUp> = Vec::new();
        entries.retain(|e| {
            if e.due_at <= now {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.due_at);
        Ok(due)
    }

    /// Earliest due instant still queued, if any.
    pub fn next_due(&self) -> Result<Option<Timestamp>, StoreError> {
        let entries = self.entries.lock().map_err(StoreError::poisoned)?;
        Ok(entries.iter().map(|e| e.due_at).min())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FollowUpQueue {
    fn default() -> Self {
        Self::new()
    }
}
