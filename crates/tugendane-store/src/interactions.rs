//! Interaction records and their follow-up bookkeeping.

use std::sync::Mutex;

use tracing::info;
use uuid::Uuid;

use tugendane_core::{
    FollowUpState, Interaction, InteractionKind, InteractionStatus, Timestamp,
};

use crate::error::StoreError;

/// In-memory interaction store.
///
/// Follow-up fields are mutated through the atomic helpers below so the
/// at-most-one-check-in guarantee holds even when a fire races a restart.
pub struct InteractionStore {
    interactions: Mutex<Vec<Interaction>>,
}

impl InteractionStore {
    pub fn new() -> Self {
        Self {
            interactions: Mutex::new(Vec::new()),
        }
    }

    pub fn create(
        &self,
        user_id: Uuid,
        service_id: u64,
        kind: InteractionKind,
        status: InteractionStatus,
    ) -> Result<Interaction, StoreError> {
        let now = Timestamp::now();
        let interaction = Interaction {
            id: Uuid::new_v4(),
            user_id,
            service_id,
            kind,
            status,
            follow_up: FollowUpState::default(),
            created_at: now,
            updated_at: now,
        };
        let mut interactions = self.interactions.lock().map_err(StoreError::poisoned)?;
        interactions.push(interaction.clone());
        info!("Recorded {} interaction for user {}", kind, user_id);
        Ok(interaction)
    }

    pub fn get(&self, id: Uuid) -> Result<Interaction, StoreError> {
        let interactions = self.interactions.lock().map_err(StoreError::poisoned)?;
        interactions
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(StoreError::InteractionNotFound(id))
    }

    pub fn set_status(&self, id: Uuid, status: InteractionStatus) -> Result<Interaction, StoreError> {
        self.update(id, |i| i.status = status)
    }

    /// Mark that a follow-up has been enqueued for this interaction.
    pub fn mark_follow_up_scheduled(&self, id: Uuid) -> Result<Interaction, StoreError> {
        self.update(id, |i| i.follow_up.scheduled = true)
    }

    /// Atomically claim the right to send the follow-up message.
    ///
    /// Returns true exactly once per interaction. The caller must only hand
    /// the message to the transport after a successful claim.
    pub fn claim_follow_up_send(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut interactions = self.interactions.lock().map_err(StoreError::poisoned)?;
        let interaction = interactions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::InteractionNotFound(id))?;
        if interaction.follow_up.sent {
            return Ok(false);
        }
        interaction.follow_up.sent = true;
        interaction.follow_up.sent_at = Some(Timestamp::now());
        interaction.updated_at = Timestamp::now();
        Ok(true)
    }

    /// Release a send claim after the message never reached the transport,
    /// so a later poll can retry the check-in.
    pub fn release_follow_up_send(&self, id: Uuid) -> Result<Interaction, StoreError> {
        self.update(id, |i| {
            i.follow_up.sent = false;
            i.follow_up.sent_at = None;
        })
    }

    /// The interaction whose follow-up question is currently awaiting a
    /// reply from this user, most recently sent first.
    pub fn pending_follow_up(&self, user_id: Uuid) -> Result<Option<Interaction>, StoreError> {
        let interactions = self.interactions.lock().map_err(StoreError::poisoned)?;
        Ok(interactions
            .iter()
            .filter(|i| {
                i.user_id == user_id && i.follow_up.sent && i.follow_up.response.is_none()
            })
            .max_by_key(|i| i.follow_up.sent_at)
            .cloned())
    }

    /// Record the user's verbatim reply to a follow-up question and the
    /// status it resolves to.
    pub fn record_follow_up_response(
        &self,
        id: Uuid,
        response: &str,
        status: InteractionStatus,
    ) -> Result<Interaction, StoreError> {
        self.update(id, |i| {
            i.follow_up.response = Some(response.to_string());
            i.follow_up.response_at = Some(Timestamp::now());
            i.status = status;
        })
    }

    fn update(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Interaction),
    ) -> Result<Interaction, StoreError> {
        let mut interactions = self.interactions.lock().map_err(StoreError::poisoned)?;
        let interaction = interactions
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::InteractionNotFound(id))?;
        f(interaction);
        interaction.updated_at = Timestamp::now();
        Ok(interaction.clone())
    }
}

impl Default for InteractionStore {
    fn default() -> Self {
        Self::new()
    }
}
