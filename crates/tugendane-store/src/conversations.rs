//! Conversation records with the one-active-per-(user, channel) invariant.

use std::sync::Mutex;

use tracing::info;
use uuid::Uuid;

use tugendane_core::{
    Channel, Conversation, ConversationState, ConversationStatus, DialogContext, Timestamp,
};

use crate::error::StoreError;

/// In-memory conversation store.
///
/// `get_or_create_active` performs lookup-and-insert under a single lock so
/// two concurrent turns can never create duplicate active conversations.
pub struct ConversationStore {
    conversations: Mutex<Vec<Conversation>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(Vec::new()),
        }
    }

    /// Return the active conversation for (user, channel), creating one in
    /// `Initial` state if none exists. The boolean is true when created.
    pub fn get_or_create_active(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<(Conversation, bool), StoreError> {
        let mut conversations = self.conversations.lock().map_err(StoreError::poisoned)?;
        if let Some(existing) = conversations
            .iter()
            .filter(|c| {
                c.user_id == user_id
                    && c.channel == channel
                    && c.status == ConversationStatus::Active
            })
            .max_by_key(|c| c.last_message_at)
        {
            return Ok((existing.clone(), false));
        }

        let now = Timestamp::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_id,
            channel,
            status: ConversationStatus::Active,
            state: ConversationState::Initial,
            context: DialogContext::None,
            created_at: now,
            last_message_at: now,
        };
        conversations.push(conversation.clone());
        info!("Created new {} conversation for user {}", channel, user_id);
        Ok((conversation, true))
    }

    pub fn get(&self, id: Uuid) -> Result<Conversation, StoreError> {
        let conversations = self.conversations.lock().map_err(StoreError::poisoned)?;
        conversations
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::ConversationNotFound(id))
    }

    /// Persist the state and context decided by the current turn's owner,
    /// bumping the activity timestamp.
    pub fn apply_turn(
        &self,
        id: Uuid,
        state: ConversationState,
        context: DialogContext,
    ) -> Result<Conversation, StoreError> {
        self.update(id, |c| {
            c.state = state;
            c.context = context;
            if state.is_terminal() {
                c.status = match state {
                    ConversationState::Expired => ConversationStatus::Expired,
                    _ => ConversationStatus::Completed,
                };
            }
        })
    }

    /// Bump the activity timestamp without changing dialog state.
    pub fn touch(&self, id: Uuid) -> Result<Conversation, StoreError> {
        self.update(id, |_| {})
    }

    /// Count of all conversations for a user, regardless of status.
    pub fn count_for_user(&self, user_id: Uuid) -> usize {
        self.conversations
            .lock()
            .map(|cs| cs.iter().filter(|c| c.user_id == user_id).count())
            .unwrap_or(0)
    }

    fn update(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Conversation),
    ) -> Result<Conversation, StoreError> {
        let mut conversations = self.conversations.lock().map_err(StoreError::poisoned)?;
        let conversation = conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::ConversationNotFound(id))?;
        f(conversation);
        conversation.last_message_at = Timestamp::now();
        Ok(conversation.clone())
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
