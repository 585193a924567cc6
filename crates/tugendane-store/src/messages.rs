//! Append-only message log per conversation.

use std::sync::Mutex;

use uuid::Uuid;

use tugendane_core::{Channel, Intent, Language, Message, SenderType, Timestamp};

use crate::error::StoreError;

/// Analysis attached to an inbound message by the NLP layer.
#[derive(Clone, Debug, Default)]
pub struct MessageAnalysis {
    pub intent: Option<Intent>,
    pub entities: Option<serde_json::Value>,
    pub language: Option<Language>,
}

/// In-memory message store. Messages are never mutated after append.
pub struct MessageStore {
    messages: Mutex<Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Append an inbound user message together with its NLP analysis.
    pub fn append_user(
        &self,
        conversation_id: Uuid,
        channel: Channel,
        content: &str,
        analysis: MessageAnalysis,
    ) -> Result<Message, StoreError> {
        self.append(Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender: SenderType::User,
            channel,
            content: content.to_string(),
            intent: analysis.intent,
            entities: analysis.entities,
            language: analysis.language,
            created_at: Timestamp::now(),
        })
    }

    /// Append an outbound system message.
    pub fn append_system(
        &self,
        conversation_id: Uuid,
        channel: Channel,
        content: &str,
    ) -> Result<Message, StoreError> {
        self.append(Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender: SenderType::System,
            channel,
            content: content.to_string(),
            intent: None,
            entities: None,
            language: None,
            created_at: Timestamp::now(),
        })
    }

    /// All messages of a conversation in append order.
    pub fn for_conversation(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().map_err(StoreError::poisoned)?;
        Ok(messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    fn append(&self, message: Message) -> Result<Message, StoreError> {
        let mut messages = self.messages.lock().map_err(StoreError::poisoned)?;
        messages.push(message.clone());
        Ok(message)
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_list_in_order() {
        let store = MessageStore::new();
        let conversation_id = Uuid::new_v4();

        store
            .append_user(
                conversation_id,
                Channel::Sms,
                "I need a hospital",
                MessageAnalysis {
                    intent: Some(Intent::FindService),
                    entities: Some(serde_json::json!({"service_types": ["health"]})),
                    language: Some(Language::En),
                },
            )
            .unwrap();
        store
            .append_system(conversation_id, Channel::Sms, "Where are you located?")
            .unwrap();

        let log = store.for_conversation(conversation_id).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, SenderType::User);
        assert_eq!(log[0].intent, Some(Intent::FindService));
        assert_eq!(log[1].sender, SenderType::System);
        assert!(log[1].intent.is_none());
    }

    #[test]
    fn test_conversations_are_isolated() {
        let store = MessageStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store
            .append_user(a, Channel::Sms, "muraho", MessageAnalysis::default())
            .unwrap();
        assert_eq!(store.for_conversation(a).unwrap().len(), 1);
        assert!(store.for_conversation(b).unwrap().is_empty());
    }
}
