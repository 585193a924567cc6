//! Session router: the single entry point for inbound traffic.
//!
//! Validates raw channel input, serializes turns per (address, channel) so
//! concurrent webhooks for the same user cannot interleave, and wires the
//! NLP layer, dialog engine, and follow-up scheduler together.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use tugendane_core::{
    Channel, ConversationState, DialogContext, EngineConfig, Intent, Language, Timestamp,
};
use tugendane_nlp::{detect_language, has_kinyarwanda_evidence, EntityExtractor, IntentClassifier};
use tugendane_store::{ConversationStore, MessageAnalysis, MessageStore, StoreError, UserStore};

use crate::engine::DialogEngine;
use crate::error::RouterError;
use crate::followup::FollowUpScheduler;
use crate::transport::Transport;

struct SessionSlot {
    lock: Arc<AsyncMutex<()>>,
    last_used: Timestamp,
}

/// Routes inbound SMS and voice turns through the dialog engine.
pub struct SessionRouter {
    users: Arc<UserStore>,
    conversations: Arc<ConversationStore>,
    messages: Arc<MessageStore>,
    engine: Arc<DialogEngine>,
    scheduler: Arc<FollowUpScheduler>,
    transport: Arc<dyn Transport>,
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    default_language: Language,
    idle_eviction: Duration,
    sessions: Mutex<HashMap<(String, Channel), SessionSlot>>,
}

impl SessionRouter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<UserStore>,
        conversations: Arc<ConversationStore>,
        messages: Arc<MessageStore>,
        engine: Arc<DialogEngine>,
        scheduler: Arc<FollowUpScheduler>,
        transport: Arc<dyn Transport>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            users,
            conversations,
            messages,
            engine,
            scheduler,
            transport,
            classifier: IntentClassifier::new(),
            extractor: EntityExtractor::new(),
            default_language: config.general.default_language,
            idle_eviction: Duration::from_secs(config.session.idle_eviction_minutes * 60),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Handle one inbound SMS. Returns the replies to send back, in order.
    pub async fn handle_inbound_sms(
        &self,
        from: &str,
        text: &str,
    ) -> Result<Vec<String>, RouterError> {
        let from = from.trim();
        if from.is_empty() {
            return Err(RouterError::InvalidInput("missing sender address"));
        }
        if text.trim().is_empty() {
            return Err(RouterError::InvalidInput("empty message body"));
        }
        self.handle_turn(from, Channel::Sms, text.trim()).await
    }

    /// Handle one turn of a voice call: transcribed speech or DTMF digits.
    pub async fn handle_inbound_voice_turn(
        &self,
        caller: &str,
        session_id: &str,
        input: &str,
    ) -> Result<Vec<String>, RouterError> {
        let caller = caller.trim();
        if caller.is_empty() {
            return Err(RouterError::InvalidInput("missing caller number"));
        }
        if session_id.trim().is_empty() {
            return Err(RouterError::InvalidInput("missing session id"));
        }
        if input.trim().is_empty() {
            return Err(RouterError::InvalidInput("empty voice input"));
        }
        self.handle_turn(caller, Channel::Voice, input.trim()).await
    }

    async fn handle_turn(
        &self,
        address: &str,
        channel: Channel,
        text: &str,
    ) -> Result<Vec<String>, RouterError> {
        let session = self.session_lock(address, channel)?;
        let _guard = session.lock().await;

        let mut user = self.users.get_or_create(address, self.default_language)?;
        if let Some(detected) = self.detected_preference(text) {
            if detected != user.language {
                info!("Switching user {} language to {}", user.id, detected);
                user = self.users.set_language(user.id, detected)?;
            }
        }

        let (conversation, _) = self
            .conversations
            .get_or_create_active(user.id, channel)?;

        let (intent, _score) = self.classifier.classify(text);
        let entities = self.extractor.extract(text);
        self.messages.append_user(
            conversation.id,
            channel,
            text,
            MessageAnalysis {
                intent: Some(intent),
                entities: serde_json::to_value(&entities).ok(),
                language: Some(detect_language(text)),
            },
        )?;

        // A pending check-in claims yes/no replies before the dialog flow.
        if matches!(intent, Intent::ConfirmService | Intent::DenyService) {
            if let Some(reply) = self.scheduler.resolve_reply(user.id, text)? {
                self.messages
                    .append_system(conversation.id, channel, &reply)?;
                if conversation.state == ConversationState::FollowUp {
                    self.conversations.apply_turn(
                        conversation.id,
                        ConversationState::Completed,
                        DialogContext::None,
                    )?;
                }
                return Ok(vec![reply]);
            }
        }

        let outcome = self
            .engine
            .process_turn(&user, &conversation, text, intent, &entities)
            .await?;

        if let Some(interaction_id) = outcome.follow_up {
            self.scheduler.schedule(interaction_id)?;
        }
        if let Some(number) = &outcome.dial {
            if let Err(e) = self.transport.dial(address, number).await {
                warn!("Failed to bridge {} to {}: {}", address, number, e);
            }
        }
        for reply in &outcome.replies {
            self.messages
                .append_system(conversation.id, channel, reply)?;
        }
        Ok(outcome.replies)
    }

    /// Language preference update, guarded against weak evidence: digit
    /// menus never change it, and a lone Kinyarwanda word below the
    /// detection threshold never flips a stored `rw` preference to English.
    fn detected_preference(&self, text: &str) -> Option<Language> {
        if !text.chars().any(|c| c.is_alphabetic()) {
            return None;
        }
        match detect_language(text) {
            Language::Rw => Some(Language::Rw),
            Language::En if !has_kinyarwanda_evidence(text) => Some(Language::En),
            _ => None,
        }
    }

    /// Per-(address, channel) turn lock, with idle entries evicted.
    fn session_lock(
        &self,
        address: &str,
        channel: Channel,
    ) -> Result<Arc<AsyncMutex<()>>, RouterError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Backend(format!("session map poisoned: {}", e)))?;
        let now = Timestamp::now();
        let idle = self.idle_eviction.as_secs() as i64;
        sessions
            .retain(|_, slot| now.0 - slot.last_used.0 < idle || Arc::strong_count(&slot.lock) > 1);

        let slot = sessions
            .entry((address.to_string(), channel))
            .or_insert_with(|| SessionSlot {
                lock: Arc::new(AsyncMutex::new(())),
                last_used: now,
            });
        slot.last_used = now;
        Ok(Arc::clone(&slot.lock))
    }
}
