//! Follow-up scheduler: delayed service check-ins over SMS.
//!
//! After a directions or call interaction, a check-in question is queued.
//! The background loop polls the queue, sends each due question exactly once,
//! and replies like YES/YEGO or NO resolve the interaction's final status.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tugendane_core::{
    Channel, ConversationState, DialogContext, EngineConfig, InteractionStatus, Timestamp,
};
use tugendane_store::{
    ConversationStore, FollowUpQueue, InteractionStore, MessageStore, ServiceStore, StoreError,
    UserStore,
};

use crate::error::FollowUpError;
use crate::responses;
use crate::transport::Transport;

/// Words that count as a positive answer to the check-in question, in
/// either language.
const CONFIRM_KEYWORDS: [&str; 5] = ["yes", "yego", "completed", "done", "received"];

/// How long the polling loop waits before retrying a check-in whose send
/// failed.
const RETRY_DELAY_SECS: i64 = 60;

/// Background scheduler that sends follow-up check-ins when they fall due.
pub struct FollowUpScheduler {
    users: Arc<UserStore>,
    conversations: Arc<ConversationStore>,
    messages: Arc<MessageStore>,
    interactions: Arc<InteractionStore>,
    services: Arc<ServiceStore>,
    queue: Arc<FollowUpQueue>,
    transport: Arc<dyn Transport>,
    delay: Duration,
    shutdown: Notify,
}

impl FollowUpScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<UserStore>,
        conversations: Arc<ConversationStore>,
        messages: Arc<MessageStore>,
        interactions: Arc<InteractionStore>,
        services: Arc<ServiceStore>,
        queue: Arc<FollowUpQueue>,
        transport: Arc<dyn Transport>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            users,
            conversations,
            messages,
            interactions,
            services,
            queue,
            transport,
            delay: Duration::from_secs(config.follow_up.delay_hours * 3600),
            shutdown: Notify::new(),
        }
    }

    /// Queue a check-in for an interaction after the configured delay.
    /// Scheduling twice for the same interaction is a no-op.
    pub fn schedule(&self, interaction_id: Uuid) -> Result<(), FollowUpError> {
        let due_at = Timestamp(Timestamp::now().0 + self.delay.as_secs() as i64);
        if self.queue.schedule(interaction_id, due_at)? {
            self.interactions.mark_follow_up_scheduled(interaction_id)?;
            info!(
                "Scheduled follow-up for interaction {} in {} hours",
                interaction_id,
                self.delay.as_secs() / 3600
            );
        }
        Ok(())
    }

    /// Send the check-in question for one interaction.
    ///
    /// Returns false without sending when the interaction is gone, its
    /// service is gone, or the question was already sent. The send claim is
    /// taken before the transport call, so a duplicate fire can never reach
    /// the user twice.
    pub async fn fire(&self, interaction_id: Uuid) -> Result<bool, FollowUpError> {
        let interaction = match self.interactions.get(interaction_id) {
            Ok(interaction) => interaction,
            Err(StoreError::InteractionNotFound(id)) => {
                warn!("Follow-up due for missing interaction {}, skipping", id);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let user = self.users.get(interaction.user_id)?;
        let service = match self.services.get(interaction.service_id) {
            Ok(service) => service,
            Err(StoreError::ServiceNotFound(id)) => {
                warn!("Follow-up references missing service {}, skipping", id);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.interactions.claim_follow_up_send(interaction.id)? {
            debug!(
                "Follow-up for interaction {} already sent, skipping",
                interaction.id
            );
            return Ok(false);
        }

        let question = responses::follow_up_question(user.language, &service.name);
        if let Err(e) = self.transport.send(&user.address, &question).await {
            // The message never left, so the claim can be given back for a
            // retry without risking a duplicate.
            self.interactions.release_follow_up_send(interaction.id)?;
            return Err(e.into());
        }

        // Record the question in the user's SMS conversation so the next
        // inbound reply is read in the follow-up frame.
        let (conversation, _) = self
            .conversations
            .get_or_create_active(user.id, Channel::Sms)?;
        self.messages
            .append_system(conversation.id, Channel::Sms, &question)?;
        if conversation.state == ConversationState::Initial {
            self.conversations.apply_turn(
                conversation.id,
                ConversationState::FollowUp,
                DialogContext::None,
            )?;
        }

        info!(
            "Sent follow-up for interaction {} to {}",
            interaction.id, user.address
        );
        Ok(true)
    }

    /// Resolve an inbound reply against the user's pending check-in.
    ///
    /// Returns the localized acknowledgement when a pending follow-up
    /// existed, or None when the reply belongs to the normal dialog flow.
    /// The reply text is stored verbatim.
    pub fn resolve_reply(
        &self,
        user_id: Uuid,
        text: &str,
    ) -> Result<Option<String>, FollowUpError> {
        let Some(interaction) = self.interactions.pending_follow_up(user_id)? else {
            return Ok(None);
        };

        let lower = text.to_lowercase();
        let confirmed = CONFIRM_KEYWORDS.iter().any(|k| lower.contains(k));
        let status = if confirmed {
            InteractionStatus::Completed
        } else {
            InteractionStatus::IssueReported
        };
        self.interactions
            .record_follow_up_response(interaction.id, text, status)?;
        info!(
            "Follow-up for interaction {} resolved as {:?}",
            interaction.id, status
        );

        let user = self.users.get(user_id)?;
        let reply = if confirmed {
            responses::thanks_confirmed(user.language)
        } else {
            responses::thanks_issue(user.language)
        };
        Ok(Some(reply))
    }

    /// Background loop: fire due check-ins, then sleep until the next due
    /// instant or for 60 seconds when the queue is empty. Returns on
    /// shutdown signal.
    pub async fn run(&self) {
        loop {
            let due = match self.queue.claim_due(Timestamp::now()) {
                Ok(due) => due,
                Err(e) => {
                    warn!("Failed to poll follow-up queue: {}", e);
                    Vec::new()
                }
            };
            for entry in due {
                if let Err(e) = self.fire(entry.interaction_id).await {
                    warn!(
                        "Follow-up for interaction {} failed: {}",
                        entry.interaction_id, e
                    );
                    let retry_at = Timestamp(Timestamp::now().0 + RETRY_DELAY_SECS);
                    if let Err(e) = self.queue.schedule(entry.interaction_id, retry_at) {
                        warn!(
                            "Failed to requeue follow-up for interaction {}: {}",
                            entry.interaction_id, e
                        );
                    }
                }
            }

            let sleep_secs = match self.queue.next_due() {
                Ok(Some(due_at)) => (due_at.0 - Timestamp::now().0).max(1) as u64,
                _ => 60,
            };
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(sleep_secs)) => {}
                _ = self.shutdown.notified() => return,
            }
        }
    }

    /// Signal the scheduler loop to shut down gracefully.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}
