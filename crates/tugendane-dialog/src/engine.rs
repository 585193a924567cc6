//! The dialog engine: turns a classified inbound message plus conversation
//! state into replies and side effects.
//!
//! The engine never touches the transport. It returns a [`TurnOutcome`] and
//! leaves delivery, follow-up scheduling, and call bridging to the caller.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use tugendane_core::{
    Channel, Conversation, ConversationState, DialogContext, EngineConfig, GeoPoint, Intent,
    InteractionKind, InteractionStatus, PendingAction, Service, ServiceCategory, User,
};
use tugendane_geo::{format_directions_text, haversine_km, ServiceHit, ServiceLocator};
use tugendane_nlp::EntityMap;
use tugendane_store::{ConversationStore, InteractionStore, ServiceStore, StoreError, UserStore};

use crate::error::DialogError;
use crate::responses;
use crate::state_machine::validate_transition;

/// What one processed turn asks the caller to do.
#[derive(Debug, Default)]
pub struct TurnOutcome {
    /// Messages to deliver back to the user, in order.
    pub replies: Vec<String>,
    /// Interaction that should get a follow-up check-in.
    pub follow_up: Option<Uuid>,
    /// Service phone number to bridge the caller to (voice only).
    pub dial: Option<String>,
}

impl TurnOutcome {
    fn reply(text: String) -> Self {
        Self {
            replies: vec![text],
            ..Self::default()
        }
    }
}

/// Where an origin point for a proximity search came from.
enum Origin {
    Known(GeoPoint),
    /// A place name was given but the geocoder did not recognize it.
    Unresolved(String),
    Missing,
}

/// The conversation state machine, with all collaborators injected.
pub struct DialogEngine {
    users: Arc<UserStore>,
    conversations: Arc<ConversationStore>,
    interactions: Arc<InteractionStore>,
    services: Arc<ServiceStore>,
    locator: Arc<dyn ServiceLocator>,
    config: EngineConfig,
}

impl DialogEngine {
    pub fn new(
        users: Arc<UserStore>,
        conversations: Arc<ConversationStore>,
        interactions: Arc<InteractionStore>,
        services: Arc<ServiceStore>,
        locator: Arc<dyn ServiceLocator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            users,
            conversations,
            interactions,
            services,
            locator,
            config,
        }
    }

    /// Process one inbound turn. State takes precedence over intent: a
    /// conversation waiting for a location or a menu pick interprets the
    /// message in that frame before any intent routing.
    pub async fn process_turn(
        &self,
        user: &User,
        conversation: &Conversation,
        text: &str,
        intent: Intent,
        entities: &EntityMap,
    ) -> Result<TurnOutcome, DialogError> {
        debug!(
            "Turn for conversation {} in state {} with intent {}",
            conversation.id, conversation.state, intent
        );
        match conversation.state {
            ConversationState::AwaitingLocation => {
                self.handle_awaiting_location(user, conversation, text, intent, entities)
                    .await
            }
            ConversationState::ServiceSelection => {
                self.handle_service_selection(user, conversation, text, intent)
                    .await
            }
            ConversationState::ServiceConfirmation => {
                self.handle_service_confirmation(user, conversation, text, intent)
                    .await
            }
            _ => self.handle_intent(user, conversation, intent, entities).await,
        }
    }

    // =========================================================================
    // Intent routing (initial / follow_up states)
    // =========================================================================

    async fn handle_intent(
        &self,
        user: &User,
        conversation: &Conversation,
        intent: Intent,
        entities: &EntityMap,
    ) -> Result<TurnOutcome, DialogError> {
        match intent {
            Intent::Greeting => {
                self.touch(conversation)?;
                Ok(TurnOutcome::reply(responses::greeting(user.language)))
            }
            Intent::Help => {
                self.touch(conversation)?;
                Ok(TurnOutcome::reply(responses::help(user.language)))
            }
            Intent::FindService => self.find_service(user, conversation, entities).await,
            Intent::GetDirections => self.get_directions(user, conversation, entities).await,
            Intent::ServiceHours | Intent::RequiredDocuments => {
                self.service_info(user, conversation, intent, entities).await
            }
            Intent::ConnectCall => {
                // Call bridging is only reachable from the voice
                // confirmation menu.
                self.touch(conversation)?;
                Ok(TurnOutcome::reply(responses::call_unavailable(user.language)))
            }
            Intent::ConfirmService | Intent::DenyService | Intent::GeneralInquiry => {
                self.touch(conversation)?;
                Ok(TurnOutcome::reply(responses::default_reply(user.language)))
            }
        }
    }

    async fn find_service(
        &self,
        user: &User,
        conversation: &Conversation,
        entities: &EntityMap,
    ) -> Result<TurnOutcome, DialogError> {
        let category = entities.service_type();
        match self.resolve_origin(user, entities).await? {
            Origin::Known(origin) => {
                self.present_candidates(user, conversation, origin, category)
                    .await
            }
            Origin::Unresolved(place) => {
                self.transition(
                    conversation,
                    ConversationState::AwaitingLocation,
                    DialogContext::AwaitingLocation {
                        action: PendingAction::FindService,
                        service_type: category,
                    },
                )?;
                Ok(TurnOutcome::reply(responses::location_not_found(
                    user.language,
                    &place,
                )))
            }
            Origin::Missing => {
                self.transition(
                    conversation,
                    ConversationState::AwaitingLocation,
                    DialogContext::AwaitingLocation {
                        action: PendingAction::FindService,
                        service_type: category,
                    },
                )?;
                Ok(TurnOutcome::reply(responses::need_location(user.language)))
            }
        }
    }

    async fn get_directions(
        &self,
        user: &User,
        conversation: &Conversation,
        entities: &EntityMap,
    ) -> Result<TurnOutcome, DialogError> {
        let Some(category) = entities.service_type() else {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::need_service_type(
                user.language,
            )));
        };
        match self.resolve_origin(user, entities).await? {
            Origin::Known(origin) => {
                self.direct_to_nearest(user, conversation, origin, Some(category))
                    .await
            }
            Origin::Unresolved(place) => {
                self.transition(
                    conversation,
                    ConversationState::AwaitingLocation,
                    DialogContext::AwaitingLocation {
                        action: PendingAction::GetDirections,
                        service_type: Some(category),
                    },
                )?;
                Ok(TurnOutcome::reply(responses::location_not_found(
                    user.language,
                    &place,
                )))
            }
            Origin::Missing => {
                self.transition(
                    conversation,
                    ConversationState::AwaitingLocation,
                    DialogContext::AwaitingLocation {
                        action: PendingAction::GetDirections,
                        service_type: Some(category),
                    },
                )?;
                Ok(TurnOutcome::reply(responses::need_location(user.language)))
            }
        }
    }

    async fn service_info(
        &self,
        user: &User,
        conversation: &Conversation,
        intent: Intent,
        entities: &EntityMap,
    ) -> Result<TurnOutcome, DialogError> {
        let category = entities.service_type();
        let origin = match self.resolve_origin(user, entities).await? {
            Origin::Known(origin) => Some(origin),
            _ => None,
        };
        let (Some(category), Some(origin)) = (category, origin) else {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::need_service_info(
                user.language,
            )));
        };

        let hits = self.nearest(origin, Some(category), 1).await;
        let Some(hit) = hits.first() else {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::no_services_of_type(
                user.language,
                Some(category),
            )));
        };

        let message = match intent {
            Intent::RequiredDocuments => responses::required_documents(user.language, &hit.service),
            _ => responses::service_hours(user.language, &hit.service),
        };
        self.interactions.create(
            user.id,
            hit.service.id,
            InteractionKind::InformationRequest,
            InteractionStatus::Completed,
        )?;
        self.touch(conversation)?;
        Ok(TurnOutcome::reply(message))
    }

    // =========================================================================
    // State-first handlers
    // =========================================================================

    async fn handle_awaiting_location(
        &self,
        user: &User,
        conversation: &Conversation,
        text: &str,
        intent: Intent,
        entities: &EntityMap,
    ) -> Result<TurnOutcome, DialogError> {
        if intent == Intent::Greeting {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::greeting(user.language)));
        }

        let place = entities.location().unwrap_or_else(|| text.trim());
        let resolved = self.geocode(place).await;
        let Some(origin) = resolved else {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::location_not_found(
                user.language,
                place,
            )));
        };
        let user = self.users.set_location(user.id, origin)?;

        match conversation.context.clone() {
            DialogContext::AwaitingLocation {
                action: PendingAction::FindService,
                service_type,
            } => {
                self.present_candidates(&user, conversation, origin, service_type)
                    .await
            }
            DialogContext::AwaitingLocation {
                action: PendingAction::GetDirections,
                service_type,
            } => {
                self.direct_to_nearest(&user, conversation, origin, service_type)
                    .await
            }
            other => {
                warn!(
                    "Conversation {} awaiting location with context {:?}, resetting",
                    conversation.id, other
                );
                self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
                Ok(TurnOutcome::reply(responses::default_reply(user.language)))
            }
        }
    }

    async fn handle_service_selection(
        &self,
        user: &User,
        conversation: &Conversation,
        text: &str,
        intent: Intent,
    ) -> Result<TurnOutcome, DialogError> {
        if intent == Intent::Greeting {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::greeting(user.language)));
        }

        let DialogContext::ServiceSelection { service_ids } = conversation.context.clone() else {
            warn!(
                "Conversation {} in service_selection without candidates, resetting",
                conversation.id
            );
            self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
            return Ok(TurnOutcome::reply(responses::default_reply(user.language)));
        };

        let choice = text.trim().parse::<usize>().ok();
        let service_id = choice
            .filter(|n| (1..=service_ids.len()).contains(n))
            .map(|n| service_ids[n - 1]);
        let Some(service_id) = service_id else {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::select_by_number(
                user.language,
            )));
        };

        let service = match self.services.get(service_id) {
            Ok(service) => service,
            Err(StoreError::ServiceNotFound(id)) => {
                warn!("Selected service {} no longer exists", id);
                self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
                return Ok(TurnOutcome::reply(responses::no_services(user.language)));
            }
            Err(e) => return Err(e.into()),
        };
        self.direct_to_service(user, conversation, service).await
    }

    async fn handle_service_confirmation(
        &self,
        user: &User,
        conversation: &Conversation,
        text: &str,
        intent: Intent,
    ) -> Result<TurnOutcome, DialogError> {
        if intent == Intent::Greeting {
            self.touch(conversation)?;
            return Ok(TurnOutcome::reply(responses::greeting(user.language)));
        }

        let DialogContext::ServiceConfirmation { service_id } = conversation.context else {
            warn!(
                "Conversation {} in service_confirmation without a candidate, resetting",
                conversation.id
            );
            self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
            return Ok(TurnOutcome::reply(responses::default_reply(user.language)));
        };
        let service = match self.services.get(service_id) {
            Ok(service) => service,
            Err(StoreError::ServiceNotFound(id)) => {
                warn!("Confirmed service {} no longer exists", id);
                self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
                return Ok(TurnOutcome::reply(responses::no_services(user.language)));
            }
            Err(e) => return Err(e.into()),
        };

        match text.trim() {
            "1" => self.direct_to_service(user, conversation, service).await,
            "2" => {
                let Some(phone) = service.phone.clone() else {
                    self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
                    return Ok(TurnOutcome::reply(responses::call_unavailable(
                        user.language,
                    )));
                };
                let interaction = self.interactions.create(
                    user.id,
                    service.id,
                    InteractionKind::CallConnection,
                    InteractionStatus::InProgress,
                )?;
                self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
                Ok(TurnOutcome {
                    replies: vec![responses::connecting_call(user.language, &service.name)],
                    follow_up: Some(interaction.id),
                    dial: Some(phone),
                })
            }
            _ => {
                self.touch(conversation)?;
                Ok(TurnOutcome::reply(responses::voice_confirmation(
                    user.language,
                    &service.name,
                )))
            }
        }
    }

    // =========================================================================
    // Shared flows
    // =========================================================================

    /// Search near the origin and present the results: a numbered list over
    /// SMS, a single confirm-or-call candidate over voice.
    async fn present_candidates(
        &self,
        user: &User,
        conversation: &Conversation,
        origin: GeoPoint,
        category: Option<ServiceCategory>,
    ) -> Result<TurnOutcome, DialogError> {
        let limit = match conversation.channel {
            Channel::Voice => 1,
            _ => self.config.locator.max_options,
        };
        let hits = self.nearest(origin, category, limit).await;
        if hits.is_empty() {
            self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
            return Ok(TurnOutcome::reply(responses::no_services(user.language)));
        }

        if conversation.channel == Channel::Voice {
            // hits is non-empty here
            let hit = &hits[0];
            self.transition(
                conversation,
                ConversationState::ServiceConfirmation,
                DialogContext::ServiceConfirmation {
                    service_id: hit.service.id,
                },
            )?;
            return Ok(TurnOutcome::reply(responses::voice_confirmation(
                user.language,
                &hit.service.name,
            )));
        }

        let service_ids = hits.iter().map(|h| h.service.id).collect();
        self.transition(
            conversation,
            ConversationState::ServiceSelection,
            DialogContext::ServiceSelection { service_ids },
        )?;
        Ok(TurnOutcome::reply(responses::service_list(
            user.language,
            category,
            &hits,
        )))
    }

    /// Directions to the single nearest service of a category.
    async fn direct_to_nearest(
        &self,
        user: &User,
        conversation: &Conversation,
        origin: GeoPoint,
        category: Option<ServiceCategory>,
    ) -> Result<TurnOutcome, DialogError> {
        let hits = self.nearest(origin, category, 1).await;
        match hits.into_iter().next() {
            Some(hit) => self.direct_to_service(user, conversation, hit.service).await,
            None => {
                self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
                Ok(TurnOutcome::reply(responses::no_services_of_type(
                    user.language,
                    category,
                )))
            }
        }
    }

    /// Directions to a specific service, recording the interaction and
    /// requesting a follow-up check-in.
    async fn direct_to_service(
        &self,
        user: &User,
        conversation: &Conversation,
        service: Service,
    ) -> Result<TurnOutcome, DialogError> {
        let Some(known) = self.users.get(user.id)?.last_location else {
            self.transition(
                conversation,
                ConversationState::AwaitingLocation,
                DialogContext::AwaitingLocation {
                    action: PendingAction::GetDirections,
                    service_type: Some(service.category),
                },
            )?;
            return Ok(TurnOutcome::reply(responses::need_location(user.language)));
        };
        let origin = known.point;
        let distance_km = haversine_km(origin, service.location);

        let steps = match self
            .locator
            .directions(origin, service.location, user.language)
            .await
        {
            Ok(steps) => steps,
            Err(e) => {
                warn!("Directions lookup failed: {}", e);
                Vec::new()
            }
        };
        let mut message = responses::directions_preamble(user.language, &service.name, distance_km);
        message.push_str(&format_directions_text(&steps, user.language));

        let interaction = self.interactions.create(
            user.id,
            service.id,
            InteractionKind::DirectionRequest,
            InteractionStatus::Completed,
        )?;
        self.transition(conversation, ConversationState::Initial, DialogContext::None)?;
        Ok(TurnOutcome {
            replies: vec![message],
            follow_up: Some(interaction.id),
            dial: None,
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Origin for a proximity search: the stored last location, or a
    /// freshly geocoded place name from the message, which is then stored.
    async fn resolve_origin(
        &self,
        user: &User,
        entities: &EntityMap,
    ) -> Result<Origin, DialogError> {
        if let Some(known) = &user.last_location {
            return Ok(Origin::Known(known.point));
        }
        let Some(place) = entities.location() else {
            return Ok(Origin::Missing);
        };
        match self.geocode(place).await {
            Some(point) => {
                self.users.set_location(user.id, point)?;
                Ok(Origin::Known(point))
            }
            None => Ok(Origin::Unresolved(place.to_string())),
        }
    }

    async fn geocode(&self, place: &str) -> Option<GeoPoint> {
        match self.locator.geocode(place).await {
            Ok(point) => point,
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", place, e);
                None
            }
        }
    }

    /// Proximity search that degrades to an empty result on backend failure.
    async fn nearest(
        &self,
        origin: GeoPoint,
        category: Option<ServiceCategory>,
        limit: usize,
    ) -> Vec<ServiceHit> {
        match self
            .locator
            .nearest(origin, category, self.config.locator.search_radius_km, limit)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Service search failed: {}", e);
                Vec::new()
            }
        }
    }

    fn transition(
        &self,
        conversation: &Conversation,
        state: ConversationState,
        context: DialogContext,
    ) -> Result<(), DialogError> {
        if state != conversation.state {
            validate_transition(conversation.state, state)?;
        }
        self.conversations.apply_turn(conversation.id, state, context)?;
        Ok(())
    }

    fn touch(&self, conversation: &Conversation) -> Result<(), DialogError> {
        self.conversations.touch(conversation.id)?;
        Ok(())
    }
}
