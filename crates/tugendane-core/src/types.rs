use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Supported user-facing languages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English (default).
    #[default]
    En,
    /// Kinyarwanda.
    Rw,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Rw => write!(f, "rw"),
        }
    }
}

/// The channel a conversation runs over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Sms,
    Voice,
    Web,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Sms => write!(f, "sms"),
            Channel::Voice => write!(f, "voice"),
            Channel::Web => write!(f, "web"),
        }
    }
}

/// Lifecycle status of a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Completed,
    Expired,
}

/// Current state of the conversation state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Fresh conversation, no pending action.
    #[default]
    Initial,
    /// Waiting for the user to name their location.
    AwaitingLocation,
    /// Up to three candidate services presented, waiting for a numeric pick.
    ServiceSelection,
    /// One candidate presented, waiting for a digit (1=directions, 2=call).
    ServiceConfirmation,
    /// A follow-up check-in was sent on this conversation.
    FollowUp,
    /// Terminal: exchange finished normally.
    Completed,
    /// Terminal: exchange timed out.
    Expired,
}

impl ConversationState {
    /// Whether this state accepts no further turns.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversationState::Completed | ConversationState::Expired
        )
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversationState::Initial => "initial",
            ConversationState::AwaitingLocation => "awaiting_location",
            ConversationState::ServiceSelection => "service_selection",
            ConversationState::ServiceConfirmation => "service_confirmation",
            ConversationState::FollowUp => "follow_up",
            ConversationState::Completed => "completed",
            ConversationState::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

/// Classified purpose of a user message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    FindService,
    GetDirections,
    ServiceHours,
    RequiredDocuments,
    ConnectCall,
    ConfirmService,
    DenyService,
    Greeting,
    Help,
    /// Fallback when no pattern matched.
    GeneralInquiry,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::FindService => "find_service",
            Intent::GetDirections => "get_directions",
            Intent::ServiceHours => "service_hours",
            Intent::RequiredDocuments => "required_documents",
            Intent::ConnectCall => "connect_call",
            Intent::ConfirmService => "confirm_service",
            Intent::DenyService => "deny_service",
            Intent::Greeting => "greeting",
            Intent::Help => "help",
            Intent::GeneralInquiry => "general_inquiry",
        };
        write!(f, "{}", s)
    }
}

/// Category of a government service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Health,
    Education,
    Identification,
    Taxation,
    Social,
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceCategory::Health => "health",
            ServiceCategory::Education => "education",
            ServiceCategory::Identification => "identification",
            ServiceCategory::Taxation => "taxation",
            ServiceCategory::Social => "social",
        };
        write!(f, "{}", s)
    }
}

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    User,
    System,
}

/// Kind of user-facing work recorded by an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    DirectionRequest,
    InformationRequest,
    CallConnection,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractionKind::DirectionRequest => "direction_request",
            InteractionKind::InformationRequest => "information_request",
            InteractionKind::CallConnection => "call_connection",
        };
        write!(f, "{}", s)
    }
}

/// Status of an interaction, updated by the follow-up scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    InProgress,
    Completed,
    IssueReported,
    Canceled,
}

/// Action deferred while the engine waits for a location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    FindService,
    GetDirections,
}

// =============================================================================
// Dialog context
// =============================================================================

/// Slot memory carried between turns, tagged by the pending-action kind.
///
/// Serialized with an explicit `kind` tag so a context written by one channel
/// round-trips identically when read on another.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogContext {
    /// No pending action.
    #[default]
    None,
    /// Waiting for a location before running the deferred action.
    AwaitingLocation {
        action: PendingAction,
        service_type: Option<ServiceCategory>,
    },
    /// Candidate services offered for a numeric pick, in ranked order.
    ServiceSelection { service_ids: Vec<u64> },
    /// Single candidate awaiting a 1/2 digit choice.
    ServiceConfirmation { service_id: u64 },
}

// =============================================================================
// Timestamp
// =============================================================================

/// Unix timestamp in seconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }
}

// =============================================================================
// Geography
// =============================================================================

/// A WGS84 coordinate pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A user's last known position and when it was recorded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnownLocation {
    pub point: GeoPoint,
    pub recorded_at: Timestamp,
}

// =============================================================================
// Records
// =============================================================================

/// A citizen, keyed by their stable channel address (phone number or
/// session identifier). Created on first inbound message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub address: String,
    pub language: Language,
    pub last_location: Option<KnownLocation>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One multi-turn exchange with a user on one channel.
///
/// At most one conversation per (user, channel) is `Active` at any time;
/// the store enforces this at creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channel: Channel,
    pub status: ConversationStatus,
    pub state: ConversationState,
    pub context: DialogContext,
    pub created_at: Timestamp,
    pub last_message_at: Timestamp,
}

/// Immutable record of one turn, with classifier output when analyzed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: SenderType,
    pub channel: Channel,
    pub content: String,
    pub intent: Option<Intent>,
    pub entities: Option<serde_json::Value>,
    pub language: Option<Language>,
    pub created_at: Timestamp,
}

/// Follow-up bookkeeping on an interaction. Mutated only by the
/// follow-up scheduler.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpState {
    pub scheduled: bool,
    pub sent: bool,
    pub sent_at: Option<Timestamp>,
    pub response: Option<String>,
    pub response_at: Option<Timestamp>,
}

/// A recorded unit of service delivered to a user, subject to follow-up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: u64,
    pub kind: InteractionKind,
    pub status: InteractionStatus,
    pub follow_up: FollowUpState,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Reference data for one government service. Read-only from the engine's
/// perspective.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Service {
    pub id: u64,
    pub name: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub hours: Option<String>,
    pub required_documents: Option<String>,
    pub location: GeoPoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_display_and_default() {
        assert_eq!(Language::En.to_string(), "en");
        assert_eq!(Language::Rw.to_string(), "rw");
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_conversation_state_terminal() {
        assert!(ConversationState::Completed.is_terminal());
        assert!(ConversationState::Expired.is_terminal());
        assert!(!ConversationState::Initial.is_terminal());
        assert!(!ConversationState::AwaitingLocation.is_terminal());
        assert!(!ConversationState::ServiceSelection.is_terminal());
        assert!(!ConversationState::ServiceConfirmation.is_terminal());
        assert!(!ConversationState::FollowUp.is_terminal());
    }

    #[test]
    fn test_state_display_matches_serde() {
        let json = serde_json::to_string(&ConversationState::AwaitingLocation).unwrap();
        assert_eq!(json, "\"awaiting_location\"");
        assert_eq!(
            ConversationState::AwaitingLocation.to_string(),
            "awaiting_location"
        );
    }

    #[test]
    fn test_intent_serde_snake_case() {
        let json = serde_json::to_string(&Intent::FindService).unwrap();
        assert_eq!(json, "\"find_service\"");
        let back: Intent = serde_json::from_str("\"general_inquiry\"").unwrap();
        assert_eq!(back, Intent::GeneralInquiry);
    }

    #[test]
    fn test_dialog_context_round_trip() {
        let ctx = DialogContext::AwaitingLocation {
            action: PendingAction::GetDirections,
            service_type: Some(ServiceCategory::Health),
        };
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"kind\":\"awaiting_location\""));
        let back: DialogContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_dialog_context_selection_round_trip() {
        let ctx = DialogContext::ServiceSelection {
            service_ids: vec![5, 9],
        };
        let json = serde_json::to_string(&ctx).unwrap();
        let back: DialogContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_dialog_context_default_is_none() {
        assert_eq!(DialogContext::default(), DialogContext::None);
    }

    #[test]
    fn test_dialog_context_corrupt_json_fails_cleanly() {
        let result: Result<DialogContext, _> = serde_json::from_str("{\"kind\":\"bogus\"}");
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp_now_is_recent() {
        let ts = Timestamp::now();
        let now = Utc::now().timestamp();
        assert!((now - ts.0).abs() < 5);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let dt = Utc::now();
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts.to_datetime().timestamp(), dt.timestamp());
    }

    #[test]
    fn test_timestamp_ordering() {
        assert!(Timestamp(10) < Timestamp(20));
    }

    #[test]
    fn test_follow_up_state_default() {
        let fu = FollowUpState::default();
        assert!(!fu.scheduled);
        assert!(!fu.sent);
        assert!(fu.sent_at.is_none());
        assert!(fu.response.is_none());
    }

    #[test]
    fn test_interaction_kind_display() {
        assert_eq!(
            InteractionKind::DirectionRequest.to_string(),
            "direction_request"
        );
        assert_eq!(
            InteractionKind::CallConnection.to_string(),
            "call_connection"
        );
    }

    #[test]
    fn test_service_category_display() {
        assert_eq!(ServiceCategory::Health.to_string(), "health");
        assert_eq!(ServiceCategory::Identification.to_string(), "identification");
    }
}
