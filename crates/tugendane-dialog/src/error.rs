//! Error types for the dialog layer.

use tugendane_core::ConversationState;
use tugendane_geo::LocatorError;
use tugendane_store::StoreError;

use crate::transport::TransportError;

/// Errors from the dialog engine itself.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Invalid state transition: {0} -> {1}")]
    InvalidTransition(ConversationState, ConversationState),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Locator(#[from] LocatorError),
}

/// Errors from the follow-up scheduler.
#[derive(Debug, thiserror::Error)]
pub enum FollowUpError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors surfaced to the channel adapters by the session router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Invalid inbound request: {0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Dialog(#[from] DialogError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    FollowUp(#[from] FollowUpError),
}
