//! Error type for the persistence layer.

use uuid::Uuid;

/// Errors from the entity stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Conversation not found: {0}")]
    ConversationNotFound(Uuid),
    #[error("Interaction not found: {0}")]
    InteractionNotFound(Uuid),
    #[error("Service not found: {0}")]
    ServiceNotFound(u64),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Map a poisoned lock into a backend error.
    pub(crate) fn poisoned<T>(err: std::sync::PoisonError<T>) -> Self {
        StoreError::Backend(format!("lock poisoned: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let id = Uuid::nil();
        assert_eq!(
            StoreError::UserNotFound(id).to_string(),
            format!("User not found: {}", id)
        );
        assert_eq!(
            StoreError::ServiceNotFound(7).to_string(),
            "Service not found: 7"
        );
        assert_eq!(
            StoreError::Backend("disk full".into()).to_string(),
            "Storage backend error: disk full"
        );
    }
}
