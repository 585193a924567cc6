//! In-memory persistence for the dialog engine.
//!
//! Each entity gets its own store behind a mutex. The stores are the only
//! place records are mutated; callers receive clones and write back through
//! the focused update methods.

pub mod conversations;
pub mod error;
pub mod followups;
pub mod interactions;
pub mod messages;
pub mod services;
pub mod users;

pub use conversations::ConversationStore;
pub use error::StoreError;
pub use followups::{FollowUpQueue, ScheduledFollowUp};
pub use interactions::InteractionStore;
pub use messages::{MessageAnalysis, MessageStore};
pub use services::ServiceStore;
pub use users::UserStore;
