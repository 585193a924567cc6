//! Dialog orchestration for Tugendane: conversation state machine, localized
//! response composition, follow-up scheduling, and session routing.

pub mod engine;
pub mod error;
pub mod followup;
pub mod responses;
pub mod router;
pub mod state_machine;
pub mod transport;

pub use engine::{DialogEngine, TurnOutcome};
pub use error::{DialogError, FollowUpError, RouterError};
pub use followup::FollowUpScheduler;
pub use router::SessionRouter;
pub use state_machine::validate_transition;
pub use transport::{MemoryTransport, Transport, TransportError};
