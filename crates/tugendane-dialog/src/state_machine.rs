//! Conversation state machine with validated transitions.
//!
//! Enforces the allowed dialog transitions:
//! Initial -> AwaitingLocation/ServiceSelection/ServiceConfirmation/FollowUp
//! FollowUp -> Initial/AwaitingLocation/ServiceSelection/ServiceConfirmation
//! AwaitingLocation -> Initial/ServiceSelection/ServiceConfirmation
//! ServiceSelection/ServiceConfirmation -> Initial
//! any non-terminal -> Completed/Expired
//!
//! A parked follow-up question does not trap the user: any new request
//! from `follow_up` can start a fresh flow.

use tugendane_core::ConversationState;

use crate::error::DialogError;

/// Validate that a dialog state transition is allowed.
///
/// Staying in the same state is not a transition; callers skip validation
/// when the state is unchanged.
pub fn validate_transition(
    from: ConversationState,
    to: ConversationState,
) -> Result<(), DialogError> {
    use ConversationState::*;

    let valid = matches!(
        (from, to),
        (Initial, AwaitingLocation)
            | (Initial, ServiceSelection)
            | (Initial, ServiceConfirmation)
            | (Initial, FollowUp)
            | (Initial, Completed)
            | (Initial, Expired)
            | (AwaitingLocation, Initial)
            | (AwaitingLocation, ServiceSelection)
            | (AwaitingLocation, ServiceConfirmation)
            | (AwaitingLocation, Completed)
            | (AwaitingLocation, Expired)
            | (ServiceSelection, Initial)
            | (ServiceSelection, Completed)
            | (ServiceSelection, Expired)
            | (ServiceConfirmation, Initial)
            | (ServiceConfirmation, Completed)
            | (ServiceConfirmation, Expired)
            | (FollowUp, Initial)
            | (FollowUp, AwaitingLocation)
            | (FollowUp, ServiceSelection)
            | (FollowUp, ServiceConfirmation)
            | (FollowUp, Completed)
            | (FollowUp, Expired)
    );

    if valid {
        Ok(())
    } else {
        Err(DialogError::InvalidTransition(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConversationState::*;

    // =====================================================================
    // Valid transitions
    // =====================================================================

    #[test]
    fn test_initial_fans_out() {
        assert!(validate_transition(Initial, AwaitingLocation).is_ok());
        assert!(validate_transition(Initial, ServiceSelection).is_ok());
        assert!(validate_transition(Initial, ServiceConfirmation).is_ok());
        assert!(validate_transition(Initial, FollowUp).is_ok());
    }

    #[test]
    fn test_awaiting_location_resumes_pending_action() {
        assert!(validate_transition(AwaitingLocation, ServiceSelection).is_ok());
        assert!(validate_transition(AwaitingLocation, ServiceConfirmation).is_ok());
        assert!(validate_transition(AwaitingLocation, Initial).is_ok());
    }

    #[test]
    fn test_selection_states_return_to_initial() {
        assert!(validate_transition(ServiceSelection, Initial).is_ok());
        assert!(validate_transition(ServiceConfirmation, Initial).is_ok());
        assert!(validate_transition(FollowUp, Initial).is_ok());
    }

    #[test]
    fn test_follow_up_allows_fresh_requests() {
        // Ignoring a pending check-in and starting a new flow is legal.
        assert!(validate_transition(FollowUp, AwaitingLocation).is_ok());
        assert!(validate_transition(FollowUp, ServiceSelection).is_ok());
        assert!(validate_transition(FollowUp, ServiceConfirmation).is_ok());
    }

    #[test]
    fn test_every_non_terminal_can_complete_or_expire() {
        for from in [
            Initial,
            AwaitingLocation,
            ServiceSelection,
            ServiceConfirmation,
            FollowUp,
        ] {
            assert!(validate_transition(from, Completed).is_ok());
            assert!(validate_transition(from, Expired).is_ok());
        }
    }

    // =====================================================================
    // Invalid transitions
    // =====================================================================

    #[test]
    fn test_awaiting_location_to_follow_up_invalid() {
        assert!(validate_transition(AwaitingLocation, FollowUp).is_err());
    }

    #[test]
    fn test_selection_to_selection_like_states_invalid() {
        assert!(validate_transition(ServiceSelection, AwaitingLocation).is_err());
        assert!(validate_transition(ServiceSelection, ServiceConfirmation).is_err());
        assert!(validate_transition(ServiceConfirmation, ServiceSelection).is_err());
        assert!(validate_transition(ServiceConfirmation, AwaitingLocation).is_err());
    }

    #[test]
    fn test_same_state_is_not_a_transition() {
        for state in [Initial, AwaitingLocation, ServiceSelection] {
            assert!(validate_transition(state, state).is_err());
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for from in [Completed, Expired] {
            for to in [
                Initial,
                AwaitingLocation,
                ServiceSelection,
                ServiceConfirmation,
                FollowUp,
                Completed,
                Expired,
            ] {
                assert!(validate_transition(from, to).is_err());
            }
        }
    }

    #[test]
    fn test_all_valid_transitions_count() {
        let all = [
            Initial,
            AwaitingLocation,
            ServiceSelection,
            ServiceConfirmation,
            FollowUp,
            Completed,
            Expired,
        ];
        let mut valid_count = 0;
        for from in &all {
            for to in &all {
                if validate_transition(*from, *to).is_ok() {
                    valid_count += 1;
                }
            }
        }
        assert_eq!(valid_count, 23, "Expected exactly 23 valid transitions");
    }

    #[test]
    fn test_invalid_transition_error_message() {
        let err = validate_transition(Completed, Initial).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("completed"));
        assert!(msg.contains("initial"));
    }
}
