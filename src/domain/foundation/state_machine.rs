//! State machine trait for lifecycle enums.

use super::ValidationError;

/// Trait for enums whose values form a closed set of lifecycle states.
///
/// Implementors list the legal edges; validated transitions and terminal
/// detection come for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if moving from self to target is a legal edge.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns every state reachable in one step from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs the transition, returning error if the edge does not exist.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "session_state",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// True when no outgoing transitions exist.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
