use serde::{Deserialize, Serialize};

use homies_core::{DomainError, EventId, UserId};

/// Membership row: `user_id` takes part in `event_id`.
///
/// `(event_id, user_id)` is the identity; at most one row exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Participation {
    pub event_id: EventId,
    pub user_id: UserId,
}

impl Participation {
    pub fn new(event_id: EventId, user_id: UserId) -> Self {
        Self { event_id, user_id }
    }
}

/// Result of a join request. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    /// A new membership row was created.
    Joined,
    /// The user was already a participant; nothing changed.
    AlreadyJoined,
}

/// Membership state of one (user, event) pair.
///
/// `NotJoined --join--> Joined --leave--> NotJoined`. Joining twice is a
/// no-op; leaving without having joined is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticipationState {
    #[default]
    NotJoined,
    Joined,
}

impl ParticipationState {
    pub fn from_membership(is_participant: bool) -> Self {
        if is_participant { Self::Joined } else { Self::NotJoined }
    }

    pub fn is_joined(self) -> bool {
        self == Self::Joined
    }

    pub fn join(self) -> (Self, JoinOutcome) {
        match self {
            Self::NotJoined => (Self::Joined, JoinOutcome::Joined),
            Self::Joined => (Self::Joined, JoinOutcome::AlreadyJoined),
        }
    }

    pub fn leave(self, participation: &Participation) -> Result<Self, DomainError> {
        match self {
            Self::Joined => Ok(Self::NotJoined),
            Self::NotJoined => Err(DomainError::not_found(format!(
                "participation of {} in event {}",
                participation.user_id, participation.event_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Participation {
        Participation::new(EventId::new(3), UserId::new("helper-b").unwrap())
    }

    #[test]
    fn join_is_idempotent() {
        let (state, outcome) = ParticipationState::NotJoined.join();
        assert_eq!(state, ParticipationState::Joined);
        assert_eq!(outcome, JoinOutcome::Joined);

        let (state, outcome) = state.join();
        assert_eq!(state, ParticipationState::Joined);
        assert_eq!(outcome, JoinOutcome::AlreadyJoined);
    }

    #[test]
    fn leave_requires_prior_join() {
        let err = ParticipationState::NotJoined.leave(&pair()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn join_then_leave_returns_to_not_joined_and_can_repeat() {
        let mut state = ParticipationState::default();
        for _ in 0..3 {
            state = state.join().0;
            assert!(state.is_joined());
            state = state.leave(&pair()).unwrap();
            assert!(!state.is_joined());
        }
    }
}
