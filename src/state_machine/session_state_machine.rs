use super::{
    errors::{StateMachineError, StateMachineResult},
    events::SessionEvent,
    states::SessionState,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Caller-facing operations a session accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOperation {
    LoadFirstBatch,
    CompleteOne,
    LoadNextBatch,
}

impl SessionOperation {
    /// The only state each operation may start from
    pub fn allowed_from(&self) -> SessionState {
        match self {
            Self::LoadFirstBatch => SessionState::Idle,
            Self::CompleteOne => SessionState::BatchLoaded,
            Self::LoadNextBatch => SessionState::BatchExhausted,
        }
    }
}

impl fmt::Display for SessionOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFirstBatch => write!(f, "load_first_batch"),
            Self::CompleteOne => write!(f, "complete_one"),
            Self::LoadNextBatch => write!(f, "load_next_batch"),
        }
    }
}

/// One recorded state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTransition {
    pub from: SessionState,
    pub to: SessionState,
    pub event: SessionEvent,
}

/// In-memory state machine for a single calling session
#[derive(Debug, Clone, Default)]
pub struct SessionStateMachine {
    current: SessionState,
    history: Vec<SessionTransition>,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_state(&self) -> SessionState {
        self.current
    }

    pub fn history(&self) -> &[SessionTransition] {
        &self.history
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// Fail unless `operation` may run in the current state. Checked before
    /// any store access so a rejected call has no side effects.
    pub fn ensure_allowed(&self, operation: SessionOperation) -> StateMachineResult<()> {
        if self.current.is_terminal() {
            return Err(StateMachineError::SessionClosed);
        }
        if self.current != operation.allowed_from() {
            return Err(StateMachineError::OperationNotAllowed {
                operation: operation.to_string(),
                state: self.current.to_string(),
            });
        }
        Ok(())
    }

    /// Apply an event and return the new state
    pub fn transition(&mut self, event: SessionEvent) -> StateMachineResult<SessionState> {
        let from = self.current;
        let to = Self::determine_target_state(from, &event)?;
        debug!(from = %from, to = %to, event = event.event_type(), "Session transition");
        self.history.push(SessionTransition { from, to, event });
        self.current = to;
        Ok(to)
    }

    /// Transition table
    pub fn determine_target_state(
        current_state: SessionState,
        event: &SessionEvent,
    ) -> StateMachineResult<SessionState> {
        let target = match (current_state, event) {
            (SessionState::SessionComplete, _) => return Err(StateMachineError::SessionClosed),

            // Loads
            (SessionState::Idle, SessionEvent::BatchLoaded(_)) => SessionState::BatchLoaded,
            (SessionState::BatchExhausted, SessionEvent::BatchLoaded(_)) => SessionState::BatchLoaded,
            (SessionState::Idle, SessionEvent::NothingPending) => SessionState::SessionComplete,
            (SessionState::BatchExhausted, SessionEvent::NothingPending) => {
                SessionState::SessionComplete
            }

            // Completions
            (SessionState::BatchLoaded, SessionEvent::ContactCompleted) => SessionState::BatchLoaded,
            (SessionState::BatchLoaded, SessionEvent::LastContactCompleted) => {
                SessionState::BatchExhausted
            }

            (from_state, _) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from_state.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        assert_eq!(
            SessionStateMachine::determine_target_state(SessionState::Idle, &SessionEvent::BatchLoaded(3))
                .unwrap(),
            SessionState::BatchLoaded
        );
        assert_eq!(
            SessionStateMachine::determine_target_state(SessionState::Idle, &SessionEvent::NothingPending)
                .unwrap(),
            SessionState::SessionComplete
        );
        assert_eq!(
            SessionStateMachine::determine_target_state(
                SessionState::BatchLoaded,
                &SessionEvent::LastContactCompleted
            )
            .unwrap(),
            SessionState::BatchExhausted
        );
        assert_eq!(
            SessionStateMachine::determine_target_state(
                SessionState::BatchExhausted,
                &SessionEvent::BatchLoaded(1)
            )
            .unwrap(),
            SessionState::BatchLoaded
        );
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(matches!(
            SessionStateMachine::determine_target_state(
                SessionState::Idle,
                &SessionEvent::ContactCompleted
            ),
            Err(StateMachineError::InvalidTransition { .. })
        ));
        assert!(matches!(
            SessionStateMachine::determine_target_state(
                SessionState::SessionComplete,
                &SessionEvent::BatchLoaded(2)
            ),
            Err(StateMachineError::SessionClosed)
        ));
        assert!(SessionStateMachine::determine_target_state(
            SessionState::BatchLoaded,
            &SessionEvent::BatchLoaded(2)
        )
        .is_err());
    }

    #[test]
    fn test_operation_guards() {
        let mut machine = SessionStateMachine::new();
        assert!(machine.ensure_allowed(SessionOperation::LoadFirstBatch).is_ok());
        assert!(matches!(
            machine.ensure_allowed(SessionOperation::CompleteOne),
            Err(StateMachineError::OperationNotAllowed { .. })
        ));

        machine.transition(SessionEvent::for_batch(2)).unwrap();
        assert!(machine.ensure_allowed(SessionOperation::CompleteOne).is_ok());
        assert!(machine.ensure_allowed(SessionOperation::LoadNextBatch).is_err());

        machine.transition(SessionEvent::for_completion(1)).unwrap();
        machine.transition(SessionEvent::for_completion(0)).unwrap();
        assert_eq!(machine.current_state(), SessionState::BatchExhausted);
        assert!(machine.ensure_allowed(SessionOperation::LoadNextBatch).is_ok());

        machine.transition(SessionEvent::for_batch(0)).unwrap();
        assert!(machine.is_terminal());
        assert_eq!(
            machine.ensure_allowed(SessionOperation::LoadNextBatch),
            Err(StateMachineError::SessionClosed)
        );
        assert_eq!(machine.history().len(), 4);
    }
}
