use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Invalid state transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Operation {operation} is not allowed while the session is {state}")]
    OperationNotAllowed { operation: String, state: String },

    #[error("Session is complete; start a new session")]
    SessionClosed,
}

pub type StateMachineResult<T> = Result<T, StateMachineError>;
