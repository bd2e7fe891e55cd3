// Session state machine for calling sessions
//
// A calling session moves Idle -> BatchLoaded, loops through BatchExhausted
// and BatchLoaded while contacts remain, and ends in SessionComplete.

pub mod errors;
pub mod events;
pub mod session_state_machine;
pub mod states;

pub use errors::{StateMachineError, StateMachineResult};
pub use events::SessionEvent;
pub use session_state_machine::{SessionOperation, SessionStateMachine, SessionTransition};
pub use states::SessionState;
