//! Dialogue state machine module
//!
//! Provides an explicit state machine with two states:
//! - Idle: waiting for a new command
//! - AwaitingClarification: a general or location question is outstanding
//!
//! Backend responses are parsed into an `Intent` whose transition decides
//! the next state and the action the user observes.

mod intent;
mod machine;
mod prompt;

pub use machine::{Action, DialogueMachine, TurnOutcome};
