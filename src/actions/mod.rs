//! Action dispatch
//!
//! Turns a resolved `Action` into exactly one side effect: speech or typing.

mod dispatcher;

pub use dispatcher::ActionDispatcher;
