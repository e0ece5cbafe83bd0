//! The calculator state machine.
//!
//! All edits flow through [`Machine::reduce`] one at a time. Entering
//! [`State::Calculating`] or [`State::CalculatingHand`] owes one piece of
//! background work, described by [`Effect`]. Running that work is left to
//! the caller, see [`crate::calculator::Calculator`].

mod event;
mod state;

pub use event::Event;
pub use state::{Effect, Machine, State};
