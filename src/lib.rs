//! deck_calc works out how a deck of cards is likely to draw.
//!
//! A deck is split into named entries with card counts. For each entry the
//! library computes the chance of drawing exactly one, two, ... copies in an
//! opening hand. Entries can be tagged and combined into combos, which get
//! their own success rates, and a shuffle simulation finds the opening hand
//! that comes up most often.
//!
//! Edits flow through a small state machine, see [`machine`]. The
//! [`calculator::Calculator`] drives that machine and runs the heavy work
//! on background threads.

/// Everything in core is plain data and pure functions: the counting
/// primitives, entries, combos and the calculator context.
pub mod core;
/// The state machine that every edit goes through.
pub mod machine;
/// The probability pass.
pub mod probability;
/// Opening hand simulations.
pub mod simulation;
/// Drives the state machine and its background work.
pub mod calculator;

/// Reading and writing `.dcalc` files.
#[cfg(feature = "serde")]
pub mod snapshot;
