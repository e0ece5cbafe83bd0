//! Shuffle based simulations of a deck.
//!
//! Unlike the probability pass these results are not repeatable unless the
//! random number generator is seeded. Every function here takes the rng as
//! an argument for that reason.

/// Most frequent opening hand.
mod opening_hand;
pub use self::opening_hand::OpeningHandSimulation;
