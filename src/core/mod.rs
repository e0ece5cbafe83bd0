//! This is the core module. It exports the deck model and the counting
//! code everything else is built on.

/// Factorials, permutations, combinations and draw probabilities.
mod math;
/// Export the primitives.
pub use self::math::{
    at_least_one_probability, combination, factorial, hypergeometric_probability, permutation,
};

/// Entries are named groups of cards.
mod entry;
/// Export `Entry` and friends.
pub use self::entry::{
    Entry, EntryEdit, EntryId, REMAINING_ENTRY_ID, REMAINING_ENTRY_NAME, draw_table, parse_tags,
};

/// Combos are made of groups of entries.
mod combo;
pub use self::combo::{Combo, ComboId, Group};

/// Table headers.
mod header;
pub use self::header::{
    Column, DisplayHeader, Header, HeaderEdit, display_headers, display_headers_for_deck,
    input_headers,
};

/// The calculator context and the operations keeping it consistent.
mod context;
pub use self::context::{
    CalculatorContext, DEFAULT_DECK_SIZE, DEFAULT_HAND_SIZE, DEFAULT_TOTAL_HANDS,
    DEFAULT_TOTAL_SHUFFLES, ORIGINAL_ENTRY_ID, Snapshot, TagGroup,
};

/// Flattened deck of card labels.
mod flat_deck;
pub use self::flat_deck::FlatDeck;

/// Lenient readers for saved calculators.
#[cfg(feature = "serde")]
mod serde_utils;

/// Error type.
mod error;
pub use self::error::DeckCalcError;
