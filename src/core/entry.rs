use std::fmt;

use super::math::{hypergeometric_probability, round_hundredths};

/// Id of the synthetic entry that soaks up every card not claimed by a
/// user entry.
pub const REMAINING_ENTRY_ID: &str = "entry-item-remaining";
/// Display name of the synthetic remaining entry.
pub const REMAINING_ENTRY_NAME: &str = "Remaining";

/// Unique, immutable id of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of the remaining entry.
    pub fn remaining() -> Self {
        Self(REMAINING_ENTRY_ID.to_string())
    }

    pub fn is_remaining(&self) -> bool {
        self.0 == REMAINING_ENTRY_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A named group of cards that serve the same purpose in a deck.
///
/// `probs` and `prob` are derived. After a probability pass `probs` holds
/// one value per number of copies drawn, `1..=hand_size`, followed by the
/// sum of those values, which is also stored in `prob`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    #[cfg_attr(
        feature = "serde",
        serde(deserialize_with = "crate::core::serde_utils::int_or_text")
    )]
    pub count: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::core::serde_utils::probs_or_zero")
    )]
    pub probs: Vec<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::core::serde_utils::prob_or_zero")
    )]
    pub prob: f64,
}

impl Entry {
    /// Create an entry with no tags and no derived probabilities.
    ///
    /// ```
    /// use deck_calc::core::Entry;
    ///
    /// let entry = Entry::new("entry-item-1", "Ace", 4);
    /// assert_eq!(4, entry.count);
    /// assert!(entry.probs.is_empty());
    /// ```
    pub fn new(id: impl Into<EntryId>, name: impl Into<String>, count: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            count,
            ..Default::default()
        }
    }

    /// The synthetic entry holding `count` unassigned cards.
    pub fn remaining(count: i64) -> Self {
        Self::new(EntryId::remaining(), REMAINING_ENTRY_NAME, count)
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_remaining(&self) -> bool {
        self.id.is_remaining()
    }

    /// Replace the derived probabilities with the draw table for this
    /// entry's count.
    pub fn with_probs(mut self, deck_size: i64, hand_size: i64) -> Self {
        self.probs = draw_table(deck_size, hand_size, self.count);
        self.prob = self.probs.last().copied().unwrap_or(0.0);
        self
    }
}

/// Draw table for `copies` cards.
///
/// Element `k - 1` is the chance of drawing exactly `k` copies for
/// `k` in `1..=hand_size`, rounded to hundredths. The last element is the
/// plain sum of the rounded values. That sum is not the same as the chance
/// of drawing at least one copy, and it is not meant to be.
///
/// A hand can never hold more cards than the deck, so columns past
/// `deck_size` are left out. They would all be `0.0`.
///
/// ```
/// use deck_calc::core::draw_table;
///
/// let table = draw_table(40, 5, 4);
/// assert_eq!(6, table.len());
/// assert_eq!(0.36, table[0]);
/// assert_eq!(0.07, table[1]);
/// ```
pub fn draw_table(deck_size: i64, hand_size: i64, copies: i64) -> Vec<f64> {
    let columns = hand_size.min(deck_size.max(0));
    let mut probs: Vec<f64> = (1..=columns)
        .map(|drawn| {
            round_hundredths(hypergeometric_probability(
                deck_size, hand_size, copies, drawn,
            ))
        })
        .collect();
    let total = probs.iter().sum();
    probs.push(total);
    probs
}

/// A single field edit of an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryEdit {
    Name(String),
    Count(i64),
    Tags(Vec<String>),
}

impl EntryEdit {
    /// Build a tag edit from comma separated text.
    ///
    /// ```
    /// use deck_calc::core::EntryEdit;
    ///
    /// assert_eq!(
    ///     EntryEdit::Tags(vec!["draw".to_string(), "engine".to_string()]),
    ///     EntryEdit::tags_from_text("draw, engine,")
    /// );
    /// ```
    pub fn tags_from_text(text: &str) -> Self {
        Self::Tags(parse_tags(text))
    }

    pub(crate) fn apply(self, entry: &mut Entry) {
        match self {
            EntryEdit::Name(name) => entry.name = name,
            EntryEdit::Count(count) => entry.count = count,
            EntryEdit::Tags(tags) => entry.tags = tags,
        }
    }
}

/// Split comma separated tags, trimming whitespace and dropping empty tags.
///
/// Older saved calculators kept every piece verbatim, so `"a,,b"` there
/// meant the three tags `a`, `""` and `b`. Tags read from such a file are
/// kept as they were saved, only new text goes through this split.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
