use tracing::event;

use super::combo::{Combo, ComboId};
use super::entry::{Entry, EntryId};
use super::header::{DisplayHeader, Header, display_headers, input_headers};

/// Default number of cards in an opening hand.
pub const DEFAULT_HAND_SIZE: i64 = 5;
/// Default number of cards in the deck.
pub const DEFAULT_DECK_SIZE: i64 = 40;
/// Default number of hands dealt by the opening hand simulation.
pub const DEFAULT_TOTAL_HANDS: u32 = 100;
/// Default number of full shuffles before each simulated hand.
pub const DEFAULT_TOTAL_SHUFFLES: u32 = 1;
/// Id of the blank entry a fresh calculator starts with.
pub const ORIGINAL_ENTRY_ID: &str = "entry-item-original";

/// Joint chance for every entry sharing a tag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "TagGroupRepr"))]
pub struct TagGroup {
    pub tag: String,
    pub prob: f64,
}

/// Saved tag groups are either objects or `[tag, prob]` pairs.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum TagGroupRepr {
    Object { tag: String, prob: Option<f64> },
    Pair(String, Option<f64>),
}

#[cfg(feature = "serde")]
impl From<TagGroupRepr> for TagGroup {
    fn from(repr: TagGroupRepr) -> Self {
        let (tag, prob) = match repr {
            TagGroupRepr::Object { tag, prob } => (tag, prob),
            TagGroupRepr::Pair(tag, prob) => (tag, prob),
        };
        TagGroup {
            tag,
            prob: prob.unwrap_or(0.0),
        }
    }
}

/// Everything the calculator knows.
///
/// User owned data (entries, combos, sizes, simulation settings, headers)
/// lives next to the derived results of the last probability pass and the
/// last simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct CalculatorContext {
    pub entries: Vec<Entry>,
    pub combos: Vec<Combo>,
    pub hand_size: i64,
    pub deck_size: i64,
    pub total_hands: u32,
    pub total_shuffles: u32,
    pub input_headers: Vec<Header>,
    pub display_headers: Vec<DisplayHeader>,
    pub tag_groups: Vec<TagGroup>,
    pub tag_success_rate: f64,
    pub total_combo_prob: f64,
    pub average_opening: Vec<String>,
}

impl Default for CalculatorContext {
    fn default() -> Self {
        Self {
            entries: vec![Entry::new(ORIGINAL_ENTRY_ID, "", 0)],
            combos: vec![],
            hand_size: DEFAULT_HAND_SIZE,
            deck_size: DEFAULT_DECK_SIZE,
            total_hands: DEFAULT_TOTAL_HANDS,
            total_shuffles: DEFAULT_TOTAL_SHUFFLES,
            input_headers: input_headers(),
            display_headers: display_headers(DEFAULT_HAND_SIZE),
            tag_groups: vec![],
            tag_success_rate: 0.0,
            total_combo_prob: 0.0,
            average_opening: vec![],
        }
    }
}

impl CalculatorContext {
    /// Entries owned by the user, everything but the remaining entry.
    pub fn real_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| !e.is_remaining())
    }

    /// Sum of the counts of every real entry.
    pub fn real_total(&self) -> i64 {
        self.real_entries().map(|e| e.count).sum()
    }

    pub fn remaining(&self) -> Option<&Entry> {
        self.entries.iter().find(|e| e.is_remaining())
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn combo(&self, id: &ComboId) -> Option<&Combo> {
        self.combos.iter().find(|c| &c.id == id)
    }

    /// Rebuild the remaining entry and revalidate every combo.
    ///
    /// The remaining entry is moved to the end of `entries` with
    /// `deck_size - real_total` cards and a fresh draw table. Each combo has
    /// its group counts recomputed, and a combo with any group that no
    /// longer resolves is removed.
    ///
    /// ```
    /// use deck_calc::core::{CalculatorContext, Entry};
    ///
    /// let mut context = CalculatorContext::default();
    /// context.entries = vec![Entry::new("entry-item-1", "Ace", 4)];
    /// let context = context.recompute_remaining();
    ///
    /// assert_eq!(36, context.remaining().unwrap().count);
    /// ```
    pub fn recompute_remaining(self) -> Self {
        let Self {
            entries,
            combos,
            deck_size,
            hand_size,
            ..
        } = &self;

        let mut updated_entries: Vec<Entry> =
            entries.iter().filter(|e| !e.is_remaining()).cloned().collect();
        let total: i64 = updated_entries.iter().map(|e| e.count).sum();
        updated_entries.push(Entry::remaining(deck_size - total).with_probs(*deck_size, *hand_size));

        let updated_combos: Vec<Combo> = combos
            .iter()
            .filter_map(|combo| {
                let resolved = combo.resolve(&updated_entries);
                if resolved.is_none() {
                    event!(
                        tracing::Level::TRACE,
                        combo = %combo.id,
                        "Dropping combo with unresolved group"
                    );
                }
                resolved
            })
            .collect();

        Self {
            entries: updated_entries,
            combos: updated_combos,
            ..self
        }
    }

    /// Can a probability pass run on this context?
    ///
    /// Needs a positive deck, a hand that fits in it, at least one card in
    /// a real entry, and no real entry larger than the deck.
    pub fn is_valid_for_compute(&self) -> bool {
        let has_valid_deck_size = self.deck_size > 0;
        let has_valid_hand_size = self.hand_size > 0 && self.hand_size <= self.deck_size;
        let has_entries = self.real_total() > 0;
        let has_valid_entries = self.real_entries().all(|e| e.count <= self.deck_size);

        has_valid_deck_size && has_valid_hand_size && has_entries && has_valid_entries
    }

    /// Shallow merge: every field present in the snapshot replaces the
    /// current value, every absent field is left alone.
    pub fn merge(mut self, snapshot: Snapshot) -> Self {
        let Snapshot {
            entries,
            combos,
            hand_size,
            deck_size,
            total_hands,
            total_shuffles,
            input_headers,
            display_headers,
            tag_groups,
            tag_success_rate,
            total_combo_prob,
            average_opening,
        } = snapshot;

        if let Some(entries) = entries {
            self.entries = entries;
        }
        if let Some(combos) = combos {
            self.combos = combos;
        }
        if let Some(hand_size) = hand_size {
            self.hand_size = hand_size;
        }
        if let Some(deck_size) = deck_size {
            self.deck_size = deck_size;
        }
        if let Some(total_hands) = total_hands {
            self.total_hands = total_hands;
        }
        if let Some(total_shuffles) = total_shuffles {
            self.total_shuffles = total_shuffles;
        }
        if let Some(input_headers) = input_headers {
            self.input_headers = input_headers;
        }
        if let Some(display_headers) = display_headers {
            self.display_headers = display_headers;
        }
        if let Some(tag_groups) = tag_groups {
            self.tag_groups = tag_groups;
        }
        if let Some(tag_success_rate) = tag_success_rate {
            self.tag_success_rate = tag_success_rate;
        }
        if let Some(total_combo_prob) = total_combo_prob {
            self.total_combo_prob = total_combo_prob;
        }
        if let Some(average_opening) = average_opening {
            self.average_opening = average_opening;
        }
        self
    }
}

/// A possibly partial context, as read from a saved `.dcalc` file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Snapshot {
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub entries: Option<Vec<Entry>>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub combos: Option<Vec<Combo>>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional_int_or_text"
        )
    )]
    pub hand_size: Option<i64>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional_int_or_text"
        )
    )]
    pub deck_size: Option<i64>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional_int_or_text"
        )
    )]
    pub total_hands: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional_int_or_text"
        )
    )]
    pub total_shuffles: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub input_headers: Option<Vec<Header>>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub display_headers: Option<Vec<DisplayHeader>>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub tag_groups: Option<Vec<TagGroup>>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub tag_success_rate: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub total_combo_prob: Option<f64>,
    #[cfg_attr(
        feature = "serde",
        serde(
            skip_serializing_if = "Option::is_none",
            deserialize_with = "crate::core::serde_utils::optional"
        )
    )]
    pub average_opening: Option<Vec<String>>,
}

impl From<CalculatorContext> for Snapshot {
    fn from(context: CalculatorContext) -> Self {
        Self {
            entries: Some(context.entries),
            combos: Some(context.combos),
            hand_size: Some(context.hand_size),
            deck_size: Some(context.deck_size),
            total_hands: Some(context.total_hands),
            total_shuffles: Some(context.total_shuffles),
            input_headers: Some(context.input_headers),
            display_headers: Some(context.display_headers),
            tag_groups: Some(context.tag_groups),
            tag_success_rate: Some(context.tag_success_rate),
            total_combo_prob: Some(context.total_combo_prob),
            average_opening: Some(context.average_opening),
        }
    }
}
