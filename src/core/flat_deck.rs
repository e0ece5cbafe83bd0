use std::ops::{Index, RangeFrom, RangeFull, RangeTo};

use rand::Rng;
use rand::seq::SliceRandom;

use super::combo::Combo;
use super::entry::Entry;

/// `FlatDeck` is a deck of card labels laid out one card per slot, so it
/// can be shuffled and dealt from the top.
///
/// Every card of an entry carries the entry name, unless the entry takes
/// part in a combo. Then the card carries the combo name instead, so that
/// every card counting towards a combo looks the same in a dealt hand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatDeck {
    /// Card storage.
    cards: Vec<String>,
}

impl FlatDeck {
    /// Expand entries into one label per card.
    ///
    /// The first combo with a group containing the entry wins. Entries with
    /// a count of zero or less add nothing.
    ///
    /// ```
    /// use deck_calc::core::{Combo, Entry, EntryId, FlatDeck, Group};
    ///
    /// let entries = vec![
    ///     Entry::new("entry-item-1", "Ace", 2),
    ///     Entry::new("entry-item-2", "King", 1),
    /// ];
    /// let combos = vec![Combo::new(
    ///     "combo-1",
    ///     "Royal",
    ///     vec![Group::new("combo-group-1", vec![EntryId::new("entry-item-2")])],
    /// )];
    ///
    /// let deck = FlatDeck::from_entries(&entries, &combos);
    /// assert_eq!(vec!["Ace", "Ace", "Royal"], deck[..].to_vec());
    /// ```
    pub fn from_entries(entries: &[Entry], combos: &[Combo]) -> Self {
        let mut cards = Vec::new();
        for entry in entries {
            let label = combos
                .iter()
                .find(|c| c.contains_entry(&entry.id))
                .map_or(&entry.name, |c| &c.name);
            let copies = usize::try_from(entry.count).unwrap_or(0);
            cards.extend(std::iter::repeat_n(label.clone(), copies));
        }
        Self { cards }
    }

    /// How many cards are there in the deck ?
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Is there nothing to deal ?
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Fisher–Yates shuffle of the whole deck, in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// The top `count` cards, or the whole deck if it is smaller.
    pub fn top(&self, count: usize) -> &[String] {
        &self.cards[..count.min(self.cards.len())]
    }
}

impl From<Vec<String>> for FlatDeck {
    fn from(cards: Vec<String>) -> Self {
        Self { cards }
    }
}

impl Index<usize> for FlatDeck {
    type Output = String;
    fn index(&self, index: usize) -> &String {
        &self.cards[index]
    }
}
impl Index<RangeTo<usize>> for FlatDeck {
    type Output = [String];
    fn index(&self, index: RangeTo<usize>) -> &[String] {
        &self.cards[index]
    }
}
impl Index<RangeFrom<usize>> for FlatDeck {
    type Output = [String];
    fn index(&self, index: RangeFrom<usize>) -> &[String] {
        &self.cards[index]
    }
}
impl Index<RangeFull> for FlatDeck {
    type Output = [String];
    fn index(&self, index: RangeFull) -> &[String] {
        &self.cards[index]
    }
}
