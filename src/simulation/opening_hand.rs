use std::collections::HashMap;

use rand::Rng;

use crate::core::{Combo, Entry, FlatDeck};

/// Monte carlo estimate of the opening hand a deck deals most often.
#[derive(Debug)]
pub struct OpeningHandSimulation {
    /// Flattened deck. It is not reset between hands, each hand starts
    /// from the order the previous one left behind.
    deck: FlatDeck,
    hand_size: usize,
    shuffles_per_hand: u32,
}

impl OpeningHandSimulation {
    /// Build a simulation over a deck made from `entries`, with cards of
    /// combo members labeled by their combo.
    ///
    /// A negative hand size deals nothing. A hand larger than the deck
    /// deals the whole deck.
    pub fn new(entries: &[Entry], combos: &[Combo], hand_size: i64, shuffles_per_hand: u32) -> Self {
        Self::with_deck(
            FlatDeck::from_entries(entries, combos),
            hand_size,
            shuffles_per_hand,
        )
    }

    pub fn with_deck(deck: FlatDeck, hand_size: i64, shuffles_per_hand: u32) -> Self {
        Self {
            deck,
            hand_size: usize::try_from(hand_size).unwrap_or(0),
            shuffles_per_hand,
        }
    }

    pub fn deck(&self) -> &FlatDeck {
        &self.deck
    }

    /// Shuffle the deck `shuffles_per_hand` times and deal one hand.
    ///
    /// The hand comes back sorted, so every ordering of the same cards is
    /// the same hand.
    pub fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<String> {
        for _ in 0..self.shuffles_per_hand {
            self.deck.shuffle(rng);
        }
        let mut hand = self.deck.top(self.hand_size).to_vec();
        hand.sort();
        hand
    }

    /// Deal `total_hands` hands and return the one seen most often.
    ///
    /// Ties go to the hand that showed up first. No hands at all gives an
    /// empty hand.
    ///
    /// ```
    /// use deck_calc::core::Entry;
    /// use deck_calc::simulation::OpeningHandSimulation;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let entries = vec![Entry::new("entry-item-1", "Ace", 40)];
    /// let mut sim = OpeningHandSimulation::new(&entries, &[], 5, 1);
    /// let mut rng = StdRng::seed_from_u64(420);
    ///
    /// assert_eq!(vec!["Ace"; 5], sim.most_frequent_hand(100, &mut rng));
    /// ```
    pub fn most_frequent_hand<R: Rng + ?Sized>(
        &mut self,
        total_hands: u32,
        rng: &mut R,
    ) -> Vec<String> {
        // Hands in the order first seen, and where each lives in `seen`.
        let mut seen: Vec<(Vec<String>, u32)> = Vec::new();
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();

        for _ in 0..total_hands {
            let hand = self.deal(rng);
            match index.get(&hand) {
                Some(&idx) => seen[idx].1 += 1,
                None => {
                    index.insert(hand.clone(), seen.len());
                    seen.push((hand, 1));
                }
            }
        }

        seen.into_iter()
            .fold(None, |best: Option<(Vec<String>, u32)>, (hand, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((hand, count)),
            })
            .map(|(hand, _)| hand)
            .unwrap_or_default()
    }
}
