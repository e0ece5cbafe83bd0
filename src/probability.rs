//! The probability pass.
//!
//! [`calculate_probs`] reads a context and produces every derived
//! probability at once. Nothing is written back here: the result travels to
//! the state machine as a single [`ProbabilityReport`] so the context never
//! shows a half updated set of numbers.

use crate::core::{CalculatorContext, Combo, Entry, TagGroup};

/// Every probability derived from a context.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbabilityReport {
    /// Real entries followed by the remaining entry, all with draw tables.
    pub entries: Vec<Entry>,
    pub tag_groups: Vec<TagGroup>,
    pub tag_success_rate: f64,
    pub combos: Vec<Combo>,
    pub total_combo_prob: f64,
}

/// Compute draw tables, combo chances and tag chances for a context.
///
/// Combos and tags are combined as if independent: the chance that at
/// least one of them comes through is `1 - Π(1 - p)`.
///
/// ```
/// use deck_calc::core::{CalculatorContext, Entry};
/// use deck_calc::probability::calculate_probs;
///
/// let context = CalculatorContext {
///     entries: vec![Entry::new("entry-item-1", "Ace", 4)],
///     ..Default::default()
/// };
/// let report = calculate_probs(&context);
///
/// assert_eq!(2, report.entries.len());
/// assert_eq!(0.36, report.entries[0].probs[0]);
/// assert_eq!(36, report.entries[1].count);
/// ```
pub fn calculate_probs(context: &CalculatorContext) -> ProbabilityReport {
    let CalculatorContext {
        deck_size,
        hand_size,
        ..
    } = *context;

    let real_entries: Vec<Entry> = context
        .real_entries()
        .map(|e| e.clone().with_probs(deck_size, hand_size))
        .collect();
    let total: i64 = real_entries.iter().map(|e| e.count).sum();
    let remaining = Entry::remaining(deck_size - total).with_probs(deck_size, hand_size);

    let combos: Vec<Combo> = context
        .combos
        .iter()
        .map(|c| c.clone().with_prob(deck_size, hand_size))
        .collect();
    let total_combo_prob = any_success(combos.iter().map(|c| c.prob));

    let tag_groups = tag_groups(&real_entries);
    let tag_success_rate = any_success(tag_groups.iter().map(|t| t.prob));

    let mut entries = real_entries;
    entries.push(remaining);

    ProbabilityReport {
        entries,
        tag_groups,
        tag_success_rate,
        combos,
        total_combo_prob,
    }
}

/// Multiply the totals of every entry carrying the same tag.
///
/// Tags keep the order in which they are first seen.
pub fn tag_groups(entries: &[Entry]) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();
    for entry in entries {
        for tag in &entry.tags {
            match groups.iter_mut().find(|g| &g.tag == tag) {
                Some(group) => group.prob *= entry.prob,
                None => groups.push(TagGroup {
                    tag: tag.clone(),
                    prob: entry.prob,
                }),
            }
        }
    }
    groups
}

/// `1 - Π(1 - p)`, zero for no inputs.
fn any_success(probs: impl Iterator<Item = f64>) -> f64 {
    1.0 - probs.map(|p| 1.0 - p).product::<f64>()
}
