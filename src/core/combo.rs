use std::fmt;

use super::entry::{Entry, EntryId};
use super::math::at_least_one_probability;

/// Unique, immutable id of a combo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ComboId(String);

impl ComboId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComboId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComboId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ComboId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One requirement of a combo: draw at least one card out of any of the
/// member entries. `count` is the derived sum of the member counts.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub id: String,
    pub members: Vec<EntryId>,
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "crate::core::serde_utils::int_or_text")
    )]
    pub count: i64,
}

impl Group {
    pub fn new(id: impl Into<String>, members: Vec<EntryId>) -> Self {
        Self {
            id: id.into(),
            members,
            count: 0,
        }
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.members.contains(id)
    }

    /// Recount this group against `entries`.
    ///
    /// Returns `None` when any member is missing from `entries`.
    pub fn resolve(&self, entries: &[Entry]) -> Option<Group> {
        let mut count = 0;
        for member in &self.members {
            count += entries.iter().find(|e| &e.id == member)?.count;
        }
        Some(Group {
            count,
            ..self.clone()
        })
    }
}

/// A named success condition made of groups that must all be hit.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combo {
    pub id: ComboId,
    pub name: String,
    pub groups: Vec<Group>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub prob: f64,
}

impl Combo {
    pub fn new(id: impl Into<ComboId>, name: impl Into<String>, groups: Vec<Group>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            groups,
            prob: 0.0,
        }
    }

    /// Does any group of this combo reference the entry?
    pub fn contains_entry(&self, id: &EntryId) -> bool {
        self.groups.iter().any(|g| g.contains(id))
    }

    /// Recount every group against `entries`.
    ///
    /// A combo is all or nothing: if a single group no longer resolves the
    /// whole combo is gone and `None` is returned.
    ///
    /// ```
    /// use deck_calc::core::{Combo, Entry, EntryId, Group};
    ///
    /// let entries = vec![Entry::new("entry-item-1", "Ace", 4)];
    /// let combo = Combo::new(
    ///     "combo-1",
    ///     "Aces",
    ///     vec![Group::new("combo-group-1", vec![EntryId::new("entry-item-1")])],
    /// );
    ///
    /// assert_eq!(4, combo.resolve(&entries).unwrap().groups[0].count);
    /// assert!(combo.resolve(&[]).is_none());
    /// ```
    pub fn resolve(&self, entries: &[Entry]) -> Option<Combo> {
        let groups: Vec<Group> = self
            .groups
            .iter()
            .filter_map(|g| g.resolve(entries))
            .collect();
        if groups.len() != self.groups.len() {
            return None;
        }
        Some(Combo {
            groups,
            ..self.clone()
        })
    }

    /// Recount the groups that resolve, keeping the stored count for those
    /// that don't.
    pub(crate) fn recount(mut self, entries: &[Entry]) -> Self {
        for group in self.groups.iter_mut() {
            if let Some(resolved) = group.resolve(entries) {
                group.count = resolved.count;
            }
        }
        self
    }

    /// Chance of hitting every group, each group treated as independent.
    /// A combo with no groups always succeeds.
    pub fn success_probability(&self, deck_size: i64, hand_size: i64) -> f64 {
        self.groups
            .iter()
            .map(|g| at_least_one_probability(deck_size, hand_size, g.count))
            .product()
    }

    pub fn with_prob(mut self, deck_size: i64, hand_size: i64) -> Self {
        self.prob = self.success_probability(deck_size, hand_size);
        self
    }
}
