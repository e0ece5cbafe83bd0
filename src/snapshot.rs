//! Saving and loading calculators as `.dcalc` files.
//!
//! A `.dcalc` file is the JSON form of a [`CalculatorContext`]. Nothing is
//! validated on the way in: a file only has to be a JSON object. Any field
//! it leaves out, or that can't be read, keeps its current value when it is
//! loaded. Counts and sizes saved as text are read as numbers.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::event;

use crate::calculator::Calculator;
use crate::core::{CalculatorContext, DeckCalcError, Snapshot};
use crate::machine::Event;

/// File extension of saved calculators.
pub const SNAPSHOT_EXTENSION: &str = "dcalc";
/// Mime type of saved calculators.
pub const SNAPSHOT_MIME_TYPE: &str = "application/json";
/// File name used when none is given.
pub const DEFAULT_SNAPSHOT_FILE: &str = "settings.dcalc";

/// Serialize a context the way it is written to disk.
pub fn to_json(context: &CalculatorContext) -> Result<String, DeckCalcError> {
    Ok(serde_json::to_string(context)?)
}

/// Parse a possibly partial saved context.
///
/// ```
/// use deck_calc::snapshot::from_json;
///
/// let snapshot = from_json(r#"{"deckSize": 60, "totalHands": 250}"#).unwrap();
/// assert_eq!(Some(60), snapshot.deck_size);
/// assert_eq!(Some(250), snapshot.total_hands);
/// assert!(snapshot.entries.is_none());
/// ```
pub fn from_json(json: &str) -> Result<Snapshot, DeckCalcError> {
    Ok(serde_json::from_str(json)?)
}

/// Write `context` to `path`, replacing any existing file.
pub fn save_snapshot(path: &Path, context: &CalculatorContext) -> Result<(), DeckCalcError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, context)?;
    writer.flush()?;
    event!(tracing::Level::DEBUG, path = %path.display(), "Saved calculator");
    Ok(())
}

/// Read a saved calculator from `path`.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, DeckCalcError> {
    let json = fs::read_to_string(path)?;
    let snapshot = from_json(&json)?;
    event!(tracing::Level::DEBUG, path = %path.display(), "Loaded calculator");
    Ok(snapshot)
}

impl Calculator {
    /// Load a saved calculator and merge it into the current context.
    ///
    /// Like every edit this only applies while the calculator is idle.
    pub fn load_snapshot(&mut self, path: &Path) -> Result<(), DeckCalcError> {
        let snapshot = load_snapshot(path)?;
        self.send(Event::LoadContext(Box::new(snapshot)));
        Ok(())
    }

    /// Save the current context.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), DeckCalcError> {
        save_snapshot(path, self.context())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::CalculatorBuilder;
    use crate::core::{Combo, Entry, EntryId, Group};
    use tempfile::NamedTempFile;

    fn context() -> CalculatorContext {
        CalculatorContext {
            entries: vec![Entry::new("entry-item-1", "Ace", 4).with_tags(["starter"])],
            combos: vec![Combo::new(
                "combo-1",
                "Aces",
                vec![Group::new("combo-group-1", vec![EntryId::new("entry-item-1")])],
            )],
            deck_size: 60,
            ..Default::default()
        }
    }

    #[test]
    fn test_save_then_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        save_snapshot(path, &context()).unwrap();
        let snapshot = load_snapshot(path).unwrap();

        assert_eq!(context(), CalculatorContext::default().merge(snapshot));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = to_json(&context().recompute_remaining()).unwrap();
        assert!(json.contains("\"deckSize\":60"));
        assert!(json.contains("\"handSize\":5"));
        assert!(json.contains("\"totalComboProb\""));
        assert!(json.contains("\"averageOpening\""));
        assert!(json.contains("\"entry-item-remaining\""));
    }

    #[test]
    fn test_partial_file_only_sets_present_fields() {
        let snapshot = from_json(r#"{"handSize": 7}"#).unwrap();
        let merged = context().merge(snapshot);
        assert_eq!(7, merged.hand_size);
        assert_eq!(60, merged.deck_size);
        assert_eq!("Ace", merged.entries[0].name);
    }

    #[test]
    fn test_entries_without_derived_fields() {
        let snapshot =
            from_json(r#"{"entries": [{"id": "entry-item-1", "name": "Ace", "count": 4}]}"#)
                .unwrap();
        let entries = snapshot.entries.unwrap();
        assert!(entries[0].tags.is_empty());
        assert!(entries[0].probs.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(matches!(
            from_json(r#"{"deckSize": 40"#),
            Err(DeckCalcError::SnapshotFormat(_))
        ));
        assert!(matches!(
            from_json("42"),
            Err(DeckCalcError::SnapshotFormat(_))
        ));

        let temp_file = NamedTempFile::new().unwrap();
        let missing = temp_file.path().with_extension(SNAPSHOT_EXTENSION);
        assert!(matches!(
            load_snapshot(&missing),
            Err(DeckCalcError::IOError(_))
        ));
    }

    #[test_log::test]
    fn test_unreadable_field_keeps_current_value() {
        let snapshot = from_json(r#"{"deckSize": "forty", "handSize": "6", "totalHands": -3}"#)
            .unwrap();
        let merged = context().merge(snapshot);
        assert_eq!(60, merged.deck_size);
        assert_eq!(6, merged.hand_size);
        assert_eq!(100, merged.total_hands);
    }

    #[test_log::test]
    fn test_loads_file_with_text_counts_and_pairs() {
        let json = r#"{
            "entries": [
                {"id": "entry-item-1", "name": "Ace", "count": "4", "tags": ["starter"],
                 "probs": [0.36, 0.07, 0, 0, 0, 0.43], "prob": 0.43},
                {"id": "entry-item-2", "name": "King", "count": 3, "tags": []},
                {"id": "entry-item-remaining", "name": "Remaining", "count": 33,
                 "probs": [null, null, 0, 0, 0, 0], "prob": null}
            ],
            "combos": [
                {"id": "combo-1", "name": "Royals", "count": 2, "prob": 0.2,
                 "groups": [
                    {"id": "combo-group-1", "members": ["entry-item-1"], "count": 4},
                    {"id": "combo-group-2", "members": ["entry-item-2"]}
                 ]}
            ],
            "handSize": "5",
            "deckSize": 40,
            "totalHands": 100,
            "totalShuffles": 1,
            "inputHeaders": [
                {"label": "Name", "id": "header1"},
                {"label": "Count", "id": "header2"},
                {"label": "Remove", "id": "header3"}
            ],
            "displayHeaders": [["Name", "name"], ["1", 1], ["2", 2], ["3", 3],
                               ["4", 4], ["5", 5], ["Total", "total"]],
            "tagGroups": [["starter", 0.43]],
            "tagSuccessRate": 0.43,
            "totalComboProb": 0.2,
            "averageOpening": ["Ace", "King", "Remaining", "Remaining", "Remaining"]
        }"#;

        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), json).unwrap();
        let merged = CalculatorContext::default().merge(load_snapshot(temp_file.path()).unwrap());

        assert_eq!(4, merged.entries[0].count);
        assert_eq!(vec!["starter".to_string()], merged.entries[0].tags);
        assert_eq!(0.0, merged.entries[2].probs[0]);
        assert_eq!(0.0, merged.entries[2].prob);
        assert_eq!(0, merged.combos[0].groups[1].count);
        assert_eq!(5, merged.hand_size);
        assert_eq!(crate::core::display_headers(5), merged.display_headers);
        assert_eq!("starter", merged.tag_groups[0].tag);
        assert_eq!(0.43, merged.tag_groups[0].prob);
        assert_eq!(5, merged.average_opening.len());

        let recomputed = merged.recompute_remaining();
        assert_eq!(33, recomputed.remaining().unwrap().count);
        assert_eq!(3, recomputed.combos[0].groups[1].count);
    }

    #[test_log::test]
    fn test_calculator_load_stays_idle() {
        let temp_file = NamedTempFile::new().unwrap();
        save_snapshot(temp_file.path(), &context()).unwrap();

        let mut calc = CalculatorBuilder::default().build();
        calc.settle().unwrap();
        calc.load_snapshot(temp_file.path()).unwrap();

        assert!(!calc.is_busy());
        assert_eq!(60, calc.context().deck_size);
        assert_eq!(1, calc.context().combos.len());

        let out = NamedTempFile::new().unwrap();
        calc.save_snapshot(out.path()).unwrap();
        let reloaded = load_snapshot(out.path()).unwrap();
        assert_eq!(Some(60), reloaded.deck_size);
    }
}
