use crate::core::{Combo, ComboId, Entry, EntryEdit, EntryId, HeaderEdit, Snapshot};
use crate::probability::ProbabilityReport;

/// Everything that can happen to a calculator.
///
/// Most events are user intents. `SaveProbs` and `SetOpeningHand` are sent
/// back by the background work a transition started.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AddEntry(Entry),
    RemoveEntry(EntryId),
    EditEntry { id: EntryId, edit: EntryEdit },
    EditHandSize(i64),
    EditDeckSize(i64),
    EditHeaders(HeaderEdit),
    LoadContext(Box<Snapshot>),
    AddCombo(Combo),
    EditCombo(Combo),
    RemoveCombo(ComboId),
    SetTotalHands(u32),
    SetShuffles(u32),
    RequestOpeningHand,
    SaveProbs(Box<ProbabilityReport>),
    SetOpeningHand(Vec<String>),
}

impl Event {
    /// Short name used when logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::AddEntry(_) => "add_entry",
            Event::RemoveEntry(_) => "remove_entry",
            Event::EditEntry { .. } => "edit_entry",
            Event::EditHandSize(_) => "edit_hand_size",
            Event::EditDeckSize(_) => "edit_deck_size",
            Event::EditHeaders(_) => "edit_headers",
            Event::LoadContext(_) => "load_context",
            Event::AddCombo(_) => "add_combo",
            Event::EditCombo(_) => "edit_combo",
            Event::RemoveCombo(_) => "remove_combo",
            Event::SetTotalHands(_) => "set_total_hands",
            Event::SetShuffles(_) => "set_shuffles",
            Event::RequestOpeningHand => "request_opening_hand",
            Event::SaveProbs(_) => "save_probs",
            Event::SetOpeningHand(_) => "set_opening_hand",
        }
    }
}
