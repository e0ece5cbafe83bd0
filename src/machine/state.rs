use tracing::event;

use crate::core::{CalculatorContext, Combo, HeaderEdit, display_headers_for_deck};

use super::event::Event;

/// Where the calculator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Waiting for user input.
    Idle,
    /// Waiting for a probability pass to report back.
    Calculating,
    /// Waiting for an opening hand simulation to report back.
    CalculatingHand,
}

impl State {
    /// The background work owed by a machine sitting in this state.
    pub fn effect(&self) -> Option<Effect> {
        match self {
            State::Idle => None,
            State::Calculating => Some(Effect::CalculateProbs),
            State::CalculatingHand => Some(Effect::SimulateOpeningHand),
        }
    }
}

/// Background work started by entering a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Run the probability pass, answered by [`Event::SaveProbs`].
    CalculateProbs,
    /// Run the opening hand simulation, answered by
    /// [`Event::SetOpeningHand`].
    SimulateOpeningHand,
}

/// The calculator state machine: a state plus the context it guards.
///
/// [`Machine::reduce`] is the only way to move forward. It is synchronous,
/// starts no work of its own, and an event that makes no sense in the
/// current state returns the machine untouched.
///
/// ```
/// use deck_calc::core::Entry;
/// use deck_calc::machine::{Event, Machine, State};
///
/// let machine = Machine::idle(Default::default())
///     .reduce(Event::AddEntry(Entry::new("entry-item-1", "Ace", 4)));
///
/// assert_eq!(State::Calculating, machine.state());
/// assert_eq!(36, machine.context().remaining().unwrap().count);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    state: State,
    context: CalculatorContext,
}

impl Default for Machine {
    /// A fresh calculator owes a probability pass.
    fn default() -> Self {
        Self::new(CalculatorContext::default())
    }
}

impl Machine {
    /// Start in `Calculating` so the first pass runs straight away.
    pub fn new(context: CalculatorContext) -> Self {
        Self {
            state: State::Calculating,
            context,
        }
    }

    /// Start idle, with whatever probabilities the context already holds.
    pub fn idle(context: CalculatorContext) -> Self {
        Self {
            state: State::Idle,
            context,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn context(&self) -> &CalculatorContext {
        &self.context
    }

    pub fn into_context(self) -> CalculatorContext {
        self.context
    }

    pub fn effect(&self) -> Option<Effect> {
        self.state.effect()
    }

    /// Apply one event and return the next machine.
    pub fn reduce(self, event: Event) -> Self {
        let from = self.state;
        let kind = event.kind();
        match self.apply(event) {
            Ok(next) => {
                event!(
                    tracing::Level::DEBUG,
                    ?from,
                    to = ?next.state,
                    kind,
                    "Transition"
                );
                next
            }
            Err(unchanged) => {
                event!(tracing::Level::TRACE, state = ?from, kind, "Ignoring event");
                unchanged
            }
        }
    }

    /// `Err` hands the machine back unchanged when the event is not
    /// accepted in the current state.
    fn apply(self, event: Event) -> Result<Self, Self> {
        let Machine { state, context } = self;
        let next = match (state, event) {
            (State::Idle, Event::AddEntry(entry)) => {
                let mut context = context;
                context.entries.push(entry);
                Self::after_entries_change(context)
            }
            (State::Idle, Event::RemoveEntry(id)) => {
                let mut context = context;
                context.entries.retain(|e| e.id != id);
                Self::after_entries_change(context)
            }
            (State::Idle, Event::EditEntry { id, edit }) => {
                let mut context = context;
                if let Some(entry) = context.entries.iter_mut().find(|e| e.id == id) {
                    edit.apply(entry);
                }
                Self::after_entries_change(context)
            }
            (State::Idle, Event::EditHandSize(hand_size)) => {
                let context = CalculatorContext {
                    hand_size,
                    display_headers: display_headers_for_deck(hand_size, context.deck_size),
                    ..context
                };
                Self::after_entries_change(context)
            }
            (State::Idle, Event::EditDeckSize(deck_size)) => {
                let context = CalculatorContext {
                    deck_size,
                    display_headers: display_headers_for_deck(context.hand_size, deck_size),
                    ..context
                };
                Self::after_entries_change(context)
            }
            (State::Idle, Event::EditHeaders(edit)) => {
                let mut context = context;
                match edit {
                    HeaderEdit::Input(headers) => context.input_headers = headers,
                    HeaderEdit::Display(headers) => context.display_headers = headers,
                }
                Self::idle(context)
            }
            (State::Idle, Event::LoadContext(snapshot)) => Self::idle(context.merge(*snapshot)),
            (State::Idle, Event::AddCombo(combo)) | (State::Idle, Event::EditCombo(combo)) => {
                let mut context = context;
                upsert_combo(&mut context, combo);
                Self {
                    state: State::Calculating,
                    context,
                }
            }
            (State::Idle, Event::RemoveCombo(id)) => {
                let mut context = context;
                context.combos.retain(|c| c.id != id);
                Self {
                    state: State::Calculating,
                    context,
                }
            }
            (State::Idle, Event::SetTotalHands(total_hands)) => Self::idle(CalculatorContext {
                total_hands,
                ..context
            }),
            (State::Idle, Event::SetShuffles(total_shuffles)) => Self::idle(CalculatorContext {
                total_shuffles,
                ..context
            }),
            (State::Idle, Event::RequestOpeningHand) => Self {
                state: State::CalculatingHand,
                context,
            },
            (State::Calculating, Event::SaveProbs(report)) => Self::idle(CalculatorContext {
                entries: report.entries,
                tag_groups: report.tag_groups,
                tag_success_rate: report.tag_success_rate,
                combos: report.combos,
                total_combo_prob: report.total_combo_prob,
                ..context
            }),
            (State::CalculatingHand, Event::SetOpeningHand(average_opening)) => {
                Self::idle(CalculatorContext {
                    average_opening,
                    ..context
                })
            }
            (state, _) => return Err(Self { state, context }),
        };
        Ok(next)
    }

    /// Rebuild the remaining entry, then calculate only if the context can
    /// be calculated.
    fn after_entries_change(context: CalculatorContext) -> Self {
        let context = context.recompute_remaining();
        let state = if context.is_valid_for_compute() {
            State::Calculating
        } else {
            State::Idle
        };
        Self { state, context }
    }
}

/// Insert a new combo or replace the one with the same id. Group counts
/// are taken from the current entries.
fn upsert_combo(context: &mut CalculatorContext, combo: Combo) {
    let combo = combo.recount(&context.entries);
    match context.combos.iter_mut().find(|c| c.id == combo.id) {
        Some(existing) => *existing = combo,
        None => context.combos.push(combo),
    }
}
