//! Runs the state machine and the background work it asks for.
//!
//! The [`Machine`] itself never does anything slow. Whenever a transition
//! owes a probability pass or an opening hand simulation the [`Calculator`]
//! starts it on a worker thread, and hands the result back to the machine
//! as an ordinary event once it is picked up by [`Calculator::poll`] or
//! [`Calculator::settle`].
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::event;

use crate::core::{
    CalculatorContext, Combo, ComboId, DeckCalcError, Entry, EntryEdit, EntryId, Group,
};
use crate::machine::{Effect, Event, Machine, State};
use crate::probability::calculate_probs;
use crate::simulation::OpeningHandSimulation;

/// Background work that has been started but not yet picked up.
struct Pending {
    /// Which dispatch this is. Only the latest is ever listened to.
    ticket: u64,
    receiver: Receiver<Event>,
}

/// # Calculator
///
/// Owns a [`Machine`] and serializes every event through it. Background
/// work runs on its own thread so a long simulation never blocks edits
/// from being sent, though the machine itself ignores edits until it is
/// idle again.
///
/// ```
/// use deck_calc::calculator::CalculatorBuilder;
///
/// let mut calc = CalculatorBuilder::default().seed(420).build();
/// // The first probability pass starts on build. Edits sent before it
/// // finishes are ignored.
/// calc.settle().unwrap();
/// let ace = calc.add_entry("Ace", 4, Vec::<String>::new()).unwrap();
/// let context = calc.settle().unwrap();
///
/// assert_eq!(36, context.remaining().unwrap().count);
/// assert_eq!(0.36, context.entry(&ace).unwrap().probs[0]);
/// ```
pub struct Calculator {
    machine: Machine,
    pending: Option<Pending>,
    next_ticket: u64,
    next_id: u64,
    rng: StdRng,
}

impl Calculator {
    pub fn state(&self) -> State {
        self.machine.state()
    }

    pub fn context(&self) -> &CalculatorContext {
        self.machine.context()
    }

    /// Is background work still outstanding?
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Send one event through the machine, starting any work the new state
    /// owes.
    pub fn send(&mut self, event: Event) {
        let machine = std::mem::take(&mut self.machine);
        let from = machine.state();
        self.machine = machine.reduce(event);

        let to = self.machine.state();
        if from != to {
            if let Some(effect) = self.machine.effect() {
                self.dispatch(effect);
            }
        }
    }

    /// Pick up finished background work without waiting.
    ///
    /// Returns true if a result was applied.
    pub fn poll(&mut self) -> Result<bool, DeckCalcError> {
        let Some(pending) = &self.pending else {
            return Ok(false);
        };
        match pending.receiver.try_recv() {
            Ok(result) => {
                self.complete(result);
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(self.lost()),
        }
    }

    /// Wait until the machine is idle, applying every result on the way.
    pub fn settle(&mut self) -> Result<&CalculatorContext, DeckCalcError> {
        while let Some(pending) = &self.pending {
            match pending.receiver.recv() {
                Ok(result) => self.complete(result),
                Err(_) => return Err(self.lost()),
            }
        }
        Ok(self.context())
    }

    /// Add a new entry and return its id.
    ///
    /// Returns `None` and adds nothing while the calculator is not idle.
    pub fn add_entry<I, S>(
        &mut self,
        name: impl Into<String>,
        count: i64,
        tags: I,
    ) -> Option<EntryId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.state() != State::Idle {
            return None;
        }
        let id = self.next_entry_id();
        let entry = Entry::new(id.clone(), name, count).with_tags(tags);
        self.send(Event::AddEntry(entry));
        Some(id)
    }

    pub fn remove_entry(&mut self, id: EntryId) {
        self.send(Event::RemoveEntry(id));
    }

    pub fn edit_entry(&mut self, id: EntryId, edit: EntryEdit) {
        self.send(Event::EditEntry { id, edit });
    }

    pub fn set_hand_size(&mut self, hand_size: i64) {
        self.send(Event::EditHandSize(hand_size));
    }

    pub fn set_deck_size(&mut self, deck_size: i64) {
        self.send(Event::EditDeckSize(deck_size));
    }

    pub fn set_total_hands(&mut self, total_hands: u32) {
        self.send(Event::SetTotalHands(total_hands));
    }

    pub fn set_total_shuffles(&mut self, total_shuffles: u32) {
        self.send(Event::SetShuffles(total_shuffles));
    }

    pub fn request_opening_hand(&mut self) {
        self.send(Event::RequestOpeningHand);
    }

    /// Create a combo from lists of member ids, one list per group.
    ///
    /// Returns `None` and adds nothing while the calculator is not idle.
    pub fn add_combo(
        &mut self,
        name: impl Into<String>,
        groups: Vec<Vec<EntryId>>,
    ) -> Option<ComboId> {
        if self.state() != State::Idle {
            return None;
        }
        let id = self.next_combo_id();
        let groups = groups
            .into_iter()
            .map(|members| Group::new(self.next_group_id(), members))
            .collect();
        self.send(Event::AddCombo(Combo::new(id.clone(), name, groups)));
        Some(id)
    }

    /// Replace a combo, or add it if the id is new.
    pub fn upsert_combo(&mut self, combo: Combo) {
        self.send(Event::EditCombo(combo));
    }

    pub fn remove_combo(&mut self, id: ComboId) {
        self.send(Event::RemoveCombo(id));
    }

    /// An entry id not used by any current entry.
    pub fn next_entry_id(&mut self) -> EntryId {
        loop {
            let id = EntryId::new(format!("entry-item-{}", self.bump_id()));
            if self.context().entry(&id).is_none() {
                return id;
            }
        }
    }

    /// A combo id not used by any current combo.
    pub fn next_combo_id(&mut self) -> ComboId {
        loop {
            let id = ComboId::new(format!("combo-{}", self.bump_id()));
            if self.context().combo(&id).is_none() {
                return id;
            }
        }
    }

    pub fn next_group_id(&mut self) -> String {
        loop {
            let id = format!("combo-group-{}", self.bump_id());
            let taken = self
                .context()
                .combos
                .iter()
                .flat_map(|c| c.groups.iter())
                .any(|g| g.id == id);
            if !taken {
                return id;
            }
        }
    }

    fn bump_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Start the work for `effect` on a worker thread.
    fn dispatch(&mut self, effect: Effect) {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let context = self.context().clone();
        let (sender, receiver) = mpsc::channel();

        event!(tracing::Level::DEBUG, ticket, ?effect, "Dispatching");

        match effect {
            Effect::CalculateProbs => {
                thread::spawn(move || {
                    let report = calculate_probs(&context);
                    // The receiver is gone when a newer dispatch replaced
                    // this one. Nothing is waiting for the result then.
                    let _ = sender.send(Event::SaveProbs(Box::new(report)));
                });
            }
            Effect::SimulateOpeningHand => {
                let mut rng = StdRng::seed_from_u64(self.rng.next_u64());
                thread::spawn(move || {
                    let mut simulation = OpeningHandSimulation::new(
                        &context.entries,
                        &context.combos,
                        context.hand_size,
                        context.total_shuffles,
                    );
                    let hand = simulation.most_frequent_hand(context.total_hands, &mut rng);
                    let _ = sender.send(Event::SetOpeningHand(hand));
                });
            }
        }

        self.pending = Some(Pending { ticket, receiver });
    }

    fn complete(&mut self, result: Event) {
        if let Some(pending) = self.pending.take() {
            event!(
                tracing::Level::DEBUG,
                ticket = pending.ticket,
                kind = result.kind(),
                "Background work finished"
            );
        }
        self.send(result);
    }

    /// Give up on the pending work. The machine goes back to idle with the
    /// context it had, so later edits are accepted again.
    fn lost(&mut self) -> DeckCalcError {
        if let Some(pending) = self.pending.take() {
            event!(
                tracing::Level::WARN,
                ticket = pending.ticket,
                "Worker stopped without a result"
            );
        }
        let machine = std::mem::take(&mut self.machine);
        self.machine = Machine::idle(machine.into_context());
        DeckCalcError::WorkerLost
    }
}

/// # CalculatorBuilder
///
/// Builds a [`Calculator`]. Both fields are optional: without a context
/// the calculator starts from [`CalculatorContext::default`], and without
/// a seed simulations draw from OS entropy.
///
/// A seed makes simulations repeatable:
///
/// ```
/// use deck_calc::calculator::CalculatorBuilder;
///
/// let run = |seed| {
///     let mut calc = CalculatorBuilder::default().seed(seed).build();
///     calc.settle().unwrap();
///     calc.add_entry("Ace", 4, ["starter"]);
///     calc.settle().unwrap();
///     calc.add_entry("King", 6, Vec::<String>::new());
///     calc.settle().unwrap();
///     calc.request_opening_hand();
///     calc.settle().unwrap().average_opening.clone()
/// };
///
/// assert_eq!(run(7), run(7));
/// ```
#[derive(Debug, Default)]
pub struct CalculatorBuilder {
    context: Option<CalculatorContext>,
    seed: Option<u64>,
}

impl CalculatorBuilder {
    /// Start from this context instead of the default one.
    pub fn context(mut self, context: CalculatorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Seed the random number generator used by simulations.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the calculator and start its first probability pass.
    pub fn build(self) -> Calculator {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let machine = Machine::new(self.context.unwrap_or_default());

        let mut calculator = Calculator {
            machine,
            pending: None,
            next_ticket: 0,
            next_id: 0,
            rng,
        };
        if let Some(effect) = calculator.machine.effect() {
            calculator.dispatch(effect);
        }
        calculator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ORIGINAL_ENTRY_ID, at_least_one_probability};
    use approx::assert_relative_eq;

    fn settled() -> Calculator {
        let mut calc = CalculatorBuilder::default().seed(420).build();
        calc.settle().unwrap();
        calc
    }

    #[test_log::test]
    fn test_boot_runs_first_pass() {
        let mut calc = CalculatorBuilder::default().build();
        assert_eq!(State::Calculating, calc.state());
        assert!(calc.is_busy());

        let context = calc.settle().unwrap();
        assert_eq!(2, context.entries.len());
        assert_eq!(ORIGINAL_ENTRY_ID, context.entries[0].id.as_str());
        assert_eq!(40, context.remaining().unwrap().count);
        assert_eq!(State::Idle, calc.state());
        assert!(!calc.is_busy());
    }

    #[test]
    fn test_poll_eventually_applies() {
        let mut calc = CalculatorBuilder::default().build();
        while !calc.poll().unwrap() {
            thread::yield_now();
        }
        assert_eq!(State::Idle, calc.state());
        assert!(!calc.poll().unwrap());
    }

    #[test_log::test]
    fn test_single_entry_scenario() {
        let mut calc = settled();
        calc.remove_entry(EntryId::new(ORIGINAL_ENTRY_ID));
        let ace = calc.add_entry("Ace", 4, Vec::<String>::new()).unwrap();
        let context = calc.settle().unwrap();

        assert_eq!(36, context.remaining().unwrap().count);
        assert_eq!(0.36, context.entry(&ace).unwrap().probs[0]);
    }

    #[test]
    fn test_combo_scenario() {
        let mut calc = settled();
        let ace = calc.add_entry("Ace", 4, Vec::<String>::new()).unwrap();
        calc.settle().unwrap();
        calc.add_combo("Aces", vec![vec![ace]]).unwrap();
        let context = calc.settle().unwrap();

        assert_eq!(1, context.combos.len());
        assert_relative_eq!(at_least_one_probability(40, 5, 4), context.combos[0].prob);
        assert_relative_eq!(context.combos[0].prob, context.total_combo_prob, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_config_never_calculates() {
        let mut calc = settled();
        let ace = calc.add_entry("Ace", 4, Vec::<String>::new()).unwrap();
        calc.settle().unwrap();
        let probs = calc.context().entry(&ace).unwrap().probs.clone();

        calc.set_deck_size(0);
        assert_eq!(State::Idle, calc.state());
        assert!(!calc.is_busy());
        assert_eq!(probs, calc.context().entry(&ace).unwrap().probs);
    }

    #[test]
    fn test_events_while_busy_are_ignored() {
        let mut calc = CalculatorBuilder::default().build();
        calc.set_total_hands(7);
        calc.settle().unwrap();
        assert_eq!(100, calc.context().total_hands);
    }

    #[test]
    fn test_adds_while_busy_return_no_id() {
        let mut calc = CalculatorBuilder::default().build();
        assert!(calc.is_busy());
        assert_eq!(None, calc.add_entry("Ace", 4, Vec::<String>::new()));
        assert_eq!(None, calc.add_combo("Aces", vec![]));

        let context = calc.settle().unwrap();
        assert!(context.real_entries().all(|e| e.name != "Ace"));
        assert!(context.combos.is_empty());
    }

    #[test_log::test]
    fn test_lost_worker_returns_to_idle() {
        let mut calc = settled();
        let (sender, receiver) = mpsc::channel::<Event>();
        drop(sender);
        calc.machine = Machine::new(calc.context().clone());
        calc.pending = Some(Pending {
            ticket: 99,
            receiver,
        });

        assert!(matches!(calc.settle(), Err(DeckCalcError::WorkerLost)));
        assert_eq!(State::Idle, calc.state());
        assert!(!calc.is_busy());

        calc.set_total_hands(7);
        assert_eq!(7, calc.context().total_hands);
    }

    #[test]
    fn test_opening_hand() {
        let mut calc = settled();
        calc.remove_entry(EntryId::new(ORIGINAL_ENTRY_ID));
        calc.add_entry("Ace", 40, Vec::<String>::new());
        calc.settle().unwrap();
        calc.set_total_hands(10);
        calc.request_opening_hand();
        assert_eq!(State::CalculatingHand, calc.state());

        let context = calc.settle().unwrap();
        assert_eq!(vec!["Ace"; 5], context.average_opening);
    }

    #[test]
    fn test_generated_ids_skip_taken() {
        let mut context = CalculatorContext::default();
        context.entries.push(Entry::new("entry-item-1", "Ace", 4));
        let mut calc = CalculatorBuilder::default().context(context).build();
        calc.settle().unwrap();

        let id = calc.add_entry("King", 4, Vec::<String>::new()).unwrap();
        assert_eq!("entry-item-2", id.as_str());
        let combo = calc.next_combo_id();
        assert_eq!("combo-3", combo.as_str());
    }
}
