#[macro_use]
extern crate criterion;
extern crate deck_calc;
extern crate rand;

use criterion::Criterion;
use deck_calc::core::Entry;
use deck_calc::simulation::OpeningHandSimulation;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn forty_card_deck() -> Vec<Entry> {
    vec![
        Entry::new("entry-item-1", "Ace", 4),
        Entry::new("entry-item-2", "King", 6),
        Entry::new("entry-item-3", "Queen", 10),
        Entry::remaining(20),
    ]
}

fn deal_one_hand(c: &mut Criterion) {
    let mut sim = OpeningHandSimulation::new(&forty_card_deck(), &[], 5, 1);
    let mut rng = StdRng::seed_from_u64(420);
    c.bench_function("Deal one opening hand", move |b| b.iter(|| sim.deal(&mut rng)));
}

fn most_frequent_of_hundred(c: &mut Criterion) {
    let mut sim = OpeningHandSimulation::new(&forty_card_deck(), &[], 5, 3);
    let mut rng = StdRng::seed_from_u64(420);
    c.bench_function("Most frequent of 100 hands with 3 shuffles", move |b| {
        b.iter(|| sim.most_frequent_hand(100, &mut rng))
    });
}

criterion_group!(benches, deal_one_hand, most_frequent_of_hundred);
criterion_main!(benches);
