#[macro_use]
extern crate criterion;
extern crate deck_calc;

use criterion::Criterion;
use deck_calc::core::{CalculatorContext, Combo, Entry, EntryId, Group, draw_table};
use deck_calc::probability::calculate_probs;

fn draw_table_forty_card_deck(c: &mut Criterion) {
    c.bench_function("Draw table for 3 copies in a 40 card deck", |b| {
        b.iter(|| draw_table(40, 5, 3))
    });
}

fn full_probability_pass(c: &mut Criterion) {
    let entries: Vec<Entry> = (0..20)
        .map(|i| {
            Entry::new(format!("entry-item-{i}"), format!("Card {i}"), 3).with_tags(["main"])
        })
        .collect();
    let combos = (0..5)
        .map(|i| {
            Combo::new(
                format!("combo-{i}"),
                format!("Combo {i}"),
                vec![
                    Group::new(
                        format!("combo-group-{i}-a"),
                        vec![EntryId::new(format!("entry-item-{i}"))],
                    ),
                    Group::new(
                        format!("combo-group-{i}-b"),
                        vec![EntryId::new(format!("entry-item-{}", i + 10))],
                    ),
                ],
            )
        })
        .collect();
    let context = CalculatorContext {
        entries,
        combos,
        deck_size: 60,
        hand_size: 7,
        ..Default::default()
    }
    .recompute_remaining();

    c.bench_function("Probability pass over 20 entries and 5 combos", move |b| {
        b.iter(|| calculate_probs(&context))
    });
}

criterion_group!(benches, draw_table_forty_card_deck, full_probability_pass);
criterion_main!(benches);
