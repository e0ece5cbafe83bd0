use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use deck_calc::calculator::CalculatorBuilder;
use deck_calc::core::{CalculatorContext, DeckCalcError, EntryId, ORIGINAL_ENTRY_ID, parse_tags};
use thiserror::Error;
use tracing::event;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
enum CliError {
    #[error("Entries look like NAME:COUNT or NAME:COUNT:tag,tag, got {0:?}")]
    InvalidEntry(String),
    #[error("Combos look like NAME=A|B,C, got {0:?}")]
    InvalidCombo(String),
    #[error("No entry named {0:?}")]
    UnknownEntry(String),
    #[error(transparent)]
    Calculator(#[from] DeckCalcError),
}

/// An entry given on the command line.
#[derive(Debug, Clone)]
struct EntrySpec {
    name: String,
    count: i64,
    tags: Vec<String>,
}

impl FromStr for EntrySpec {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let name = parts.next().map(str::trim).unwrap_or_default();
        let count = parts
            .next()
            .and_then(|c| c.trim().parse().ok())
            .ok_or_else(|| CliError::InvalidEntry(s.to_string()))?;
        if name.is_empty() {
            return Err(CliError::InvalidEntry(s.to_string()));
        }
        let tags = parts.next().map(parse_tags).unwrap_or_default();
        Ok(Self {
            name: name.to_string(),
            count,
            tags,
        })
    }
}

/// A combo given on the command line. Groups are separated by `,` and the
/// entries of a group by `|`.
#[derive(Debug, Clone)]
struct ComboSpec {
    name: String,
    groups: Vec<Vec<String>>,
}

impl FromStr for ComboSpec {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, groups) = s
            .split_once('=')
            .ok_or_else(|| CliError::InvalidCombo(s.to_string()))?;
        let groups: Vec<Vec<String>> = groups
            .split(',')
            .map(|group| {
                group
                    .split('|')
                    .map(str::trim)
                    .filter(|member| !member.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<String>>()
            })
            .filter(|group| !group.is_empty())
            .collect();
        if name.trim().is_empty() || groups.is_empty() {
            return Err(CliError::InvalidCombo(s.to_string()));
        }
        Ok(Self {
            name: name.trim().to_string(),
            groups,
        })
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "deck-calc")]
#[command(about = "Draw probabilities and opening hands for a deck of cards")]
struct Cli {
    /// Saved calculator (.dcalc) to start from
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Cards in the deck
    #[arg(long)]
    deck_size: Option<i64>,

    /// Cards in an opening hand
    #[arg(long)]
    hand_size: Option<i64>,

    /// Entry as NAME:COUNT or NAME:COUNT:tag,tag
    #[arg(short, long = "entry")]
    entries: Vec<EntrySpec>,

    /// Combo as NAME=A|B,C where A, B and C are entry names
    #[arg(short, long = "combo")]
    combos: Vec<ComboSpec>,

    /// Hands dealt by the opening hand simulation
    #[arg(long)]
    hands: Option<u32>,

    /// Full shuffles before each simulated hand
    #[arg(long)]
    shuffles: Option<u32>,

    /// Seed for repeatable simulations
    #[arg(long)]
    seed: Option<u64>,

    /// Simulate the most frequent opening hand
    #[arg(short, long)]
    opening_hand: bool,

    /// Save the calculator to this file when done
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Log what the calculator is doing
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut builder = CalculatorBuilder::default();
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let mut calc = builder.build();
    calc.settle()?;

    if let Some(path) = &cli.load {
        calc.load_snapshot(path)?;
    }
    if let Some(hand_size) = cli.hand_size {
        calc.set_hand_size(hand_size);
        calc.settle()?;
    }

    if !cli.entries.is_empty() && cli.load.is_none() {
        calc.remove_entry(EntryId::new(ORIGINAL_ENTRY_ID));
        calc.settle()?;
    }
    for entry in &cli.entries {
        calc.add_entry(entry.name.clone(), entry.count, entry.tags.clone());
        calc.settle()?;
    }
    for combo in &cli.combos {
        let groups = combo
            .groups
            .iter()
            .map(|names| resolve_names(calc.context(), names))
            .collect::<Result<Vec<_>, _>>()?;
        calc.add_combo(combo.name.clone(), groups);
        calc.settle()?;
    }

    // Always re-send the deck size so a loaded file gets a fresh pass.
    let deck_size = cli.deck_size.unwrap_or(calc.context().deck_size);
    calc.set_deck_size(deck_size);
    calc.settle()?;

    if !calc.context().is_valid_for_compute() {
        event!(
            tracing::Level::WARN,
            "Deck can't be calculated, probabilities shown are from the last valid deck"
        );
    }

    if let Some(hands) = cli.hands {
        calc.set_total_hands(hands);
    }
    if let Some(shuffles) = cli.shuffles {
        calc.set_total_shuffles(shuffles);
    }
    if cli.opening_hand {
        calc.request_opening_hand();
        calc.settle()?;
    }

    print_report(calc.context(), cli.opening_hand);

    if let Some(path) = &cli.save {
        calc.save_snapshot(path)?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_names(context: &CalculatorContext, names: &[String]) -> Result<Vec<EntryId>, CliError> {
    names
        .iter()
        .map(|name| {
            context
                .entries
                .iter()
                .find(|e| &e.name == name)
                .map(|e| e.id.clone())
                .ok_or_else(|| CliError::UnknownEntry(name.clone()))
        })
        .collect()
}

fn print_report(context: &CalculatorContext, with_opening_hand: bool) {
    println!("Deck {} / Hand {}", context.deck_size, context.hand_size);
    // The first display header labels the name column.
    let header: Vec<String> = context
        .display_headers
        .iter()
        .skip(1)
        .map(|h| format!("{:>8}", h.label))
        .collect();
    println!("{:<20}{}", "", header.join(""));
    for entry in &context.entries {
        let probs: Vec<String> = entry.probs.iter().map(|p| format!("{:>8.2}", p)).collect();
        let name = format!("{} ({})", entry.name, entry.count);
        println!("{:<20}{}", name, probs.join(""));
    }

    if !context.tag_groups.is_empty() {
        println!();
        for group in &context.tag_groups {
            println!("tag {:<16}{:>8.2}", group.tag, group.prob);
        }
        println!("Tag success rate {:.2}", context.tag_success_rate);
    }

    if !context.combos.is_empty() {
        println!();
        for combo in &context.combos {
            println!("combo {:<14}{:>8.2}", combo.name, combo.prob);
        }
        println!("Combo success rate {:.2}", context.total_combo_prob);
    }

    if with_opening_hand {
        println!();
        println!("Most frequent opening hand: {}", context.average_opening.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_calc::calculator::Calculator;

    #[test]
    fn test_parse_entry() {
        let entry: EntrySpec = "Ace:4".parse().unwrap();
        assert_eq!("Ace", entry.name);
        assert_eq!(4, entry.count);
        assert!(entry.tags.is_empty());

        let tagged: EntrySpec = "Ace:4:starter, royal".parse().unwrap();
        assert_eq!(vec!["starter", "royal"], tagged.tags);

        assert!("Ace".parse::<EntrySpec>().is_err());
        assert!("Ace:four".parse::<EntrySpec>().is_err());
        assert!(":4".parse::<EntrySpec>().is_err());
    }

    #[test]
    fn test_parse_combo() {
        let combo: ComboSpec = "Rockets=Ace|King,Queen".parse().unwrap();
        assert_eq!("Rockets", combo.name);
        assert_eq!(vec![vec!["Ace", "King"], vec!["Queen"]], combo.groups);

        assert!("Rockets".parse::<ComboSpec>().is_err());
        assert!("Rockets=".parse::<ComboSpec>().is_err());
        assert!("=Ace".parse::<ComboSpec>().is_err());
    }

    #[test]
    fn test_resolve_names() {
        let mut calc: Calculator = CalculatorBuilder::default().build();
        calc.settle().unwrap();
        let ace = calc.add_entry("Ace", 4, Vec::<String>::new()).unwrap();
        calc.settle().unwrap();

        assert_eq!(
            vec![ace],
            resolve_names(calc.context(), &["Ace".to_string()]).unwrap()
        );
        assert!(matches!(
            resolve_names(calc.context(), &["Joker".to_string()]),
            Err(CliError::UnknownEntry(_))
        ));
    }
}
