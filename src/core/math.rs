//! Counting helpers and the two draw probabilities everything else is built
//! from.
//!
//! All of these work on `f64` products of `i64` inputs. None of them panic:
//! an argument outside of the meaningful domain (negative sizes, drawing more
//! copies than exist, a hand larger than the deck) produces `0.0`, and so
//! does any ratio that ends up `NaN` or infinite.

/// `n!` for `n >= 0`. Negative input has no factorial and yields `0.0`.
///
/// ```
/// use deck_calc::core::factorial;
///
/// assert_eq!(1.0, factorial(0));
/// assert_eq!(120.0, factorial(5));
/// ```
pub fn factorial(n: i64) -> f64 {
    if n < 0 {
        return 0.0;
    }
    (1..=n).map(|x| x as f64).product()
}

/// Ordered selections of `select` items out of `population`.
///
/// This is the descending product `population * (population - 1) * ...`
/// with `select` terms, so a large population never has its full factorial
/// computed. Selecting more than the population holds is impossible and
/// yields `0.0`.
///
/// ```
/// use deck_calc::core::permutation;
///
/// assert_eq!(40.0 * 39.0 * 38.0, permutation(40, 3));
/// assert_eq!(0.0, permutation(3, 4));
/// ```
pub fn permutation(population: i64, select: i64) -> f64 {
    if population < 0 || select < 0 || select > population {
        return 0.0;
    }
    ((population - select + 1)..=population)
        .rev()
        .map(|x| x as f64)
        .product()
}

/// Unordered selections of `select` items out of `population`.
///
/// Choosing nothing is always exactly one way, whatever the population.
///
/// ```
/// use deck_calc::core::combination;
///
/// assert_eq!(1.0, combination(0, 0));
/// assert_eq!(658_008.0, combination(40, 5));
/// ```
pub fn combination(population: i64, select: i64) -> f64 {
    if select == 0 {
        return 1.0;
    }
    if select < 0 {
        return 0.0;
    }
    permutation(population, select) / factorial(select)
}

/// Probability of drawing exactly `copies_drawn` of the `total_copies`
/// target cards in a hand of `hand_size` from a deck of `deck_size`.
///
/// Returns `0.0` rather than `NaN` for every combination of arguments where
/// the ratio is undefined.
///
/// ```
/// use deck_calc::core::hypergeometric_probability;
///
/// let p = hypergeometric_probability(40, 5, 4, 1);
/// assert!((p - 0.3581).abs() < 1e-4);
///
/// assert_eq!(0.0, hypergeometric_probability(40, 5, 0, 1));
/// assert_eq!(0.0, hypergeometric_probability(0, 0, 0, 0));
/// ```
pub fn hypergeometric_probability(
    deck_size: i64,
    hand_size: i64,
    total_copies: i64,
    copies_drawn: i64,
) -> f64 {
    if deck_size <= 0 || hand_size < 0 || total_copies < 0 || copies_drawn < 0 {
        return 0.0;
    }
    if copies_drawn > total_copies || hand_size - copies_drawn > deck_size - total_copies {
        return 0.0;
    }

    let numerator = combination(total_copies, copies_drawn)
        * combination(deck_size - total_copies, hand_size - copies_drawn);
    let denominator = combination(deck_size, hand_size);
    finite_or_zero(numerator / denominator)
}

/// Probability of seeing at least one of `copies` cards in a hand of
/// `hand_size` from a deck of `deck_size`.
///
/// This is the closed form `1 - P(deck - copies, hand) / P(deck, hand)`.
///
/// ```
/// use deck_calc::core::at_least_one_probability;
///
/// let p = at_least_one_probability(40, 5, 4);
/// assert!((p - 0.4271).abs() < 1e-4);
///
/// assert_eq!(0.0, at_least_one_probability(40, 5, 0));
/// ```
pub fn at_least_one_probability(deck_size: i64, hand_size: i64, copies: i64) -> f64 {
    if copies < 0 {
        return 0.0;
    }
    let denominator = permutation(deck_size, hand_size);
    if denominator == 0.0 {
        return 0.0;
    }
    let numerator = permutation(deck_size - copies, hand_size);
    finite_or_zero(1.0 - numerator / denominator)
}

/// Round to two decimal places, the precision draw tables are kept at.
pub(crate) fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
