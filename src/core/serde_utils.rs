//! Lenient readers for saved calculators.
//!
//! Files written by older versions of the calculator keep edited counts as
//! the text typed into the count field, and store some derived lists as
//! `[key, value]` pairs. These helpers accept those shapes next to the ones
//! this crate writes.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::event;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrText {
    fn to_int(&self) -> Option<i64> {
        match self {
            NumberOrText::Int(value) => Some(*value),
            NumberOrText::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            NumberOrText::Float(_) => None,
            NumberOrText::Text(text) => leading_int(text),
        }
    }
}

/// Read the integer at the start of `text`, after optional whitespace and
/// sign. `"4"`, `" 4 "` and `"4 copies"` all read as 4.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let digits_start = usize::from(text.starts_with(['-', '+']));
    let digits_end = text[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |idx| idx + digits_start);
    if digits_end == digits_start {
        return None;
    }
    text[..digits_end].parse().ok()
}

/// A count stored as a number or as text. Text without a leading integer,
/// like an emptied input field, counts as zero.
pub fn int_or_text<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(NumberOrText::deserialize(deserializer)?
        .to_int()
        .unwrap_or(0))
}

/// An optional integer stored as a number or as text. Anything that does
/// not read as a value of `T` is dropped.
pub fn optional_int_or_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = optional::<D, NumberOrText>(deserializer)?;
    let parsed = value
        .as_ref()
        .and_then(NumberOrText::to_int)
        .and_then(|int| T::try_from(int).ok());
    if value.is_some() && parsed.is_none() {
        event!(tracing::Level::WARN, "Ignoring unreadable number");
    }
    Ok(parsed)
}

/// A field that keeps its current value when it can't be read, instead of
/// failing the whole file.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match T::deserialize(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(error) => {
            event!(tracing::Level::WARN, %error, "Ignoring unreadable field");
            Ok(None)
        }
    }
}

/// A probability that may have been saved as `null`.
pub fn prob_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Probabilities where any `null` reads as zero.
pub fn probs_or_zero<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<Option<f64>>::deserialize(deserializer)?
        .into_iter()
        .map(|p| p.unwrap_or(0.0))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Count {
        #[serde(deserialize_with = "int_or_text")]
        count: i64,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sizes {
        #[serde(deserialize_with = "optional_int_or_text")]
        hand: Option<u32>,
        #[serde(deserialize_with = "optional")]
        names: Option<Vec<String>>,
    }

    fn count(json: &str) -> i64 {
        serde_json::from_str::<Count>(json).unwrap().count
    }

    #[test]
    fn test_int_or_text() {
        assert_eq!(4, count(r#"{"count": 4}"#));
        assert_eq!(4, count(r#"{"count": "4"}"#));
        assert_eq!(4, count(r#"{"count": " 4 copies"}"#));
        assert_eq!(-2, count(r#"{"count": "-2"}"#));
        assert_eq!(3, count(r#"{"count": 3.9}"#));
        assert_eq!(0, count(r#"{"count": ""}"#));
        assert_eq!(0, count(r#"{"count": "four"}"#));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(Some(12), leading_int("12"));
        assert_eq!(Some(7), leading_int("+7"));
        assert_eq!(None, leading_int("-"));
        assert_eq!(None, leading_int("x1"));
    }

    #[test_log::test]
    fn test_unreadable_fields_are_dropped() {
        let sizes: Sizes = serde_json::from_str(r#"{"hand": "7", "names": ["a"]}"#).unwrap();
        assert_eq!(Some(7), sizes.hand);
        assert_eq!(Some(vec!["a".to_string()]), sizes.names);

        let sizes: Sizes = serde_json::from_str(r#"{"hand": "-7", "names": 12}"#).unwrap();
        assert_eq!(None, sizes.hand);
        assert_eq!(None, sizes.names);

        let sizes: Sizes = serde_json::from_str("{}").unwrap();
        assert_eq!(None, sizes.hand);
    }
}
