/// Column header of the entry input table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub id: String,
    pub label: String,
}

/// What a column of the probability table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Column {
    Name,
    /// Chance of drawing exactly this many copies.
    Copies(i64),
    Total,
}

/// Column header of the probability table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "DisplayHeaderRepr"))]
pub struct DisplayHeader {
    pub label: String,
    pub column: Column,
}

/// Saved display headers are either objects or `[label, key]` pairs, where
/// the key is `"name"`, `"total"` or the number of copies.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum DisplayHeaderRepr {
    Object { label: String, column: Column },
    Pair(String, serde_json::Value),
}

#[cfg(feature = "serde")]
impl TryFrom<DisplayHeaderRepr> for DisplayHeader {
    type Error = String;

    fn try_from(repr: DisplayHeaderRepr) -> Result<Self, Self::Error> {
        let (label, column) = match repr {
            DisplayHeaderRepr::Object { label, column } => (label, column),
            DisplayHeaderRepr::Pair(label, key) => {
                let column = match &key {
                    serde_json::Value::String(key) if key == "name" => Column::Name,
                    serde_json::Value::String(key) if key == "total" => Column::Total,
                    serde_json::Value::Number(copies) => copies
                        .as_i64()
                        .map(Column::Copies)
                        .ok_or_else(|| format!("Unknown display header key {key}"))?,
                    _ => return Err(format!("Unknown display header key {key}")),
                };
                (label, column)
            }
        };
        Ok(DisplayHeader { label, column })
    }
}

/// Replacement for one of the two header lists.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderEdit {
    Input(Vec<Header>),
    Display(Vec<DisplayHeader>),
}

/// `Name | Count | Remove`
pub fn input_headers() -> Vec<Header> {
    ["Name", "Count", "Remove"]
        .iter()
        .enumerate()
        .map(|(idx, label)| Header {
            id: format!("header{}", idx + 1),
            label: label.to_string(),
        })
        .collect()
}

/// `Name | 1 | 2 | ... | hand_size | Total`
///
/// ```
/// use deck_calc::core::{display_headers, Column};
///
/// let headers = display_headers(5);
/// assert_eq!(7, headers.len());
/// assert_eq!(Column::Copies(1), headers[1].column);
/// assert_eq!("Total", headers[6].label);
/// ```
pub fn display_headers(hand_size: i64) -> Vec<DisplayHeader> {
    let mut headers = vec![DisplayHeader {
        label: "Name".to_string(),
        column: Column::Name,
    }];
    headers.extend((1..=hand_size).map(|copies| DisplayHeader {
        label: copies.to_string(),
        column: Column::Copies(copies),
    }));
    headers.push(DisplayHeader {
        label: "Total".to_string(),
        column: Column::Total,
    });
    headers
}

/// Display headers for a hand drawn from a deck of `deck_size`.
///
/// Copies columns stop at the deck size, matching [`crate::core::draw_table`].
pub fn display_headers_for_deck(hand_size: i64, deck_size: i64) -> Vec<DisplayHeader> {
    display_headers(hand_size.min(deck_size.max(0)))
}
