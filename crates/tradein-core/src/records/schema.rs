use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TradeInError;
use crate::types::Channel;
use crate::TradeInResult;

/// Canonical record fields, independent of how either channel names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TransactionDate,
    Month,
    Year,
    StoreName,
    Representative,
    Region,
    StoreState,
    DeviceValue,
    DeviceIdentifier,
    ProductCategory,
}

/// How one canonical field is found in an uploaded sheet.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub field: Field,
    /// Header used in error messages
    pub canonical: &'static str,
    /// Other headers seen for the same data
    pub aliases: &'static [&'static str],
    pub required: bool,
}

const fn spec(
    field: Field,
    canonical: &'static str,
    aliases: &'static [&'static str],
    required: bool,
) -> ColumnSpec {
    ColumnSpec {
        field,
        canonical,
        aliases,
        required,
    }
}

const SHARED_COLUMNS: [ColumnSpec; 7] = [
    spec(Field::Month, "Month", &[], true),
    spec(Field::Year, "Year", &[], true),
    spec(Field::StoreName, "Store Name", &["Store"], true),
    spec(Field::Representative, "Spoc Name", &["Spocs", "Spoc", "SPOC"], true),
    spec(Field::Region, "State Region", &["Region", "Zone"], true),
    spec(Field::StoreState, "Store State", &["State"], true),
    spec(Field::ProductCategory, "Product Category", &["Category"], false),
];

const MAPLE_COLUMNS: [ColumnSpec; 3] = [
    spec(Field::TransactionDate, "Created Date", &["Date"], true),
    spec(
        Field::DeviceValue,
        "Maple Bid",
        &["Maple Device Value", "Maple Given Price"],
        true,
    ),
    spec(Field::DeviceIdentifier, "Old IMEI No", &["Old Device IMEI"], true),
];

const CASHIFY_COLUMNS: [ColumnSpec; 3] = [
    spec(Field::TransactionDate, "Order Date", &["Date"], true),
    spec(
        Field::DeviceValue,
        "Initial Device Amount",
        &["Initial Old Device Amount", "Cashify Bid", "Cashify Price"],
        true,
    ),
    spec(Field::DeviceIdentifier, "Old Device IMEI", &["Old IMEI No"], true),
];

/// Column specifications for one channel, channel-specific columns first.
pub fn columns_for(channel: Channel) -> Vec<ColumnSpec> {
    let specific: &[ColumnSpec] = match channel {
        Channel::Maple => &MAPLE_COLUMNS,
        Channel::Cashify => &CASHIFY_COLUMNS,
    };
    specific.iter().chain(SHARED_COLUMNS.iter()).copied().collect()
}

/// Header comparison key: trimmed, lower-cased, inner whitespace collapsed.
/// Absorbs drift such as "Initial Device Amount " vs "Initial Device Amount".
pub fn header_key(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Field => column index for one uploaded sheet.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Cell text for `field` in `row`; empty when the column is absent or
    /// the row is short.
    pub fn cell<'a>(&self, row: &'a [String], field: Field) -> &'a str {
        self.index(field)
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn contains(&self, field: Field) -> bool {
        self.indices.contains_key(&field)
    }
}

/// Resolve every canonical field to a header position.
///
/// Canonical names win over aliases. All missing required columns are
/// reported together.
pub fn resolve_columns(headers: &[String], channel: Channel) -> TradeInResult<ColumnMap> {
    let keyed: Vec<String> = headers.iter().map(|h| header_key(h)).collect();
    let position = |name: &str| {
        let key = header_key(name);
        keyed.iter().position(|h| *h == key)
    };

    let mut map = ColumnMap::default();
    let mut missing: Vec<String> = Vec::new();

    for col in columns_for(channel) {
        let found = position(col.canonical)
            .or_else(|| col.aliases.iter().find_map(|alias| position(alias)));
        match found {
            Some(idx) => {
                debug!(
                    channel = %channel,
                    field = ?col.field,
                    header = %headers[idx],
                    "resolved column"
                );
                map.indices.insert(col.field, idx);
            }
            None if col.required => missing.push(col.canonical.to_string()),
            None => {}
        }
    }

    if !missing.is_empty() {
        return Err(TradeInError::MissingColumns {
            channel,
            columns: missing,
        });
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    const CASHIFY_HEADERS: [&str; 10] = [
        "Order Date",
        "Month",
        "Year",
        "Store Name",
        "Spoc Name",
        "State Region",
        "Store State",
        "Initial Device Amount ",
        "Old Device IMEI",
        "Product Category",
    ];

    #[test]
    fn test_trailing_space_header_resolves() {
        let map = resolve_columns(&headers(&CASHIFY_HEADERS), Channel::Cashify).unwrap();
        assert_eq!(map.index(Field::DeviceValue), Some(7));
        assert_eq!(map.index(Field::ProductCategory), Some(9));
    }

    #[test]
    fn test_alias_resolves_when_canonical_absent() {
        let mut h = headers(&CASHIFY_HEADERS);
        h[7] = "Cashify Bid".into();
        h[4] = "SPOCS".into();
        let map = resolve_columns(&h, Channel::Cashify).unwrap();
        assert_eq!(map.index(Field::DeviceValue), Some(7));
        assert_eq!(map.index(Field::Representative), Some(4));
    }

    #[test]
    fn test_missing_columns_all_reported() {
        let h = headers(&["Order Date", "Month", "Store Name"]);
        let err = resolve_columns(&h, Channel::Cashify).unwrap_err();
        match err {
            TradeInError::MissingColumns { channel, columns } => {
                assert_eq!(channel, Channel::Cashify);
                assert_eq!(
                    columns,
                    vec![
                        "Initial Device Amount",
                        "Old Device IMEI",
                        "Year",
                        "Spoc Name",
                        "State Region",
                        "Store State",
                    ]
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_optional_category_may_be_absent() {
        let map = resolve_columns(&headers(&CASHIFY_HEADERS[..9]), Channel::Cashify).unwrap();
        assert!(!map.contains(Field::ProductCategory));
    }

    #[test]
    fn test_maple_requires_its_own_date_column() {
        let err = resolve_columns(&headers(&CASHIFY_HEADERS), Channel::Maple).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Created Date"), "{msg}");
        assert!(msg.contains("Maple Bid"), "{msg}");
    }
}
