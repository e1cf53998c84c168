pub mod load;
pub mod schema;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{Channel, Money};

pub use load::{load_records, parse_date, parse_money, LoadedRecords};
pub use schema::{resolve_columns, ColumnMap, Field};

/// A flat table of string cells with a header row, exactly as exported
/// from a spreadsheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One trade-in transaction after normalization.
///
/// `year` and `month` are copied from their own columns, not derived from
/// `transaction_date`; the source sheets may disagree with the parsed date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeInRecord {
    pub transaction_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<String>,
    pub region: Option<String>,
    pub store_state: Option<String>,
    pub store_name: Option<String>,
    /// SPOC attributed with the transaction; `None` when unattributed
    pub representative: Option<String>,
    /// Maple bid or Cashify initial device amount
    pub device_value: Option<Money>,
    /// IMEI, kept for traceability only
    pub device_identifier: Option<String>,
    pub product_category: Option<String>,
}

impl TradeInRecord {
    /// Day of month of the transaction date, if the date parsed.
    pub fn day(&self) -> Option<u32> {
        self.transaction_date.map(|d| d.day())
    }

    pub fn is_at_store(&self, store: &str) -> bool {
        self.store_name.as_deref() == Some(store)
    }

    pub fn is_attributed_to(&self, representative: &str) -> bool {
        self.representative.as_deref() == Some(representative)
    }

    pub fn is_in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region)
    }

    pub fn is_in_state(&self, state: &str) -> bool {
        self.store_state.as_deref() == Some(state)
    }
}

/// All records of one channel held for a dashboard session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSet {
    pub channel: Channel,
    pub records: Vec<TradeInRecord>,
}

impl RecordSet {
    pub fn new(channel: Channel, records: Vec<TradeInRecord>) -> Self {
        Self { channel, records }
    }

    pub fn empty(channel: Channel) -> Self {
        Self::new(channel, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TradeInRecord> {
        self.records.iter()
    }

    /// A new set with the records matching `pred`.
    pub fn retain_matching<F>(&self, pred: F) -> RecordSet
    where
        F: Fn(&TradeInRecord) -> bool,
    {
        RecordSet::new(
            self.channel,
            self.records.iter().filter(|r| pred(r)).cloned().collect(),
        )
    }

    /// Number of records matching `pred`.
    pub fn count_matching<F>(&self, pred: F) -> usize
    where
        F: Fn(&TradeInRecord) -> bool,
    {
        self.records.iter().filter(|r| pred(r)).count()
    }
}
