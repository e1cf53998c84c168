use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::share::safe_pct;
use crate::records::TradeInRecord;
use crate::types::{round_pct, Percent};

/// Record attribute used to break a count down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    #[default]
    ProductCategory,
    StoreState,
    StoreName,
    Region,
    Representative,
}

impl GroupKey {
    pub fn value<'a>(&self, r: &'a TradeInRecord) -> Option<&'a str> {
        match self {
            GroupKey::ProductCategory => r.product_category.as_deref(),
            GroupKey::StoreState => r.store_state.as_deref(),
            GroupKey::StoreName => r.store_name.as_deref(),
            GroupKey::Region => r.region.as_deref(),
            GroupKey::Representative => r.representative.as_deref(),
        }
    }
}

/// Count records per value of `key`. Records without a value are not
/// grouped.
pub fn group_counts<'a, I>(records: I, key: GroupKey) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a TradeInRecord>,
{
    let mut counts = BTreeMap::new();
    for r in records {
        if let Some(v) = key.value(r) {
            *counts.entry(v.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// One category's counts in both channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub maple_count: usize,
    pub cashify_count: usize,
    /// maple_count / combined total at the scope
    pub maple_pct: Percent,
    /// cashify_count / combined total at the scope
    pub cashify_pct: Percent,
}

/// Category breakdown of both channels at one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryContribution {
    pub key: GroupKey,
    /// Maple + Cashify records at the scope, grouped or not
    pub combined_total: usize,
    pub categories: Vec<CategoryShare>,
}

impl CategoryContribution {
    /// Same breakdown with percentages rounded for display.
    pub fn rounded(mut self) -> Self {
        for c in &mut self.categories {
            c.maple_pct = round_pct(c.maple_pct);
            c.cashify_pct = round_pct(c.cashify_pct);
        }
        self
    }
}

/// Group both channels by `key` and express every count against the
/// combined Maple + Cashify total, so the two channels' bars share one
/// denominator.
pub fn category_contribution(
    maple: &[TradeInRecord],
    cashify: &[TradeInRecord],
    key: GroupKey,
) -> CategoryContribution {
    let maple_counts = group_counts(maple, key);
    let cashify_counts = group_counts(cashify, key);
    let combined_total = maple.len() + cashify.len();
    let denominator = Decimal::from(combined_total);

    let mut names: Vec<&String> = maple_counts.keys().chain(cashify_counts.keys()).collect();
    names.sort();
    names.dedup();

    let categories = names
        .into_iter()
        .map(|name| {
            let m = maple_counts.get(name).copied().unwrap_or(0);
            let c = cashify_counts.get(name).copied().unwrap_or(0);
            CategoryShare {
                category: name.clone(),
                maple_count: m,
                cashify_count: c,
                maple_pct: safe_pct(Decimal::from(m), denominator),
                cashify_pct: safe_pct(Decimal::from(c), denominator),
            }
        })
        .collect();

    CategoryContribution {
        key,
        combined_total,
        categories,
    }
}
