use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_identity_field, normalize_region, normalize_state};
use crate::records::{RecordSet, TradeInRecord};

/// Cascading location / representative choice. Each level narrows the
/// candidates of the next; `None` leaves a level unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub store_state: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub representative: Option<String>,
}

impl LocationSelection {
    /// Normalize the selected keys the same way records are normalized at
    /// load, so user-typed values compare equal.
    pub fn normalized(&self) -> LocationSelection {
        LocationSelection {
            region: self.region.as_deref().map(normalize_region),
            store_state: self.store_state.as_deref().map(normalize_state),
            store_name: self.store_name.as_deref().map(normalize_identity_field),
            representative: self.representative.as_deref().map(normalize_identity_field),
        }
    }

    pub fn matches(&self, r: &TradeInRecord) -> bool {
        self.region.as_deref().map_or(true, |v| r.is_in_region(v))
            && self.store_state.as_deref().map_or(true, |v| r.is_in_state(v))
            && self.store_name.as_deref().map_or(true, |v| r.is_at_store(v))
            && self
                .representative
                .as_deref()
                .map_or(true, |v| r.is_attributed_to(v))
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none()
            && self.store_state.is_none()
            && self.store_name.is_none()
            && self.representative.is_none()
    }
}

/// Apply a selection to one channel: plain intersection on normalized
/// string equality. Each channel is filtered independently with the same
/// keys.
pub fn apply_selection(set: &RecordSet, selection: &LocationSelection) -> RecordSet {
    let selection = selection.normalized();
    set.retain_matching(|r| selection.matches(r))
}

/// Candidates for each selector level, derived from Maple records only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOptions {
    pub regions: Vec<String>,
    pub store_states: Vec<String>,
    pub store_names: Vec<String>,
    pub representatives: Vec<String>,
}

fn distinct<F>(records: &[&TradeInRecord], key: F) -> Vec<String>
where
    F: Fn(&TradeInRecord) -> Option<&String>,
{
    records
        .iter()
        .filter_map(|r| key(*r).cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Candidate lists for the cascading selectors.
///
/// A level's list is computed from the Maple records that survive every
/// level above it, so choosing a region limits the states offered, and so
/// on down to representatives at the chosen store.
pub fn cascade_options(maple: &RecordSet, selection: &LocationSelection) -> CascadeOptions {
    let sel = selection.normalized();
    let mut scope: Vec<&TradeInRecord> = maple.iter().collect();

    let regions = distinct(&scope, |r| r.region.as_ref());
    if let Some(region) = sel.region.as_deref() {
        scope.retain(|r| r.is_in_region(region));
    }

    let store_states = distinct(&scope, |r| r.store_state.as_ref());
    if let Some(state) = sel.store_state.as_deref() {
        scope.retain(|r| r.is_in_state(state));
    }

    let store_names = distinct(&scope, |r| r.store_name.as_ref());
    if let Some(store) = sel.store_name.as_deref() {
        scope.retain(|r| r.is_at_store(store));
    }

    let representatives = distinct(&scope, |r| r.representative.as_ref());

    CascadeOptions {
        regions,
        store_states,
        store_names,
        representatives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channel;

    fn rec(region: &str, state: &str, store: &str, rep: Option<&str>) -> TradeInRecord {
        TradeInRecord {
            region: Some(region.into()),
            store_state: Some(state.into()),
            store_name: Some(store.into()),
            representative: rep.map(String::from),
            ..Default::default()
        }
    }

    fn maple() -> RecordSet {
        RecordSet::new(
            Channel::Maple,
            vec![
                rec("South", "Karnataka", "Iplanet @ Jp Nagar", Some("Sanni Vishwakarma")),
                rec("South", "Karnataka", "Iplanet @ Jayanagar", Some("Manjunath")),
                rec("South", "Tamil Nadu", "Iplanet @ Omr", Some("Mahesh Kumar")),
                rec("South", "Tamil Nadu", "Iplanet @ Omr", None),
                rec("West", "Maharashtra", "Iplanet @ Powai Pow1", Some("Amit")),
            ],
        )
    }

    #[test]
    fn test_cascade_narrows_each_level() {
        let sel = LocationSelection {
            region: Some("South".into()),
            store_state: Some("tamil nadu".into()),
            store_name: Some("IPLANET @ OMR".into()),
            representative: None,
        };
        let opts = cascade_options(&maple(), &sel);
        assert_eq!(opts.regions, vec!["South", "West"]);
        assert_eq!(opts.store_states, vec!["Karnataka", "Tamil Nadu"]);
        assert_eq!(opts.store_names, vec!["Iplanet @ Omr"]);
        assert_eq!(opts.representatives, vec!["Mahesh Kumar"]);
    }

    #[test]
    fn test_empty_selection_lists_everything() {
        let opts = cascade_options(&maple(), &LocationSelection::default());
        assert_eq!(opts.store_names.len(), 4);
        assert_eq!(opts.representatives.len(), 4);
    }

    #[test]
    fn test_apply_selection_normalizes_keys() {
        let sel = LocationSelection {
            store_name: Some(" iplanet @ omr".into()),
            ..Default::default()
        };
        assert_eq!(apply_selection(&maple(), &sel).len(), 2);

        let sel = LocationSelection {
            representative: Some("MAHESH KUMAR".into()),
            ..Default::default()
        };
        assert_eq!(apply_selection(&maple(), &sel).len(), 1);
    }

    #[test]
    fn test_region_selection_ignores_case() {
        let sel = LocationSelection {
            region: Some("south ".into()),
            ..Default::default()
        };
        assert_eq!(apply_selection(&maple(), &sel).len(), 4);
        assert_eq!(cascade_options(&maple(), &sel).store_states.len(), 2);
    }
}
