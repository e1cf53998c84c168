use rust_decimal::Decimal;
use serde_json::Value;

use super::{cell, result_of};

/// Headline figure of each view, in priority order. `kpis` is searched
/// after the result itself.
const PRIORITY_KEYS: [&str; 8] = [
    "notice",
    "market_share",
    "avg_market_share",
    "target_attainment",
    "region_shares",
    "months",
    "written",
    "acquired",
];

/// Print just the headline answer of the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(result_of(value)));
}

fn headline(result: &Value) -> String {
    let Value::Object(map) = result else {
        return cell(result);
    };
    let kpis = map.get("kpis").and_then(Value::as_object);

    for key in PRIORITY_KEYS {
        let found = map.get(key).or_else(|| kpis.and_then(|k| k.get(key)));
        match found {
            Some(Value::Null) | None => continue,
            Some(val) => return format_figure(key, val),
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, cell(val)),
        None => String::new(),
    }
}

fn format_figure(key: &str, value: &Value) -> String {
    if key == "region_shares" {
        if let Value::Array(rows) = value {
            return rows
                .iter()
                .map(|r| format!("{}: {}", cell(&r["region"]), percent(&r["market_share"])))
                .collect::<Vec<_>>()
                .join("\n");
        }
    }
    if key == "months" {
        if let Value::Array(rows) = value {
            return rows
                .iter()
                .map(|r| {
                    format!(
                        "{} {}: {}",
                        cell(&r["month"]),
                        cell(&r["year"]),
                        percent(&r["market_share"])
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
        }
    }
    if key.ends_with("share") || key.ends_with("attainment") {
        return percent(value);
    }
    cell(value)
}

fn percent(value: &Value) -> String {
    match cell(value).parse::<Decimal>() {
        Ok(d) => format!("{}%", d),
        Err(_) => cell(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scorecard_headline_is_market_share() {
        let v = json!({ "status": "ready", "achievement": 20, "market_share": "66.67" });
        assert_eq!(headline(&v), "66.67%");
    }

    #[test]
    fn test_summary_headline_comes_from_kpis() {
        let v = json!({ "rows": [], "kpis": { "avg_market_share": "50.5" } });
        assert_eq!(headline(&v), "50.5%");
    }

    #[test]
    fn test_no_data_prints_notice() {
        let v = json!({ "status": "no_data", "notice": "No data available for July 2025" });
        assert_eq!(headline(&v), "No data available for July 2025");
    }

    #[test]
    fn test_trend_headline_lists_monthly_share() {
        let v = json!({
            "from": "May 2025",
            "months": [
                { "year": 2025, "month": "May", "market_share": "33.33" },
                { "year": 2025, "month": "June", "market_share": "66.67" }
            ]
        });
        assert_eq!(headline(&v), "May 2025: 33.33%\nJune 2025: 66.67%");
    }
}
