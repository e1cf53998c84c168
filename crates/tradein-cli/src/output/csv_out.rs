use serde_json::Value;
use std::io;

use super::{cell, is_row_array, result_of, ROW_TABLES};

/// Write the view's main table as CSV to stdout. Views with no row list
/// fall back to two-column field,value output.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, result_of(value));
    let _ = wtr.flush();
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Value) {
    match result {
        Value::Object(map) => {
            let main = ROW_TABLES
                .iter()
                .filter_map(|k| map.get(*k))
                .find(|v| is_row_array(v));
            match main {
                Some(Value::Array(rows)) => write_rows(wtr, rows),
                _ => {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in map {
                        let _ = wtr.write_record([key.as_str(), &cell(val)]);
                    }
                }
            }
        }
        Value::Array(arr) => write_rows(wtr, arr),
        _ => {
            let _ = wtr.write_record([&cell(result)]);
        }
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&cell(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
