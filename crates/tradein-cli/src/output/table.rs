use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, is_row_array, result_of};

/// Print a view as tables: one Field/Value table of its scalar figures,
/// then one table per list of rows, then warnings and methodology.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            if let Some(Value::String(notice)) = result.get("notice") {
                println!("{}", notice);
            } else {
                let mut fields = Vec::new();
                let mut sections = Vec::new();
                collect(result, "", &mut fields, &mut sections);
                if !fields.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["Field", "Value"]);
                    for (k, v) in &fields {
                        builder.push_record([k.as_str(), v.as_str()]);
                    }
                    println!("{}", Table::from(builder));
                }
                for (title, rows) in sections {
                    println!("\n{}:", title);
                    print_rows(rows);
                }
            }
        }
        Value::Array(arr) => print_rows(arr),
        other => println!("{}", cell(other)),
    }

    print_trailer(value);
}

/// Split an object into flat `a.b` scalar fields and row-list sections.
fn collect<'a>(
    map: &'a Map<String, Value>,
    prefix: &str,
    fields: &mut Vec<(String, String)>,
    sections: &mut Vec<(String, &'a [Value])>,
) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Array(arr) if is_row_array(val) => sections.push((name, arr.as_slice())),
            Value::Object(inner) => collect(inner, &name, fields, sections),
            _ => fields.push((name, cell(val))),
        }
    }
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);
        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", cell(item));
        }
    }
}

fn print_trailer(envelope: &Value) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", cell(w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
