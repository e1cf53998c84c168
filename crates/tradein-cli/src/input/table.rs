use calamine::{open_workbook_auto, Data, Reader};
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

use tradein_core::records::RawTable;

use super::file::{extension, resolve_path};

/// Read a channel export into a raw table. `.csv` goes through the csv
/// reader; `.xlsx`, `.xlsm`, `.xls` and `.ods` through calamine, reading
/// `sheet` or else the first worksheet.
pub fn read_table(path: &str, sheet: Option<&str>) -> Result<RawTable, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let table = match extension(&canonical).as_deref() {
        Some("csv") => {
            let file = std::fs::File::open(&canonical)
                .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
            read_csv(file).map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
        }
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
            read_workbook(&canonical, sheet)?
        }
        other => {
            return Err(format!(
                "Unsupported file type '{}' for {}; expected .csv, .xlsx, .xls or .ods",
                other.unwrap_or(""),
                canonical.display()
            )
            .into())
        }
    };
    info!(file = %canonical.display(), rows = table.len(), "table loaded");
    Ok(table)
}

/// First record is the header row. Short rows are padded so every row has
/// one cell per header.
pub fn read_csv<R: io::Read>(reader: R) -> Result<RawTable, Box<dyn std::error::Error>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(headers.len(), String::new());
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(RawTable::new(headers, rows))
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable, Box<dyn std::error::Error>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;

    let sheet_name = match sheet {
        Some(s) => s.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| format!("'{}' has no worksheets", path.display()))?,
    };
    debug!(sheet = %sheet_name, "reading worksheet");

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(h) => h.iter().map(cell_text).collect(),
        None => return Ok(RawTable::default()),
    };
    let body = rows
        .map(|r| {
            let mut row: Vec<String> = r.iter().map(cell_text).collect();
            row.resize(headers.len(), String::new());
            row
        })
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .collect();
    Ok(RawTable::new(headers, body))
}

/// Text form of a spreadsheet cell. Date cells become ISO dates and whole
/// floats lose their ".0" so years and IMEIs read as typed.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => d.date().format("%Y-%m-%d").to_string(),
            None => float_text(dt.as_f64()),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => {
            warn!("spreadsheet cell error {:?}", e);
            String::new()
        }
    }
}

fn float_text(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_csv_pads_short_rows() {
        let data = "Created Date,Store Name,Maple Bid\n01-05-2025,Iplanet @ Omr,\"15,000\"\n02-05-2025,Iplanet @ Omr\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["Created Date", "Store Name", "Maple Bid"]);
        assert_eq!(table.rows[0][2], "15,000");
        assert_eq!(table.rows[1], vec!["02-05-2025", "Iplanet @ Omr", ""]);
    }

    #[test]
    fn test_read_csv_skips_blank_rows_and_bom() {
        let data = "\u{feff}Month,Year\nMay,2025\n,\nJune,2025\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers[0], "Month");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_csv_feeds_the_loader() {
        let data = "Order Date,Month,Year,Store Name,Spocs,Zone,Store State,Cashify Price,Old Device IMEI\n\
                    2025-05-06,May,2025,iplanet @ omr,gopi j,South,tamil nadu,\"₹12,000\",3512\n";
        let table = read_csv(data.as_bytes()).unwrap();
        let loaded =
            tradein_core::records::load_records(&table, tradein_core::Channel::Cashify).unwrap();
        let rec = &loaded.set.records[0];
        assert_eq!(rec.store_name.as_deref(), Some("Iplanet @ Omr"));
        assert_eq!(rec.representative.as_deref(), Some("Gopi J"));
        assert_eq!(rec.day(), Some(6));
    }

    #[test]
    fn test_cell_text_formats() {
        assert_eq!(cell_text(&Data::Float(2025.0)), "2025");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("Phone".into())), "Phone");
    }

    #[test]
    fn test_unsupported_extension_is_error() {
        let path = std::env::temp_dir().join("tradein-table-test.txt");
        std::fs::write(&path, "a,b\n").unwrap();
        let err = read_table(path.to_str().unwrap(), None).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }
}
