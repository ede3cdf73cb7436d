use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.as_object().and_then(|m| m.get("result"));
    match result {
        Some(Value::Object(res)) if res.contains_key("rows") => {
            if let Some(Value::Array(rows)) = res.get("rows") {
                write_grid_csv(&mut wtr, rows);
            }
        }
        Some(Value::Object(res)) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in res {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
        _ => match value {
            Value::Object(map) => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
            _ => {
                let _ = wtr.write_record([&format_csv_value(value)]);
            }
        },
    }

    let _ = wtr.flush();
}

/// `down,0,1,..` header, then one record per down-move level.
fn write_grid_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let width = rows.first().and_then(Value::as_array).map_or(0, Vec::len);
    let mut header = vec!["down".to_string()];
    header.extend((0..width).map(|c| c.to_string()));
    let _ = wtr.write_record(&header);

    for (down, row) in rows.iter().enumerate() {
        let cells = row.as_array().map(Vec::as_slice).unwrap_or(&[]);
        let mut record = vec![down.to_string()];
        record.extend((0..width).map(|c| cells.get(c).map(format_csv_value).unwrap_or_default()));
        let _ = wtr.write_record(&record);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
