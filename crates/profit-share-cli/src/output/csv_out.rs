use serde_json::Value;
use std::io;

/// Result fields exported row-per-member when present.
const ROW_SECTIONS: [&str; 2] = ["entries", "members"];

/// Write output as CSV to stdout: the member rows when the result has them,
/// otherwise a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);
    let rows = ROW_SECTIONS
        .iter()
        .find_map(|key| result.get(*key).and_then(Value::as_array));

    match (rows, result) {
        (Some(rows), _) => write_array_csv(&mut wtr, rows),
        (None, Value::Object(map)) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map.iter().filter(|(k, _)| k.as_str() != "report_lines") {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
        (None, Value::Array(arr)) => write_array_csv(&mut wtr, arr),
        (None, other) => {
            let _ = wtr.write_record([&format_csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
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
