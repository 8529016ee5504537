use serde_json::Value;

/// Pretty-print the envelope to stdout, leaving the report text out.
pub fn print_json(value: &Value) {
    let mut value = value.clone();
    if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
        result.remove("report_lines");
    }
    match serde_json::to_string_pretty(&value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
