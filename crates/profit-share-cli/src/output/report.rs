use colored::Colorize;
use serde_json::Value;

use super::table;

/// Print the fixed-column report text, one line per record. Outputs without
/// report lines fall back to the table view.
pub fn print_report(value: &Value) {
    let Some(lines) = value.pointer("/result/report_lines").and_then(Value::as_array) else {
        table::print_table(value);
        return;
    };

    for line in lines.iter().filter_map(Value::as_str) {
        println!("{}", line);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        for w in warnings.iter().filter_map(Value::as_str) {
            eprintln!("{}: {}", "warning".yellow().bold(), w);
        }
    }
}
