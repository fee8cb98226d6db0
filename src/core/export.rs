use super::breakdown::Breakdown;
use std::fs;
use std::io;
use std::path::Path;

const CSV_HEADER: &str = "Module,Category,Usage,Pricing Type,Unit Price (used),Cost,Error";

/// Render the breakdown as CSV, one row per module
pub fn to_csv(breakdown: &Breakdown) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for row in &breakdown.rows {
        let fields = [
            csv_field(&row.module),
            csv_field(&row.category),
            row.usage.to_string(),
            csv_field(&row.pricing_type),
            row.unit_price_used.map(|p| p.to_string()).unwrap_or_default(),
            row.cost.map(|c| c.to_string()).unwrap_or_default(),
            csv_field(row.error.as_deref().unwrap_or("")),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

pub fn to_json(breakdown: &Breakdown) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(breakdown)
}

/// Write an export to `path`, creating parent directories as needed
pub fn write_export(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
