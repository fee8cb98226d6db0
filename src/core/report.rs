use super::breakdown::{format_amount, format_unit_price, format_usage, Breakdown};

const HEADERS: [&str; 6] = [
    "Module",
    "Category",
    "Usage",
    "Pricing Type",
    "Unit Price (used)",
    "Cost",
];

/// Headline total, e.g. `Estimated Monthly Cost: 10,650 FCFA`
pub fn render_summary(breakdown: &Breakdown) -> String {
    let mut line = format!(
        "Estimated Monthly Cost: {} {}",
        format_amount(breakdown.total_cost),
        breakdown.currency
    );

    if breakdown.failed_modules > 0 {
        line.push_str(&format!(
            " ({} module{} could not be priced)",
            breakdown.failed_modules,
            if breakdown.failed_modules == 1 { "" } else { "s" }
        ));
    }

    line
}

/// Per-module table, failed modules marked with `ERROR`
pub fn render_table(breakdown: &Breakdown) -> String {
    let rows: Vec<[String; 6]> = breakdown
        .rows
        .iter()
        .map(|row| {
            [
                row.module.clone(),
                row.category.clone(),
                format_usage(row.usage),
                row.pricing_type.clone(),
                format_unit_price(row.unit_price_used),
                match row.cost {
                    Some(cost) => format_amount(cost),
                    None => "ERROR".to_string(),
                },
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    let separator = widths.map(|w| "-".repeat(w));
    push_line(&mut out, &separator, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }

    let errors: Vec<String> = breakdown
        .failed_rows()
        .filter_map(|row| row.error.as_ref().map(|e| format!("  ✗ {}", e)))
        .collect();
    if !errors.is_empty() {
        out.push_str("\nErrors:\n");
        for error in errors {
            out.push_str(&error);
            out.push('\n');
        }
    }

    out
}

/// Cost per category, sorted by category name
pub fn render_categories(breakdown: &Breakdown) -> String {
    let width = breakdown
        .categories
        .iter()
        .map(|c| c.category.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len());

    let mut out = format!("{:<width$}  Modules  Cost\n", "Category", width = width);
    for category in &breakdown.categories {
        out.push_str(&format!(
            "{:<width$}  {:>7}  {}\n",
            category.category,
            category.modules,
            format_amount(category.cost),
            width = width
        ));
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(i, (cell, width))| {
            // Numeric columns are right-aligned
            if i >= 2 && i != 3 {
                format!("{:>width$}", cell, width = *width)
            } else {
                format!("{:<width$}", cell, width = *width)
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
