pub mod breakdown;
pub mod export;
pub mod report;

pub use breakdown::{format_amount, Breakdown, BreakdownRow, CategoryTotal};
pub use export::{to_csv, to_json, write_export};
pub use report::{render_categories, render_summary, render_table};
