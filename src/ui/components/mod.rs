pub mod cost_chart;
pub mod usage_editor;

pub use cost_chart::{render_category_table, render_cost_chart};
pub use usage_editor::UsageEditorComponent;
