use crate::core::breakdown::{format_amount, Breakdown};
use ratatui::{
    layout::{Constraint, Direction, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Row, Table},
    Frame,
};

/// Longest module label shown next to a bar
const LABEL_WIDTH: usize = 24;

/// Horizontal bar per module, scaled to its cost
pub fn render_cost_chart(f: &mut Frame, area: Rect, breakdown: &Breakdown) {
    let bars: Vec<Bar> = breakdown
        .rows
        .iter()
        .map(|row| {
            let cost = row.cost.unwrap_or(0.0).max(0.0);
            let text = match row.cost {
                Some(cost) => format_amount(cost),
                None => "error".to_string(),
            };
            let style = if row.error.is_some() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };

            Bar::default()
                .value(cost.round() as u64)
                .label(Line::from(truncate(&row.module, LABEL_WIDTH)))
                .text_value(text)
                .style(style)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Cost per Module ({})", breakdown.currency)),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

/// Category totals table
pub fn render_category_table(f: &mut Frame, area: Rect, breakdown: &Breakdown) {
    let header = Row::new(vec!["Category", "Modules", "Cost"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = breakdown
        .categories
        .iter()
        .map(|category| {
            Row::new(vec![
                Cell::from(category.category.clone()),
                Cell::from(category.modules.to_string()),
                Cell::from(format_amount(category.cost)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Cost by Category"),
    );

    f.render_widget(table, area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
