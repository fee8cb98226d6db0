use crate::core::breakdown::{format_amount, format_usage, Breakdown};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Module list with an adjustable usage quantity per module
pub struct UsageEditorComponent {
    selected: usize,
    items: Vec<(String, f64)>,
    max_usage: f64,
}

impl UsageEditorComponent {
    pub fn new(items: Vec<(String, f64)>, max_usage: f64) -> Self {
        let items = items
            .into_iter()
            .map(|(name, usage)| (name, usage.clamp(0.0, max_usage)))
            .collect();
        Self {
            selected: 0,
            items,
            max_usage,
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn items(&self) -> &[(String, f64)] {
        &self.items
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.items.is_empty() {
            return;
        }

        let new_selection = (self.selected as i32 + delta)
            .max(0)
            .min((self.items.len() - 1) as i32) as usize;
        self.selected = new_selection;
    }

    /// Shift the selected usage by `delta`, clamped to `0..=max_usage`
    pub fn adjust(&mut self, delta: f64) -> Option<(String, f64)> {
        let max = self.max_usage;
        let (name, usage) = self.items.get_mut(self.selected)?;
        let updated = (*usage + delta).clamp(0.0, max);
        if updated == *usage {
            return None;
        }
        *usage = updated;
        Some((name.clone(), updated))
    }

    /// Set the selected usage directly, clamped to `0..=max_usage`
    pub fn set_current(&mut self, value: f64) -> Option<(String, f64)> {
        let current = self.items.get(self.selected)?.1;
        self.adjust(value - current)
    }

    pub fn render(&self, f: &mut Frame, area: Rect, breakdown: &Breakdown) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Module Usage")
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Module list
                Constraint::Length(2), // Help text
            ])
            .split(inner);

        if self.items.is_empty() {
            let empty = Paragraph::new("No modules configured")
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, chunks[0]);
        } else {
            let name_width = self
                .items
                .iter()
                .map(|(name, _)| name.chars().count())
                .max()
                .unwrap_or(0);

            let items: Vec<ListItem> = self
                .items
                .iter()
                .enumerate()
                .map(|(i, (name, usage))| {
                    let is_selected = i == self.selected;
                    let row = breakdown.row(name);
                    let cost_display = match row.and_then(|r| r.cost) {
                        Some(cost) => format_amount(cost),
                        None if row.is_some() => "✗ error".to_string(),
                        None => String::new(),
                    };

                    let marker = if is_selected { "▶" } else { " " };
                    let line = format!(
                        "{} {:<width$} {:>6}  {}",
                        marker,
                        name,
                        format_usage(*usage),
                        cost_display,
                        width = name_width
                    );

                    let failed = row.map(|r| r.error.is_some()).unwrap_or(false);
                    let style = match (is_selected, failed) {
                        (true, _) => Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                        (false, true) => Style::default().fg(Color::Red),
                        (false, false) => Style::default(),
                    };
                    ListItem::new(line).style(style)
                })
                .collect();

            f.render_widget(List::new(items), chunks[0]);
        }

        let help_text = "↑/↓: Module  ←/→: ±1  PgUp/PgDn: ±10  Home/End: Min/Max  q: Quit";
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::TOP));
        f.render_widget(help, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> UsageEditorComponent {
        UsageEditorComponent::new(
            vec![
                ("Booking Manager".to_string(), 40.0),
                ("Parcel Manager".to_string(), 2000.0),
            ],
            1000.0,
        )
    }

    #[test]
    fn test_initial_usage_is_clamped() {
        let editor = editor();
        assert_eq!(editor.items()[1].1, 1000.0);
    }

    #[test]
    fn test_move_selection_stays_in_bounds() {
        let mut editor = editor();
        editor.move_selection(-1);
        assert_eq!(editor.selected_index(), 0);
        editor.move_selection(5);
        assert_eq!(editor.selected_index(), 1);
    }

    #[test]
    fn test_adjust_clamps() {
        let mut editor = editor();
        assert_eq!(
            editor.adjust(10.0),
            Some(("Booking Manager".to_string(), 50.0))
        );
        assert_eq!(
            editor.adjust(-100.0),
            Some(("Booking Manager".to_string(), 0.0))
        );
        // Already at the floor
        assert_eq!(editor.adjust(-1.0), None);

        editor.move_selection(1);
        assert_eq!(editor.adjust(1.0), None);
        assert_eq!(
            editor.set_current(0.0),
            Some(("Parcel Manager".to_string(), 0.0))
        );
    }
}
