use super::components::{render_category_table, render_cost_chart, UsageEditorComponent};
use crate::billing::PricingSnapshot;
use crate::core::breakdown::{format_amount, Breakdown};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::collections::HashMap;

/// Interactive cost simulator state
pub struct SimulatorApp {
    snapshot: PricingSnapshot,
    editor: UsageEditorComponent,
    breakdown: Breakdown,
    pub should_quit: bool,
}

impl SimulatorApp {
    pub fn new(snapshot: PricingSnapshot, usage: &HashMap<String, f64>, max_usage: u32) -> Self {
        let items = snapshot
            .modules
            .iter()
            .map(|m| (m.name.clone(), usage.get(&m.name).copied().unwrap_or(0.0)))
            .collect();
        let editor = UsageEditorComponent::new(items, max_usage as f64);

        let mut app = Self {
            breakdown: Breakdown::from_results(Vec::new(), &snapshot.currency),
            snapshot,
            editor,
            should_quit: false,
        };
        app.recompute();
        app
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
    }

    /// Usage quantities as currently set in the editor
    pub fn usage(&self) -> HashMap<String, f64> {
        self.editor.items().iter().cloned().collect()
    }

    fn recompute(&mut self) {
        self.breakdown = Breakdown::compute(&self.snapshot, &self.usage());
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let changed = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.editor.move_selection(-1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.editor.move_selection(1);
                None
            }
            KeyCode::Left | KeyCode::Char('h') => self.editor.adjust(-1.0),
            KeyCode::Right | KeyCode::Char('l') => self.editor.adjust(1.0),
            KeyCode::PageDown => self.editor.adjust(-10.0),
            KeyCode::PageUp => self.editor.adjust(10.0),
            KeyCode::Home => self.editor.set_current(0.0),
            KeyCode::End => self.editor.set_current(f64::MAX),
            _ => None,
        };

        if changed.is_some() {
            self.recompute();
        }
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Total
                Constraint::Min(10),   // Editor + charts
            ])
            .split(f.area());

        let mut spans = vec![
            Span::raw("💰 Estimated Monthly Cost: "),
            Span::styled(
                format!(
                    "{} {}",
                    format_amount(self.breakdown.total_cost),
                    self.breakdown.currency
                ),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if self.breakdown.failed_modules > 0 {
            spans.push(Span::styled(
                format!("  ✗ {} module(s) failed", self.breakdown.failed_modules),
                Style::default().fg(Color::Red),
            ));
        }
        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Pricing Simulator"),
        );
        f.render_widget(header, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        self.editor.render(f, body[0], &self.breakdown);

        let charts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(body[1]);

        render_cost_chart(f, charts[0], &self.breakdown);
        render_category_table(f, charts[1], &self.breakdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{ModuleDefinition, RawTierRow};

    fn app() -> SimulatorApp {
        let snapshot = PricingSnapshot::new(
            vec![
                ModuleDefinition::flat("Booking Manager", 250.0),
                ModuleDefinition::tiered("Parcel Manager"),
            ],
            "FCFA",
        )
        .with_tiers(
            "Parcel Manager",
            vec![RawTierRow::new(100.0, 10.0), RawTierRow::new("inf", 5.0)],
        );
        let usage = HashMap::from([("Booking Manager".to_string(), 40.0)]);
        SimulatorApp::new(snapshot, &usage, 1000)
    }

    #[test]
    fn test_initial_breakdown() {
        let app = app();
        assert_eq!(app.breakdown().total_cost, 10000.0);
    }

    #[test]
    fn test_keys_adjust_usage_and_recompute() {
        let mut app = app();
        app.handle_key(KeyCode::Right);
        assert_eq!(app.breakdown().total_cost, 10250.0);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::End);
        assert_eq!(app.usage()["Parcel Manager"], 1000.0);
        let parcel = app.breakdown().row("Parcel Manager").unwrap();
        assert_eq!(parcel.cost, Some(100.0 * 10.0 + 900.0 * 5.0));

        app.handle_key(KeyCode::Home);
        assert_eq!(app.usage()["Parcel Manager"], 0.0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(!app.should_quit);
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
