//! Dashboard screen: summary counts, the status table and the traffic chart.
//!
//! ┌─ Online ─┐┌─ Offline ─┐┌─ Total ─┐
//! ├─ Clients ───────────────────────────┤
//! ├─ Traffic (24h) ─────────────────────┤

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, BorderType, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table,
    TableState,
};

use gamenet_core::{Dashboard, TrafficSeries};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::selection;

pub struct DashboardScreen {
    focused: bool,
    dashboard: Dashboard,
    table_state: TableState,
    loaded: bool,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            dashboard: Dashboard::new(),
            table_state: TableState::default(),
            loaded: false,
        }
    }

    fn selected_client(&self) -> Option<&gamenet_core::Client> {
        self.table_state
            .selected()
            .and_then(|i| self.dashboard.clients().get(i))
    }

    fn render_counts(&self, frame: &mut Frame, area: Rect) {
        let counts = self.dashboard.counts();
        let cards = [
            ("Online", counts.online, theme::SUCCESS_GREEN),
            ("Offline", counts.offline, theme::ERROR_RED),
            ("Total", counts.total, theme::NEON_CYAN),
        ];
        let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);

        for ((label, value, color), card_area) in cards.into_iter().zip(areas.iter()) {
            let block = Block::default()
                .title(format!(" {label} "))
                .title_style(theme::title_style())
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(theme::border_default());
            let text = if self.loaded {
                value.to_string()
            } else {
                "…".into()
            };
            let paragraph = Paragraph::new(Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, *card_area);
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Clients ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let header = Row::new(["Name", "MAC", "IP", "VHD", "Status"]).style(theme::table_header());
        let rows: Vec<Row> = self
            .dashboard
            .clients()
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(c.name.clone()),
                    Cell::from(c.mac_address.clone()),
                    Cell::from(c.ip_display().to_owned()),
                    Cell::from(c.vhd_name.clone()),
                    Cell::from(Span::styled(c.status_label(), theme::status_style(c.is_online))),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Length(19),
                Constraint::Length(16),
                Constraint::Fill(2),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected())
        .block(block);

        frame.render_stateful_widget(table, area, &mut self.table_state.clone());
    }

    fn render_traffic(&self, frame: &mut Frame, area: Rect) {
        let chart = self.dashboard.traffic();
        let mut title = vec![Span::styled(" Traffic (24h) ", theme::title_style())];
        if chart.series.as_ref().is_some_and(|s| s.simulated) {
            title.push(Span::styled("simulated ", theme::simulated()));
        }

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let Some(series) = &chart.series else {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  Waiting for data…").style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        };

        let (download, upload) = chart_points(series);
        let y_max = series
            .download
            .iter()
            .chain(series.upload.iter())
            .copied()
            .fold(0.0_f64, f64::max)
            .max(1.0)
            * 1.1;
        #[allow(clippy::cast_precision_loss)]
        let x_max = chart.labels.len().saturating_sub(1) as f64;

        let axis_style = Style::default().fg(theme::BORDER_GRAY);
        let x_labels: Vec<Span> = [
            chart.labels.first(),
            chart.labels.get(chart.labels.len() / 2),
            chart.labels.last(),
        ]
        .into_iter()
        .flatten()
        .map(|l| Span::styled(l.clone(), axis_style))
        .collect();

        let datasets = vec![
            Dataset::default()
                .name("Download")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::NEON_CYAN))
                .data(&download),
            Dataset::default()
                .name("Upload")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme::CORAL))
                .data(&upload),
        ];

        let widget = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([0.0, x_max])
                    .labels(x_labels)
                    .style(axis_style),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, y_max])
                    .labels(vec![
                        Span::styled("0", axis_style),
                        Span::styled(format!("{:.0}", y_max / 2.0), axis_style),
                        Span::styled(format!("{y_max:.0}"), axis_style),
                    ])
                    .style(axis_style),
            );

        frame.render_widget(widget, area);
    }
}

/// Chart points `(bucket, value)` for both series.
#[allow(clippy::cast_precision_loss)]
fn chart_points(series: &TrafficSeries) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let points = |values: &[f64]| -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect()
    };
    (points(&series.download), points(&series.upload))
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let len = self.dashboard.clients().len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::move_by(&mut self.table_state, len, 1),
            KeyCode::Char('k') | KeyCode::Up => selection::move_by(&mut self.table_state, len, -1),
            KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::Char('G') => selection::last(&mut self.table_state, len),
            KeyCode::Char('r') => {
                // Offline clients have no reboot control.
                let confirm = self
                    .selected_client()
                    .and_then(|c| self.dashboard.request_reboot(&c.id));
                return Ok(confirm.map(Action::ShowConfirm));
            }
            KeyCode::Char('R') => {
                return Ok(Some(Action::RefreshStatus(std::time::Duration::ZERO)));
            }
            KeyCode::Esc => return Ok(Some(Action::GoBack)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StatusUpdated(snapshot) if snapshot.is_loaded() => {
                self.dashboard.update(&snapshot.clients);
                self.loaded = true;
            }
            Action::ClientsReloaded(clients) => {
                self.dashboard.update(clients);
                self.loaded = true;
            }
            Action::TrafficLoaded(series) => {
                self.dashboard.traffic_mut().update(series.clone());
            }
            _ => return Ok(None),
        }
        selection::clamp(&mut self.table_state, self.dashboard.clients().len());
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [counts, table, traffic] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(12),
        ])
        .areas(area);

        self.render_counts(frame, counts);
        self.render_table(frame, table);
        self.render_traffic(frame, traffic);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "dashboard"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use gamenet_core::{Client, ClientId, PendingAction, StatusSnapshot};

    use super::*;

    fn client(id: u64, name: &str, online: bool) -> Client {
        Client {
            id: ClientId::from(id),
            name: name.into(),
            mac_address: format!("AA:BB:CC:DD:EE:{id:02X}"),
            ip_address: online.then(|| format!("10.0.0.{id}")),
            vhd_name: "Win11".into(),
            is_online: online,
        }
    }

    fn snapshot(sequence: u64, clients: Vec<Client>) -> Action {
        Action::StatusUpdated(StatusSnapshot {
            sequence,
            clients: Arc::new(clients),
            fetched_at: None,
        })
    }

    fn press(screen: &mut DashboardScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn empty_snapshot_is_ignored_until_first_fetch() {
        let mut screen = DashboardScreen::new();
        screen.update(&snapshot(0, vec![])).unwrap();
        assert!(!screen.loaded);

        screen
            .update(&snapshot(1, vec![client(1, "PC-01", true), client(2, "PC-02", false)]))
            .unwrap();
        assert!(screen.loaded);
        assert_eq!(screen.dashboard.counts().online, 1);
        assert_eq!(screen.table_state.selected(), Some(0));
    }

    #[test]
    fn reboot_prompts_only_for_online_clients() {
        let mut screen = DashboardScreen::new();
        screen
            .update(&snapshot(1, vec![client(1, "PC-01", true), client(2, "PC-02", false)]))
            .unwrap();

        match press(&mut screen, KeyCode::Char('r')) {
            Some(Action::ShowConfirm(c)) => {
                assert_eq!(c.action, PendingAction::DashboardReboot { id: ClientId::from(1) });
            }
            other => panic!("expected confirm, got {other:?}"),
        }

        press(&mut screen, KeyCode::Down);
        assert!(press(&mut screen, KeyCode::Char('r')).is_none());
    }

    #[test]
    fn full_rebuild_drops_missing_clients() {
        let mut screen = DashboardScreen::new();
        screen
            .update(&snapshot(1, vec![client(1, "PC-01", true), client(2, "PC-02", true)]))
            .unwrap();
        press(&mut screen, KeyCode::Char('G'));
        screen.update(&snapshot(2, vec![client(1, "PC-01", true)])).unwrap();

        assert_eq!(screen.dashboard.clients().len(), 1);
        assert_eq!(screen.table_state.selected(), Some(0));
    }
}
