//! Clients screen: the client table with live status and a detail panel.
//!
//! The table is loaded from the first status snapshot (or a reload after a
//! write) and patched in place by every later snapshot.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use gamenet_core::stats::STATS_UNAVAILABLE_MESSAGE;
use gamenet_core::{ClientDetail, ClientId, ClientsPage, DetailView, StatsView};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::selection;

pub struct ClientsScreen {
    focused: bool,
    page: ClientsPage,
    loaded: bool,
    table_state: TableState,
    /// Client whose panel was requested and has not arrived yet.
    detail_pending: Option<ClientId>,
}

impl ClientsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            page: ClientsPage::new(),
            loaded: false,
            table_state: TableState::default(),
            detail_pending: None,
        }
    }

    fn visible_len(&self) -> usize {
        self.page.visible_rows().len()
    }

    fn selected_id(&self) -> Option<ClientId> {
        let rows = self.page.visible_rows();
        self.table_state
            .selected()
            .and_then(|i| rows.get(i))
            .map(|r| r.client.id.clone())
    }

    fn detail_open(&self) -> bool {
        self.page.detail().is_some() || self.detail_pending.is_some()
    }

    fn close_detail(&mut self) {
        self.page.close_detail();
        self.detail_pending = None;
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let visible = self.page.visible_rows();
        let mut title = vec![Span::styled(
            format!(" Clients ({}) ", visible.len()),
            theme::title_style(),
        )];
        if !self.page.query().is_empty() {
            title.push(Span::styled(
                format!("filter: {} ", self.page.query()),
                theme::key_hint(),
            ));
        }

        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused && !self.detail_open() {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        if !self.loaded {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  Loading clients…").style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        let header =
            Row::new(["ID", "Name", "MAC", "IP", "VHD", "Status", ""]).style(theme::table_header());
        let rows: Vec<Row> = visible
            .iter()
            .map(|row| {
                let c = &row.client;
                Row::new(vec![
                    Cell::from(c.id.to_string()),
                    Cell::from(c.name.clone()),
                    Cell::from(c.mac_address.clone()),
                    Cell::from(c.ip_display().to_owned()),
                    Cell::from(c.vhd_name.clone()),
                    Cell::from(Span::styled(c.status_label(), theme::status_style(c.is_online))),
                    Cell::from(if row.can_reboot { "r reboot" } else { "" })
                        .style(theme::key_hint()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Fill(2),
                Constraint::Length(19),
                Constraint::Length(16),
                Constraint::Fill(2),
                Constraint::Length(8),
                Constraint::Length(9),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected())
        .block(block);

        frame.render_stateful_widget(table, area, &mut self.table_state.clone());
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Client Details ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match self.page.detail() {
            None => vec![Line::from(Span::styled("Loading…", theme::key_hint()))],
            Some(DetailView::Found(detail)) => detail_lines(detail),
            Some(view) => vec![Line::from(Span::styled(
                view.message().unwrap_or_default(),
                Style::default().fg(theme::ERROR_RED),
            ))],
        };

        let mut lines = lines;
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("close", theme::key_hint()),
        ]));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), theme::key_hint()),
        Span::styled(value, Style::default().fg(theme::DIM_WHITE)),
    ])
}

fn detail_lines(detail: &ClientDetail) -> Vec<Line<'static>> {
    let c = &detail.client;
    let mut lines = vec![
        Line::from(Span::styled(
            c.name.clone(),
            Style::default()
                .fg(theme::NEON_CYAN)
                .add_modifier(Modifier::BOLD),
        )),
        field("ID", c.id.to_string()),
        field("MAC", c.mac_address.clone()),
        field("IP", c.ip_display().to_owned()),
        field("VHD", c.vhd_name.clone()),
        Line::from(vec![
            Span::styled(format!("{:<10}", "Status"), theme::key_hint()),
            Span::styled(c.status_label(), theme::status_style(c.is_online)),
        ]),
    ];

    // Offline clients have no stats section.
    let Some(stats) = &detail.stats else {
        return lines;
    };

    lines.push(Line::from(""));
    let mut heading = vec![Span::styled("Statistics ", theme::title_style())];
    if stats.is_simulated() {
        heading.push(Span::styled("(simulated)", theme::simulated()));
    }
    lines.push(Line::from(heading));

    match stats {
        StatsView::Loading => {
            lines.push(Line::from(Span::styled("Loading…", theme::key_hint())));
        }
        StatsView::Unavailable => {
            lines.push(Line::from(Span::styled(
                STATS_UNAVAILABLE_MESSAGE,
                theme::key_hint(),
            )));
        }
        StatsView::Live(s) | StatsView::Simulated(s) => {
            lines.push(field("CPU", s.cpu_display()));
            lines.push(field("Memory", s.memory_display()));
            lines.push(field("Download", s.download_display()));
            lines.push(field("Upload", s.upload_display()));
            lines.push(field("Updated", s.updated_display()));
        }
    }
    lines
}

impl Component for ClientsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.detail_open() {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.close_detail();
                    Some(Action::CloseDetail)
                }
                _ => None,
            });
        }

        let len = self.visible_len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => selection::move_by(&mut self.table_state, len, 1),
            KeyCode::Char('k') | KeyCode::Up => selection::move_by(&mut self.table_state, len, -1),
            KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::Char('G') => selection::last(&mut self.table_state, len),
            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.detail_pending = Some(id.clone());
                    return Ok(Some(Action::OpenClientDetail(id)));
                }
            }
            KeyCode::Char('r') => {
                let confirm = self
                    .selected_id()
                    .and_then(|id| self.page.request_reboot(&id));
                return Ok(confirm.map(Action::ShowConfirm));
            }
            KeyCode::Char('d') => {
                let confirm = self
                    .selected_id()
                    .and_then(|id| self.page.request_delete(&id));
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
                if self.loaded {
                    self.page.apply_status(&snapshot.clients);
                } else {
                    self.page.load(snapshot.clients.to_vec());
                    self.loaded = true;
                }
            }
            Action::ClientsReloaded(clients) => {
                self.page.load(clients.clone());
                self.loaded = true;
            }
            Action::ClientDetailLoaded(view) => {
                let requested = self.detail_pending.take();
                let matches = match view {
                    DetailView::Found(detail) => requested.as_ref() == Some(&detail.client.id),
                    DetailView::NotFound | DetailView::Error => requested.is_some(),
                };
                // A panel closed before its data arrived stays closed.
                if matches {
                    self.page.open_detail(view.clone());
                }
            }
            Action::ClientStatsLoaded(id, stats) => {
                self.page.set_stats(id, stats.clone());
            }
            Action::SearchInput(query) => {
                self.page.set_query(query.clone());
                self.table_state.select(Some(0));
            }
            _ => return Ok(None),
        }
        let len = self.visible_len();
        selection::clamp(&mut self.table_state, len);
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.detail_open() {
            let [table, detail] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(area);
            self.render_table(frame, table);
            self.render_detail(frame, detail);
        } else {
            self.render_table(frame, area);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "clients"
    }
}
