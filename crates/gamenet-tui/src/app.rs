//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gamenet_core::{
    ClientId, ClientsPage, Confirmation, Controller, Dashboard, DetailView, Notice, PendingAction,
    StatsView, VhdId, VhdImage, VhdPage,
};

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::{self, BridgeRequest};
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    connection_status: ConnectionStatus,
    /// Last connection error, shown in the status bar.
    connection_error: Option<String>,
    help_visible: bool,
    search_active: bool,
    search_query: String,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    bridge_tx: mpsc::UnboundedSender<BridgeRequest>,
    /// Taken by the data bridge when the loop starts.
    bridge_rx: Option<mpsc::UnboundedReceiver<BridgeRequest>>,
    data_cancel: CancellationToken,
    /// Open confirmation dialog; blocks other input while set.
    pending_confirm: Option<Confirmation>,
    notification: Option<(Notice, Instant)>,
    throbber: ThrobberState,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (bridge_tx, bridge_rx) = mpsc::unbounded_channel();

        Self {
            active_screen: ScreenId::Dashboard,
            previous_screen: None,
            screens: create_screens().into_iter().collect(),
            running: true,
            connection_status: ConnectionStatus::default(),
            connection_error: None,
            help_visible: false,
            search_active: false,
            search_query: String::new(),
            action_tx,
            action_rx,
            controller,
            bridge_tx,
            bridge_rx: Some(bridge_rx),
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
            throbber: ThrobberState::default(),
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        if let Some(requests) = self.bridge_rx.take() {
            let controller = self.controller.clone();
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                data_bridge::spawn_data_bridge(controller, tx, requests, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key to an action. Overlays and text input take precedence over
    /// global keys; everything else goes to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.search_active {
            return Ok(match key.code {
                KeyCode::Esc => {
                    self.search_query.clear();
                    self.action_tx.send(Action::SearchInput(String::new()))?;
                    Some(Action::CloseSearch)
                }
                KeyCode::Enter => Some(Action::CloseSearch),
                KeyCode::Backspace => {
                    self.search_query.pop();
                    Some(Action::SearchInput(self.search_query.clone()))
                }
                KeyCode::Char(c) => {
                    self.search_query.push(c);
                    Some(Action::SearchInput(self.search_query.clone()))
                }
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        // A screen with an open text field gets every key.
        let captures = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());
        if !captures {
            match (key.modifiers, key.code) {
                (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
                (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
                (KeyModifiers::NONE, KeyCode::Char('/')) => return Ok(Some(Action::OpenSearch)),
                (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='3')) => {
                    if let Some(screen) = ScreenId::from_number(c as u8 - b'0') {
                        return Ok(Some(Action::SwitchScreen(screen)));
                    }
                }
                (KeyModifiers::NONE, KeyCode::Tab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
                }
                (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
                }
                _ => {}
            }
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }
        Ok(None)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.previous_screen = Some(self.active_screen);
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::OpenSearch => {
                self.search_active = true;
                self.search_query.clear();
            }

            Action::CloseSearch => self.search_active = false,

            Action::Connected => {
                self.connection_status = ConnectionStatus::Connected;
                self.connection_error = None;
            }
            Action::Connecting => self.connection_status = ConnectionStatus::Connecting,
            Action::Disconnected(reason) => {
                self.connection_status = ConnectionStatus::Disconnected;
                self.connection_error = Some(reason.clone());
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                if self.connection_status == ConnectionStatus::Connecting {
                    self.throbber.calc_next();
                }
            }

            Action::Render | Action::Resize(..) => {}

            // Data updates go to every screen so they stay in sync
            Action::StatusUpdated(_)
            | Action::ClientsReloaded(_)
            | Action::VhdsLoaded(_)
            | Action::TrafficLoaded(_)
            | Action::ClientDetailLoaded(_)
            | Action::ClientStatsLoaded(..) => {
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            // ── Requests ──────────────────────────────────────────────
            Action::OpenClientDetail(id) => self.load_client_detail(id.clone()),

            Action::ShowConfirm(confirmation) => {
                self.pending_confirm = Some(confirmation.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirmation) = self.pending_confirm.take() {
                    self.execute_pending(confirmation.action)?;
                }
            }

            Action::ConfirmNo => self.pending_confirm = None,

            Action::VhdDeleteConfirmed(_) => {
                if let Some(screen) = self.screens.get_mut(&ScreenId::Vhd) {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            Action::DeleteVhd(image) => self.delete_vhd(image.clone()),

            Action::SubmitClone { id, name } => self.clone_vhd(id.clone(), name.clone()),

            Action::RefreshStatus(delay) => {
                if self.bridge_tx.send(BridgeRequest::Refresh(*delay)).is_err() {
                    warn!("data bridge is gone; refresh dropped");
                }
            }

            Action::ReloadVhds => {
                if self.bridge_tx.send(BridgeRequest::ReloadVhds).is_err() {
                    warn!("data bridge is gone; reload dropped");
                }
            }

            Action::Notify(notice) => {
                self.notification = Some((notice.clone(), Instant::now()));
            }

            // Everything else goes to the active screen only
            other => {
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    if let Some(follow_up) = screen.update(other)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    // ── Background requests ─────────────────────────────────────────

    /// Fetch the panel for `id`, then its stats if the client is online.
    fn load_client_detail(&self, id: ClientId) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let view = ClientsPage::fetch_detail(&controller, &id).await;
            let wants_stats = matches!(
                &view,
                DetailView::Found(detail) if detail.stats == Some(StatsView::Loading)
            );
            let _ = tx.send(Action::ClientDetailLoaded(view));
            if wants_stats {
                let fallback = controller.config().stats_fallback;
                let stats = ClientsPage::fetch_stats(&controller, &id, fallback).await;
                let _ = tx.send(Action::ClientStatsLoaded(id, stats));
            }
        });
    }

    /// Run a confirmed action in the background.
    fn execute_pending(&self, action: PendingAction) -> Result<()> {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        let refresh_delay = controller.config().reboot_refresh_delay;

        match action {
            PendingAction::RebootClient { id } => {
                tokio::spawn(async move {
                    let outcome = ClientsPage::reboot(&controller, &id, refresh_delay).await;
                    let _ = tx.send(Action::Notify(outcome.notice));
                    if let Some(delay) = outcome.refresh_after {
                        let _ = tx.send(Action::RefreshStatus(delay));
                    }
                });
            }
            PendingAction::DashboardReboot { id } => {
                tokio::spawn(async move {
                    if let Some(delay) = Dashboard::reboot(&controller, &id, refresh_delay).await {
                        let _ = tx.send(Action::RefreshStatus(delay));
                    }
                });
            }
            PendingAction::DeleteClient { id } => {
                tokio::spawn(async move {
                    match ClientsPage::delete(&controller, &id).await {
                        Ok(clients) => {
                            let _ = tx.send(Action::ClientsReloaded(clients));
                            let _ = tx.send(Action::Notify(Notice::success("Client deleted")));
                        }
                        Err(e) => {
                            warn!(error = %e, %id, "client delete failed");
                            let _ = tx.send(Action::Notify(Notice::error(format!(
                                "Error deleting client: {e}"
                            ))));
                        }
                    }
                });
            }
            PendingAction::DeleteVhd { id } => {
                self.action_tx.send(Action::VhdDeleteConfirmed(id))?;
            }
        }
        Ok(())
    }

    fn delete_vhd(&self, image: VhdImage) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match VhdPage::delete(&controller, &image).await {
                Ok(images) => {
                    let _ = tx.send(Action::VhdsLoaded(images));
                    let _ = tx.send(Action::Notify(Notice::success(format!(
                        "Deleted {}",
                        image.name
                    ))));
                }
                Err(e) => {
                    let _ = tx.send(Action::Notify(Notice::error(e.to_string())));
                }
            }
        });
    }

    fn clone_vhd(&self, id: VhdId, name: String) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match VhdPage::clone_vhd(&controller, &id, &name).await {
                Ok(images) => {
                    let _ = tx.send(Action::VhdsLoaded(images));
                    let _ = tx.send(Action::Notify(Notice::success(format!(
                        "Cloned to {}",
                        name.trim()
                    ))));
                }
                Err(e) => {
                    warn!(error = %e, %id, "clone failed");
                    let _ = tx.send(Action::Notify(Notice::error(e.to_string())));
                }
            }
        });
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // tab bar
            Constraint::Length(1), // status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }

        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays: last drawn is topmost
        if let Some((notice, _)) = &self.notification {
            render_notification(frame, area, notice);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let selected = ScreenId::ALL
            .iter()
            .position(|&s| s == self.active_screen)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(selected);

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&mut self, frame: &mut Frame, area: Rect) {
        if self.search_active {
            let line = Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::ELECTRIC_PURPLE)),
                Span::styled(&self.search_query, Style::default().fg(theme::NEON_CYAN)),
                Span::styled("█", Style::default().fg(theme::NEON_CYAN)),
                Span::styled("  Esc clear  Enter keep", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let hints = " │ ? help  / search  q quit";
        let server = self.controller.config().url.to_string();

        if self.connection_status == ConnectionStatus::Connecting {
            let [spinner_area, hint_area] =
                Layout::horizontal([Constraint::Length(40), Constraint::Min(0)]).areas(area);
            let throbber = Throbber::default()
                .label(format!("connecting to {server}"))
                .style(Style::default().fg(theme::ELECTRIC_YELLOW))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, spinner_area, &mut self.throbber);
            frame.render_widget(Paragraph::new(Span::styled(hints, theme::key_hint())), hint_area);
            return;
        }

        let indicator = match (&self.connection_status, &self.connection_error) {
            (ConnectionStatus::Connected, _) => Span::styled(
                format!("● {server}"),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            (_, Some(reason)) => Span::styled(
                format!("○ {reason}"),
                Style::default().fg(theme::ERROR_RED),
            ),
            _ => Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED)),
        };

        let line = Line::from(vec![
            Span::raw(" "),
            indicator,
            Span::styled(hints, theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

// ── Overlays ────────────────────────────────────────────────────────

/// A `width` × `height` rect centered in `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 56, 20);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
            Span::styled(desc, theme::key_hint()),
        ])
    };
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(theme::NEON_CYAN)))
    };

    let help_text = vec![
        Line::from(""),
        heading("  Navigation"),
        entry("1-3", "Jump to screen"),
        entry("Tab", "Next screen"),
        entry("j/k ↑/↓", "Move up/down"),
        entry("Enter", "Open details"),
        entry("Esc", "Close panel / back"),
        Line::from(""),
        heading("  Actions"),
        entry("r", "Reboot client (online only)"),
        entry("d", "Delete client or VHD"),
        entry("c", "Clone VHD"),
        entry("R", "Reload now"),
        Line::from(""),
        heading("  Global"),
        entry("/", "Search"),
        entry("?", "This help"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("                    Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &Confirmation) {
    let dialog_area = centered(area, 60, 7);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            confirm.message.as_str(),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notice: &Notice) {
    let msg_len = u16::try_from(notice.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 70).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let color = theme::notice_color(notice.level);
    let icon = match notice.level {
        gamenet_core::NoticeLevel::Success => "✓",
        gamenet_core::NoticeLevel::Error => "✗",
        gamenet_core::NoticeLevel::Warning => "!",
        gamenet_core::NoticeLevel::Info => "·",
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notice.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
