//! VHD screen: image table, detail panel, delete and clone.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap,
};
use tui_input::Input;

use gamenet_core::validate;
use gamenet_core::vhd_page::{Badge, LOCKED_DELETE_REASON};
use gamenet_core::{CloneDialog, DeleteControl, Notice, VhdDetail, VhdId, VhdPage};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::{input_field, selection};

/// Open clone dialog with its editable name.
struct CloneForm {
    dialog: CloneDialog,
    name: Input,
    error: Option<String>,
}

pub struct VhdScreen {
    focused: bool,
    page: VhdPage,
    loaded: bool,
    table_state: TableState,
    detail: Option<VhdId>,
    clone_form: Option<CloneForm>,
}

impl VhdScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            page: VhdPage::new(),
            loaded: false,
            table_state: TableState::default(),
            detail: None,
            clone_form: None,
        }
    }

    fn visible_len(&self) -> usize {
        self.page.visible_rows().len()
    }

    fn selected_id(&self) -> Option<VhdId> {
        let rows = self.page.visible_rows();
        self.table_state
            .selected()
            .and_then(|i| rows.get(i))
            .map(|v| v.id.clone())
    }

    /// The image the action keys apply to: the open panel, else the cursor.
    fn target_id(&self) -> Option<VhdId> {
        self.detail.clone().or_else(|| self.selected_id())
    }

    fn request_delete(&self) -> Option<Action> {
        let id = self.target_id()?;
        match self.page.request_delete(&id) {
            Some(confirm) => Some(Action::ShowConfirm(confirm)),
            None if self.page.image(&id).is_some() => {
                Some(Action::Notify(Notice::error(LOCKED_DELETE_REASON)))
            }
            None => None,
        }
    }

    fn open_clone(&mut self) {
        if let Some(dialog) = self.target_id().and_then(|id| self.page.clone_dialog(&id)) {
            self.clone_form = Some(CloneForm {
                name: Input::new(dialog.suggested_name.clone()),
                dialog,
                error: None,
            });
        }
    }

    fn handle_clone_key(&mut self, key: KeyEvent) -> Option<Action> {
        let form = self.clone_form.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.clone_form = None;
                None
            }
            KeyCode::Enter => match validate::clone_name(form.name.value()) {
                Ok(name) => {
                    let id = form.dialog.source.clone();
                    self.clone_form = None;
                    Some(Action::SubmitClone { id, name })
                }
                Err(e) => {
                    form.error = Some(e.message);
                    None
                }
            },
            _ => {
                if input_field::handle_key(&mut form.name, key) {
                    form.error = None;
                }
                None
            }
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let visible = self.page.visible_rows();
        let mut title = vec![Span::styled(
            format!(" VHD Images ({}) ", visible.len()),
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
            .border_style(if self.focused && self.detail.is_none() {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        if !self.loaded {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new("  Loading images…").style(Style::default().fg(theme::BORDER_GRAY)),
                inner,
            );
            return;
        }

        let header = Row::new(["ID", "Name", "Size", "Windows", "Template", "Locked"])
            .style(theme::table_header());
        let rows: Vec<Row> = visible
            .iter()
            .map(|v| {
                let flag = |on: bool| if on { "Yes" } else { "No" };
                Row::new(vec![
                    Cell::from(v.id.to_string()),
                    Cell::from(v.name.clone()),
                    Cell::from(v.size_display()),
                    Cell::from(v.windows_display().to_owned()),
                    Cell::from(flag(v.is_template)),
                    Cell::from(flag(v.is_locked)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Fill(2),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(9),
                Constraint::Length(7),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected())
        .block(block);

        frame.render_stateful_widget(table, area, &mut self.table_state.clone());
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, detail: &VhdDetail) {
        let block = Block::default()
            .title(format!(" {} ", detail.title))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let field = |label: &str, value: &str| {
            Line::from(vec![
                Span::styled(format!("{label:<10}"), theme::key_hint()),
                Span::styled(value.to_owned(), Style::default().fg(theme::DIM_WHITE)),
            ])
        };
        let badge = |label: &str, badge: &Badge| {
            Line::from(vec![
                Span::styled(format!("{label:<10}"), theme::key_hint()),
                Span::styled(format!(" {} ", badge.label), theme::badge_style(badge.tone)),
            ])
        };

        let mut lines = vec![
            field("Size", &detail.size),
            field("Windows", &detail.windows_version),
            field("Path", &detail.file_path),
            field("Created", &detail.created),
            field("Modified", &detail.modified),
            badge("Template", &detail.template),
            badge("Locked", &detail.locked),
            Line::from(""),
            Line::from(Span::styled(
                detail.description.clone(),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
        ];

        let mut keys = vec![
            Span::styled("c ", theme::key_hint_key()),
            Span::styled("clone  ", theme::key_hint()),
        ];
        match detail.delete {
            DeleteControl::Enabled => {
                keys.push(Span::styled("d ", theme::key_hint_key()));
                keys.push(Span::styled("delete  ", theme::key_hint()));
            }
            DeleteControl::Disabled { reason } => {
                keys.push(Span::styled(
                    format!("{reason}  "),
                    Style::default()
                        .fg(theme::BORDER_GRAY)
                        .add_modifier(Modifier::CROSSED_OUT),
                ));
            }
        }
        keys.push(Span::styled("Esc ", theme::key_hint_key()));
        keys.push(Span::styled("close", theme::key_hint()));
        lines.push(Line::from(keys));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn render_clone_dialog(frame: &mut Frame, area: Rect, form: &CloneForm) {
        let width = 60u16.min(area.width.saturating_sub(4));
        let height = 7u16.min(area.height);
        let dialog_area = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(format!(" Clone {} ", form.dialog.source_name))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let [input_row, error_row, _, hint_row] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        input_field::render(frame, input_row, "New name", &form.name);
        if let Some(error) = &form.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.as_str(), Style::default().fg(theme::ERROR_RED))),
                error_row,
            );
        }
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("clone  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])),
            hint_row,
        );
    }
}

impl Component for VhdScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.clone_form.is_some() {
            return Ok(self.handle_clone_key(key));
        }

        if self.detail.is_some() {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.detail = None;
                    None
                }
                KeyCode::Char('d') => self.request_delete(),
                KeyCode::Char('c') => {
                    self.open_clone();
                    None
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
            KeyCode::Enter => self.detail = self.selected_id(),
            KeyCode::Char('d') => return Ok(self.request_delete()),
            KeyCode::Char('c') => self.open_clone(),
            KeyCode::Char('R') => return Ok(Some(Action::ReloadVhds)),
            KeyCode::Esc => return Ok(Some(Action::GoBack)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::VhdsLoaded(images) => {
                self.page.load(images.clone());
                self.loaded = true;
                // The panel closes if its image went away.
                if self
                    .detail
                    .as_ref()
                    .is_some_and(|id| self.page.image(id).is_none())
                {
                    self.detail = None;
                }
            }
            Action::VhdDeleteConfirmed(id) => {
                return Ok(self.page.image(id).cloned().map(Action::DeleteVhd));
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
        match self.detail.as_ref().and_then(|id| self.page.detail(id)) {
            Some(detail) => {
                let [table, panel] =
                    Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                        .areas(area);
                self.render_table(frame, table);
                self.render_detail(frame, panel, &detail);
            }
            None => self.render_table(frame, area),
        }

        if let Some(form) = &self.clone_form {
            Self::render_clone_dialog(frame, area, form);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.clone_form.is_some()
    }

    fn id(&self) -> &'static str {
        "vhd"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use gamenet_core::{NoticeLevel, PendingAction, VhdImage};

    use super::*;

    fn vhd(id: &str, name: &str, locked: bool) -> VhdImage {
        VhdImage {
            id: VhdId::from(id),
            name: name.into(),
            description: None,
            size: "80.0".into(),
            file_path: None,
            windows_version: Some("Windows 11".into()),
            is_template: false,
            is_locked: locked,
            created_at: None,
            modified_at: None,
        }
    }

    fn press(screen: &mut VhdScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn loaded() -> VhdScreen {
        let mut screen = VhdScreen::new();
        screen
            .update(&Action::VhdsLoaded(vec![
                vhd("1", "Base", false),
                vhd("2", "Golden", true),
            ]))
            .unwrap();
        screen
    }

    #[test]
    fn delete_unlocked_asks_first() {
        let mut screen = loaded();
        match press(&mut screen, KeyCode::Char('d')) {
            Some(Action::ShowConfirm(c)) => {
                assert_eq!(c.action, PendingAction::DeleteVhd { id: VhdId::from("1") });
            }
            other => panic!("expected confirm, got {other:?}"),
        }
    }

    #[test]
    fn delete_locked_is_refused_without_prompt() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Down);
        match press(&mut screen, KeyCode::Char('d')) {
            Some(Action::Notify(n)) => {
                assert_eq!(n.level, NoticeLevel::Error);
                assert_eq!(n.message, LOCKED_DELETE_REASON);
            }
            other => panic!("expected notice, got {other:?}"),
        }
    }

    #[test]
    fn confirmed_delete_resolves_the_image() {
        let mut screen = loaded();
        match screen
            .update(&Action::VhdDeleteConfirmed(VhdId::from("1")))
            .unwrap()
        {
            Some(Action::DeleteVhd(image)) => assert_eq!(image.name, "Base"),
            other => panic!("expected delete, got {other:?}"),
        }
    }

    #[test]
    fn clone_dialog_prefills_and_submits_trimmed_name() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char('c'));
        assert!(screen.captures_input());
        assert_eq!(
            screen.clone_form.as_ref().unwrap().name.value(),
            "Clone of Base"
        );

        for _ in 0.."Clone of Base".len() {
            press(&mut screen, KeyCode::Backspace);
        }
        for c in "  Copy ".chars() {
            press(&mut screen, KeyCode::Char(c));
        }
        match press(&mut screen, KeyCode::Enter) {
            Some(Action::SubmitClone { id, name }) => {
                assert_eq!(id, VhdId::from("1"));
                assert_eq!(name, "Copy");
            }
            other => panic!("expected submit, got {other:?}"),
        }
        assert!(!screen.captures_input());
    }

    #[test]
    fn clone_dialog_rejects_blank_name() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Char('c'));
        for _ in 0.."Clone of Base".len() {
            press(&mut screen, KeyCode::Backspace);
        }
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        let form = screen.clone_form.as_ref().unwrap();
        assert!(form.error.is_some());
    }

    #[test]
    fn reload_closes_panel_for_removed_image() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Enter);
        assert_eq!(screen.detail, Some(VhdId::from("1")));

        screen
            .update(&Action::VhdsLoaded(vec![vhd("2", "Golden", true)]))
            .unwrap();
        assert_eq!(screen.detail, None);
    }
}
