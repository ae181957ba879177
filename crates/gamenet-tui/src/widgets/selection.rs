//! Table cursor movement, clamped to the visible row count.

use ratatui::widgets::TableState;

/// Move the cursor by `delta` rows. No-op on an empty table.
pub fn move_by(state: &mut TableState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0);
    let next = current.saturating_add_signed(delta).min(len - 1);
    state.select(Some(next));
}

/// Keep the cursor inside `0..len` after the row set changed.
pub fn clamp(state: &mut TableState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(i), _) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

pub fn last(state: &mut TableState, len: usize) {
    state.select(len.checked_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_clamps_at_both_ends() {
        let mut state = TableState::default();
        move_by(&mut state, 3, -1);
        assert_eq!(state.selected(), Some(0));
        move_by(&mut state, 3, 10);
        assert_eq!(state.selected(), Some(2));
    }

    #[test]
    fn clamp_follows_shrinking_table() {
        let mut state = TableState::default().with_selected(Some(5));
        clamp(&mut state, 2);
        assert_eq!(state.selected(), Some(1));
        clamp(&mut state, 0);
        assert_eq!(state.selected(), None);
        clamp(&mut state, 4);
        assert_eq!(state.selected(), Some(0));
    }
}
