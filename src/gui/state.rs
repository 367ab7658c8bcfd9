use par_nvim_fonts::FontSpec;

use super::event::GuiEvent;

/// Core-reported GUI state.
///
/// Fields change only when the core reports them; a command that requests
/// a change leaves the state alone until the core echoes the event back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuiState {
    pub window_maximized: bool,
    pub window_full_screen: bool,
    /// Platform window handle, recorded by the presentation layer.
    pub window_id: Option<u64>,
    /// `None` until the core reports a font.
    pub font: Option<FontSpec>,
    pub linespace: i64,
    pub mouse_hide: bool,
}

impl GuiState {
    /// Apply an inbound event. Returns whether any field changed.
    pub fn apply(&mut self, event: &GuiEvent) -> bool {
        match event {
            GuiEvent::WindowMaximized(on) => replace(&mut self.window_maximized, *on),
            GuiEvent::WindowFullScreen(on) => replace(&mut self.window_full_screen, *on),
            GuiEvent::Mousehide(on) => replace(&mut self.mouse_hide, *on),
            GuiEvent::Linespace(px) => replace(&mut self.linespace, *px),
            GuiEvent::Font(font) => replace(&mut self.font, Some(font.clone())),
            GuiEvent::Foreground
            | GuiEvent::DropFiles(_)
            | GuiEvent::Close
            | GuiEvent::Unknown(_) => false,
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linespace_touches_only_linespace() {
        let mut state = GuiState {
            window_maximized: true,
            mouse_hide: true,
            ..Default::default()
        };
        let before = state.clone();
        assert!(state.apply(&GuiEvent::Linespace(4)));
        assert_eq!(
            state,
            GuiState {
                linespace: 4,
                ..before
            }
        );
    }

    #[test]
    fn test_repeated_value_reports_no_change() {
        let mut state = GuiState::default();
        assert!(state.apply(&GuiEvent::WindowFullScreen(true)));
        assert!(!state.apply(&GuiEvent::WindowFullScreen(true)));
    }

    #[test]
    fn test_untracked_events_leave_state_alone() {
        let mut state = GuiState::default();
        for event in [
            GuiEvent::Foreground,
            GuiEvent::Close,
            GuiEvent::DropFiles(vec!["x".into()]),
            GuiEvent::Unknown("Tabline".into()),
        ] {
            assert!(!state.apply(&event));
        }
        assert_eq!(state, GuiState::default());
    }
}
