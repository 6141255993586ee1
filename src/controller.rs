use crate::feeling_entry::FeelingEntry;
use crate::journal_state::{JournalError, JournalState};
use crate::kv_store::KeyValueStore;
use crate::render::{self, ViewState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Turns key events into journal mutations. The screen is always drawn from
/// a fresh `load()`, so every mutation is followed by a full re-render.
pub struct Controller<S> {
    journal: JournalState<S>,
    view: ViewState,
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl<S: KeyValueStore> Controller<S> {
    pub fn new(journal: JournalState<S>, view: ViewState) -> Self {
        let mut controller = Controller { journal, view };
        controller.view.cursor = controller.view.input.chars().count();
        if !controller.journal.load().is_empty() {
            controller.view.selected = Some(0);
        }
        controller
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn entries(&self) -> Vec<FeelingEntry> {
        self.journal.load()
    }

    pub fn draw(&self, f: &mut Frame) {
        render::render(f, &self.entries(), &self.view);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        // Blocking alert: the key that dismisses it does nothing else.
        if self.view.alert.take().is_some() {
            return Flow::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if ctrl => return Flow::Quit,
            KeyCode::Char('l') if ctrl => self.like_selected(),
            KeyCode::Char('d') if ctrl => self.toggle_dark_mode(),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => self.view.mood = self.view.mood.next(),
            KeyCode::BackTab => self.view.mood = self.view.mood.prev(),
            KeyCode::Up => {
                self.view.selected = self.view.selected.map(|i| i.saturating_sub(1));
            }
            KeyCode::Down => {
                let len = self.entries().len();
                if len > 0 {
                    self.view.selected = Some(match self.view.selected {
                        Some(i) if i + 1 < len => i + 1,
                        Some(i) => i,
                        None => 0,
                    });
                }
            }
            KeyCode::Left => self.view.cursor = self.view.cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.view.cursor < self.view.input.chars().count() {
                    self.view.cursor += 1;
                }
            }
            KeyCode::Home => self.view.cursor = 0,
            KeyCode::End => self.view.cursor = self.view.input.chars().count(),
            KeyCode::Backspace => {
                if self.view.cursor > 0 {
                    let at = byte_index(&self.view.input, self.view.cursor - 1);
                    self.view.input.remove(at);
                    self.view.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.view.cursor < self.view.input.chars().count() {
                    let at = byte_index(&self.view.input, self.view.cursor);
                    self.view.input.remove(at);
                }
            }
            KeyCode::Char(c) if !ctrl => {
                let at = byte_index(&self.view.input, self.view.cursor);
                self.view.input.insert(at, c);
                self.view.cursor += 1;
            }
            _ => {}
        }
        Flow::Continue
    }

    pub fn submit(&mut self) {
        match self.journal.add_entry(&self.view.input, self.view.mood) {
            Ok(_) => {
                self.view.input.clear();
                self.view.cursor = 0;
                self.view.selected = Some(0);
            }
            Err(e @ JournalError::EmptyText) => {
                self.view.alert = Some(e.to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save new entry");
                self.view.alert = Some(format!("Could not save entry: {e}"));
            }
        }
    }

    pub fn like_selected(&mut self) {
        let entries = self.entries();
        let Some(entry) = self.view.selected.and_then(|i| entries.get(i)) else {
            return;
        };
        if let Err(e) = self.journal.like_entry(&entry.id) {
            tracing::error!(error = %e, id = %entry.id, "failed to save like");
            self.view.alert = Some(format!("Could not save like: {e}"));
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.view.dark_mode = !self.view.dark_mode;
        tracing::debug!(dark_mode = self.view.dark_mode, "toggled dark mode");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeling_entry::Mood;
    use crate::kv_store::{MemoryStore, StoreError};
    use crate::render::tests::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn controller() -> Controller<MemoryStore> {
        Controller::new(JournalState::new(MemoryStore::new()), ViewState::default())
    }

    fn press(c: &mut Controller<impl KeyValueStore>, code: KeyCode) -> Flow {
        c.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: &mut Controller<impl KeyValueStore>, ch: char) -> Flow {
        c.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    fn type_text(c: &mut Controller<impl KeyValueStore>, text: &str) {
        for ch in text.chars() {
            press(c, KeyCode::Char(ch));
        }
    }

    fn screen(c: &Controller<impl KeyValueStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| c.draw(f)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn initial_screen_shows_empty_counter() {
        let c = controller();
        assert!(screen(&c).contains("0 / 1000 characters"));
        assert_eq!(c.view().selected, None);
    }

    #[test]
    fn typing_updates_counter_without_truncating() {
        let mut c = controller();
        type_text(&mut c, "calm");
        assert!(screen(&c).contains("4 / 1000 characters"));

        let long = "a".repeat(1005);
        type_text(&mut c, &long);
        assert_eq!(c.view().input.chars().count(), 1009);
        assert!(screen(&c).contains("1009 / 1000 characters"));
    }

    #[test]
    fn submit_like_twice_scenario() {
        let mut c = controller();
        type_text(&mut c, "Feeling good");
        press(&mut c, KeyCode::Enter);

        let entries = c.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mood, Mood::Happy);
        assert_eq!(entries[0].likes, 0);
        assert!(c.view().input.is_empty());
        assert_eq!(c.view().cursor, 0);

        ctrl(&mut c, 'l');
        ctrl(&mut c, 'l');
        assert_eq!(c.entries()[0].likes, 2);
        assert!(screen(&c).contains("[♥ 2]"));
    }

    #[test]
    fn whitespace_submit_raises_blocking_alert() {
        let mut c = controller();
        type_text(&mut c, "  ");
        press(&mut c, KeyCode::Enter);

        assert!(c.entries().is_empty());
        assert_eq!(
            c.view().alert.as_deref(),
            Some("Please write something before submitting.")
        );
        assert!(screen(&c).contains("Please write something"));

        // The dismissing key is swallowed.
        press(&mut c, KeyCode::Char('x'));
        assert!(c.view().alert.is_none());
        assert_eq!(c.view().input, "  ");
    }

    #[test]
    fn second_submission_renders_first() {
        let mut c = controller();
        type_text(&mut c, "morning");
        press(&mut c, KeyCode::Enter);
        press(&mut c, KeyCode::Tab);
        type_text(&mut c, "evening");
        press(&mut c, KeyCode::Enter);

        let entries = c.entries();
        assert_eq!(entries[0].text, "evening");
        assert_eq!(entries[0].mood, Mood::Sad);
        let text = screen(&c);
        assert!(text.find("evening").unwrap() < text.find("morning").unwrap());
    }

    #[test]
    fn like_targets_the_selected_entry() {
        let mut c = controller();
        type_text(&mut c, "older");
        press(&mut c, KeyCode::Enter);
        type_text(&mut c, "newer");
        press(&mut c, KeyCode::Enter);

        press(&mut c, KeyCode::Down);
        ctrl(&mut c, 'l');
        press(&mut c, KeyCode::Down);
        assert_eq!(c.view().selected, Some(1));

        let entries = c.entries();
        assert_eq!(entries[0].likes, 0);
        assert_eq!(entries[1].likes, 1);
    }

    #[test]
    fn like_without_entries_is_a_no_op() {
        let mut c = controller();
        assert_eq!(ctrl(&mut c, 'l'), Flow::Continue);
        assert!(c.entries().is_empty());
        assert!(c.view().alert.is_none());
    }

    #[test]
    fn dark_mode_flips_and_is_not_stored() {
        let mut c = controller();
        ctrl(&mut c, 'd');
        assert!(c.view().dark_mode);
        ctrl(&mut c, 'd');
        assert!(!c.view().dark_mode);
        assert!(c.entries().is_empty());
    }

    #[test]
    fn editing_keys_move_within_chars() {
        let mut c = controller();
        type_text(&mut c, "hé!");
        press(&mut c, KeyCode::Left);
        press(&mut c, KeyCode::Backspace);
        assert_eq!(c.view().input, "h!");
        press(&mut c, KeyCode::Home);
        press(&mut c, KeyCode::Delete);
        assert_eq!(c.view().input, "!");
        press(&mut c, KeyCode::End);
        type_text(&mut c, "?");
        assert_eq!(c.view().input, "!?");
    }

    #[test]
    fn quit_keys() {
        let mut c = controller();
        assert_eq!(press(&mut c, KeyCode::Esc), Flow::Quit);
        assert_eq!(ctrl(&mut c, 'c'), Flow::Quit);
        assert_eq!(press(&mut c, KeyCode::Char('q')), Flow::Continue);
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set_item(&mut self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Write {
                path: "readonly.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    #[test]
    fn write_failure_surfaces_as_alert() {
        let mut c = Controller::new(JournalState::new(ReadOnlyStore), ViewState::default());
        type_text(&mut c, "lost");
        press(&mut c, KeyCode::Enter);
        let alert = c.view().alert.clone().unwrap();
        assert!(alert.starts_with("Could not save entry"));
        assert_eq!(c.view().input, "lost");
    }
}
