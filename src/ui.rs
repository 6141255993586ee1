use crate::controller::{Controller, Flow};
use crate::kv_store::KeyValueStore;
use color_eyre::Result;
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};

pub struct UI {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl UI {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(UI { terminal })
    }

    /// Draw, wait for one event, apply it, repeat. Resizes just redraw.
    pub fn run<S: KeyValueStore>(&mut self, controller: &mut Controller<S>) -> Result<()> {
        loop {
            self.terminal.draw(|f| controller.draw(f))?;

            if let Event::Key(key) = event::read()? {
                if controller.handle_key(key) == Flow::Quit {
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Drop for UI {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
