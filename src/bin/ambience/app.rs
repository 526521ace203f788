//! Keyboard-driven mixer front-end

use std::time::Duration;

use ambience::{dsp::gain::level_to_percent, AmbientMixer, CATALOG};
use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use super::ui;

/// Volume step for arrow keys, in percent
const VOLUME_STEP: f32 = 5.0;

pub struct App<'a> {
    pub mixer: &'a AmbientMixer,
    /// Index into the catalog
    pub selected: usize,
    /// Last error, shown in the status bar
    pub status: Option<String>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(mixer: &'a AmbientMixer) -> Self {
        Self {
            mixer,
            selected: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let id = CATALOG[self.selected].id;

        let result = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Up => {
                self.selected = self.selected.checked_sub(1).unwrap_or(CATALOG.len() - 1);
                Ok(())
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1) % CATALOG.len();
                Ok(())
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.mixer.is_playing(id) {
                    self.mixer.stop(id)
                } else {
                    self.mixer.play(id)
                }
            }
            KeyCode::Left => self.nudge_volume(id, -VOLUME_STEP),
            KeyCode::Right => self.nudge_volume(id, VOLUME_STEP),
            KeyCode::Char('-') => self.nudge_master(-VOLUME_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_master(VOLUME_STEP),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if self.mixer.is_suspended() {
                    self.mixer.resume()
                } else {
                    self.mixer.suspend()
                }
            }
            _ => Ok(()),
        };

        self.status = result.err().map(|err| err.to_string());
    }

    fn nudge_volume(&self, id: &str, step: f32) -> Result<(), ambience::EngineError> {
        let percent = level_to_percent(self.mixer.current_volume(id)) as f32;
        self.mixer.set_volume_percent(id, percent + step)
    }

    fn nudge_master(&self, step: f32) -> Result<(), ambience::EngineError> {
        let percent = level_to_percent(self.mixer.master_volume()) as f32;
        self.mixer.set_master_volume_percent(percent + step)
    }
}
