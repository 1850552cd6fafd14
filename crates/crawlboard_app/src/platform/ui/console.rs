//! Command line under the dashboard: typed text, recent notices and the
//! help overlay toggle.

use std::collections::VecDeque;

use crawlboard_core::{Alert, AlertSeverity, Msg};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::input::{self, Input};

/// How many alerts stay visible above the command line.
pub const NOTICE_LIMIT: usize = 3;

/// What a key press asks of the dashboard loop.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Msg(Msg),
    Redraw,
    Ignored,
}

#[derive(Debug, Default)]
pub struct Console {
    line: String,
    notices: VecDeque<Alert>,
    help_visible: bool,
    scroll: u16,
}

impl Console {
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Oldest first.
    pub fn notices(&self) -> impl Iterator<Item = &Alert> {
        self.notices.iter()
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    /// Vertical offset of the job list, in lines.
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn push_alert(&mut self, alert: Alert) {
        if self.notices.len() == NOTICE_LIMIT {
            self.notices.pop_front();
        }
        self.notices.push_back(alert);
    }

    /// `modal_open` decides whether Esc closes the records view.
    pub fn handle_key(&mut self, key: KeyEvent, modal_open: bool) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => KeyOutcome::Msg(Msg::CloseRequested),
                _ => KeyOutcome::Ignored,
            };
        }
        match key.code {
            KeyCode::Enter => self.submit_line(),
            KeyCode::Esc if self.help_visible => {
                self.help_visible = false;
                KeyOutcome::Redraw
            }
            KeyCode::Esc if modal_open => KeyOutcome::Msg(Msg::ModalClosed),
            KeyCode::Esc if !self.line.is_empty() => {
                self.line.clear();
                KeyOutcome::Redraw
            }
            KeyCode::Backspace => {
                self.line.pop();
                KeyOutcome::Redraw
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                KeyOutcome::Redraw
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                KeyOutcome::Redraw
            }
            KeyCode::Char(ch) => {
                self.line.push(ch);
                KeyOutcome::Redraw
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn submit_line(&mut self) -> KeyOutcome {
        let line = std::mem::take(&mut self.line);
        match input::parse_line(&line) {
            Ok(Some(Input::Msg(msg))) => KeyOutcome::Msg(msg),
            Ok(Some(Input::Help)) => {
                self.help_visible = true;
                KeyOutcome::Redraw
            }
            Ok(None) => KeyOutcome::Redraw,
            Err(err) => {
                self.push_alert(Alert {
                    severity: AlertSeverity::Error,
                    text: format!("{err:#}"),
                });
                KeyOutcome::Redraw
            }
        }
    }
}
