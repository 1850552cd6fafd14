use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use board_logging::{board_info, board_warn};
use clap::Parser;
use crawlboard_core::{update, Alert, AlertSeverity, AppState, AppViewModel, Locale, Msg};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::config::{load_config, AppConfig, Cli};
use super::effects::EffectRunner;
use super::logging;
use super::ui::console::{Console, KeyOutcome};
use super::ui::render;

/// How long one loop turn waits for a key before draining engine messages.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_problem) = match load_config(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination, &config.log_level);

    let mut console = Console::default();
    if let Some(err) = config_problem {
        board_warn!("Using default configuration: {:#}", err);
        console.push_alert(Alert {
            severity: AlertSeverity::Error,
            text: format!("{err:#}; using defaults"),
        });
    }
    let locale = config.locale().unwrap_or_else(|| {
        board_warn!("Unsupported locale {:?}, using fa-IR", config.locale);
        Locale::default()
    });

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.client_settings(), msg_tx)
        .context("failed to start the crawl engine")?;

    let mut screen = Screen::enter().context("failed to set up the terminal")?;
    let mut dashboard = Dashboard::new(AppState::with_locale(locale), runner, console);
    let result = dashboard.run(&mut screen.terminal, &msg_rx);
    drop(screen);

    board_info!("Dashboard closed");
    dashboard.runner.shutdown();
    result
}

/// Raw mode plus alternate screen for as long as it lives.
struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Screen {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = stdout.execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

struct Dashboard {
    state: AppState,
    view: AppViewModel,
    console: Console,
    runner: EffectRunner,
    needs_draw: bool,
}

impl Dashboard {
    fn new(state: AppState, runner: EffectRunner, console: Console) -> Self {
        let view = state.view();
        Self {
            state,
            view,
            console,
            runner,
            needs_draw: true,
        }
    }

    /// Engine messages and key presses feed the same dispatch. The screen is
    /// redrawn at most once per turn and only after something changed.
    fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        msg_rx: &mpsc::Receiver<Msg>,
    ) -> anyhow::Result<()> {
        if self.dispatch(Msg::Started).is_break() {
            return Ok(());
        }
        loop {
            while let Ok(msg) = msg_rx.try_recv() {
                if self.dispatch(msg).is_break() {
                    return Ok(());
                }
            }

            if std::mem::take(&mut self.needs_draw) {
                terminal.draw(|frame| render::draw(frame, &self.view, &self.console))?;
            }

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let modal_open = self.view.page.modal.is_some();
                    match self.console.handle_key(key, modal_open) {
                        KeyOutcome::Msg(msg) => {
                            self.needs_draw = true;
                            if self.dispatch(msg).is_break() {
                                return Ok(());
                            }
                        }
                        KeyOutcome::Redraw => self.needs_draw = true,
                        KeyOutcome::Ignored => {}
                    }
                }
                Event::Resize(_, _) => self.needs_draw = true,
                _ => {}
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) -> ControlFlow<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);

        let alerts = state.take_alerts();
        if state.consume_dirty() {
            self.view = state.view();
            self.needs_draw = true;
        }
        self.state = state;

        if !alerts.is_empty() {
            self.needs_draw = true;
        }
        for alert in alerts {
            self.console.push_alert(alert);
        }

        self.runner.run(effects)
    }
}
