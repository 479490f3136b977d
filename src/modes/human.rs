use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::debug;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, interval, sleep_until};

use crate::game::Session;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Hud, Renderer, notification_text};
use crate::storage::ScoreStore;

/// How long a notification stays on screen
const TOAST_DURATION: Duration = Duration::from_secs(2);

/// Refresh for the run timer and toast expiry when nothing else changes
const HUD_REFRESH: Duration = Duration::from_millis(250);

struct Toast {
    text: String,
    shown_at: Duration,
}

pub struct HumanMode<S> {
    session: Session<S>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    toast: Option<Toast>,
    should_quit: bool,
    /// Real time corresponding to session time zero
    epoch: Instant,
    drawn_revision: Option<u64>,
}

impl<S: ScoreStore> HumanMode<S> {
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            toast: None,
            should_quit: false,
            epoch: Instant::now(),
            drawn_revision: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut hud_timer = interval(HUD_REFRESH);

        self.epoch = Instant::now();

        loop {
            // Timers are re-read every pass, so a cancel in a handler takes
            // effect before the next wait
            let deadline = self.session.next_deadline().map(|due| self.epoch + due);
            let mut force_redraw = false;

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    self.sync_clock();
                    match maybe_event {
                        Some(Ok(event)) => {
                            force_redraw = matches!(event, Event::Resize(..));
                            self.handle_event(event);
                        }
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Movement, hazard spawn and hazard expiry
                _ = async {
                    match deadline {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                } => {
                    self.sync_clock();
                }

                _ = hud_timer.tick() => {
                    self.sync_clock();
                    self.expire_toast();
                    force_redraw = true;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            self.process_session_events();

            if force_redraw || self.drawn_revision != Some(self.session.revision()) {
                self.draw(terminal)?;
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Bring the session clock up to real time, firing due timers
    fn sync_clock(&mut self) {
        self.session.advance_to(self.epoch.elapsed());
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            self.apply(action);
        }
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Control(signal) => self.session.handle(signal),
            KeyAction::SelectDifficulty(difficulty) => {
                if self.session.set_difficulty(difficulty) {
                    debug!("difficulty set to {}", difficulty.as_str());
                }
            }
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn process_session_events(&mut self) {
        let now = self.session.clock();
        for event in self.session.drain_events() {
            self.metrics.observe(&event, now);
            if let Some(text) = notification_text(&event) {
                self.toast = Some(Toast {
                    text,
                    shown_at: now,
                });
            }
        }
    }

    fn expire_toast(&mut self) {
        let now = self.session.clock();
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| now.saturating_sub(toast.shown_at) >= TOAST_DURATION)
        {
            self.toast = None;
        }
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let now = self.session.clock();
        let hud = Hud {
            best_score: self.session.best_score(),
            difficulty: self.session.difficulty(),
            elapsed: self.metrics.format_time(now),
            games_played: self.metrics.games_played,
            toast: self.toast.as_ref().map(|toast| toast.text.as_str()),
        };

        let state = self.session.state();
        let renderer = &self.renderer;
        terminal
            .draw(|frame| renderer.render(frame, state, &hud))
            .context("Failed to draw frame")?;

        self.drawn_revision = Some(self.session.revision());
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
