use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Difficulty, GameEvent, GameState, Position, RunMode};

/// Everything outside the board the header and overlays need
#[derive(Debug, Clone)]
pub struct Hud<'a> {
    pub best_score: u32,
    pub difficulty: Difficulty,
    pub elapsed: String,
    pub games_played: u32,
    pub toast: Option<&'a str>,
}

/// Player-facing text for a session event, if it is worth a toast
pub fn notification_text(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::RunStarted => Some("Go!".to_string()),
        GameEvent::NewBestScore(score) => Some(format!("New best score: {score}!")),
        GameEvent::GamePaused => Some("Paused".to_string()),
        GameEvent::GameResumed => Some("Resumed".to_string()),
        GameEvent::GameOver { kind, score } => {
            Some(format!("Game over, you {} ({score} points)", kind.describe()))
        }
        GameEvent::HazardSpawned(_) => Some("Watch out, a hazard appeared".to_string()),
        GameEvent::PointScored(_) | GameEvent::HazardExpired => None,
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, hud: &Hud) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(1), // Toast
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, hud), chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        let body = match state.mode {
            RunMode::Idle => self.render_start_screen(hud),
            RunMode::Running | RunMode::Paused => self.render_grid(state),
            RunMode::Terminated => self.render_game_over(state, hud),
        };
        frame.render_widget(body, game_area);

        let toast = Paragraph::new(Line::from(Span::styled(
            hud.toast.unwrap_or_default(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(toast, chunks[2]);

        frame.render_widget(self.render_controls(state.mode), chunks[3]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let mut lines = Vec::new();

        for y in 0..state.grid_size {
            let mut spans = Vec::new();

            for x in 0..state.grid_size {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == state.snake.head() {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.occupies(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if state.food == Some(pos) {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else if state.hazard == Some(pos) {
                    Span::styled(
                        "X ",
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let (title, border) = if state.mode == RunMode::Paused {
            (" Snake (paused) ", Color::Yellow)
        } else {
            (" Snake ", Color::White)
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, hud: &Hud) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(hud.best_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Difficulty: ", label),
            Span::styled(hud.difficulty.as_str(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(hud.elapsed.clone(), value),
            Span::raw("    "),
            Span::styled("Games: ", label),
            Span::styled(hud.games_played.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_start_screen(&self, hud: &Hud) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "SNAKE",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Best score: ", Style::default().fg(Color::Yellow)),
                Span::styled(hud.best_score.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
        ];

        for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
            let selected = *difficulty == hud.difficulty;
            let style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if selected { "> " } else { "  " };
            text.push(Line::from(Span::styled(
                format!("{marker}{} {}", i + 1, difficulty.as_str()),
                style,
            )));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to start", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
    }

    fn render_game_over(&self, state: &GameState, hud: &Hud) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Best: ", Style::default().fg(Color::Yellow)),
                Span::styled(hud.best_score.to_string(), Style::default().fg(Color::White)),
            ]),
        ];

        if let Some(cell) = state.fatal_cell {
            text.push(Line::from(Span::styled(
                format!("Crashed at ({}, {})", cell.x, cell.y),
                Style::default().fg(Color::Gray),
            )));
        }

        text.extend([
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart, ", Style::default().fg(Color::Gray)),
                Span::styled("1-4", Style::default().fg(Color::Cyan)),
                Span::styled(" to change difficulty or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ]);

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, mode: RunMode) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" to pause | "),
        ];
        if mode.can_start() {
            spans.push(Span::styled("1-4", Style::default().fg(Color::Cyan)));
            spans.push(Span::raw(" difficulty | "));
        }
        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CollisionKind, Direction, Snake};
    use ratatui::{Terminal, backend::TestBackend};

    fn hud() -> Hud<'static> {
        Hud {
            best_score: 7,
            difficulty: Difficulty::Hard,
            elapsed: "00:12".to_string(),
            games_played: 2,
            toast: Some("New best score: 7!"),
        }
    }

    fn screen_text(state: &GameState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal
            .draw(|frame| Renderer::new().render(frame, state, &hud()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn state(mode: RunMode) -> GameState {
        let mut state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 3),
            Some(Position::new(8, 8)),
            10,
        );
        state.hazard = Some(Position::new(1, 1));
        state.mode = mode;
        state
    }

    #[test]
    fn test_running_board_shows_pieces() {
        let text = screen_text(&state(RunMode::Running));
        assert!(text.contains('■'));
        assert!(text.contains('□'));
        assert!(text.contains('O'));
        assert!(text.contains('X'));
        assert!(text.contains("Best: 7"));
        assert!(text.contains("New best score: 7!"));
    }

    #[test]
    fn test_idle_shows_difficulties() {
        let text = screen_text(&state(RunMode::Idle));
        assert!(text.contains("> 3 Hard"));
        assert!(text.contains("Impossible"));
    }

    #[test]
    fn test_paused_title() {
        let text = screen_text(&state(RunMode::Paused));
        assert!(text.contains("Snake (paused)"));
    }

    #[test]
    fn test_game_over_screen() {
        let mut over = state(RunMode::Terminated);
        over.fatal_cell = Some(Position::new(10, 5));
        let text = screen_text(&over);
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Crashed at (10, 5)"));
    }

    #[test]
    fn test_notification_text() {
        assert_eq!(
            notification_text(&GameEvent::NewBestScore(6)).as_deref(),
            Some("New best score: 6!")
        );
        assert_eq!(
            notification_text(&GameEvent::GameOver {
                kind: CollisionKind::Hazard,
                score: 2,
            })
            .as_deref(),
            Some("Game over, you hit a hazard (2 points)")
        );
        assert!(notification_text(&GameEvent::PointScored(1)).is_none());
    }
}
