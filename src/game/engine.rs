use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionKind, GameState, Position, RunMode, Snake},
};
use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IteratorRandom;

/// Rejection-sampling attempts before falling back to scanning the free cells
const MAX_SPAWN_ATTEMPTS: usize = 64;

/// Result of a game step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The snake moved one cell without eating
    Moved,
    /// The snake ate and grew; carries the new score
    Ate { score: u32 },
    /// The move was fatal and has been discarded
    Collided { kind: CollisionKind, cell: Position },
    /// The state was not running, nothing happened
    Frozen,
}

/// The game engine that handles all movement and board logic
pub struct GameEngine<R = ThreadRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<ThreadRng> {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }
}

impl<R: Rng> GameEngine<R> {
    /// Create an engine with an explicit random source
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GameConfig {
        &mut self.config
    }

    /// Build a fresh board: centred snake heading right, food, no hazard
    pub fn reset(&mut self) -> GameState {
        let center = (self.config.grid_size / 2) as i32;

        let snake = Snake::new(
            Position::new(center, center),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let mut state = GameState::new(snake, None, self.config.grid_size);
        state.food = self.spawn_food(&state);
        state
    }

    /// Advance the snake one cell in `direction`
    ///
    /// Collisions are checked wall first, then body (tail included, since the
    /// tail only moves out of the way after the head has moved in), then the
    /// hazard. A fatal move leaves the board exactly as it was and only flips
    /// the run mode.
    pub fn step(&mut self, state: &mut GameState, direction: Direction) -> StepResult {
        if state.mode != RunMode::Running {
            return StepResult::Frozen;
        }

        let new_head = state.snake.head().moved_in_direction(direction);

        if let Some(kind) = self.check_collision(state, new_head) {
            state.mode = RunMode::Terminated;
            state.fatal_cell = Some(new_head);
            return StepResult::Collided {
                kind,
                cell: new_head,
            };
        }

        let ate_food = state.food == Some(new_head);

        state.snake.direction = direction;
        state.snake.move_snake(ate_food);
        state.steps += 1;

        if ate_food {
            state.score += 1;
            state.food = None;
            state.food = self.spawn_food(state);
            StepResult::Ate { score: state.score }
        } else {
            StepResult::Moved
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<CollisionKind> {
        if !state.is_in_bounds(pos) {
            return Some(CollisionKind::Wall);
        }

        if state.snake.occupies(pos) {
            return Some(CollisionKind::SelfCollision);
        }

        if state.hazard == Some(pos) {
            return Some(CollisionKind::Hazard);
        }

        None
    }

    /// Pick a food cell off the snake and off the hazard
    pub fn spawn_food(&mut self, state: &GameState) -> Option<Position> {
        self.spawn_avoiding(state, |pos| {
            state.is_occupied_by_snake(pos) || state.hazard == Some(pos)
        })
    }

    /// Pick a hazard cell off the snake and off the food
    pub fn spawn_hazard(&mut self, state: &GameState) -> Option<Position> {
        self.spawn_avoiding(state, |pos| {
            state.is_occupied_by_snake(pos) || state.food == Some(pos)
        })
    }

    /// Uniformly sample an in-bounds cell for which `blocked` is false
    fn spawn_avoiding(
        &mut self,
        state: &GameState,
        blocked: impl Fn(Position) -> bool,
    ) -> Option<Position> {
        let size = state.grid_size as i32;

        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let x = self.rng.gen_range(0..size);
            let y = self.rng.gen_range(0..size);
            let pos = Position::new(x, y);

            if !blocked(pos) {
                return Some(pos);
            }
        }

        // Crowded board: choose among what is actually left
        state.cells().filter(|&pos| !blocked(pos)).choose(&mut self.rng)
    }
}
