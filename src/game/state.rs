use super::action::Direction;
use std::collections::HashSet;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Committed direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        let (back_dx, back_dy) = (-dx, -dy);

        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(back_dx, back_dy));
        }

        Self { body, direction }
    }

    /// Build a snake from explicit segments, head first
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        debug_assert!(!body.is_empty(), "a snake needs at least a head");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if position is covered by any segment, head and tail included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Move snake in current direction, growing if should_grow is true
    pub fn move_snake(&mut self, should_grow: bool) {
        let new_head = self.head().moved_in_direction(self.direction);
        self.body.insert(0, new_head);

        if !should_grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Cause of a run ending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Snake left the grid
    Wall,
    /// Snake ran into its own body
    SelfCollision,
    /// Snake hit the transient hazard
    Hazard,
}

impl CollisionKind {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Wall => "hit the wall",
            Self::SelfCollision => "bit itself",
            Self::Hazard => "hit a hazard",
        }
    }
}

/// Coarse lifecycle of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Waiting for the first start signal
    #[default]
    Idle,
    Running,
    Paused,
    /// A collision ended the run; frozen until the next start
    Terminated,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Terminated => "Game Over",
        }
    }

    /// Idle and Terminated accept a start signal
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Terminated)
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Absent only when the snake covers every free cell
    pub food: Option<Position>,
    pub hazard: Option<Position>,
    pub grid_size: usize,
    pub score: u32,
    pub steps: u32,
    pub mode: RunMode,
    /// Cell the snake tried to enter on its fatal move
    pub fatal_cell: Option<Position>,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Option<Position>, grid_size: usize) -> Self {
        Self {
            snake,
            food,
            hazard: None,
            grid_size,
            score: 0,
            steps: 0,
            mode: RunMode::Idle,
            fatal_cell: None,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let size = self.grid_size as i32;
        pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.occupies(pos)
    }

    /// Every in-bounds cell in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        let size = self.grid_size as i32;
        (0..size).flat_map(move |y| (0..size).map(move |x| Position::new(x, y)))
    }

    /// Board invariants: unique in-bounds body, food and hazard off the body
    /// and off each other
    pub fn invariants_hold(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.snake.len());
        let body_ok = !self.snake.is_empty()
            && self
                .snake
                .body
                .iter()
                .all(|&pos| self.is_in_bounds(pos) && seen.insert(pos));

        let food_ok = self
            .food
            .is_none_or(|food| !self.is_occupied_by_snake(food) && Some(food) != self.hazard);
        let hazard_ok = self
            .hazard
            .is_none_or(|hazard| !self.is_occupied_by_snake(hazard));

        body_ok && food_ok && hazard_ok
    }
}
