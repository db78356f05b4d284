#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grand Chase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intents, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presenters to react to. Systems consume event streams, query immutable
//! views such as [`MazeView`], and respond exclusively with new commands.

mod rules;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use rules::{Rules, RulesError};

/// Title shown when the experience boots.
pub const GAME_TITLE: &str = "Cat and Mouse - The Grand Chase!";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Starts a new session from the start menu.
    StartGame,
    /// Requests that the player take a single step in the provided direction.
    Move {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Suspends play and adversary ticking.
    Pause,
    /// Resumes play after a pause.
    Resume,
    /// Restarts the session at level one with a zero score.
    Reset,
    /// Asks the process to terminate.
    Quit,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Answers an [`Event::AdversaryTurn`] with the step chosen by pursuit.
    ResolveAdversaryTurn {
        /// Epoch carried by the turn request being answered.
        epoch: Epoch,
        /// Tile the adversary should enter, or `None` to hold position.
        next: Option<Position>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces a game state transition.
    StateChanged {
        /// State that was active before the transition.
        from: GameState,
        /// State that became active.
        to: GameState,
    },
    /// Reports that a level was (re)initialised and populated.
    LevelStarted {
        /// One-based level number.
        level: u32,
        /// Number of cheese placed in the maze.
        cheese: usize,
        /// Number of powerups placed in the maze.
        powerups: usize,
        /// Adversary tick interval at the start of the level.
        adversary_interval: Duration,
    },
    /// Reports that fewer items than requested could be placed.
    PopulationDegraded {
        /// Level whose population fell short.
        level: u32,
        /// Cheese requested by the rules.
        requested_cheese: u32,
        /// Cheese actually placed.
        placed_cheese: usize,
        /// Powerups requested by the rules.
        requested_powerups: u32,
        /// Powerups actually placed.
        placed_powerups: usize,
    },
    /// Confirms that the player moved between two tiles.
    PlayerMoved {
        /// Tile the player occupied before moving.
        from: Position,
        /// Tile the player occupies after moving.
        to: Position,
    },
    /// Reports that a move intent targeted a tile the player cannot enter.
    MoveRejected {
        /// Direction of the rejected move.
        direction: Direction,
    },
    /// Confirms that the player picked up a cheese.
    CheeseCollected {
        /// Tile the cheese occupied.
        position: Position,
        /// Per-level score after the pickup.
        level_score: u32,
        /// Cheese still remaining in the level.
        remaining: usize,
    },
    /// Confirms that the player picked up a powerup.
    PowerupCollected {
        /// Tile the powerup occupied.
        position: Position,
        /// Kind of powerup collected.
        kind: PowerupKind,
    },
    /// Announces that the adversary slow effect became active.
    SlowEffectStarted {
        /// Adversary tick interval while the effect lasts.
        interval: Duration,
        /// Length of the effect.
        duration: Duration,
    },
    /// Announces that the adversary slow effect expired.
    SlowEffectEnded {
        /// Adversary tick interval recomputed from current progress.
        interval: Duration,
    },
    /// Reports that collection progress changed the adversary tick interval.
    AdversaryIntervalChanged {
        /// New adversary tick interval.
        interval: Duration,
    },
    /// Requests that pursuit systems choose the adversary's next step.
    AdversaryTurn {
        /// Epoch that must accompany the answer.
        epoch: Epoch,
    },
    /// Confirms that the adversary moved between two tiles.
    AdversaryMoved {
        /// Tile the adversary occupied before moving.
        from: Position,
        /// Tile the adversary occupies after moving.
        to: Position,
    },
    /// Reports that the adversary held position for a turn.
    AdversaryHeld {
        /// Tile the adversary remains on.
        position: Position,
    },
    /// Reports that the adversary caught the player.
    Caught {
        /// Tile on which the capture happened.
        position: Position,
        /// Per-level score that was banked by the capture.
        level_score: u32,
        /// Cumulative score after banking.
        total_score: u32,
    },
    /// Reports that the player cleared every cheese of a level.
    LevelCompleted {
        /// Level that was completed.
        level: u32,
        /// Cumulative score after banking the level.
        total_score: u32,
    },
    /// Reports that the final defined level was completed.
    GameCompleted {
        /// Grand total score.
        total_score: u32,
    },
    /// Confirms that a quit intent was accepted.
    QuitRequested,
}

/// Overall session states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Credits shown before the start menu.
    Intro,
    /// Waiting for the player to start a session.
    StartMenu,
    /// Active play with the adversary ticking.
    Playing,
    /// Play suspended by the player.
    Paused,
    /// The adversary caught the player.
    GameOver,
    /// A level was cleared and the next one is about to load.
    LevelWon,
    /// Every defined level was cleared.
    GameWonFinal,
}

impl GameState {
    /// Reports whether the maze and its inhabitants should be presented.
    #[must_use]
    pub const fn shows_maze(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Expansion order used by breadth-first searches; fixes tie-breaking.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Column and row offsets applied by a single step.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Whether the direction moves along a row.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Location of a single maze tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    column: u32,
    row: u32,
}

impl Position {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Static content of a single maze tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Impassable wall.
    Wall,
    /// Walkable corridor.
    Path,
    /// Reserved powerup spawn marker; not walkable.
    PowerupSpawn,
}

impl Tile {
    /// Reports whether actors may stand on the tile.
    #[must_use]
    pub const fn is_path(self) -> bool {
        matches!(self, Self::Path)
    }
}

/// Kinds of powerups that can appear in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Halts the adversary for a fixed duration.
    AdversarySlow,
}

/// Session generation counter that invalidates stale scheduled ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

impl Epoch {
    /// Creates an epoch wrapper around the provided counter value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric counter value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the epoch that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Read-only view of a maze grid that applies the tunnel-wrap adjacency rule.
#[derive(Clone, Copy, Debug)]
pub struct MazeView<'a> {
    tiles: &'a [Tile],
    columns: u32,
    rows: u32,
    tunnel_row: Option<u32>,
}

impl<'a> MazeView<'a> {
    /// Captures a new view backed by the provided row-major tile slice.
    #[must_use]
    pub fn new(tiles: &'a [Tile], columns: u32, rows: u32, tunnel_row: Option<u32>) -> Self {
        Self {
            tiles,
            columns,
            rows,
            tunnel_row,
        }
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Row on which horizontal movement wraps around the grid edge, if any.
    #[must_use]
    pub const fn tunnel_row(&self) -> Option<u32> {
        self.tunnel_row
    }

    /// Number of tiles covered by the grid.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Returns the tile at the provided position, or `None` when off-grid.
    #[must_use]
    pub fn tile(&self, position: Position) -> Option<Tile> {
        self.index(position)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the position lies on a walkable tile.
    #[must_use]
    pub fn is_path(&self, position: Position) -> bool {
        self.tile(position).is_some_and(Tile::is_path)
    }

    /// Resolves the coordinate reached by one step, applying the tunnel wrap.
    ///
    /// Off-grid moves yield `None`. The wall state of the resolved tile is not
    /// inspected; see [`MazeView::step`] for the walkable variant.
    #[must_use]
    pub fn target(&self, from: Position, direction: Direction) -> Option<Position> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }

        let (dx, dy) = direction.offset();
        let mut column = i64::from(from.column()) + dx;
        let row = i64::from(from.row()) + dy;

        if direction.is_horizontal() && self.tunnel_row == Some(from.row()) {
            if column < 0 {
                column = i64::from(self.columns) - 1;
            } else if column >= i64::from(self.columns) {
                column = 0;
            }
        }

        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }

        Some(Position::new(column, row))
    }

    /// Resolves a single step and keeps it only when it lands on a path tile.
    #[must_use]
    pub fn step(&self, from: Position, direction: Direction) -> Option<Position> {
        self.target(from, direction)
            .filter(|position| self.is_path(*position))
    }

    /// Walkable neighbours of a tile in [`Direction::SEARCH_ORDER`].
    pub fn neighbors(&self, from: Position) -> impl Iterator<Item = Position> + 'a {
        let view = *self;
        Direction::SEARCH_ORDER
            .into_iter()
            .filter_map(move |direction| view.step(from, direction))
    }

    /// Reports whether `to` is reachable from `from` in a single walkable step.
    #[must_use]
    pub fn is_adjacent(&self, from: Position, to: Position) -> bool {
        self.neighbors(from).any(|neighbor| neighbor == to)
    }

    /// Row-major index of a position, or `None` when off-grid.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        if position.column() >= self.columns || position.row() >= self.rows {
            return None;
        }
        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Position addressed by a row-major index, or `None` when out of range.
    #[must_use]
    pub fn position_at(&self, index: usize) -> Option<Position> {
        if index >= self.tiles.len() || self.columns == 0 {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(Position::new(column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_tiles(columns: u32, rows: u32) -> Vec<Tile> {
        vec![Tile::Path; (columns * rows) as usize]
    }

    #[test]
    fn tunnel_row_wraps_in_both_directions() {
        let tiles = open_tiles(5, 3);
        let view = MazeView::new(&tiles, 5, 3, Some(1));

        assert_eq!(
            view.target(Position::new(0, 1), Direction::Left),
            Some(Position::new(4, 1))
        );
        assert_eq!(
            view.target(Position::new(4, 1), Direction::Right),
            Some(Position::new(0, 1))
        );
    }

    #[test]
    fn other_rows_clip_at_the_edge() {
        let tiles = open_tiles(5, 3);
        let view = MazeView::new(&tiles, 5, 3, Some(1));

        assert_eq!(view.target(Position::new(0, 0), Direction::Left), None);
        assert_eq!(view.target(Position::new(4, 2), Direction::Right), None);
        assert_eq!(view.target(Position::new(2, 0), Direction::Up), None);
        assert_eq!(view.target(Position::new(2, 2), Direction::Down), None);
    }

    #[test]
    fn step_rejects_walls_at_the_wrap_target() {
        let mut tiles = open_tiles(4, 1);
        tiles[3] = Tile::Wall;
        let view = MazeView::new(&tiles, 4, 1, Some(0));

        assert_eq!(
            view.target(Position::new(0, 0), Direction::Left),
            Some(Position::new(3, 0))
        );
        assert_eq!(view.step(Position::new(0, 0), Direction::Left), None);
    }

    #[test]
    fn neighbors_follow_search_order() {
        let tiles = open_tiles(3, 3);
        let view = MazeView::new(&tiles, 3, 3, None);
        let neighbors: Vec<_> = view.neighbors(Position::new(1, 1)).collect();

        assert_eq!(
            neighbors,
            vec![
                Position::new(1, 0),
                Position::new(1, 2),
                Position::new(0, 1),
                Position::new(2, 1),
            ]
        );
    }

    #[test]
    fn powerup_spawn_tiles_are_not_walkable() {
        let tiles = vec![Tile::Path, Tile::PowerupSpawn];
        let view = MazeView::new(&tiles, 2, 1, None);

        assert!(!view.is_path(Position::new(1, 0)));
        assert!(!view.is_adjacent(Position::new(0, 0), Position::new(1, 0)));
    }

    #[test]
    fn position_index_round_trips() {
        let tiles = open_tiles(4, 3);
        let view = MazeView::new(&tiles, 4, 3, None);
        let position = Position::new(3, 2);
        let index = view.index(position).expect("on grid");

        assert_eq!(index, 11);
        assert_eq!(view.position_at(index), Some(position));
        assert_eq!(view.position_at(12), None);
    }

    #[test]
    fn epoch_advances_monotonically() {
        let epoch = Epoch::default();
        assert!(epoch.next() > epoch);
        assert_eq!(epoch.next().get(), 1);
    }
}
