#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Grand Chase adapters.

use anyhow::Result as AnyResult;
use grand_chase_core::{Command, GameState, MazeView, Position, Tile};
use std::time::Duration;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Channels scaled to bytes, ignoring alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        (
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        )
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Palette shared by every backend.
pub mod palette {
    use super::Color;

    /// Frame background.
    pub const BACKGROUND: Color = Color::from_rgb_u8(0, 0, 0);
    /// Maze walls.
    pub const WALL: Color = Color::from_rgb_u8(0, 0, 255);
    /// Cheese pickups.
    pub const CHEESE: Color = Color::from_rgb_u8(252, 194, 28);
    /// Powerup pickups before the sparkle is applied.
    pub const POWERUP: Color = Color::from_rgb_u8(51, 153, 255);
    /// The player's mouse.
    pub const PLAYER: Color = Color::from_rgb_u8(230, 230, 230);
    /// The pursuing cat.
    pub const ADVERSARY: Color = Color::from_rgb_u8(255, 120, 0);
    /// Ordinary overlay and HUD text.
    pub const TEXT: Color = Color::from_rgb_u8(255, 255, 255);
    /// Headings on menus and end screens.
    pub const HEADING: Color = Color::from_rgb_u8(178, 178, 230);
    /// Prompts that tell the player what to press.
    pub const PROMPT: Color = Color::from_rgb_u8(204, 255, 204);
    /// Secondary hints and footers.
    pub const MUTED: Color = Color::from_rgb_u8(153, 153, 204);
    /// The slow effect indicator.
    pub const SLOWED: Color = Color::from_rgb_u8(128, 204, 255);
}

/// Intents gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Intents decoded from input devices this frame, in arrival order.
    pub intents: Vec<Command>,
}

/// Tells the backend whether to keep running after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Tear down and return from [`RenderingBackend::run`].
    Exit,
}

/// Content drawn in a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Impassable wall.
    Wall,
    /// Empty walkable floor.
    Floor,
    /// Walkable floor holding a cheese.
    Cheese,
    /// Walkable floor holding a powerup.
    Powerup,
    /// The player's mouse.
    Player,
    /// The pursuing cat.
    Adversary,
}

/// Status line drawn above the maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hud {
    /// One-based level number.
    pub level: u32,
    /// Banked score plus the current level's score.
    pub score: u32,
    /// Cheese still in the maze.
    pub cheese_left: usize,
    /// Whether the slow effect is active.
    pub slowed: bool,
}

impl Hud {
    /// Text anchored to the left edge.
    #[must_use]
    pub fn left_text(&self) -> String {
        format!("Level: {}   Total Score: {}", self.level, self.score)
    }

    /// Text anchored to the right edge.
    #[must_use]
    pub fn right_text(&self) -> String {
        format!("Cheese Left: {}", self.cheese_left)
    }
}

/// One centred line of overlay text.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLine {
    /// Text to draw.
    pub text: String,
    /// Color of the text.
    pub color: Color,
}

impl OverlayLine {
    fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    fn blank() -> Self {
        Self::new("", palette::TEXT)
    }
}

/// Static copy used on the intro and the start menu.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuCopy {
    /// Game title.
    pub title: String,
    /// Lines shown during the intro.
    pub credits: Vec<String>,
    /// Prompt explaining how to start.
    pub start_prompt: String,
    /// One line per key binding.
    pub controls: Vec<String>,
    /// Gameplay tips.
    pub hints: Vec<String>,
}

/// World data a scene is composed from.
#[derive(Clone, Debug)]
pub struct SceneSource<'a> {
    /// Current session state.
    pub state: GameState,
    /// Grid of the active level.
    pub maze: MazeView<'a>,
    /// Tile the player occupies.
    pub player: Position,
    /// Tile the adversary occupies.
    pub adversary: Position,
    /// Tiles holding a cheese.
    pub cheese: &'a [Position],
    /// Tiles holding a powerup.
    pub powerups: &'a [Position],
    /// One-based level number.
    pub level: u32,
    /// Cheese collected on the active level.
    pub level_score: u32,
    /// Banked score.
    pub total_score: u32,
    /// Whether the slow effect is active.
    pub slowed: bool,
    /// Whether a reset is accepted after the final level.
    pub replay_after_final_win: bool,
}

/// Scene description combining the maze, the HUD and any overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Session state the scene was composed for.
    pub state: GameState,
    /// Number of maze columns.
    pub columns: u32,
    /// Number of maze rows.
    pub rows: u32,
    /// Row-major cell contents; empty when the maze is hidden.
    pub cells: Vec<CellKind>,
    /// Status line, present while the maze is shown.
    pub hud: Option<Hud>,
    /// Centred text drawn over or instead of the maze.
    pub overlay: Vec<OverlayLine>,
}

impl Scene {
    /// Scene with nothing to draw, used before the first frame is composed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            state: GameState::Intro,
            columns: 0,
            rows: 0,
            cells: Vec::new(),
            hud: None,
            overlay: Vec::new(),
        }
    }

    /// Builds the scene for the provided world data.
    #[must_use]
    pub fn compose(source: &SceneSource<'_>, copy: &MenuCopy) -> Self {
        let (columns, rows) = source.maze.dimensions();
        let shows_maze = source.state.shows_maze();

        let (cells, hud) = if shows_maze {
            (
                paint_cells(source),
                Some(Hud {
                    level: source.level,
                    score: source.total_score.saturating_add(source.level_score),
                    cheese_left: source.cheese.len(),
                    slowed: source.slowed,
                }),
            )
        } else {
            (Vec::new(), None)
        };

        Self {
            state: source.state,
            columns,
            rows,
            cells,
            hud,
            overlay: overlay_for(source, copy),
        }
    }

    /// Cell content at a column and row, when the maze is shown.
    #[must_use]
    pub fn cell(&self, column: u32, row: u32) -> Option<CellKind> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let index = usize::try_from(row)
            .ok()?
            .checked_mul(usize::try_from(self.columns).ok()?)?
            .checked_add(usize::try_from(column).ok()?)?;
        self.cells.get(index).copied()
    }
}

fn paint_cells(source: &SceneSource<'_>) -> Vec<CellKind> {
    let maze = source.maze;
    let mut cells: Vec<CellKind> = (0..maze.tile_count())
        .map(|index| match maze.position_at(index).and_then(|p| maze.tile(p)) {
            Some(Tile::Path) => CellKind::Floor,
            Some(Tile::Wall | Tile::PowerupSpawn) | None => CellKind::Wall,
        })
        .collect();

    let mut paint = |position: Position, kind: CellKind| {
        if let Some(cell) = maze.index(position).and_then(|index| cells.get_mut(index)) {
            *cell = kind;
        }
    };
    for position in source.cheese {
        paint(*position, CellKind::Cheese);
    }
    for position in source.powerups {
        paint(*position, CellKind::Powerup);
    }
    paint(source.player, CellKind::Player);
    paint(source.adversary, CellKind::Adversary);

    cells
}

fn overlay_for(source: &SceneSource<'_>, copy: &MenuCopy) -> Vec<OverlayLine> {
    match source.state {
        GameState::Intro => copy
            .credits
            .iter()
            .map(|line| OverlayLine::new(line.as_str(), palette::TEXT))
            .collect(),
        GameState::StartMenu => {
            let mut lines = vec![
                OverlayLine::new(copy.title.as_str(), palette::TEXT),
                OverlayLine::blank(),
                OverlayLine::new(copy.start_prompt.as_str(), palette::PROMPT),
                OverlayLine::blank(),
                OverlayLine::new("--- INSTRUCTIONS ---", palette::HEADING),
            ];
            lines.extend(
                copy.controls
                    .iter()
                    .map(|line| OverlayLine::new(line.as_str(), palette::TEXT)),
            );
            lines.push(OverlayLine::blank());
            lines.extend(
                copy.hints
                    .iter()
                    .map(|line| OverlayLine::new(line.as_str(), palette::MUTED)),
            );
            lines
        }
        GameState::Playing => Vec::new(),
        GameState::Paused => vec![
            OverlayLine::new("PAUSED", palette::TEXT),
            OverlayLine::new("Press 'P' to Resume", palette::TEXT),
        ],
        GameState::GameOver => vec![
            OverlayLine::new("GAME OVER!", palette::HEADING),
            OverlayLine::new(format!("Final Score: {}", source.total_score), palette::TEXT),
            OverlayLine::new("Press 'R' to Restart", palette::PROMPT),
        ],
        GameState::LevelWon => vec![
            OverlayLine::new(format!("LEVEL {} COMPLETE!", source.level), palette::HEADING),
            OverlayLine::new(format!("Total Score: {}", source.total_score), palette::TEXT),
            OverlayLine::new("Loading next level...", palette::MUTED),
        ],
        GameState::GameWonFinal => {
            let mut lines = vec![
                OverlayLine::new("YOU BEAT THE GAME!", palette::HEADING),
                OverlayLine::new(
                    format!("Grand Total Score: {}", source.total_score),
                    palette::TEXT,
                ),
            ];
            if source.replay_after_final_win {
                lines.push(OverlayLine::new("Press 'R' to Play Again", palette::PROMPT));
            }
            lines.push(OverlayLine::new("Press ESC to Quit", palette::PROMPT));
            lines
        }
    }
}

/// Rendering backend capable of presenting Grand Chase scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update closure requests an exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// the intents captured by the adapter, and rewrites the scene before it
    /// is drawn.
    fn run<F>(self, title: &str, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl;
}
