//! Maze grids and the catalog of playable levels.

use grand_chase_core::{MazeView, Position, Tile};
use thiserror::Error;
use tracing::error;

const STANDARD_TUNNEL_ROW: u32 = 11;
const STANDARD_PLAYER_START: Position = Position::new(1, 1);
const STANDARD_ADVERSARY_START: Position = Position::new(11, 11);

const LEVEL_1: [&str; 23] = [
    "#######################",
    "#...#.............#...#",
    "#.#.#.#####.#####.#.#.#",
    "#.......#.....#.......#",
    "###.#.#.#.###.#.#.#.###",
    "#...#.#.#.###.#.#.#...#",
    "#.#.#.#.#.###.#.#.#.#.#",
    "#...#.#.........#.#...#",
    "#####.#.#######.#.#####",
    "#.....#.........#.....#",
    "#.#####.###.###.#####.#",
    "........#.....#........",
    "#.#####.#######.#####.#",
    "#.....#.........#.....#",
    "#####.#.#######.#.#####",
    "#...#.#.........#.#...#",
    "#.#.#.#.#.###.#.#.#.#.#",
    "#...#.#.#.###.#.#.#...#",
    "###.#.#.#.###.#.#.#.###",
    "#.......#.....#.......#",
    "#.#.#.#####.#####.#.#.#",
    "#...#.............#...#",
    "#######################",
];

const LEVEL_2: [&str; 23] = [
    "#######################",
    "#..........#..........#",
    "#.###.####.#.#####.##.#",
    "#...#............#.#..#",
    "###.###.########.#.##.#",
    "#.....#........#......#",
    "#.###.####.#.#.######.#",
    "#.#......#.#.#......#.#",
    "#.#.####.#.#.######.#.#",
    "#......#.....#....#...#",
    "######.####.###.#.#####",
    ".......................",
    "######.####.###.#.#####",
    "#......#.....#....#...#",
    "#.#.####.#.#.######.#.#",
    "#.#......#.#.#......#.#",
    "#.###.####.#.#.######.#",
    "#...#..........#......#",
    "###.###.########.#.##.#",
    "#...#......#.....#.#..#",
    "#.###.####.#.#####.##.#",
    "#..........#..........#",
    "#######################",
];

const LEVEL_3: [&str; 23] = [
    "#######################",
    "#.#...#...#.#...#...#.#",
    "#.#.#.#.#.#.#.#...#.#.#",
    "#...#...#.#.#.###.#...#",
    "#.#####.#.#.#...#.###.#",
    "#...#...#...###.#...#.#",
    "###.#.###.#...#.###.#.#",
    "#...#.....#.#.#.....#.#",
    "#.#######.#.#.#####.#.#",
    "#.#.....#.#.#...#...#.#",
    "#.#.###.#.#.###.#.###.#",
    "....#.........#........",
    "#.#.###.#.#.###.#.###.#",
    "#.#.....#.#.#...#...#.#",
    "#.#######.#.#.#####.#.#",
    "#...#.....#.#.#.....#.#",
    "###.#.###.#...#.###.#.#",
    "#...#...#...###.#...#.#",
    "#.#####.#.#.#...#.###.#",
    "#...#...#.#.#.###.#...#",
    "#.#.#.#.#.#.#.#...#.#.#",
    "#.#...#...#.#...#...#.#",
    "#######################",
];

/// Reasons a textual layout cannot be turned into a maze.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The layout has no rows or its first row is empty.
    #[error("layout contains no tiles")]
    Empty,
    /// A row differs in length from the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },
    /// A glyph outside `#`, `.` and `o` was encountered.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Glyph that could not be decoded.
        glyph: char,
        /// Zero-based column of the glyph.
        column: usize,
        /// Zero-based row of the glyph.
        row: usize,
    },
    /// The grid is too large to be addressed.
    #[error("layout dimensions exceed the addressable range")]
    TooLarge,
    /// The tunnel row lies outside the grid.
    #[error("tunnel row {row} lies outside a grid of {rows} rows")]
    TunnelOutOfRange {
        /// Requested tunnel row.
        row: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// An actor would start on a tile it cannot stand on.
    #[error("start position {position:?} is not a path tile")]
    StartNotOnPath {
        /// Offending start position.
        position: Position,
    },
    /// A catalog was built without any levels.
    #[error("level catalog is empty")]
    NoLevels,
}

/// Owned rectangular grid of tiles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Maze {
    tiles: Vec<Tile>,
    columns: u32,
    rows: u32,
    tunnel_row: Option<u32>,
}

impl Maze {
    /// Parses a layout where `#` is a wall, `.` a path and `o` a powerup spawn marker.
    pub fn from_rows<S: AsRef<str>>(
        rows: &[S],
        tunnel_row: Option<u32>,
    ) -> Result<Self, LayoutError> {
        let expected = rows
            .first()
            .map(|row| row.as_ref().chars().count())
            .filter(|count| *count > 0)
            .ok_or(LayoutError::Empty)?;

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(LayoutError::RaggedRow {
                    row: row_index,
                    expected,
                    found,
                });
            }

            for (column, glyph) in row.chars().enumerate() {
                let tile = match glyph {
                    '#' => Tile::Wall,
                    '.' => Tile::Path,
                    'o' => Tile::PowerupSpawn,
                    other => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph: other,
                            column,
                            row: row_index,
                        })
                    }
                };
                tiles.push(tile);
            }
        }

        let columns = u32::try_from(expected).map_err(|_| LayoutError::TooLarge)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| LayoutError::TooLarge)?;
        if let Some(row) = tunnel_row {
            if row >= row_count {
                return Err(LayoutError::TunnelOutOfRange {
                    row,
                    rows: row_count,
                });
            }
        }

        Ok(Self {
            tiles,
            columns,
            rows: row_count,
            tunnel_row,
        })
    }

    /// Borrows the grid as a read-only view.
    #[must_use]
    pub fn view(&self) -> MazeView<'_> {
        MazeView::new(&self.tiles, self.columns, self.rows, self.tunnel_row)
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether actors may stand on the position.
    #[must_use]
    pub fn is_path(&self, position: Position) -> bool {
        self.view().is_path(position)
    }
}

/// A maze together with the tiles both actors start on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    maze: Maze,
    player_start: Position,
    adversary_start: Position,
}

impl LevelLayout {
    /// Pairs a maze with start positions, rejecting starts that are not path tiles.
    pub fn new(
        maze: Maze,
        player_start: Position,
        adversary_start: Position,
    ) -> Result<Self, LayoutError> {
        for position in [player_start, adversary_start] {
            if !maze.is_path(position) {
                return Err(LayoutError::StartNotOnPath { position });
            }
        }

        Ok(Self {
            maze,
            player_start,
            adversary_start,
        })
    }

    /// Grid of the level.
    #[must_use]
    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Tile the player occupies when the level starts.
    #[must_use]
    pub const fn player_start(&self) -> Position {
        self.player_start
    }

    /// Tile the adversary occupies when the level starts.
    #[must_use]
    pub const fn adversary_start(&self) -> Position {
        self.adversary_start
    }
}

/// Ordered, non-empty list of playable levels.
#[derive(Clone, Debug)]
pub struct LevelCatalog {
    levels: Vec<LevelLayout>,
}

impl LevelCatalog {
    /// Builds a catalog from explicit layouts.
    pub fn new(levels: Vec<LevelLayout>) -> Result<Self, LayoutError> {
        if levels.is_empty() {
            return Err(LayoutError::NoLevels);
        }
        Ok(Self { levels })
    }

    /// The three built-in 23x23 levels with a wrapping tunnel on row 11.
    #[must_use]
    pub fn standard() -> Self {
        let levels = [LEVEL_1, LEVEL_2, LEVEL_3]
            .iter()
            .enumerate()
            .filter_map(|(index, rows)| {
                let layout = Maze::from_rows(rows, Some(STANDARD_TUNNEL_ROW)).and_then(|maze| {
                    LevelLayout::new(maze, STANDARD_PLAYER_START, STANDARD_ADVERSARY_START)
                });
                match layout {
                    Ok(layout) => Some(layout),
                    Err(error) => {
                        error!(level = index + 1, %error, "built-in layout rejected");
                        None
                    }
                }
            })
            .collect();
        Self { levels }
    }

    /// Layout of a one-based level number, or `None` once the levels run out.
    #[must_use]
    pub fn load_level(&self, level: u32) -> Option<&LevelLayout> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.levels.get(index)
    }

    /// Number of defined levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog defines no levels at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
