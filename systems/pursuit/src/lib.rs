#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Breadth-first pursuit that drives the adversary toward the player.

use std::collections::VecDeque;

use grand_chase_core::{Command, Event, MazeView, Position};

/// Pure system that answers adversary turn requests with a single step.
#[derive(Debug, Default)]
pub struct Pursuit {
    search: SearchWorkspace,
}

impl Pursuit {
    /// Consumes world events and emits one resolution per adversary turn.
    ///
    /// The step is the first hop of a shortest path from `adversary` to
    /// `player`. When the two share a tile or the player is unreachable the
    /// answer is `None` and the adversary holds position.
    pub fn handle(
        &mut self,
        events: &[Event],
        maze: MazeView<'_>,
        adversary: Position,
        player: Position,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::AdversaryTurn { epoch } = event {
                let next = self.search.next_step(maze, adversary, player);
                out.push(Command::ResolveAdversaryTurn {
                    epoch: *epoch,
                    next,
                });
            }
        }
    }
}

/// First tile on a shortest walkable path from `from` to `target`.
///
/// Neighbours are expanded in [`grand_chase_core::Direction::SEARCH_ORDER`],
/// so among equally short paths the one whose first divergence goes Up, then
/// Down, then Left, then Right wins. The tunnel row wraps like player moves.
/// Returns `None` when `from == target` or no path exists.
#[must_use]
pub fn next_step(maze: MazeView<'_>, from: Position, target: Position) -> Option<Position> {
    SearchWorkspace::default().next_step(maze, from, target)
}

/// Buffers reused between searches.
#[derive(Debug, Default)]
struct SearchWorkspace {
    visited: Vec<bool>,
    predecessors: Vec<Option<usize>>,
    queue: VecDeque<Position>,
}

impl SearchWorkspace {
    fn reset(&mut self, tile_count: usize) {
        self.visited.clear();
        self.visited.resize(tile_count, false);
        self.predecessors.clear();
        self.predecessors.resize(tile_count, None);
        self.queue.clear();
    }

    fn next_step(
        &mut self,
        maze: MazeView<'_>,
        from: Position,
        target: Position,
    ) -> Option<Position> {
        if from == target {
            return None;
        }
        let start = maze.index(from)?;
        let goal = maze.index(target)?;

        self.reset(maze.tile_count());
        *self.visited.get_mut(start)? = true;
        self.queue.push_back(from);

        let mut found = false;
        'search: while let Some(current) = self.queue.pop_front() {
            let Some(current_index) = maze.index(current) else {
                continue;
            };
            for neighbor in maze.neighbors(current) {
                let Some(index) = maze.index(neighbor) else {
                    continue;
                };
                if self.visited[index] {
                    continue;
                }
                self.visited[index] = true;
                self.predecessors[index] = Some(current_index);
                if index == goal {
                    found = true;
                    break 'search;
                }
                self.queue.push_back(neighbor);
            }
        }

        if !found {
            return None;
        }

        let mut cursor = goal;
        loop {
            let parent = self.predecessors[cursor]?;
            if parent == start {
                return maze.position_at(cursor);
            }
            cursor = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use grand_chase_core::{Epoch, Tile};

    use super::*;

    fn tiles(rows: &[&str]) -> (Vec<Tile>, u32, u32) {
        let tiles = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|glyph| if glyph == '#' { Tile::Wall } else { Tile::Path })
            .collect();
        (tiles, rows[0].len() as u32, rows.len() as u32)
    }

    #[test]
    fn follows_a_corridor() {
        let (grid, columns, rows) = tiles(&["#####", "#...#", "#####"]);
        let maze = MazeView::new(&grid, columns, rows, None);

        assert_eq!(
            next_step(maze, Position::new(3, 1), Position::new(1, 1)),
            Some(Position::new(2, 1))
        );
    }

    #[test]
    fn ties_prefer_up_then_down_then_left_then_right() {
        let (grid, columns, rows) = tiles(&["...", "...", "..."]);
        let maze = MazeView::new(&grid, columns, rows, None);

        assert_eq!(
            next_step(maze, Position::new(0, 0), Position::new(1, 1)),
            Some(Position::new(0, 1))
        );
        assert_eq!(
            next_step(maze, Position::new(1, 1), Position::new(0, 0)),
            Some(Position::new(1, 0))
        );
    }

    #[test]
    fn routes_around_walls() {
        let (grid, columns, rows) = tiles(&[".#.", ".#.", "..."]);
        let maze = MazeView::new(&grid, columns, rows, None);

        assert_eq!(
            next_step(maze, Position::new(0, 0), Position::new(2, 0)),
            Some(Position::new(0, 1))
        );
    }

    #[test]
    fn uses_the_tunnel_when_shorter() {
        let (grid, columns, rows) = tiles(&["#######", ".......", "#######"]);
        let maze = MazeView::new(&grid, columns, rows, Some(1));

        assert_eq!(
            next_step(maze, Position::new(0, 1), Position::new(6, 1)),
            Some(Position::new(6, 1))
        );
        assert_eq!(
            next_step(maze, Position::new(1, 1), Position::new(5, 1)),
            Some(Position::new(0, 1))
        );
    }

    #[test]
    fn holds_when_unreachable_or_already_there() {
        let (grid, columns, rows) = tiles(&[".#."]);
        let maze = MazeView::new(&grid, columns, rows, None);

        assert_eq!(next_step(maze, Position::new(0, 0), Position::new(2, 0)), None);
        assert_eq!(next_step(maze, Position::new(0, 0), Position::new(0, 0)), None);
        assert_eq!(next_step(maze, Position::new(0, 0), Position::new(9, 9)), None);
    }

    #[test]
    fn answers_each_turn_with_its_epoch() {
        let (grid, columns, rows) = tiles(&["...."]);
        let maze = MazeView::new(&grid, columns, rows, None);
        let mut pursuit = Pursuit::default();
        let mut commands = Vec::new();

        pursuit.handle(
            &[
                Event::TimeAdvanced {
                    dt: std::time::Duration::from_millis(16),
                },
                Event::AdversaryTurn {
                    epoch: Epoch::new(4),
                },
            ],
            maze,
            Position::new(3, 0),
            Position::new(0, 0),
            &mut commands,
        );

        assert_eq!(
            commands,
            vec![Command::ResolveAdversaryTurn {
                epoch: Epoch::new(4),
                next: Some(Position::new(2, 0)),
            }]
        );
    }
}
