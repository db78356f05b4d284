//! Randomised placement of cheese and powerups.

use std::collections::BTreeSet;

use grand_chase_core::{Position, PowerupKind};
use rand::Rng;

use crate::Maze;

/// Random draws allowed per tile for each item pool before giving up.
const ATTEMPTS_PER_TILE: usize = 10;

/// A powerup lying in the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Powerup {
    position: Position,
    kind: PowerupKind,
}

impl Powerup {
    /// Creates a powerup of the provided kind on a tile.
    #[must_use]
    pub const fn new(position: Position, kind: PowerupKind) -> Self {
        Self { position, kind }
    }

    /// Tile the powerup occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Effect granted when the powerup is collected.
    #[must_use]
    pub const fn kind(&self) -> PowerupKind {
        self.kind
    }
}

/// Items placed for one level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Population {
    /// Tiles holding a cheese.
    pub cheese: BTreeSet<Position>,
    /// Powerups in placement order.
    pub powerups: Vec<Powerup>,
}

/// Scatters cheese and then powerups over walkable tiles.
///
/// Tiles are drawn uniformly from the whole grid and kept only when they are
/// walkable, differ from both start positions and are still free. Each pool
/// gets `columns * rows * 10` draws; when the budget runs out the pool is left
/// short instead of looping forever. Powerups never share a tile with cheese.
pub fn populate<R: Rng + ?Sized>(
    maze: &Maze,
    player_start: Position,
    adversary_start: Position,
    cheese_count: u32,
    powerup_count: u32,
    rng: &mut R,
) -> Population {
    let mut population = Population::default();
    let (columns, rows) = (maze.columns(), maze.rows());
    if columns == 0 || rows == 0 {
        return population;
    }

    let budget = usize::try_from(columns)
        .ok()
        .zip(usize::try_from(rows).ok())
        .and_then(|(columns, rows)| columns.checked_mul(rows))
        .and_then(|tiles| tiles.checked_mul(ATTEMPTS_PER_TILE))
        .unwrap_or(usize::MAX);

    let is_free = |position: Position| {
        maze.is_path(position) && position != player_start && position != adversary_start
    };

    let cheese_target = usize::try_from(cheese_count).unwrap_or(usize::MAX);
    let mut attempts = 0;
    while population.cheese.len() < cheese_target && attempts < budget {
        attempts += 1;
        let candidate = draw(rng, columns, rows);
        if is_free(candidate) {
            let _ = population.cheese.insert(candidate);
        }
    }

    let powerup_target = usize::try_from(powerup_count).unwrap_or(usize::MAX);
    let mut attempts = 0;
    while population.powerups.len() < powerup_target && attempts < budget {
        attempts += 1;
        let candidate = draw(rng, columns, rows);
        let taken = population.cheese.contains(&candidate)
            || population
                .powerups
                .iter()
                .any(|powerup| powerup.position == candidate);
        if is_free(candidate) && !taken {
            population
                .powerups
                .push(Powerup::new(candidate, PowerupKind::AdversarySlow));
        }
    }

    population
}

fn draw<R: Rng + ?Sized>(rng: &mut R, columns: u32, rows: u32) -> Position {
    let column = rng.gen_range(0..columns);
    let row = rng.gen_range(0..rows);
    Position::new(column, row)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::LevelCatalog;

    fn corridor(length: usize) -> Maze {
        Maze::from_rows(&[".".repeat(length)], None).expect("valid layout")
    }

    #[test]
    fn standard_level_is_fully_populated() {
        let catalog = LevelCatalog::standard();
        let layout = catalog.load_level(1).expect("level defined");
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let population = populate(
            layout.maze(),
            layout.player_start(),
            layout.adversary_start(),
            12,
            1,
            &mut rng,
        );

        assert_eq!(population.cheese.len(), 12);
        assert_eq!(population.powerups.len(), 1);
    }

    #[test]
    fn small_maze_degrades_without_hanging() {
        let maze = corridor(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let population = populate(
            &maze,
            Position::new(0, 0),
            Position::new(3, 0),
            12,
            1,
            &mut rng,
        );

        assert_eq!(population.cheese.len(), 2);
        assert!(population.powerups.is_empty());
    }

    #[test]
    fn fully_walled_maze_places_nothing() {
        let maze = Maze::from_rows(&["###", "#.#", "###"], None).expect("valid layout");
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let population = populate(
            &maze,
            Position::new(1, 1),
            Position::new(1, 1),
            5,
            5,
            &mut rng,
        );

        assert_eq!(population, Population::default());
    }

    #[test]
    fn placement_is_reproducible_for_a_seed() {
        let maze = corridor(30);
        let first = populate(
            &maze,
            Position::new(0, 0),
            Position::new(29, 0),
            6,
            2,
            &mut ChaCha8Rng::seed_from_u64(99),
        );
        let second = populate(
            &maze,
            Position::new(0, 0),
            Position::new(29, 0),
            6,
            2,
            &mut ChaCha8Rng::seed_from_u64(99),
        );

        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn placed_items_respect_exclusions(seed in any::<u64>(), cheese in 0u32..20, powerups in 0u32..4) {
            let catalog = LevelCatalog::standard();
            let layout = catalog.load_level(2).expect("level defined");
            let maze = layout.maze();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let population = populate(
                maze,
                layout.player_start(),
                layout.adversary_start(),
                cheese,
                powerups,
                &mut rng,
            );

            prop_assert!(population.cheese.len() <= cheese as usize);
            prop_assert!(population.powerups.len() <= powerups as usize);
            for position in &population.cheese {
                prop_assert!(maze.is_path(*position));
                prop_assert_ne!(*position, layout.player_start());
                prop_assert_ne!(*position, layout.adversary_start());
            }
            for powerup in &population.powerups {
                prop_assert!(maze.is_path(powerup.position()));
                prop_assert!(!population.cheese.contains(&powerup.position()));
                prop_assert_ne!(powerup.position(), layout.player_start());
                prop_assert_ne!(powerup.position(), layout.adversary_start());
            }
        }
    }
}
