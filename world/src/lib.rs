#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Grand Chase.
//!
//! The world owns the maze, both actors, the collectibles, the session state
//! machine and a simulated clock. It changes only through [`apply`], which
//! executes one [`Command`] and reports what happened as [`Event`] values.
//! Adversary movement is split in two: when a turn comes due the world emits
//! [`Event::AdversaryTurn`], and a pursuit system answers with
//! [`Command::ResolveAdversaryTurn`] carrying the same epoch.

mod effect;
mod flow;
mod maze;
mod populate;
mod schedule;

use std::{collections::BTreeSet, time::Duration};

use grand_chase_core::{
    Command, Direction, Epoch, Event, GameState, Position, PowerupKind, Rules, RulesError,
};
use grand_chase_system_difficulty::{collected_fraction, Difficulty};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use crate::{
    effect::SlowEffect,
    schedule::{DueTask, Task, TickScheduler},
};

pub use flow::{transition, Effect, Transition, Trigger};
pub use maze::{LayoutError, LevelCatalog, LevelLayout, Maze};
pub use populate::{populate, Population, Powerup};

/// Represents the authoritative Grand Chase world state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    difficulty: Difficulty,
    catalog: LevelCatalog,
    rng: ChaCha8Rng,
    state: GameState,
    level: u32,
    level_score: u32,
    total_score: u32,
    maze: Maze,
    player: Position,
    adversary: Position,
    cheese: BTreeSet<Position>,
    initial_cheese: usize,
    powerups: Vec<Powerup>,
    adversary_interval: Duration,
    slow_effect: SlowEffect,
    epoch: Epoch,
    scheduler: TickScheduler,
    pending_turn: Option<Epoch>,
    quit_requested: bool,
}

impl World {
    /// Creates a world on the built-in levels, showing the intro.
    ///
    /// Every random draw of the session comes from a generator seeded once
    /// with `seed`, so equal seeds and command streams replay identically.
    pub fn new(rules: Rules, seed: u64) -> Result<Self, RulesError> {
        Self::with_catalog(rules, LevelCatalog::standard(), seed)
    }

    /// Creates a world that plays the provided levels.
    ///
    /// The rules are validated first: a zero adversary interval would make a
    /// single tick fire turns forever.
    pub fn with_catalog(
        rules: Rules,
        catalog: LevelCatalog,
        seed: u64,
    ) -> Result<Self, RulesError> {
        rules.validate()?;
        let difficulty = Difficulty::from_rules(&rules);
        let mut world = Self {
            difficulty,
            catalog,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: GameState::Intro,
            level: 1,
            level_score: 0,
            total_score: 0,
            maze: Maze::default(),
            player: Position::new(0, 0),
            adversary: Position::new(0, 0),
            cheese: BTreeSet::new(),
            initial_cheese: 0,
            powerups: Vec::new(),
            adversary_interval: difficulty.initial_delay(),
            slow_effect: SlowEffect::default(),
            epoch: Epoch::default(),
            scheduler: TickScheduler::default(),
            pending_turn: None,
            quit_requested: false,
            rules,
        };

        let mut discarded = Vec::new();
        world.init_level(&mut discarded);
        world.scheduler.schedule(
            world.rules.intro_duration,
            Task::DismissIntro,
            world.epoch,
        );
        Ok(world)
    }

    fn fire(&mut self, trigger: Trigger, out_events: &mut Vec<Event>) -> bool {
        let Some(transition) =
            flow::transition(self.state, trigger, self.rules.replay_after_final_win)
        else {
            trace!(state = ?self.state, ?trigger, "trigger ignored");
            return false;
        };

        if transition.next != self.state {
            let from = self.state;
            self.state = transition.next;
            info!(?from, to = ?self.state, "state changed");
            out_events.push(Event::StateChanged {
                from,
                to: self.state,
            });
        }

        for effect in transition.effects {
            self.run_effect(*effect, trigger, out_events);
        }
        true
    }

    fn run_effect(&mut self, effect: Effect, trigger: Trigger, out_events: &mut Vec<Event>) {
        match effect {
            Effect::BeginSession => {
                self.epoch = self.epoch.next();
                self.level = 1;
                self.total_score = 0;
                self.init_level(out_events);
                self.schedule_adversary();
            }
            Effect::MovePlayer => {
                if let Trigger::Move { direction } = trigger {
                    self.move_player(direction, out_events);
                }
            }
            Effect::SuspendAdversary => {
                self.epoch = self.epoch.next();
                self.pending_turn = None;
            }
            Effect::ResumeAdversary => {
                self.epoch = self.epoch.next();
                self.schedule_adversary();
            }
            Effect::BankLevelScore => {
                self.total_score = self.total_score.saturating_add(self.level_score);
                self.level_score = 0;
            }
            Effect::ScheduleLevelAdvance => {
                self.scheduler.schedule(
                    self.rules.level_advance_delay,
                    Task::AdvanceLevel,
                    self.epoch,
                );
            }
            Effect::LoadNextLevel => {
                self.epoch = self.epoch.next();
                self.level = self.level.saturating_add(1);
                self.init_level(out_events);
                self.schedule_adversary();
            }
            Effect::Exit => {
                self.quit_requested = true;
                info!("quit requested");
                out_events.push(Event::QuitRequested);
            }
        }
    }

    fn init_level(&mut self, out_events: &mut Vec<Event>) {
        let Some(layout) = self.catalog.load_level(self.level) else {
            warn!(level = self.level, "level is not defined");
            return;
        };

        self.maze = layout.maze().clone();
        self.player = layout.player_start();
        self.adversary = layout.adversary_start();

        let population = populate(
            &self.maze,
            self.player,
            self.adversary,
            self.rules.cheese_per_level,
            self.rules.powerups_per_level,
            &mut self.rng,
        );
        let placed_cheese = population.cheese.len();
        let placed_powerups = population.powerups.len();
        let requested_cheese = usize::try_from(self.rules.cheese_per_level).unwrap_or(usize::MAX);
        let requested_powerups =
            usize::try_from(self.rules.powerups_per_level).unwrap_or(usize::MAX);

        if placed_cheese < requested_cheese || placed_powerups < requested_powerups {
            warn!(
                level = self.level,
                placed_cheese,
                requested_cheese,
                placed_powerups,
                requested_powerups,
                "maze too small for the requested population"
            );
            out_events.push(Event::PopulationDegraded {
                level: self.level,
                requested_cheese: self.rules.cheese_per_level,
                placed_cheese,
                requested_powerups: self.rules.powerups_per_level,
                placed_powerups,
            });
        }

        self.cheese = population.cheese;
        self.powerups = population.powerups;
        self.initial_cheese = placed_cheese;
        self.level_score = 0;
        self.adversary_interval = self.difficulty.initial_delay();
        self.slow_effect.clear();
        self.pending_turn = None;

        if placed_cheese == 0 && placed_powerups == 0 {
            warn!(level = self.level, "no items placed");
        } else {
            info!(
                level = self.level,
                cheese = placed_cheese,
                powerups = placed_powerups,
                adversary_delay_ms = self.adversary_interval.as_millis() as u64,
                "level started"
            );
        }
        out_events.push(Event::LevelStarted {
            level: self.level,
            cheese: placed_cheese,
            powerups: placed_powerups,
            adversary_interval: self.adversary_interval,
        });
    }

    fn schedule_adversary(&mut self) {
        self.scheduler
            .schedule(self.adversary_interval, Task::AdversaryMove, self.epoch);
    }

    fn retune_adversary(&mut self, out_events: &mut Vec<Event>) {
        let fraction = collected_fraction(self.level_score, self.initial_cheese);
        self.adversary_interval = self.difficulty.delay_for(fraction);
        debug!(
            fraction,
            interval_ms = self.adversary_interval.as_millis() as u64,
            "adversary retuned"
        );
        out_events.push(Event::AdversaryIntervalChanged {
            interval: self.adversary_interval,
        });
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(next) = self.maze.view().step(self.player, direction) else {
            trace!(?direction, "move blocked");
            out_events.push(Event::MoveRejected { direction });
            return;
        };

        let from = self.player;
        self.player = next;
        debug!(?from, to = ?next, "player moved");
        out_events.push(Event::PlayerMoved { from, to: next });

        if self.cheese.remove(&next) {
            self.level_score = self.level_score.saturating_add(1);
            debug!(
                level_score = self.level_score,
                remaining = self.cheese.len(),
                "cheese collected"
            );
            out_events.push(Event::CheeseCollected {
                position: next,
                level_score: self.level_score,
                remaining: self.cheese.len(),
            });

            if !self.slow_effect.is_active() {
                self.retune_adversary(out_events);
            }

            if self.cheese.is_empty() {
                self.clear_level(out_events);
                return;
            }
        }

        if self.slow_effect.is_active() {
            return;
        }

        if let Some(index) = self
            .powerups
            .iter()
            .position(|powerup| powerup.position() == next)
        {
            let powerup = self.powerups.remove(index);
            out_events.push(Event::PowerupCollected {
                position: next,
                kind: powerup.kind(),
            });
            match powerup.kind() {
                PowerupKind::AdversarySlow => {
                    self.adversary_interval = self.slow_effect.activate(
                        self.rules.slow_duration,
                        self.adversary_interval,
                        self.rules.slow_floor(),
                    );
                    info!(
                        duration_ms = self.rules.slow_duration.as_millis() as u64,
                        "adversary slowed"
                    );
                    out_events.push(Event::SlowEffectStarted {
                        interval: self.adversary_interval,
                        duration: self.rules.slow_duration,
                    });
                }
            }
        }
    }

    fn clear_level(&mut self, out_events: &mut Vec<Event>) {
        let level = self.level;
        let final_level = self.catalog.load_level(level.saturating_add(1)).is_none();
        if !self.fire(Trigger::LevelCleared { final_level }, out_events) {
            return;
        }

        info!(level, total_score = self.total_score, "level completed");
        out_events.push(Event::LevelCompleted {
            level,
            total_score: self.total_score,
        });
        if final_level {
            info!(total_score = self.total_score, "game completed");
            out_events.push(Event::GameCompleted {
                total_score: self.total_score,
            });
        }
    }

    fn advance_clock(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        self.scheduler.advance(dt);

        if self.state == GameState::Playing && self.slow_effect.tick(dt) {
            let fraction = collected_fraction(self.level_score, self.initial_cheese);
            self.adversary_interval = self.difficulty.delay_for(fraction);
            info!("adversary slow effect ended");
            out_events.push(Event::SlowEffectEnded {
                interval: self.adversary_interval,
            });
        }

        while let Some(due) = self.scheduler.pop_due() {
            self.run_task(due, out_events);
        }
    }

    fn run_task(&mut self, due: DueTask, out_events: &mut Vec<Event>) {
        if due.epoch != self.epoch {
            trace!(task = ?due.task, epoch = due.epoch.get(), "stale task dropped");
            return;
        }

        match due.task {
            Task::DismissIntro => {
                let _ = self.fire(Trigger::IntroElapsed, out_events);
            }
            Task::AdvanceLevel => {
                let _ = self.fire(Trigger::AdvanceElapsed, out_events);
            }
            Task::AdversaryMove => {
                if self.state != GameState::Playing {
                    return;
                }
                if self.slow_effect.is_active() {
                    trace!("adversary halted by slow effect");
                    self.schedule_adversary();
                    return;
                }
                self.pending_turn = Some(self.epoch);
                out_events.push(Event::AdversaryTurn { epoch: self.epoch });
            }
        }
    }

    fn resolve_adversary_turn(
        &mut self,
        epoch: Epoch,
        next: Option<Position>,
        out_events: &mut Vec<Event>,
    ) {
        if self.pending_turn != Some(epoch)
            || epoch != self.epoch
            || self.state != GameState::Playing
        {
            trace!(epoch = epoch.get(), "stale adversary turn ignored");
            return;
        }
        self.pending_turn = None;

        let view = self.maze.view();
        match next {
            Some(target) if view.is_adjacent(self.adversary, target) => {
                let from = self.adversary;
                self.adversary = target;
                out_events.push(Event::AdversaryMoved { from, to: target });
            }
            Some(target) => {
                warn!(from = ?self.adversary, to = ?target, "adversary step rejected");
                out_events.push(Event::AdversaryHeld {
                    position: self.adversary,
                });
            }
            None => {
                out_events.push(Event::AdversaryHeld {
                    position: self.adversary,
                });
            }
        }

        if self.adversary == self.player {
            let level_score = self.level_score;
            if self.fire(Trigger::Caught, out_events) {
                info!(
                    level = self.level,
                    level_score,
                    total_score = self.total_score,
                    "player caught"
                );
                out_events.push(Event::Caught {
                    position: self.player,
                    level_score,
                    total_score: self.total_score,
                });
            }
            return;
        }

        self.schedule_adversary();
    }
}

/// Executes the provided command against the world.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame => {
            let _ = world.fire(Trigger::Start, out_events);
        }
        Command::Move { direction } => {
            let _ = world.fire(Trigger::Move { direction }, out_events);
        }
        Command::Pause => {
            let _ = world.fire(Trigger::Pause, out_events);
        }
        Command::Resume => {
            let _ = world.fire(Trigger::Resume, out_events);
        }
        Command::Reset => {
            let _ = world.fire(Trigger::Reset, out_events);
        }
        Command::Quit => {
            let _ = world.fire(Trigger::Quit, out_events);
        }
        Command::Tick { dt } => world.advance_clock(dt, out_events),
        Command::ResolveAdversaryTurn { epoch, next } => {
            world.resolve_adversary_turn(epoch, next, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use grand_chase_core::{Epoch, GameState, MazeView, Position};

    use super::{Powerup, World};

    /// Current session state.
    #[must_use]
    pub fn state(world: &World) -> GameState {
        world.state
    }

    /// Read-only view of the active level's grid.
    #[must_use]
    pub fn maze_view(world: &World) -> MazeView<'_> {
        world.maze.view()
    }

    /// Tile the player occupies.
    #[must_use]
    pub fn player(world: &World) -> Position {
        world.player
    }

    /// Tile the adversary occupies.
    #[must_use]
    pub fn adversary(world: &World) -> Position {
        world.adversary
    }

    /// Epoch that currently valid adversary turns carry.
    #[must_use]
    pub fn epoch(world: &World) -> Epoch {
        world.epoch
    }

    /// Whether a quit intent has been accepted.
    #[must_use]
    pub fn quit_requested(world: &World) -> bool {
        world.quit_requested
    }

    /// Captures everything a presenter needs to draw one frame.
    #[must_use]
    pub fn snapshot(world: &World) -> Snapshot<'_> {
        Snapshot {
            state: world.state,
            maze: world.maze.view(),
            player: world.player,
            adversary: world.adversary,
            cheese: world.cheese.iter().copied().collect(),
            powerups: world.powerups.clone(),
            level: world.level,
            level_score: world.level_score,
            total_score: world.total_score,
            adversary_interval: world.adversary_interval,
            slow_remaining: world
                .slow_effect
                .is_active()
                .then(|| world.slow_effect.remaining()),
            elapsed: world.scheduler.now(),
        }
    }

    /// Read-only picture of the world at one instant.
    #[derive(Clone, Debug)]
    pub struct Snapshot<'a> {
        /// Current session state.
        pub state: GameState,
        /// Grid of the active level.
        pub maze: MazeView<'a>,
        /// Tile the player occupies.
        pub player: Position,
        /// Tile the adversary occupies.
        pub adversary: Position,
        /// Remaining cheese, ordered by column and then by row.
        pub cheese: Vec<Position>,
        /// Remaining powerups.
        pub powerups: Vec<Powerup>,
        /// One-based number of the active level.
        pub level: u32,
        /// Cheese collected on the active level.
        pub level_score: u32,
        /// Score banked from earlier levels and captures.
        pub total_score: u32,
        /// Current adversary tick interval.
        pub adversary_interval: Duration,
        /// Time left on the slow effect, when active.
        pub slow_remaining: Option<Duration>,
        /// Simulated time accumulated from every tick so far.
        pub elapsed: Duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor_catalog(rows: &[&str], player: Position, adversary: Position) -> LevelCatalog {
        let maze = Maze::from_rows(rows, None).expect("valid layout");
        let layout = LevelLayout::new(maze, player, adversary).expect("valid starts");
        LevelCatalog::new(vec![layout]).expect("non-empty catalog")
    }

    fn started(world: &mut World) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::StartGame, &mut events);
        apply(world, Command::StartGame, &mut events);
        events
    }

    #[test]
    fn world_boots_into_the_intro_with_level_one_loaded() {
        let world = World::new(Rules::default(), 11).expect("default rules are valid");
        let snapshot = query::snapshot(&world);

        assert_eq!(snapshot.state, GameState::Intro);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.cheese.len(), 12);
        assert_eq!(snapshot.powerups.len(), 1);
        assert_eq!(snapshot.player, Position::new(1, 1));
        assert_eq!(snapshot.adversary, Position::new(11, 11));
        assert_eq!(snapshot.adversary_interval, Duration::from_millis(350));
    }

    #[test]
    fn snapshot_lists_cheese_column_by_column() {
        let world = World::new(Rules::default(), 11).expect("default rules are valid");
        let cheese = query::snapshot(&world).cheese;

        assert_eq!(cheese.len(), 12);
        assert!(cheese
            .windows(2)
            .all(|pair| (pair[0].column(), pair[0].row()) < (pair[1].column(), pair[1].row())));
    }

    #[test]
    fn zero_adversary_delays_are_refused() {
        let rules = Rules {
            initial_delay: Duration::ZERO,
            min_delay: Duration::ZERO,
            slow_bonus: Duration::ZERO,
            ..Rules::default()
        };

        assert!(matches!(
            World::new(rules, 3),
            Err(RulesError::ZeroMinimumDelay)
        ));
    }

    #[test]
    fn intro_dismisses_itself_after_its_duration() {
        let mut world = World::new(Rules::default(), 11).expect("default rules are valid");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(3_499),
            },
            &mut events,
        );
        assert_eq!(query::state(&world), GameState::Intro);

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1),
            },
            &mut events,
        );
        assert_eq!(query::state(&world), GameState::StartMenu);
    }

    #[test]
    fn starting_bumps_the_epoch_and_repopulates() {
        let mut world = World::new(Rules::default(), 11).expect("default rules are valid");
        let before = query::epoch(&world);
        let events = started(&mut world);

        assert_eq!(query::state(&world), GameState::Playing);
        assert!(query::epoch(&world) > before);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::LevelStarted { level: 1, .. })));
    }

    #[test]
    fn moves_into_walls_are_rejected() {
        let mut world = World::new(Rules::default(), 11).expect("default rules are valid");
        let _ = started(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Move {
                direction: Direction::Up,
            },
            &mut events,
        );

        assert_eq!(query::player(&world), Position::new(1, 1));
        assert_eq!(
            events,
            vec![Event::MoveRejected {
                direction: Direction::Up
            }]
        );
    }

    #[test]
    fn adversary_turns_are_requested_once_per_interval() {
        let catalog = corridor_catalog(&["......"], Position::new(0, 0), Position::new(5, 0));
        let rules = Rules {
            cheese_per_level: 0,
            powerups_per_level: 0,
            ..Rules::default()
        };
        let mut world = World::with_catalog(rules, catalog, 5).expect("valid rules");
        let _ = started(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(349),
            },
            &mut events,
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::AdversaryTurn { .. })));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1),
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::AdversaryTurn {
                epoch: query::epoch(&world)
            })
        );
    }

    #[test]
    fn stale_turn_answers_are_ignored() {
        let catalog = corridor_catalog(&["......"], Position::new(0, 0), Position::new(5, 0));
        let rules = Rules {
            cheese_per_level: 0,
            powerups_per_level: 0,
            ..Rules::default()
        };
        let mut world = World::with_catalog(rules, catalog, 5).expect("valid rules");
        let _ = started(&mut world);
        let stale = query::epoch(&world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(350),
            },
            &mut events,
        );
        apply(&mut world, Command::Reset, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::ResolveAdversaryTurn {
                epoch: stale,
                next: Some(Position::new(4, 0)),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::adversary(&world), Position::new(5, 0));
    }

    #[test]
    fn non_adjacent_steps_hold_the_adversary() {
        let catalog = corridor_catalog(&["......"], Position::new(0, 0), Position::new(5, 0));
        let rules = Rules {
            cheese_per_level: 0,
            powerups_per_level: 0,
            ..Rules::default()
        };
        let mut world = World::with_catalog(rules, catalog, 5).expect("valid rules");
        let _ = started(&mut world);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(350),
            },
            &mut events,
        );
        events.clear();
        let epoch = query::epoch(&world);
        apply(
            &mut world,
            Command::ResolveAdversaryTurn {
                epoch,
                next: Some(Position::new(2, 0)),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::AdversaryHeld {
                position: Position::new(5, 0)
            }]
        );
    }

    #[test]
    fn quit_is_reported_from_any_state() {
        let mut world = World::new(Rules::default(), 1).expect("default rules are valid");
        let mut events = Vec::new();

        apply(&mut world, Command::Quit, &mut events);

        assert!(query::quit_requested(&world));
        assert_eq!(events, vec![Event::QuitRequested]);
        assert_eq!(query::state(&world), GameState::Intro);
    }
}
