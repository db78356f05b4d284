//! Frame pump that drives the world and its systems for the backend.

use std::time::Duration;

use grand_chase_core::{Command, Event, Position};
use grand_chase_rendering::{FrameControl, FrameInput, MenuCopy, Scene, SceneSource};
use grand_chase_system_bootstrap::Bootstrap;
use grand_chase_system_pursuit::Pursuit;
use grand_chase_world::{self as world, query, Powerup, World};
use tracing::trace;

/// Owns the world and replays player intents into it once per frame.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    pursuit: Pursuit,
    copy: MenuCopy,
    replay_after_final_win: bool,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    pub(crate) fn new(
        world: World,
        bootstrap: &Bootstrap,
        replay_after_final_win: bool,
    ) -> Self {
        Self {
            world,
            pursuit: Pursuit::default(),
            copy: menu_copy(bootstrap),
            replay_after_final_win,
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Applies the frame's intents, advances the clock by `dt` and redraws `scene`.
    pub(crate) fn frame(
        &mut self,
        dt: Duration,
        input: FrameInput,
        scene: &mut Scene,
    ) -> FrameControl {
        for intent in input.intents {
            self.submit(intent);
        }
        self.submit(Command::Tick { dt });

        *scene = self.compose();
        if query::quit_requested(&self.world) {
            FrameControl::Exit
        } else {
            FrameControl::Continue
        }
    }

    /// Applies `command` and settles every system reply it provokes.
    fn submit(&mut self, command: Command) {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);

        loop {
            for event in &self.events {
                trace!(?event, "world event");
            }

            self.commands.clear();
            self.pursuit.handle(
                &self.events,
                query::maze_view(&self.world),
                query::adversary(&self.world),
                query::player(&self.world),
                &mut self.commands,
            );
            if self.commands.is_empty() {
                return;
            }

            self.events.clear();
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
            }
        }
    }

    fn compose(&self) -> Scene {
        let snapshot = query::snapshot(&self.world);
        let powerups: Vec<Position> = snapshot.powerups.iter().map(Powerup::position).collect();
        let source = SceneSource {
            state: snapshot.state,
            maze: snapshot.maze,
            player: snapshot.player,
            adversary: snapshot.adversary,
            cheese: &snapshot.cheese,
            powerups: &powerups,
            level: snapshot.level,
            level_score: snapshot.level_score,
            total_score: snapshot.total_score,
            slowed: snapshot.slow_remaining.is_some(),
            replay_after_final_win: self.replay_after_final_win,
        };
        Scene::compose(&source, &self.copy)
    }
}

fn menu_copy(bootstrap: &Bootstrap) -> MenuCopy {
    MenuCopy {
        title: bootstrap.title().to_owned(),
        credits: bootstrap
            .credits()
            .iter()
            .map(|line| (*line).to_owned())
            .collect(),
        start_prompt: bootstrap.start_prompt().to_owned(),
        controls: bootstrap
            .controls()
            .iter()
            .map(|control| format!("{} to {}", control.keys, control.action))
            .collect(),
        hints: bootstrap
            .hints()
            .iter()
            .map(|line| (*line).to_owned())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use grand_chase_core::{Direction, GameState, Rules};
    use grand_chase_rendering::CellKind;

    use super::*;

    const FRAME: Duration = Duration::from_millis(50);

    fn simulation() -> Simulation {
        let world = World::new(Rules::default(), 5).expect("default rules are valid");
        Simulation::new(world, &Bootstrap, false)
    }

    fn frame(simulation: &mut Simulation, intents: Vec<Command>) -> (Scene, FrameControl) {
        let mut scene = Scene::empty();
        let control = simulation.frame(FRAME, FrameInput { intents }, &mut scene);
        (scene, control)
    }

    #[test]
    fn intro_hides_the_maze_and_lists_credits() {
        let mut simulation = simulation();
        let (scene, control) = frame(&mut simulation, Vec::new());

        assert_eq!(control, FrameControl::Continue);
        assert_eq!(scene.state, GameState::Intro);
        assert!(scene.cells.is_empty());
        assert!(scene.overlay.iter().any(|line| line.text == "Mohamed Naeem"));
    }

    #[test]
    fn start_menu_lists_the_controls() {
        let mut simulation = simulation();
        let (scene, _) = frame(&mut simulation, vec![Command::StartGame]);

        assert_eq!(scene.state, GameState::StartMenu);
        assert!(scene
            .overlay
            .iter()
            .any(|line| line.text == "P to Pause / Resume"));
    }

    #[test]
    fn playing_scene_paints_both_actors() {
        let mut simulation = simulation();
        let (scene, _) = frame(
            &mut simulation,
            vec![Command::StartGame, Command::StartGame],
        );

        assert_eq!(scene.state, GameState::Playing);
        assert_eq!(scene.cell(1, 1), Some(CellKind::Player));
        assert_eq!(scene.cell(11, 11), Some(CellKind::Adversary));
        assert_eq!(scene.hud.map(|hud| hud.level), Some(1));
    }

    #[test]
    fn adversary_turns_settle_within_the_frame() {
        let mut simulation = simulation();
        let _ = frame(
            &mut simulation,
            vec![Command::StartGame, Command::StartGame],
        );
        let start = query::adversary(&simulation.world);

        let mut scene = Scene::empty();
        let _ = simulation.frame(
            Duration::from_millis(350),
            FrameInput::default(),
            &mut scene,
        );

        let moved = query::adversary(&simulation.world);
        assert_ne!(moved, start);
        assert_eq!(
            scene.cell(moved.column(), moved.row()),
            Some(CellKind::Adversary)
        );
    }

    #[test]
    fn blocked_move_keeps_the_player_in_place() {
        let mut simulation = simulation();
        let (scene, _) = frame(
            &mut simulation,
            vec![
                Command::StartGame,
                Command::StartGame,
                Command::Move {
                    direction: Direction::Up,
                },
            ],
        );

        assert_eq!(scene.cell(1, 1), Some(CellKind::Player));
    }

    #[test]
    fn quit_exits_the_frame_loop() {
        let mut simulation = simulation();
        let (_, control) = frame(&mut simulation, vec![Command::Quit]);

        assert_eq!(control, FrameControl::Exit);
    }
}
