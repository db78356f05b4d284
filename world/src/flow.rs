//! Session state machine.
//!
//! [`transition`] is a pure table: it names the next state and the effects
//! the world must carry out, and never touches world data itself. Every
//! `(state, trigger)` pair is listed so that adding a state or trigger fails
//! to compile until its row is decided.

use grand_chase_core::{Direction, GameState};

/// Inputs that may move the session between states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Player asked to start from the start menu.
    Start,
    /// Player asked to step in a direction.
    Move {
        /// Direction of the requested step.
        direction: Direction,
    },
    /// Player asked to pause.
    Pause,
    /// Player asked to resume.
    Resume,
    /// Player asked to restart at level one.
    Reset,
    /// Player asked to leave.
    Quit,
    /// The intro ran for its full duration.
    IntroElapsed,
    /// The adversary entered the player's tile.
    Caught,
    /// The last cheese of the level was collected.
    LevelCleared {
        /// Whether no further level is defined.
        final_level: bool,
    },
    /// The pause after clearing a level ran out.
    AdvanceElapsed,
}

/// Work the world performs when a transition is taken, in listed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Zero the score, load level one and start the adversary.
    BeginSession,
    /// Step the player in the direction carried by the trigger.
    MovePlayer,
    /// Invalidate outstanding adversary turns.
    SuspendAdversary,
    /// Start a fresh adversary tick chain.
    ResumeAdversary,
    /// Add the level score to the cumulative total.
    BankLevelScore,
    /// Arrange for the next level to load after the advance delay.
    ScheduleLevelAdvance,
    /// Load the next level and start the adversary.
    LoadNextLevel,
    /// Report that the process should terminate.
    Exit,
}

/// Outcome of an accepted trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State after the trigger.
    pub next: GameState,
    /// Effects to carry out, in order.
    pub effects: &'static [Effect],
}

const fn to(next: GameState, effects: &'static [Effect]) -> Option<Transition> {
    Some(Transition { next, effects })
}

/// Looks up the transition for a trigger, or `None` when the state ignores it.
///
/// `replay_after_final_win` decides whether a reset is accepted once every
/// level has been cleared.
#[must_use]
pub fn transition(
    state: GameState,
    trigger: Trigger,
    replay_after_final_win: bool,
) -> Option<Transition> {
    use Effect as E;
    use GameState as S;
    use Trigger as T;

    match (state, trigger) {
        (_, T::Quit) => to(state, &[E::Exit]),

        (
            S::Intro,
            T::Start | T::Move { .. } | T::Pause | T::Resume | T::Reset | T::IntroElapsed,
        ) => to(S::StartMenu, &[]),
        (S::Intro, T::Caught | T::LevelCleared { .. } | T::AdvanceElapsed) => None,

        (S::StartMenu, T::Start) => to(S::Playing, &[E::BeginSession]),
        (
            S::StartMenu,
            T::Move { .. }
            | T::Pause
            | T::Resume
            | T::Reset
            | T::IntroElapsed
            | T::Caught
            | T::LevelCleared { .. }
            | T::AdvanceElapsed,
        ) => None,

        (S::Playing, T::Move { .. }) => to(S::Playing, &[E::MovePlayer]),
        (S::Playing, T::Pause) => to(S::Paused, &[E::SuspendAdversary]),
        (S::Playing, T::Reset) => to(S::Playing, &[E::BeginSession]),
        (S::Playing, T::Caught) => to(S::GameOver, &[E::BankLevelScore]),
        (S::Playing, T::LevelCleared { final_level: false }) => {
            to(S::LevelWon, &[E::BankLevelScore, E::ScheduleLevelAdvance])
        }
        (S::Playing, T::LevelCleared { final_level: true }) => {
            to(S::GameWonFinal, &[E::BankLevelScore])
        }
        (S::Playing, T::Start | T::Resume | T::IntroElapsed | T::AdvanceElapsed) => None,

        (S::Paused, T::Resume) => to(S::Playing, &[E::ResumeAdversary]),
        (
            S::Paused,
            T::Start
            | T::Move { .. }
            | T::Pause
            | T::Reset
            | T::IntroElapsed
            | T::Caught
            | T::LevelCleared { .. }
            | T::AdvanceElapsed,
        ) => None,

        (S::GameOver, T::Reset) => to(S::Playing, &[E::BeginSession]),
        (
            S::GameOver,
            T::Start
            | T::Move { .. }
            | T::Pause
            | T::Resume
            | T::IntroElapsed
            | T::Caught
            | T::LevelCleared { .. }
            | T::AdvanceElapsed,
        ) => None,

        (S::LevelWon, T::AdvanceElapsed) => to(S::Playing, &[E::LoadNextLevel]),
        (S::LevelWon, T::Reset) => to(S::Playing, &[E::BeginSession]),
        (
            S::LevelWon,
            T::Start
            | T::Move { .. }
            | T::Pause
            | T::Resume
            | T::IntroElapsed
            | T::Caught
            | T::LevelCleared { .. },
        ) => None,

        (S::GameWonFinal, T::Reset) if replay_after_final_win => {
            to(S::Playing, &[E::BeginSession])
        }
        (
            S::GameWonFinal,
            T::Reset
            | T::Start
            | T::Move { .. }
            | T::Pause
            | T::Resume
            | T::IntroElapsed
            | T::Caught
            | T::LevelCleared { .. }
            | T::AdvanceElapsed,
        ) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [GameState; 7] = [
        GameState::Intro,
        GameState::StartMenu,
        GameState::Playing,
        GameState::Paused,
        GameState::GameOver,
        GameState::LevelWon,
        GameState::GameWonFinal,
    ];

    fn next(state: GameState, trigger: Trigger) -> Option<GameState> {
        transition(state, trigger, false).map(|transition| transition.next)
    }

    #[test]
    fn quit_is_accepted_everywhere() {
        for state in STATES {
            let transition = transition(state, Trigger::Quit, false).expect("quit accepted");
            assert_eq!(transition.next, state);
            assert_eq!(transition.effects, &[Effect::Exit]);
        }
    }

    #[test]
    fn any_key_dismisses_the_intro() {
        for trigger in [
            Trigger::Start,
            Trigger::Move {
                direction: Direction::Left,
            },
            Trigger::Pause,
            Trigger::Reset,
            Trigger::IntroElapsed,
        ] {
            assert_eq!(next(GameState::Intro, trigger), Some(GameState::StartMenu));
        }
    }

    #[test]
    fn reset_is_ignored_while_paused() {
        assert_eq!(next(GameState::Paused, Trigger::Reset), None);
        assert_eq!(
            next(GameState::Paused, Trigger::Move { direction: Direction::Up }),
            None
        );
    }

    #[test]
    fn reset_restarts_from_play_and_end_screens() {
        for state in [GameState::Playing, GameState::GameOver, GameState::LevelWon] {
            let transition = transition(state, Trigger::Reset, false).expect("reset accepted");
            assert_eq!(transition.next, GameState::Playing);
            assert_eq!(transition.effects, &[Effect::BeginSession]);
        }
    }

    #[test]
    fn final_win_accepts_reset_only_when_configured() {
        assert_eq!(next(GameState::GameWonFinal, Trigger::Reset), None);
        assert_eq!(
            transition(GameState::GameWonFinal, Trigger::Reset, true).map(|t| t.next),
            Some(GameState::Playing)
        );
    }

    #[test]
    fn clearing_a_level_banks_before_advancing() {
        let cleared = transition(
            GameState::Playing,
            Trigger::LevelCleared { final_level: false },
            false,
        )
        .expect("accepted");
        assert_eq!(cleared.next, GameState::LevelWon);
        assert_eq!(
            cleared.effects,
            &[Effect::BankLevelScore, Effect::ScheduleLevelAdvance]
        );

        let finished = transition(
            GameState::Playing,
            Trigger::LevelCleared { final_level: true },
            false,
        )
        .expect("accepted");
        assert_eq!(finished.next, GameState::GameWonFinal);
        assert_eq!(finished.effects, &[Effect::BankLevelScore]);

        assert_eq!(
            next(GameState::LevelWon, Trigger::AdvanceElapsed),
            Some(GameState::Playing)
        );
    }

    #[test]
    fn pause_round_trip_suspends_and_resumes() {
        let paused = transition(GameState::Playing, Trigger::Pause, false).expect("accepted");
        assert_eq!(paused.next, GameState::Paused);
        assert_eq!(paused.effects, &[Effect::SuspendAdversary]);

        let resumed = transition(GameState::Paused, Trigger::Resume, false).expect("accepted");
        assert_eq!(resumed.next, GameState::Playing);
        assert_eq!(resumed.effects, &[Effect::ResumeAdversary]);
    }

    #[test]
    fn capture_only_matters_while_playing() {
        assert_eq!(
            next(GameState::Playing, Trigger::Caught),
            Some(GameState::GameOver)
        );
        for state in STATES {
            if state != GameState::Playing {
                assert_eq!(next(state, Trigger::Caught), None);
            }
        }
    }
}
