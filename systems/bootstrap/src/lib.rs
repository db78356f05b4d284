#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Grand Chase experience.

use grand_chase_core::GAME_TITLE;

/// A key binding described for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Control {
    /// Keys that trigger the action.
    pub keys: &'static str,
    /// What the keys do.
    pub action: &'static str,
}

const CONTROLS: [Control; 4] = [
    Control {
        keys: "WASD or Arrow Keys",
        action: "Move",
    },
    Control {
        keys: "P",
        action: "Pause / Resume",
    },
    Control {
        keys: "R",
        action: "Reset Game",
    },
    Control {
        keys: "ESC",
        action: "Quit",
    },
];

const CREDITS: [&str; 2] = ["A Game By", "Mohamed Naeem"];

const HINTS: [&str; 2] = [
    "Collect all the cheese to advance, avoid the cat: it gets faster!",
    "Blue items will temporarily slow the cat down.",
];

/// Produces the copy required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Title shown on the start menu and in the terminal window.
    #[must_use]
    pub fn title(&self) -> &'static str {
        GAME_TITLE
    }

    /// Lines shown while the intro plays.
    #[must_use]
    pub fn credits(&self) -> &'static [&'static str] {
        &CREDITS
    }

    /// Prompt that explains how to leave the start menu.
    #[must_use]
    pub fn start_prompt(&self) -> &'static str {
        "Press ENTER to Start"
    }

    /// Key bindings listed on the start menu.
    #[must_use]
    pub fn controls(&self) -> &'static [Control] {
        &CONTROLS
    }

    /// Gameplay tips listed below the controls.
    #[must_use]
    pub fn hints(&self) -> &'static [&'static str] {
        &HINTS
    }
}
