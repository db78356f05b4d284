#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terminal rendering backend for Grand Chase built on crossterm.
//!
//! The backend owns the terminal for the duration of [`RenderingBackend::run`]:
//! raw mode and the alternate screen are entered on start and restored on
//! every exit path, including errors.

use std::{
    f32::consts::TAU,
    io::{self, Write},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event as TerminalEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{self, Print, ResetColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use grand_chase_core::{Command, Direction, GameState};
use grand_chase_rendering::{
    palette, CellKind, Color, FrameControl, FrameInput, RenderingBackend, Scene,
};

/// Terminal columns used to draw a single maze cell.
const CELL_WIDTH: u16 = 2;
/// Rows above the maze reserved for the title and the HUD.
const HEADER_ROWS: u16 = 3;
/// Radians the powerup sparkle advances per second.
const SPARKLE_RATE: f32 = 5.0;

/// Rendering backend that draws scenes as coloured text in a terminal.
#[derive(Clone, Copy, Debug)]
pub struct TerminalBackend {
    frame_interval: Duration,
}

impl TerminalBackend {
    /// Creates a backend that presents at most `frames_per_second` frames.
    #[must_use]
    pub fn new(frames_per_second: u32) -> Self {
        let frames_per_second = frames_per_second.max(1);
        Self {
            frame_interval: Duration::from_secs(1) / frames_per_second,
        }
    }

    /// Target time between two presented frames.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

impl Default for TerminalBackend {
    fn default() -> Self {
        Self::new(60)
    }
}

impl RenderingBackend for TerminalBackend {
    fn run<F>(self, title: &str, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl,
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode().context("failed to enable raw terminal mode")?;
        let _restore = RestoreTerminal;
        execute!(
            stdout,
            EnterAlternateScreen,
            cursor::Hide,
            SetTitle(title)
        )
        .context("failed to enter the alternate screen")?;

        let mut scene = Scene::empty();
        let mut sparkle = Sparkle::default();
        let mut last_frame = Instant::now();

        loop {
            let input = collect_input(last_frame + self.frame_interval, scene.state)?;

            let now = Instant::now();
            let dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            sparkle.advance(dt);

            let control = update_scene(dt, input, &mut scene);
            draw(&mut stdout, title, &scene, sparkle).context("failed to draw frame")?;

            if control == FrameControl::Exit {
                return Ok(());
            }
        }
    }
}

struct RestoreTerminal;

impl Drop for RestoreTerminal {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Waits for key presses until `deadline`, decoding them against `state`.
fn collect_input(deadline: Instant, state: GameState) -> Result<FrameInput> {
    let mut input = FrameInput::default();
    loop {
        let timeout = deadline.saturating_duration_since(Instant::now());
        if !event::poll(timeout).context("failed to poll terminal events")? {
            return Ok(input);
        }
        if let TerminalEvent::Key(key) = event::read().context("failed to read terminal event")? {
            if let Some(intent) = decode_key(key, state) {
                input.intents.push(intent);
            }
        }
    }
}

/// Maps a key press onto a player intent.
///
/// `P` toggles between pause and resume depending on `state`. During the
/// intro every unmapped key counts as a request to move on.
#[must_use]
pub fn decode_key(key: KeyEvent, state: GameState) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let intent = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Command::Quit,
        KeyCode::Up | KeyCode::Char('w' | 'W') => Command::Move {
            direction: Direction::Up,
        },
        KeyCode::Down | KeyCode::Char('s' | 'S') => Command::Move {
            direction: Direction::Down,
        },
        KeyCode::Left | KeyCode::Char('a' | 'A') => Command::Move {
            direction: Direction::Left,
        },
        KeyCode::Right | KeyCode::Char('d' | 'D') => Command::Move {
            direction: Direction::Right,
        },
        KeyCode::Char('p' | 'P') if state == GameState::Paused => Command::Resume,
        KeyCode::Char('p' | 'P') => Command::Pause,
        KeyCode::Char('r' | 'R') => Command::Reset,
        KeyCode::Enter => Command::StartGame,
        _ if state == GameState::Intro => Command::StartGame,
        _ => return None,
    };
    Some(intent)
}

/// Phase of the pulsing highlight drawn on powerups.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Sparkle {
    phase: f32,
}

impl Sparkle {
    fn advance(&mut self, dt: Duration) {
        self.phase = (self.phase + dt.as_secs_f32() * SPARKLE_RATE) % TAU;
    }

    fn powerup_color(self) -> Color {
        palette::POWERUP.lighten(0.8 * (0.5 + 0.5 * self.phase.sin()))
    }
}

fn glyph(kind: CellKind, sparkle: Sparkle) -> (&'static str, Color) {
    match kind {
        CellKind::Wall => ("██", palette::WALL),
        CellKind::Floor => ("  ", palette::BACKGROUND),
        CellKind::Cheese => ("[]", palette::CHEESE),
        CellKind::Powerup => ("<>", sparkle.powerup_color()),
        CellKind::Player => ("()", palette::PLAYER),
        CellKind::Adversary => ("^^", palette::ADVERSARY),
    }
}

fn terminal_color(color: Color) -> style::Color {
    let (r, g, b) = color.to_rgb_u8();
    style::Color::Rgb { r, g, b }
}

fn centered(width: u16, text: &str) -> u16 {
    let length = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    width.saturating_sub(length) / 2
}

fn draw(out: &mut impl Write, title: &str, scene: &Scene, sparkle: Sparkle) -> io::Result<()> {
    let (terminal_width, terminal_height) = terminal::size()?;
    let maze_width = u16::try_from(scene.columns)
        .unwrap_or(u16::MAX)
        .saturating_mul(CELL_WIDTH);
    let maze_height = u16::try_from(scene.rows).unwrap_or(u16::MAX);
    let width = if scene.cells.is_empty() {
        terminal_width
    } else {
        maze_width
    };

    queue!(out, BeginSynchronizedUpdate, Clear(ClearType::All))?;
    queue!(
        out,
        cursor::MoveTo(centered(width, title), 0),
        SetForegroundColor(terminal_color(palette::TEXT)),
        Print(title)
    )?;

    if let Some(hud) = &scene.hud {
        let right = hud.right_text();
        let right_length = u16::try_from(right.chars().count()).unwrap_or(u16::MAX);
        queue!(
            out,
            cursor::MoveTo(0, 1),
            SetForegroundColor(terminal_color(palette::TEXT)),
            Print(hud.left_text()),
            cursor::MoveTo(maze_width.saturating_sub(right_length), 1),
            Print(right)
        )?;
        if hud.slowed {
            queue!(
                out,
                cursor::MoveTo(centered(maze_width, "SLOWED!"), 2),
                SetForegroundColor(terminal_color(palette::SLOWED)),
                Print("SLOWED!")
            )?;
        }
    }

    if !scene.cells.is_empty() {
        for row in 0..scene.rows {
            let screen_row = HEADER_ROWS.saturating_add(u16::try_from(row).unwrap_or(u16::MAX));
            queue!(out, cursor::MoveTo(0, screen_row))?;
            for column in 0..scene.columns {
                let Some(kind) = scene.cell(column, row) else {
                    continue;
                };
                let (text, color) = glyph(kind, sparkle);
                queue!(out, SetForegroundColor(terminal_color(color)), Print(text))?;
            }
        }
    }

    let overlay_rows = u16::try_from(scene.overlay.len()).unwrap_or(u16::MAX);
    let area_height = if scene.cells.is_empty() {
        terminal_height.saturating_sub(HEADER_ROWS)
    } else {
        maze_height
    };
    let first_row = HEADER_ROWS.saturating_add(area_height.saturating_sub(overlay_rows) / 2);
    for (offset, line) in (0u16..).zip(&scene.overlay) {
        queue!(
            out,
            cursor::MoveTo(centered(width, &line.text), first_row.saturating_add(offset)),
            SetForegroundColor(terminal_color(line.color)),
            Print(&line.text)
        )?;
    }

    queue!(out, ResetColor, EndSynchronizedUpdate)?;
    out.flush()
}
