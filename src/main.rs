//! Blockfall: falling-block puzzle game in the terminal.

mod app;
mod game;
mod grid;
mod input;
mod piece;
mod records;
mod shape;
mod spawner;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{ArgAction, Parser, ValueEnum};
use records::Records;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use theme::Theme;
use thiserror::Error;
use tracing::{Level, warn};
use tracing_subscriber::prelude::*;

pub const MIN_WIDTH: u16 = 4;
pub const MAX_WIDTH: u16 = 32;

/// Grid height for a width; boards are always twice as tall as they are wide.
#[inline]
pub fn height_for(width: u16) -> u16 {
    width * 2
}

/// Validated options that drive the session and the timers.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: u16,
    pub gravity: Duration,
    pub frame_interval: Duration,
    pub spawn_column: SpawnColumn,
    pub seed: Option<u64>,
    /// Hide the ghost for this run regardless of the stored preference.
    pub no_shadow: bool,
    pub no_menu: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("width {0} is outside {min}..={max}", min = MIN_WIDTH, max = MAX_WIDTH)]
    Width(u16),
    #[error("gravity period must be non-zero")]
    ZeroGravity,
    #[error("frame rate must be a positive number, got {0}")]
    FrameRate(f64),
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&args.width) {
            return Err(ConfigError::Width(args.width));
        }
        if args.gravity_ms == 0 {
            return Err(ConfigError::ZeroGravity);
        }
        if !(args.frame_rate.is_finite() && args.frame_rate > 0.0) {
            return Err(ConfigError::FrameRate(args.frame_rate));
        }
        Ok(Self {
            width: args.width,
            gravity: Duration::from_millis(args.gravity_ms),
            frame_interval: Duration::from_secs_f64(1.0 / args.frame_rate),
            spawn_column: args.spawn_column,
            seed: args.seed,
            no_shadow: args.no_shadow,
            no_menu: args.no_menu,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;
    let config = GameConfig::from_args(&args)?;
    let theme = Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|err| {
        warn!(%err, "using the default theme");
        let mut theme = Theme::default();
        theme.apply_palette(args.palette);
        theme
    });
    let mut app = App::new(config, theme, Records::load());
    app.run()?;
    Ok(())
}

/// Installs a file logger when `--log-file` is given; the terminal itself is owned by the game.
fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
    Ok(())
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Falling-block puzzle in the terminal. Fill a row edge to edge to clear it.",
    long_about = "Blockfall is a terminal falling-block puzzle.\n\n\
        Pieces fall one row per gravity tick. Move and rotate them; a piece that cannot fall \
        any further locks into the stack. Every full row is cleared and scores one point. \
        The game ends when a new piece has no room to appear.\n\n\
        CONTROLS:\n  Left/a/h    Move left   Right/d/l   Move right   Up/w/k/r   Rotate\n  \
        Down/s/j    Soft drop   Space/Enter Hard drop    g          Toggle ghost\n  \
        n           Restart     p           Pause        q / Esc    Quit\n\n\
        On the menu, +/- change the board size. Use --theme to load a btop-style theme."
)]
pub struct Args {
    /// Board width in cells (4..=32); the height is always twice the width.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub width: u16,

    /// Gravity period: one row per tick.
    #[arg(long, default_value = "400", value_name = "MS")]
    pub gravity_ms: u64,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Column where new pieces appear.
    #[arg(long, default_value = "random")]
    pub spawn_column: SpawnColumn,

    /// Seed for the piece sequence (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Hide the landing ghost for this run.
    #[arg(long)]
    pub no_shadow: bool,

    /// Skip the menu and start immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write diagnostics to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// More log detail (repeat for more).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpawnColumn {
    /// Uniform over the columns that keep every piece inside the walls.
    #[default]
    Random,
    #[value(alias = "centre")]
    Center,
}
