//! App: terminal init, gravity and render timers, screens and key handling.

use crate::game::{GameEvent, GameSession};
use crate::input::{Action, key_to_action};
use crate::records::Records;
use crate::spawner::Spawner;
use crate::theme::Theme;
use crate::ui::{self, Flash, View};
use crate::{GameConfig, MAX_WIDTH, MIN_WIDTH, height_for};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Board widths offered on the menu, besides the one from `--width`.
const RESOLUTIONS: [u16; 9] = [4, 6, 8, 10, 12, 16, 20, 24, 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
}

/// Widths that fit a terminal of `cols` x `rows`, ascending. Always includes `preferred` when it fits.
pub fn available_widths(preferred: u16, cols: u16, rows: u16) -> Vec<u16> {
    let mut widths: Vec<u16> = RESOLUTIONS
        .into_iter()
        .chain(std::iter::once(preferred))
        .filter(|w| (MIN_WIDTH..=MAX_WIDTH).contains(w))
        .filter(|&w| ui::board_fits(w, cols, rows))
        .collect();
    widths.sort_unstable();
    widths.dedup();
    widths
}

/// Neighbour of `current` in `widths` (`step` = +1 larger, -1 smaller), saturating at both ends.
/// A `current` missing from the list snaps to its larger neighbour when stepping up, otherwise
/// to the largest width below it.
pub fn step_width(widths: &[u16], current: u16, step: isize) -> u16 {
    let Some(&smallest) = widths.first() else {
        return current;
    };
    let index = match widths.binary_search(&current) {
        Ok(i) => i.saturating_add_signed(step),
        Err(0) => return smallest,
        Err(i) if step > 0 => i,
        Err(i) => i - 1,
    };
    widths[index.min(widths.len() - 1)]
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    records: Records,
    session: GameSession,
    screen: Screen,
    paused: bool,
    show_ghost: bool,
    /// Width of the running board, or the menu selection.
    width: u16,
    /// Menu choices that fit the terminal.
    widths: Vec<u16>,
    new_record: bool,
    flash: Option<Flash>,
    last_gravity: Instant,
    next_frame: Instant,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme, records: Records) -> Self {
        let spawner = match config.seed {
            Some(seed) => Spawner::with_seed(config.spawn_column, seed),
            None => Spawner::new(config.spawn_column),
        };
        let width = config.width;
        let session = GameSession::new(width, height_for(width), spawner);
        let screen = if config.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        let show_ghost = records.shadows() && !config.no_shadow;
        let now = Instant::now();
        Self {
            config,
            theme,
            records,
            session,
            screen,
            paused: false,
            show_ghost,
            width,
            widths: Vec::new(),
            new_record: false,
            flash: None,
            last_gravity: now,
            next_frame: now,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        // Best effort: lets held keys arrive as Repeat events where supported.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        info!(width = self.width, screen = ?self.screen, "started");
        let result = self.run_loop(&mut terminal);

        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        info!("stopped");
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        if self.screen == Screen::Menu {
            self.refresh_widths();
        }
        loop {
            let now = Instant::now();
            if now >= self.next_frame {
                if self.screen == Screen::Menu {
                    self.refresh_widths();
                }
                self.draw(terminal, now)?;
                self.next_frame = now + self.config.frame_interval;
                if self.flash.as_ref().is_some_and(Flash::done) {
                    self.flash = None;
                }
            }

            let timeout = self.next_deadline().saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key) = event::read()? else {
                        continue;
                    };
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    if self.handle_action(key_to_action(key)).is_break() {
                        return Ok(());
                    }
                }
            }

            if self.gravity_active() && self.last_gravity.elapsed() >= self.config.gravity {
                self.last_gravity = Instant::now();
                self.session.tick();
            }
            self.process_events();
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal, now: Instant) -> Result<()> {
        let view = View {
            screen: self.screen,
            session: &self.session,
            theme: &self.theme,
            paused: self.paused,
            show_ghost: self.show_ghost,
            best: self.records.best(self.width),
            new_record: self.new_record,
            widths: &self.widths,
            selected_width: self.width,
        };
        let flash = self.flash.as_mut();
        terminal.draw(|frame| ui::draw(frame, &view, flash, now))?;
        Ok(())
    }

    #[inline]
    fn gravity_active(&self) -> bool {
        self.screen == Screen::Playing && !self.paused
    }

    /// Earliest of the next frame and the next gravity tick.
    fn next_deadline(&self) -> Instant {
        if self.gravity_active() {
            self.next_frame.min(self.last_gravity + self.config.gravity)
        } else {
            self.next_frame
        }
    }

    /// Menu widths from the current terminal size; keeps the selection on a fitting width.
    fn refresh_widths(&mut self) {
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        self.widths = available_widths(self.config.width, cols, rows);
        if !self.widths.contains(&self.width) {
            self.width = step_width(&self.widths, self.width, 0);
        }
    }

    fn handle_action(&mut self, action: Action) -> ControlFlow<()> {
        if action == Action::Quit {
            return ControlFlow::Break(());
        }
        match self.screen {
            Screen::Menu => match action {
                Action::Larger | Action::MoveRight => {
                    self.width = step_width(&self.widths, self.width, 1);
                }
                Action::Smaller | Action::MoveLeft => {
                    self.width = step_width(&self.widths, self.width, -1);
                }
                Action::HardDrop | Action::Restart if !self.widths.is_empty() => self.start_game(),
                Action::ToggleGhost => self.toggle_ghost(),
                _ => {}
            },
            Screen::Playing if self.paused => {
                if action == Action::Pause {
                    self.paused = false;
                    self.last_gravity = Instant::now();
                }
            }
            Screen::Playing => match action {
                Action::MoveLeft => {
                    self.session.move_left();
                }
                Action::MoveRight => {
                    self.session.move_right();
                }
                Action::Rotate => {
                    self.session.rotate();
                }
                Action::SoftDrop => self.session.soft_drop(),
                Action::HardDrop => {
                    self.session.hard_drop();
                }
                Action::ToggleGhost => self.toggle_ghost(),
                Action::Restart => self.start_game(),
                Action::Pause => self.paused = true,
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Restart | Action::HardDrop => self.start_game(),
                Action::Menu => self.screen = Screen::Menu,
                Action::ToggleGhost => self.toggle_ghost(),
                _ => {}
            },
        }
        self.process_events();
        ControlFlow::Continue(())
    }

    /// Fresh session on the selected width.
    fn start_game(&mut self) {
        self.session.restart(self.width, height_for(self.width));
        self.screen = Screen::Playing;
        self.paused = false;
        self.new_record = false;
        self.flash = None;
        self.last_gravity = Instant::now();
    }

    fn toggle_ghost(&mut self) {
        self.show_ghost = !self.show_ghost;
        self.records.set_shadows(self.show_ghost);
        debug!(on = self.show_ghost, "ghost toggled");
        self.save_records();
    }

    fn save_records(&self) {
        if let Err(err) = self.records.save() {
            warn!(%err, "could not save records");
        }
    }

    fn process_events(&mut self) {
        for event in self.session.take_events() {
            match event {
                GameEvent::Locked { .. } => {}
                GameEvent::LinesCleared(_) => self.flash = Some(Flash::start()),
                GameEvent::GameOver { score } => {
                    self.screen = Screen::GameOver;
                    self.new_record = self.records.submit(self.width, score);
                    if self.new_record {
                        info!(width = self.width, score, "new record");
                        self.save_records();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpawnColumn;

    fn app(no_menu: bool) -> App {
        let config = GameConfig {
            width: 10,
            gravity: Duration::from_millis(400),
            frame_interval: Duration::from_millis(33),
            spawn_column: SpawnColumn::Center,
            seed: Some(4),
            no_shadow: false,
            no_menu,
        };
        let mut app = App::new(config, Theme::default(), Records::default());
        app.widths = available_widths(10, 200, 60);
        app
    }

    #[test]
    fn test_available_widths_fit_terminal() {
        assert_eq!(available_widths(10, 200, 60), vec![4, 6, 8, 10, 12, 16, 20, 24, 32]);
        // 80x24: board rows = width + 2 must fit in 24.
        assert_eq!(available_widths(10, 80, 24), vec![4, 6, 8, 10, 12, 16, 20]);
        assert_eq!(available_widths(14, 80, 24), vec![4, 6, 8, 10, 12, 14, 16, 20]);
        assert!(available_widths(10, 20, 5).is_empty());
    }

    #[test]
    fn test_step_width() {
        let widths = [4, 8, 10, 16];
        assert_eq!(step_width(&widths, 10, 1), 16);
        assert_eq!(step_width(&widths, 10, -1), 8);
        assert_eq!(step_width(&widths, 16, 1), 16);
        assert_eq!(step_width(&widths, 4, -1), 4);
        assert_eq!(step_width(&widths, 12, 0), 10);
        assert_eq!(step_width(&widths, 12, -1), 10);
        assert_eq!(step_width(&widths, 12, 1), 16);
        assert_eq!(step_width(&widths, 32, 0), 16);
        assert_eq!(step_width(&widths, 2, 1), 4);
        assert_eq!(step_width(&[], 10, 1), 10);
    }

    #[test]
    fn test_menu_selects_width_and_starts() {
        let mut app = app(false);
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.handle_action(Action::Larger).is_continue());
        assert_eq!(app.width, 12);
        assert!(app.handle_action(Action::Smaller).is_continue());
        assert!(app.handle_action(Action::Smaller).is_continue());
        assert_eq!(app.width, 8);
        assert!(app.handle_action(Action::HardDrop).is_continue());
        assert_eq!(app.screen, Screen::Playing);
        assert_eq!(app.session.grid().width(), 8);
        assert_eq!(app.session.grid().height(), 16);
    }

    #[test]
    fn test_menu_does_not_start_without_fitting_width() {
        let mut app = app(false);
        app.widths = available_widths(10, 20, 5);
        for action in [Action::HardDrop, Action::Restart] {
            assert!(app.handle_action(action).is_continue());
            assert_eq!(app.screen, Screen::Menu);
        }
    }

    #[test]
    fn test_quit_stops_from_any_screen() {
        let mut app = app(false);
        assert!(app.handle_action(Action::Quit).is_break());
        let mut app = self::app(true);
        assert_eq!(app.screen, Screen::Playing);
        assert!(app.handle_action(Action::Quit).is_break());
    }

    #[test]
    fn test_pause_blocks_moves_and_gravity() {
        let mut app = app(true);
        let anchor = app.session.piece().anchor();
        assert!(app.handle_action(Action::Pause).is_continue());
        assert!(app.paused);
        assert!(!app.gravity_active());
        assert!(app.handle_action(Action::MoveLeft).is_continue());
        assert!(app.handle_action(Action::SoftDrop).is_continue());
        assert_eq!(app.session.piece().anchor(), anchor);
        assert!(app.handle_action(Action::Pause).is_continue());
        assert!(app.gravity_active());
        assert!(app.handle_action(Action::MoveLeft).is_continue());
        assert_eq!(app.session.piece().anchor(), (anchor.0 - 1, anchor.1));
    }

    #[test]
    fn test_restart_keeps_width() {
        let mut app = app(true);
        assert!(app.handle_action(Action::HardDrop).is_continue());
        assert!(app.handle_action(Action::SoftDrop).is_continue());
        assert_eq!(app.session.pieces_locked(), 1);
        assert!(app.handle_action(Action::Restart).is_continue());
        assert_eq!(app.session.pieces_locked(), 0);
        assert_eq!(app.session.grid().width(), 10);
        assert_eq!(app.screen, Screen::Playing);
    }

    #[test]
    fn test_deadline_waits_for_gravity_only_while_playing() {
        let mut app = app(true);
        app.next_frame = app.last_gravity + Duration::from_secs(5);
        assert_eq!(app.next_deadline(), app.last_gravity + app.config.gravity);
        app.paused = true;
        assert_eq!(app.next_deadline(), app.next_frame);
    }
}
