//! Layout and drawing: menu, board, sidebar, pause and game-over overlays, line-clear flash.

use crate::app::Screen;
use crate::game::{GameSession, Status};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

pub const SIDEBAR_WIDTH: u16 = 22;

/// Duration of the line-clear flash (TachyonFX fade from white back to the board).
const LINE_CLEAR_FADE_MS: u32 = 300;

/// Terminal cells (cols, rows) taken by the bordered board of a given grid width.
/// Each terminal row shows two grid rows through a half block.
pub fn board_outer_size(width: u16) -> (u16, u16) {
    (width + 2, crate::height_for(width).div_ceil(2) + 2)
}

/// True when the board plus sidebar fit in a terminal of the given size.
pub fn board_fits(width: u16, term_cols: u16, term_rows: u16) -> bool {
    let (w, h) = board_outer_size(width);
    w + SIDEBAR_WIDTH <= term_cols && h <= term_rows
}

/// Short fade over the board after rows are cleared.
pub struct Flash {
    effect: Effect,
    last_frame: Option<Instant>,
}

impl Flash {
    pub fn start() -> Self {
        let effect = fx::fade_from(
            Color::White,
            Color::White,
            (LINE_CLEAR_FADE_MS, Interpolation::QuadOut),
        );
        Self {
            effect,
            last_frame: None,
        }
    }

    pub fn done(&self) -> bool {
        self.effect.done()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, now: Instant) {
        let delta = self
            .last_frame
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.last_frame = Some(now);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        frame.render_effect(&mut self.effect, area, TfxDuration::from_millis(delta_ms));
    }
}

/// Everything the renderer reads for one frame.
pub struct View<'a> {
    pub screen: Screen,
    pub session: &'a GameSession,
    pub theme: &'a Theme,
    pub paused: bool,
    pub show_ghost: bool,
    /// Stored best for the width on screen (menu: the selected width).
    pub best: u32,
    pub new_record: bool,
    /// Menu: widths that fit the terminal and the one selected.
    pub widths: &'a [u16],
    pub selected_width: u16,
}

pub fn draw(frame: &mut Frame, view: &View, flash: Option<&mut Flash>, now: Instant) {
    let area = frame.area();
    match view.screen {
        Screen::Menu => draw_menu(frame, view, area),
        Screen::Playing | Screen::GameOver => {
            let board = draw_game(frame, view, area);
            if let Some(flash) = flash {
                flash.render(frame, board, now);
            }
            if view.screen == Screen::GameOver {
                draw_game_over(frame, view, area);
            } else if view.paused {
                draw_pause_overlay(frame, view.theme, area);
            }
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn popup_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
}

fn draw_menu(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 40, 15);
    let key_style = Style::default().fg(theme.block_color(0));
    let fg = Style::default().fg(theme.main_fg);
    let dim = Style::default().fg(theme.inactive_fg);

    let title = Line::from(
        "Blockfall"
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let color = theme.block_color(i as u8);
                Span::styled(c.to_string(), Style::default().fg(color).bold())
            })
            .collect::<Vec<_>>(),
    );

    let size_line = if view.widths.is_empty() {
        Line::from(Span::styled(
            " Terminal too small ",
            Style::default().fg(Color::White).bg(Color::Red),
        ))
    } else {
        let at_min = view.widths.first() == Some(&view.selected_width);
        let at_max = view.widths.last() == Some(&view.selected_width);
        Line::from(vec![
            Span::styled(" - ", if at_min { dim } else { key_style }),
            Span::styled(
                format!(
                    " {} x {} ",
                    view.selected_width,
                    crate::height_for(view.selected_width)
                ),
                Style::default().fg(theme.bg).bg(theme.title).bold(),
            ),
            Span::styled(" + ", if at_max { dim } else { key_style }),
        ])
    };

    let ghost = if view.show_ghost { "on" } else { "off" };
    let lines = vec![
        Line::from(""),
        title,
        Line::from(""),
        Line::from(Span::styled("─ BOARD ─", Style::default().fg(theme.div_line))),
        size_line,
        Line::from(""),
        Line::from(vec![
            Span::styled("Best: ", Style::default().fg(theme.title)),
            Span::styled(view.best.to_string(), fg),
        ]),
        Line::from(vec![
            Span::styled("Ghost: ", Style::default().fg(theme.title)),
            Span::styled(ghost, fg),
            Span::styled("  (G)", dim),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" +/- ", key_style),
            Span::styled("SIZE   ", fg),
            Span::styled(" ENTER ", key_style),
            Span::styled("START", fg),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(" Q ", key_style), Span::styled("QUIT", fg)]),
    ];

    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

/// Board plus sidebar, centred. Returns the inner board rect (for the flash).
fn draw_game(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let width = view.session.grid().width() as u16;
    let (pw, ph) = board_outer_size(width);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board = draw_board(frame, view, inner[0]);
    draw_sidebar(frame, view, inner[1]);
    board
}

/// Colour of grid cell (x, y): live piece, then stack, then ghost, then background.
fn cell_color(view: &View, x: i32, y: i32) -> Color {
    let piece = view.session.piece();
    let theme = view.theme;
    let live = view.session.status() == Status::Running;
    if live && piece.contains(x, y) {
        return theme.block_color(piece.kind().color_tag());
    }
    match view.session.grid().get(x, y) {
        Some(crate::grid::Cell::Filled(tag)) => theme.block_color(tag),
        _ if live && view.show_ghost && piece.ghost().contains(&(x, y)) => theme.ghost,
        _ => theme.bg,
    }
}

fn draw_board(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let theme = view.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blockfall ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let grid = view.session.grid();
    let (gw, gh) = (grid.width() as i32, grid.height() as i32);
    let buf = frame.buffer_mut();
    // Terminal row r shows grid rows top = gh-1-2r and bottom = gh-2-2r (y grows upward).
    for r in 0..(gh + 1) / 2 {
        let top = gh - 1 - 2 * r;
        let bottom = top - 1;
        let ry = inner.y + r as u16;
        if ry >= inner.y + inner.height {
            break;
        }
        for x in 0..gw {
            let rx = inner.x + x as u16;
            if rx >= inner.x + inner.width {
                break;
            }
            let top_color = cell_color(view, x, top);
            let bottom_color = if bottom >= 0 {
                cell_color(view, x, bottom)
            } else {
                theme.bg
            };
            buf[(rx, ry)]
                .set_symbol("▀")
                .set_style(Style::default().fg(top_color).bg(bottom_color));
        }
    }
    inner
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let label = Style::default().fg(theme.title);
    let value = Style::default().fg(theme.main_fg);
    let border = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // stats
            Constraint::Length(1),
            Constraint::Length(4), // board
            Constraint::Length(1),
            Constraint::Length(5), // keys
        ])
        .split(area);

    let stat = |name: &'static str, n: u32| {
        Line::from(vec![
            Span::styled(name, label),
            Span::styled(n.to_string(), value),
        ])
    };
    let stats = Block::default().borders(Borders::ALL).border_style(border);
    Paragraph::new(Text::from(vec![
        stat("Score:  ", session.score()),
        stat("Best:   ", view.best.max(session.score())),
        stat("Lines:  ", session.lines_cleared()),
        stat("Pieces: ", session.pieces_locked()),
    ]))
    .block(stats.padding(Padding::horizontal(1)))
    .render(chunks[0], frame.buffer_mut());

    let grid = session.grid();
    let ghost = if view.show_ghost { "on" } else { "off" };
    Paragraph::new(Text::from(vec![
        Line::from(vec![
            Span::styled("Board: ", label),
            Span::styled(format!("{}x{}", grid.width(), grid.height()), value),
        ]),
        Line::from(vec![
            Span::styled("Ghost: ", label),
            Span::styled(ghost, value),
        ]),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .padding(Padding::horizontal(1)),
    )
    .render(chunks[2], frame.buffer_mut());

    let dim = Style::default().fg(theme.inactive_fg);
    Paragraph::new(Text::from(vec![
        Line::from(Span::styled("G ghost  P pause", dim)),
        Line::from(Span::styled("N new    Q quit", dim)),
        Line::from(Span::styled("SPACE drop", dim)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .padding(Padding::horizontal(1)),
    )
    .render(chunks[4], frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(Span::styled(
            " P Resume    Q Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let session = view.session;
    let fg = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", session.score()), fg)),
        Line::from(Span::styled(format!(" Best: {} ", view.best), fg)),
        Line::from(Span::styled(
            format!(" Lines: {}  Pieces: {} ", session.lines_cleared(), session.pieces_locked()),
            fg,
        )),
    ];
    if view.new_record {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).bold(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" N Restart    M Menu    Q Quit ", fg)));

    let popup = centered(area, 36, lines.len() as u16 + 2);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme).title(Span::styled(" Blockfall ", theme.title)))
        .render(popup, frame.buffer_mut());
}
