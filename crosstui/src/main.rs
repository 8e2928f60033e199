use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossterm::event::{
  self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
  Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossword::file::PuzzleFile;
use crossword::render::{self, CellView, Highlight, Renderer, StickyClue};
use crossword::{ClueAccess, ClueKey, Engine, Focus, Selection, Step};
use log::{LevelFilter, debug, info};
use ratatui::{
  DefaultTerminal, Frame,
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Padding, Paragraph, Widget},
};
use ratatui_macros::{line, span};
use simplelog::{Config, WriteLogger};

const SQUARE_WIDTH: u16 = 5;
const SQUARE_HEIGHT: u16 = 3;
const X_STEP: u16 = SQUARE_WIDTH + 2;
const Y_STEP: u16 = SQUARE_HEIGHT + 1;
const PANEL_WIDTH: u16 = 45;
/// Rows taken by each word in the clue list: clue, input, blank line.
const CLUE_ROWS: u16 = 3;

/// Solve a crossword puzzle in the terminal
#[derive(Parser)]
#[command(name = "crosstui", version)]
struct Cli {
  /// The puzzle file to play.
  path: PathBuf,
  /// Where to write the log. The terminal itself is taken by the game.
  #[arg(long, default_value = "crosstui.log")]
  log_file: PathBuf,
  #[arg(long, default_value = "info")]
  log_level: LevelFilter,
}

fn main() -> io::Result<()> {
  let cli = Cli::parse();
  WriteLogger::init(cli.log_level, Config::default(), File::create(&cli.log_file)?)
    .map_err(io::Error::other)?;

  let engine = load_puzzle(&cli.path);
  let app = App::new(engine);

  let mut terminal = ratatui::init();
  execute!(io::stdout(), EnableMouseCapture, EnableBracketedPaste)?;
  let result = app.run(&mut terminal);
  execute!(io::stdout(), DisableBracketedPaste, DisableMouseCapture)?;
  ratatui::restore();
  result
}

pub fn load_puzzle(path: &Path) -> Engine {
  let file = PuzzleFile::read(path).unwrap_or_else(|e| {
    println!("Failed to read puzzle file: {}", e);
    std::process::exit(1);
  });
  file.into_engine().unwrap_or_else(|e| {
    println!("{}", e);
    if let crossword::Error::InvalidPuzzle(report) = e {
      for (index, error) in report.errors {
        println!("  word {}: {}", index + 1, error);
      }
    }
    std::process::exit(2);
  })
}

/// Where the keyboard goes: the grid, or the clue input of the active word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
  Grid,
  Clue,
}

#[derive(Debug)]
pub struct App {
  engine: Engine,
  mode: Mode,
  /// Text cut with Ctrl-X, pasted back with Ctrl-V.
  clipboard: String,
  /// The area of the last frame, for mapping mouse clicks.
  area: Rect,
  running: bool,
}

/// Where each part of the screen goes.
struct Areas {
  title: Rect,
  grid: Rect,
  sticky: Rect,
  clues: Rect,
  status: Rect,
}

impl App {
  fn new(engine: Engine) -> Self {
    let mut app = Self {
      engine,
      mode: Mode::Grid,
      clipboard: String::new(),
      area: Rect::default(),
      running: true,
    };
    if let Some(code) = app.engine.grid().cell_for(1, 0) {
      app.engine.select_cell(code);
    }
    app
  }

  pub fn run(mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
    self.running = true;
    while self.running {
      // Carets deferred by the last event land before the next paint.
      self.engine.on_frame();
      terminal.draw(|frame| self.draw(frame))?;
      self.handle_crossterm_events()?;
    }
    info!(target: "crosstui", "responses: {}", self.engine.summarise());
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    self.area = frame.area();
    frame.render_widget(&*self, frame.area());
    if let Some((x, y)) = self.cursor_position() {
      frame.set_cursor_position((x, y));
    }
  }

  fn areas(&self, area: Rect) -> Areas {
    let [title, main, status] = Layout::vertical([
      Constraint::Length(2),
      Constraint::Percentage(100),
      Constraint::Length(1),
    ])
    .areas(area);
    let [puzzle, panel] =
      Layout::horizontal([Constraint::Percentage(100), Constraint::Length(PANEL_WIDTH)])
        .areas(main);
    let [sticky, clues] =
      Layout::vertical([Constraint::Length(6), Constraint::Percentage(100)]).areas(panel);

    let grid = self.engine.grid();
    let grid = center(
      puzzle,
      Constraint::Length(span_of(grid.columns(), X_STEP)),
      Constraint::Length(span_of(grid.rows(), Y_STEP)),
    );
    Areas {
      title,
      grid,
      sticky,
      clues,
      status,
    }
  }

  /// Where the terminal cursor goes: on the focused cell in grid mode, on
  /// the caret of the clue input in clue mode.
  fn cursor_position(&self) -> Option<(u16, u16)> {
    let areas = self.areas(self.area);
    match self.engine.state().focus {
      Focus::Clue(number) => {
        let input = self.clue_input_area(areas.clues, number)?;
        let caret = self.engine.clues().selection(number).start as u16;
        Some((input.x + caret, input.y))
      }
      _ => {
        let metrics = self.engine.grid().metrics();
        let overlay = self.engine.overlay()?;
        let column = (overlay.x.saturating_sub(1) / (metrics.cell_width + 1)) as usize;
        let row = (overlay.y.saturating_sub(1) / (metrics.cell_height + 1)) as usize;
        let square = square_area(areas.grid, row, column)?;
        Some((square.x + SQUARE_WIDTH / 2, square.y + 1))
      }
    }
  }

  /// The line showing the clue input of word `number`.
  fn clue_input_area(&self, clues: Rect, number: u32) -> Option<Rect> {
    let index = self
      .engine
      .words()
      .iter()
      .position(|w| w.number == number)? as u16;
    let y = clues.y + 1 + index * CLUE_ROWS + 1;
    (y < clues.bottom().saturating_sub(1)).then_some(Rect {
      x: clues.x + 2,
      y,
      width: clues.width.saturating_sub(4),
      height: 1,
    })
  }

  /// Reads the crossterm events and updates the state of [`App`].
  fn handle_crossterm_events(&mut self) -> io::Result<()> {
    match event::read()? {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      Event::Mouse(mouse) => self.on_mouse_event(mouse),
      Event::Paste(text) => self.engine.paste(&text),
      Event::Resize(_, _) => self.engine.resize(),
      _ => {}
    }
    Ok(())
  }

  /// Handles the key events and updates the state of [`App`].
  fn on_key_event(&mut self, key: KeyEvent) {
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match (key.modifiers, key.code) {
      (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => {
        self.quit()
      }
      (_, KeyCode::Tab) => self.toggle_mode(),
      (KeyModifiers::CONTROL, KeyCode::Char('x') | KeyCode::Char('X')) => {
        if let Some(text) = self.engine.cut() {
          debug!(target: "crosstui", "cut {text:?}");
          self.clipboard = text;
        }
      }
      (KeyModifiers::CONTROL, KeyCode::Char('v') | KeyCode::Char('V')) => {
        let text = self.clipboard.clone();
        self.engine.paste(&text);
      }
      (KeyModifiers::CONTROL, _) => {}
      _ => match self.mode {
        Mode::Grid => self.on_grid_key(key.code),
        Mode::Clue => self.on_clue_key(key.code, shift),
      },
    }
  }

  fn on_grid_key(&mut self, code: KeyCode) {
    match code {
      KeyCode::Char(c) => self.engine.type_in_cell(&c.to_string()),
      KeyCode::Backspace => self.engine.cell_backspace(),
      KeyCode::Delete => self.engine.cell_delete(),
      KeyCode::Up => self.engine.cell_arrow(Step::Up),
      KeyCode::Down => self.engine.cell_arrow(Step::Down),
      KeyCode::Left => self.engine.cell_arrow(Step::Left),
      KeyCode::Right => self.engine.cell_arrow(Step::Right),
      KeyCode::Enter => {
        // Enter on the focused cell selects it again, switching direction
        // where two words cross.
        if let Some(code) = self.engine.state().focused_cell {
          self.engine.select_cell(code);
        }
      }
      _ => {}
    }
  }

  fn on_clue_key(&mut self, code: KeyCode, shift: bool) {
    match code {
      KeyCode::Char(c) => self.engine.clue_insert(&c.to_string()),
      KeyCode::Backspace => self.engine.clue_backspace(),
      KeyCode::Delete => self.engine.clue_delete(),
      KeyCode::Left => self.engine.clue_key(ClueKey::Left, shift),
      KeyCode::Right => self.engine.clue_key(ClueKey::Right, shift),
      KeyCode::Home => self.engine.clue_key(ClueKey::Home, false),
      KeyCode::End => self.engine.clue_key(ClueKey::End, false),
      KeyCode::Up => self.engine.clue_key(ClueKey::Up, false),
      KeyCode::Down => self.engine.clue_key(ClueKey::Down, false),
      _ => {}
    }
  }

  /// Moves the keyboard between the grid and the clue input of the active
  /// word, keeping the same letter focused.
  fn toggle_mode(&mut self) {
    let state = self.engine.state().clone();
    match self.mode {
      Mode::Grid => {
        let Some(number) = state.active_word else {
          return;
        };
        let slot = state
          .focused_cell
          .and_then(|code| self.engine.grid().cell(code))
          .and_then(|cell| cell.letter_index(number))
          .and_then(|i| self.engine.word(number)?.slot_of_letter(i))
          .unwrap_or(0);
        // A click lands after the clicked character.
        self.engine.focus_clue(number, Selection::caret(slot + 1));
        self.mode = Mode::Clue;
      }
      Mode::Clue => {
        self.engine.focus_grid();
        self.mode = Mode::Grid;
      }
    }
    debug!(target: "crosstui", "mode {:?}", self.mode);
  }

  fn on_mouse_event(&mut self, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
      return;
    }
    let areas = self.areas(self.area);
    let (x, y) = (mouse.column, mouse.row);

    if let Some((row, column)) = square_at(areas.grid, x, y) {
      if let Some(code) = self.engine.grid().cell_at((row, column)) {
        self.engine.select_cell(code);
        self.mode = Mode::Grid;
      }
      return;
    }

    let numbers: Vec<u32> = self.engine.words().iter().map(|w| w.number).collect();
    for number in numbers {
      let Some(input) = self.clue_input_area(areas.clues, number) else {
        continue;
      };
      if y == input.y && (input.x..input.right()).contains(&x) {
        let offset = (x - input.x) as usize;
        self.engine.focus_clue(number, Selection::caret(offset + 1));
        self.mode = Mode::Clue;
        return;
      }
    }
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }

  fn render_clues(&self, area: Rect, buf: &mut Buffer) {
    let state = self.engine.state();
    let mut lines = Vec::new();
    for word in self.engine.words() {
      let active = state.active_word == Some(word.number);
      let heading = span!(
        Modifier::BOLD;
        "{} {}. ",
        word.number,
        self.engine.labels().orientation(word.direction)
      );
      let clue = Span::raw(word.clue.clone());
      lines.push(if active {
        line![heading, clue].on_light_yellow()
      } else {
        line![heading, clue]
      });

      let text = self.engine.clues().clue_text(word.number).unwrap_or_default();
      let selection = match state.focus {
        Focus::Clue(n) if n == word.number => self.engine.clues().selection(n),
        _ => Selection::default(),
      };
      let input: Vec<Span> = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
          let span = Span::raw(c.to_string());
          if (selection.start..selection.end).contains(&i) {
            span.reversed()
          } else {
            span
          }
        })
        .collect();
      lines.push(Line::from(input));
      lines.push(Line::default());
    }

    Paragraph::new(lines)
      .block(
        Block::bordered()
          .title(Line::from("Clues").centered())
          .padding(Padding::horizontal(1)),
      )
      .render(area, buf);
  }
}

fn square_style(highlight: Highlight) -> Style {
  let base_style = match highlight {
    Highlight::Plain => Style::new().bg(Color::White),
    Highlight::Focused => Style::new().bg(Color::LightRed),
    Highlight::Highlighted => Style::new().bg(Color::LightYellow),
  };
  base_style.fg(Color::Black).add_modifier(Modifier::BOLD)
}

/// Draws the engine's frame into a ratatui buffer.
struct TermGrid<'a> {
  grid: Rect,
  sticky: Rect,
  buf: &'a mut Buffer,
}

impl Renderer for TermGrid<'_> {
  fn cell(&mut self, cell: &CellView) {
    let Some(area) = square_area(self.grid, cell.row, cell.column) else {
      return;
    };
    let style = square_style(cell.highlight);
    Block::new().style(style).render(area, self.buf);
    if let Some(number) = &cell.number {
      Line::from(number.as_str())
        .style(style.remove_modifier(Modifier::BOLD))
        .render(Rect { height: 1, ..area }, self.buf);
    }
    if let Some(letter) = cell.letter {
      Paragraph::new(letter.to_string())
        .style(style)
        .centered()
        .render(
          Rect {
            y: area.y + 1,
            height: 1,
            ..area
          },
          self.buf,
        );
    }
  }

  fn sticky_clue(&mut self, sticky: Option<&StickyClue>) {
    let lines = match sticky {
      Some(sticky) => vec![line![sticky.heading().bold()], Line::from(sticky.body())],
      None => vec![],
    };
    Paragraph::new(lines)
      .block(
        Block::bordered()
          .title(Line::from("Current clue").centered())
          .padding(Padding::horizontal(1)),
      )
      .render(self.sticky, self.buf);
  }
}

impl Widget for &App {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let areas = self.areas(area);

    let title = line![
      "Ratatui Crossword".bold().blue(),
      ": ".bold(),
      format!("{} words", self.engine.words().len()).bold(),
    ]
    .centered();
    title.render(areas.title, buf);

    Block::new()
      .style(Style::new().bg(Color::Black))
      .render(areas.grid, buf);
    let frame = self.engine.frame();
    render::draw(
      &frame,
      &mut TermGrid {
        grid: areas.grid,
        sticky: areas.sticky,
        buf: &mut *buf,
      },
    );

    self.render_clues(areas.clues, buf);

    let mode = match self.mode {
      Mode::Grid => "grid",
      Mode::Clue => "clue",
    };
    line![
      span!(Modifier::DIM; "[{}] Tab switches, Esc quits. ", mode),
      Span::raw(self.engine.title()),
    ]
    .render(areas.status, buf);
  }
}

/// Terminal cells taken by `count` squares of `step` each.
fn span_of(count: usize, step: u16) -> u16 {
  u16::try_from(count).unwrap_or(u16::MAX).saturating_mul(step)
}

/// The screen area of the square at `row`, `column`, if it fits.
fn square_area(grid: Rect, row: usize, column: usize) -> Option<Rect> {
  let x = grid.x.checked_add(u16::try_from(column).ok()?.checked_mul(X_STEP)?)?;
  let y = grid.y.checked_add(u16::try_from(row).ok()?.checked_mul(Y_STEP)?)?;
  let area = Rect {
    x,
    y,
    width: SQUARE_WIDTH,
    height: SQUARE_HEIGHT,
  };
  (area.right() <= grid.right() && area.bottom() <= grid.bottom()).then_some(area)
}

/// The square under the screen position `(x, y)`. Gaps between squares
/// belong to none.
fn square_at(grid: Rect, x: u16, y: u16) -> Option<(usize, usize)> {
  let dx = x.checked_sub(grid.x)?;
  let dy = y.checked_sub(grid.y)?;
  if x >= grid.right() || y >= grid.bottom() {
    return None;
  }
  if dx % X_STEP >= SQUARE_WIDTH || dy % Y_STEP >= SQUARE_HEIGHT {
    return None;
  }
  Some(((dy / Y_STEP) as usize, (dx / X_STEP) as usize))
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}
