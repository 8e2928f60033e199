//! The attempt-time grid: one [Cell] per occupied position, each knowing
//! which words place a letter there and at which letter index.

use std::collections::HashMap;
use std::fmt::{Debug, Display};

use log::{debug, trace};

use crate::Direction::{self, Across, Down};
use crate::access::CellAccess;
use crate::{Pos, Word};

/// Index of a cell in the grid's arena. Stable for the life of the grid.
pub type CellCode = usize;

/// Pixel size of a cell. Cells are separated by a 1 px line, and the grid
/// has a 1 px border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
  pub cell_width: u32,
  pub cell_height: u32,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      cell_width: 31,
      cell_height: 31,
    }
  }
}

impl Metrics {
  pub fn x(&self, column: usize) -> u32 {
    offset(self.cell_width, column)
  }

  pub fn y(&self, row: usize) -> u32 {
    offset(self.cell_height, row)
  }

  /// Pixel size of a `rows` × `columns` grid, as (width, height).
  pub fn size(&self, rows: usize, columns: usize) -> (u32, u32) {
    (self.x(columns), self.y(rows))
  }
}

/// Pixel offset of the `index`th cell along an axis, past one line per cell.
fn offset(size: u32, index: usize) -> u32 {
  let index = u32::try_from(index).unwrap_or(u32::MAX);
  size
    .saturating_add(1)
    .saturating_mul(index)
    .saturating_add(1)
}

/// One word placing a letter in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
  pub word: u32,
  pub letter_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
  pub row: usize,
  pub column: usize,
  pub x: u32,
  pub y: u32,
  members: Vec<Membership>,
  letter: Option<char>,
  label: Option<String>,
}

impl Cell {
  /// Words placing a letter here, in the order they were added.
  pub fn members(&self) -> &[Membership] {
    &self.members
  }

  pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
    self.members.iter().map(|m| m.word)
  }

  pub fn letter_index(&self, word: u32) -> Option<usize> {
    self
      .members
      .iter()
      .find(|m| m.word == word)
      .map(|m| m.letter_index)
  }

  pub fn letter(&self) -> Option<char> {
    self.letter
  }

  /// The number badge, e.g. `"3"`, or `"3, 4"` if two words start here.
  pub fn label(&self) -> Option<&str> {
    self.label.as_deref()
  }

  pub fn pos(&self) -> Pos {
    (self.row, self.column)
  }
}

/// A direction the focus can move across the grid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  Up,
  Down,
  Left,
  Right,
}

#[derive(Clone)]
pub struct Grid {
  rows: usize,
  columns: usize,
  metrics: Metrics,
  cells: Vec<Cell>,
  by_pos: HashMap<Pos, CellCode>,
  by_point: HashMap<(u32, u32), CellCode>,
  by_letter: HashMap<(u32, usize), CellCode>,
  directions: HashMap<u32, Direction>,
}

impl Grid {
  /// Builds the grid from numbered words. Each letter of each word gets a
  /// cell; a cell reached by a second word gains a second membership.
  pub fn build(words: &[Word], rows: usize, columns: usize, metrics: Metrics) -> Self {
    let mut grid = Self {
      rows,
      columns,
      metrics,
      cells: Vec::new(),
      by_pos: HashMap::new(),
      by_point: HashMap::new(),
      by_letter: HashMap::new(),
      directions: HashMap::new(),
    };

    for word in words {
      grid.directions.insert(word.number, word.direction);
      for letter_index in 0..word.letter_count() {
        let pos = word.cell(letter_index);
        let code = match grid.cell_at(pos) {
          Some(code) => code,
          None => grid.push_cell(pos),
        };
        grid.cells[code].members.push(Membership {
          word: word.number,
          letter_index,
        });
        grid.by_letter.insert((word.number, letter_index), code);
      }
    }

    for word in words {
      let Some(code) = grid.cell_for(word.number, 0) else {
        continue;
      };
      let number = word.number.to_string();
      let label = &mut grid.cells[code].label;
      *label = Some(match label.take() {
        Some(existing) => format!("{existing}, {number}"),
        None => number,
      });
    }

    debug!(
      target: "crossword.grid",
      "built {} cells for {} words",
      grid.cells.len(),
      words.len()
    );
    grid
  }

  fn push_cell(&mut self, (row, column): Pos) -> CellCode {
    let code = self.cells.len();
    let (x, y) = (self.metrics.x(column), self.metrics.y(row));
    self.cells.push(Cell {
      row,
      column,
      x,
      y,
      members: Vec::new(),
      letter: None,
      label: None,
    });
    self.by_pos.insert((row, column), code);
    self.by_point.insert((x, y), code);
    code
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn columns(&self) -> usize {
    self.columns
  }

  pub fn metrics(&self) -> Metrics {
    self.metrics
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  pub fn cell(&self, code: CellCode) -> Option<&Cell> {
    self.cells.get(code)
  }

  pub fn cell_at(&self, pos: Pos) -> Option<CellCode> {
    self.by_pos.get(&pos).copied()
  }

  /// The cell whose top-left pixel corner is exactly `(x, y)`.
  pub fn cell_at_point(&self, x: i64, y: i64) -> Option<CellCode> {
    let x = u32::try_from(x).ok()?;
    let y = u32::try_from(y).ok()?;
    self.by_point.get(&(x, y)).copied()
  }

  /// The cell holding letter `letter_index` of `word`.
  pub fn cell_for(&self, word: u32, letter_index: usize) -> Option<CellCode> {
    self.by_letter.get(&(word, letter_index)).copied()
  }

  /// Word numbers owning the cell, in membership order.
  pub fn words_at(&self, code: CellCode) -> Vec<u32> {
    self
      .cells
      .get(code)
      .map(|cell| cell.words().collect())
      .unwrap_or_default()
  }

  pub fn direction_of(&self, word: u32) -> Option<Direction> {
    self.directions.get(&word).copied()
  }

  /// The cells of `word` in letter order.
  pub fn cells_of(&self, word: u32) -> Vec<CellCode> {
    (0..)
      .map_while(|letter_index| self.cell_for(word, letter_index))
      .collect()
  }

  /// The cell one step away by pixel offset, if there is one.
  pub fn neighbor(&self, code: CellCode, step: Step) -> Option<CellCode> {
    let cell = self.cells.get(code)?;
    let (dx, dy) = (
      i64::from(self.metrics.cell_width) + 1,
      i64::from(self.metrics.cell_height) + 1,
    );
    let (x, y) = (i64::from(cell.x), i64::from(cell.y));
    match step {
      Step::Up => self.cell_at_point(x, y - dy),
      Step::Down => self.cell_at_point(x, y + dy),
      Step::Left => self.cell_at_point(x - dx, y),
      Step::Right => self.cell_at_point(x + dx, y),
    }
  }

  /// Re-derives the letter indexes of `word` from the pixel order of its
  /// cells: by `x` for across words, by `y` for down words.
  pub fn update_letter_index_for_cells(&mut self, word: u32) {
    let Some(direction) = self.direction_of(word) else {
      return;
    };
    let mut codes: Vec<CellCode> = self
      .cells
      .iter()
      .enumerate()
      .filter(|(_, cell)| cell.letter_index(word).is_some())
      .map(|(code, _)| code)
      .collect();
    codes.sort_by_key(|&code| match direction {
      Across => self.cells[code].x,
      Down => self.cells[code].y,
    });

    self.by_letter.retain(|&(w, _), _| w != word);
    for (letter_index, code) in codes.into_iter().enumerate() {
      for member in &mut self.cells[code].members {
        if member.word == word {
          member.letter_index = letter_index;
        }
      }
      self.by_letter.insert((word, letter_index), code);
    }
    trace!(target: "crossword.grid", "re-indexed cells of word {word}");
  }

  pub fn letter(&self, code: CellCode) -> Option<char> {
    self.cells.get(code).and_then(|cell| cell.letter)
  }

  pub fn set_letter(&mut self, code: CellCode, letter: Option<char>) {
    if let Some(cell) = self.cells.get_mut(code) {
      cell.letter = letter;
    }
  }
}

impl CellAccess for Grid {
  fn cell_letter(&self, pos: Pos) -> Option<char> {
    self.letter(self.cell_at(pos)?)
  }

  fn set_cell_letter(&mut self, pos: Pos, letter: Option<char>) {
    if let Some(code) = self.cell_at(pos) {
      self.set_letter(code, letter);
    }
  }
}

/// Draws the grid one row per line: `■` where there is no cell, a space for
/// an empty cell, otherwise the letter.
impl Debug for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in 0..self.rows {
      for column in 0..self.columns {
        let square = match self.cell_at((row, column)) {
          None => '■',
          Some(code) => self.letter(code).unwrap_or(' '),
        };
        write!(f, "{square}")?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\n{:?}", self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::number_words;

  fn europe() -> Grid {
    let words = number_words(vec![
      Word::new("brazil", "Country", Across, 1, 0),
      Word::new("paris", "Capital", Down, 0, 2),
      Word::new("italy", "Country", Across, 3, 2),
    ]);
    Grid::build(&words, 5, 7, Metrics::default())
  }

  #[test]
  fn pixels() {
    let metrics = Metrics::default();
    assert_eq!(metrics.x(0), 1);
    assert_eq!(metrics.x(2), 65);
    assert_eq!(metrics.size(5, 7), (225, 161));
    assert_eq!(metrics.x(usize::MAX), u32::MAX);
  }

  #[test]
  fn memberships() {
    let grid = europe();
    // paris = 1, brazil = 2, italy = 3
    let shared = grid.cell_at((1, 2)).unwrap();
    assert_eq!(grid.words_at(shared), vec![1, 2]);
    assert_eq!(grid.cell(shared).unwrap().letter_index(1), Some(1));
    assert_eq!(grid.cell(shared).unwrap().letter_index(2), Some(2));
    assert_eq!(grid.cell_for(2, 2), Some(shared));
    assert_eq!(grid.cell_for(1, 1), Some(shared));
    assert_eq!(grid.cells_of(3).len(), 5);
    assert_eq!(grid.cell_at((0, 0)), None);
    assert!(grid.words_at(999).is_empty());
  }

  #[test]
  fn labels() {
    let grid = europe();
    let label = |pos| grid.cell(grid.cell_at(pos).unwrap()).unwrap().label();
    assert_eq!(label((0, 2)), Some("1"));
    assert_eq!(label((1, 0)), Some("2"));
    assert_eq!(label((3, 2)), Some("3"));
    assert_eq!(label((1, 1)), None);
  }

  #[test]
  fn shared_start_labels_are_joined() {
    let words = number_words(vec![
      Word::new("cat", "", Across, 0, 0),
      Word::new("cup", "", Down, 0, 0),
    ]);
    let grid = Grid::build(&words, 3, 3, Metrics::default());
    let start = grid.cell_at((0, 0)).unwrap();
    assert_eq!(grid.cell(start).unwrap().label(), Some("1, 2"));
  }

  #[test]
  fn pixel_lookup_and_neighbors() {
    let grid = europe();
    let start = grid.cell_at((1, 0)).unwrap();
    assert_eq!(grid.cell_at_point(1, 33), Some(start));
    assert_eq!(grid.cell_at_point(2, 33), None);
    assert_eq!(grid.cell_at_point(-5, 0), None);

    assert_eq!(grid.neighbor(start, Step::Right), grid.cell_at((1, 1)));
    assert_eq!(grid.neighbor(start, Step::Up), None);
    assert_eq!(grid.neighbor(start, Step::Left), None);
    let shared = grid.cell_at((1, 2)).unwrap();
    assert_eq!(grid.neighbor(shared, Step::Up), grid.cell_at((0, 2)));
  }

  #[test]
  fn reindexing_is_idempotent() {
    let mut grid = europe();
    let before: Vec<_> = grid.cells().to_vec();
    grid.update_letter_index_for_cells(1);
    let once: Vec<_> = grid.cells().to_vec();
    grid.update_letter_index_for_cells(1);
    assert_eq!(grid.cells(), once.as_slice());
    assert_eq!(once, before);
    assert_eq!(grid.cells_of(1).len(), 5);
  }

  #[test]
  fn letters() {
    let mut grid = europe();
    grid.set_cell_letter((1, 2), Some('A'));
    grid.set_cell_letter((4, 4), Some('Z'));
    assert_eq!(grid.cell_letter((1, 2)), Some('A'));
    assert_eq!(grid.cell_letter((4, 4)), None);

    #[rustfmt::skip]
    assert_eq!(
      grid.to_string(),
      concat!(
        "\n",
        "■■ ■■■■\n",
        "  A   ■\n",
        "■■ ■■■■\n",
        "■■     \n",
        "■■ ■■■■\n",
      )
    );
  }
}
