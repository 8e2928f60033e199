//! The two surfaces the interaction engine writes through.
//!
//! The engine never touches a UI directly. Letters shown in grid cells go
//! through [CellAccess] and the per-word linear inputs go through
//! [ClueAccess], so either side can be an in-memory model (as in this crate)
//! or a binding to real widgets.

use crate::Pos;
use crate::clue::Selection;

/// Reads and writes the letter displayed in a grid cell.
pub trait CellAccess {
  /// The letter in the cell at `pos`, or `None` if it is empty or there is
  /// no cell there.
  fn cell_letter(&self, pos: Pos) -> Option<char>;

  /// Writes (or clears, with `None`) the letter at `pos`. Writing to a
  /// position without a cell does nothing.
  fn set_cell_letter(&mut self, pos: Pos, letter: Option<char>);
}

/// A cell display that is not there. The engine's own [Grid](crate::Grid)
/// is then the only place letters are shown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Unbound;

impl CellAccess for Unbound {
  fn cell_letter(&self, _pos: Pos) -> Option<char> {
    None
  }

  fn set_cell_letter(&mut self, _pos: Pos, _letter: Option<char>) {}
}

/// Reads and writes the clue input of each word, keyed by word number.
///
/// Text always holds exactly one character per slot of the word, with
/// [PLACEHOLDER](crate::charset::PLACEHOLDER) for unset slots.
pub trait ClueAccess {
  fn clue_text(&self, word: u32) -> Option<String>;

  fn set_clue_text(&mut self, word: u32, text: &str);

  /// Current selection (or caret, when empty) in slot indexes.
  fn selection(&self, word: u32) -> Selection;

  fn set_selection(&mut self, word: u32, selection: Selection);
}
