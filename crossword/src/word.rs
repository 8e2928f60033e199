use crate::Direction::{self, Across, Down};
use crate::Pos;
use crate::charset::{self, PLACEHOLDER};

/// An authored answer placed on the grid.
///
/// `text` keeps its break characters: they take up a slot in the clue input
/// but no grid cell, so a word's letters always occupy contiguous cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
  /// 1-based, assigned by [number_words]. Zero until then.
  pub number: u32,
  pub start_row: usize,
  pub start_column: usize,
  pub direction: Direction,
  pub text: String,
  /// Free text, opaque to everything in this crate.
  pub clue: String,
}

impl Word {
  /// Creates an unnumbered word. The answer is trimmed and normalized.
  pub fn new(
    text: &str,
    clue: &str,
    direction: Direction,
    start_row: usize,
    start_column: usize,
  ) -> Self {
    Self {
      number: 0,
      start_row,
      start_column,
      direction,
      text: charset::normalize(text.trim()),
      clue: clue.trim().to_string(),
    }
  }

  /// Number of clue-input slots, break characters included.
  pub fn length(&self) -> usize {
    self.text.chars().count()
  }

  /// The letters that land in grid cells, in order.
  pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
    self.text.chars().filter(|&c| !charset::is_break(c))
  }

  /// Number of grid cells this word occupies.
  pub fn letter_count(&self) -> usize {
    self.letters().count()
  }

  /// Slot indexes holding a break character, e.g. `[1, 3]` for `A-B-C`.
  pub fn break_slots(&self) -> Vec<usize> {
    self
      .text
      .chars()
      .enumerate()
      .filter(|&(_, c)| charset::is_break(c))
      .map(|(i, _)| i)
      .collect()
  }

  pub fn is_break_slot(&self, slot: usize) -> bool {
    self.text.chars().nth(slot).is_some_and(charset::is_break)
  }

  /// Maps a clue-input slot to the index of the letter (and so the cell) it
  /// edits. Break slots and slots past the end have no letter.
  pub fn letter_index_of_slot(&self, slot: usize) -> Option<usize> {
    let mut letter_index = 0;
    for (i, c) in self.text.chars().enumerate() {
      let is_break = charset::is_break(c);
      if i == slot {
        return (!is_break).then_some(letter_index);
      }
      if !is_break {
        letter_index += 1;
      }
    }
    None
  }

  /// Like [Word::letter_index_of_slot], but a break slot resolves to the
  /// letter after it. Used to find the closest cell for a caret position.
  pub fn closest_letter_index(&self, slot: usize) -> Option<usize> {
    let breaks_before = self
      .text
      .chars()
      .take(slot)
      .filter(|&c| charset::is_break(c))
      .count();
    let letter_index = slot.checked_sub(breaks_before)?;
    (letter_index < self.letter_count()).then_some(letter_index)
  }

  /// Maps a letter index back to its clue-input slot.
  pub fn slot_of_letter(&self, letter_index: usize) -> Option<usize> {
    self
      .text
      .chars()
      .enumerate()
      .filter(|&(_, c)| !charset::is_break(c))
      .nth(letter_index)
      .map(|(i, _)| i)
  }

  /// The grid position of the letter at `letter_index`.
  pub fn cell(&self, letter_index: usize) -> Pos {
    match self.direction {
      Across => (self.start_row, self.start_column.saturating_add(letter_index)),
      Down => (self.start_row.saturating_add(letter_index), self.start_column),
    }
  }

  /// Offset of `pos` along this word, if `pos` lies on it.
  pub fn offset_of(&self, (row, column): Pos) -> Option<usize> {
    let offset = match self.direction {
      Across if row == self.start_row => column.checked_sub(self.start_column)?,
      Down if column == self.start_column => row.checked_sub(self.start_row)?,
      _ => return None,
    };
    (offset < self.letter_count()).then_some(offset)
  }

  /// The authored letter this word places at `pos`, if any.
  pub fn letter_at(&self, pos: Pos) -> Option<char> {
    self.letters().nth(self.offset_of(pos)?)
  }

  /// The clue input a solver starts from: placeholders, with break
  /// characters already laid into their slots.
  pub fn blank_input(&self) -> String {
    self.fill_input("")
  }

  /// Pads a saved response out to [Word::length], keeping the authored break
  /// characters in their slots. Anything past the word's length is dropped.
  pub fn fill_input(&self, saved: &str) -> String {
    let mut saved = saved.chars();
    self
      .text
      .chars()
      .map(|authored| {
        let typed = saved.next();
        if charset::is_break(authored) {
          authored
        } else {
          match typed {
            Some(c) if !charset::is_break(c) && !charset::is_rejected(c) => charset::upper(c),
            _ => PLACEHOLDER,
          }
        }
      })
      .collect()
  }
}

/// Sorts words top to bottom, then left to right (across before down on a
/// shared start) and numbers them from 1.
pub fn number_words(mut words: Vec<Word>) -> Vec<Word> {
  words.sort_by_key(|w| (w.start_row, w.start_column, w.direction == Down));
  for (i, word) in words.iter_mut().enumerate() {
    word.number = i as u32 + 1;
  }
  words
}
