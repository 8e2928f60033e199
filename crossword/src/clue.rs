//! In-memory clue inputs: one fixed-length text buffer per word.

use std::collections::HashMap;

use crate::Word;
use crate::access::ClueAccess;
use crate::charset::PLACEHOLDER;

/// A selection in a clue input, as slot (character) indexes.
///
/// Always normalized so that `start <= end`. An empty selection is a caret.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
  pub start: usize,
  pub end: usize,
}

impl Selection {
  pub fn new(a: usize, b: usize) -> Self {
    Self {
      start: a.min(b),
      end: a.max(b),
    }
  }

  pub fn caret(at: usize) -> Self {
    Self { start: at, end: at }
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }
}

#[derive(Debug, Clone)]
struct ClueInput {
  value: String,
  length: usize,
  selection: Selection,
}

/// Clue inputs for every word of a puzzle.
///
/// Writes are fitted to the word's length: longer text is cut, shorter text
/// is padded with placeholders, so a buffer never changes length.
#[derive(Debug, Clone, Default)]
pub struct ClueInputs {
  inputs: HashMap<u32, ClueInput>,
}

impl ClueInputs {
  /// Blank inputs for `words`, with break characters in place.
  pub fn new(words: &[Word]) -> Self {
    let inputs = words
      .iter()
      .map(|word| {
        let input = ClueInput {
          value: word.blank_input(),
          length: word.length(),
          selection: Selection::default(),
        };
        (word.number, input)
      })
      .collect();
    Self { inputs }
  }

  /// Number of slots in the word's input.
  pub fn length(&self, word: u32) -> Option<usize> {
    self.inputs.get(&word).map(|input| input.length)
  }
}

impl ClueAccess for ClueInputs {
  fn clue_text(&self, word: u32) -> Option<String> {
    self.inputs.get(&word).map(|input| input.value.clone())
  }

  fn set_clue_text(&mut self, word: u32, text: &str) {
    if let Some(input) = self.inputs.get_mut(&word) {
      input.value = text
        .chars()
        .chain(std::iter::repeat(PLACEHOLDER))
        .take(input.length)
        .collect();
    }
  }

  fn selection(&self, word: u32) -> Selection {
    self
      .inputs
      .get(&word)
      .map(|input| input.selection)
      .unwrap_or_default()
  }

  fn set_selection(&mut self, word: u32, selection: Selection) {
    if let Some(input) = self.inputs.get_mut(&word) {
      input.selection = Selection::new(
        selection.start.min(input.length),
        selection.end.min(input.length),
      );
    }
  }
}

/// Replaces the character at slot `index`. Out-of-range indexes leave the
/// text unchanged.
pub fn replace_at(text: &str, index: usize, c: char) -> String {
  text
    .chars()
    .enumerate()
    .map(|(i, old)| if i == index { c } else { old })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Direction::Across;
  use crate::number_words;

  fn inputs() -> ClueInputs {
    let words = number_words(vec![Word::new("ice cream", "Cold", Across, 0, 0)]);
    ClueInputs::new(&words)
  }

  #[test]
  fn starts_blank_with_breaks() {
    let inputs = inputs();
    assert_eq!(inputs.clue_text(1).as_deref(), Some("___ _____"));
    assert_eq!(inputs.length(1), Some(9));
    assert_eq!(inputs.clue_text(2), None);
  }

  #[test]
  fn writes_keep_length() {
    let mut inputs = inputs();
    inputs.set_clue_text(1, "ICE");
    assert_eq!(inputs.clue_text(1).as_deref(), Some("ICE______"));
    inputs.set_clue_text(1, "ICE CREAMS AND MORE");
    assert_eq!(inputs.clue_text(1).as_deref(), Some("ICE CREAM"));
  }

  #[test]
  fn selection_is_clamped() {
    let mut inputs = inputs();
    inputs.set_selection(1, Selection::new(20, 4));
    assert_eq!(inputs.selection(1), Selection::new(4, 9));
    assert_eq!(inputs.selection(7), Selection::caret(0));
  }

  #[test]
  fn replace() {
    assert_eq!(replace_at("a_c", 1, 'B'), "aBc");
    assert_eq!(replace_at("abc", 5, 'x'), "abc");
  }
}
