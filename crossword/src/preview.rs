//! The editor's preview table: the authored words laid onto the grid with
//! every problem square marked, before anything is saved.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::{Pos, Word, charset};

/// One square of the preview.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Square {
  /// 1-based positions of the words starting here.
  pub labels: Vec<usize>,
  /// Distinct letters placed here, uppercased, in the order they arrived.
  pub letters: Vec<char>,
  /// Set when two words disagree here, or a word covering it is invalid or
  /// runs off the grid.
  pub conflict: bool,
}

impl Square {
  /// The letters as shown in the square, e.g. `"A | B"` on a mismatch.
  pub fn content(&self) -> String {
    self
      .letters
      .iter()
      .map(char::to_string)
      .collect::<Vec<_>>()
      .join(" | ")
  }

  /// The number badge, e.g. `"1, 2"`.
  pub fn label(&self) -> String {
    self
      .labels
      .iter()
      .map(usize::to_string)
      .collect::<Vec<_>>()
      .join(", ")
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
  rows: usize,
  columns: usize,
  squares: BTreeMap<Pos, Square>,
}

impl Preview {
  /// Lays out `words` in their authored order. Letters that would land
  /// outside the grid are dropped; the squares that remain are marked.
  pub fn build(words: &[Word], rows: usize, columns: usize) -> Self {
    let mut squares: BTreeMap<Pos, Square> = BTreeMap::new();

    for (i, word) in words.iter().enumerate() {
      if word.text.is_empty() {
        continue;
      }
      let invalid = word.clue.is_empty() || charset::contains_rejected(&word.text);
      let (last_row, last_column) = word.cell(word.letter_count().saturating_sub(1));
      let overflows = last_row >= rows || last_column >= columns;

      for (letter_index, letter) in word.letters().enumerate() {
        let (row, column) = word.cell(letter_index);
        if row >= rows || column >= columns {
          continue;
        }
        let square = squares.entry((row, column)).or_default();
        if letter_index == 0 {
          square.labels.push(i + 1);
        }
        let letter = charset::upper(letter);
        if !square.letters.contains(&letter) {
          if !square.letters.is_empty() {
            square.conflict = true;
          }
          square.letters.push(letter);
        }
        if invalid || overflows {
          square.conflict = true;
        }
      }
    }

    Self {
      rows,
      columns,
      squares,
    }
  }

  pub fn square(&self, pos: Pos) -> Option<&Square> {
    self.squares.get(&pos)
  }

  pub fn has_conflicts(&self) -> bool {
    self.squares.values().any(|s| s.conflict)
  }
}

/// Spreadsheet-style header for a 1-based column: `A`…`Z`, then `AA`.
pub fn column_label(mut column: usize) -> String {
  let mut label = Vec::new();
  while column > 0 {
    column -= 1;
    label.push((b'A' + (column % 26) as u8) as char);
    column /= 26;
  }
  label.iter().rev().collect()
}

/// Draws the table with column letters across the top and row numbers down
/// the side. Conflicting squares are bracketed.
impl Display for Preview {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "   ")?;
    for column in 1..=self.columns {
      write!(f, "{:^3}", column_label(column))?;
    }
    writeln!(f)?;

    for row in 0..self.rows {
      write!(f, "{:>3}", row + 1)?;
      for column in 0..self.columns {
        match self.squares.get(&(row, column)) {
          None => write!(f, " . ")?,
          Some(square) => {
            let letter = square.letters.first().copied().unwrap_or(' ');
            if square.conflict {
              write!(f, "[{letter}]")?;
            } else {
              write!(f, " {letter} ")?;
            }
          }
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Direction::{Across, Down};

  fn word(text: &str, direction: crate::Direction, row: usize, column: usize) -> Word {
    Word::new(text, "A clue", direction, row, column)
  }

  #[test]
  fn headers() {
    assert_eq!(column_label(1), "A");
    assert_eq!(column_label(26), "Z");
    assert_eq!(column_label(27), "AA");
  }

  #[test]
  fn mismatch_shows_both_letters() {
    let preview = Preview::build(&[word("cat", Across, 0, 0), word("dog", Down, 0, 0)], 3, 3);
    let start = preview.square((0, 0)).unwrap();
    assert_eq!(start.content(), "C | D");
    assert_eq!(start.label(), "1, 2");
    assert!(start.conflict);
    assert!(!preview.square((0, 1)).unwrap().conflict);
    assert!(preview.has_conflicts());
  }

  #[test]
  fn clean_grid() {
    let preview = Preview::build(
      &[word("brazil", Across, 1, 0), word("paris", Down, 0, 2), word("italy", Across, 3, 2)],
      5,
      7,
    );
    assert!(!preview.has_conflicts());
    assert_eq!(preview.square((1, 2)).unwrap().content(), "A");

    #[rustfmt::skip]
    assert_eq!(
      preview.to_string(),
      concat!(
        "    A  B  C  D  E  F  G \n",
        "  1 .  .  P  .  .  .  . \n",
        "  2 B  R  A  Z  I  L  . \n",
        "  3 .  .  R  .  .  .  . \n",
        "  4 .  .  I  T  A  L  Y \n",
        "  5 .  .  S  .  .  .  . \n",
      )
    );
  }

  #[test]
  fn invalid_and_overflowing_words_are_marked() {
    let preview = Preview::build(
      &[
        Word::new("tea", "", Across, 0, 0),
        word("hello", Across, 1, 1),
        word("a.b", Across, 2, 0),
      ],
      3,
      4,
    );
    assert!(preview.square((0, 0)).unwrap().conflict);
    assert!(preview.square((1, 3)).unwrap().conflict);
    assert_eq!(preview.square((1, 4)), None);
    assert!(preview.square((2, 0)).unwrap().conflict);
  }
}
