//! Authoring-time checks on a word list: per-word input errors and letter
//! conflicts where two words share a cell.
//!
//! Validation is pure. The same words and grid size always produce the same
//! [Report]; problems are values in the report, never `Err`s.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use thiserror::Error;

use crate::Word;
use crate::charset;
use crate::geometry::{Point, Segment, intersect};

/// Longest clue, in characters, an author may enter.
pub const MAX_CLUE_LENGTH: usize = 200;

/// Rows and columns a puzzle file may ask for.
pub const GRID_SIZES: std::ops::RangeInclusive<usize> = 3..=15;

/// What is wrong with one authored word. Each word reports at most one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
  /// Only one of clue and answer was filled in. `word` is 1-based.
  #[error("You must enter both answer and clue for word {word}.")]
  MissingClueOrAnswer { word: usize },
  #[error(
    "The answer must contain alphanumeric characters. Special characters allowed are hyphens and apostrophes."
  )]
  DisallowedCharacter,
  #[error("Please do not add a {} before or after the last alphanumeric character.", break_name(.0))]
  BreakAtEdge(char),
  #[error(
    "Two or more consecutive new word breaks detected. Please use a maximum of one between individual words."
  )]
  AdjacentBreaks,
  #[error("The word start or end position is outside the defined grid size.")]
  OutOfBounds,
  #[error("The clue is too long, the maximum is {max} characters.")]
  ClueTooLong { max: usize },
  /// Another word above starts in the same cell with the same direction.
  #[error(
    "There cannot be two words starting in the same place, in the same direction. This clue starts in the same place as \"{other}\" above."
  )]
  DuplicateStart { other: String },
  #[error("The letter at the intersection of two words do not match. The word cannot be placed here.")]
  IntersectionMismatch,
  #[error("This type of question requires at least {min} word")]
  InsufficientWords { min: usize },
}

fn break_name(c: &char) -> &'static str {
  match c {
    '-' => "hyphen",
    _ => "space",
  }
}

/// Two words placing different letters at `point`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
  /// Index of the earlier word in the authored list.
  pub first: usize,
  /// Index of the later word, which the mismatch is reported against.
  pub second: usize,
  pub point: Point,
  pub letters: (char, char),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
  /// Errors keyed by the word's position in the authored list.
  pub errors: BTreeMap<usize, WordError>,
  pub conflicts: Vec<Conflict>,
}

impl Report {
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn error(&self, index: usize) -> Option<&WordError> {
    self.errors.get(&index)
  }
}

/// Checks a word list against a grid of `rows` × `columns`.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
  rows: usize,
  columns: usize,
  max_clue_length: usize,
}

impl Validator {
  pub fn new(rows: usize, columns: usize) -> Self {
    Self {
      rows,
      columns,
      max_clue_length: MAX_CLUE_LENGTH,
    }
  }

  pub fn max_clue_length(mut self, max: usize) -> Self {
    self.max_clue_length = max;
    self
  }

  pub fn validate(&self, words: &[Word]) -> Report {
    let mut report = Report::default();
    let mut checked = BTreeSet::new();
    let mut used = 0;

    for (i, word) in words.iter().enumerate() {
      if word.text.is_empty() || word.clue.is_empty() {
        // Both blank is an unused row, not a mistake.
        if word.text.is_empty() && word.clue.is_empty() {
          continue;
        }
        report
          .errors
          .insert(i, WordError::MissingClueOrAnswer { word: i + 1 });
      }
      used += 1;

      if !report.errors.contains_key(&i) {
        if let Some(error) = self.word_error(words, i) {
          report.errors.insert(i, error);
        }
      }

      if !report.errors.contains_key(&i) {
        checked.insert(i);
        self.find_conflicts(words, i, &mut checked, &mut report);
      }
    }

    if used < 1 {
      report
        .errors
        .insert(0, WordError::InsufficientWords { min: 1 });
    }

    report
  }

  /// The first problem with word `i` on its own, or with its start cell.
  fn word_error(&self, words: &[Word], i: usize) -> Option<WordError> {
    let word = &words[i];

    if charset::contains_rejected(&word.text) {
      return Some(WordError::DisallowedCharacter);
    }

    let first = word.text.chars().next();
    let last = word.text.chars().last();
    for c in [first, last].into_iter().flatten() {
      if charset::is_break(c) {
        return Some(WordError::BreakAtEdge(c));
      }
    }

    let chars: Vec<char> = word.text.chars().collect();
    if chars
      .windows(2)
      .any(|pair| charset::is_break(pair[0]) && charset::is_break(pair[1]))
    {
      return Some(WordError::AdjacentBreaks);
    }

    if !self.fits(word) {
      return Some(WordError::OutOfBounds);
    }

    if word.clue.chars().count() > self.max_clue_length {
      return Some(WordError::ClueTooLong {
        max: self.max_clue_length,
      });
    }

    words[..i]
      .iter()
      .find(|other| {
        !other.text.is_empty()
          && !other.clue.is_empty()
          && other.direction == word.direction
          && (other.start_row, other.start_column) == (word.start_row, word.start_column)
      })
      .map(|other| WordError::DuplicateStart {
        other: other.text.clone(),
      })
  }

  /// Whether the word's letters stay inside the grid.
  fn fits(&self, word: &Word) -> bool {
    let (last_row, last_column) = word.cell(word.letter_count().saturating_sub(1));
    last_row < self.rows && last_column < self.columns
  }

  /// Compares word `i` with every word not yet checked. A mismatch is
  /// reported against whichever of the pair comes later in the list,
  /// overwriting any earlier error there.
  fn find_conflicts(
    &self,
    words: &[Word],
    i: usize,
    checked: &mut BTreeSet<usize>,
    report: &mut Report,
  ) {
    let word = &words[i];
    let segment = Segment::of(word);

    for j in (0..words.len()).rev() {
      let other = &words[j];
      // Words running off the grid already carry OutOfBounds.
      if other.text.is_empty() || other.clue.is_empty() || !self.fits(other) {
        checked.insert(j);
        continue;
      }
      if checked.contains(&j) {
        continue;
      }

      for point in intersect(&segment, &Segment::of(other)) {
        let pos = (point.1 as usize, point.0 as usize);
        let (Some(a), Some(b)) = (word.letter_at(pos), other.letter_at(pos)) else {
          continue;
        };
        if a.to_lowercase().eq(b.to_lowercase()) {
          continue;
        }

        debug!(
          target: "crossword.validate",
          "words {} and {} disagree at {:?}: {:?} vs {:?}", i, j, point, a, b
        );
        let (first, second) = (i.min(j), i.max(j));
        report.errors.insert(second, WordError::IntersectionMismatch);
        report.conflicts.push(Conflict {
          first,
          second,
          point,
          letters: if i < j { (a, b) } else { (b, a) },
        });
      }
    }
  }
}

/// Validates `words` against a `rows` × `columns` grid with default limits.
pub fn validate(words: &[Word], rows: usize, columns: usize) -> Report {
  Validator::new(rows, columns).validate(words)
}
