//! Puzzle files: TOML documents holding the grid size, the authored words
//! and optionally labels and settings.
//!
//! ```toml
//! rows = 5
//! columns = 7
//!
//! [labels]
//! across = "Across"
//!
//! [[words]]
//! answer = "paris"
//! clue = "Capital of France"
//! orientation = "down"
//! row = 0
//! column = 2
//! ```

use std::path::Path;

use encoding::DecoderTrap::Strict;
use encoding::Encoding;
use encoding::all::ISO_8859_1;
use log::{debug, warn};
use serde::Deserialize;

use crate::validate::{GRID_SIZES, Report, Validator};
use crate::{Direction, Engine, Error, Labels, Settings, Word};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WordEntry {
  pub answer: String,
  #[serde(default)]
  pub clue: String,
  pub orientation: Direction,
  pub row: usize,
  pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PuzzleFile {
  pub rows: usize,
  pub columns: usize,
  #[serde(default)]
  pub labels: Labels,
  #[serde(default)]
  pub settings: Settings,
  #[serde(default)]
  pub words: Vec<WordEntry>,
}

impl PuzzleFile {
  /// Reads and parses a puzzle file.
  pub fn read(path: impl AsRef<Path>) -> Result<Self, Error> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!(target: "crossword.file", "read {} bytes from {}", bytes.len(), path.display());
    Self::parse(&bytes)
  }

  pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
    Ok(toml::from_str(&decode(bytes)?)?)
  }

  /// The authored words, in file order.
  pub fn words(&self) -> Vec<Word> {
    self
      .words
      .iter()
      .map(|w| Word::new(&w.answer, &w.clue, w.orientation, w.row, w.column))
      .collect()
  }

  /// Refuses grids outside [GRID_SIZES] before anything is laid out on
  /// them.
  pub fn check_size(&self) -> Result<(), Error> {
    if GRID_SIZES.contains(&self.rows) && GRID_SIZES.contains(&self.columns) {
      Ok(())
    } else {
      Err(Error::GridSize {
        rows: self.rows,
        columns: self.columns,
      })
    }
  }

  pub fn validate(&self) -> Report {
    Validator::new(self.rows, self.columns)
      .max_clue_length(self.settings.max_clue_length)
      .validate(&self.words())
  }

  /// An engine ready for solving. Unused rows (no answer and no clue) are
  /// left out; a grid of the wrong size or any other problem refuses the
  /// puzzle.
  pub fn into_engine(self) -> Result<Engine, Error> {
    self.check_size()?;
    let report = self.validate();
    if !report.is_valid() {
      warn!(
        target: "crossword.file",
        "puzzle has {} invalid word(s)",
        report.errors.len()
      );
      return Err(Error::InvalidPuzzle(report));
    }
    let words = self
      .words()
      .into_iter()
      .filter(|w| !w.text.is_empty())
      .collect();
    let engine = Engine::with_metrics(words, self.rows, self.columns, self.settings.metrics());
    Ok(engine.with_labels(self.labels))
  }
}

/// Decodes a puzzle file. Files that are not UTF-8 are taken to be
/// ISO-8859-1, which older exports use.
pub fn decode(bytes: &[u8]) -> Result<String, Error> {
  match std::str::from_utf8(bytes) {
    Ok(text) => Ok(text.to_string()),
    Err(_) => {
      debug!(target: "crossword.file", "not UTF-8, decoding as ISO-8859-1");
      ISO_8859_1
        .decode(bytes, Strict)
        .map_err(|e| Error::Encoding(e.into_owned()))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::WordError;

  const EUROPE: &str = r#"
rows = 5
columns = 7

[[words]]
answer = "brazil"
clue = "Largest country in South America"
orientation = "across"
row = 1
column = 0

[[words]]
answer = "paris"
clue = "Capital of France"
orientation = "down"
row = 0
column = 2

[[words]]
answer = "italy"
clue = "Shaped like a boot"
orientation = "across"
row = 3
column = 2
"#;

  #[test]
  fn parses_words() {
    let file = PuzzleFile::parse(EUROPE.as_bytes()).unwrap();
    assert_eq!((file.rows, file.columns), (5, 7));
    assert_eq!(file.labels, Labels::default());
    let words = file.words();
    assert_eq!(words.len(), 3);
    assert_eq!(words[1].direction, Direction::Down);
    assert!(file.validate().is_valid());

    let engine = file.into_engine().unwrap();
    assert_eq!(engine.words()[0].text, "paris");
  }

  #[test]
  fn invalid_puzzles_are_refused() {
    let text = EUROPE.replace("\"italy\"", "\"xtaly\"");
    let file = PuzzleFile::parse(text.as_bytes()).unwrap();
    match file.into_engine() {
      Err(Error::InvalidPuzzle(report)) => {
        assert_eq!(report.error(2), Some(&WordError::IntersectionMismatch));
      }
      other => panic!("expected an invalid puzzle, got {other:?}"),
    }
  }

  #[test]
  fn grid_sizes_are_limited() {
    let huge = EUROPE.replace("columns = 7", "columns = 4611686018427387904");
    let file = PuzzleFile::parse(huge.as_bytes()).unwrap();
    assert!(matches!(
      file.into_engine(),
      Err(Error::GridSize {
        rows: 5,
        columns: 4611686018427387904
      })
    ));

    let tiny = EUROPE.replace("rows = 5", "rows = 2");
    let file = PuzzleFile::parse(tiny.as_bytes()).unwrap();
    assert!(file.check_size().is_err());

    let far = EUROPE.replace("column = 2\n", "column = 4611686018427387904\n");
    let file = PuzzleFile::parse(far.as_bytes()).unwrap();
    assert!(file.check_size().is_ok());
    assert_eq!(file.validate().error(1), Some(&WordError::OutOfBounds));
  }

  #[test]
  fn labels_and_settings() {
    let text = format!(
      "{EUROPE}\n[labels]\nacross = \"Horizontal\"\n\n[settings]\nmax_clue_length = 10\n"
    );
    let file = PuzzleFile::parse(text.as_bytes()).unwrap();
    assert_eq!(file.labels.across, "Horizontal");
    assert_eq!(file.settings.max_clue_length, 10);
    assert_eq!(file.settings.cell_width, 31);
    assert_eq!(
      file.validate().error(0),
      Some(&WordError::ClueTooLong { max: 10 })
    );
  }

  #[test]
  fn latin1_files() {
    let mut bytes = b"rows = 1\ncolumns = 4\n[[words]]\nanswer = \"caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"\"\nclue = \"Coffee\"\norientation = \"across\"\nrow = 0\ncolumn = 0\n");
    let file = PuzzleFile::parse(&bytes).unwrap();
    assert_eq!(file.words()[0].text, "café");
  }

  #[test]
  fn syntax_errors() {
    assert!(matches!(
      PuzzleFile::parse(b"rows = "),
      Err(Error::Toml(_))
    ));
    assert!(matches!(
      PuzzleFile::read("/nonexistent/puzzle.toml"),
      Err(Error::Io(_))
    ));
  }
}
