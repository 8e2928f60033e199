//! This crate is meant to be used as the foundation for an interactive crossword.
//! It provides no UI itself, but see `crosstui` for an example of how you can use it
//! to produce a crossword app.
//!
//! There are two halves:
//!
//! - Authoring: words are placed by hand on a grid, and [validate] reports the
//!   words that are malformed, out of bounds, or that cross another word with a
//!   different letter.
//! - Solving: an [Engine] keeps a [Grid] of letter cells and one linear clue
//!   input per word in agreement as the solver types, deletes, pastes, cuts or
//!   composes text, and tracks which word and cell are active.
//!
//! Puzzles are loaded from TOML files, see [file].

use Direction::{Across, Down};
use serde::Deserialize;
use std::ops::Not;

pub mod access;
pub mod charset;
pub mod clue;
pub mod engine;
pub mod file;
pub mod geometry;
pub mod grid;
pub mod preview;
pub mod registry;
pub mod render;
mod settings;
pub mod validate;
mod word;

pub use access::{CellAccess, ClueAccess, Unbound};
pub use clue::{ClueInputs, Selection};
pub use engine::{ClueKey, Engine, Focus, State};
pub use grid::{Cell, CellCode, Grid, Metrics, Step};
pub use preview::Preview;
pub use registry::{PuzzleId, Registry};
pub use settings::{Labels, Settings};
pub use validate::{Report, Validator, WordError, validate};
pub use word::{Word, number_words};

/// The two crossword directions: `Across` and `Down`
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Across,
  Down,
}

impl Not for Direction {
  type Output = Self;
  fn not(self) -> Self {
    match self {
      Across => Down,
      Down => Across,
    }
  }
}

/// A position in a grid: (row, column)
pub type Pos = (usize, usize);

/// The errors that may be produced by functions in this crate.
///
/// Problems with individual words are not errors: they are collected in a
/// [Report]. This type is for the cases where there is no puzzle to work with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// An [I/O error](std::io::Error) occurred.
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
  /// The puzzle file is not valid TOML, or is missing required fields.
  #[error("could not parse puzzle file: {0}")]
  Toml(#[from] toml::de::Error),
  /// Got an error while decoding the file, which was neither UTF-8 nor
  /// ISO-8859-1.
  #[error("could not decode puzzle file: {0}")]
  Encoding(String),
  /// The puzzle file was read, but some of its words are invalid.
  #[error("puzzle has {} invalid word(s)", .0.errors.len())]
  InvalidPuzzle(Report),
  /// The grid is smaller or larger than puzzles may be.
  #[error("a {rows}x{columns} grid is outside the allowed 3 to 15 rows and columns")]
  GridSize { rows: usize, columns: usize },
}
