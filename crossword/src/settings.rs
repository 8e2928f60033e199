use serde::Deserialize;

use crate::Direction;
use crate::grid::Metrics;
use crate::validate::MAX_CLUE_LENGTH;

/// User-facing strings. Puzzle files may override any of them in a
/// `[labels]` table; the rest keep their English defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Labels {
  pub across: String,
  pub down: String,
  /// Accessible title of a grid cell. Placeholders: `{row}`, `{column}`,
  /// `{number}`, `{orientation}`, `{clue}`, `{letter}`, `{count}`.
  pub cell_title: String,
  /// Accessible title of a clue input. Same placeholders as
  /// [cell_title](Self::cell_title), minus the position ones.
  pub input_title: String,
}

impl Default for Labels {
  fn default() -> Self {
    Self {
      across: "Across".to_string(),
      down: "Down".to_string(),
      cell_title:
        "Row {row}, Column {column}. {number} {orientation}. {clue}, letter {letter} of {count}"
          .to_string(),
      input_title: "{number} {orientation}. {clue} Answer length {count}".to_string(),
    }
  }
}

impl Labels {
  pub fn orientation(&self, direction: Direction) -> &str {
    match direction {
      Direction::Across => &self.across,
      Direction::Down => &self.down,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub cell_width: u32,
  pub cell_height: u32,
  pub max_clue_length: usize,
}

impl Default for Settings {
  fn default() -> Self {
    let metrics = Metrics::default();
    Self {
      cell_width: metrics.cell_width,
      cell_height: metrics.cell_height,
      max_clue_length: MAX_CLUE_LENGTH,
    }
  }
}

impl Settings {
  pub fn metrics(&self) -> Metrics {
    Metrics {
      cell_width: self.cell_width,
      cell_height: self.cell_height,
    }
  }
}
