//! What a front end needs to draw the puzzle.
//!
//! [Frame] is a read-only snapshot of the engine: one [CellView] per cell,
//! the sticky clue and the overlay box. A [Renderer] draws it; [draw] walks a
//! frame through any renderer, so a terminal grid, an SVG document or a DOM
//! table can sit behind the same engine state.

use crate::grid::CellCode;

/// How a cell is highlighted. For instance, [Plain](Self::Plain) might map to
/// white, [Focused](Self::Focused) to yellow, and [Highlighted](Self::Highlighted)
/// to light blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
  /// The focused cell, where the next letter goes.
  Focused,
  /// Not focused, but part of the active word.
  Highlighted,
  Plain,
}

impl Highlight {
  /// The class name the web front end used for this state.
  pub fn class(&self) -> &'static str {
    match self {
      Self::Focused => "crossword-cell-focussed",
      Self::Highlighted => "crossword-cell-highlighted",
      Self::Plain => "crossword-cell",
    }
  }
}

/// A pixel rectangle in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
  pub code: CellCode,
  pub row: usize,
  pub column: usize,
  pub bounds: Rect,
  pub letter: Option<char>,
  /// Number badge for cells that start a word.
  pub number: Option<String>,
  pub highlight: Highlight,
  /// Accessible label.
  pub title: String,
}

/// Summary of the active word, shown above the grid on small screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickyClue {
  pub number: u32,
  pub orientation: String,
  pub clue: String,
  pub length: usize,
}

impl StickyClue {
  /// E.g. `3 Down`.
  pub fn heading(&self) -> String {
    format!("{} {}", self.number, self.orientation)
  }

  /// E.g. `Capital of France (5)`.
  pub fn body(&self) -> String {
    format!("{} ({})", self.clue, self.length)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
  pub width: u32,
  pub height: u32,
  pub cells: Vec<CellView>,
  pub sticky: Option<StickyClue>,
  pub overlay: Option<Rect>,
}

pub trait Renderer {
  fn cell(&mut self, cell: &CellView);

  fn sticky_clue(&mut self, sticky: Option<&StickyClue>);

  /// Where the overlay input sits, if a cell is focused.
  fn overlay(&mut self, _overlay: Option<Rect>) {}
}

/// Sends every part of `frame` to `renderer`.
pub fn draw(frame: &Frame, renderer: &mut impl Renderer) {
  for cell in &frame.cells {
    renderer.cell(cell);
  }
  renderer.sticky_clue(frame.sticky.as_ref());
  renderer.overlay(frame.overlay);
}

/// Values for the placeholders of a label template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelData<'a> {
  pub row: usize,
  pub column: usize,
  pub number: u32,
  pub orientation: &'a str,
  pub clue: &'a str,
  pub letter: usize,
  pub count: usize,
}

/// Replaces each `{key}` in `template` with the matching field of `data`.
/// Values are inserted as literal text; unknown keys are left alone.
pub fn format_label(template: &str, data: &LabelData<'_>) -> String {
  let mut label = String::with_capacity(template.len());
  let mut rest = template;
  while let Some(open) = rest.find('{') {
    label.push_str(&rest[..open]);
    let token = &rest[open..];
    let value = token
      .find('}')
      .and_then(|close| Some((label_value(&token[1..close], data)?, close)));
    match value {
      Some((value, close)) => {
        label.push_str(&value);
        rest = &token[close + 1..];
      }
      None => {
        label.push('{');
        rest = &token[1..];
      }
    }
  }
  label.push_str(rest);
  label
}

fn label_value(key: &str, data: &LabelData<'_>) -> Option<String> {
  Some(match key {
    "row" => data.row.to_string(),
    "column" => data.column.to_string(),
    "number" => data.number.to_string(),
    "orientation" => data.orientation.to_string(),
    "clue" => data.clue.to_string(),
    "letter" => data.letter.to_string(),
    "count" => data.count.to_string(),
    _ => return None,
  })
}

/// Draws the grid as an SVG document, one `<g>` per cell.
#[derive(Debug, Default)]
pub struct Svg {
  body: String,
  sticky: Option<String>,
}

impl Svg {
  pub fn render(frame: &Frame) -> String {
    let mut svg = Self::default();
    draw(frame, &mut svg);
    let mut out = format!(
      "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\">",
      frame.width, frame.height
    );
    if let Some(sticky) = &svg.sticky {
      out.push_str(sticky);
    }
    out.push_str(&svg.body);
    out.push_str("</svg>");
    out
  }
}

fn escape(text: &str) -> String {
  text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

impl Renderer for Svg {
  fn cell(&mut self, cell: &CellView) {
    let Rect {
      x,
      y,
      width,
      height,
    } = cell.bounds;
    self.body.push_str(&format!(
      "<g code=\"{}\"><title>{}</title><rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" class=\"{}\"/>",
      cell.code,
      escape(&cell.title),
      cell.highlight.class()
    ));
    if let Some(number) = &cell.number {
      self.body.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" class=\"crossword-cell-number\">{}</text>",
        x + 1,
        y + 9,
        escape(number)
      ));
    }
    let letter = cell.letter.map(String::from).unwrap_or_default();
    self.body.push_str(&format!(
      "<text x=\"{}\" y=\"{}\" class=\"crossword-cell-text\">{}</text></g>",
      x + width / 2,
      y + height * 2 / 3,
      escape(&letter)
    ));
  }

  fn sticky_clue(&mut self, sticky: Option<&StickyClue>) {
    self.sticky = sticky.map(|s| {
      format!(
        "<desc class=\"sticky-clue\">{} {}</desc>",
        escape(&s.heading()),
        escape(&s.body())
      )
    });
  }
}
