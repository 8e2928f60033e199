//! Line-segment math for finding where two placed words meet.
//!
//! Coordinates are `(x, y)` = `(column, row)`, matching how the grid is drawn.

use crate::Direction::{Across, Down};
use crate::Word;

/// An integer grid point, `(x, y)`.
pub type Point = (i64, i64);

/// The cells a word covers, as a closed segment from `(x1, y1)` to `(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
  pub x1: i64,
  pub y1: i64,
  pub x2: i64,
  pub y2: i64,
}

impl Segment {
  pub fn new((x1, y1): Point, (x2, y2): Point) -> Self {
    Self { x1, y1, x2, y2 }
  }

  /// The segment covered by `word`'s letters. Break characters take no cell.
  pub fn of(word: &Word) -> Self {
    let x1 = i64::try_from(word.start_column).unwrap_or(i64::MAX);
    let y1 = i64::try_from(word.start_row).unwrap_or(i64::MAX);
    let last = i64::try_from(word.letter_count().saturating_sub(1)).unwrap_or(i64::MAX);
    match word.direction {
      Across => Self::new((x1, y1), (x1.saturating_add(last), y1)),
      Down => Self::new((x1, y1), (x1, y1.saturating_add(last))),
    }
  }

  /// A segment of a single-letter word.
  pub fn is_point(&self) -> bool {
    self.x1 == self.x2 && self.y1 == self.y2
  }

  /// Whether `(x, y)` lies on this axis-aligned segment.
  pub fn contains(&self, (x, y): Point) -> bool {
    let (min_x, max_x) = (self.x1.min(self.x2), self.x1.max(self.x2));
    let (min_y, max_y) = (self.y1.min(self.y2), self.y1.max(self.y2));
    (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y)
  }
}

/// Returns every integer point shared by `a` and `b`.
///
/// Crossing segments meet in at most one point. Collinear segments that
/// overlap share every point in the overlapping run, and all of them are
/// returned.
pub fn intersect(a: &Segment, b: &Segment) -> Vec<Point> {
  if a.is_point() {
    let p = (a.x1, a.y1);
    return if b.contains(p) { vec![p] } else { vec![] };
  }
  if b.is_point() {
    let p = (b.x1, b.y1);
    return if a.contains(p) { vec![p] } else { vec![] };
  }

  let [x1, y1, x2, y2] = [a.x1, a.y1, a.x2, a.y2].map(i128::from);
  let [x3, y3, x4, y4] = [b.x1, b.y1, b.x2, b.y2].map(i128::from);

  // `p * q - r * s`, or None once the products leave i128. No grid is that
  // large.
  let cross =
    |p: i128, q: i128, r: i128, s: i128| p.checked_mul(q)?.checked_sub(r.checked_mul(s)?);
  let (Some(denominator), Some(numerator_a), Some(numerator_b)) = (
    cross(y4 - y3, x2 - x1, x4 - x3, y2 - y1),
    cross(x4 - x3, y1 - y3, y4 - y3, x1 - x3),
    cross(x2 - x1, y1 - y3, y2 - y1, x1 - x3),
  ) else {
    return vec![];
  };

  if denominator == 0 {
    if numerator_a == 0 && numerator_b == 0 {
      return collinear_overlap(a, b);
    }
    return vec![];
  }

  let ua = numerator_a as f64 / denominator as f64;
  let ub = numerator_b as f64 / denominator as f64;
  if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
    return vec![];
  }

  let x = (x1 as f64 + ua * (x2 - x1) as f64) as i64;
  let y = (y1 as f64 + ua * (y2 - y1) as f64) as i64;
  vec![(x, y)]
}

/// All points in the overlap of two segments on the same line.
fn collinear_overlap(a: &Segment, b: &Segment) -> Vec<Point> {
  if a.y1 == a.y2 {
    let from = a.x1.min(a.x2).max(b.x1.min(b.x2));
    let to = a.x1.max(a.x2).min(b.x1.max(b.x2));
    (from..=to).map(|x| (x, a.y1)).collect()
  } else {
    let from = a.y1.min(a.y2).max(b.y1.min(b.y2));
    let to = a.y1.max(a.y2).min(b.y1.max(b.y2));
    (from..=to).map(|y| (a.x1, y)).collect()
  }
}
