//! The accepted character set, shared by the placement validator and the
//! input filter of the interaction engine.

use unicode_normalization::UnicodeNormalization;

/// Characters that may never appear in an answer or be typed into a cell.
///
/// Hyphen and apostrophe are absent on purpose: they are part of the accepted
/// set. The underscore is here because it is the placeholder for an unset
/// slot in a clue input.
pub const REJECTED: &str = "@!$%^&*()_+|~=`\\#{}[]:\";<>?,./";

/// Marks an unset slot in a clue input.
pub const PLACEHOLDER: char = '_';

/// Characters inside a multi-word answer that take up a clue-input slot but
/// no grid cell.
pub const BREAKS: [char; 2] = [' ', '-'];

const CURLY_APOSTROPHES: [char; 2] = ['\u{2018}', '\u{2019}'];

/// Whether `c` is a word-break character.
pub fn is_break(c: char) -> bool {
  BREAKS.contains(&c)
}

/// Whether `c` is outside the accepted set.
pub fn is_rejected(c: char) -> bool {
  REJECTED.contains(c) || (c.is_whitespace() && c != ' ') || c.is_control()
}

/// Whether `text` contains any character outside the accepted set.
pub fn contains_rejected(text: &str) -> bool {
  text.chars().any(is_rejected)
}

/// NFKC-normalizes `text` and straightens curly apostrophes.
pub fn normalize(text: &str) -> String {
  text
    .nfkc()
    .map(|c| {
      if CURLY_APOSTROPHES.contains(&c) {
        '\''
      } else {
        c
      }
    })
    .collect()
}

/// Drops every rejected character, then normalizes what is left. This is the
/// filter applied to typed, composed and pasted text.
pub fn filter(text: &str) -> String {
  let kept: String = text.chars().filter(|&c| !is_rejected(c)).collect();
  normalize(&kept)
}

/// Filters `text` down to the characters that can be written into a grid
/// cell: accepted, normalized, and not a break character.
pub fn cell_letters(text: &str) -> Vec<char> {
  filter(text).chars().filter(|&c| !is_break(c)).collect()
}

/// Uppercases a single letter. Letters whose uppercase form is more than one
/// character (`ß`) are kept as they are so that one cell holds one character.
pub fn upper(c: char) -> char {
  let mut upper = c.to_uppercase();
  match (upper.next(), upper.next()) {
    (Some(u), None) => u,
    _ => c,
  }
}

/// Builds a string of `length` placeholders.
pub fn placeholders(length: usize) -> String {
  std::iter::repeat_n(PLACEHOLDER, length).collect()
}
