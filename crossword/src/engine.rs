//! The solving state machine.
//!
//! An [Engine] owns the [Grid], a [ClueAccess] and a [CellAccess]
//! implementation and applies every user event to all of them, so that a
//! letter shown in a cell and the letter in each clue input owning that cell
//! always agree. Events are plain method
//! calls; each one runs to completion before the next.
//!
//! Clue inputs are addressed by slot: one slot per character of the answer,
//! break characters included. Grid cells are addressed by letter index,
//! which skips the breaks. [Word] converts between the two.

use log::{debug, trace};

use crate::access::{CellAccess, ClueAccess, Unbound};
use crate::charset::{self, PLACEHOLDER};
use crate::clue::{ClueInputs, Selection, replace_at};
use crate::grid::{CellCode, Grid, Metrics, Step};
use crate::render::{CellView, Frame, Highlight, LabelData, Rect, StickyClue, format_label};
use crate::{Labels, Word, number_words};

/// Where keyboard input currently goes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  #[default]
  None,
  /// The overlay input sitting on the focused cell.
  Grid,
  /// The clue input of a word.
  Clue(u32),
}

/// Navigation keys understood by a clue input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClueKey {
  Left,
  Right,
  Home,
  End,
  Up,
  Down,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct State {
  pub active_word: Option<u32>,
  /// The cell last selected. Selecting it again cycles through its words.
  pub coordinates: Option<CellCode>,
  pub focused_cell: Option<CellCode>,
  pub focus: Focus,
}

/// A caret placement held back until the current batch of insertions has
/// been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCaret {
  word: u32,
  slot: usize,
}

#[derive(Debug)]
pub struct Engine<C: ClueAccess = ClueInputs, G: CellAccess = Unbound> {
  words: Vec<Word>,
  grid: Grid,
  clues: C,
  /// Cell display the grid's letters are mirrored into.
  cells: G,
  labels: Labels,
  state: State,
  title: String,
  overlay: Option<Rect>,
  composition: Option<usize>,
  pending: Option<PendingCaret>,
}

impl Engine<ClueInputs> {
  /// An engine over in-memory clue inputs and a grid with default metrics.
  pub fn new(words: Vec<Word>, rows: usize, columns: usize) -> Self {
    Self::with_metrics(words, rows, columns, Metrics::default())
  }

  pub fn with_metrics(words: Vec<Word>, rows: usize, columns: usize, metrics: Metrics) -> Self {
    let words = number_words(words);
    let clues = ClueInputs::new(&words);
    Self::with_clues(words, rows, columns, metrics, clues)
  }
}

impl<C: ClueAccess> Engine<C> {
  /// Numbers `words`, builds the grid, pads every clue input to its word's
  /// length and fills the grid from whatever the inputs already hold.
  pub fn with_clues(
    words: Vec<Word>,
    rows: usize,
    columns: usize,
    metrics: Metrics,
    clues: C,
  ) -> Self {
    let words = number_words(words);
    let grid = Grid::build(&words, rows, columns, metrics);
    let mut engine = Self {
      words,
      grid,
      clues,
      cells: Unbound,
      labels: Labels::default(),
      state: State::default(),
      title: String::new(),
      overlay: None,
      composition: None,
      pending: None,
    };
    engine.set_up_clues();
    engine.sync_data_for_init();
    engine
  }

  /// Attaches a cell display. Every letter already in the grid is written
  /// into it, and every later cell write is mirrored there.
  pub fn with_cells<G: CellAccess>(self, mut cells: G) -> Engine<C, G> {
    for cell in self.grid.cells() {
      cells.set_cell_letter(cell.pos(), cell.letter());
    }
    Engine {
      words: self.words,
      grid: self.grid,
      clues: self.clues,
      cells,
      labels: self.labels,
      state: self.state,
      title: self.title,
      overlay: self.overlay,
      composition: self.composition,
      pending: self.pending,
    }
  }
}

impl<C: ClueAccess, G: CellAccess> Engine<C, G> {
  pub fn with_labels(mut self, labels: Labels) -> Self {
    self.labels = labels;
    self
  }

  /// Loads saved responses, one per word in number order, as if the solver
  /// had typed them.
  pub fn restore<S: AsRef<str>>(&mut self, responses: &[S]) {
    for (word, saved) in self.words.iter().zip(responses) {
      self
        .clues
        .set_clue_text(word.number, &word.fill_input(saved.as_ref()));
    }
    self.sync_data_for_init();
  }

  fn set_up_clues(&mut self) {
    for word in &self.words {
      let existing = self.clues.clue_text(word.number).unwrap_or_default();
      self
        .clues
        .set_clue_text(word.number, &word.fill_input(&existing));
    }
  }

  /// Writes every clue input into the grid and resets the selection.
  fn sync_data_for_init(&mut self) {
    let numbers: Vec<u32> = self.words.iter().map(|w| w.number).collect();
    for number in numbers {
      self.grid.update_letter_index_for_cells(number);
      if let Some(text) = self.clues.clue_text(number) {
        self.sync_letters_by_text(number, &text, false);
      }
    }
    self.state = State::default();
    self.title.clear();
    self.overlay = None;
  }

  pub fn words(&self) -> &[Word] {
    &self.words
  }

  pub fn word(&self, number: u32) -> Option<&Word> {
    self.words.iter().find(|w| w.number == number)
  }

  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  pub fn clues(&self) -> &C {
    &self.clues
  }

  pub fn cells(&self) -> &G {
    &self.cells
  }

  pub fn labels(&self) -> &Labels {
    &self.labels
  }

  pub fn state(&self) -> &State {
    &self.state
  }

  /// Accessible label of the overlay input, describing the focused cell.
  pub fn title(&self) -> &str {
    &self.title
  }

  /// Where the overlay input sits, in grid pixels.
  pub fn overlay(&self) -> Option<Rect> {
    self.overlay
  }

  fn active(&self) -> Option<Word> {
    self.state.active_word.and_then(|n| self.word(n)).cloned()
  }

  /// Selects a cell, as when it is clicked.
  ///
  /// Selecting the cell that was selected last moves to the next word
  /// sharing it. Otherwise the active word is kept if it owns the cell, and
  /// the cell's first word is taken if not.
  pub fn select_cell(&mut self, code: CellCode) {
    self.flush_caret();
    self.word_select(code);
    if self.state.active_word.is_some() {
      self.state.focus = Focus::Grid;
    }
  }

  /// Moves the keyboard back to the focused cell without changing the
  /// active word.
  pub fn focus_grid(&mut self) {
    self.flush_caret();
    if self.state.focused_cell.is_some() {
      self.state.focus = Focus::Grid;
    }
  }

  fn word_select(&mut self, code: CellCode) {
    let owners = self.grid.words_at(code);
    let Some(&first) = owners.first() else {
      return;
    };
    let active = self.state.active_word;

    let number = if self.state.coordinates == Some(code) {
      let current = active.and_then(|a| owners.iter().position(|&o| o == a));
      match current {
        Some(i) if i + 1 < owners.len() => owners[i + 1],
        _ => first,
      }
    } else {
      self.state.coordinates = Some(code);
      match active {
        Some(a) if owners.contains(&a) => a,
        _ => first,
      }
    };

    if active != Some(number) {
      debug!(target: "crossword.engine", "active word {:?} -> {}", active, number);
    }
    self.state.active_word = Some(number);
    self.grid.update_letter_index_for_cells(number);
    self.toggle_highlight(number, code);
  }

  /// Focuses `code` within word `number` and rebuilds the overlay title.
  fn toggle_highlight(&mut self, number: u32, code: CellCode) {
    self.state.focused_cell = Some(code);
    self.title = self.cell_title(number, code).unwrap_or_default();
    self.resize();
  }

  fn cell_title(&self, number: u32, code: CellCode) -> Option<String> {
    let word = self.word(number)?;
    let cell = self.grid.cell(code)?;
    let letter_index = cell.letter_index(number)?;
    let data = LabelData {
      row: cell.row + 1,
      column: cell.column + 1,
      number: word.number,
      orientation: self.labels.orientation(word.direction),
      clue: &word.clue,
      letter: letter_index + 1,
      count: word.letter_count(),
    };
    Some(format_label(&self.labels.cell_title, &data))
  }

  /// Accessible label for the clue input of word `number`.
  pub fn input_title(&self, number: u32) -> Option<String> {
    let word = self.word(number)?;
    let data = LabelData {
      number: word.number,
      orientation: self.labels.orientation(word.direction),
      clue: &word.clue,
      count: word.length(),
      ..LabelData::default()
    };
    Some(format_label(&self.labels.input_title, &data))
  }

  /// Recomputes the overlay box from the focused cell.
  pub fn resize(&mut self) {
    let metrics = self.grid.metrics();
    self.overlay = self
      .state
      .focused_cell
      .and_then(|code| self.grid.cell(code))
      .map(|cell| Rect {
        x: cell.x,
        y: cell.y.max(1),
        width: metrics.cell_width,
        height: metrics.cell_height,
      });
  }

  /// Runs a caret placement left over from the previous batch of
  /// insertions. Front ends call this once per frame; every event also runs
  /// it first.
  pub fn on_frame(&mut self) {
    self.flush_caret();
  }

  fn flush_caret(&mut self) {
    let Some(PendingCaret { word, mut slot }) = self.pending.take() else {
      return;
    };
    if self.word(word).is_some_and(|w| w.is_break_slot(slot)) {
      slot += 1;
    }
    self.clues.set_selection(word, Selection::caret(slot));
  }

  fn write_cell(&mut self, code: CellCode, letter: Option<char>) {
    if let Some(pos) = self.grid.cell(code).map(|cell| cell.pos()) {
      self.grid.set_cell_letter(pos, letter);
      self.cells.set_cell_letter(pos, letter);
    }
  }

  /// Writes `letter` (or a placeholder) into the slot of every clue input
  /// whose word owns the cell.
  fn bind_data_to_clues(&mut self, code: CellCode, letter: Option<char>) {
    let Some(cell) = self.grid.cell(code) else {
      return;
    };
    let writes: Vec<(u32, usize)> = cell
      .members()
      .iter()
      .filter_map(|m| {
        let word = self.word(m.word)?;
        Some((m.word, word.slot_of_letter(word.offset_of(cell.pos())?)?))
      })
      .collect();
    let c = letter.map(charset::upper).unwrap_or(PLACEHOLDER);
    for (number, slot) in writes {
      if let Some(text) = self.clues.clue_text(number) {
        self.clues.set_clue_text(number, &replace_at(&text, slot, c));
      }
    }
  }

  /// Writes a whole clue text into the word's cells. With `bind`, every
  /// other word crossing those cells gets the letter in its clue input too.
  pub fn sync_letters_by_text(&mut self, number: u32, text: &str, bind: bool) {
    let Some(word) = self.word(number).cloned() else {
      return;
    };
    for (slot, c) in text.chars().enumerate() {
      let Some(letter_index) = word.letter_index_of_slot(slot) else {
        continue;
      };
      let Some(code) = self.grid.cell_for(number, letter_index) else {
        continue;
      };
      let letter = (c != PLACEHOLDER).then(|| charset::upper(c));
      self.write_cell(code, letter);
      if bind {
        self.bind_data_to_clues(code, letter);
      }
    }
  }

  /// Types text into the focused cell, as through the overlay input. Each
  /// accepted letter fills the focused cell and focus moves on to the next
  /// cell of the active word, staying put at the end of the word.
  pub fn type_in_cell(&mut self, text: &str) {
    self.flush_caret();
    for c in charset::cell_letters(text) {
      let (Some(number), Some(code)) = (self.state.active_word, self.state.focused_cell) else {
        return;
      };
      let letter = charset::upper(c);
      trace!(target: "crossword.engine", "cell {code} <- {letter:?}");
      self.write_cell(code, Some(letter));
      self.bind_data_to_clues(code, Some(letter));

      let next = self
        .grid
        .cell(code)
        .and_then(|cell| cell.letter_index(number))
        .and_then(|i| self.grid.cell_for(number, i + 1));
      if let Some(next) = next {
        self.word_select(next);
      }
    }
  }

  /// Clears the focused cell, or if it is already empty, moves back to the
  /// previous cell of the active word without clearing it.
  pub fn cell_backspace(&mut self) {
    self.flush_caret();
    let (Some(number), Some(code)) = (self.state.active_word, self.state.focused_cell) else {
      return;
    };
    if self.grid.letter(code).is_none() {
      let previous = self
        .grid
        .cell(code)
        .and_then(|cell| cell.letter_index(number))
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| self.grid.cell_for(number, i));
      if let Some(previous) = previous {
        self.word_select(previous);
      }
    } else {
      self.write_cell(code, None);
      self.bind_data_to_clues(code, None);
    }
  }

  /// Delete behaves like backspace on the grid.
  pub fn cell_delete(&mut self) {
    self.cell_backspace();
  }

  /// Moves grid focus one cell over. Nothing happens at the edge of the
  /// filled area.
  pub fn cell_arrow(&mut self, step: Step) {
    self.flush_caret();
    let Some(code) = self.state.focused_cell else {
      return;
    };
    if let Some(next) = self.grid.neighbor(code, step) {
      self.word_select(next);
    }
  }

  /// Focuses the clue input of word `number` with the given selection, as
  /// when the solver clicks into it.
  ///
  /// A click puts the caret after the clicked character, so the character
  /// before the caret is the one taken, unless it is a break. An input
  /// holding only blanks jumps to its first slot.
  pub fn focus_clue(&mut self, number: u32, selection: Selection) {
    self.flush_caret();
    let Some(word) = self.word(number).cloned() else {
      return;
    };
    let text = self.clues.clue_text(number).unwrap_or_default();
    let chars: Vec<char> = text.chars().collect();
    self.clues.set_selection(number, selection);
    let selection = self.clues.selection(number);

    let blank = !chars.is_empty()
      && chars
        .iter()
        .all(|&c| c == PLACEHOLDER || charset::is_break(c));
    let clicked = selection.is_empty();
    let mut start = selection.start;
    if blank && clicked && selection.end == chars.len() {
      start = 0;
    }
    let previous = start.checked_sub(1);
    let after_break = previous
      .and_then(|p| chars.get(p))
      .is_some_and(|&c| charset::is_break(c));
    if clicked && !after_break {
      start = previous.unwrap_or(0);
      self.clues.set_selection(number, Selection::caret(start));
    }

    self.state.focus = Focus::Clue(number);
    let code = word
      .closest_letter_index(start)
      .and_then(|i| self.grid.cell_at(word.cell(i)));
    if let Some(code) = code {
      if self.state.active_word != Some(number) {
        debug!(target: "crossword.engine", "active word -> {number} from its clue");
      }
      self.state.active_word = Some(number);
      self.state.coordinates = Some(code);
      self.grid.update_letter_index_for_cells(number);
      self.toggle_highlight(number, code);
    }
  }

  /// The slot of `slot` or the first letter slot after it, and its cell.
  fn closest_cell(&self, word: &Word, slot: usize) -> (usize, Option<CellCode>) {
    let slot = (slot..word.length())
      .find(|&s| !word.is_break_slot(s))
      .unwrap_or(slot);
    let code = word
      .letter_index_of_slot(slot)
      .and_then(|i| self.grid.cell_for(word.number, i));
    (slot, code)
  }

  /// Writes one letter at `slot` of word `number`, then moves the
  /// highlight and caret on to the next letter slot.
  fn handle_typing_data(&mut self, word: &Word, slot: usize, c: char) {
    let (slot, code) = self.closest_cell(word, slot);
    let letter = charset::upper(c);
    if let Some(code) = code {
      self.write_cell(code, Some(letter));
      self.bind_data_to_clues(code, Some(letter));
    }
    let (next_slot, next) = self.closest_cell(word, slot + 1);
    if let Some(next) = next {
      self.toggle_highlight(word.number, next);
      self.clues.set_selection(word.number, Selection::caret(next_slot));
    }
  }

  /// Applies `chars` from `slot` on, one letter slot each, skipping break
  /// slots. The final caret is placed on the next frame.
  fn insert_characters(&mut self, word: &Word, chars: Vec<char>, mut slot: usize) {
    let breaks = word.break_slots();
    let mut chars = chars.into_iter().peekable();
    while slot < word.length() && chars.peek().is_some() {
      if !breaks.contains(&slot) {
        if let Some(c) = chars.next() {
          self.handle_typing_data(word, slot, c);
        }
      }
      slot += 1;
    }
    self.pending = Some(PendingCaret {
      word: word.number,
      slot,
    });
  }

  /// The word whose clue input has focus.
  fn focused_clue(&self) -> Option<Word> {
    match self.state.focus {
      Focus::Clue(number) => self.word(number).cloned(),
      _ => None,
    }
  }

  /// Typed text in the focused clue input, starting at the caret.
  pub fn clue_insert(&mut self, text: &str) {
    self.flush_caret();
    let Some(word) = self.focused_clue() else {
      return;
    };
    let chars = charset::cell_letters(text);
    if chars.is_empty() {
      return;
    }
    let start = self.clues.selection(word.number).start;
    self.clues.set_selection(word.number, Selection::caret(start));
    self.insert_characters(&word, chars, start);
  }

  /// An input method has started composing in the focused clue input.
  pub fn composition_start(&mut self) {
    self.flush_caret();
    if let Some(word) = self.focused_clue() {
      let start = self.clues.selection(word.number).start;
      self.clues.set_selection(word.number, Selection::caret(start));
      self.composition = Some(start);
    }
  }

  /// The input method committed `data`. Every character is applied from the
  /// caret position saved when composition started.
  pub fn composition_end(&mut self, data: &str) {
    self.flush_caret();
    match (self.composition.take(), self.focused_clue()) {
      (Some(start), Some(word)) => {
        let chars = charset::cell_letters(data);
        self.insert_characters(&word, chars, start);
      }
      (None, Some(_)) => self.clue_insert(data),
      _ => {}
    }
  }

  /// Pastes text into the focused clue input, or into the active word at
  /// the focused cell. Stops once the letter slots from the caret to the
  /// end of the word are used up.
  pub fn paste(&mut self, text: &str) {
    self.flush_caret();
    let (word, mut slot) = match self.state.focus {
      Focus::Clue(number) => match self.word(number).cloned() {
        Some(word) => (word, self.clues.selection(number).start),
        None => return,
      },
      Focus::Grid => {
        let Some(word) = self.active() else {
          return;
        };
        let slot = self
          .state
          .focused_cell
          .and_then(|code| self.grid.cell(code))
          .and_then(|cell| cell.letter_index(word.number))
          .and_then(|i| word.slot_of_letter(i));
        match slot {
          Some(slot) => (word, slot),
          None => return,
        }
      }
      Focus::None => return,
    };

    // A caret sitting on a break types into the letter after it.
    if let Some(first) = (slot..word.length()).find(|&s| !word.is_break_slot(s)) {
      slot = first;
    }
    let chars = charset::cell_letters(text);
    let capacity = (slot..word.length())
      .filter(|&s| !word.is_break_slot(s))
      .count();
    for (count, c) in chars.into_iter().enumerate() {
      if count >= capacity {
        break;
      }
      self.handle_typing_data(&word, slot, c);
      if let Some(next) = (slot + 1..word.length()).find(|&s| !word.is_break_slot(s)) {
        slot = next;
      }
    }
  }

  /// Cuts the selection of the focused clue input and returns the cut text
  /// for the clipboard. Later letters move up to fill the gap, the end is
  /// padded with placeholders and the grid is resynced from the result.
  pub fn cut(&mut self) -> Option<String> {
    self.flush_caret();
    let word = self.focused_clue()?;
    let text = self.clues.clue_text(word.number)?;
    let selection = self.clues.selection(word.number);
    if selection.is_empty() {
      return None;
    }

    let chars: Vec<char> = text.chars().collect();
    let removed: String = chars
      .iter()
      .skip(selection.start)
      .take(selection.len())
      .collect();
    let mut kept = chars
      .iter()
      .enumerate()
      .filter(|&(i, _)| !word.is_break_slot(i))
      .filter(|&(i, _)| !(selection.start..selection.end).contains(&i))
      .map(|(_, &c)| c);
    let value: String = word
      .text
      .chars()
      .map(|authored| {
        if charset::is_break(authored) {
          authored
        } else {
          kept.next().unwrap_or(PLACEHOLDER)
        }
      })
      .collect();

    debug!(target: "crossword.engine", "cut {removed:?} from word {}", word.number);
    self.clues.set_clue_text(word.number, &value);
    self
      .clues
      .set_selection(word.number, Selection::caret(selection.start));
    self.sync_letters_by_text(word.number, &value, true);
    Some(removed)
  }

  /// Backspace in the focused clue input: clears the selection, or the slot
  /// before the caret. Break characters stay.
  pub fn clue_backspace(&mut self) {
    self.clue_delete_range(true);
  }

  /// Delete in the focused clue input: clears the selection, or the slot
  /// after the caret.
  pub fn clue_delete(&mut self) {
    self.clue_delete_range(false);
  }

  fn clue_delete_range(&mut self, backward: bool) {
    self.flush_caret();
    let Some(word) = self.focused_clue() else {
      return;
    };
    let Some(text) = self.clues.clue_text(word.number) else {
      return;
    };
    let selection = self.clues.selection(word.number);
    let range = if !selection.is_empty() {
      selection.start..selection.end
    } else if backward {
      match selection.start.checked_sub(1) {
        Some(previous) => previous..selection.start,
        None => return,
      }
    } else if selection.start < word.length() {
      selection.start..selection.start + 1
    } else {
      return;
    };

    let value: String = text
      .chars()
      .enumerate()
      .map(|(i, c)| {
        if range.contains(&i) && !word.is_break_slot(i) {
          PLACEHOLDER
        } else {
          c
        }
      })
      .collect();
    self.clues.set_clue_text(word.number, &value);
    self.sync_letters_by_text(word.number, &value, true);
    self.sync_focus_cell_and_input(&word, range.start);
  }

  /// Puts the caret at `slot` and focuses the matching cell.
  fn sync_focus_cell_and_input(&mut self, word: &Word, slot: usize) {
    self.clues.set_selection(word.number, Selection::caret(slot));
    let code = word
      .closest_letter_index(slot)
      .and_then(|i| self.grid.cell_for(word.number, i));
    if let Some(code) = code {
      self.state.active_word = Some(word.number);
      self.toggle_highlight(word.number, code);
    }
  }

  /// Caret movement in the focused clue input. With `extend`, Left and
  /// Right grow the selection instead of moving the caret.
  pub fn clue_key(&mut self, key: ClueKey, extend: bool) {
    self.flush_caret();
    let Some(word) = self.focused_clue() else {
      return;
    };
    let selection = self.clues.selection(word.number);
    let last = word.length().saturating_sub(1);
    match key {
      ClueKey::Left | ClueKey::Right => {
        let selection = match (key, extend) {
          (ClueKey::Left, true) => Selection::new(selection.start.saturating_sub(1), selection.end),
          (_, true) => Selection::new(selection.start, (selection.end + 1).min(word.length())),
          (ClueKey::Left, false) => Selection::caret(selection.start.saturating_sub(1)),
          (_, false) => Selection::caret((selection.end + 1).min(word.length())),
        };
        self.clues.set_selection(word.number, selection);
        let code = word
          .closest_letter_index(selection.start)
          .and_then(|i| self.grid.cell_for(word.number, i));
        if let Some(code) = code {
          self.state.active_word = Some(word.number);
          self.toggle_highlight(word.number, code);
        }
      }
      ClueKey::Home | ClueKey::Up => self.sync_focus_cell_and_input(&word, 0),
      ClueKey::End | ClueKey::Down => self.sync_focus_cell_and_input(&word, last),
    }
  }

  /// How the cell should be highlighted right now.
  pub fn highlight(&self, code: CellCode) -> Highlight {
    if self.state.focused_cell == Some(code) {
      return Highlight::Focused;
    }
    match (self.state.active_word, self.grid.cell(code)) {
      (Some(active), Some(cell)) if cell.letter_index(active).is_some() => Highlight::Highlighted,
      _ => Highlight::Plain,
    }
  }

  /// Number, orientation and clue of the active word.
  pub fn sticky_clue(&self) -> Option<StickyClue> {
    let word = self.active()?;
    Some(StickyClue {
      number: word.number,
      orientation: self.labels.orientation(word.direction).to_string(),
      clue: word.clue.clone(),
      length: word.length(),
    })
  }

  /// Snapshot of everything a renderer draws.
  pub fn frame(&self) -> Frame {
    let metrics = self.grid.metrics();
    let cells = self
      .grid
      .cells()
      .iter()
      .enumerate()
      .map(|(code, cell)| {
        let owner = self
          .state
          .active_word
          .filter(|&a| cell.letter_index(a).is_some())
          .or_else(|| cell.words().next());
        CellView {
          code,
          row: cell.row,
          column: cell.column,
          bounds: Rect {
            x: cell.x,
            y: cell.y,
            width: metrics.cell_width,
            height: metrics.cell_height,
          },
          letter: cell.letter(),
          number: cell.label().map(str::to_string),
          highlight: self.highlight(code),
          title: owner
            .and_then(|n| self.cell_title(n, code))
            .unwrap_or_default(),
        }
      })
      .collect();
    let (width, height) = metrics.size(self.grid.rows(), self.grid.columns());
    Frame {
      width,
      height,
      cells,
      sticky: self.sticky_clue(),
      overlay: self.overlay,
    }
  }

  /// Each word's clue input, in number order.
  pub fn responses(&self) -> Vec<String> {
    self
      .words
      .iter()
      .map(|w| self.clues.clue_text(w.number).unwrap_or_default())
      .collect()
  }

  /// The responses as one line: `"; "` between words, blanks as spaces.
  pub fn summarise(&self) -> String {
    self
      .responses()
      .iter()
      .map(|r| r.replace(PLACEHOLDER, " "))
      .collect::<Vec<_>>()
      .join("; ")
  }

  /// Whether every word has at least one letter filled in.
  pub fn is_complete(&self) -> bool {
    self.responses().iter().all(|r| {
      r.chars()
        .any(|c| c != PLACEHOLDER && !charset::is_break(c))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Direction::{Across, Down};

  /// paris = 1 (down), brazil = 2, italy = 3.
  fn europe() -> Engine {
    Engine::new(
      vec![
        Word::new("brazil", "Largest country in South America", Across, 1, 0),
        Word::new("paris", "Capital of France", Down, 0, 2),
        Word::new("italy", "Shaped like a boot", Across, 3, 2),
      ],
      5,
      7,
    )
  }

  fn ice_cream() -> Engine {
    Engine::new(
      vec![
        Word::new("ice cream", "Cold dessert", Across, 0, 0),
        Word::new("rye", "Grain", Down, 0, 4),
      ],
      3,
      8,
    )
  }

  /// "a-bc" across on a 1×3 grid: slot 1 is the hyphen.
  fn hyphenated() -> Engine {
    Engine::new(vec![Word::new("a-bc", "Clue", Across, 0, 0)], 1, 3)
  }

  /// Every cell write the engine mirrors out, in order.
  #[derive(Debug, Default)]
  struct Recorder {
    writes: Vec<(crate::Pos, Option<char>)>,
  }

  impl CellAccess for Recorder {
    fn cell_letter(&self, pos: crate::Pos) -> Option<char> {
      self
        .writes
        .iter()
        .rev()
        .find(|(p, _)| *p == pos)
        .and_then(|(_, letter)| *letter)
    }

    fn set_cell_letter(&mut self, pos: crate::Pos, letter: Option<char>) {
      self.writes.push((pos, letter));
    }
  }

  fn cell(engine: &Engine, pos: crate::Pos) -> CellCode {
    engine.grid().cell_at(pos).unwrap()
  }

  fn text(engine: &Engine, number: u32) -> String {
    engine.clues().clue_text(number).unwrap()
  }

  /// Rebuilds a clue text from the grid, the way a reader of the cells
  /// would see it.
  fn from_grid(engine: &Engine, number: u32) -> String {
    let word = engine.word(number).unwrap();
    word
      .text
      .chars()
      .enumerate()
      .map(|(slot, authored)| match word.letter_index_of_slot(slot) {
        None => authored,
        Some(i) => engine
          .grid()
          .cell_letter(word.cell(i))
          .unwrap_or(PLACEHOLDER),
      })
      .collect()
  }

  fn assert_in_sync(engine: &Engine) {
    for word in engine.words() {
      let text = text(engine, word.number);
      assert_eq!(text.chars().count(), word.length());
      assert_eq!(from_grid(engine, word.number), text);
    }
  }

  #[test]
  fn starts_idle_and_blank() {
    let engine = ice_cream();
    assert_eq!(engine.state(), &State::default());
    assert_eq!(text(&engine, 1), "___ _____");
    assert_eq!(text(&engine, 2), "___");
    assert_eq!(engine.sticky_clue(), None);
    assert!(!engine.is_complete());
  }

  #[test]
  fn selecting_cells() {
    let mut engine = europe();
    let shared = cell(&engine, (1, 2));

    engine.select_cell(shared);
    assert_eq!(engine.state().active_word, Some(1));
    assert_eq!(engine.state().focused_cell, Some(shared));
    assert_eq!(engine.state().focus, Focus::Grid);

    // Same cell again cycles to the other word, then back.
    engine.select_cell(shared);
    assert_eq!(engine.state().active_word, Some(2));
    engine.select_cell(shared);
    assert_eq!(engine.state().active_word, Some(1));

    // A cell of the active word keeps it; any other cell switches.
    engine.select_cell(cell(&engine, (2, 2)));
    assert_eq!(engine.state().active_word, Some(1));
    engine.select_cell(cell(&engine, (1, 0)));
    assert_eq!(engine.state().active_word, Some(2));
  }

  #[test]
  fn selection_is_deterministic() {
    let mut a = europe();
    let mut b = europe();
    for engine in [&mut a, &mut b] {
      let (first, second) = (cell(engine, (3, 2)), cell(engine, (3, 4)));
      engine.select_cell(first);
      engine.select_cell(second);
    }
    assert_eq!(a.state(), b.state());
    assert_eq!(a.title(), b.title());
  }

  #[test]
  fn focus_returns_to_the_grid() {
    let mut engine = europe();
    engine.focus_grid();
    assert_eq!(engine.state().focus, Focus::None);

    let shared = cell(&engine, (1, 2));
    engine.select_cell(shared);
    engine.focus_clue(1, Selection::caret(2));
    assert_eq!(engine.state().focus, Focus::Clue(1));
    engine.focus_grid();
    assert_eq!(engine.state().focus, Focus::Grid);
    assert_eq!(engine.state().active_word, Some(1));
  }

  #[test]
  fn typing_crosses_into_every_owner() {
    let mut engine = europe();
    engine.select_cell(cell(&engine, (1, 0)));
    engine.type_in_cell("b");
    engine.type_in_cell("r");
    engine.type_in_cell("a");
    assert_eq!(text(&engine, 2), "BRA___");
    assert_eq!(text(&engine, 1), "_A___");
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (1, 3))));
    assert_in_sync(&engine);
  }

  #[test]
  fn typing_rejects_punctuation_and_stops_at_the_end() {
    let mut engine = europe();
    // The first click picks paris, the second cycles to italy.
    engine.select_cell(cell(&engine, (3, 2)));
    engine.select_cell(cell(&engine, (3, 2)));
    assert_eq!(engine.state().active_word, Some(3));

    engine.type_in_cell("!");
    assert_eq!(text(&engine, 3), "_____");
    engine.type_in_cell("italy");
    assert_eq!(text(&engine, 3), "ITALY");
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (3, 6))));
    assert_eq!(text(&engine, 1), "___I_");
    assert!(!engine.is_complete());

    // Focus stays on the last cell, so the next letter overwrites it.
    engine.type_in_cell("s");
    assert_eq!(text(&engine, 3), "ITALS");
    assert_in_sync(&engine);
  }

  #[test]
  fn backspace_clears_then_hops_back() {
    let mut engine = europe();
    engine.select_cell(cell(&engine, (1, 0)));
    engine.type_in_cell("br");
    let third = cell(&engine, (1, 2));
    assert_eq!(engine.state().focused_cell, Some(third));

    // Empty: move back without clearing.
    engine.cell_backspace();
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (1, 1))));
    assert_eq!(text(&engine, 2), "BR____");

    // Filled: clear in place.
    engine.cell_backspace();
    assert_eq!(text(&engine, 2), "B_____");
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (1, 1))));
    assert_in_sync(&engine);
  }

  #[test]
  fn arrows_move_by_pixel() {
    let mut engine = europe();
    let shared = cell(&engine, (1, 2));
    engine.select_cell(shared);
    engine.cell_arrow(Step::Up);
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 2))));
    engine.cell_arrow(Step::Up);
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 2))));
    engine.cell_arrow(Step::Down);
    engine.cell_arrow(Step::Left);
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (1, 1))));
    assert_eq!(engine.state().active_word, Some(2));
  }

  #[test]
  fn titles_and_sticky_clue() {
    let mut engine = europe();
    engine.select_cell(cell(&engine, (2, 2)));
    assert_eq!(
      engine.title(),
      "Row 3, Column 3. 1 Down. Capital of France, letter 3 of 5"
    );
    let sticky = engine.sticky_clue().unwrap();
    assert_eq!(sticky.heading(), "1 Down");
    assert_eq!(sticky.body(), "Capital of France (5)");
    assert_eq!(
      engine.input_title(3).unwrap(),
      "3 Across. Shaped like a boot Answer length 5"
    );
  }

  #[test]
  fn clue_click_rules() {
    let mut engine = ice_cream();
    // Blank input, caret at the end: first slot.
    engine.focus_clue(1, Selection::caret(9));
    assert_eq!(engine.clues().selection(1), Selection::caret(0));
    assert_eq!(engine.state().focus, Focus::Clue(1));
    assert_eq!(engine.state().active_word, Some(1));
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 0))));

    // The character before the caret is the clicked one.
    engine.focus_clue(1, Selection::caret(3));
    assert_eq!(engine.clues().selection(1), Selection::caret(2));
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 2))));

    // Unless it is a break.
    engine.focus_clue(1, Selection::caret(4));
    assert_eq!(engine.clues().selection(1), Selection::caret(4));
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 3))));
  }

  #[test]
  fn clue_typing_skips_breaks() {
    let mut engine = ice_cream();
    engine.focus_clue(1, Selection::caret(0));
    engine.clue_insert("ice cream");
    assert_eq!(text(&engine, 1), "ICE CREAM");
    // The caret waits for the next frame.
    engine.on_frame();
    assert_eq!(engine.clues().selection(1), Selection::caret(9));
    assert_eq!(text(&engine, 2), "R__");
    assert_in_sync(&engine);
  }

  #[test]
  fn deferred_caret_steps_over_a_break() {
    let mut engine = ice_cream();
    engine.focus_clue(1, Selection::caret(0));
    engine.clue_insert("ice");
    engine.on_frame();
    assert_eq!(engine.clues().selection(1), Selection::caret(4));
    engine.clue_insert("c");
    assert_eq!(text(&engine, 1), "ICE C____");
  }

  #[test]
  fn composition_applies_from_the_saved_caret() {
    let mut engine = ice_cream();
    engine.focus_clue(1, Selection::caret(0));
    engine.composition_start();
    engine.composition_end("ｉｃｅｃ");
    engine.on_frame();
    assert_eq!(text(&engine, 1), "ICE C____");
    assert_eq!(engine.clues().selection(1), Selection::caret(5));
    assert_in_sync(&engine);
  }

  #[test]
  fn paste_stops_at_capacity() {
    let mut engine = europe();
    engine.focus_clue(1, Selection::caret(0));
    engine.paste("p-a(r)i.s, france");
    assert_eq!(text(&engine, 1), "PARIS");
    assert_eq!(text(&engine, 2), "__A___");
    assert_in_sync(&engine);
  }

  #[test]
  fn paste_into_the_grid() {
    let mut engine = ice_cream();
    engine.select_cell(cell(&engine, (0, 3)));
    engine.paste("cream");
    assert_eq!(text(&engine, 1), "___ CREAM");
    assert_eq!(text(&engine, 2), "R__");
    assert_in_sync(&engine);
  }

  #[test]
  fn cut_pads_and_resyncs() {
    let mut engine = ice_cream();
    engine.focus_clue(1, Selection::caret(0));
    engine.clue_insert("icecream");
    engine.on_frame();

    engine.focus_clue(1, Selection::new(0, 4));
    let cut = engine.cut();
    assert_eq!(cut.as_deref(), Some("ICE "));
    assert_eq!(text(&engine, 1), "CRE AM___");
    assert_eq!(engine.clues().selection(1), Selection::caret(0));
    // The down word shares the fifth letter and follows the grid.
    assert_eq!(text(&engine, 2), "M__");
    assert_in_sync(&engine);

    engine.focus_clue(1, Selection::new(0, 9));
    assert_eq!(engine.cut().as_deref(), Some("CRE AM___"));
    assert_eq!(text(&engine, 1), "___ _____");
    assert_eq!(text(&engine, 2), "___");
    assert_in_sync(&engine);

    // Nothing selected, nothing cut.
    assert_eq!(engine.cut(), None);
  }

  #[test]
  fn clue_delete_clears_in_place() {
    let mut engine = ice_cream();
    engine.focus_clue(1, Selection::caret(0));
    engine.clue_insert("icecream");
    engine.on_frame();

    engine.clue_backspace();
    assert_eq!(text(&engine, 1), "ICE CREA_");
    assert_eq!(engine.clues().selection(1), Selection::caret(8));

    // The break survives.
    engine.focus_clue(1, Selection::new(2, 5));
    engine.clue_delete();
    assert_eq!(text(&engine, 1), "IC_ _REA_");
    assert_eq!(engine.clues().selection(1), Selection::caret(2));
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 2))));
    assert_in_sync(&engine);
  }

  #[test]
  fn clue_navigation() {
    let mut engine = ice_cream();
    engine.focus_clue(1, Selection::caret(0));
    engine.clue_key(ClueKey::End, false);
    assert_eq!(engine.clues().selection(1), Selection::caret(8));
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 7))));

    engine.clue_key(ClueKey::Home, false);
    engine.clue_key(ClueKey::Right, false);
    assert_eq!(engine.clues().selection(1), Selection::caret(1));
    assert_eq!(engine.state().focused_cell, Some(cell(&engine, (0, 1))));

    engine.clue_key(ClueKey::Right, true);
    engine.clue_key(ClueKey::Right, true);
    assert_eq!(engine.clues().selection(1), Selection::new(1, 3));
    engine.clue_key(ClueKey::Left, false);
    assert_eq!(engine.clues().selection(1), Selection::caret(0));
  }

  #[test]
  fn buffers_keep_their_length() {
    let mut engine = ice_cream();
    engine.focus_clue(1, Selection::caret(2));
    engine.paste("a very long paste that will not fit");
    engine.clue_insert("zzzzzzzzzzzzzz");
    engine.clue_backspace();
    engine.focus_clue(1, Selection::new(1, 7));
    engine.cut();
    engine.select_cell(cell(&engine, (0, 4)));
    engine.select_cell(cell(&engine, (0, 4)));
    engine.type_in_cell("xyz");
    engine.cell_backspace();
    engine.on_frame();
    assert_in_sync(&engine);
  }

  #[test]
  fn clue_text_round_trips_through_the_grid() {
    let mut engine = europe();
    engine.sync_letters_by_text(2, "BRAZIL", true);
    assert_eq!(from_grid(&engine, 2), "BRAZIL");
    assert_eq!(text(&engine, 1), "_A___");

    engine.sync_letters_by_text(2, "BR_ZIL", false);
    assert_eq!(from_grid(&engine, 2), "BR_ZIL");
    assert_eq!(engine.grid().cell_letter((1, 2)), None);
  }

  #[test]
  fn paste_from_a_break_fills_the_letters_after_it() {
    let mut engine = hyphenated();
    engine.focus_clue(1, Selection::new(1, 2));
    engine.paste("xy");
    assert_eq!(text(&engine, 1), "_-XY");
    assert_in_sync(&engine);
  }

  #[test]
  fn insert_from_a_break_skips_it() {
    let mut engine = hyphenated();
    engine.focus_clue(1, Selection::new(1, 2));
    engine.clue_insert("x");
    assert_eq!(text(&engine, 1), "_-X_");
    engine.on_frame();
    assert_eq!(engine.clues().selection(1), Selection::caret(3));
  }

  #[test]
  fn cut_from_a_break_keeps_it_in_place() {
    let mut engine = hyphenated();
    engine.restore(&["a-bc"]);
    engine.focus_clue(1, Selection::new(1, 3));
    assert_eq!(engine.cut(), Some("-B".to_string()));
    assert_eq!(text(&engine, 1), "A-C_");
    assert_in_sync(&engine);
  }

  #[test]
  fn cell_writes_reach_an_attached_display() {
    let mut engine = europe().with_cells(Recorder::default());
    assert_eq!(engine.cells().writes.len(), engine.grid().cells().len());

    let shared = engine.grid().cell_at((1, 2)).unwrap();
    engine.select_cell(shared);
    engine.type_in_cell("a");
    assert_eq!(engine.cells().cell_letter((1, 2)), Some('A'));

    engine.focus_clue(1, Selection::caret(3));
    engine.clue_insert("r");
    assert_eq!(engine.cells().cell_letter((2, 2)), Some('R'));

    engine.focus_clue(1, Selection::new(0, 3));
    engine.cut();
    for cell in engine.grid().cells() {
      assert_eq!(engine.cells().cell_letter(cell.pos()), cell.letter());
    }
    // The A shared with brazil was cut too.
    assert_eq!(engine.clues().clue_text(2).unwrap(), "______");
  }

  #[test]
  fn restore_fills_the_grid() {
    let mut engine = ice_cream();
    engine.restore(&["ice cr", "r"]);
    assert_eq!(text(&engine, 1), "ICE CR___");
    assert_eq!(text(&engine, 2), "R__");
    assert_eq!(engine.grid().cell_letter((0, 3)), Some('C'));
    assert_eq!(engine.grid().cell_letter((0, 4)), Some('R'));
    assert_eq!(engine.state().active_word, None);
    assert_eq!(engine.summarise(), "ICE CR   ; R  ");
    assert!(engine.is_complete());
  }

  #[test]
  fn frames() {
    let mut engine = europe();
    engine.select_cell(cell(&engine, (1, 2)));
    let frame = engine.frame();
    assert_eq!((frame.width, frame.height), (225, 161));
    let focused: Vec<_> = frame
      .cells
      .iter()
      .filter(|c| c.highlight == Highlight::Focused)
      .collect();
    assert_eq!(focused.len(), 1);
    assert_eq!(
      frame
        .cells
        .iter()
        .filter(|c| c.highlight == Highlight::Highlighted)
        .count(),
      4
    );
    assert_eq!(frame.sticky.unwrap().number, 1);
    assert_eq!(
      frame.overlay,
      Some(Rect {
        x: 65,
        y: 33,
        width: 31,
        height: 31
      })
    );
  }
}
