//! Several puzzles live side by side, e.g. one per question on a page. The
//! [Registry] owns them and hands out ids; nothing is kept globally.

use std::collections::BTreeMap;

use log::debug;

use crate::access::{CellAccess, ClueAccess, Unbound};
use crate::clue::ClueInputs;
use crate::engine::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PuzzleId(u64);

#[derive(Debug)]
pub struct Registry<C: ClueAccess = ClueInputs, G: CellAccess = Unbound> {
  next: u64,
  puzzles: BTreeMap<PuzzleId, Engine<C, G>>,
}

impl<C: ClueAccess, G: CellAccess> Default for Registry<C, G> {
  fn default() -> Self {
    Self {
      next: 0,
      puzzles: BTreeMap::new(),
    }
  }
}

impl<C: ClueAccess, G: CellAccess> Registry<C, G> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Takes ownership of `engine`. Ids are never reused.
  pub fn create(&mut self, engine: Engine<C, G>) -> PuzzleId {
    let id = PuzzleId(self.next);
    self.next += 1;
    self.puzzles.insert(id, engine);
    debug!(target: "crossword.engine", "created puzzle {:?}", id);
    id
  }

  pub fn get(&self, id: PuzzleId) -> Option<&Engine<C, G>> {
    self.puzzles.get(&id)
  }

  pub fn get_mut(&mut self, id: PuzzleId) -> Option<&mut Engine<C, G>> {
    self.puzzles.get_mut(&id)
  }

  /// Removes the puzzle and gives its engine back.
  pub fn destroy(&mut self, id: PuzzleId) -> Option<Engine<C, G>> {
    let engine = self.puzzles.remove(&id);
    if engine.is_some() {
      debug!(target: "crossword.engine", "destroyed puzzle {:?}", id);
    }
    engine
  }

  pub fn ids(&self) -> impl Iterator<Item = PuzzleId> + '_ {
    self.puzzles.keys().copied()
  }

  pub fn len(&self) -> usize {
    self.puzzles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.puzzles.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Direction::Across;
  use crate::Word;

  fn engine(answer: &str) -> Engine {
    Engine::new(vec![Word::new(answer, "Clue", Across, 0, 0)], 1, 5)
  }

  #[test]
  fn lifecycle() {
    let mut registry = Registry::new();
    let cat = registry.create(engine("cat"));
    let dog = registry.create(engine("dog"));
    assert_ne!(cat, dog);
    assert_eq!(registry.len(), 2);

    let code = registry.get(cat).unwrap().grid().cell_at((0, 0)).unwrap();
    let puzzle = registry.get_mut(cat).unwrap();
    puzzle.select_cell(code);
    puzzle.type_in_cell("c");
    assert_eq!(registry.get(cat).unwrap().responses(), vec!["C__"]);
    assert_eq!(registry.get(dog).unwrap().responses(), vec!["___"]);

    assert!(registry.destroy(cat).is_some());
    assert!(registry.destroy(cat).is_none());
    assert!(registry.get(cat).is_none());
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![dog]);

    let bird = registry.create(engine("bird"));
    assert_ne!(bird, cat);
  }
}
