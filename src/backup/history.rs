use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

pub const HISTORY_CAPACITY: usize = 10;

/// Bounded record of recent runs, oldest first. Inserting past capacity
/// evicts the oldest entry.
#[derive(Debug)]
pub struct RunHistory<V> {
  capacity: usize,
  entries: RwLock<VecDeque<(String, V)>>,
}

impl<V: Clone> Default for RunHistory<V> {
  fn default() -> Self {
    Self::new(HISTORY_CAPACITY)
  }
}

impl<V: Clone> RunHistory<V> {
  pub fn new(capacity: usize) -> Self {
    assert!(capacity > 0);
    Self {
      capacity,
      entries: RwLock::new(VecDeque::with_capacity(capacity + 1)),
    }
  }

  /// Overwriting an existing id keeps its original position.
  pub fn record(&self, id: impl Into<String>, value: V) {
    let id = id.into();
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(entry) = entries.iter_mut().find(|(key, _)| *key == id) {
      entry.1 = value;
      return;
    }
    entries.push_back((id, value));
    evict(&mut entries, self.capacity);
  }

  pub fn get(&self, id: &str) -> Option<V> {
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .find(|(key, _)| key == id)
      .map(|(_, value)| value.clone())
  }

  pub fn list(&self) -> Vec<V> {
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .map(|(_, value)| value.clone())
      .collect()
  }
}

fn evict<V>(entries: &mut VecDeque<(String, V)>, capacity: usize) {
  while entries.len() > capacity {
    entries.pop_front();
  }
}
