use std::collections::VecDeque;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// A directed graph allowing several labelled edges between the same pair
/// of vertices. Iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct DirectedMultiGraph<V, E> {
  outgoing: IndexMap<V, IndexMap<V, Vec<E>>>,
  incoming: IndexMap<V, IndexMap<V, Vec<E>>>,
}

impl<V, E> Default for DirectedMultiGraph<V, E> {
  fn default() -> Self {
    Self {
      outgoing: IndexMap::new(),
      incoming: IndexMap::new(),
    }
  }
}

impl<V: Copy + Hash + Eq, E: Clone + PartialEq> DirectedMultiGraph<V, E> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_vertex(&mut self, v: V) {
    self.outgoing.entry(v).or_default();
    self.incoming.entry(v).or_default();
  }

  /// Adds `source -edge-> dest`. An identical edge is not added twice.
  pub fn add(&mut self, source: V, dest: V, edge: E) {
    self.add_vertex(source);
    self.add_vertex(dest);
    let out = self.outgoing[&source].get(&dest);
    if out.is_some_and(|edges| edges.contains(&edge)) {
      return;
    }
    self.outgoing[&source].entry(dest).or_default().push(edge.clone());
    self.incoming[&dest].entry(source).or_default().push(edge);
  }

  pub fn contains_vertex(&self, v: V) -> bool {
    self.outgoing.contains_key(&v)
  }

  pub fn is_edge(&self, source: V, dest: V) -> bool {
    self
      .outgoing
      .get(&source)
      .and_then(|m| m.get(&dest))
      .is_some_and(|edges| !edges.is_empty())
  }

  /// Labels on `source -> dest`, in insertion order
  pub fn edges(&self, source: V, dest: V) -> &[E] {
    self
      .outgoing
      .get(&source)
      .and_then(|m| m.get(&dest))
      .map(|e| e.as_slice())
      .unwrap_or(&[])
  }

  pub fn parents(&self, v: V) -> Vec<V> {
    self
      .incoming
      .get(&v)
      .map(|m| m.keys().copied().collect())
      .unwrap_or_default()
  }

  pub fn children(&self, v: V) -> Vec<V> {
    self
      .outgoing
      .get(&v)
      .map(|m| m.keys().copied().collect())
      .unwrap_or_default()
  }

  pub fn vertices(&self) -> impl Iterator<Item = V> + '_ {
    self.outgoing.keys().copied()
  }

  /// Every `(source, dest, labels)` group, in insertion order
  pub fn edge_groups(&self) -> impl Iterator<Item = (V, V, &[E])> + '_ {
    self
      .outgoing
      .iter()
      .flat_map(|(&s, m)| m.iter().map(move |(&d, e)| (s, d, e.as_slice())))
  }

  pub fn edge_count(&self) -> usize {
    self.outgoing.values().flat_map(|m| m.values()).map(|e| e.len()).sum()
  }

  /// Breadth-first reachability. Undirected search follows edges both ways.
  pub fn has_path(&self, from: V, to: V, directed: bool) -> bool {
    if !self.contains_vertex(from) || !self.contains_vertex(to) {
      return false;
    }
    let mut seen = IndexSet::new();
    let mut queue = VecDeque::from([from]);
    seen.insert(from);
    while let Some(v) = queue.pop_front() {
      if v == to {
        return true;
      }
      let mut next = self.children(v);
      if !directed {
        next.extend(self.parents(v));
      }
      for n in next {
        if seen.insert(n) {
          queue.push_back(n);
        }
      }
    }
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_multi_edges() {
    let mut g = DirectedMultiGraph::new();
    g.add(1, 2, "nsubj");
    g.add(1, 2, "dep");
    g.add(1, 2, "dep");
    g.add(1, 3, "dobj");
    assert_eq!(g.edges(1, 2), &["nsubj", "dep"]);
    assert_eq!(g.edge_count(), 3);
    assert_eq!(g.children(1), vec![2, 3]);
    assert_eq!(g.parents(3), vec![1]);
    assert!(g.is_edge(1, 3));
    assert!(!g.is_edge(3, 1));
  }

  #[test]
  fn test_paths() {
    let mut g = DirectedMultiGraph::new();
    g.add(1, 2, ());
    g.add(2, 3, ());
    g.add(4, 3, ());
    assert!(g.has_path(1, 3, true));
    assert!(!g.has_path(3, 1, true));
    assert!(g.has_path(1, 4, false));
    assert!(!g.has_path(1, 4, true));
    assert!(!g.has_path(1, 9, false));
  }
}
