//! Head percolation: picking, for every phrase, the child that heads it.
//!
//! `RuleHeadFinder` runs the classic table-driven search. Each category maps
//! to an ordered list of `HeadRule`s; the first rule that finds a child wins,
//! and the last rule falls back to the leftmost or rightmost child not in the
//! avoid set. `SemanticHeadFinder` wraps it with the overrides that make
//! content words heads (participles over auxiliaries, predicates over
//! copulas).

mod semantic;

pub use semantic::{AuxiliaryWords, SemanticHeadFinder};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::tree::{NodeId, Tree};
use crate::utils::basic_category;

pub trait HeadFinder: Send + Sync {
  /// Returns the child of `node` that heads it. Leaves have no head child;
  /// a preterminal is headed by its leaf. `None` for a phrasal node means
  /// the tree is malformed.
  fn determine_head(&self, tree: &Tree, node: NodeId, parent: Option<NodeId>) -> Option<NodeId>;
}

/// Search order for a single head rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// For each category in order, the leftmost child with it
  Left,
  /// For each category in order, the rightmost child with it
  Right,
  /// The leftmost child with any of the categories
  LeftDis,
  /// The rightmost child with any of the categories
  RightDis,
  /// The leftmost child with none of the categories
  LeftExcept,
  /// The rightmost child with none of the categories
  RightExcept,
}

impl Direction {
  fn is_leftward(self) -> bool {
    matches!(self, Self::Left | Self::LeftDis | Self::LeftExcept)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRule {
  pub direction: Direction,
  pub categories: Vec<String>,
}

impl HeadRule {
  pub fn new(direction: Direction, categories: &[&str]) -> Self {
    Self {
      direction,
      categories: categories.iter().map(|c| c.to_string()).collect(),
    }
  }
}

/// Category -> ordered head rules. Data, supplied per treebank.
#[derive(Debug, Clone, Default)]
pub struct HeadRules {
  rules: FxHashMap<String, Vec<HeadRule>>,
  default_rule: Vec<HeadRule>,
  avoid: FxHashSet<String>,
}

impl HeadRules {
  /// `avoid` are the categories never chosen by the fallback rules,
  /// normally the punctuation tags
  pub fn new(avoid: &[&str]) -> Self {
    let avoid_list = avoid.iter().copied().collect::<Vec<_>>();
    Self {
      rules: FxHashMap::default(),
      default_rule: vec![HeadRule::new(Direction::LeftExcept, &avoid_list)],
      avoid: avoid.iter().map(|c| c.to_string()).collect(),
    }
  }

  pub fn insert(&mut self, category: &str, rules: Vec<HeadRule>) {
    self.rules.insert(category.to_string(), rules);
  }

  /// Rules used for categories with no entry of their own
  pub fn set_default(&mut self, rules: Vec<HeadRule>) {
    self.default_rule = rules;
  }

  pub fn get(&self, category: &str) -> &[HeadRule] {
    self
      .rules
      .get(category)
      .map(|r| r.as_slice())
      .unwrap_or(&self.default_rule)
  }

  pub fn is_avoided(&self, category: &str) -> bool {
    self.avoid.contains(category)
  }
}

/// Table-driven head finder
#[derive(Debug, Clone)]
pub struct RuleHeadFinder {
  rules: HeadRules,
}

impl RuleHeadFinder {
  pub fn new(rules: HeadRules) -> Self {
    Self { rules }
  }

  pub fn rules(&self) -> &HeadRules {
    &self.rules
  }

  /// Head of a phrase with at least one child, by the rule table alone
  pub fn determine_non_trivial_head(&self, tree: &Tree, node: NodeId) -> Option<NodeId> {
    let kids = tree.children(node);
    match kids.len() {
      0 => return None,
      1 => return Some(kids[0]),
      _ => {}
    }

    let category = basic_category(tree.label(node));
    let how = self.rules.get(category);
    for (idx, rule) in how.iter().enumerate() {
      let last_resort = idx == how.len() - 1;
      if let Some(head) = self.traverse_locate(tree, kids, rule, last_resort) {
        return Some(head);
      }
    }
    None
  }

  /// Applies one rule to `kids`. With `last_resort`, falls back to the
  /// leftmost/rightmost non-avoided child (or the edge child) in the rule's
  /// direction instead of failing.
  pub fn traverse_locate(&self, tree: &Tree, kids: &[NodeId], rule: &HeadRule, last_resort: bool) -> Option<NodeId> {
    if kids.is_empty() {
      return None;
    }
    let cat = |idx: usize| basic_category(tree.label(kids[idx]));
    let has = |idx: usize| rule.categories.iter().any(|c| c == cat(idx));

    let found = match rule.direction {
      Direction::Left => rule
        .categories
        .iter()
        .find_map(|c| (0..kids.len()).find(|&i| cat(i) == c)),
      Direction::Right => rule
        .categories
        .iter()
        .find_map(|c| (0..kids.len()).rev().find(|&i| cat(i) == c)),
      Direction::LeftDis => (0..kids.len()).find(|&i| has(i)),
      Direction::RightDis => (0..kids.len()).rev().find(|&i| has(i)),
      Direction::LeftExcept => (0..kids.len()).find(|&i| !has(i)),
      Direction::RightExcept => (0..kids.len()).rev().find(|&i| !has(i)),
    };

    match found {
      Some(idx) => Some(kids[self.post_operation_fix(tree, idx, kids)]),
      None if last_resort => {
        let (edge, fallback) = if rule.direction.is_leftward() {
          (0, (0..kids.len()).find(|&i| !self.rules.is_avoided(cat(i))))
        } else {
          (
            kids.len() - 1,
            (0..kids.len()).rev().find(|&i| !self.rules.is_avoided(cat(i))),
          )
        };
        Some(kids[fallback.unwrap_or(edge)])
      }
      None => None,
    }
  }

  /// Prefers the first conjunct of a coordination: if the chosen head
  /// follows a CC/CONJP, slide left over it and any separators.
  pub fn post_operation_fix(&self, tree: &Tree, head_idx: usize, kids: &[NodeId]) -> usize {
    if head_idx < 2 {
      return head_idx;
    }
    let prev = basic_category(tree.label(kids[head_idx - 1]));
    if prev != "CC" && prev != "CONJP" {
      return head_idx;
    }
    let mut new_idx = head_idx as isize - 2;
    while new_idx >= 0 && self.is_separator(tree, kids[new_idx as usize]) {
      new_idx -= 1;
    }
    if new_idx >= 0 { new_idx as usize } else { head_idx }
  }

  fn is_separator(&self, tree: &Tree, node: NodeId) -> bool {
    if !tree.is_preterminal(node) {
      return false;
    }
    let cat = basic_category(tree.label(node));
    self.rules.is_avoided(cat) || cat == "CC" || cat == "CONJP" || cat == "UH"
  }
}

impl HeadFinder for RuleHeadFinder {
  fn determine_head(&self, tree: &Tree, node: NodeId, _parent: Option<NodeId>) -> Option<NodeId> {
    if tree.is_leaf(node) {
      return None;
    }
    self.determine_non_trivial_head(tree, node)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rules() -> HeadRules {
    let mut rules = HeadRules::new(&[",", ".", ":"]);
    rules.insert("NP", vec![HeadRule::new(Direction::RightDis, &["NN", "NNS"])]);
    rules.insert("ADJP", vec![HeadRule::new(Direction::RightDis, &["JJ"])]);
    rules.insert("VP", vec![HeadRule::new(Direction::Left, &["VBD", "VP"])]);
    rules.insert("S", vec![HeadRule::new(Direction::Left, &["VP"])]);
    rules
  }

  fn head_word(tree: &Tree, node: NodeId) -> &str {
    tree.word(tree.head_word(node).unwrap())
  }

  #[test]
  fn test_rule_search() {
    let hf = RuleHeadFinder::new(rules());
    let mut tree = Tree::from_syntree(
      &"(ROOT (S (NP (DT the) (JJ big) (NN dog)) (VP (VBD barked)) (. .)))"
        .parse()
        .unwrap(),
    )
    .unwrap();
    tree.percolate_heads(&hf).unwrap();
    assert_eq!(head_word(&tree, tree.root()), "barked");
    let np = tree.children(tree.children(tree.root())[0])[0];
    assert_eq!(head_word(&tree, np), "dog");
    assert_eq!(tree.index(np), 3);
  }

  #[test]
  fn test_fallback_skips_avoided() {
    let hf = RuleHeadFinder::new(rules());
    let mut tree = Tree::from_syntree(&"(ROOT (FRAG (, ,) (NN dog) (. .)))".parse().unwrap()).unwrap();
    tree.percolate_heads(&hf).unwrap();
    assert_eq!(head_word(&tree, tree.root()), "dog");
  }

  #[test]
  fn test_coordination_prefers_first_conjunct() {
    let hf = RuleHeadFinder::new(rules());
    let mut tree = Tree::from_syntree(
      &"(ROOT (ADJP (JJ big) (, ,) (CC and) (JJ honest)))".parse().unwrap(),
    )
    .unwrap();
    tree.percolate_heads(&hf).unwrap();
    assert_eq!(head_word(&tree, tree.root()), "big");
  }
}
