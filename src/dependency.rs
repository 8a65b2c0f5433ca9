//! Words, typed dependencies, and their textual form `reln(gov-i, dep-j)`

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHashSet;

use crate::error::{Error, FormatReason, Result};
use crate::relation::{RelationSet, Reln};
use crate::tree::{NodeId, Tree};

/// The word of the synthetic root
pub const ROOT_WORD: &str = "ROOT";

/// A word token of the sentence. Identity is the position plus the copy
/// number; copies stand for a governor duplicated while collapsing
/// coordinated prepositions.
#[derive(Debug, Clone)]
pub struct IndexedWord {
  pub word: String,
  pub tag: String,
  /// 1-based, 0 for the root
  pub index: usize,
  pub copy: usize,
}

impl IndexedWord {
  pub fn new(word: &str, tag: &str, index: usize) -> Self {
    Self {
      word: word.to_string(),
      tag: tag.to_string(),
      index,
      copy: 0,
    }
  }

  pub fn root() -> Self {
    Self::new(ROOT_WORD, "", 0)
  }

  /// The word at leaf `leaf`
  pub fn from_leaf(tree: &Tree, leaf: NodeId) -> Self {
    Self::new(tree.word(leaf), tree.tag(leaf), tree.index(leaf))
  }

  pub fn is_root(&self) -> bool {
    self.index == 0
  }

  /// The same word with another copy number
  pub fn with_copy(&self, copy: usize) -> Self {
    Self {
      copy,
      ..self.clone()
    }
  }

  fn key(&self) -> (usize, usize) {
    (self.index, self.copy)
  }
}

impl PartialEq for IndexedWord {
  fn eq(&self, other: &Self) -> bool {
    self.key() == other.key()
  }
}

impl Eq for IndexedWord {}

impl Hash for IndexedWord {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.key().hash(state);
  }
}

impl PartialOrd for IndexedWord {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for IndexedWord {
  fn cmp(&self, other: &Self) -> Ordering {
    self.key().cmp(&other.key())
  }
}

impl fmt::Display for IndexedWord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.word, self.index)?;
    for _ in 0..self.copy {
      write!(f, "'")?;
    }
    Ok(())
  }
}

/// A labelled edge from a governor word to a dependent word
#[derive(Debug, Clone)]
pub struct TypedDependency {
  pub reln: Reln,
  pub gov: IndexedWord,
  pub dep: IndexedWord,
  /// Added by an extras pass rather than read off the tree
  pub extra: bool,
  /// Soft-deleted during collapsing, dropped before results are returned
  pub killed: bool,
}

impl TypedDependency {
  pub fn new(reln: Reln, gov: IndexedWord, dep: IndexedWord) -> Self {
    Self {
      reln,
      gov,
      dep,
      extra: false,
      killed: false,
    }
  }

  pub fn extra(mut self) -> Self {
    self.extra = true;
    self
  }

  /// Has the plain relation `short` (not a family member of it)
  pub fn has_reln(&self, short: &str) -> bool {
    self.reln.is(short)
  }

  pub fn is_live(&self) -> bool {
    !self.killed
  }
}

impl PartialEq for TypedDependency {
  fn eq(&self, other: &Self) -> bool {
    self.reln == other.reln && self.gov == other.gov && self.dep == other.dep
  }
}

impl Eq for TypedDependency {}

impl Hash for TypedDependency {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.reln.hash(state);
    self.gov.hash(state);
    self.dep.hash(state);
  }
}

impl PartialOrd for TypedDependency {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for TypedDependency {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .gov
      .cmp(&other.gov)
      .then_with(|| self.dep.cmp(&other.dep))
      .then_with(|| self.reln.cmp(&other.reln))
  }
}

impl fmt::Display for TypedDependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({}, {})", self.reln, self.gov, self.dep)
  }
}

fn format_error(literal: &str, reason: FormatReason) -> Error {
  Error::DependencyFormat {
    literal: literal.to_string(),
    reason,
  }
}

/// Reads `word-index` with trailing `'` marks counting the copy number
fn parse_word(literal: &str, s: &str) -> Result<IndexedWord> {
  let s = s.trim();
  let copy = s.len() - s.trim_end_matches('\'').len();
  let body = &s[..s.len() - copy];
  let dash = body
    .rfind('-')
    .ok_or_else(|| format_error(literal, FormatReason::MissingIndex))?;
  let (word, index) = (&body[..dash], &body[dash + 1..]);
  if index.is_empty() {
    return Err(format_error(literal, FormatReason::MissingIndex));
  }
  let index = index
    .parse::<usize>()
    .map_err(|_| format_error(literal, FormatReason::BadIndex))?;
  Ok(IndexedWord::new(word, "", index).with_copy(copy))
}

/// Reads one `reln(gov-i, dep-j)` triple. Relation names the catalog does
/// not know become new children of `dep`.
pub fn parse_dependency(s: &str, relations: &RelationSet) -> Result<TypedDependency> {
  let literal = s.trim();
  let open = literal
    .find('(')
    .ok_or_else(|| format_error(literal, FormatReason::MissingOpenParen))?;
  let inner = literal[open + 1..]
    .strip_suffix(')')
    .ok_or_else(|| format_error(literal, FormatReason::MissingCloseParen))?;
  let comma = inner
    .find(", ")
    .ok_or_else(|| format_error(literal, FormatReason::MissingComma))?;
  let gov = parse_word(literal, &inner[..comma])?;
  let dep = parse_word(literal, &inner[comma + 2..])?;
  let reln = relations.value_of_or_new(literal[..open].trim());
  Ok(TypedDependency::new(reln, gov, dep))
}

/// Reads one triple per non-empty line
pub fn read_dependencies(s: &str, relations: &RelationSet) -> Result<Vec<TypedDependency>> {
  s.lines()
    .filter(|l| !l.trim().is_empty())
    .map(|l| parse_dependency(l, relations))
    .collect()
}

/// True iff at most one governor is never a dependent. `ROOT` counts like
/// any other governor, so a fragment hanging beside `root(ROOT-0, ...)`
/// makes the list disconnected.
pub fn is_connected(deps: &[TypedDependency]) -> bool {
  let dependents = deps.iter().map(|d| &d.dep).collect::<FxHashSet<_>>();
  let tops = deps
    .iter()
    .map(|d| &d.gov)
    .filter(|g| !dependents.contains(g))
    .collect::<FxHashSet<_>>();
  tops.len() <= 1
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::relation::RelationDef;

  fn relations() -> RelationSet {
    RelationSet::from_defs(&[
      RelationDef {
        short_name: "nsubj",
        long_name: "nominal subject",
        parent: "dep",
        source: None,
        patterns: &[],
      },
      RelationDef {
        short_name: "prep",
        long_name: "prepositional modifier",
        parent: "dep",
        source: None,
        patterns: &[],
      },
    ])
    .unwrap()
  }

  #[test]
  fn test_parse_and_display() {
    let rels = relations();
    let d = parse_dependency("nsubj(defeated-2, Clinton-1)", &rels).unwrap();
    assert_eq!(d.reln.short_name(), "nsubj");
    assert_eq!(d.gov.index, 2);
    assert_eq!(d.dep.word, "Clinton");
    assert_eq!(d.to_string(), "nsubj(defeated-2, Clinton-1)");

    let d = parse_dependency("prep_to(flew-2'', Serbia-7)", &rels).unwrap();
    assert_eq!(d.gov.copy, 2);
    assert_eq!(d.reln.specific(), Some("to"));
    assert_eq!(d.to_string(), "prep_to(flew-2'', Serbia-7)");

    let d = parse_dependency("root(ROOT-0, well-being-3)", &rels).unwrap();
    assert!(d.gov.is_root());
    assert_eq!(d.dep.word, "well-being");

    let d = parse_dependency("punct(said-2, ,-3)", &rels).unwrap();
    assert_eq!(d.dep.word, ",");
    assert_eq!(d.reln.parent().unwrap().short_name(), "dep");
  }

  #[test]
  fn test_format_errors() {
    let rels = relations();
    let reason = |s: &str| match parse_dependency(s, &rels) {
      Err(Error::DependencyFormat { reason, literal }) => {
        assert_eq!(literal, s);
        reason
      }
      other => panic!("expected a format error, got {:?}", other),
    };
    assert_eq!(reason("nsubj defeated-2, Clinton-1)"), FormatReason::MissingOpenParen);
    assert_eq!(reason("nsubj(defeated-2, Clinton-1"), FormatReason::MissingCloseParen);
    assert_eq!(reason("nsubj(defeated-2 Clinton-1)"), FormatReason::MissingComma);
    assert_eq!(reason("nsubj(defeated, Clinton-1)"), FormatReason::MissingIndex);
    assert_eq!(reason("nsubj(defeated-, Clinton-1)"), FormatReason::MissingIndex);
    assert_eq!(reason("nsubj(defeated-two, Clinton-1)"), FormatReason::BadIndex);
  }

  #[test]
  fn test_ordering_and_connectivity() {
    let rels = relations();
    let mut deps = read_dependencies(
      "nsubj(defeated-2, Clinton-1)\n\nroot(ROOT-0, defeated-2)\ndep(defeated-2, Dole-3)\n",
      &rels,
    )
    .unwrap();
    deps.sort();
    let printed = deps.iter().map(|d| d.to_string()).collect::<Vec<_>>();
    assert_eq!(
      printed,
      vec!["root(ROOT-0, defeated-2)", "nsubj(defeated-2, Clinton-1)", "dep(defeated-2, Dole-3)"]
    );
    assert!(is_connected(&deps));

    deps.push(parse_dependency("dep(big-5, honest-7)", &rels).unwrap());
    assert!(!is_connected(&deps));
  }

  #[test]
  fn test_connectivity_without_root_edge() {
    let rels = relations();
    let deps = read_dependencies("nsubj(left-2, He-1)
prep(left-2, at-3)", &rels).unwrap();
    assert!(is_connected(&deps));
    let deps = read_dependencies("nsubj(left-2, He-1)
prep(ran-5, at-6)", &rels).unwrap();
    assert!(!is_connected(&deps));
    assert!(is_connected(&[]));
  }
}
