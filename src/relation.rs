//! Grammatical relations and the catalog that holds them.
//!
//! Relations form a single-parent hierarchy rooted at `dep`. The catalog is
//! built once from a declarative table; only the parameterized families
//! (`prep_X`, `prepc_X`, `conj_X`) grow afterwards, one shared instance per
//! word.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pattern::{NodeMatcher, TARGET, TreePattern};
use crate::tree::{NodeId, Tree};

pub type Reln = Arc<GrammaticalRelation>;

pub const DEPENDENT: &str = "dep";
pub const ROOT: &str = "root";

pub struct GrammaticalRelation {
  short_name: String,
  long_name: String,
  parent: Option<Reln>,
  /// Categories this relation may be read off of
  source: Option<Regex>,
  patterns: Vec<TreePattern>,
  /// The word of a family member, e.g. `of` in `prep_of`
  specific: Option<String>,
}

impl GrammaticalRelation {
  pub fn new(short_name: &str, long_name: &str, parent: Option<Reln>) -> Self {
    Self {
      short_name: short_name.to_string(),
      long_name: long_name.to_string(),
      parent,
      source: None,
      patterns: Vec::new(),
      specific: None,
    }
  }

  fn family_member(base: &Self, parent: Reln, specific: &str) -> Self {
    Self {
      short_name: base.short_name.clone(),
      long_name: format!("{}_{}", base.long_name, specific),
      parent: Some(parent),
      source: None,
      patterns: Vec::new(),
      specific: Some(specific.to_string()),
    }
  }

  pub fn short_name(&self) -> &str {
    &self.short_name
  }

  pub fn long_name(&self) -> &str {
    &self.long_name
  }

  pub fn parent(&self) -> Option<&Reln> {
    self.parent.as_ref()
  }

  pub fn specific(&self) -> Option<&str> {
    self.specific.as_deref()
  }

  pub fn patterns(&self) -> &[TreePattern] {
    &self.patterns
  }

  /// True for the plain relation `short`, not a family member of it
  pub fn is(&self, short: &str) -> bool {
    self.specific.is_none() && self.short_name == short
  }

  /// Is `self` reachable from `other` by following zero or more parent links?
  pub fn is_ancestor(&self, other: &GrammaticalRelation) -> bool {
    let mut cur = Some(other);
    while let Some(r) = cur {
      if r == self {
        return true;
      }
      cur = r.parent.as_deref();
    }
    false
  }

  /// May this relation be read off a node labelled `label`?
  pub fn is_applicable(&self, label: &str) -> bool {
    self.source.as_ref().is_none_or(|re| re.is_match(label))
  }

  /// Nodes related to `node` by this relation, pattern by pattern, without
  /// duplicates
  pub fn related_nodes(&self, tree: &Tree, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for pattern in &self.patterns {
      for target in pattern.bound_nodes(tree, node, TARGET) {
        if !out.contains(&target) {
          out.push(target);
        }
      }
    }
    out
  }
}

impl PartialEq for GrammaticalRelation {
  fn eq(&self, other: &Self) -> bool {
    self.short_name == other.short_name && self.specific == other.specific
  }
}

impl Eq for GrammaticalRelation {}

impl Hash for GrammaticalRelation {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.short_name.hash(state);
    self.specific.hash(state);
  }
}

impl PartialOrd for GrammaticalRelation {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for GrammaticalRelation {
  fn cmp(&self, other: &Self) -> Ordering {
    self.to_string().cmp(&other.to_string())
  }
}

impl fmt::Display for GrammaticalRelation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.specific {
      Some(s) => write!(f, "{}_{}", self.short_name, s),
      None => write!(f, "{}", self.short_name),
    }
  }
}

impl fmt::Debug for GrammaticalRelation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self)
  }
}

/// One row of a relation table
#[derive(Debug, Clone, Copy)]
pub struct RelationDef {
  pub short_name: &'static str,
  pub long_name: &'static str,
  pub parent: &'static str,
  /// Regex over the governor's label, anchored at both ends
  pub source: Option<&'static str>,
  pub patterns: &'static [&'static str],
}

/// The parameterized relation families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
  Prep,
  PrepC,
  Conj,
  /// Names met while reading serialized dependencies that the catalog
  /// does not know, kept as children of `dep`
  Unknown,
}

/// An ordered relation catalog
pub struct RelationSet {
  dependent: Reln,
  root: Reln,
  values: Vec<Reln>,
  by_name: FxHashMap<String, Reln>,
  families: RwLock<FxHashMap<(Family, String), Reln>>,
  walk_lock: Mutex<()>,
}

impl RelationSet {
  /// Builds the catalog in table order. Every parent must appear before
  /// its children; `dep` is implicit.
  pub fn from_defs(defs: &[RelationDef]) -> Result<Self> {
    let dependent = Arc::new(GrammaticalRelation::new(DEPENDENT, "dependent", None));
    let root = Arc::new(GrammaticalRelation::new(ROOT, "root", None));
    let mut by_name = FxHashMap::default();
    by_name.insert(DEPENDENT.to_string(), dependent.clone());
    let mut values = vec![dependent.clone()];

    for def in defs {
      let parent = by_name.get(def.parent).cloned().ok_or_else(|| Error::Pattern {
        pattern: def.short_name.to_string(),
        message: format!("unknown parent relation {}", def.parent),
      })?;
      let source = def
        .source
        .map(|s| {
          Regex::new(&format!("^(?:{})$", s)).map_err(|e| Error::Pattern {
            pattern: s.to_string(),
            message: e.to_string(),
          })
        })
        .transpose()?;
      let patterns = def
        .patterns
        .iter()
        .map(|p| TreePattern::compile(p))
        .collect::<Result<Vec<_>>>()?;
      let reln = Arc::new(GrammaticalRelation {
        short_name: def.short_name.to_string(),
        long_name: def.long_name.to_string(),
        parent: Some(parent),
        source,
        patterns,
        specific: None,
      });
      by_name.insert(def.short_name.to_string(), reln.clone());
      values.push(reln);
    }

    Ok(Self {
      dependent,
      root,
      values,
      by_name,
      families: RwLock::new(FxHashMap::default()),
      walk_lock: Mutex::new(()),
    })
  }

  /// `dep`, the root of the hierarchy
  pub fn dependent(&self) -> &Reln {
    &self.dependent
  }

  /// The sentinel for the sentence root edge
  pub fn root(&self) -> &Reln {
    &self.root
  }

  /// The catalog in table order, `dep` first
  pub fn values(&self) -> &[Reln] {
    &self.values
  }

  /// Relations that may be read off a node labelled `label`, in catalog order
  pub fn applicable<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Reln> + 'a {
    self.values.iter().filter(move |r| r.is_applicable(label))
  }

  /// Looks a relation up by its printed name. Family names (`prep_of`)
  /// resolve to the shared family member. Unknown names give `None`.
  pub fn value_of(&self, name: &str) -> Option<Reln> {
    if name == ROOT {
      return Some(self.root.clone());
    }
    if let Some(r) = self.by_name.get(name) {
      return Some(r.clone());
    }
    for (prefix, family) in [("prepc_", Family::PrepC), ("prep_", Family::Prep), ("conj_", Family::Conj)] {
      if let Some(word) = name.strip_prefix(prefix) {
        if !word.is_empty() {
          return self.family(family, word);
        }
      }
    }
    None
  }

  /// Like `value_of`, but an unknown name becomes a new child of `dep`
  pub fn value_of_or_new(&self, name: &str) -> Reln {
    match self.value_of(name) {
      Some(r) => r,
      None => self.member(Family::Unknown, name, self.dependent.clone(), |parent| {
        GrammaticalRelation::new(name, name, Some(parent))
      }),
    }
  }

  pub fn get_prep(&self, word: &str) -> Option<Reln> {
    self.family(Family::Prep, word)
  }

  pub fn get_prepc(&self, word: &str) -> Option<Reln> {
    self.family(Family::PrepC, word)
  }

  pub fn get_conj(&self, word: &str) -> Option<Reln> {
    self.family(Family::Conj, word)
  }

  fn family(&self, family: Family, word: &str) -> Option<Reln> {
    let (base, parent) = match family {
      Family::Prep => ("prep", "prep"),
      Family::PrepC => ("prepc", "prep"),
      Family::Conj => ("conj", "conj"),
      Family::Unknown => return None,
    };
    let parent = self.by_name.get(parent)?.clone();
    let base = GrammaticalRelation::new(base, base, None);
    Some(self.member(family, word, parent, |parent| {
      GrammaticalRelation::family_member(&base, parent, word)
    }))
  }

  /// The shared instance for `(family, word)`, created on first request.
  /// Concurrent first requests all get the instance of whoever inserted.
  fn member(
    &self,
    family: Family,
    word: &str,
    parent: Reln,
    make: impl FnOnce(Reln) -> GrammaticalRelation,
  ) -> Reln {
    let key = (family, word.to_string());
    if let Some(r) = self.families.read().get(&key) {
      return r.clone();
    }
    let mut families = self.families.write();
    families
      .entry(key)
      .or_insert_with(|| {
        let reln = Arc::new(make(parent));
        debug!(relation = %reln, "created relation family member");
        reln
      })
      .clone()
  }

  /// Serializes tree walks for callers that build structures concurrently
  pub fn walk_lock(&self) -> MutexGuard<'_, ()> {
    self.walk_lock.lock()
  }
}

impl fmt::Debug for RelationSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.values.iter()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DEFS: &[RelationDef] = &[
    RelationDef {
      short_name: "arg",
      long_name: "argument",
      parent: "dep",
      source: None,
      patterns: &[],
    },
    RelationDef {
      short_name: "subj",
      long_name: "subject",
      parent: "arg",
      source: None,
      patterns: &[],
    },
    RelationDef {
      short_name: "nsubj",
      long_name: "nominal subject",
      parent: "subj",
      source: Some("S|SQ"),
      patterns: &["S < (NP=target $++ VP)"],
    },
    RelationDef {
      short_name: "prep",
      long_name: "prepositional modifier",
      parent: "dep",
      source: None,
      patterns: &[],
    },
    RelationDef {
      short_name: "conj",
      long_name: "conj_collapsed",
      parent: "dep",
      source: None,
      patterns: &[],
    },
  ];

  #[test]
  fn test_hierarchy() {
    let set = RelationSet::from_defs(DEFS).unwrap();
    let nsubj = set.value_of("nsubj").unwrap();
    let subj = set.value_of("subj").unwrap();
    assert!(subj.is_ancestor(&nsubj));
    assert!(nsubj.is_ancestor(&nsubj));
    assert!(!nsubj.is_ancestor(&subj));
    assert!(set.dependent().is_ancestor(&nsubj));
    assert!(!set.dependent().is_ancestor(set.root()));
    assert!(nsubj.is_applicable("SQ"));
    assert!(!nsubj.is_applicable("SBAR"));
    assert!(set.value_of("nonesuch").is_none());
  }

  #[test]
  fn test_families_are_shared() {
    let set = RelationSet::from_defs(DEFS).unwrap();
    let a = set.get_prep("of").unwrap();
    let b = set.value_of("prep_of").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.to_string(), "prep_of");
    assert!(set.value_of("prep").unwrap().is_ancestor(&a));
    assert!(!a.is("prep"));
    let pc = set.get_prepc("of").unwrap();
    assert_ne!(a, pc);
    assert_eq!(set.value_of("conj_and").unwrap().parent().unwrap().short_name(), "conj");
  }

  #[test]
  fn test_concurrent_creation() {
    let set = RelationSet::from_defs(DEFS).unwrap();
    let found = std::thread::scope(|s| {
      let handles = (0..8)
        .map(|_| s.spawn(|| set.get_conj("but").unwrap()))
        .collect::<Vec<_>>();
      handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });
    assert!(found.iter().all(|r| Arc::ptr_eq(r, &found[0])));
  }

  #[test]
  fn test_unknown_names() {
    let set = RelationSet::from_defs(DEFS).unwrap();
    let r = set.value_of_or_new("frobnicate");
    assert_eq!(r.parent().unwrap().short_name(), DEPENDENT);
    assert!(Arc::ptr_eq(&r, &set.value_of_or_new("frobnicate")));
  }

  #[test]
  fn test_bad_parent() {
    let defs = [RelationDef {
      short_name: "x",
      long_name: "x",
      parent: "nope",
      source: None,
      patterns: &[],
    }];
    assert!(RelationSet::from_defs(&defs).is_err());
  }
}
