//! Building typed dependencies from a head-annotated tree.
//!
//! The tree is walked once. Every relation in the catalog that applies to a
//! phrase is matched against it, and each match becomes an edge between the
//! maximal projections of the two heads. The complete graph keeps every
//! edge; the basic graph keeps a conflict-free subset that forms a tree.

use tracing::{debug, trace};

use crate::dependency::{IndexedWord, TypedDependency};
use crate::error::Result;
use crate::graph::DirectedMultiGraph;
use crate::head::HeadFinder;
use crate::relation::{RelationSet, Reln};
use crate::syntree::SynTree;
use crate::tree::{NodeId, Tree};

/// Everything language-specific the builder and the collapser need
pub trait Language: Send + Sync {
  fn relations(&self) -> &RelationSet;

  fn head_finder(&self) -> &dyn HeadFinder;

  /// False for punctuation, which never takes part in a dependency
  fn accept(&self, word: &str, tag: &str) -> bool;

  /// Fix-ups applied to the basic dependencies before they are sorted
  fn post_process_dependencies(&self, _deps: &mut Vec<TypedDependency>) {}

  /// Extra dependencies added to the "all" list
  fn get_extras(&self, _deps: &mut Vec<TypedDependency>) {}

  /// Whether a complete-graph edge may be added as a tree extra
  fn extra_tree_dep_filter(&self, _dep: &TypedDependency) -> bool {
    true
  }

  /// Structural corrections run before collapsing
  fn correct_dependencies(&self, _deps: &mut Vec<TypedDependency>) {}

  /// Rewrites `deps` into collapsed form, optionally propagating
  /// dependencies over conjuncts and adding extras
  fn collapse_dependencies(&self, _deps: &mut Vec<TypedDependency>, _cc_process: bool, _include_extras: bool) {}

  /// Collapsing that keeps a tree a tree
  fn collapse_dependencies_tree(&self, _deps: &mut Vec<TypedDependency>) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
  /// Hold the catalog's walk lock while matching relations
  pub thread_safe: bool,
}

type Graph = DirectedMultiGraph<NodeId, Reln>;

/// The typed dependencies of one sentence
pub struct GrammaticalStructure<'l> {
  language: &'l dyn Language,
  tree: Tree,
  typed_dependencies: Vec<TypedDependency>,
  all_typed_dependencies: Vec<TypedDependency>,
}

impl<'l> GrammaticalStructure<'l> {
  pub fn new(tree: &SynTree<String, String>, language: &'l dyn Language) -> Result<Self> {
    Self::with_options(tree, language, BuildOptions::default())
  }

  pub fn with_options(tree: &SynTree<String, String>, language: &'l dyn Language, options: BuildOptions) -> Result<Self> {
    let mut tree = Tree::from_syntree(tree)?;
    tree.percolate_heads(language.head_finder())?;

    let mut builder = Builder {
      language,
      tree: &tree,
      basic: Graph::new(),
      complete: Graph::new(),
    };
    {
      let _guard = options.thread_safe.then(|| language.relations().walk_lock());
      builder.analyze_node(tree.root());
    }
    builder.attach_stranded_nodes(tree.root(), false);

    let typed_dependencies = builder.get_deps();
    let mut all_typed_dependencies = typed_dependencies.clone();
    builder.get_tree_deps(&mut all_typed_dependencies);
    language.get_extras(&mut all_typed_dependencies);
    all_typed_dependencies.sort();

    Ok(Self {
      language,
      tree,
      typed_dependencies,
      all_typed_dependencies,
    })
  }

  pub fn tree(&self) -> &Tree {
    &self.tree
  }

  /// Basic dependencies: a tree rooted at `ROOT-0`
  pub fn typed_dependencies(&self) -> Vec<TypedDependency> {
    self.dependencies(false)
  }

  /// Basic dependencies plus the extra edges read off the tree
  pub fn all_typed_dependencies(&self) -> Vec<TypedDependency> {
    self.dependencies(true)
  }

  /// Collapsed dependencies that still form a tree
  pub fn typed_dependencies_collapsed_tree(&self) -> Vec<TypedDependency> {
    let mut deps = self.dependencies(false);
    self.language.collapse_dependencies_tree(&mut deps);
    deps
  }

  pub fn typed_dependencies_collapsed(&self, include_extras: bool) -> Vec<TypedDependency> {
    let mut deps = self.dependencies(include_extras);
    self.language.collapse_dependencies(&mut deps, false, include_extras);
    deps
  }

  /// Collapsed dependencies with propagation over conjuncts
  pub fn typed_dependencies_cc_processed(&self, include_extras: bool) -> Vec<TypedDependency> {
    let mut deps = self.dependencies(include_extras);
    self.language.collapse_dependencies(&mut deps, true, include_extras);
    deps
  }

  /// A fresh copy, so collapsing never touches the stored lists
  fn dependencies(&self, include_extras: bool) -> Vec<TypedDependency> {
    let mut deps = if include_extras {
      self.all_typed_dependencies.clone()
    } else {
      self.typed_dependencies.clone()
    };
    self.language.correct_dependencies(&mut deps);
    deps
  }
}

struct Builder<'a> {
  language: &'a dyn Language,
  tree: &'a Tree,
  basic: Graph,
  complete: Graph,
}

impl Builder<'_> {
  fn head_word(&self, node: NodeId) -> IndexedWord {
    match self.tree.head_word(node) {
      Some(leaf) => IndexedWord::from_leaf(self.tree, leaf),
      None => IndexedWord::root(),
    }
  }

  fn accepts(&self, node: NodeId) -> bool {
    match self.tree.head_word(node) {
      Some(leaf) => self.language.accept(self.tree.word(leaf), self.tree.tag(leaf)),
      None => false,
    }
  }

  fn analyze_node(&mut self, t: NodeId) {
    let tree = self.tree;
    if !tree.is_phrasal(t) {
      return;
    }
    let language = self.language;
    let t_high = tree.highest_node_with_same_head(t);
    let relations = language.relations();
    for reln in relations.applicable(tree.label(t)) {
      for u in reln.related_nodes(tree, t) {
        let u_high = tree.highest_node_with_same_head(u);
        if u_high == t_high || !self.accepts(u_high) {
          continue;
        }
        self.complete.add(t_high, u_high, reln.clone());

        let parents = self.basic.parents(u_high);
        let free = parents.is_empty() || parents == [t_high];
        if free && !self.basic.has_path(u_high, t_high, true) {
          trace!(
            relation = %reln,
            gov = %self.head_word(t_high),
            dep = %self.head_word(u_high),
            "basic edge"
          );
          self.basic.add(t_high, u_high, reln.clone());
        }
      }
    }
    for &kid in tree.children(t) {
      self.analyze_node(kid);
    }
  }

  /// Links every constituent the relations missed to the nearest
  /// projection above it, as a plain `dep`
  fn attach_stranded_nodes(&mut self, t: NodeId, attach: bool) {
    let tree = self.tree;
    if tree.is_leaf(t) {
      return;
    }
    if attach && self.accepts(t) {
      if let Some(parent) = tree.parent(t) {
        let parent_head = tree.highest_node_with_same_head(parent);
        if !self.basic.is_edge(parent_head, t) && !self.basic.has_path(tree.root(), t, false) {
          debug!(
            gov = %self.head_word(parent_head),
            dep = %self.head_word(t),
            "attaching stranded node"
          );
          let dep = self.language.relations().dependent().clone();
          self.basic.add(parent_head, t, dep);
        }
      }
    }
    for &kid in tree.children(t) {
      let differs = tree.head_word(kid) != tree.head_word(t);
      self.attach_stranded_nodes(kid, differs);
    }
  }

  /// One dependency per governor/dependent pair of the basic graph, plus
  /// the root edge
  fn get_deps(&self) -> Vec<TypedDependency> {
    let mut deps = Vec::new();
    for (gov, dep, labels) in self.basic.edge_groups() {
      let reln = self.common_ancestor(labels);
      deps.push(TypedDependency::new(reln, self.head_word(gov), self.head_word(dep)));
    }

    let root = self.tree.root();
    let head = self
      .tree
      .head_word(root)
      .or_else(|| self.tree.leaves().first().copied());
    if let Some(head) = head {
      if self.language.accept(self.tree.word(head), self.tree.tag(head)) {
        let reln = self.language.relations().root().clone();
        deps.push(TypedDependency::new(reln, IndexedWord::root(), IndexedWord::from_leaf(self.tree, head)));
      }
    }

    self.language.post_process_dependencies(&mut deps);
    deps.sort();
    deps
  }

  /// The most specific of several labels on one edge. Labels are visited
  /// in name order starting from `dep`, so unrelated labels keep the first.
  fn common_ancestor(&self, labels: &[Reln]) -> Reln {
    let mut sorted = labels.to_vec();
    sorted.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    let mut best = self.language.relations().dependent().clone();
    for label in sorted {
      if best.is_ancestor(&label) {
        best = label;
      }
    }
    best
  }

  /// Adds the complete graph's edges that the basic list lacks
  fn get_tree_deps(&self, deps: &mut Vec<TypedDependency>) {
    for (gov, dep, labels) in self.complete.edge_groups() {
      for reln in remove_ancestors(labels) {
        let td = TypedDependency::new(reln, self.head_word(gov), self.head_word(dep));
        if !deps.contains(&td) && self.language.extra_tree_dep_filter(&td) {
          deps.push(td.extra());
        }
      }
    }
  }
}

/// Drops every label that is an ancestor of another label in the list
fn remove_ancestors(labels: &[Reln]) -> Vec<Reln> {
  labels
    .iter()
    .filter(|r| {
      !labels
        .iter()
        .any(|other| **r != *other && r.is_ancestor(other))
    })
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::head::{Direction, HeadRule, HeadRules, RuleHeadFinder};
  use crate::relation::RelationDef;

  struct Toy {
    relations: RelationSet,
    head_finder: RuleHeadFinder,
  }

  impl Language for Toy {
    fn relations(&self) -> &RelationSet {
      &self.relations
    }

    fn head_finder(&self) -> &dyn HeadFinder {
      &self.head_finder
    }

    fn accept(&self, word: &str, _tag: &str) -> bool {
      word != "."
    }
  }

  fn toy() -> Toy {
    let relations = RelationSet::from_defs(&[
      RelationDef {
        short_name: "arg",
        long_name: "argument",
        parent: "dep",
        source: None,
        patterns: &["S < NP=target"],
      },
      RelationDef {
        short_name: "nsubj",
        long_name: "nominal subject",
        parent: "arg",
        source: Some("S"),
        patterns: &["S < (NP=target $++ VP)"],
      },
      RelationDef {
        short_name: "dobj",
        long_name: "direct object",
        parent: "arg",
        source: Some("VP"),
        patterns: &["VP < NP=target"],
      },
    ])
    .unwrap();
    let mut rules = HeadRules::new(&["."]);
    rules.insert("S", vec![HeadRule::new(Direction::Left, &["VP"])]);
    rules.insert("VP", vec![HeadRule::new(Direction::Left, &["VBD"])]);
    rules.insert("NP", vec![HeadRule::new(Direction::RightDis, &["NN", "NNP"])]);
    Toy {
      relations,
      head_finder: RuleHeadFinder::new(rules),
    }
  }

  fn printed(deps: &[TypedDependency]) -> Vec<String> {
    deps.iter().map(|d| d.to_string()).collect()
  }

  #[test]
  fn test_basic_dependencies() {
    let lang = toy();
    let tree = "(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole))) (. .)))"
      .parse()
      .unwrap();
    let gs = GrammaticalStructure::new(&tree, &lang).unwrap();
    assert_eq!(
      printed(&gs.typed_dependencies()),
      vec![
        "root(ROOT-0, defeated-2)",
        "nsubj(defeated-2, Clinton-1)",
        "dobj(defeated-2, Dole-3)",
      ]
    );
    // the plain `arg` match on the subject is subsumed by `nsubj`
    assert_eq!(gs.all_typed_dependencies().len(), 3);
  }

  #[test]
  fn test_stranded_nodes_get_dep() {
    let lang = toy();
    let tree = "(ROOT (S (VP (VBD left) (ADVP (RB early)))))".parse().unwrap();
    let gs = GrammaticalStructure::new(&tree, &lang).unwrap();
    assert_eq!(
      printed(&gs.typed_dependencies()),
      vec!["root(ROOT-0, left-1)", "dep(left-1, early-2)"]
    );
  }

  #[test]
  fn test_thread_safe_build() {
    let lang = toy();
    let tree = "(ROOT (S (NP (NNP Clinton)) (VP (VBD left))))".parse().unwrap();
    let options = BuildOptions { thread_safe: true };
    let gs = GrammaticalStructure::with_options(&tree, &lang, options).unwrap();
    assert_eq!(gs.typed_dependencies().len(), 2);
  }

  #[test]
  fn test_empty_tree_is_fatal() {
    let lang = toy();
    let tree = "(ROOT (S (NP (NNP Clinton)) (VP (VBD left))))".parse().unwrap();
    assert!(GrammaticalStructure::new(&tree, &lang).is_ok());
    let empty = "(ROOT (-NONE- *))".parse().unwrap();
    assert!(GrammaticalStructure::new(&empty, &lang).is_err());
  }
}
