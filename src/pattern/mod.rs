//! A small tree-pattern language in the style of tregex.
//!
//! A pattern describes a node and the relations it must stand in to other
//! nodes, e.g. `VP < (NP=target !$+ NP)`: a VP with a child NP that is not
//! immediately followed by another NP. Named nodes (`=target`) are bound
//! during matching and can be read back with [`NodeMatcher::bound_nodes`].
//!
//! Node descriptions:
//! - `__` matches anything
//! - `NP|WHNP` matches an exact label, `@NP` the basic category
//!   (function tags ignored)
//! - `/^VB/` matches the full label against a regex
//! - a leading `!` negates the description
//!
//! Relations (`A rel B`):
//! `<` child, `<<` descendant, `>` parent, `>>` ancestor, `<,` first child,
//! `<-` last child, `<:` only child, `<#` head child, `>#` A is the head child
//! of B, `$` sister, `$+`/`$-` immediately right/left sister, `$++`/`$--`
//! some right/left sister, `.`/`,` B immediately follows/precedes A in the
//! word order. A relation prefixed with `!` must not hold; with `?` it is
//! optional. `[ ... | ... ]` is a disjunction of relation groups.

mod parse;

use regex::Regex;

use crate::error::{Error, Result};
use crate::tree::{NodeId, Tree};
use crate::utils::basic_category;

/// Name of the node a grammatical relation extracts
pub const TARGET: &str = "target";

/// Matching against a tree node, yielding bound sub-nodes
pub trait NodeMatcher {
  /// Does the pattern match with its root at `node`?
  fn matches_at(&self, tree: &Tree, node: NodeId) -> bool;

  /// Every node bound to `name` over all matches rooted at `node`, in
  /// discovery order without duplicates
  fn bound_nodes(&self, tree: &Tree, node: NodeId, name: &str) -> Vec<NodeId>;
}

#[derive(Debug, Clone)]
pub struct TreePattern {
  source: String,
  root: NodeDesc,
  names: Vec<String>,
}

#[derive(Debug, Clone)]
struct NodeDesc {
  label: LabelSpec,
  negated: bool,
  slot: Option<usize>,
  constraint: Option<Constraint>,
}

#[derive(Debug, Clone)]
enum LabelSpec {
  Any,
  Names(Vec<NameSpec>),
  Regex(Regex),
}

#[derive(Debug, Clone)]
struct NameSpec {
  basic: bool,
  name: String,
}

#[derive(Debug, Clone)]
enum Constraint {
  And(Vec<Constraint>),
  Or(Vec<Constraint>),
  Rel {
    relation: Relation,
    negated: bool,
    optional: bool,
    node: Box<NodeDesc>,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
  Child,
  Descendant,
  Parent,
  Ancestor,
  FirstChild,
  LastChild,
  OnlyChild,
  HeadChild,
  HeadOf,
  Sister,
  ImmediateRightSister,
  ImmediateLeftSister,
  RightSister,
  LeftSister,
  ImmediatelyPrecedes,
  ImmediatelyFollows,
}

impl Relation {
  fn from_token(tok: &str) -> Option<Self> {
    Some(match tok {
      "<" => Self::Child,
      "<<" => Self::Descendant,
      ">" => Self::Parent,
      ">>" => Self::Ancestor,
      "<," => Self::FirstChild,
      "<-" => Self::LastChild,
      "<:" => Self::OnlyChild,
      "<#" => Self::HeadChild,
      ">#" => Self::HeadOf,
      "$" => Self::Sister,
      "$+" => Self::ImmediateRightSister,
      "$-" => Self::ImmediateLeftSister,
      "$++" => Self::RightSister,
      "$--" => Self::LeftSister,
      "." => Self::ImmediatelyPrecedes,
      "," => Self::ImmediatelyFollows,
      _ => return None,
    })
  }

  /// Nodes B such that `node rel B`
  fn candidates(self, tree: &Tree, node: NodeId) -> Vec<NodeId> {
    match self {
      Self::Child => tree.children(node).to_vec(),
      Self::Descendant => tree.descendants(node),
      Self::Parent => tree.parent(node).into_iter().collect(),
      Self::Ancestor => {
        let mut out = Vec::new();
        let mut cur = tree.parent(node);
        while let Some(p) = cur {
          out.push(p);
          cur = tree.parent(p);
        }
        out
      }
      Self::FirstChild => tree.children(node).first().copied().into_iter().collect(),
      Self::LastChild => tree.children(node).last().copied().into_iter().collect(),
      Self::OnlyChild => match tree.children(node) {
        [only] => vec![*only],
        _ => Vec::new(),
      },
      Self::HeadChild => tree.head_child(node).into_iter().collect(),
      Self::HeadOf => tree
        .parent(node)
        .filter(|&p| tree.head_child(p) == Some(node))
        .into_iter()
        .collect(),
      Self::Sister => {
        let (kids, pos) = sisters(tree, node);
        kids
          .iter()
          .enumerate()
          .filter(|&(i, _)| i != pos)
          .map(|(_, &k)| k)
          .collect()
      }
      Self::ImmediateRightSister => {
        let (kids, pos) = sisters(tree, node);
        kids.get(pos + 1).copied().into_iter().collect()
      }
      Self::ImmediateLeftSister => {
        let (kids, pos) = sisters(tree, node);
        if pos > 0 { vec![kids[pos - 1]] } else { Vec::new() }
      }
      Self::RightSister => {
        let (kids, pos) = sisters(tree, node);
        kids.iter().skip(pos + 1).copied().collect()
      }
      Self::LeftSister => {
        let (kids, pos) = sisters(tree, node);
        kids[..pos.min(kids.len())].to_vec()
      }
      Self::ImmediatelyPrecedes => {
        let end = tree.span(node).1;
        tree.node_ids().filter(|&n| tree.span(n).0 == end + 1).collect()
      }
      Self::ImmediatelyFollows => {
        let start = tree.span(node).0;
        tree
          .node_ids()
          .filter(|&n| tree.span(n).1 + 1 == start)
          .collect()
      }
    }
  }
}

/// The children of `node`'s parent and `node`'s position among them
fn sisters(tree: &Tree, node: NodeId) -> (&[NodeId], usize) {
  match tree.parent(node) {
    Some(p) => {
      let kids = tree.children(p);
      let pos = kids.iter().position(|&k| k == node).unwrap_or(0);
      (kids, pos)
    }
    None => (&[], 0),
  }
}

type Bindings = Vec<Option<NodeId>>;

impl NodeDesc {
  fn label_matches(&self, tree: &Tree, node: NodeId) -> bool {
    let label = tree.label(node);
    let matched = match &self.label {
      LabelSpec::Any => true,
      LabelSpec::Names(names) => names.iter().any(|n| {
        if n.basic {
          basic_category(label) == n.name
        } else {
          label == n.name
        }
      }),
      LabelSpec::Regex(re) => re.is_match(label),
    };
    matched != self.negated
  }
}

impl TreePattern {
  pub fn compile(source: &str) -> Result<Self> {
    parse::compile(source).map_err(|message| Error::Pattern {
      pattern: source.to_string(),
      message,
    })
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  fn fresh_bindings(&self) -> Bindings {
    vec![None; self.names.len()]
  }

  fn match_node(&self, desc: &NodeDesc, tree: &Tree, node: NodeId, mut b: Bindings) -> Vec<Bindings> {
    if !desc.label_matches(tree, node) {
      return Vec::new();
    }
    if let Some(slot) = desc.slot {
      match b[slot] {
        Some(bound) if bound != node => return Vec::new(),
        _ => b[slot] = Some(node),
      }
    }
    match &desc.constraint {
      None => vec![b],
      Some(c) => self.eval(c, tree, node, b),
    }
  }

  fn eval(&self, c: &Constraint, tree: &Tree, node: NodeId, b: Bindings) -> Vec<Bindings> {
    match c {
      Constraint::And(clauses) => {
        let mut results = vec![b];
        for clause in clauses {
          results = results
            .into_iter()
            .flat_map(|b| self.eval(clause, tree, node, b))
            .collect();
          if results.is_empty() {
            break;
          }
        }
        results
      }
      Constraint::Or(branches) => branches
        .iter()
        .flat_map(|branch| self.eval(branch, tree, node, b.clone()))
        .collect(),
      Constraint::Rel {
        relation,
        negated,
        optional,
        node: child,
      } => {
        let mut out = Vec::new();
        for cand in relation.candidates(tree, node) {
          out.extend(self.match_node(child, tree, cand, b.clone()));
          if *negated && !out.is_empty() {
            break;
          }
        }
        if *negated {
          if out.is_empty() { vec![b] } else { Vec::new() }
        } else if *optional && out.is_empty() {
          vec![b]
        } else {
          out
        }
      }
    }
  }

  fn all_matches(&self, tree: &Tree, node: NodeId) -> Vec<Bindings> {
    self.match_node(&self.root, tree, node, self.fresh_bindings())
  }
}

impl NodeMatcher for TreePattern {
  fn matches_at(&self, tree: &Tree, node: NodeId) -> bool {
    !self.all_matches(tree, node).is_empty()
  }

  fn bound_nodes(&self, tree: &Tree, node: NodeId, name: &str) -> Vec<NodeId> {
    let Some(slot) = self.names.iter().position(|n| n == name) else {
      return Vec::new();
    };
    let mut out = Vec::new();
    for b in self.all_matches(tree, node) {
      if let Some(bound) = b[slot] {
        if !out.contains(&bound) {
          out.push(bound);
        }
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::head::{Direction, HeadRule, HeadRules, RuleHeadFinder};

  fn tree(s: &str) -> Tree {
    let mut rules = HeadRules::new(&[]);
    rules.insert("S", vec![HeadRule::new(Direction::Left, &["VP"])]);
    rules.insert("VP", vec![HeadRule::new(Direction::Left, &["VBD", "VBZ"])]);
    rules.insert("NP", vec![HeadRule::new(Direction::RightDis, &["NN", "NNP"])]);
    let mut t = Tree::from_syntree(&s.parse().unwrap()).unwrap();
    t.percolate_heads(&RuleHeadFinder::new(rules)).unwrap();
    t
  }

  fn words(t: &Tree, nodes: &[NodeId]) -> Vec<String> {
    nodes
      .iter()
      .map(|&n| {
        let h = t.head_word(n).unwrap();
        t.word(h).to_string()
      })
      .collect()
  }

  fn find(t: &Tree, label: &str) -> NodeId {
    t.node_ids().find(|&n| t.label(n) == label).unwrap()
  }

  #[test]
  fn test_child_and_sister() {
    let t = tree("(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))");
    let p = TreePattern::compile("S < (NP=target $++ VP)").unwrap();
    let s = find(&t, "S");
    assert_eq!(words(&t, &p.bound_nodes(&t, s, TARGET)), vec!["Clinton"]);

    let p = TreePattern::compile("VP < (/^VB/ $+ NP=target)").unwrap();
    let vp = find(&t, "VP");
    assert_eq!(words(&t, &p.bound_nodes(&t, vp, TARGET)), vec!["Dole"]);
    assert!(!p.matches_at(&t, s));
  }

  #[test]
  fn test_negation_and_words() {
    let t = tree("(ROOT (S (NP (EX There)) (VP (VBZ is) (NP (DT a) (NN dog)))))");
    let s = find(&t, "S");
    let subj = TreePattern::compile("S < (NP=target !< EX)").unwrap();
    assert!(subj.bound_nodes(&t, s, TARGET).is_empty());

    let expl = TreePattern::compile("S < (NP=target < EX)").unwrap();
    assert_eq!(expl.bound_nodes(&t, s, TARGET).len(), 1);

    let cop = TreePattern::compile("VP < (/^VB/=target < /^(?i:is|was)$/)").unwrap();
    let vp = find(&t, "VP");
    assert_eq!(words(&t, &cop.bound_nodes(&t, vp, TARGET)), vec!["is"]);
  }

  #[test]
  fn test_disjunction_and_head() {
    let t = tree("(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))");
    let vp = find(&t, "VP");
    let p = TreePattern::compile("VP [ < (NN=target) | < (NP=target <# NNP) ]").unwrap();
    assert_eq!(words(&t, &p.bound_nodes(&t, vp, TARGET)), vec!["Dole"]);
    let s = find(&t, "S");
    let head = TreePattern::compile("S <# VP").unwrap();
    assert!(head.matches_at(&t, s));
    let optional = TreePattern::compile("S ?< (ADVP=target) < VP").unwrap();
    assert!(optional.matches_at(&t, s));
    assert!(optional.bound_nodes(&t, s, TARGET).is_empty());
  }

  #[test]
  fn test_precedence() {
    let t = tree("(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))");
    let vbd = find(&t, "VBD");
    let p = TreePattern::compile("VBD . (NP=target)").unwrap();
    assert_eq!(words(&t, &p.bound_nodes(&t, vbd, TARGET)), vec!["Dole"]);
    let p = TreePattern::compile("VBD , NNP=target").unwrap();
    assert_eq!(words(&t, &p.bound_nodes(&t, vbd, TARGET)), vec!["Clinton"]);
  }

  #[test]
  fn test_basic_category_names() {
    let t = tree("(ROOT (S (NP (NNP Clinton)) (VP (VBD left) (NP-TMP (NN today)))))");
    let vp = find(&t, "VP");
    let exact = TreePattern::compile("VP < NP=target").unwrap();
    assert!(exact.bound_nodes(&t, vp, TARGET).is_empty());
    let basic = TreePattern::compile("VP < @NP=target").unwrap();
    assert_eq!(basic.bound_nodes(&t, vp, TARGET).len(), 1);
  }

  #[test]
  fn test_grouped_node_relations() {
    let t = tree("(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))");
    let s = find(&t, "S");
    let p = TreePattern::compile("S < ((NP|WHNP=target !< EX) $++ VP)").unwrap();
    assert_eq!(words(&t, &p.bound_nodes(&t, s, TARGET)), vec!["Clinton"]);
    let p = TreePattern::compile("S < ((NP=target !< EX) $++ ADVP)").unwrap();
    assert!(p.bound_nodes(&t, s, TARGET).is_empty());
  }

  #[test]
  fn test_bad_patterns() {
    assert!(matches!(TreePattern::compile("VP < (NP"), Err(Error::Pattern { .. })));
    assert!(TreePattern::compile("VP <").is_err());
    assert!(TreePattern::compile("VP < /[/").is_err());
    assert!(TreePattern::compile("").is_err());
  }
}
