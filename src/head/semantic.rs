use rustc_hash::FxHashSet;

use super::{Direction, HeadFinder, HeadRule, RuleHeadFinder};
use crate::error::Result;
use crate::pattern::{NodeMatcher, TreePattern};
use crate::tree::{NodeId, Tree};
use crate::utils::basic_category;

/// Tags that mark an auxiliary whatever the word
const UNAMBIGUOUS_AUXILIARY_TAGS: [&str; 4] = ["TO", "MD", "AUX", "AUXG"];

const VERBAL_TAGS: [&str; 10] = ["TO", "MD", "VB", "VBD", "VBP", "VBZ", "VBG", "VBN", "AUX", "AUXG"];

/// Name bound by the head override patterns
const HEAD: &str = "head";

/// Closed-class verb lists the semantic head finder consults
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryWords {
  /// Modals, `have`, `do`, `to` and friends
  pub auxiliaries: Vec<String>,
  /// Forms of `be` and `get` that build passives and progressives
  pub passive: Vec<String>,
  /// Forms of `be` that act as copulas
  pub copulas: Vec<String>,
}

impl AuxiliaryWords {
  pub fn new(auxiliaries: &[&str], passive: &[&str], copulas: &[&str]) -> Self {
    let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
    Self {
      auxiliaries: owned(auxiliaries),
      passive: owned(passive),
      copulas: owned(copulas),
    }
  }
}

/// Head finder that prefers content words: main verbs over auxiliaries and,
/// unless `copula_head` is set, predicates over copulas.
#[derive(Debug, Clone)]
pub struct SemanticHeadFinder {
  base: RuleHeadFinder,
  copula_head: bool,
  auxiliaries: FxHashSet<String>,
  passive: FxHashSet<String>,
  copulas: FxHashSet<String>,
  conjp_heads: Vec<TreePattern>,
  copula_question_heads: Vec<TreePattern>,
}

impl SemanticHeadFinder {
  pub fn new(base: RuleHeadFinder, words: &AuxiliaryWords, copula_head: bool) -> Result<Self> {
    let copula_re = format!(
      "/^(?i:{})$/",
      words
        .copulas
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
    );

    let conjp_heads = [
      "CONJP < (CC <: /^(?i:but|and)$/ $+ (RB=head <: /^(?i:not)$/))".to_string(),
      "CONJP < (CC <: /^(?i:but)$/ [ $+ (RB=head <: /^(?i:also|rather)$/) | $+ (ADVP=head <: (RB <: /^(?i:also|rather)$/)) ])".to_string(),
      "CONJP < (CC <: /^(?i:and)$/ [ $+ (RB=head <: /^(?i:yet)$/) | $+ (ADVP=head <: (RB <: /^(?i:yet)$/)) ])".to_string(),
    ];
    // "what is wrong", "who am I to judge", "such a great idea this was"
    let copula_question_heads = [
      format!("SBARQ < (WHNP $++ (/^VB/ < {} $++ ADJP=head))", copula_re),
      format!("SBARQ < (WHNP=head $++ (/^VB/ < {} $+ NP !$++ ADJP))", copula_re),
      format!("SINV < (NP=head $++ (NP $++ (VP < (/^(?:VB|AUX)/ < {}))))", copula_re),
    ];

    Ok(Self {
      base,
      copula_head,
      auxiliaries: lowercase_set(&words.auxiliaries),
      passive: lowercase_set(&words.passive),
      copulas: if copula_head { FxHashSet::default() } else { lowercase_set(&words.copulas) },
      conjp_heads: compile_all(&conjp_heads)?,
      copula_question_heads: compile_all(&copula_question_heads)?,
    })
  }

  pub fn copula_head(&self) -> bool {
    self.copula_head
  }

  pub fn rules(&self) -> &RuleHeadFinder {
    &self.base
  }

  fn non_trivial_head(&self, tree: &Tree, node: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
    let category = basic_category(tree.label(node));

    if category == "CONJP" {
      if let Some(head) = first_bound(&self.conjp_heads, tree, node) {
        return Some(head);
      }
    }
    if (category == "SBARQ" || category == "SINV") && !self.copula_head {
      if let Some(head) = first_bound(&self.copula_question_heads, tree, node) {
        return Some(head);
      }
    }

    if matches!(category, "VP" | "SQ" | "SINV") {
      let kids = tree.children(node);
      let filtered = kids
        .iter()
        .copied()
        .filter(|&k| {
          let label = tree.label(k);
          !label.contains("-TMP") && !label.contains("-ADV")
        })
        .collect::<Vec<_>>();

      if self.has_verbal_auxiliary(tree, kids, &self.auxiliaries, true)
        || self.has_passive_progressive_auxiliary(tree, kids)
      {
        let rule = HeadRule::new(Direction::Left, &["VP", "ADJP"]);
        if let Some(head) = self.base.traverse_locate(tree, &filtered, &rule, false) {
          return Some(head);
        }
      }

      if self.has_verbal_auxiliary(tree, kids, &self.copulas, false)
        && !is_existential(tree, node, parent)
        && !is_wh_question(tree, node, parent)
      {
        let predicates = ["VP", "ADJP", "NP", "WHADJP", "WHNP"];
        let rule = if category == "SQ" {
          HeadRule::new(Direction::Right, &predicates)
        } else {
          HeadRule::new(Direction::Left, &predicates)
        };
        let mut head = self.base.traverse_locate(tree, &filtered, &rule, false);
        // in SQ an NP is only predicative if another NP precedes it
        if let Some(h) = head {
          if category == "SQ" && tree.label(h).starts_with("NP") {
            let another = kids
              .iter()
              .take_while(|&&k| k != h)
              .any(|&k| tree.label(k).starts_with("NP"));
            if !another {
              head = None;
            }
          }
        }
        if head.is_some() {
          return head;
        }
      }
    }

    let head = self.base.determine_non_trivial_head(tree, node)?;
    Some(self.repair_punctuation_head(tree, node, head))
  }

  fn has_verbal_auxiliary(&self, tree: &Tree, kids: &[NodeId], words: &FxHashSet<String>, tag_only: bool) -> bool {
    kids.iter().any(|&kid| {
      if !tree.is_preterminal(kid) {
        return false;
      }
      let tag = basic_category(tree.label(kid));
      let word = tree.word(tree.children(kid)[0]).to_lowercase();
      (tag_only && UNAMBIGUOUS_AUXILIARY_TAGS.contains(&tag))
        || (VERBAL_TAGS.contains(&tag) && words.contains(&word))
    })
  }

  /// A form of `be`/`get` followed by a VP built on a participle
  fn has_passive_progressive_auxiliary(&self, tree: &Tree, kids: &[NodeId]) -> bool {
    if !self.has_verbal_auxiliary(tree, kids, &self.passive, false) {
      return false;
    }
    let participle = |vp: NodeId| {
      tree
        .children(vp)
        .iter()
        .any(|&k| matches!(tree.label(k), "VBN" | "VBD" | "VBG"))
    };
    kids
      .iter()
      .filter(|&&k| basic_category(tree.label(k)) == "VP")
      .any(|&vp| {
        participle(vp)
          || tree
            .children(vp)
            .iter()
            .any(|&k| basic_category(tree.label(k)) == "VP" && participle(k))
      })
  }

  /// A phrase headed by a punctuation mark takes its first other child instead
  fn repair_punctuation_head(&self, tree: &Tree, node: NodeId, head: NodeId) -> NodeId {
    let is_punct = |n: NodeId| tree.is_preterminal(n) && self.base.rules().is_avoided(tree.label(n));
    if !is_punct(head) {
      return head;
    }
    tree
      .children(node)
      .iter()
      .copied()
      .find(|&k| !is_punct(k))
      .unwrap_or(head)
  }
}

impl HeadFinder for SemanticHeadFinder {
  fn determine_head(&self, tree: &Tree, node: NodeId, parent: Option<NodeId>) -> Option<NodeId> {
    if tree.is_leaf(node) {
      return None;
    }
    match tree.children(node) {
      [only] => Some(*only),
      _ => self.non_trivial_head(tree, node, parent),
    }
  }
}

fn lowercase_set(words: &[String]) -> FxHashSet<String> {
  words.iter().map(|w| w.to_lowercase()).collect()
}

fn compile_all(sources: &[String]) -> Result<Vec<TreePattern>> {
  sources.iter().map(|s| TreePattern::compile(s)).collect()
}

fn first_bound(patterns: &[TreePattern], tree: &Tree, node: NodeId) -> Option<NodeId> {
  patterns
    .iter()
    .find_map(|p| p.bound_nodes(tree, node, HEAD).first().copied())
}

fn has_ex_child(tree: &Tree, node: NodeId) -> bool {
  tree.children(node).iter().any(|&k| tree.label(k) == "EX")
}

/// "there is a dog": the VP's left sisters (or the SQ's non-verb children)
/// contain an existential `there`
fn is_existential(tree: &Tree, node: NodeId, parent: Option<NodeId>) -> bool {
  let category = basic_category(tree.label(node));
  match (category, parent) {
    ("VP", Some(parent)) => tree
      .children(parent)
      .iter()
      .take_while(|&&k| k != node)
      .any(|&k| tree.label(k) == "EX" || (basic_category(tree.label(k)) == "NP" && has_ex_child(tree, k))),
    ("SQ", _) => tree
      .children(node)
      .iter()
      .filter(|&&k| !tree.label(k).starts_with("VB"))
      .any(|&k| tree.label(k) == "EX" || has_ex_child(tree, k)),
    _ => false,
  }
}

/// An SQ directly under an SBARQ with a WH phrase
fn is_wh_question(tree: &Tree, node: NodeId, parent: Option<NodeId>) -> bool {
  let Some(parent) = parent else { return false };
  tree.label(node).starts_with("SQ")
    && basic_category(tree.label(parent)) == "SBARQ"
    && tree
      .children(parent)
      .iter()
      .any(|&k| tree.label(k).starts_with("WH"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::head::HeadRules;

  fn finder(copula_head: bool) -> SemanticHeadFinder {
    let mut rules = HeadRules::new(&[",", "."]);
    rules.insert("S", vec![HeadRule::new(Direction::Left, &["VP", "S"])]);
    rules.insert(
      "VP",
      vec![HeadRule::new(Direction::Left, &["TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "NP"])],
    );
    rules.insert("ADJP", vec![HeadRule::new(Direction::RightDis, &["JJ"])]);
    rules.insert("NP", vec![HeadRule::new(Direction::RightDis, &["NN", "NNP", "PRP"])]);
    rules.insert("CONJP", vec![HeadRule::new(Direction::Right, &["CC", "RB", "IN"])]);
    let words = AuxiliaryWords::new(&["will", "has", "to"], &["is", "was", "be", "got"], &["is", "was", "be"]);
    SemanticHeadFinder::new(RuleHeadFinder::new(rules), &words, copula_head).unwrap()
  }

  fn root_head(hf: &SemanticHeadFinder, s: &str) -> String {
    let mut t = Tree::from_syntree(&s.parse().unwrap()).unwrap();
    t.percolate_heads(hf).unwrap();
    let h = t.head_word(t.root()).unwrap();
    t.word(h).to_string()
  }

  #[test]
  fn test_main_verb_over_auxiliary() {
    let hf = finder(false);
    assert_eq!(
      root_head(&hf, "(ROOT (S (NP (PRP He)) (VP (MD will) (VP (VB go)))))"),
      "go"
    );
    assert_eq!(
      root_head(&hf, "(ROOT (S (NP (NNP Dole)) (VP (VBD was) (VP (VBN defeated)))))"),
      "defeated"
    );
  }

  #[test]
  fn test_copula() {
    let s = "(ROOT (S (NP (NNP Bill)) (VP (VBZ is) (ADJP (JJ big) (CC and) (JJ honest)))))";
    assert_eq!(root_head(&finder(false), s), "big");
    assert_eq!(root_head(&finder(true), s), "is");
  }

  #[test]
  fn test_existential_keeps_verb() {
    let s = "(ROOT (S (NP (EX There)) (VP (VBZ is) (NP (DT a) (NN dog)))))";
    assert_eq!(root_head(&finder(false), s), "is");
  }

  #[test]
  fn test_conjp() {
    let hf = finder(false);
    let mut t = Tree::from_syntree(
      &"(ROOT (NP (NP (NNP Bill)) (CONJP (CC but) (RB not)) (NP (NNP Dole))))".parse().unwrap(),
    )
    .unwrap();
    t.percolate_heads(&hf).unwrap();
    let conjp = t.node_ids().find(|&n| t.label(n) == "CONJP").unwrap();
    assert_eq!(t.word(t.head_word(conjp).unwrap()), "not");
  }
}
