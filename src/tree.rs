use std::fmt;

use crate::error::{Error, Result};
use crate::head::HeadFinder;
use crate::syntree::SynTree;
use crate::utils::{basic_category, normalize_label};

/// Label of empty elements (traces, null complementizers), removed on import
pub const NONE_LABEL: &str = "-NONE-";

/// Index type for the tree arena. Ids are assigned in pre-order, so the
/// root is always `NodeId(0)` and a parent's id is smaller than its children's.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
pub struct TreeNode {
  pub label: String,
  pub children: Vec<NodeId>,
  pub parent: Option<NodeId>,
  /// 1-based position of a leaf among the leaves. For phrasal nodes this is
  /// the position of the head word once heads are percolated, 0 before.
  pub index: usize,
  pub head_child: Option<NodeId>,
  /// The leaf heading this node
  pub head_word: Option<NodeId>,
  /// The preterminal above `head_word`
  pub head_tag: Option<NodeId>,
  /// First and last leaf positions covered
  span: (usize, usize),
}

impl TreeNode {
  fn new(label: String, parent: Option<NodeId>) -> Self {
    Self {
      label,
      children: Vec::new(),
      parent,
      index: 0,
      head_child: None,
      head_word: None,
      head_tag: None,
      span: (0, 0),
    }
  }
}

/// The engine's own copy of a constituency tree. Nodes live in an arena and
/// are referred to by `NodeId`, which serves as node identity everywhere.
#[derive(Debug, Clone)]
pub struct Tree {
  nodes: Vec<TreeNode>,
  leaves: Vec<NodeId>,
}

impl Tree {
  /// Deep-copies a caller's tree. Empty elements are dropped, coordinations
  /// are normalized, function tags other than `-TMP`/`-ADV` are stripped,
  /// and leaves are indexed from 1.
  pub fn from_syntree(t: &SynTree<String, String>) -> Result<Self> {
    let pruned = prune_empty(t).ok_or(Error::EmptyTree)?;
    let normalized = normalize_coordination(pruned);
    let mut tree = Self {
      nodes: Vec::new(),
      leaves: Vec::new(),
    };
    tree.alloc_from(&normalized, None, true);
    if tree.leaves.is_empty() || tree.is_leaf(tree.root()) {
      return Err(Error::EmptyTree);
    }
    tree.index_spans(tree.root());
    Ok(tree)
  }

  fn alloc_from(&mut self, t: &SynTree<String, String>, parent: Option<NodeId>, is_root: bool) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    match t {
      SynTree::Leaf(w) => {
        let mut node = TreeNode::new(w.value.clone(), parent);
        node.index = self.leaves.len() + 1;
        self.nodes.push(node);
        self.leaves.push(id);
      }
      SynTree::Branch(cons, children) => {
        let label = if is_root && cons.value.is_empty() {
          crate::read_tree::ROOT_LABEL.to_string()
        } else {
          normalize_label(&cons.value)
        };
        self.nodes.push(TreeNode::new(label, parent));
        for child in children {
          let child_id = self.alloc_from(child, Some(id), false);
          self.get_mut(id).children.push(child_id);
        }
      }
    }
    id
  }

  fn index_spans(&mut self, id: NodeId) -> (usize, usize) {
    let span = if self.is_leaf(id) {
      let idx = self.get(id).index;
      (idx, idx)
    } else {
      let children = self.get(id).children.clone();
      let mut span = (usize::MAX, 0);
      for child in children {
        let (start, end) = self.index_spans(child);
        span = (span.0.min(start), span.1.max(end));
      }
      span
    };
    self.get_mut(id).span = span;
    span
  }

  pub fn root(&self) -> NodeId {
    NodeId(0)
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Get a node. Assumes valid, panics on OOB
  pub fn get(&self, id: NodeId) -> &TreeNode {
    self.nodes.get(id.0 as usize).expect("Invalid NodeId")
  }

  fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
    self.nodes.get_mut(id.0 as usize).expect("Invalid NodeId")
  }

  /// All node ids in pre-order
  pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
    (0..self.nodes.len() as u32).map(NodeId)
  }

  pub fn label(&self, id: NodeId) -> &str {
    &self.get(id).label
  }

  pub fn children(&self, id: NodeId) -> &[NodeId] {
    &self.get(id).children
  }

  pub fn parent(&self, id: NodeId) -> Option<NodeId> {
    self.get(id).parent
  }

  pub fn index(&self, id: NodeId) -> usize {
    self.get(id).index
  }

  /// First and last leaf positions under a node
  pub fn span(&self, id: NodeId) -> (usize, usize) {
    self.get(id).span
  }

  pub fn is_leaf(&self, id: NodeId) -> bool {
    self.get(id).children.is_empty()
  }

  pub fn is_preterminal(&self, id: NodeId) -> bool {
    let children = self.children(id);
    children.len() == 1 && self.is_leaf(children[0])
  }

  /// Neither a leaf nor a preterminal
  pub fn is_phrasal(&self, id: NodeId) -> bool {
    !self.is_leaf(id) && !self.is_preterminal(id)
  }

  pub fn leaves(&self) -> &[NodeId] {
    &self.leaves
  }

  /// The surface string of a leaf
  pub fn word(&self, leaf: NodeId) -> &str {
    self.label(leaf)
  }

  /// The part of speech of a leaf, the label of its preterminal
  pub fn tag(&self, leaf: NodeId) -> &str {
    self.parent(leaf).map(|p| self.label(p)).unwrap_or("")
  }

  /// Preterminals under `id`, left to right
  pub fn preterminal_yield(&self, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    self.collect_preterminals(id, &mut out);
    out
  }

  fn collect_preterminals(&self, id: NodeId, out: &mut Vec<NodeId>) {
    if self.is_preterminal(id) {
      out.push(id);
    } else {
      for &child in self.children(id) {
        self.collect_preterminals(child, out);
      }
    }
  }

  /// Every node strictly below `id`, in pre-order
  pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = self.children(id).iter().rev().copied().collect::<Vec<_>>();
    while let Some(n) = stack.pop() {
      out.push(n);
      stack.extend(self.children(n).iter().rev().copied());
    }
    out
  }

  pub fn head_child(&self, id: NodeId) -> Option<NodeId> {
    self.get(id).head_child
  }

  pub fn head_word(&self, id: NodeId) -> Option<NodeId> {
    self.get(id).head_word
  }

  pub fn head_tag(&self, id: NodeId) -> Option<NodeId> {
    self.get(id).head_tag
  }

  /// Assigns head children, head words and head tags bottom-up. Fails if
  /// any phrasal node gets no head.
  pub fn percolate_heads(&mut self, hf: &dyn HeadFinder) -> Result<()> {
    self.percolate(self.root(), hf)
  }

  fn percolate(&mut self, id: NodeId, hf: &dyn HeadFinder) -> Result<()> {
    if self.is_leaf(id) {
      let node = self.get_mut(id);
      node.head_word = Some(id);
      return Ok(());
    }

    if self.is_preterminal(id) {
      let leaf = self.children(id)[0];
      self.percolate(leaf, hf)?;
      let index = self.index(leaf);
      let node = self.get_mut(id);
      node.head_child = Some(leaf);
      node.head_word = Some(leaf);
      node.head_tag = Some(id);
      node.index = index;
      return Ok(());
    }

    for child in self.children(id).to_vec() {
      self.percolate(child, hf)?;
    }

    let parent = self.parent(id);
    let head = hf
      .determine_head(self, id, parent)
      .ok_or_else(|| Error::NoHead {
        label: self.label(id).to_string(),
      })?;
    let (head_word, head_tag) = (self.head_word(head), self.head_tag(head));
    let index = head_word.map(|w| self.index(w)).unwrap_or(0);
    let node = self.get_mut(id);
    node.head_child = Some(head);
    node.head_word = head_word;
    node.head_tag = head_tag;
    node.index = index;
    Ok(())
  }

  /// Walks up from `id` while the parent shares its head word, giving the
  /// maximal projection of the head
  pub fn highest_node_with_same_head(&self, id: NodeId) -> NodeId {
    let head = self.head_word(id);
    let mut node = id;
    while let Some(parent) = self.parent(node) {
      if self.head_word(parent) != head || head.is_none() {
        break;
      }
      node = parent;
    }
    node
  }

  /// Display a subtree in bracketed form
  pub fn display(&self, id: NodeId) -> TreeDisplay<'_> {
    TreeDisplay { tree: self, id }
  }
}

/// Drops `-NONE-` subtrees and any constituent they leave empty
fn prune_empty(t: &SynTree<String, String>) -> Option<SynTree<String, String>> {
  match t {
    SynTree::Leaf(_) => Some(t.clone()),
    SynTree::Branch(cons, children) => {
      if cons.value == NONE_LABEL {
        return None;
      }
      let children = children.iter().filter_map(prune_empty).collect::<Vec<_>>();
      if children.is_empty() {
        None
      } else {
        Some(SynTree::Branch(cons.clone(), children))
      }
    }
  }
}

type Input = SynTree<String, String>;

fn label_of(t: &Input) -> &str {
  match t {
    SynTree::Branch(cons, _) => &cons.value,
    SynTree::Leaf(_) => "",
  }
}

/// A `CC` preterminal, and whether it is a preconjunct (`both`, `either`,
/// `neither`)
fn conjunction(t: &Input) -> Option<bool> {
  match t {
    SynTree::Branch(cons, kids) if cons.value == "CC" && kids.len() == 1 => {
      let word = kids[0].get_leaf()?.value.to_lowercase();
      Some(matches!(word.as_str(), "both" | "either" | "neither"))
    }
    _ => None,
  }
}

/// Rewrites coordinations bottom-up, without changing the word order:
/// - a `UCP` takes the category of its first conjunct when that is
///   adjectival (`ADJP`) or nominal (`NP`);
/// - a conjunction stranded at the left or right edge of a conjunct of the
///   same category as its parent moves up, between the conjuncts.
fn normalize_coordination(t: Input) -> Input {
  let (mut cons, children) = match t {
    SynTree::Branch(cons, children) => (cons, children),
    leaf => return leaf,
  };
  let category = basic_category(&cons.value).to_string();
  let mut kids = Vec::with_capacity(children.len());
  for child in children.into_iter().map(normalize_coordination) {
    let (leading, child, trailing) = split_edge_conjunctions(child, &category);
    kids.extend(leading);
    kids.push(child);
    kids.extend(trailing);
  }
  if let Some(label) = relabel_ucp(&cons.value, &kids) {
    cons.value = label;
  }
  SynTree::Branch(cons, kids)
}

fn split_edge_conjunctions(child: Input, category: &str) -> (Option<Input>, Input, Option<Input>) {
  match child {
    SynTree::Branch(cons, mut kids) if kids.len() > 2 && basic_category(&cons.value) == category => {
      let leading = match conjunction(&kids[0]) {
        Some(false) => Some(kids.remove(0)),
        _ => None,
      };
      let trailing = match kids.last().and_then(conjunction) {
        Some(_) => kids.pop(),
        None => None,
      };
      (leading, SynTree::Branch(cons, kids), trailing)
    }
    other => (None, other, None),
  }
}

fn relabel_ucp(label: &str, kids: &[Input]) -> Option<String> {
  if basic_category(label) != "UCP" {
    return None;
  }
  let first = basic_category(label_of(kids.first()?));
  let category = if first == "ADJP" || first.starts_with("JJ") {
    "ADJP"
  } else if first == "NP" || first == "NML" || first.starts_with("NN") {
    "NP"
  } else {
    return None;
  };
  Some(format!("{}{}", category, &label["UCP".len()..]))
}

/// Helper struct for displaying a subtree
#[derive(Clone)]
pub struct TreeDisplay<'a> {
  pub tree: &'a Tree,
  pub id: NodeId,
}

impl fmt::Display for TreeDisplay<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let tree = self.tree;
    if tree.is_leaf(self.id) {
      return write!(f, "{}", tree.label(self.id));
    }
    write!(f, "({}", tree.label(self.id))?;
    for &child in tree.children(self.id) {
      write!(f, " {}", tree.display(child))?;
    }
    write!(f, ")")
  }
}

impl fmt::Display for Tree {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.display(self.root()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tree(s: &str) -> Tree {
    Tree::from_syntree(&s.parse().unwrap()).unwrap()
  }

  #[test]
  fn test_indexing() {
    let t = tree("(ROOT (S (NP-SBJ (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))");
    let words = t.leaves().iter().map(|&l| (t.word(l), t.index(l))).collect::<Vec<_>>();
    assert_eq!(words, vec![("Clinton", 1), ("defeated", 2), ("Dole", 3)]);
    assert_eq!(t.tag(t.leaves()[1]), "VBD");
    assert_eq!(t.label(t.root()), "ROOT");
    // function tag stripped
    assert_eq!(t.to_string(), "(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))");
    assert_eq!(t.span(t.root()), (1, 3));
  }

  #[test]
  fn test_empty_elements_removed() {
    let t = tree("(ROOT (S (NP-SBJ (-NONE- *T*-1)) (VP (VBD left)) (NP-TMP (NN today))))");
    assert_eq!(t.to_string(), "(ROOT (S (VP (VBD left)) (NP-TMP (NN today))))");
    assert_eq!(t.leaves().len(), 2);
  }

  #[test]
  fn test_only_empty_elements() {
    let st = "(ROOT (-NONE- *))".parse().unwrap();
    assert_eq!(Tree::from_syntree(&st).unwrap_err(), Error::EmptyTree);
  }

  #[test]
  fn test_ucp_relabelled() {
    let t = tree("(ROOT (S (NP (NNS cats)) (VP (VBP are) (UCP-PRD (JJ cute) (CC and) (NP (DT a) (NN joy))))))");
    assert_eq!(
      t.to_string(),
      "(ROOT (S (NP (NNS cats)) (VP (VBP are) (ADJP (JJ cute) (CC and) (NP (DT a) (NN joy))))))"
    );
    let t = tree("(ROOT (S (VP (VBD left) (UCP-TMP (NP (NN today)) (CC or) (ADVP (RB soon))))))");
    assert_eq!(t.to_string(), "(ROOT (S (VP (VBD left) (NP-TMP (NP (NN today)) (CC or) (ADVP (RB soon))))))");
    let t = tree("(ROOT (S (VP (VBD left) (UCP (ADVP (RB now)) (CC or) (NP (NN today))))))");
    assert_eq!(t.to_string(), "(ROOT (S (VP (VBD left) (UCP (ADVP (RB now)) (CC or) (NP (NN today))))))");
  }

  #[test]
  fn test_edge_conjunctions_lifted() {
    let t = tree("(ROOT (NP (NP (NNS dogs) (, ,) (NNS cats) (CC and)) (NP (NNS mice))))");
    assert_eq!(t.to_string(), "(ROOT (NP (NP (NNS dogs) (, ,) (NNS cats)) (CC and) (NP (NNS mice))))");
    let t = tree("(ROOT (NP (NP (NNS dogs)) (NP (CC and) (JJ wild) (NNS cats))))");
    assert_eq!(t.to_string(), "(ROOT (NP (NP (NNS dogs)) (CC and) (NP (JJ wild) (NNS cats))))");
    let words = t.leaves().iter().map(|&l| (t.word(l), t.index(l))).collect::<Vec<_>>();
    assert_eq!(words, vec![("dogs", 1), ("and", 2), ("wild", 3), ("cats", 4)]);

    // preconjuncts and sentence-initial conjunctions stay put
    let both = "(ROOT (NP (NP (CC both) (NNS cats) (CC and) (NNS dogs))))";
    assert_eq!(tree(both).to_string(), both);
    let but = "(ROOT (S (CC But) (NP (PRP he)) (VP (VBD left))))";
    assert_eq!(tree(but).to_string(), but);
  }

  #[test]
  fn test_kinds() {
    let t = tree("(ROOT (NP (DT the) (NN dog)))");
    let np = t.children(t.root())[0];
    let dt = t.children(np)[0];
    assert!(t.is_phrasal(np));
    assert!(t.is_preterminal(dt));
    assert!(t.is_leaf(t.children(dt)[0]));
    assert_eq!(t.descendants(np).len(), 4);
    assert_eq!(t.preterminal_yield(t.root()), vec![dt, t.children(np)[1]]);
  }
}
