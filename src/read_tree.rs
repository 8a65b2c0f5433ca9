//! Simple recursive-descent reading of Penn Treebank bracketed trees
use regex::Regex;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::syntree::{Constituent, SynTree, Word};
use crate::utils::regex_static;

/// Label given to an unlabelled outermost bracket: `( (S ...) )`
pub const ROOT_LABEL: &str = "ROOT";

impl FromStr for SynTree<String, String> {
  type Err = Error;

  /// Reads exactly one bracketed tree
  fn from_str(s: &str) -> Result<Self> {
    let mut trees = read_trees(s)?;
    match trees.len() {
      1 => Ok(trees.remove(0)),
      0 => Err(syntax("no tree in input")),
      n => Err(syntax(format!("expected one tree, found {}", n))),
    }
  }
}

/// Reads every bracketed tree in `s`, in order
pub fn read_trees(s: &str) -> Result<Vec<SynTree<String, String>>> {
  let mut trees = Vec::new();
  let mut rem = skip_whitespace(s);
  while !rem.is_empty() {
    let mut next_leaf = 0;
    let (tree, s) = parse_node(rem, &mut next_leaf)?;
    trees.push(relabel_root(tree));
    rem = skip_whitespace(s);
  }
  Ok(trees)
}

fn relabel_root(tree: SynTree<String, String>) -> SynTree<String, String> {
  match tree {
    SynTree::Branch(mut cons, children) if cons.value.is_empty() => {
      cons.value = ROOT_LABEL.to_string();
      SynTree::Branch(cons, children)
    }
    other => other,
  }
}

fn syntax(message: impl Into<String>) -> Error {
  Error::TreeSyntax {
    message: message.into(),
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str)>;

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  match re.find(s) {
    Some(m) if m.start() == 0 => {
      let (_, rest) = s.split_at(m.end());
      (Some(m.as_str()), rest)
    }
    _ => (None, s),
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static Regex, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    Err(syntax(format!("couldn't match {} at {}", re, s)))
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Try to consume a char, failing if it doesn't match
fn needed_char(c: char, s: &str) -> ParseResult<'_, char> {
  if let (Some(c), rest) = optional_char(c, s) {
    Ok((c, rest))
  } else {
    Err(syntax(format!("couldn't match {} at {}", c, s)))
  }
}

fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE, r"\s+");
  optional_re(&*WHITESPACE, s).1
}

/// A label or a word: anything up to whitespace or a bracket
fn parse_token(s: &str) -> ParseResult<'_, &str> {
  regex_static!(TOKEN, r"[^\s()]+");
  needed_re(&*TOKEN, s)
}

fn parse_node<'a>(s: &'a str, next_leaf: &mut usize) -> ParseResult<'a, SynTree<String, String>> {
  let (_, s) = needed_char('(', s)?;
  let s = skip_whitespace(s);
  let (label, s) = if s.starts_with('(') {
    ("", s)
  } else {
    parse_token(s)?
  };

  let start = *next_leaf;
  let mut children = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if let (Some(_), s) = optional_char(')', rem) {
      rem = s;
      break;
    }
    if rem.is_empty() {
      return Err(syntax(format!("unclosed constituent {}", label)));
    }
    if rem.starts_with('(') {
      let (child, s) = parse_node(rem, next_leaf)?;
      children.push(child);
      rem = s;
    } else {
      let (word, s) = parse_token(rem)?;
      children.push(SynTree::Leaf(Word {
        value: word.to_string(),
        span: (*next_leaf, *next_leaf + 1),
      }));
      *next_leaf += 1;
      rem = s;
    }
  }

  if children.is_empty() {
    return Err(syntax(format!("constituent {} has no children", label)));
  }

  Ok((
    SynTree::Branch(
      Constituent {
        value: label.to_string(),
        span: (start, *next_leaf),
      },
      children,
    ),
    rem,
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_read_simple_tree() {
    let t: SynTree<String, String> = "(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))"
      .parse()
      .unwrap();
    let leaves = t.leaves();
    let words = leaves.iter().map(|w| w.value.as_str()).collect::<Vec<_>>();
    assert_eq!(words, vec!["Clinton", "defeated", "Dole"]);
    assert_eq!(t.span(), (0, 3));
    assert_eq!(t.leaves()[2].span, (2, 3));
  }

  #[test]
  fn test_unlabelled_root() {
    let t: SynTree<String, String> = "( (S (NP (PRP I)) (VP (VBD left)) (. .)))".parse().unwrap();
    let (cons, children) = t.get_branch().unwrap();
    assert_eq!(cons.value, "ROOT");
    assert_eq!(children.len(), 1);
  }

  #[test]
  fn test_read_many() {
    let trees = read_trees(
      "(ROOT (NP (NN dog)))
       (ROOT (NP (NNS cats)))",
    )
    .unwrap();
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[1].leaves()[0].span, (0, 1));
  }

  #[test]
  fn test_malformed() {
    assert!(matches!(
      "(ROOT (NP (NN dog)".parse::<SynTree<String, String>>(),
      Err(Error::TreeSyntax { .. })
    ));
    assert!("(ROOT (NN))".parse::<SynTree<String, String>>().is_err());
    assert!("".parse::<SynTree<String, String>>().is_err());
  }
}
