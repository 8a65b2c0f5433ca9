//! Recursive-descent compiler for tree patterns
use regex::Regex;

use super::{Constraint, LabelSpec, NameSpec, NodeDesc, Relation, TreePattern};
use crate::utils::regex_static;

type ParseResult<'a, T> = Result<(T, &'a str), String>;

pub(super) fn compile(source: &str) -> Result<TreePattern, String> {
  let mut parser = Parser { names: Vec::new() };
  let s = skip_whitespace(source);
  if s.is_empty() {
    return Err("empty pattern".to_string());
  }
  let (root, rest) = parser.parse_node(s)?;
  let rest = skip_whitespace(rest);
  if !rest.is_empty() {
    return Err(format!("unexpected trailing input at {}", rest));
  }
  Ok(TreePattern {
    source: source.to_string(),
    root,
    names: parser.names,
  })
}

struct Parser {
  names: Vec<String>,
}

impl Parser {
  fn slot_for(&mut self, name: &str) -> usize {
    match self.names.iter().position(|n| n == name) {
      Some(slot) => slot,
      None => {
        self.names.push(name.to_string());
        self.names.len() - 1
      }
    }
  }

  /// A description followed by its relations. The description may itself
  /// be a parenthesized node, as in `((NP !< EX) $++ VP)`; its relations
  /// and the ones that follow must all hold.
  fn parse_node<'a>(&mut self, s: &'a str) -> ParseResult<'a, NodeDesc> {
    let s = skip_whitespace(s);
    let (mut desc, s) = if s.starts_with('(') {
      self.parse_child(s)?
    } else {
      self.parse_description(s)?
    };
    let (constraint, s) = self.parse_clauses(s)?;
    desc.constraint = match (desc.constraint.take(), constraint) {
      (Some(Constraint::And(mut inner)), Some(outer)) => {
        inner.push(outer);
        Some(Constraint::And(inner))
      }
      (Some(inner), Some(outer)) => Some(Constraint::And(vec![inner, outer])),
      (inner, outer) => inner.or(outer),
    };
    Ok((desc, s))
  }

  /// The node on the right of a relation: a bare description, or a
  /// parenthesized node with relations of its own
  fn parse_child<'a>(&mut self, s: &'a str) -> ParseResult<'a, NodeDesc> {
    let s = skip_whitespace(s);
    if let (Some(_), s) = optional_char('(', s) {
      let (desc, s) = self.parse_node(s)?;
      let (_, s) = needed_char(')', skip_whitespace(s))?;
      Ok((desc, s))
    } else {
      self.parse_description(s)
    }
  }

  fn parse_description<'a>(&mut self, s: &'a str) -> ParseResult<'a, NodeDesc> {
    let s = skip_whitespace(s);
    let (negated, s) = optional_char('!', s);
    let (label, s) = parse_label(s)?;
    let (slot, s) = match optional_char('=', s) {
      (Some(_), s) => {
        regex_static!(BINDING, r"[A-Za-z0-9_]+");
        let (name, s) = needed_re(&*BINDING, s)?;
        (Some(self.slot_for(name)), s)
      }
      (None, s) => (None, s),
    };
    Ok((
      NodeDesc {
        label,
        negated: negated.is_some(),
        slot,
        constraint: None,
      },
      s,
    ))
  }

  /// Zero or more relation clauses, up to a closing `)`, `]`, `|` or the end
  fn parse_clauses<'a>(&mut self, s: &'a str) -> ParseResult<'a, Option<Constraint>> {
    let mut clauses = Vec::new();
    let mut s = skip_whitespace(s);
    while !s.is_empty() && !s.starts_with([')', ']', '|']) {
      let (clause, rest) = self.parse_clause(s)?;
      clauses.push(clause);
      s = skip_whitespace(rest);
    }
    let constraint = match clauses.len() {
      0 => None,
      1 => clauses.pop(),
      _ => Some(Constraint::And(clauses)),
    };
    Ok((constraint, s))
  }

  fn parse_clause<'a>(&mut self, s: &'a str) -> ParseResult<'a, Constraint> {
    if let (Some(_), s) = optional_char('[', s) {
      let mut branches = Vec::new();
      let mut s = s;
      loop {
        let (branch, rest) = self.parse_clauses(s)?;
        let branch = branch.ok_or_else(|| format!("empty alternative at {}", rest))?;
        branches.push(branch);
        let rest = skip_whitespace(rest);
        match optional_char('|', rest) {
          (Some(_), rest) => s = rest,
          (None, rest) => {
            let (_, rest) = needed_char(']', rest)?;
            return Ok((Constraint::Or(branches), rest));
          }
        }
      }
    }

    let (negated, s) = optional_char('!', s);
    let (optional, s) = optional_char('?', s);
    regex_static!(
      RELATION,
      r"<<|<,|<-|<:|<#|<|>>|>#|>|\$\+\+|\$--|\$\+|\$-|\$|\.|,"
    );
    let (tok, s) = needed_re(&*RELATION, s)?;
    let relation = Relation::from_token(tok).ok_or_else(|| format!("unknown relation {}", tok))?;
    let (node, s) = self.parse_child(s)?;
    Ok((
      Constraint::Rel {
        relation,
        negated: negated.is_some(),
        optional: optional.is_some(),
        node: Box::new(node),
      },
      s,
    ))
  }
}

fn parse_label(s: &str) -> ParseResult<'_, LabelSpec> {
  regex_static!(ANY, r"__");
  regex_static!(REGEX_BODY, r"(?:\\.|[^/\\])*");
  regex_static!(NAMES, r"@?[^\s()\[\]|=!<>/@]+(?:\|@?[^\s()\[\]|=!<>/@]+)*");

  if let (Some(_), s) = optional_re(&*ANY, s) {
    return Ok((LabelSpec::Any, s));
  }
  if let (Some(_), s) = optional_char('/', s) {
    let (body, s) = needed_re(&*REGEX_BODY, s)?;
    let (_, s) = needed_char('/', s)?;
    let re = Regex::new(&body.replace("\\/", "/")).map_err(|e| e.to_string())?;
    return Ok((LabelSpec::Regex(re), s));
  }
  let (names, s) = needed_re(&*NAMES, s)?;
  let names = names
    .split('|')
    .map(|n| match n.strip_prefix('@') {
      Some(name) => NameSpec {
        basic: true,
        name: name.to_string(),
      },
      None => NameSpec {
        basic: false,
        name: n.to_string(),
      },
    })
    .collect();
  Ok((LabelSpec::Names(names), s))
}

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> (Option<&'a str>, &'a str) {
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
  match optional_re(re, s) {
    (Some(m), rest) => Ok((m, rest)),
    (None, _) if s.is_empty() => Err(format!("expected {} at end of pattern", re)),
    (None, _) => Err(format!("couldn't match {} at {}", re, s)),
  }
}

fn optional_char(c: char, s: &str) -> (Option<char>, &str) {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

fn needed_char(c: char, s: &str) -> ParseResult<'_, char> {
  match optional_char(c, s) {
    (Some(c), rest) => Ok((c, rest)),
    (None, _) => Err(format!("expected `{}` at {:?}", c, s)),
  }
}

fn skip_whitespace(s: &str) -> &str {
  s.trim_start()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_names_and_slots() {
    let p = compile("NP|WHNP=target < (DT=det $+ JJ=target)").unwrap();
    assert_eq!(p.names, vec!["target".to_string(), "det".to_string()]);
    match &p.root.label {
      LabelSpec::Names(names) => assert_eq!(names.len(), 2),
      other => panic!("unexpected label {:?}", other),
    }
  }

  #[test]
  fn test_regex_label_with_slash() {
    let p = compile(r"__ < /^a\/b$/").unwrap();
    match &p.root.constraint {
      Some(Constraint::Rel { node, .. }) => match &node.label {
        LabelSpec::Regex(re) => assert!(re.is_match("a/b")),
        other => panic!("unexpected label {:?}", other),
      },
      other => panic!("unexpected constraint {:?}", other),
    }
  }

  #[test]
  fn test_relations_and_groups() {
    let p = compile("VP !< NP ?$++ ADVP [ <- PP | <, (S < VP) ]").unwrap();
    match &p.root.constraint {
      Some(Constraint::And(clauses)) => {
        assert_eq!(clauses.len(), 3);
        assert!(matches!(clauses[2], Constraint::Or(ref b) if b.len() == 2));
      }
      other => panic!("unexpected constraint {:?}", other),
    }
  }

  #[test]
  fn test_parenthesized_description() {
    let p = compile("S < ((NP|WHNP=target !< EX) $++ VP)").unwrap();
    match &p.root.constraint {
      Some(Constraint::Rel { node, .. }) => {
        assert_eq!(node.slot, Some(0));
        match &node.constraint {
          Some(Constraint::And(clauses)) => assert_eq!(clauses.len(), 2),
          other => panic!("unexpected constraint {:?}", other),
        }
      }
      other => panic!("unexpected constraint {:?}", other),
    }
    assert!(compile("((VP < NP)) $+ NP").is_ok());
  }

  #[test]
  fn test_errors() {
    assert!(compile("VP < (NP").is_err());
    assert!(compile("VP [ < NP |").is_err());
    assert!(compile("VP ~ NP").is_err());
    assert!(compile("(VP < NP) NP").is_err());
  }
}
