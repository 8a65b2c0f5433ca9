//! Collapsing basic dependencies.
//!
//! Prepositions, possessive markers and conjunctions fold into the label of
//! the edge they mediate, relative pronouns give way to their antecedents,
//! and dependencies can be copied across conjuncts. Every pass rewrites the
//! list in place; edges are soft-deleted with `killed` and dropped at the
//! end of the pass that killed them.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::lexicon::{MULTIWORD_PREPS, THREEWORD_PREPS, is_relativizer};
use crate::dependency::{IndexedWord, TypedDependency};
use crate::relation::{DEPENDENT, ROOT, RelationSet, Reln};

type Deps = Vec<TypedDependency>;

/// Live and labelled with the plain relation `short`
fn is(td: &TypedDependency, short: &str) -> bool {
  td.is_live() && td.has_reln(short)
}

fn is_any(td: &TypedDependency, shorts: &[&str]) -> bool {
  td.is_live() && shorts.iter().any(|s| td.has_reln(s))
}

fn is_prep_tag(tag: &str) -> bool {
  tag == "IN" || tag == "TO"
}

fn is_family(td: &TypedDependency, short: &str) -> bool {
  td.reln.short_name() == short && td.reln.specific().is_some()
}

fn adjacent(a: &IndexedWord, b: &IndexedWord) -> bool {
  a.index.abs_diff(b.index) == 1
}

fn drop_killed(deps: &mut Deps) {
  deps.retain(TypedDependency::is_live);
}

/// Keeps the first of every set of equal dependencies
pub(super) fn remove_exact_duplicates(deps: &mut Deps) {
  let mut seen = FxHashSet::default();
  deps.retain(|td| seen.insert(td.clone()));
}

fn finish(deps: &mut Deps) {
  drop_killed(deps);
  remove_exact_duplicates(deps);
  deps.sort();
}

/// A `conj` edge between two prepositions, with the object of the second
struct Conjunct {
  conj: usize,
  object: Option<usize>,
  pobj: bool,
}

/// Outgoing edges by governor, and `vmod` dependents that can take an agent
struct PrepIndex {
  by_gov: FxHashMap<IndexedWord, Vec<usize>>,
  vmods: Vec<IndexedWord>,
}

impl PrepIndex {
  fn new(deps: &Deps) -> Self {
    let mut by_gov: FxHashMap<IndexedWord, Vec<usize>> = FxHashMap::default();
    for (i, td) in deps.iter().enumerate() {
      by_gov.entry(td.gov.clone()).or_default().push(i);
    }
    for kids in by_gov.values_mut() {
      kids.sort_by(|&a, &b| deps[a].cmp(&deps[b]));
    }
    // a vmod with an infinitival `to` is not a passive participle
    let vmods = deps
      .iter()
      .filter(|td| is(td, "vmod"))
      .filter(|td| {
        !deps
          .iter()
          .any(|aux| is(aux, "aux") && aux.gov == td.dep && aux.dep.word.eq_ignore_ascii_case("to"))
      })
      .map(|td| td.dep.clone())
      .collect();
    Self { by_gov, vmods }
  }

  fn kids(&self, gov: &IndexedWord) -> &[usize] {
    self.by_gov.get(gov).map(Vec::as_slice).unwrap_or_default()
  }
}

pub(super) struct Collapser<'a> {
  relations: &'a RelationSet,
}

impl<'a> Collapser<'a> {
  pub fn new(relations: &'a RelationSet) -> Self {
    Self { relations }
  }

  /// The full pipeline
  pub fn collapse(&self, deps: &mut Deps, cc_process: bool, include_extras: bool) {
    self.correct_dependencies(deps);
    self.erase_multi_conj(deps);
    self.collapse_2wp(deps);
    self.collapse_flat_mwp(deps);
    self.collapse_2wp_bis(deps);
    self.collapse_3wp(deps);
    self.collapse_prep_and_poss(deps);
    self.collapse_conj(deps);
    if include_extras {
      self.add_ref(deps);
      self.collapse_referent(deps);
    }
    if cc_process {
      self.treat_cc(deps);
    }
    if include_extras {
      self.add_extra_nsubj(deps);
      self.correct_subj_pass(deps);
    }
    self.remove_dep(deps);
    finish(deps);
  }

  /// Only the passes that keep a tree a tree
  pub fn collapse_tree(&self, deps: &mut Deps) {
    self.correct_dependencies(deps);
    self.erase_multi_conj(deps);
    self.collapse_2wp(deps);
    self.collapse_flat_mwp(deps);
    self.collapse_2wp_bis(deps);
    self.collapse_3wp(deps);
    self.collapse_prep_and_poss(deps);
    self.collapse_conj(deps);
    finish(deps);
  }

  pub fn correct_dependencies(&self, deps: &mut Deps) {
    self.correct_subj_pass(deps);
    remove_exact_duplicates(deps);
  }

  /// Subjects of a governor with a passive auxiliary are passive subjects
  pub fn correct_subj_pass(&self, deps: &mut Deps) {
    let passive: FxHashSet<IndexedWord> = deps
      .iter()
      .filter(|td| is(td, "auxpass"))
      .map(|td| td.gov.clone())
      .collect();
    if passive.is_empty() {
      return;
    }
    let nsubjpass = self.relations.value_of("nsubjpass");
    let csubjpass = self.relations.value_of("csubjpass");
    for td in deps.iter_mut().filter(|td| passive.contains(&td.gov)) {
      if let (true, Some(r)) = (is(td, "nsubj"), &nsubjpass) {
        td.reln = r.clone();
      } else if let (true, Some(r)) = (is(td, "csubj"), &csubjpass) {
        td.reln = r.clone();
      }
    }
  }

  /// Drops the internal structure of multi-word conjunctions such as
  /// "as well as": anything hanging off a `cc` dependent goes
  fn erase_multi_conj(&self, deps: &mut Deps) {
    for i in 0..deps.len() {
      if !is(&deps[i], "cc") {
        continue;
      }
      let x = deps[i].dep.clone();
      for td in deps.iter_mut() {
        if td.gov == x && is_any(td, &[DEPENDENT, "mwe", "cc", "advmod", "neg", "aux"]) {
          td.killed = true;
        }
      }
    }
    drop_killed(deps);
  }

  /// Two-word prepositions whose words are linked to each other: some edge
  /// between adjacent `w1` and `w2`, a modifier edge `(gov, w1)` and an
  /// object under either word become `prep_w1_w2(gov, object)`. Both word
  /// orders are tried for the linking edge.
  fn collapse_2wp(&self, deps: &mut Deps) {
    for mwp in MULTIWORD_PREPS {
      let Some((first, second)) = mwp.split_once('_') else {
        continue;
      };
      self.collapse_multiword_prep(deps, mwp, first, second);
      self.collapse_multiword_prep(deps, mwp, second, first);
    }
  }

  fn collapse_multiword_prep(&self, deps: &mut Deps, name: &str, gov_word: &str, dep_word: &str) {
    let Some(link) = deps.iter().rposition(|td| {
      td.is_live()
        && td.gov.word.eq_ignore_ascii_case(gov_word)
        && td.dep.word.eq_ignore_ascii_case(dep_word)
        && adjacent(&td.gov, &td.dep)
    }) else {
      return;
    };
    let (w0, w1) = (deps[link].gov.clone(), deps[link].dep.clone());
    let Some(prep) = deps
      .iter()
      .rposition(|td| td.dep == w0 && is_any(td, &["prep", "advmod", "amod", DEPENDENT, "mwe"]))
    else {
      return;
    };
    let governor = deps[prep].gov.clone();
    let Some(comp) = self.lowest_complement(deps, &[w0.clone(), w1.clone()], link) else {
      return;
    };
    self.fuse(deps, name, &governor, &[w0, w1], &[prep, link], comp, true);
  }

  /// Flat two-word prepositions hanging off one governor:
  /// `prep|advmod(gov, w1)`, `prep|dep(gov, w2)` and `pobj(w2, object)`
  fn collapse_flat_mwp(&self, deps: &mut Deps) {
    for mwp in MULTIWORD_PREPS {
      let Some((first, second)) = mwp.split_once('_') else {
        continue;
      };
      let Some(head) = deps
        .iter()
        .rposition(|td| td.dep.word.eq_ignore_ascii_case(first) && is_any(td, &["prep", "advmod"]))
      else {
        continue;
      };
      let (governor, w0) = (deps[head].gov.clone(), deps[head].dep.clone());
      let Some(tail) = deps.iter().rposition(|td| {
        td.gov == governor
          && td.dep.index == w0.index + 1
          && td.dep.word.eq_ignore_ascii_case(second)
          && is_any(td, &["prep", DEPENDENT])
      }) else {
        continue;
      };
      let w1 = deps[tail].dep.clone();
      let Some(comp) = self.lowest_complement(deps, &[w1.clone()], head) else {
        continue;
      };
      self.fuse(deps, mwp, &governor, &[w0, w1], &[head, tail], comp, false);
    }
  }

  /// A modifier word right before a preposition of the same governor, as
  /// in `(VP ran (ADVP out) (PP of NP))`
  fn collapse_2wp_bis(&self, deps: &mut Deps) {
    for mwp in MULTIWORD_PREPS {
      let Some((first, second)) = mwp.split_once('_') else {
        continue;
      };
      let Some(head) = deps.iter().rposition(|td| {
        td.dep.word.eq_ignore_ascii_case(first) && is_any(td, &["advmod", "prt", DEPENDENT, "mwe"])
      }) else {
        continue;
      };
      let (governor, w0) = (deps[head].gov.clone(), deps[head].dep.clone());
      let Some(tail) = deps.iter().rposition(|td| {
        is(td, "prep")
          && (td.gov == governor || td.gov == w0)
          && td.dep.index == w0.index + 1
          && td.dep.word.eq_ignore_ascii_case(second)
      }) else {
        continue;
      };
      let w1 = deps[tail].dep.clone();
      let Some(comp) = self.lowest_complement(deps, &[w1.clone()], head) else {
        continue;
      };
      self.fuse(deps, mwp, &governor, &[w0, w1], &[head, tail], comp, false);
    }
  }

  /// Three-word prepositions, either chained word to word ("in front of":
  /// `prep(gov, in)`, `pobj(in, front)`, `prep(front, of)`) or flat under
  /// their last word
  fn collapse_3wp(&self, deps: &mut Deps) {
    for mwp in THREEWORD_PREPS {
      let words: Vec<&str> = mwp.split('_').collect();
      let &[a, b, c] = words.as_slice() else {
        continue;
      };
      self.collapse_chained_3wp(deps, mwp, [a, b, c]);
      self.collapse_flat_3wp(deps, mwp, [a, b, c]);
    }
  }

  fn collapse_chained_3wp(&self, deps: &mut Deps, name: &str, [a, b, c]: [&str; 3]) {
    let linked = |td: &TypedDependency, gov: &str, dep: &str| {
      td.is_live()
        && td.gov.word.eq_ignore_ascii_case(gov)
        && td.dep.word.eq_ignore_ascii_case(dep)
        && adjacent(&td.gov, &td.dep)
    };
    let Some(first) = deps.iter().rposition(|td| linked(td, a, b)) else {
      return;
    };
    let (w0, w1) = (deps[first].gov.clone(), deps[first].dep.clone());
    let Some(second) = deps.iter().rposition(|td| td.gov == w1 && linked(td, b, c)) else {
      return;
    };
    let w2 = deps[second].dep.clone();
    let Some(prep) = deps.iter().rposition(|td| td.dep == w0 && is(td, "prep")) else {
      return;
    };
    let governor = deps[prep].gov.clone();
    let Some(comp) = self.lowest_complement(deps, &[w2.clone()], second) else {
      return;
    };
    self.fuse(deps, name, &governor, &[w0, w1, w2], &[prep, first, second], comp, false);
  }

  fn collapse_flat_3wp(&self, deps: &mut Deps, name: &str, [a, b, c]: [&str; 3]) {
    let found = (0..deps.len()).rev().find_map(|prep| {
      let td = &deps[prep];
      if !is(td, "prep") || !td.dep.word.eq_ignore_ascii_case(c) || td.dep.index < 3 {
        return None;
      }
      let w2 = &td.dep;
      let part = |word: &str, index: usize| {
        deps
          .iter()
          .rposition(|d| d.is_live() && d.gov == *w2 && d.dep.index == index && d.dep.word.eq_ignore_ascii_case(word))
      };
      Some((prep, part(a, w2.index - 2)?, part(b, w2.index - 1)?))
    });
    let Some((prep, first, second)) = found else {
      return;
    };
    let governor = deps[prep].gov.clone();
    let words = [deps[first].dep.clone(), deps[second].dep.clone(), deps[prep].dep.clone()];
    let Some(comp) = self.lowest_complement(deps, &words[2..], prep) else {
      return;
    };
    self.fuse(deps, name, &governor, &words, &[prep, first, second], comp, false);
  }

  /// The `pobj` or `pcomp` edge out of one of `heads` whose dependent
  /// comes first in the sentence. The edge at `skip` is never chosen.
  fn lowest_complement(&self, deps: &Deps, heads: &[IndexedWord], skip: usize) -> Option<usize> {
    deps
      .iter()
      .enumerate()
      .filter(|&(i, td)| i != skip && is_any(td, &["pobj", "pcomp"]) && heads.contains(&td.gov))
      .min_by_key(|(_, td)| td.dep.index)
      .map(|(i, _)| i)
  }

  /// Replaces the edges at `used` and the complement edge `comp` by one
  /// `prep_name` (or `prepc_name` for a clausal complement) edge from
  /// `governor`. Whatever still hangs off `words` moves up to `governor`,
  /// except that a stray `tmod` can be moved to the object instead.
  #[allow(clippy::too_many_arguments)]
  fn fuse(
    &self,
    deps: &mut Deps,
    name: &str,
    governor: &IndexedWord,
    words: &[IndexedWord],
    used: &[usize],
    comp: usize,
    tmod_to_object: bool,
  ) {
    let object = deps[comp].dep.clone();
    let reln = if deps[comp].has_reln("pcomp") {
      self.relations.get_prepc(name)
    } else {
      self.relations.get_prep(name)
    };
    let Some(reln) = reln else {
      return;
    };
    for &i in used.iter().chain([comp].iter()) {
      deps[i].killed = true;
    }
    for td in deps.iter_mut().filter(|td| td.is_live() && words.contains(&td.gov)) {
      td.gov = if tmod_to_object && td.has_reln("tmod") {
        object.clone()
      } else {
        governor.clone()
      };
    }
    debug!(relation = %reln, gov = %governor, dep = %object, "collapsed multi-word preposition");
    deps.push(TypedDependency::new(reln, governor.clone(), object));
    drop_killed(deps);
  }
}

impl Collapser<'_> {
  /// Folds prepositions into `prep_X`/`prepc_X` edges and drops possessive
  /// markers. Conjoined prepositions are handled first: "flew to Greece and
  /// to Serbia" keeps one `prep_to` and conjoins the objects, while "flew
  /// to Greece and from Serbia" conjoins a copy of the governor.
  fn collapse_prep_and_poss(&self, deps: &mut Deps) {
    let original = deps.len();
    let mut index = PrepIndex::new(deps);

    for top in 0..original {
      if is(&deps[top], "prep") {
        self.collapse_prep_conjunction(deps, &index, top);
      }
    }

    for i in 0..original {
      if deps[i].killed {
        continue;
      }
      let head = deps[i].dep.clone();
      let possibles = index.kids(&head).to_vec();
      if possibles.is_empty() {
        continue;
      }
      let possessor = is(&deps[i], "poss") || is(&deps[i], "conj");
      if possessor || is(&deps[i], "prep") {
        let prep_tag = matches!(head.tag.as_str(), "IN" | "TO" | "VBG");
        for &j in &possibles {
          let td = &deps[j];
          if !td.is_live() || td.has_reln("cc") || td.has_reln("conj") {
            continue;
          }
          if possessor {
            if td.has_reln("possessive") && !index.by_gov.contains_key(&td.dep) {
              deps[j].killed = true;
            }
            continue;
          }
          let collapsible = is_any(td, &["pobj", "pcomp"])
            && prep_tag
            && !matches!(td.dep.tag.as_str(), "RB" | "IN" | "TO")
            && !is_conj_with_no_prep(deps, &td.gov, &possibles);
          if !collapsible {
            continue;
          }
          let pobj = !td.has_reln("pcomp");
          let object = td.dep.clone();
          let governor = deps[i].gov.clone();
          let Some(reln) = self.prep_relation(deps, &index, &head.word, &governor, pobj) else {
            continue;
          };
          trace!(relation = %reln, gov = %governor, dep = %object, "collapsed preposition");
          index.by_gov.entry(governor.clone()).or_default().push(deps.len());
          deps.push(TypedDependency::new(reln, governor, object));
          deps[i].killed = true;
          deps[j].killed = true;
        }
      }
      // whatever hung off a collapsed preposition now hangs off its governor
      if deps[i].killed {
        let governor = deps[i].gov.clone();
        for &j in &possibles {
          if deps[j].is_live() {
            deps[j].gov = governor.clone();
          }
        }
      }
    }
    drop_killed(deps);
  }

  fn collapse_prep_conjunction(&self, deps: &mut Deps, index: &PrepIndex, top: usize) {
    let prep_word = deps[top].dep.clone();
    let possibles = index.kids(&prep_word);
    let mut conjuncts = Vec::new();
    let mut others = Vec::new();
    let mut same_preposition = true;
    let mut last_conjunct = 0;

    for &j in possibles {
      if !is(&deps[j], "conj") || !is_prep_tag(&deps[j].dep.tag) {
        continue;
      }
      let other = &deps[j].dep;
      same_preposition &= other.word == prep_word.word;
      let mut object = None;
      let mut pobj = true;
      for &k in index.kids(other) {
        let td = &deps[k];
        if object.is_none() && is_any(td, &["pobj", "pcomp"]) && !is_prep_tag(&td.dep.tag) {
          object = Some(k);
          pobj = !td.has_reln("pcomp");
        } else if td.is_live() {
          others.push(k);
        }
      }
      last_conjunct = last_conjunct.max(other.index);
      conjuncts.push(Conjunct { conj: j, object, pobj });
    }
    if conjuncts.is_empty() {
      return;
    }

    let mut object_edge = None;
    let mut cc = None;
    for &j in possibles {
      let td = &deps[j];
      if is(td, "cc") && td.dep.index < last_conjunct {
        cc = Some(j);
      } else if object_edge.is_none()
        && is_any(td, &[DEPENDENT, "pobj", "pcomp"])
        && matches!(prep_word.tag.as_str(), "IN" | "TO" | "VBG")
        && !matches!(td.dep.tag.as_str(), "RB" | "IN" | "TO")
      {
        object_edge = Some(j);
      } else if td.is_live() && !conjuncts.iter().any(|c| c.conj == j) {
        others.push(j);
      }
    }
    let (Some(object_edge), Some(cc)) = (object_edge, cc) else {
      return;
    };

    let governor = deps[top].gov.clone();
    let object = deps[object_edge].dep.clone();
    let pobj = !deps[object_edge].has_reln("pcomp");
    let Some(reln) = self.prep_relation(deps, index, &prep_word.word, &governor, pobj) else {
      return;
    };
    let Some(conj) = self.conj_value(&deps[cc].dep.word) else {
      return;
    };
    for k in [top, object_edge, cc] {
      deps[k].killed = true;
    }

    let mut added = vec![TypedDependency::new(reln, governor.clone(), object.clone())];
    let mut copy = 1;
    for c in &conjuncts {
      if let Some(k) = c.object {
        let other_object = deps[k].dep.clone();
        if same_preposition {
          added.push(TypedDependency::new(conj.clone(), object.clone(), other_object));
        } else {
          let copy_gov = governor.with_copy(copy);
          copy += 1;
          added.push(TypedDependency::new(conj.clone(), governor.clone(), copy_gov.clone()));
          let word = deps[c.conj].dep.word.clone();
          if let Some(reln) = self.prep_relation(deps, index, &word, &governor, c.pobj) {
            added.push(TypedDependency::new(reln, copy_gov, other_object));
          }
        }
        deps[k].killed = true;
      }
      deps[c.conj].killed = true;
    }
    for k in others {
      if deps[k].is_live() {
        deps[k].gov = governor.clone();
      }
    }
    debug!(
      gov = %governor,
      preposition = %prep_word,
      conjuncts = conjuncts.len(),
      same_preposition,
      "collapsed conjoined prepositions"
    );
    deps.extend(added);
  }

  /// `prep_p` or `prepc_p`, or `agent` for a `by` whose governor is passive
  fn prep_relation(
    &self,
    deps: &Deps,
    index: &PrepIndex,
    preposition: &str,
    governor: &IndexedWord,
    pobj: bool,
  ) -> Option<Reln> {
    let preposition = preposition.to_lowercase();
    if preposition == "by" {
      let passive = index.kids(governor).iter().any(|&k| is(&deps[k], "auxpass"));
      if passive || index.vmods.contains(governor) {
        return self.relations.value_of("agent");
      }
    }
    if pobj {
      self.relations.get_prep(&preposition)
    } else {
      self.relations.get_prepc(&preposition)
    }
  }

  /// `conj_X` for a coordinating word, with a few normalizations
  fn conj_value(&self, word: &str) -> Option<Reln> {
    let lower = word.to_lowercase();
    let name = match lower.as_str() {
      "not" | "instead" | "rather" => "negcc",
      "mention" | "to" | "also" | "&" => "and",
      w if w.contains("well") => "and",
      w => w,
    };
    self.relations.get_conj(name)
  }

  /// `conj` edges take the name of the coordinator before them; the `cc`
  /// edges they used disappear
  fn collapse_conj(&self, deps: &mut Deps) {
    deps.sort();
    let mut collapsed = Vec::new();
    for i in 0..deps.len() {
      if !is(&deps[i], "cc") {
        continue;
      }
      let gov = deps[i].gov.clone();
      let mut conj = self.conj_value(&deps[i].dep.word);
      let mut found = false;
      for j in 0..deps.len() {
        if deps[j].gov != gov {
          continue;
        }
        if is(&deps[j], "conj") {
          if let Some(r) = &conj {
            trace!(relation = %r, gov = %gov, dep = %deps[j].dep, "named conjunct");
            deps[j].reln = r.clone();
            found = true;
          }
        } else if is(&deps[j], "cc") {
          conj = self.conj_value(&deps[j].dep.word);
        }
      }
      if found {
        collapsed.push(gov);
      }
    }
    deps.retain(|td| !(td.has_reln("cc") && collapsed.contains(&td.gov)));
  }

  /// `ref(antecedent, relativizer)` for every relative clause, using the
  /// leftmost relativizer among the clause head's children and
  /// grandchildren
  fn add_ref(&self, deps: &mut Deps) {
    let Some(referent) = self.relations.value_of("ref") else {
      return;
    };
    let mut added: Vec<TypedDependency> = Vec::new();
    for rcmod in deps.iter().filter(|td| is(td, "rcmod")) {
      let clause = &rcmod.dep;
      let child = deps
        .iter()
        .filter(|td| td.gov == *clause && is_relativizer(&td.dep.word))
        .map(|td| &td.dep)
        .min_by_key(|w| w.index);
      let grandchild = deps
        .iter()
        .filter(|td| td.gov == *clause)
        .flat_map(|c| {
          deps
            .iter()
            .filter(move |g| g.gov == c.dep && is_relativizer(&g.dep.word))
        })
        .map(|td| &td.dep)
        .min_by_key(|w| w.index);
      let relativizer = match (child, grandchild) {
        (child, Some(g)) if child.is_none_or(|c| g.index < c.index) => Some(g),
        (child, _) => child,
      };
      if let Some(word) = relativizer {
        let td = TypedDependency::new(referent.clone(), rcmod.gov.clone(), word.clone()).extra();
        if !deps.contains(&td) && !added.contains(&td) {
          added.push(td);
        }
      }
    }
    deps.extend(added);
  }

  /// Replaces relativizers by their antecedents and discards the `ref` edges
  fn collapse_referent(&self, deps: &mut Deps) {
    let refs: Vec<TypedDependency> = deps.iter().filter(|td| td.has_reln("ref")).cloned().collect();
    deps.retain(|td| !td.has_reln("ref"));
    for r in &refs {
      for td in deps.iter_mut() {
        if td.dep == r.dep && td.gov != r.gov {
          debug!(relation = %td.reln, antecedent = %r.gov, relativizer = %r.dep, "resolved relativizer");
          td.dep = r.gov.clone();
          td.extra = true;
        }
      }
    }
  }

  /// For `conj_X(a, b)`, every edge into `a` is copied into `b`, and a
  /// verbal or adjectival `b` without a subject shares the subject of `a`.
  /// Conjoined complements of a `prepc_X` share no subject.
  fn treat_cc(&self, deps: &mut Deps) {
    let mut by_dep: FxHashMap<IndexedWord, Vec<usize>> = FxHashMap::default();
    let mut subjects: FxHashMap<IndexedWord, usize> = FxHashMap::default();
    let mut passive = FxHashSet::default();
    let mut rcmod_heads = FxHashSet::default();
    let mut prepc_deps = FxHashSet::default();
    for (i, td) in deps.iter().enumerate() {
      by_dep.entry(td.dep.clone()).or_default().push(i);
      if td.has_reln("auxpass") {
        passive.insert(td.gov.clone());
      }
      if is_family(td, "prepc") {
        prepc_deps.insert(td.dep.clone());
      }
      let subject = td
        .reln
        .parent()
        .is_some_and(|p| p.is("nsubj") || p.is("subj") || p.is("csubj"));
      if subject {
        subjects.entry(td.gov.clone()).or_insert(i);
      }
      if td.has_reln("rcmod") {
        rcmod_heads.insert(td.gov.clone());
      }
    }

    let mut added = Vec::new();
    for td in deps.iter().filter(|td| is_family(td, "conj")) {
      let (gov, dep) = (&td.gov, &td.dep);
      for &k in by_dep.get(gov).map(Vec::as_slice).unwrap_or_default() {
        let upper = &deps[k];
        if upper.gov == *dep || upper.has_reln(ROOT) {
          continue;
        }
        // long-distance relative clause edges only go to the first conjunct
        if rcmod_heads.contains(gov)
          && rcmod_heads.contains(dep)
          && (upper.has_reln("dobj") || upper.has_reln("nsubj"))
        {
          continue;
        }
        added.push(TypedDependency::new(upper.reln.clone(), upper.gov.clone(), dep.clone()));
      }

      if prepc_deps.contains(gov) || prepc_deps.contains(dep) {
        continue;
      }
      if let Some(&s) = subjects.get(gov) {
        let verbal = dep.tag.starts_with("VB") || dep.tag.starts_with("JJ");
        if verbal && !subjects.contains_key(dep) {
          let subject = &deps[s];
          let reln = self.shared_subject(&subject.reln, passive.contains(dep));
          added.push(TypedDependency::new(reln, dep.clone(), subject.dep.clone()));
        }
      }
    }
    debug!(count = added.len(), "propagated dependencies over conjuncts");
    deps.extend(added);
  }

  /// The subject relation a second conjunct gets: passive iff the conjunct
  /// has a passive auxiliary of its own
  fn shared_subject(&self, reln: &Reln, has_passive_aux: bool) -> Reln {
    let name = if reln.is("nsubj") || reln.is("nsubjpass") {
      if has_passive_aux { "nsubjpass" } else { "nsubj" }
    } else if reln.is("csubj") || reln.is("csubjpass") {
      if has_passive_aux { "csubjpass" } else { "csubj" }
    } else {
      return reln.clone();
    };
    self.relations.value_of(name).unwrap_or_else(|| reln.clone())
  }

  /// Controlled subjects of open clausal complements: "I want to go" gets
  /// `nsubj(go, I)`. Objects of the controlling verb win over its subjects.
  fn add_extra_nsubj(&self, deps: &mut Deps) {
    let Some(nsubj) = self.relations.value_of("nsubj") else {
      return;
    };
    let mut added: Vec<TypedDependency> = Vec::new();
    for xcomp in deps.iter().filter(|td| is(td, "xcomp")) {
      let (head, modifier) = (&xcomp.gov, &xcomp.dep);
      let mut has_subject = false;
      let mut has_aux = false;
      let mut subjects = Vec::new();
      let mut objects = Vec::new();
      for td in deps.iter().filter(|td| td.is_live()) {
        let subj = td.has_reln("nsubj") || td.has_reln("nsubjpass");
        if subj && td.gov == *modifier {
          has_subject = true;
          break;
        }
        if td.has_reln("aux") && td.gov == *modifier {
          has_aux = true;
        }
        if subj && td.gov == *head {
          subjects.push(td.dep.clone());
        }
        if td.has_reln("dobj") && td.gov == *head {
          objects.push(td.dep.clone());
        }
      }
      if has_subject || modifier.word.eq_ignore_ascii_case("to") == has_aux {
        continue;
      }
      let controllers = if objects.is_empty() { subjects } else { objects };
      for controller in controllers {
        let td = TypedDependency::new(nsubj.clone(), modifier.clone(), controller).extra();
        if !deps.contains(&td) && !added.contains(&td) {
          trace!(gov = %td.gov, dep = %td.dep, "controlled subject");
          added.push(td);
        }
      }
    }
    deps.extend(added);
  }

  /// Plain `dep` edges that duplicate a collapsed preposition go
  fn remove_dep(&self, deps: &mut Deps) {
    let preps: FxHashSet<(IndexedWord, IndexedWord)> = deps
      .iter()
      .filter(|td| is_family(td, "prep") || is_family(td, "prepc"))
      .map(|td| (td.gov.clone(), td.dep.clone()))
      .collect();
    deps.retain(|td| !(td.has_reln(DEPENDENT) && preps.contains(&(td.gov.clone(), td.dep.clone()))));
  }
}

fn is_conj_with_no_prep(deps: &Deps, node: &IndexedWord, possibles: &[usize]) -> bool {
  possibles.iter().any(|&k| {
    let td = &deps[k];
    td.gov == *node && is(td, "conj") && !is_prep_tag(&td.dep.tag)
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dependency::read_dependencies;
  use crate::english::English;
  use crate::structure::Language;

  fn deps(s: &str, tags: &[(&str, &str)]) -> Deps {
    let mut deps = read_dependencies(s, English::global().relations()).unwrap();
    for td in deps.iter_mut() {
      for w in [&mut td.gov, &mut td.dep] {
        if let Some((_, tag)) = tags.iter().find(|(word, _)| *word == w.word) {
          w.tag = tag.to_string();
        }
      }
    }
    deps
  }

  fn printed(deps: &Deps) -> Vec<String> {
    deps.iter().map(|td| td.to_string()).collect()
  }

  fn treat_cc(deps: &mut Deps) {
    Collapser::new(English::global().relations()).treat_cc(deps);
  }

  #[test]
  fn test_prepc_conjuncts_share_no_subject() {
    let tags = [("seeing", "VBG"), ("hearing", "VBG"), ("left", "VBD")];
    let mut d = deps(
      "nsubj(left-2, He-1)
       prepc_without(left-2, seeing-5)
       nsubj(seeing-5, them-4)
       conj_and(seeing-5, hearing-7)
       dobj(hearing-7, it-8)",
      &tags,
    );
    treat_cc(&mut d);
    let out = printed(&d);
    assert!(out.contains(&"prepc_without(left-2, hearing-7)".to_string()), "{:?}", out);
    assert!(!out.contains(&"nsubj(hearing-7, them-4)".to_string()), "{:?}", out);

    let mut d = deps(
      "nsubj(left-2, He-1)
       advcl(left-2, seeing-5)
       nsubj(seeing-5, them-4)
       conj_and(seeing-5, hearing-7)",
      &tags,
    );
    treat_cc(&mut d);
    assert!(printed(&d).contains(&"nsubj(hearing-7, them-4)".to_string()));
  }

  #[test]
  fn test_relative_clause_edges_stay_on_first_conjunct() {
    // I talked with the man who left and the woman who stayed
    let lines = [
      "nsubj(talked-2, I-1)",
      "prep_with(talked-2, man-5)",
      "det(man-5, the-4)",
      "nsubj(left-7, man-5)",
      "rcmod(man-5, left-7)",
      "conj_and(man-5, woman-10)",
      "det(woman-10, the-9)",
      "nsubj(stayed-12, woman-10)",
      "rcmod(woman-10, stayed-12)",
    ];
    let tags = [("man", "NN"), ("woman", "NN")];
    let mut d = deps(&lines.join("\n"), &tags);
    treat_cc(&mut d);
    let out = printed(&d);
    assert!(out.contains(&"prep_with(talked-2, woman-10)".to_string()), "{:?}", out);
    assert!(!out.contains(&"nsubj(left-7, woman-10)".to_string()), "{:?}", out);

    // without a relative clause of its own the second conjunct gets the edge
    let mut d = deps(&lines[..7].join("\n"), &tags);
    treat_cc(&mut d);
    assert!(printed(&d).contains(&"nsubj(left-7, woman-10)".to_string()));
  }

  #[test]
  fn test_dep_duplicating_a_preposition_removed() {
    let mut d = deps(
      "root(ROOT-0, looking-4)
       dep(looking-4, What-1)
       aux(looking-4, are-2)
       nsubj(looking-4, you-3)
       prep(looking-4, for-5)
       pobj(for-5, What-1)",
      &[("looking", "VBG"), ("for", "IN"), ("What", "WP")],
    );
    Collapser::new(English::global().relations()).collapse(&mut d, true, true);
    let out = printed(&d);
    assert!(out.contains(&"prep_for(looking-4, What-1)".to_string()), "{:?}", out);
    assert!(!out.contains(&"dep(looking-4, What-1)".to_string()), "{:?}", out);

    let mut d = deps("prep_for(looking-4, What-1)\ndep(looking-4, What-1)\ndep(looking-4, now-6)", &[]);
    Collapser::new(English::global().relations()).remove_dep(&mut d);
    assert_eq!(printed(&d), vec!["prep_for(looking-4, What-1)", "dep(looking-4, now-6)"]);
  }
}
