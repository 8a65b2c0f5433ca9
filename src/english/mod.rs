//! English grammatical relations, head rules and collapsing

mod collapse;
mod head_rules;
pub mod lexicon;
mod relations;

pub use head_rules::english_head_rules;
pub use relations::ENGLISH_RELATIONS;

use self::collapse::Collapser;
use self::lexicon::{AUXILIARIES, COPULAS, PASSIVE_AUXILIARIES, is_punctuation_tag, is_punctuation_word};
use crate::dependency::TypedDependency;
use crate::error::Result;
use crate::head::{AuxiliaryWords, HeadFinder, RuleHeadFinder, SemanticHeadFinder};
use crate::relation::RelationSet;
use crate::structure::Language;

lazy_static! {
  static ref ENGLISH: English = English::new().unwrap();
}

/// The English language bundle: relation catalog, semantic head finder and
/// the Stanford collapsing passes
pub struct English {
  relations: RelationSet,
  head_finder: SemanticHeadFinder,
}

impl English {
  pub fn new() -> Result<Self> {
    Self::with_copula_head(false)
  }

  /// With `copula_head` set the copula, not the predicate, heads a
  /// copular clause.
  pub fn with_copula_head(copula_head: bool) -> Result<Self> {
    let relations = RelationSet::from_defs(ENGLISH_RELATIONS)?;
    let words = AuxiliaryWords::new(AUXILIARIES, PASSIVE_AUXILIARIES, COPULAS);
    let base = RuleHeadFinder::new(english_head_rules());
    let head_finder = SemanticHeadFinder::new(base, &words, copula_head)?;
    Ok(Self {
      relations,
      head_finder,
    })
  }

  /// A shared instance with default options
  pub fn global() -> &'static English {
    &ENGLISH
  }

  fn collapser(&self) -> Collapser<'_> {
    Collapser::new(&self.relations)
  }
}

impl Language for English {
  fn relations(&self) -> &RelationSet {
    &self.relations
  }

  fn head_finder(&self) -> &dyn HeadFinder {
    &self.head_finder
  }

  fn accept(&self, word: &str, tag: &str) -> bool {
    !is_punctuation_word(word) && !is_punctuation_tag(tag)
  }

  fn post_process_dependencies(&self, deps: &mut Vec<TypedDependency>) {
    self.collapser().correct_subj_pass(deps);
  }

  fn extra_tree_dep_filter(&self, dep: &TypedDependency) -> bool {
    !dep.has_reln("ref")
  }

  fn correct_dependencies(&self, deps: &mut Vec<TypedDependency>) {
    self.collapser().correct_dependencies(deps);
  }

  fn collapse_dependencies(&self, deps: &mut Vec<TypedDependency>, cc_process: bool, include_extras: bool) {
    self.collapser().collapse(deps, cc_process, include_extras);
  }

  fn collapse_dependencies_tree(&self, deps: &mut Vec<TypedDependency>) {
    self.collapser().collapse_tree(deps);
  }
}
