//! Stanford-style typed dependencies from constituency trees.
//!
//! A bracketed tree is read into a [`SynTree`], heads are found with a
//! [`HeadFinder`], and every relation of a [`RelationSet`] that matches a
//! phrase yields a [`TypedDependency`]. The English bundle also collapses
//! prepositions, conjunctions and relative pronouns into the labels.
//!
//! ```no_run
//! use treedeps::{English, GrammaticalStructure, SynTree};
//!
//! let tree: SynTree<String, String> = "(ROOT (S (NP (NNP Clinton)) (VP (VBD defeated) (NP (NNP Dole)))))"
//!   .parse()
//!   .unwrap();
//! let gs = GrammaticalStructure::new(&tree, English::global()).unwrap();
//! for dep in gs.typed_dependencies_cc_processed(true) {
//!   println!("{}", dep);
//! }
//! ```

#[macro_use]
extern crate lazy_static;

pub mod dependency;
pub mod english;
pub mod error;
pub mod graph;
pub mod head;
pub mod pattern;
pub mod read_tree;
pub mod relation;
pub mod structure;
pub mod syntree;
pub mod tree;
pub mod utils;

pub use crate::dependency::{IndexedWord, TypedDependency, is_connected, parse_dependency, read_dependencies};
pub use crate::english::English;
pub use crate::error::{Error, Result};
pub use crate::head::{HeadFinder, RuleHeadFinder, SemanticHeadFinder};
pub use crate::pattern::{NodeMatcher, TreePattern};
pub use crate::read_tree::read_trees;
pub use crate::relation::{GrammaticalRelation, RelationDef, RelationSet, Reln};
pub use crate::structure::{BuildOptions, GrammaticalStructure, Language};
pub use crate::syntree::{Constituent, SynTree, Word};
pub use crate::tree::{NodeId, Tree};
