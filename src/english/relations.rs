//! The English relation catalog.
//!
//! Table order matters: when two governors claim the same dependent while
//! the basic graph is built, the relation listed first wins. Parents are
//! listed before their children.

use super::lexicon::{copula_words, passive_words, time_words};
use crate::relation::RelationDef;

macro_rules! copula {
  () => {
    concat!("/^(?i:", copula_words!(), ")$/")
  };
}

macro_rules! passive {
  () => {
    concat!("/^(?i:", passive_words!(), ")$/")
  };
}

macro_rules! time_word {
  () => {
    concat!("/^(?i:", time_words!(), ")$/")
  };
}

macro_rules! not_word {
  () => {
    r"/^(?i:not|n't|never)$/"
  };
}

/// Coordinated phrase categories that take `conj` and `cc` dependents
macro_rules! coordinated {
  () => {
    r"/^(?:ADJP|JJP|PP|QP|(?:WH)?NP(?:-TMP|-ADV)?|ADVP|UCP(?:-TMP|-ADV)?|NX|NML)$/"
  };
}

/// Anything that may follow a conjunction and still be a conjunct
macro_rules! conjunct {
  () => {
    r"!/^(?:SBAR|PRN|``|''|-[LR]RB-|,|:|\.|CC|CONJP)$/=target"
  };
}

const fn rel(
  short_name: &'static str,
  long_name: &'static str,
  parent: &'static str,
  source: Option<&'static str>,
  patterns: &'static [&'static str],
) -> RelationDef {
  RelationDef {
    short_name,
    long_name,
    parent,
    source,
    patterns,
  }
}

pub const ENGLISH_RELATIONS: &[RelationDef] = &[
  rel(
    "aux",
    "auxiliary",
    "dep",
    Some("VP|SQ|SINV|CONJP"),
    &[
      r"VP < VP < /^(?:TO|MD|VB.*|AUXG?)$/=target",
      r"SQ|SINV < (/^(?:VB|MD|AUX)/=target $++ /^(?:VP|ADJP)$/)",
    ],
  ),
  rel(
    "auxpass",
    "passive auxiliary",
    "aux",
    Some("VP|SQ|SINV"),
    &[
      concat!(r"VP < (/^(?:VB|AUX)/=target < ", passive!(), r") < (VP < VBN|VBD)"),
      concat!(r"VP < (/^(?:VB|AUX)/=target < ", passive!(), r") < (VP < (VP < VBN|VBD) < CC)"),
      concat!(r"SQ|SINV < (/^(?:VB|AUX)/=target < ", passive!(), r" $++ (VP < VBN|VBD))"),
    ],
  ),
  rel(
    "cop",
    "copula",
    "aux",
    Some("VP|SQ|SINV|SBARQ"),
    &[
      concat!(r"VP < (/^(?:VB|AUX)/=target < ", copula!(), r" $++ (/^(?:ADJP|NP|WHNP)$/ !< VBN|VBD))"),
      concat!(
        r"SQ|SINV < (/^(?:VB|AUX)/=target < ",
        copula!(),
        r" [ $++ (ADJP !< VBN|VBD) | $++ (NP $++ NP) ])"
      ),
    ],
  ),
  rel(
    "conj",
    "conj",
    "dep",
    None,
    &[
      concat!(
        r"VP|S|SBAR|SBARQ|SINV|SQ|RRC < (CC|CONJP $-- !/^(?:``|-LRB-|PRN|PP|ADVP|RB)/ $+ ",
        conjunct!(),
        ")"
      ),
      concat!(
        r"VP|S|SBAR|SBARQ|SINV|SQ < (CC $++ (CC|CONJP $+ ",
        conjunct!(),
        "))"
      ),
      concat!(
        coordinated!(),
        r" [ < (CC|CONJP $-- !/^(?:``|-LRB-|PRN)$/ $+ ",
        conjunct!(),
        r") | < (CC|CONJP $-- !/^(?:``|-LRB-|PRN)$/ $+ (ADVP $+ ",
        conjunct!(),
        ")) ]"
      ),
      concat!(
        coordinated!(),
        r" < (/^,$/ $- __ $+ (",
        conjunct!(),
        r" $++ CC|CONJP))"
      ),
    ],
  ),
  rel(
    "cc",
    "coordination",
    "dep",
    None,
    &[r"__ < (CC|CONJP=target !< /^(?i:either|neither|both)$/)"],
  ),
  rel("arg", "argument", "dep", None, &[]),
  rel("subj", "subject", "arg", None, &[]),
  rel(
    "nsubj",
    "nominal subject",
    "subj",
    Some("S|SQ|SINV|SBARQ|SBAR"),
    &[
      concat!(r"S < ((NP|WHNP=target !< EX !<# (/^NN/ < ", time_word!(), r")) $++ VP)"),
      r"SQ < (NP=target !< EX $++ VP)",
      r"SQ < (NP=target !< EX $- /^(?:VB|AUX)/ !$++ VP)",
      r"SBAR < (WHNP=target !< WRB) < (S !< NP < VP)",
      r"SBARQ < (WHNP=target !< WRB) < (SQ !< NP < VP)",
      concat!(r"S|SQ < (NP < EX) < (VP < (/^(?:VB|AUX)/ < ", copula!(), r") < NP=target)"),
      r"SINV < (NP=target !< EX $- /^(?:VB|AUX|MD)/ $++ VP)",
    ],
  ),
  rel(
    "nsubjpass",
    "nominal passive subject",
    "nsubj",
    Some("S|SQ|SBAR"),
    &[
      concat!(
        r"S < ((NP|WHNP=target !< EX) $++ (VP < (/^(?:VB|AUX)/ < ",
        passive!(),
        r") < (VP < VBN|VBD)))"
      ),
      concat!(
        r"S < ((NP|WHNP=target !< EX) $++ (VP < (/^(?:VB|AUX)/ < ",
        passive!(),
        r") < (VP < (VP < VBN|VBD) < CC)))"
      ),
      concat!(
        r"S < ((NP|WHNP=target !< EX) $++ (VP < (VP < (/^(?:VB|AUX)/ < ",
        passive!(),
        r") < (VP < VBN|VBD))))"
      ),
      concat!(r"SQ < (NP=target !< EX $- (/^(?:VB|AUX)/ < ", passive!(), r") $++ (VP < VBN|VBD))"),
      concat!(
        r"SBAR < (WHNP=target !< WRB) < (S !< NP < (VP < (/^(?:VB|AUX)/ < ",
        passive!(),
        r") < (VP < VBN|VBD)))"
      ),
    ],
  ),
  rel(
    "csubj",
    "clausal subject",
    "subj",
    Some("S"),
    &[r"S < (SBAR|S=target !$+ /^,$/ $++ (VP !$-- NP))"],
  ),
  rel(
    "csubjpass",
    "clausal passive subject",
    "csubj",
    Some("S"),
    &[concat!(
      r"S < (SBAR|S=target !$+ /^,$/ $++ (VP !$-- NP < (/^(?:VB|AUX)/ < ",
      passive!(),
      r") < (VP < VBN|VBD)))"
    )],
  ),
  rel("comp", "complement", "arg", None, &[]),
  rel("obj", "object", "comp", None, &[]),
  rel(
    "dobj",
    "direct object",
    "obj",
    Some("VP|SQ|SBAR|SBARQ"),
    &[
      concat!(
        r"VP !< (/^(?:VB|AUX)/ < ",
        copula!(),
        r") < (NP|WHNP=target !<# (/^NN/ < ",
        time_word!(),
        r") !$+ NP)"
      ),
      concat!(r"VP !< (/^(?:VB|AUX)/ < ", copula!(), r") < (NP|WHNP=target $+ NP-TMP)"),
      r"SBAR < (WHNP=target !< WRB) < (S < NP < (VP !< SBAR !< NP !< (S < (VP < TO)) !< (PP <: IN|TO)))",
      r"SBARQ < (WHNP=target !< WRB) < (SQ < NP < (VP !< NP !< (S < (VP < TO)) !< (PP <: IN|TO)))",
    ],
  ),
  rel(
    "iobj",
    "indirect object",
    "obj",
    Some("VP"),
    &[concat!(
      r"VP < (NP=target !< /\$/ !<# (/^NN/ < ",
      time_word!(),
      r") $+ (NP !<# (/^NN/ < ",
      time_word!(),
      r")))"
    )],
  ),
  rel(
    "pobj",
    "prepositional object",
    "obj",
    Some("(?:WH)?PP(?:-TMP|-ADV)?"),
    &[
      r"/^(?:WH)?PP(?:-TMP|-ADV)?$/ < /^(?:IN|TO|VBG|VBN|RP|RB|FW|JJ)$/ < (/^(?:(?:WH)?(?:NP|ADJP)(?:-TMP|-ADV)?|NX|NML)$/=target !$- @NP)",
    ],
  ),
  rel(
    "pcomp",
    "prepositional complement",
    "comp",
    Some("(?:WH)?PP(?:-TMP|-ADV)?"),
    &[r"@PP|WHPP < (IN|VBG|VBN|TO $+ @SBAR|S|PP|ADVP=target)"],
  ),
  rel(
    "ccomp",
    "clausal complement",
    "comp",
    Some("VP|ADJP"),
    &[
      r"VP|ADJP < (SBAR=target [ <, (IN < /^(?i:that|whether)$/) | <: S ])",
      r"VP < (S=target < NP < (VP !<, TO))",
    ],
  ),
  rel(
    "xcomp",
    "xclausal complement",
    "comp",
    Some("VP|ADJP"),
    &[
      r"VP|ADJP < (S=target !< NP < (VP < TO))",
      r"VP < (S=target !< NP < (VP <, VBG))",
    ],
  ),
  rel(
    "acomp",
    "adjectival complement",
    "comp",
    Some("VP"),
    &[r"VP < (ADJP=target !$-- NP)"],
  ),
  rel("ref", "referent", "dep", None, &[]),
  rel(
    "expl",
    "expletive",
    "dep",
    Some("S|SQ|SINV"),
    &[r"S|SQ|SINV < (NP=target < EX)"],
  ),
  rel("mod", "modifier", "dep", None, &[]),
  rel(
    "advcl",
    "adverbial clause modifier",
    "mod",
    Some("VP|S|SQ|SINV|SBARQ"),
    &[r"VP|S|SQ|SINV|SBARQ < (SBAR=target <, (IN !< /^(?i:that|whether)$/) < S)"],
  ),
  rel(
    "rcmod",
    "relative clause modifier",
    "mod",
    Some("(?:NP|NML)(?:-TMP|-ADV)?"),
    &[
      r"/^(?:NP|NML)(?:-TMP|-ADV)?$/ < (SBAR=target < /^WH/ < S)",
      r"/^(?:NP|NML)(?:-TMP|-ADV)?$/ < (NP $+ (SBAR=target <: (S < NP < VP)))",
    ],
  ),
  rel(
    "amod",
    "adjectival modifier",
    "mod",
    None,
    &[
      r"/^(?:NP|NX|NML|NAC|WHNP)(?:-TMP|-ADV)?$/ < (/^(?:ADJP|WHADJP|JJ|JJR|JJS|JJP|VBN|VBG)$/=target !$- CC)",
    ],
  ),
  rel(
    "num",
    "numeric modifier",
    "mod",
    None,
    &[r"/^(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?$/ < (CD|QP=target !$- CC)"],
  ),
  rel(
    "number",
    "compound number modifier",
    "mod",
    Some("QP|ADJP"),
    &[r"QP|ADJP < (/^(?:CD|\$|#)$/=target $+ CD)"],
  ),
  rel(
    "appos",
    "appositional modifier",
    "mod",
    None,
    &[r"/^(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?$/ < (NP=target $- /^,$/ $-- (NP !$ CC|CONJP))"],
  ),
  rel(
    "nn",
    "nn modifier",
    "mod",
    None,
    &[
      r"/^(?:WH)?(?:NP|NX|NAC|NML)(?:-TMP|-ADV)?$/ < (/^(?:NN|NNS|NNP|NNPS|FW|NML)$/=target $++ /^(?:NN|NNS|NNP|NNPS|FW)$/ !$++ POS !$++ CC !$+ /^,$/)",
    ],
  ),
  rel(
    "npadvmod",
    "noun phrase adverbial modifier",
    "mod",
    None,
    &[
      r"/^(?:(?:WH)?NP|ADJP|ADVP|VP|S|SINV|SQ|PP|RRC|JJP|QP)(?:-TMP|-ADV)?$/ < NP-ADV=target",
      r"ADJP|ADVP < (NP=target $+ /^(?:JJ|JJR|JJS|RB|RBR|RBS)$/)",
    ],
  ),
  rel(
    "tmod",
    "temporal modifier",
    "npadvmod",
    None,
    &[
      r"/^(?:VP|NP|ADJP|S|SINV|SQ|SBARQ|RRC)(?:-TMP|-ADV)?$/ < NP-TMP=target",
      concat!(r"VP|ADJP < (NP=target <# (/^NN/ < ", time_word!(), r"))"),
    ],
  ),
  rel(
    "det",
    "determiner",
    "mod",
    None,
    &[
      r"/^(?:NP(?:-TMP|-ADV)?|NAC|NML|NX|X)$/ < (DT=target !$+ DT !< /^(?i:either|neither|both)$/)",
      r"/^(?:WHNP|NP)$/ < (WDT=target $++ /^N/)",
    ],
  ),
  rel(
    "predet",
    "predeterminer",
    "mod",
    None,
    &[r"/^(?:WH)?(?:NP|NX|NAC|NML)(?:-TMP|-ADV)?$/ < (PDT|DT=target $+ /^(?:DT|WP\$|PRP\$)$/ !$++ CC)"],
  ),
  rel(
    "preconj",
    "preconjunct",
    "mod",
    None,
    &[r"__ < (/^(?:PDT|CC|DT|CONJP)$/=target < /^(?i:either|neither|both)$/ $++ CC)"],
  ),
  rel(
    "poss",
    "possession modifier",
    "mod",
    None,
    &[r"/^(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?$/ [ < PRP$|WP$=target | < (NP=target < POS) ]"],
  ),
  rel(
    "possessive",
    "possessive modifier",
    "mod",
    None,
    &[
      r"/^(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?$/ < POS=target",
      r"/^(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?$/ < (VBZ=target < /^'s$/)",
    ],
  ),
  rel(
    "prep",
    "prepositional modifier",
    "mod",
    None,
    &[
      r"/^(?:(?:WH)?(?:NP|ADJP|ADVP|NX|NML)(?:-TMP|-ADV)?|VP|NAC|SQ|FRAG|PRN|X|RRC)$/ < (/^(?:WH)?PP(?:-TMP|-ADV)?$/=target !$- CC|CONJP)",
      r"S|SINV < (/^PP(?:-TMP|-ADV)?$/=target !< SBAR) < VP",
    ],
  ),
  rel(
    "prt",
    "phrasal verb particle",
    "mod",
    Some("VP|ADJP"),
    &[r"VP|ADJP < PRT=target"],
  ),
  rel(
    "parataxis",
    "parataxis",
    "dep",
    Some("S|VP"),
    &[
      r"VP < (PRN=target < S|SINV|SBAR)",
      r"S|VP < (/^:$/ $+ /^S/=target)",
    ],
  ),
  rel("sdep", "semantic dependent", "dep", None, &[]),
  rel("xsubj", "controlling subject", "sdep", None, &[]),
  rel("agent", "agent", "arg", None, &[]),
  rel(
    "advmod",
    "adverbial modifier",
    "mod",
    None,
    &[concat!(
      r"/^(?:VP|ADJP|JJP|WHADJP|SQ?|SBARQ?|SINV|XS|RRC|(?:WH)?NP(?:-TMP|-ADV)?)$/ < (RB|RBR|RBS|WRB|ADVP|WHADVP=target !< ",
      not_word!(),
      r" !< (RB < ",
      not_word!(),
      "))"
    )],
  ),
  rel(
    "neg",
    "negation modifier",
    "advmod",
    None,
    &[concat!(
      r"/^(?:VP|ADJP|S|SBAR|SINV|SQ|NP(?:-TMP|-ADV)?|FRAG|CONJP|PP|NAC|NML|NX|ADVP|WHADVP)$/ [ < (RB=target < ",
      not_word!(),
      r") | < (ADVP=target < (RB < ",
      not_word!(),
      ")) ]"
    )],
  ),
  rel(
    "mark",
    "marker",
    "mod",
    Some("SBAR"),
    &[r"SBAR < (IN|DT=target $++ S|FRAG)"],
  ),
  rel(
    "mwe",
    "multi-word expression",
    "mod",
    None,
    &[r"/^(?:PP|XS|ADVP|CONJP)$/ < (/^(?:IN|RB|JJ|VBN|VBG)$/=target $+ /^(?:IN|TO)$/)"],
  ),
  rel(
    "vmod",
    "verb modifier",
    "mod",
    Some("(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?"),
    &[
      r"/^(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?$/ < (VP=target < /^VB[NGD]$/ $-- @NP)",
      r"/^(?:WH)?(?:NP|NML)(?:-TMP|-ADV)?$/ < (S=target !< NP < (VP < TO) $-- @NP)",
    ],
  ),
  rel(
    "quantmod",
    "quantifier modifier",
    "mod",
    Some("QP"),
    &[r"QP < /^(?:IN|RB|RBR|RBS|PDT|DT|JJ|JJR|JJS|XS)$/=target"],
  ),
];

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pattern::TreePattern;
  use crate::relation::RelationSet;

  #[test]
  fn test_every_pattern_compiles() {
    for def in ENGLISH_RELATIONS {
      for pattern in def.patterns {
        if let Err(e) = TreePattern::compile(pattern) {
          panic!("{}: {}", def.short_name, e);
        }
      }
    }
  }

  #[test]
  fn test_table_compiles() {
    let set = RelationSet::from_defs(ENGLISH_RELATIONS).unwrap();
    assert_eq!(set.values().len(), ENGLISH_RELATIONS.len() + 1);
    let nsubjpass = set.value_of("nsubjpass").unwrap();
    let subj = set.value_of("subj").unwrap();
    assert!(subj.is_ancestor(&nsubjpass));
    assert!(set.value_of("tmod").unwrap().parent().unwrap().is("npadvmod"));
    assert!(set.applicable("PP").any(|r| r.is("pobj")));
    assert!(!set.applicable("NP").any(|r| r.is("pobj")));
  }
}
