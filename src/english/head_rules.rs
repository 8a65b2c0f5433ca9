//! Head rules for Penn Treebank categories: Collins' table with the
//! changes that favour content words

use super::lexicon::PUNCTUATION_TAGS;
use crate::head::Direction::{self, *};
use crate::head::{HeadRule, HeadRules};

fn r(direction: Direction, categories: &[&str]) -> HeadRule {
  HeadRule::new(direction, categories)
}

pub fn english_head_rules() -> HeadRules {
  let mut rules = HeadRules::new(PUNCTUATION_TAGS);

  rules.insert(
    "ADJP",
    vec![
      r(Left, &["$"]),
      r(RightDis, &["NNS", "NN", "JJ", "QP", "VBN", "VBG"]),
      r(Left, &["ADJP"]),
      r(RightDis, &["JJP", "JJR", "JJS", "DT", "RB", "RBR", "CD", "IN", "VBD"]),
      r(Left, &["ADVP", "NP"]),
    ],
  );
  rules.insert("JJP", vec![r(Left, &["NNS", "NN", "$", "QP", "JJ", "VBN", "VBG", "ADJP", "JJP", "JJR", "NP", "JJS", "DT", "FW", "RBR", "RBS", "SBAR", "RB"])]);
  rules.insert(
    "ADVP",
    vec![
      r(Left, &["ADVP", "IN"]),
      r(RightDis, &["RB", "RBR", "RBS", "JJ", "JJR", "JJS"]),
      r(RightDis, &["RP", "DT", "NN", "CD", "NP", "VBN", "NNP", "CC", "FW", "NNS", "ADJP", "NML"]),
    ],
  );
  rules.insert("CONJP", vec![r(Right, &["CC", "VB", "JJ", "RB", "IN"])]);
  rules.insert("FRAG", vec![r(Right, &[])]);
  rules.insert("INTJ", vec![r(Left, &[])]);
  rules.insert("LST", vec![r(Right, &["LS", ":"])]);
  rules.insert("NAC", vec![r(Left, &["NN", "NNS", "NML", "NNP", "NNPS", "NP", "NAC", "EX", "$", "CD", "QP", "PRP", "VBG", "JJ", "JJS", "JJR", "ADJP", "JJP", "FW"])]);
  rules.insert("NX", vec![r(Right, &["NP", "NX"])]);
  rules.insert(
    "PP",
    vec![
      r(Right, &["IN", "TO", "VBG", "VBN", "RP", "FW", "JJ", "SYM"]),
      r(Left, &["PP"]),
    ],
  );
  rules.insert("PRN", vec![r(Left, &["VP", "NP", "PP", "SQ", "S", "SINV", "SBAR", "ADJP", "JJP", "ADVP", "INTJ", "WHNP", "NAC", "VBP", "JJ", "NN", "NNP"])]);
  rules.insert("PRT", vec![r(Right, &["RP"])]);
  rules.insert("QP", vec![r(Left, &["$", "IN", "NNS", "NN", "JJ", "CD", "PDT", "DT", "RB", "NCD", "QP", "JJR", "JJS"])]);
  rules.insert("RRC", vec![r(Left, &["RRC"]), r(Right, &["VP", "ADJP", "JJP", "NP", "PP", "ADVP"])]);
  rules.insert(
    "S",
    vec![
      r(Left, &["VP", "S", "FRAG", "SBAR", "ADJP", "JJP", "UCP", "TO"]),
      r(Right, &["NP"]),
    ],
  );
  rules.insert("SBAR", vec![r(Left, &["S", "SQ", "SINV", "SBAR", "FRAG", "VP", "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT"])]);
  rules.insert("SBARQ", vec![r(Left, &["SQ", "S", "SINV", "SBARQ", "FRAG", "SBAR"])]);
  rules.insert("SINV", vec![r(Left, &["VBZ", "VBD", "VBP", "VB", "MD", "VBN", "VP", "S", "SINV", "ADJP", "JJP", "NP"])]);
  rules.insert("SQ", vec![r(Left, &["VP", "SQ", "ADJP", "VB", "VBZ", "VBD", "VBP", "MD", "AUX", "AUXG"])]);
  rules.insert("UCP", vec![r(Right, &[])]);
  rules.insert("VP", vec![r(Left, &["TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "JJP", "NN", "NNS", "JJ", "NP", "NNP"])]);
  rules.insert("WHADJP", vec![r(Left, &["WRB", "WHADVP", "RB", "JJ", "ADJP", "JJP", "JJR"])]);
  rules.insert("WHADVP", vec![r(Right, &["WRB", "WHADVP"])]);
  rules.insert(
    "WHNP",
    vec![
      r(RightDis, &["NN", "NNP", "NNPS", "NNS", "NX", "NML", "JJR", "WP"]),
      r(Left, &["WHNP", "NP"]),
      r(RightDis, &["$", "ADJP", "PRN", "FW"]),
      r(Right, &["CD"]),
      r(RightDis, &["JJ", "JJS", "RB", "QP"]),
      r(Left, &["WHPP", "WHADJP", "WP$", "WDT"]),
    ],
  );
  rules.insert("WHPP", vec![r(Right, &["IN", "TO", "FW"])]);
  rules.insert("X", vec![r(Right, &["S", "VP", "ADJP", "JJP", "NP", "SBAR", "PP", "X"])]);

  let nominal = vec![
    r(RightDis, &["NN", "NNP", "NNPS", "NNS", "NML", "NX", "JJR"]),
    r(Left, &["NP", "PRP"]),
    r(RightDis, &["$", "ADJP", "JJP", "PRN", "FW"]),
    r(Right, &["CD"]),
    r(RightDis, &["JJ", "JJS", "RB", "QP", "DT", "WDT", "RBR", "ADVP"]),
    r(RightDis, &["POS"]),
  ];
  rules.insert("NP", nominal.clone());
  rules.insert("NML", nominal);
  rules.insert("POSSP", vec![r(Right, &["POS"])]);
  rules.insert("ROOT", vec![r(Left, &["S", "SQ", "SINV", "SBARQ", "FRAG"])]);
  rules.insert("TOP", vec![r(Left, &["S", "SQ", "SINV", "SBARQ", "FRAG"])]);
  rules.insert("XS", vec![r(Right, &["IN"])]);
  rules.insert("EDITED", vec![r(Left, &[])]);
  rules.insert("META", vec![r(Left, &[])]);

  rules
}
