//! Closed-class word lists for English

use regex::Regex;

use crate::utils::regex_static;

/// Alternations shared by the lexicon and the relation patterns
macro_rules! copula_words {
  () => {
    "am|is|are|r|be|being|'s|'re|'m|was|were|been|s|ai|m|art|ar|wase"
  };
}

macro_rules! passive_words {
  () => {
    "am|is|are|r|be|being|'s|'re|'m|was|were|been|s|ai|m|art|ar|get|gets|got|getting|gotten"
  };
}

macro_rules! time_words {
  () => {
    "mornings?|evenings?|nights?|noons?|afternoons?|days?|weeks?|months?|years?|decades?|centur(?:y|ies)|today|yesterday|tomorrow|tonight|monday|tuesday|wednesday|thursday|friday|saturday|sunday|january|february|march|april|may|june|july|august|september|october|november|december|spring|summer|fall|autumn|winter|weekends?|lately|recently|now"
  };
}

pub(crate) use copula_words;
pub(crate) use passive_words;
pub(crate) use time_words;

pub const PUNCTUATION_TAGS: &[&str] = &["''", "``", "-LRB-", "-RRB-", ".", ":", ","];

pub const PUNCTUATION_WORDS: &[&str] = &[
  "''", "'", "``", "`", "-LRB-", "-RRB-", "-LCB-", "-RCB-", ".", "?", "!", ",", ":", "-", "--", "...", ";",
];

pub const AUXILIARIES: &[&str] = &[
  "will", "wo", "shall", "sha", "may", "might", "should", "would", "can", "could", "ca", "must", "has", "have", "had",
  "having", "get", "gets", "getting", "got", "gotten", "do", "does", "did", "to", "'ve", "ve", "v", "'d", "d", "'ll",
  "ll", "na", "of", "hav", "hvae", "as",
];

/// Forms of `be` and `get` that head passives and progressives
pub const PASSIVE_AUXILIARIES: &[&str] = &[
  "be", "being", "been", "am", "are", "r", "is", "ai", "was", "were", "'m", "m", "'re", "'s", "s", "art", "ar", "get",
  "getting", "gets", "got",
];

pub const COPULAS: &[&str] = &[
  "be", "being", "been", "am", "are", "r", "is", "ai", "was", "were", "'m", "m", "ar", "art", "'s", "s", "wase",
];

/// Two-word prepositions, as `first_second`, sorted
pub const MULTIWORD_PREPS: &[&str] = &[
  "according_to",
  "across_from",
  "ahead_of",
  "along_with",
  "alongside_of",
  "apart_from",
  "as_for",
  "as_from",
  "as_of",
  "as_per",
  "as_to",
  "aside_from",
  "away_from",
  "based_on",
  "because_of",
  "close_by",
  "close_to",
  "compared_to",
  "compared_with",
  "contrary_to",
  "depending_on",
  "due_to",
  "except_for",
  "exclusive_of",
  "far_from",
  "followed_by",
  "inside_of",
  "instead_of",
  "irrespective_of",
  "near_to",
  "next_to",
  "off_of",
  "out_of",
  "outside_of",
  "owing_to",
  "preliminary_to",
  "preparatory_to",
  "previous_to",
  "prior_to",
  "pursuant_to",
  "regardless_of",
  "subsequent_to",
  "such_as",
  "thanks_to",
  "together_with",
];

/// Three-word prepositions, as `first_second_third`
pub const THREEWORD_PREPS: &[&str] = &[
  "by_means_of",
  "in_accordance_with",
  "in_addition_to",
  "in_case_of",
  "in_front_of",
  "in_lieu_of",
  "in_place_of",
  "in_spite_of",
  "on_account_of",
  "on_behalf_of",
  "on_top_of",
  "with_regard_to",
  "with_respect_to",
];

pub fn is_punctuation_word(word: &str) -> bool {
  PUNCTUATION_WORDS.contains(&word)
}

pub fn is_punctuation_tag(tag: &str) -> bool {
  PUNCTUATION_TAGS.contains(&tag)
}

/// Words that can introduce a relative clause
pub fn is_relativizer(word: &str) -> bool {
  regex_static!(RELATIVIZER, r"^(?i:that|what|which|who|whom|whose)$");
  RELATIVIZER.is_match(word)
}

pub fn is_copula(word: &str) -> bool {
  let lower = word.to_lowercase();
  COPULAS.contains(&lower.as_str())
}

/// Nouns that head temporal NPs
pub fn time_word_regex() -> &'static Regex {
  regex_static!(TIME_WORD, concat!("^(?i:", time_words!(), ")$"));
  &*TIME_WORD
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_lists() {
    assert!(MULTIWORD_PREPS.windows(2).all(|w| w[0] < w[1]));
    assert!(is_relativizer("Which"));
    assert!(!is_relativizer("whichever"));
    assert!(is_copula("Is"));
    assert!(is_punctuation_word("--"));
    assert!(time_word_regex().is_match("Tuesday"));
  }
}
