/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: regex::Regex = regex::Regex::new($pattern).unwrap();
    }
  };
}

pub(crate) use regex_static;

/// Strips function tags and coindexation from a treebank label:
/// `NP-SBJ-1` -> `NP`, `PP=2` -> `PP`. Labels that start with a dash
/// (`-LRB-`, `-NONE-`) are returned unchanged.
pub fn basic_category(label: &str) -> &str {
  if label.starts_with('-') {
    return label;
  }
  match label.find(|c| c == '-' || c == '=') {
    Some(0) | None => label,
    Some(idx) => &label[..idx],
  }
}

/// Like `basic_category`, but keeps a `-TMP` or `-ADV` function tag
pub fn normalize_label(label: &str) -> String {
  let basic = basic_category(label);
  if basic.len() == label.len() {
    return label.to_string();
  }
  let rest = &label[basic.len()..];
  for keep in ["-TMP", "-ADV"] {
    if rest.split(|c| c == '-' || c == '=').any(|tag| tag == &keep[1..]) {
      return format!("{}{}", basic, keep);
    }
  }
  basic.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_basic_category() {
    assert_eq!(basic_category("NP-SBJ-1"), "NP");
    assert_eq!(basic_category("PP=2"), "PP");
    assert_eq!(basic_category("-LRB-"), "-LRB-");
    assert_eq!(basic_category("VP"), "VP");
  }

  #[test]
  fn test_normalize_label() {
    assert_eq!(normalize_label("NP-SBJ-1"), "NP");
    assert_eq!(normalize_label("NP-TMP"), "NP-TMP");
    assert_eq!(normalize_label("ADVP-TMP-2"), "ADVP-TMP");
    assert_eq!(normalize_label("NP-ADV"), "NP-ADV");
    assert_eq!(normalize_label("-NONE-"), "-NONE-");
  }
}
