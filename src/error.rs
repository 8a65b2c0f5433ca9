use thiserror::Error;

/// Errors produced while building or reading dependency structures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  /// A phrasal node has no head child. The input tree is malformed.
  #[error("no head found for phrasal node {label}")]
  NoHead { label: String },

  /// A relation pattern failed to compile.
  #[error("bad tree pattern `{pattern}`: {message}")]
  Pattern { pattern: String, message: String },

  /// A bracketed tree couldn't be read.
  #[error("malformed tree: {message}")]
  TreeSyntax { message: String },

  /// A serialized dependency triple couldn't be read.
  #[error("malformed dependency `{literal}`: {reason}")]
  DependencyFormat { literal: String, reason: FormatReason },

  #[error("tree has no leaves")]
  EmptyTree,
}

/// What was wrong with a serialized dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatReason {
  MissingOpenParen,
  MissingCloseParen,
  MissingComma,
  MissingIndex,
  BadIndex,
}

impl std::fmt::Display for FormatReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let msg = match self {
      Self::MissingOpenParen => "missing `(`",
      Self::MissingCloseParen => "missing `)`",
      Self::MissingComma => "missing `,` between governor and dependent",
      Self::MissingIndex => "missing index after final `-`",
      Self::BadIndex => "index is not an integer",
    };
    f.write_str(msg)
  }
}

pub type Result<T> = std::result::Result<T, Error>;
