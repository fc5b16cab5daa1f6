//! Error types.
//!
//! Two families of errors exist and they travel differently:
//!
//! - [`BuildError`]: configuration mistakes found while options are being
//!   declared (alias collisions, reserved names, missing parse callbacks).
//!   These are returned immediately from [`Parser::add`](crate::Parser::add).
//! - [`ErrorInfo`]: problems found during a parse pass. They are collected
//!   into [`ParseOutcome::errors`](crate::ParseOutcome) so one pass reports
//!   everything it found.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Errors raised while declaring options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The alias is empty or whitespace-only.
    #[error("alias cannot be empty")]
    EmptyAlias,
    /// The alias contains characters outside the allowed set or starts with a digit.
    #[error("invalid alias: {0}")]
    InvalidAlias(String),
    /// The alias is one of the reserved built-in names.
    #[error("alias is reserved: {0}")]
    ReservedAlias(String),
    /// The alias exceeds the configured maximum length.
    #[error("alias {alias} exceeds the maximum length of {max}")]
    AliasTooLong { alias: String, max: usize },
    /// No enabled prefix rule accepts an alias of this length.
    #[error("no enabled prefix accepts alias: {0}")]
    AliasPrefixMismatch(String),
    /// Another option already owns this alias.
    #[error("alias already in use: {alias} (owned by {owner})")]
    AliasAlreadyInUse { alias: String, owner: String },
    /// Another option already uses this name.
    #[error("duplicate option name: {0}")]
    DuplicateName(String),
    /// The name collides with a built-in option.
    #[error("option name is reserved: {0}")]
    ReservedProperty(String),
    /// A custom value type was declared without a parse callback.
    #[error("option {option} has value type {kind} but no parse callback")]
    MissingParseCallback { option: String, kind: &'static str },
    /// No alias could be derived from the option name.
    #[error("could not suggest an alias for option: {0}")]
    AliasSuggestionExhausted(String),
    /// An arity has `min > max`.
    #[error("invalid arity for option {option}: min {min} > max {max}")]
    InvalidArity { option: String, min: usize, max: usize },
    /// The parser settings are inconsistent.
    #[error("invalid parser configuration: {0}")]
    InvalidConfig(String),
}

impl BuildError {
    /// Stable dotted error code.
    ///
    /// # Examples
    ///
    /// ```
    /// use argot_core::BuildError;
    ///
    /// let err = BuildError::DuplicateName("Value".into());
    /// assert_eq!(err.code(), "BuilderErrors.DuplicateName");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyAlias => "BuilderErrors.EmptyAlias",
            Self::InvalidAlias(_) => "BuilderErrors.InvalidAlias",
            Self::ReservedAlias(_) => "BuilderErrors.ReservedAlias",
            Self::AliasTooLong { .. } => "BuilderErrors.AliasTooLong",
            Self::AliasPrefixMismatch(_) => "BuilderErrors.AliasPrefixMismatch",
            Self::AliasAlreadyInUse { .. } => "BuilderErrors.AliasAlreadyInUse",
            Self::DuplicateName(_) => "BuilderErrors.DuplicateName",
            Self::ReservedProperty(_) => "BuilderErrors.ReservedProperty",
            Self::MissingParseCallback { .. } => "BuilderErrors.MissingParseCallback",
            Self::AliasSuggestionExhausted(_) => "BuilderErrors.AliasSuggestionExhausted",
            Self::InvalidArity { .. } => "BuilderErrors.InvalidArity",
            Self::InvalidConfig(_) => "BuilderErrors.InvalidConfig",
        }
    }
}

/// Errors loading a [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML (or JSON) parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A setting is out of range.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Stable codes for parse-time errors.
///
/// Serializes as its dotted identifier ([`ErrorCode::as_str`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A caller-supplied callback panicked during the pass.
    UnexpectedError,
    /// A token is only a prefix (`-`, `--`, `/`).
    InvalidToken,
    /// A known alias is followed by content that is neither a delimiter nor a value.
    InvalidAliasUsage,
    /// A token matched no alias and was claimed by no option.
    UnknownToken,
    /// The option occurred more often than its option arity allows.
    TooManyOption,
    /// The option occurred less often than its option arity requires.
    VeryFewOption,
    /// More values than the value arity allows.
    TooManyValue,
    /// Fewer values than the value arity requires.
    VeryFewValue,
    /// A value could not be converted to the option's type.
    InvalidOptionValue,
    /// A value is not in the option's allowed set.
    ValueMustBeOneOf,
    /// A per-value predicate rejected a value.
    PredicateFailure,
    /// A list predicate rejected the accumulated values.
    ListPredicateFailure,
    /// Help or version was combined with other options.
    InvalidSingleOptionUsage,
}

impl ErrorCode {
    /// Stable dotted identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnexpectedError => "ParserErrors.UnexpectedError",
            Self::InvalidToken => "ParserErrors.InvalidToken",
            Self::InvalidAliasUsage => "ParserErrors.InvalidAliasUsage",
            Self::UnknownToken => "ParserErrors.UnknownToken",
            Self::TooManyOption => "ParserErrors.TooManyOption",
            Self::VeryFewOption => "ParserErrors.VeryFewOption",
            Self::TooManyValue => "ParserErrors.TooManyValue",
            Self::VeryFewValue => "ParserErrors.VeryFewValue",
            Self::InvalidOptionValue => "ParserErrors.InvalidOptionValue",
            Self::ValueMustBeOneOf => "ParserErrors.ValueMustBeOneOf",
            Self::PredicateFailure => "ParserErrors.PredicateFailure",
            Self::ListPredicateFailure => "ParserErrors.ListPredicateFailure",
            Self::InvalidSingleOptionUsage => "ParserErrors.InvalidSingleOptionUsage",
        }
    }

    /// Message template; `{n}` is replaced with the n-th argument.
    pub const fn template(self) -> &'static str {
        match self {
            Self::UnexpectedError => "Unexpected error: {0}",
            Self::InvalidToken => "Invalid token: '{0}'",
            Self::InvalidAliasUsage => "Invalid usage of alias '{1}' in token '{0}'",
            Self::UnknownToken => "Unknown token: '{0}'",
            Self::TooManyOption => "Option '{0}' was given {1} times, at most {2} allowed",
            Self::VeryFewOption => "Option '{0}' was given {1} times, at least {2} required",
            Self::TooManyValue => "Option '{0}' got {1} values, at most {2} allowed",
            Self::VeryFewValue => "Option '{0}' got {1} values, at least {2} required",
            Self::InvalidOptionValue => "Invalid value '{1}' for option '{0}': {2}",
            Self::ValueMustBeOneOf => "Value '{1}' for option '{0}' must be one of: {2}",
            Self::PredicateFailure => "Value '{1}' for option '{0}' was rejected: {2}",
            Self::ListPredicateFailure => "Values for option '{0}' were rejected: {1}",
            Self::InvalidSingleOptionUsage => "Option '{0}' must be used on its own",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A structured parse-time error.
///
/// # Examples
///
/// ```
/// use argot_core::{ErrorCode, ErrorInfo};
///
/// let err = ErrorInfo::new(ErrorCode::UnknownToken, ["--nope"]);
/// assert_eq!(err.code.as_str(), "ParserErrors.UnknownToken");
/// assert_eq!(err.to_string(), "Unknown token: '--nope'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Stable error code.
    pub code: ErrorCode,
    /// Message template with positional `{n}` placeholders.
    pub message: &'static str,
    /// Positional arguments for `message`.
    pub args: Vec<String>,
    /// Name of the option the error belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    /// Underlying cause, rendered as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorInfo {
    /// Creates an error with the code's message template.
    pub fn new<I, S>(code: ErrorCode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code,
            message: code.template(),
            args: args.into_iter().map(Into::into).collect(),
            option: None,
            cause: None,
        }
    }

    /// Creates an error owned by `option`; the option name is the first argument.
    pub fn for_option<I, S>(code: ErrorCode, option: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec![option.to_string()];
        all.extend(args.into_iter().map(Into::into));
        Self {
            option: Some(option.to_string()),
            ..Self::new(code, all)
        }
    }

    /// Attaches a cause.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Renders the message with its arguments substituted.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.message.len());
        let mut rest = self.message;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let substituted = after.find('}').and_then(|close| {
                let index: usize = after[..close].parse().ok()?;
                let arg = self.args.get(index)?;
                Some((arg, close))
            });
            match substituted {
                Some((arg, close)) => {
                    out.push_str(arg);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorInfo {}
