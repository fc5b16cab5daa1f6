//! Typed command-line argument parsing engine.
//!
//! This crate turns raw argv into typed, validated option values:
//!
//! - [`Tokenizer`] splits each argv element into an alias and an inline
//!   value under configurable prefix ([`PrefixRules`]) and delimiter
//!   ([`AliasDelimiters`], [`ValueDelimiters`]) rules.
//! - [`validate_alias`] and [`AliasSuggester`] check user aliases and derive
//!   short/long aliases from option names when none are given.
//! - [`CliOption`] implements the six option kinds ([`OptionKind`]) on a
//!   shared option-arity/value-arity contract.
//! - [`Parser`] registers options and drives each parse pass, collecting
//!   structured [`ErrorInfo`]s instead of stopping at the first problem.
//!
//! Declaration mistakes surface immediately as [`BuildError`]; parse-time
//! problems are returned in [`ParseOutcome::errors`].
//!
//! # Example
//!
//! ```
//! use argot_core::*;
//!
//! #[derive(Debug, Default)]
//! struct Settings {
//!     value: i32,
//!     null_value: Option<i32>,
//! }
//!
//! let config = ParserConfig { prefixes: PrefixRules::ALL, ..ParserConfig::default() };
//! let mut parser = Parser::<Settings>::new(config).unwrap();
//! parser
//!     .add(OptionBuilder::scalar("Value").bind(|s: &mut Settings, v| s.value = v))
//!     .unwrap();
//! parser
//!     .add(OptionBuilder::scalar("NullValue").bind(|s: &mut Settings, v| s.null_value = Some(v)))
//!     .unwrap();
//!
//! let mut settings = Settings::default();
//! let outcome = parser.parse(&["-v", "10", "-n", "-100"], &mut settings);
//! assert!(outcome.is_valid());
//! assert_eq!(settings.value, 10);
//! assert_eq!(settings.null_value, Some(-100));
//!
//! let outcome = parser.parse(&["-v"], &mut settings);
//! assert_eq!(outcome.errors.len(), 1);
//! assert_eq!(outcome.errors[0].code, ErrorCode::VeryFewValue);
//! ```

mod alias;
mod config;
mod delimiter;
mod error;
mod option;
mod parser;
mod suggest;
mod token;
mod value;
pub mod words;

pub use alias::{
    AliasRegistry, RESERVED_ALIASES, is_reserved, normalize_alias, prefixed_variants,
    validate_alias,
};
pub use config::{DEFAULT_MAX_ALIAS_LENGTH, DEFAULT_MAX_ALIAS_WORD_COUNT, ParserConfig};
pub use delimiter::{AliasDelimiters, PrefixFamily, PrefixRules, ValueDelimiters};
pub use error::{BuildError, ConfigError, ErrorCode, ErrorInfo};
pub use option::{Arity, Builtin, CliOption, Many, Occurrence, OptionBuilder, OptionKind, Single};
pub use parser::{FieldHandle, ParseOutcome, ParseStatus, Parser};
pub use suggest::{AliasSuggester, SHORT_ALIAS_SEARCH_DEPTH, Suggestion, suggest_aliases};
pub use token::{Extracted, Token, Tokenizer};
pub use value::{ParseFn, ValueKind, parse_bool};
