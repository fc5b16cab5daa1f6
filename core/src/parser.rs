//! Parse orchestration.
//!
//! A [`Parser`] owns the declared options and runs each pass through the
//! same phases:
//!
//! 1. clear every option and the error list;
//! 2. tokenize argv, flagging malformed elements;
//! 3. let options claim tokens, switches first and positional options last;
//! 4. validate every option, collecting one error per failing option;
//! 5. report leftover tokens as unknown;
//! 6. reconcile the exclusive built-ins (help, version);
//! 7. bind results onto the caller's configuration object.
//!
//! Parse-time problems never escape as `Err`; they are returned in
//! [`ParseOutcome::errors`]. Panics raised by caller callbacks are caught and
//! recorded as [`ErrorCode::UnexpectedError`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, trace};

use crate::alias::{
    AliasRegistry, dedup_aliases, prefixed_variants, validate_alias, validate_builtin_alias,
};
use crate::config::ParserConfig;
use crate::error::{BuildError, ErrorCode, ErrorInfo};
use crate::option::{
    Builtin, CliOption, OptionBuilder, OptionKind, OptionParts, Slot, TypedSlot, check_arity,
};
use crate::suggest::suggest_aliases;
use crate::token::{Token, Tokenizer};
use crate::value::ValueKind;

/// Result status of one parse pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    /// No non-empty argument was supplied; options did not run.
    Empty,
    /// Every option validated and results were bound.
    Valid,
    /// At least one error was recorded.
    Invalid,
    /// The help switch was the only option used.
    Help,
    /// The version switch was the only option used.
    Version,
}

/// What one [`Parser::parse`] call produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub status: ParseStatus,
    /// Errors in token order, then option declaration order.
    pub errors: Vec<ErrorInfo>,
    /// Occurrences of the built-in verbosity counter.
    pub verbosity: usize,
}

impl ParseOutcome {
    pub fn is_valid(&self) -> bool {
        self.status == ParseStatus::Valid
    }

    pub fn is_empty(&self) -> bool {
        self.status == ParseStatus::Empty
    }

    pub fn is_help(&self) -> bool {
        self.status == ParseStatus::Help
    }

    pub fn is_version(&self) -> bool {
        self.status == ParseStatus::Version
    }

    /// Verbosity level requested on the command line.
    pub fn verbosity(&self) -> usize {
        self.verbosity
    }
}

/// Registration key of a declared option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    index: usize,
    name: String,
}

impl FieldHandle {
    /// Declaration index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Option registry and parse driver for configuration type `C`.
///
/// A parser is reusable: every [`parse`](Parser::parse) call starts from a
/// clean state. Calls must not overlap.
///
/// # Examples
///
/// ```
/// use argot_core::{OptionBuilder, ParseStatus, Parser, ParserConfig, PrefixRules};
///
/// #[derive(Default)]
/// struct Args {
///     value: i32,
///     verbose: bool,
/// }
///
/// let config = ParserConfig { prefixes: PrefixRules::ALL, ..ParserConfig::default() };
/// let mut parser = Parser::<Args>::new(config).unwrap();
/// let value = parser
///     .add(OptionBuilder::scalar("Value").bind(|args: &mut Args, v| args.value = v))
///     .unwrap();
/// parser
///     .add(OptionBuilder::switch("Loud").alias("l").bind(|args: &mut Args, on| args.verbose = on))
///     .unwrap();
///
/// assert_eq!(parser.option(&value).aliases(), ["v", "value"]);
///
/// let mut args = Args::default();
/// let outcome = parser.parse(&["-v", "10", "-l"], &mut args);
/// assert_eq!(outcome.status, ParseStatus::Valid);
/// assert_eq!(args.value, 10);
/// assert!(args.verbose);
/// assert_eq!(parser.value::<i32>(&value), Some(&10));
///
/// let outcome = parser.parse(&["-h"], &mut args);
/// assert_eq!(outcome.status, ParseStatus::Help);
/// ```
pub struct Parser<C> {
    config: ParserConfig,
    options: Vec<CliOption<C>>,
    registry: AliasRegistry,
    tokens: Vec<Token>,
}

impl<C> std::fmt::Debug for Parser<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("config", &self.config)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<C: 'static> Parser<C> {
    /// Creates a parser and registers the built-ins enabled in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] if `config` fails validation or
    /// an enabled built-in has no usable alias under its prefix rules.
    pub fn new(config: ParserConfig) -> Result<Self, BuildError> {
        config
            .validate()
            .map_err(|err| BuildError::InvalidConfig(err.to_string()))?;

        let mut parser = Self {
            registry: AliasRegistry::new(config.case_sensitive),
            config,
            options: Vec::new(),
            tokens: Vec::new(),
        };

        if parser.config.help_option {
            parser.add_builtin(Builtin::Help)?;
        }
        if parser.config.version_option {
            parser.add_builtin(Builtin::Version)?;
        }
        if parser.config.verbosity_option {
            parser.add_builtin(Builtin::Verbosity)?;
        }
        Ok(parser)
    }

    fn add_builtin(&mut self, builtin: Builtin) -> Result<(), BuildError> {
        let aliases: Vec<String> = builtin
            .aliases()
            .iter()
            .filter_map(|alias| validate_builtin_alias(alias, &self.config).ok())
            .collect();
        if aliases.is_empty() {
            return Err(BuildError::InvalidConfig(format!(
                "no enabled prefix accepts the {} option",
                builtin.name()
            )));
        }

        let (kind, slot) = match builtin {
            Builtin::Help | Builtin::Version => (
                OptionKind::Switch,
                Box::new(TypedSlot::<C, bool>::new()) as Box<dyn Slot<C>>,
            ),
            Builtin::Verbosity => (
                OptionKind::Counter,
                Box::new(TypedSlot::<C, usize>::new()) as Box<dyn Slot<C>>,
            ),
        };

        self.register(OptionParts {
            name: builtin.name().to_string(),
            description: None,
            usage: None,
            kind,
            builtin: Some(builtin),
            prefixed: Vec::new(),
            aliases,
            option_arity: kind.default_option_arity(),
            value_arity: kind.default_value_arity(),
            slot,
        })?;
        Ok(())
    }

    /// Registers an option.
    ///
    /// Named options without explicit aliases get suggested ones.
    ///
    /// # Errors
    ///
    /// Fails fast with the [`BuildError`] for the first problem found: an
    /// empty, duplicate or reserved name, a missing parse callback, an
    /// arity with `min > max`, an illegal or already used alias, aliases on
    /// a positional option, or no suggestable alias.
    pub fn add<T: ValueKind, S>(
        &mut self,
        builder: OptionBuilder<C, T, S>,
    ) -> Result<FieldHandle, BuildError> {
        let (declaration, slot) = builder.into_slot();
        let name = declaration.name.trim().to_string();

        if name.is_empty() {
            return Err(BuildError::InvalidConfig("option name cannot be empty".to_string()));
        }
        if [Builtin::Help, Builtin::Version, Builtin::Verbosity]
            .iter()
            .any(|builtin| builtin.name().eq_ignore_ascii_case(&name))
        {
            return Err(BuildError::ReservedProperty(name));
        }
        if self.options.iter().any(|option| option.name() == name) {
            return Err(BuildError::DuplicateName(name));
        }
        if !slot.has_parser() {
            return Err(BuildError::MissingParseCallback {
                option: name,
                kind: slot.kind_name(),
            });
        }

        let kind = declaration.kind;
        let option_arity = match declaration.option_arity {
            Some(arity) => check_arity(&name, arity)?,
            None => kind.default_option_arity(),
        };
        let value_arity = match declaration.value_arity {
            Some(arity) => check_arity(&name, arity)?,
            None => kind.default_value_arity(),
        };

        let aliases = if !kind.is_named() {
            if !declaration.aliases.is_empty() {
                return Err(BuildError::InvalidConfig(format!(
                    "positional option {name} cannot have aliases"
                )));
            }
            Vec::new()
        } else if declaration.aliases.is_empty() {
            suggest_aliases(&name, &self.registry, &self.config)?
        } else {
            let validated = declaration
                .aliases
                .iter()
                .map(|alias| validate_alias(alias, &self.config))
                .collect::<Result<Vec<_>, _>>()?;
            dedup_aliases(validated, self.config.case_sensitive)
        };

        self.register(OptionParts {
            name,
            description: declaration.description,
            usage: declaration.usage,
            kind,
            builtin: None,
            aliases,
            prefixed: Vec::new(),
            option_arity,
            value_arity,
            slot,
        })
    }

    fn register(&mut self, mut parts: OptionParts<C>) -> Result<FieldHandle, BuildError> {
        for alias in &parts.aliases {
            if let Some(owner) = self.registry.owner(alias) {
                return Err(BuildError::AliasAlreadyInUse {
                    alias: alias.clone(),
                    owner: owner.to_string(),
                });
            }
        }
        for alias in &parts.aliases {
            self.registry.insert(alias, &parts.name)?;
        }

        let mut prefixed: Vec<String> = parts
            .aliases
            .iter()
            .flat_map(|alias| prefixed_variants(alias, self.config.prefixes))
            .collect();
        prefixed.sort_by_key(String::len);
        parts.prefixed = prefixed;

        debug!(
            option = %parts.name,
            kind = ?parts.kind,
            aliases = ?parts.prefixed,
            "Registered option"
        );

        let handle = FieldHandle {
            index: self.options.len(),
            name: parts.name.clone(),
        };
        self.options.push(CliOption::from_parts(parts));
        Ok(handle)
    }
}

impl<C> Parser<C> {
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Declared options, built-ins first.
    pub fn options(&self) -> &[CliOption<C>] {
        &self.options
    }

    /// The option registered under `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not returned by this parser.
    pub fn option(&self, handle: &FieldHandle) -> &CliOption<C> {
        &self.options[handle.index]
    }

    /// Looks up an option by name.
    pub fn handle(&self, name: &str) -> Option<FieldHandle> {
        self.options
            .iter()
            .position(|option| option.name() == name)
            .map(|index| FieldHandle {
                index,
                name: name.to_string(),
            })
    }

    /// Canonical aliases with their owning options.
    pub fn registry(&self) -> &AliasRegistry {
        &self.registry
    }

    /// Tokens of the last pass.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of occurrences in the last pass.
    pub fn count(&self, handle: &FieldHandle) -> usize {
        self.option(handle).option_count()
    }

    /// Last resolved value (or default) of a scalar-shaped option.
    pub fn value<T: ValueKind>(&self, handle: &FieldHandle) -> Option<&T>
    where
        C: 'static,
    {
        self.resolved::<T>(handle.index).and_then(<[T]>::last)
    }

    /// All resolved values (or defaults); empty if `T` is not the option's type.
    pub fn values<T: ValueKind>(&self, handle: &FieldHandle) -> &[T]
    where
        C: 'static,
    {
        self.resolved::<T>(handle.index).unwrap_or(&[])
    }

    /// Resolved state of a switch; `false` when absent without default.
    pub fn flag(&self, handle: &FieldHandle) -> bool
    where
        C: 'static,
    {
        self.value::<bool>(handle).copied().unwrap_or(false)
    }

    fn resolved<T: ValueKind>(&self, index: usize) -> Option<&[T]>
    where
        C: 'static,
    {
        self.options
            .get(index)?
            .slot()
            .as_any()
            .downcast_ref::<TypedSlot<C, T>>()
            .map(TypedSlot::resolved)
    }

    /// Runs one parse pass over `args`, binding results onto `target`.
    pub fn parse<S: AsRef<str>>(&mut self, args: &[S], target: &mut C) -> ParseOutcome
    where
        C: 'static,
    {
        self.tokens.clear();
        for option in &mut self.options {
            option.clear();
        }

        if args.iter().all(|arg| arg.as_ref().is_empty()) {
            debug!(args = args.len(), "Empty parse pass");
            return ParseOutcome {
                status: ParseStatus::Empty,
                errors: Vec::new(),
                verbosity: 0,
            };
        }

        let tokenizer = Tokenizer::new(
            self.options
                .iter()
                .flat_map(|option| option.prefixed_aliases().iter().cloned()),
            &self.config,
        );
        let (mut tokens, mut errors) = tokenizer.tokenize(args);
        debug!(tokens = tokens.len(), errors = errors.len(), "Tokenized arguments");

        let mut order: Vec<usize> = (0..self.options.len()).collect();
        order.sort_by_key(|&index| self.options[index].kind().priority());
        for index in order {
            self.options[index].parse(&mut tokens, &self.config);
        }
        debug!(
            claimed = tokens.iter().filter(|token| token.parsed).count(),
            "Options claimed tokens"
        );

        for option in &mut self.options {
            let config = &self.config;
            match panic::catch_unwind(AssertUnwindSafe(|| option.validate(config))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => errors.push(err),
                Err(payload) => errors.push(unexpected(option.name(), payload)),
            }
        }

        errors.extend(
            tokens
                .iter()
                .filter(|token| !token.parsed && !token.invalid)
                .map(|token| ErrorInfo::new(ErrorCode::UnknownToken, [token.raw.as_str()])),
        );

        let verbosity = self
            .options
            .iter()
            .find(|option| option.builtin() == Some(Builtin::Verbosity))
            .map_or(0, CliOption::option_count);

        let mut status = self.reconcile_builtins(&mut errors);
        if status.is_none() && errors.is_empty() {
            self.bind(target, &mut errors);
            status = Some(if errors.is_empty() {
                ParseStatus::Valid
            } else {
                ParseStatus::Invalid
            });
        }
        let status = status.unwrap_or(ParseStatus::Invalid);

        debug!(status = ?status, errors = errors.len(), verbosity, "Parse pass finished");
        self.tokens = tokens;
        ParseOutcome {
            status,
            errors,
            verbosity,
        }
    }

    /// Applies the help/version exclusivity rule.
    ///
    /// A triggered built-in that is the only option holding claimed tokens
    /// (the verbosity counter aside) wins: all errors are dropped. Combined
    /// with any other option it is an error.
    fn reconcile_builtins(&self, errors: &mut Vec<ErrorInfo>) -> Option<ParseStatus>
    where
        C: 'static,
    {
        let mut status = None;
        for (builtin, outcome) in [
            (Builtin::Help, ParseStatus::Help),
            (Builtin::Version, ParseStatus::Version),
        ] {
            let Some(index) = self
                .options
                .iter()
                .position(|option| option.builtin() == Some(builtin))
            else {
                continue;
            };
            if !self.is_triggered(index) {
                continue;
            }

            let others: usize = self
                .options
                .iter()
                .enumerate()
                .filter(|(i, option)| {
                    *i != index && option.builtin() != Some(Builtin::Verbosity)
                })
                .map(|(_, option)| option.claimed_count())
                .sum();

            if self.options[index].claimed_count() > 0 && others == 0 {
                debug!(option = builtin.name(), "Exclusive built-in requested");
                errors.clear();
                return Some(outcome);
            }
            errors.push(ErrorInfo::for_option(
                ErrorCode::InvalidSingleOptionUsage,
                builtin.name(),
                Vec::<String>::new(),
            ));
            status = Some(ParseStatus::Invalid);
        }
        status
    }

    /// Present and not explicitly switched off.
    fn is_triggered(&self, index: usize) -> bool
    where
        C: 'static,
    {
        let option = &self.options[index];
        option.is_active()
            && !(option.is_valid()
                && self.resolved::<bool>(index).and_then(<[bool]>::last) == Some(&false))
    }

    fn bind(&self, target: &mut C, errors: &mut Vec<ErrorInfo>) {
        for option in &self.options {
            match panic::catch_unwind(AssertUnwindSafe(|| option.bind(target))) {
                Ok(bound) => {
                    if bound {
                        trace!(option = option.name(), "Bound option");
                    }
                }
                Err(payload) => errors.push(unexpected(option.name(), payload)),
            }
        }
    }
}

fn unexpected(option: &str, payload: Box<dyn Any + Send>) -> ErrorInfo {
    let cause = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "callback panicked".to_string());
    ErrorInfo::for_option(ErrorCode::UnexpectedError, option, Vec::<String>::new())
        .with_cause(cause)
}
