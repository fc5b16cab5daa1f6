//! Option model.
//!
//! Six option kinds share one arity/validation contract:
//!
//! | Kind | Addressed by | Keeps |
//! | --- | --- | --- |
//! | [`OptionKind::Switch`] | alias | explicit boolean or `true` |
//! | [`OptionKind::Counter`] | alias | number of occurrences |
//! | [`OptionKind::ScalarNamed`] | alias | values of the last occurrence |
//! | [`OptionKind::SequentialNamed`] | alias | values of every occurrence |
//! | [`OptionKind::ScalarValue`] | position | the claimed bare value |
//! | [`OptionKind::SequentialValue`] | position | every claimed bare value |
//!
//! Each pass runs `clear` → `parse` → `validate` on every option. `parse`
//! claims tokens; `validate` checks option and value arity and hands the
//! values to the typed slot for conversion, allowed-set and predicate checks.

mod builder;
mod slot;

pub use builder::{Many, OptionBuilder, Single};
pub(crate) use slot::{Slot, TypedSlot};

use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::error::{BuildError, ErrorCode, ErrorInfo};
use crate::token::Token;
use crate::value::parse_bool;

/// A `(min, max)` bound on how often something may occur.
///
/// `(0, 0)` disables the dimension.
///
/// # Examples
///
/// ```
/// use argot_core::Arity;
///
/// let arity = Arity::new(1, 3).unwrap();
/// assert!(arity.contains(2));
/// assert!(!arity.contains(0));
/// assert!(Arity::new(2, 1).is_none());
/// assert!(Arity::ZERO.is_disabled());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arity {
    pub min: usize,
    pub max: usize,
}

impl Arity {
    /// Never.
    pub const ZERO: Self = Self { min: 0, max: 0 };
    /// At most once.
    pub const OPTIONAL: Self = Self { min: 0, max: 1 };
    /// Exactly once.
    pub const ONE: Self = Self { min: 1, max: 1 };
    /// Any number of times.
    pub const ANY: Self = Self {
        min: 0,
        max: usize::MAX,
    };
    /// At least once.
    pub const AT_LEAST_ONE: Self = Self {
        min: 1,
        max: usize::MAX,
    };

    /// Creates an arity, or `None` if `min > max`.
    pub const fn new(min: usize, max: usize) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Exactly `n` times.
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: n }
    }

    /// Returns `true` if `n` lies within the bounds.
    pub const fn contains(self, n: usize) -> bool {
        self.min <= n && n <= self.max
    }

    /// Returns `true` for `(0, 0)`.
    pub const fn is_disabled(self) -> bool {
        self.max == 0
    }
}

/// The six option kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    Switch,
    Counter,
    ScalarNamed,
    SequentialNamed,
    ScalarValue,
    SequentialValue,
}

impl OptionKind {
    /// Kinds in the order a pass lets them claim tokens.
    pub const PARSE_ORDER: [Self; 6] = [
        Self::Switch,
        Self::Counter,
        Self::ScalarNamed,
        Self::SequentialNamed,
        Self::ScalarValue,
        Self::SequentialValue,
    ];

    /// Kebab-case name, as used in declaration files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Counter => "counter",
            Self::ScalarNamed => "scalar-named",
            Self::SequentialNamed => "sequential-named",
            Self::ScalarValue => "scalar-value",
            Self::SequentialValue => "sequential-value",
        }
    }

    /// Addressed through an alias.
    pub const fn is_named(self) -> bool {
        matches!(
            self,
            Self::Switch | Self::Counter | Self::ScalarNamed | Self::SequentialNamed
        )
    }

    /// Accumulates values across occurrences.
    pub const fn is_sequential(self) -> bool {
        matches!(self, Self::SequentialNamed | Self::SequentialValue)
    }

    /// Claiming priority; value kinds share the last slot and keep declaration order.
    pub const fn priority(self) -> u8 {
        match self {
            Self::Switch => 0,
            Self::Counter => 1,
            Self::ScalarNamed => 2,
            Self::SequentialNamed => 3,
            Self::ScalarValue | Self::SequentialValue => 4,
        }
    }

    /// Option arity used when the declaration does not set one.
    pub const fn default_option_arity(self) -> Arity {
        match self {
            Self::Switch | Self::ScalarValue | Self::SequentialValue => Arity::OPTIONAL,
            Self::Counter | Self::ScalarNamed | Self::SequentialNamed => Arity::ANY,
        }
    }

    /// Value arity used when the declaration does not set one.
    pub const fn default_value_arity(self) -> Arity {
        match self {
            Self::Switch => Arity::OPTIONAL,
            Self::Counter => Arity::ZERO,
            Self::ScalarNamed | Self::ScalarValue => Arity::ONE,
            Self::SequentialNamed | Self::SequentialValue => Arity::AT_LEAST_ONE,
        }
    }
}

/// Parser-provided options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Help,
    Version,
    Verbosity,
}

impl Builtin {
    /// Option name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "Help",
            Self::Version => "Version",
            Self::Verbosity => "Verbosity",
        }
    }

    /// Aliases, before prefix decoration.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Help => &["h", "?", "help"],
            Self::Version => &["version"],
            Self::Verbosity => &["verbose"],
        }
    }
}

/// One alias occurrence and the raw values it collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// argv position of the alias (or first value for positional options).
    pub index: usize,
    /// Raw values before value-list splitting.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct OptionState {
    occurrences: Vec<Occurrence>,
    claimed: usize,
    input_values: Vec<String>,
    valid: bool,
}

/// A declared option and its per-pass state.
pub struct CliOption<C> {
    name: String,
    description: Option<String>,
    usage: Option<String>,
    kind: OptionKind,
    builtin: Option<Builtin>,
    aliases: Vec<String>,
    prefixed: Vec<String>,
    option_arity: Arity,
    value_arity: Arity,
    state: OptionState,
    slot: Box<dyn Slot<C>>,
}

impl<C> std::fmt::Debug for CliOption<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliOption")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("aliases", &self.prefixed)
            .field("option_arity", &self.option_arity)
            .field("value_arity", &self.value_arity)
            .field("occurrences", &self.state.occurrences)
            .finish_non_exhaustive()
    }
}

pub(crate) struct OptionParts<C> {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) usage: Option<String>,
    pub(crate) kind: OptionKind,
    pub(crate) builtin: Option<Builtin>,
    pub(crate) aliases: Vec<String>,
    pub(crate) prefixed: Vec<String>,
    pub(crate) option_arity: Arity,
    pub(crate) value_arity: Arity,
    pub(crate) slot: Box<dyn Slot<C>>,
}

impl<C> CliOption<C> {
    pub(crate) fn from_parts(parts: OptionParts<C>) -> Self {
        Self {
            name: parts.name,
            description: parts.description,
            usage: parts.usage,
            kind: parts.kind,
            builtin: parts.builtin,
            aliases: parts.aliases,
            prefixed: parts.prefixed,
            option_arity: parts.option_arity,
            value_arity: parts.value_arity,
            state: OptionState::default(),
            slot: parts.slot,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn builtin(&self) -> Option<Builtin> {
        self.builtin
    }

    /// Canonical aliases in declaration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Prefixed aliases, shortest first.
    pub fn prefixed_aliases(&self) -> &[String] {
        &self.prefixed
    }

    pub fn option_arity(&self) -> Arity {
        self.option_arity
    }

    pub fn value_arity(&self) -> Arity {
        self.value_arity
    }

    /// Name of the value type.
    pub fn value_kind(&self) -> &'static str {
        self.slot.kind_name()
    }

    /// Number of occurrences in the last pass.
    pub fn option_count(&self) -> usize {
        self.state.occurrences.len()
    }

    /// Number of input values in the last pass.
    pub fn value_count(&self) -> usize {
        self.state.input_values.len()
    }

    /// Tokens claimed in the last pass (aliases and values).
    pub fn claimed_count(&self) -> usize {
        self.state.claimed
    }

    /// The option occurred in the last pass.
    pub fn is_active(&self) -> bool {
        !self.state.occurrences.is_empty()
    }

    /// The option validated cleanly in the last pass.
    pub fn is_valid(&self) -> bool {
        self.state.valid
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.state.occurrences
    }

    /// Values after value-list splitting.
    pub fn input_values(&self) -> &[String] {
        &self.state.input_values
    }

    pub(crate) fn slot(&self) -> &dyn Slot<C> {
        self.slot.as_ref()
    }

    /// Resets all per-pass state. Idempotent.
    pub fn clear(&mut self) {
        self.state = OptionState::default();
        self.slot.clear();
    }

    fn owns(&self, alias: &str) -> bool {
        self.prefixed.iter().any(|own| own == alias)
    }

    /// Claims the tokens this option is responsible for.
    pub fn parse(&mut self, tokens: &mut [Token], config: &ParserConfig) {
        if self.kind.is_named() {
            self.parse_named(tokens, config);
        } else {
            self.parse_positional(tokens);
        }

        self.state.input_values = match self.kind {
            OptionKind::Counter => Vec::new(),
            OptionKind::Switch => self.relevant_values(),
            _ => self
                .relevant_values()
                .iter()
                .flat_map(|raw| config.value_delimiters.split(raw))
                .collect(),
        };
    }

    fn parse_named(&mut self, tokens: &mut [Token], config: &ParserConfig) {
        let whitespace = config.alias_delimiters.allows_whitespace();

        let mut i = 0;
        while i < tokens.len() {
            let owned = tokens[i].is_unclaimed_alias()
                && tokens[i].alias.as_deref().is_some_and(|alias| self.owns(alias));
            if !owned {
                i += 1;
                continue;
            }

            tokens[i].parsed = true;
            self.state.claimed += 1;
            let index = tokens[i].index;
            let mut values: Vec<String> = tokens[i].value.iter().cloned().collect();

            match self.kind {
                OptionKind::Counter => values.clear(),
                OptionKind::Switch => {
                    let explicit = tokens.get(i + 1).filter(|next| {
                        values.is_empty()
                            && whitespace
                            && next.is_bare_value()
                            && next.value.as_deref().is_some_and(|v| parse_bool(v).is_ok())
                    });
                    if let Some(value) = explicit.and_then(|next| next.value.clone()) {
                        tokens[i + 1].parsed = true;
                        self.state.claimed += 1;
                        values.push(value);
                        i += 1;
                    }
                }
                _ => {
                    while whitespace
                        && values.len() < self.value_arity.max
                        && (values.is_empty() || config.allow_sequential_values)
                        && tokens.get(i + 1).is_some_and(Token::is_bare_value)
                    {
                        i += 1;
                        tokens[i].parsed = true;
                        self.state.claimed += 1;
                        values.extend(tokens[i].value.clone());
                    }
                }
            }

            self.state.occurrences.push(Occurrence { index, values });
            i += 1;
        }
    }

    fn parse_positional(&mut self, tokens: &mut [Token]) {
        let mut occurrence: Option<Occurrence> = None;

        for token in tokens.iter_mut() {
            let taken = occurrence.as_ref().map_or(0, |o| o.values.len());
            if taken >= self.value_arity.max {
                break;
            }
            if !token.is_bare_value() {
                continue;
            }

            token.parsed = true;
            self.state.claimed += 1;
            let value = token.value.clone().unwrap_or_default();
            occurrence
                .get_or_insert_with(|| Occurrence {
                    index: token.index,
                    values: Vec::new(),
                })
                .values
                .push(value);
        }

        self.state.occurrences.extend(occurrence);
    }

    /// Raw values that count: every occurrence for sequential kinds, the last otherwise.
    fn relevant_values(&self) -> Vec<String> {
        if self.kind.is_sequential() {
            self.state
                .occurrences
                .iter()
                .flat_map(|o| o.values.iter().cloned())
                .collect()
        } else {
            self.state
                .occurrences
                .last()
                .map(|o| o.values.clone())
                .unwrap_or_default()
        }
    }

    /// Values each relevant occurrence contributes after splitting.
    fn occurrence_value_counts(&self, config: &ParserConfig) -> Vec<usize> {
        let split_len = |o: &Occurrence| -> usize {
            match self.kind {
                OptionKind::Switch => o.values.len(),
                _ => o
                    .values
                    .iter()
                    .map(|raw| config.value_delimiters.split(raw).len())
                    .sum(),
            }
        };

        if self.kind.is_sequential() {
            self.state.occurrences.iter().map(split_len).collect()
        } else {
            self.state.occurrences.last().map(split_len).into_iter().collect()
        }
    }

    /// Checks arity and converts values; surfaces at most one error.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as an [`ErrorInfo`] owned by this option.
    pub fn validate(&mut self, config: &ParserConfig) -> Result<(), ErrorInfo> {
        self.state.valid = false;
        let count = self.option_count();

        if count > self.option_arity.max {
            return Err(self.arity_error(ErrorCode::TooManyOption, count, self.option_arity.max));
        }
        if count < self.option_arity.min {
            return Err(self.arity_error(ErrorCode::VeryFewOption, count, self.option_arity.min));
        }
        if count == 0 {
            self.slot.clear();
            self.state.valid = true;
            return Ok(());
        }

        if self.kind != OptionKind::Counter {
            for n in self.occurrence_value_counts(config) {
                if n > self.value_arity.max {
                    return Err(self.arity_error(ErrorCode::TooManyValue, n, self.value_arity.max));
                }
                if n < self.value_arity.min {
                    return Err(self.arity_error(ErrorCode::VeryFewValue, n, self.value_arity.min));
                }
            }
        }

        let values = match self.kind {
            OptionKind::Counter => vec![count.to_string()],
            OptionKind::Switch if self.state.input_values.is_empty() => vec!["true".to_string()],
            _ => self.state.input_values.clone(),
        };
        self.slot.load(&self.name, &values, config.case_sensitive)?;

        self.state.valid = true;
        Ok(())
    }

    fn arity_error(&self, code: ErrorCode, actual: usize, bound: usize) -> ErrorInfo {
        ErrorInfo::for_option(code, &self.name, [actual.to_string(), bound.to_string()])
    }

    /// Calls the binder with the resolved value, or the default if absent.
    pub(crate) fn bind(&self, target: &mut C) -> bool {
        self.slot.bind(target, self.is_active())
    }
}

pub(crate) fn check_arity(option: &str, arity: (usize, usize)) -> Result<Arity, BuildError> {
    Arity::new(arity.0, arity.1).ok_or_else(|| BuildError::InvalidArity {
        option: option.to_string(),
        min: arity.0,
        max: arity.1,
    })
}
