//! Typed option declarations.
//!
//! An [`OptionBuilder`] collects everything [`Parser::add`](crate::Parser::add)
//! needs to register one option. The shape marker ([`Single`] or [`Many`])
//! decides what the binder receives: scalar-shaped options bind one `T`,
//! sequential ones bind a `Vec<T>`.

use std::marker::PhantomData;

use crate::value::ValueKind;

use super::slot::{Binder, Slot, TypedSlot};
use super::OptionKind;

/// Shape marker: the option resolves to one value.
#[derive(Debug, Clone, Copy)]
pub struct Single;

/// Shape marker: the option resolves to a list of values.
#[derive(Debug, Clone, Copy)]
pub struct Many;

/// Declaration of one option targeting configuration type `C`.
///
/// # Examples
///
/// ```
/// use argot_core::{OptionBuilder, Parser, ParserConfig};
///
/// #[derive(Default)]
/// struct Args {
///     port: u16,
///     tags: Vec<String>,
/// }
///
/// let mut parser = Parser::<Args>::new(ParserConfig::default()).unwrap();
/// parser
///     .add(
///         OptionBuilder::scalar("Port")
///             .alias("p")
///             .default_value(8080)
///             .bind(|args: &mut Args, port| args.port = port),
///     )
///     .unwrap();
/// parser
///     .add(OptionBuilder::sequential("Tags").bind(|args: &mut Args, tags| args.tags = tags))
///     .unwrap();
///
/// let mut args = Args::default();
/// let outcome = parser.parse(&["--tags", "a", "b"], &mut args);
/// assert!(outcome.is_valid());
/// assert_eq!(args.port, 8080);
/// assert_eq!(args.tags, ["a", "b"]);
/// ```
pub struct OptionBuilder<C, T: ValueKind, S = Single> {
    pub(crate) name: String,
    pub(crate) kind: OptionKind,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) usage: Option<String>,
    pub(crate) option_arity: Option<(usize, usize)>,
    pub(crate) value_arity: Option<(usize, usize)>,
    pub(crate) slot: TypedSlot<C, T>,
    shape: PhantomData<S>,
}

impl<C, T: ValueKind, S> std::fmt::Debug for OptionBuilder<C, T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionBuilder")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("aliases", &self.aliases)
            .field("value_type", &T::kind_name())
            .finish_non_exhaustive()
    }
}

impl<C: 'static> OptionBuilder<C, bool, Single> {
    /// A boolean switch: `--force`, `--force=false`, `--force no`.
    pub fn switch(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::Switch)
    }
}

impl<C: 'static> OptionBuilder<C, usize, Single> {
    /// Counts occurrences: `-v -v -v` binds `3`.
    pub fn counter(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::Counter)
    }
}

impl<C: 'static, T: ValueKind> OptionBuilder<C, T, Single> {
    /// A named option keeping the values of its last occurrence.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::ScalarNamed)
    }

    /// A positional option claiming one bare value.
    pub fn value(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::ScalarValue)
    }

    /// Value bound when the option is absent.
    pub fn default_value(mut self, value: T) -> Self {
        self.slot.default = Some(vec![value]);
        self
    }

    /// Applies the resolved value onto the configuration object.
    pub fn bind<F>(mut self, bind: F) -> Self
    where
        F: Fn(&mut C, T) + 'static,
    {
        self.slot.binder = Some(Binder::Single(Box::new(bind)));
        self
    }
}

impl<C: 'static, T: ValueKind> OptionBuilder<C, T, Many> {
    /// A named option accumulating the values of every occurrence.
    pub fn sequential(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::SequentialNamed)
    }

    /// A positional option claiming bare values in order.
    pub fn values(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::SequentialValue)
    }

    /// Values bound when the option is absent.
    pub fn default_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.slot.default = Some(values.into_iter().collect());
        self
    }

    /// Applies the resolved values onto the configuration object.
    pub fn bind<F>(mut self, bind: F) -> Self
    where
        F: Fn(&mut C, Vec<T>) + 'static,
    {
        self.slot.binder = Some(Binder::Many(Box::new(bind)));
        self
    }
}

impl<C: 'static, T: ValueKind, S> OptionBuilder<C, T, S> {
    fn with_kind(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            aliases: Vec::new(),
            description: None,
            usage: None,
            option_arity: None,
            value_arity: None,
            slot: TypedSlot::new(),
            shape: PhantomData,
        }
    }

    /// Adds an explicit alias. Without any, aliases are suggested from the name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I>(mut self, aliases: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// Bounds on how often the option may occur.
    pub fn option_arity(mut self, min: usize, max: usize) -> Self {
        self.option_arity = Some((min, max));
        self
    }

    /// Bounds on how many values one occurrence may carry.
    pub fn value_arity(mut self, min: usize, max: usize) -> Self {
        self.value_arity = Some((min, max));
        self
    }

    /// The option must occur at least once.
    pub fn required(mut self) -> Self {
        let (_, max) = self
            .option_arity
            .unwrap_or_else(|| {
                let arity = self.kind.default_option_arity();
                (arity.min, arity.max)
            });
        self.option_arity = Some((1, max.max(1)));
        self
    }

    /// Restricts values to a fixed set.
    pub fn allowed_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.slot.allowed = Some(values.into_iter().collect());
        self
    }

    /// Adds a per-value check; `Err` carries the rejection reason.
    pub fn predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + 'static,
    {
        self.slot.predicates.push(Box::new(predicate));
        self
    }

    /// Adds a check over all converted values.
    pub fn list_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&[T]) -> Result<(), String> + 'static,
    {
        self.slot.list_predicates.push(Box::new(predicate));
        self
    }

    /// Replaces the conversion from text. Required for types without a built-in one.
    pub fn parse_with<F>(mut self, parse: F) -> Self
    where
        F: Fn(&str) -> Result<T, String> + 'static,
    {
        self.slot.parse = Some(Box::new(parse));
        self
    }

    pub(crate) fn into_slot(self) -> (Declaration, Box<dyn Slot<C>>) {
        let declaration = Declaration {
            name: self.name,
            kind: self.kind,
            aliases: self.aliases,
            description: self.description,
            usage: self.usage,
            option_arity: self.option_arity,
            value_arity: self.value_arity,
        };
        (declaration, Box::new(self.slot))
    }
}

/// Untyped part of a declaration.
#[derive(Debug, Clone)]
pub(crate) struct Declaration {
    pub(crate) name: String,
    pub(crate) kind: OptionKind,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) usage: Option<String>,
    pub(crate) option_arity: Option<(usize, usize)>,
    pub(crate) value_arity: Option<(usize, usize)>,
}
