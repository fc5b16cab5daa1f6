//! Option declaration files.
//!
//! A declaration file describes a parser in YAML (or JSON):
//!
//! ```yaml
//! parser:
//!   prefixes: [single-dash-short, double-dash-long]
//!   value_delimiters: [comma]
//! options:
//!   - name: Port
//!     kind: scalar-named
//!     type: uint
//!     aliases: [p, port]
//!     default: 8080
//!   - name: Files
//!     kind: sequential-value
//!     type: path
//!     value_arity: { min: 1 }
//! ```
//!
//! Parsed values are bound into a JSON object keyed by option name.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use argot_core::{
    Arity, BuildError, CliOption, FieldHandle, Many, OptionBuilder, OptionKind, Parser,
    ParserConfig, Single, ValueKind,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bound values, keyed by option name.
pub type Values = Map<String, Value>;

/// A parser declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub options: Vec<OptionDecl>,
}

/// Value types a declaration can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Char,
    Date,
    Time,
    Datetime,
    Timestamp,
    Path,
}

/// Arity bounds; a missing `max` means unbounded.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArityDecl {
    #[serde(default)]
    pub min: usize,
    pub max: Option<usize>,
}

impl ArityDecl {
    fn bounds(self) -> (usize, usize) {
        (self.min, self.max.unwrap_or(usize::MAX))
    }
}

/// One declared option.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDecl {
    pub name: String,
    pub kind: OptionKind,
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub option_arity: Option<ArityDecl>,
    pub value_arity: Option<ArityDecl>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub allowed: Vec<serde_yaml::Value>,
    pub default: Option<serde_yaml::Value>,
    /// Regular expression every value's text must match.
    pub pattern: Option<String>,
}

impl OptionDecl {
    /// The value type, checked against what the kind supports.
    fn resolved_type(&self) -> Result<ValueType, String> {
        let fixed = match self.kind {
            OptionKind::Switch => Some(ValueType::Bool),
            OptionKind::Counter => Some(ValueType::Uint),
            _ => None,
        };
        match (fixed, self.value_type) {
            (Some(fixed), Some(requested)) if fixed != requested => Err(format!(
                "option {}: a {} option always has type {fixed:?}",
                self.name,
                self.kind.as_str()
            )),
            (Some(fixed), _) => Ok(fixed),
            (None, requested) => Ok(requested.unwrap_or(ValueType::String)),
        }
    }
}

impl Declaration {
    /// Reads a declaration file.
    ///
    /// # Errors
    ///
    /// Returns a message if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
        serde_yaml::from_str(&text)
            .map_err(|err| format!("Failed to parse '{}': {err}", path.display()))
    }

    /// Builds a parser binding into [`Values`].
    ///
    /// # Errors
    ///
    /// Returns a message naming the first declaration problem.
    pub fn build(&self) -> Result<Parser<Values>, String> {
        let mut parser = Parser::new(self.parser.clone()).map_err(|err| describe(&err))?;
        for option in &self.options {
            add_option(&mut parser, option)?;
        }
        Ok(parser)
    }
}

macro_rules! with_value_type {
    ($value_type:expr, $t:ident => $body:expr) => {
        match $value_type {
            ValueType::Bool => {
                type $t = bool;
                $body
            }
            ValueType::Int => {
                type $t = i64;
                $body
            }
            ValueType::Uint => {
                type $t = u64;
                $body
            }
            ValueType::Float => {
                type $t = f64;
                $body
            }
            ValueType::String => {
                type $t = String;
                $body
            }
            ValueType::Char => {
                type $t = char;
                $body
            }
            ValueType::Date => {
                type $t = NaiveDate;
                $body
            }
            ValueType::Time => {
                type $t = NaiveTime;
                $body
            }
            ValueType::Datetime => {
                type $t = NaiveDateTime;
                $body
            }
            ValueType::Timestamp => {
                type $t = DateTime<FixedOffset>;
                $body
            }
            ValueType::Path => {
                type $t = PathBuf;
                $body
            }
        }
    };
}

fn add_option(parser: &mut Parser<Values>, decl: &OptionDecl) -> Result<FieldHandle, String> {
    let value_type = decl.resolved_type()?;
    let name = decl.name.as_str();

    match decl.kind {
        OptionKind::Switch => finish_single(parser, OptionBuilder::switch(name), decl),
        OptionKind::Counter => finish_single(parser, OptionBuilder::counter(name), decl),
        OptionKind::ScalarNamed => with_value_type!(value_type, T => {
            finish_single(parser, OptionBuilder::<Values, T>::scalar(name), decl)
        }),
        OptionKind::ScalarValue => with_value_type!(value_type, T => {
            finish_single(parser, OptionBuilder::<Values, T>::value(name), decl)
        }),
        OptionKind::SequentialNamed => with_value_type!(value_type, T => {
            finish_many(parser, OptionBuilder::<Values, T, Many>::sequential(name), decl)
        }),
        OptionKind::SequentialValue => with_value_type!(value_type, T => {
            finish_many(parser, OptionBuilder::<Values, T, Many>::values(name), decl)
        }),
    }
}

fn finish_single<T>(
    parser: &mut Parser<Values>,
    builder: OptionBuilder<Values, T, Single>,
    decl: &OptionDecl,
) -> Result<FieldHandle, String>
where
    T: ValueKind + Serialize,
{
    let mut builder = configure(builder, decl)?;
    if let Some(default) = &decl.default {
        builder = builder.default_value(convert(decl, default)?);
    }

    let key = decl.name.clone();
    let builder = builder.bind(move |values: &mut Values, value: T| {
        values.insert(key.clone(), to_json(&value));
    });
    parser.add(builder).map_err(|err| describe(&err))
}

fn finish_many<T>(
    parser: &mut Parser<Values>,
    builder: OptionBuilder<Values, T, Many>,
    decl: &OptionDecl,
) -> Result<FieldHandle, String>
where
    T: ValueKind + Serialize,
{
    let mut builder = configure(builder, decl)?;
    match &decl.default {
        Some(serde_yaml::Value::Sequence(items)) => {
            let defaults = items
                .iter()
                .map(|item| convert(decl, item))
                .collect::<Result<Vec<T>, _>>()?;
            builder = builder.default_values(defaults);
        }
        Some(item) => builder = builder.default_values([convert(decl, item)?]),
        None => {}
    }

    let key = decl.name.clone();
    let builder = builder.bind(move |values: &mut Values, items: Vec<T>| {
        values.insert(key.clone(), to_json(&items));
    });
    parser.add(builder).map_err(|err| describe(&err))
}

/// Applies the settings every option kind shares.
fn configure<T, S>(
    builder: OptionBuilder<Values, T, S>,
    decl: &OptionDecl,
) -> Result<OptionBuilder<Values, T, S>, String>
where
    T: ValueKind + Serialize,
{
    let mut builder = builder.aliases(decl.aliases.iter().cloned());
    if let Some(description) = &decl.description {
        builder = builder.description(description.clone());
    }
    if let Some(usage) = &decl.usage {
        builder = builder.usage(usage.clone());
    }
    if let Some(arity) = decl.option_arity {
        let (min, max) = arity.bounds();
        builder = builder.option_arity(min, max);
    }
    if let Some(arity) = decl.value_arity {
        let (min, max) = arity.bounds();
        builder = builder.value_arity(min, max);
    }
    if decl.required {
        builder = builder.required();
    }

    if !decl.allowed.is_empty() {
        let allowed = decl
            .allowed
            .iter()
            .map(|item| convert(decl, item))
            .collect::<Result<Vec<T>, _>>()?;
        builder = builder.allowed_values(allowed);
    }

    if let Some(pattern) = &decl.pattern {
        let regex = Regex::new(pattern)
            .map_err(|err| format!("option {}: invalid pattern: {err}", decl.name))?;
        builder = builder.predicate(move |value: &T| {
            let text = value_text(value);
            if regex.is_match(&text) {
                Ok(())
            } else {
                Err(format!("does not match pattern {}", regex.as_str()))
            }
        });
    }

    Ok(builder)
}

/// Converts a declared scalar with the type's own parser.
fn convert<T: ValueKind>(decl: &OptionDecl, item: &serde_yaml::Value) -> Result<T, String> {
    let text = match item {
        serde_yaml::Value::String(text) => text.clone(),
        serde_yaml::Value::Number(number) => number.to_string(),
        serde_yaml::Value::Bool(flag) => flag.to_string(),
        other => {
            return Err(format!(
                "option {}: expected a scalar, found {other:?}",
                decl.name
            ));
        }
    };
    let parse = T::builtin_parser()
        .ok_or_else(|| format!("option {}: {} has no parser", decl.name, T::kind_name()))?;
    parse(&text).map_err(|err| format!("option {}: invalid value '{text}': {err}", decl.name))
}

fn to_json<T: Serialize + Debug>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|_| Value::String(format!("{value:?}")))
}

/// Text a pattern is matched against.
fn value_text<T: Serialize + Debug>(value: &T) -> String {
    match to_json(value) {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn describe(err: &BuildError) -> String {
    format!("{} ({})", err, err.code())
}

/// Serializable view of a registered option.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSummary {
    pub name: String,
    pub kind: OptionKind,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    pub aliases: Vec<String>,
    pub option_arity: Arity,
    pub value_arity: Arity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl OptionSummary {
    pub fn of(option: &CliOption<Values>) -> Self {
        Self {
            name: option.name().to_string(),
            kind: option.kind(),
            value_type: option.value_kind(),
            aliases: option.prefixed_aliases().to_vec(),
            option_arity: option.option_arity(),
            value_arity: option.value_arity(),
            description: option.description().map(String::from),
            usage: option.usage().map(String::from),
        }
    }
}
