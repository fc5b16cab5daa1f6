//! Parser configuration.
//!
//! Every syntax decision the tokenizer and option model make is driven by a
//! [`ParserConfig`]. The configuration is plain data and can be loaded from
//! YAML (or JSON):
//!
//! ```yaml
//! case_sensitive: false
//! prefixes: [single-dash-short, double-dash-long, forward-slash-long]
//! alias_delimiters: [equal-sign, colon, whitespace]
//! value_delimiters: [comma]
//! max_alias_length: 24
//! version_option: true
//! ```
//!
//! Missing keys fall back to [`ParserConfig::default`].

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::delimiter::{AliasDelimiters, PrefixRules, ValueDelimiters};
use crate::error::ConfigError;

/// Default maximum alias length.
pub const DEFAULT_MAX_ALIAS_LENGTH: usize = 32;

/// Default maximum number of words in a suggested long alias.
pub const DEFAULT_MAX_ALIAS_WORD_COUNT: usize = 4;

/// Parser-wide syntax and behavior settings.
///
/// # Examples
///
/// ```
/// use argot_core::{ParserConfig, PrefixRules, ValueDelimiters};
///
/// let config = ParserConfig {
///     prefixes: PrefixRules::ALL,
///     value_delimiters: ValueDelimiters::COMMA,
///     ..ParserConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// assert!(config.case_sensitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Compare aliases (and string allowed-values) case-sensitively.
    pub case_sensitive: bool,
    /// Enabled alias prefix families.
    pub prefixes: PrefixRules,
    /// Enabled alias/value delimiters.
    pub alias_delimiters: AliasDelimiters,
    /// Enabled value-list delimiters; empty disables splitting.
    pub value_delimiters: ValueDelimiters,
    /// Named options keep consuming bare tokens after their first value.
    pub allow_sequential_values: bool,
    /// Longest alias accepted or suggested.
    pub max_alias_length: usize,
    /// Most words joined into a suggested long alias.
    pub max_alias_word_count: usize,
    /// Register the built-in help switch.
    pub help_option: bool,
    /// Register the built-in version switch.
    pub version_option: bool,
    /// Register the built-in verbosity counter.
    pub verbosity_option: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            prefixes: PrefixRules::default(),
            alias_delimiters: AliasDelimiters::default(),
            value_delimiters: ValueDelimiters::default(),
            allow_sequential_values: true,
            max_alias_length: DEFAULT_MAX_ALIAS_LENGTH,
            max_alias_word_count: DEFAULT_MAX_ALIAS_WORD_COUNT,
            help_option: true,
            version_option: false,
            verbosity_option: false,
        }
    }
}

impl ParserConfig {
    /// Loads configuration from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if parsing fails, or [`ConfigError::Invalid`]
    /// if a setting is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a YAML or JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefixes.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one prefix rule must be enabled".to_string(),
            ));
        }
        if self.max_alias_length == 0 {
            return Err(ConfigError::Invalid(
                "max_alias_length must be at least 1".to_string(),
            ));
        }
        if self.max_alias_word_count == 0 {
            return Err(ConfigError::Invalid(
                "max_alias_word_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Compares two aliases under this configuration's case rules.
    pub fn alias_eq(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }
}
