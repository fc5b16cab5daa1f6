//! Alias validation and registration.
//!
//! An alias is the user-facing identifier of an option before any prefix
//! decoration: `v`, `value`, `null-value`. Aliases are normalized to a
//! canonical form (words joined by `-`), checked against the reserved names
//! and the enabled prefix rules, and registered so no two options share one.

use crate::config::ParserConfig;
use crate::delimiter::PrefixRules;
use crate::error::BuildError;
use crate::words::is_allowed_symbol;

/// Aliases owned by the built-in help switch; unavailable to user options.
pub const RESERVED_ALIASES: [&str; 3] = ["h", "?", "help"];

/// Returns `true` if `alias` is reserved (case-insensitive).
pub fn is_reserved(alias: &str) -> bool {
    RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
}

/// Normalizes and legality-checks a user alias.
///
/// Leading prefix characters are stripped, `_`, `-` and whitespace runs
/// collapse into single `-` separators. The result must not start with a
/// digit, must not be reserved, must fit `max_alias_length` and must be
/// usable with at least one enabled prefix rule.
///
/// # Errors
///
/// Returns the [`BuildError`] describing the first violated rule.
///
/// # Examples
///
/// ```
/// use argot_core::{validate_alias, BuildError, ParserConfig};
///
/// let config = ParserConfig::default();
/// assert_eq!(validate_alias("--Null_Value", &config).unwrap(), "Null-Value");
/// assert_eq!(validate_alias(" v ", &config).unwrap(), "v");
/// assert!(matches!(validate_alias("help", &config), Err(BuildError::ReservedAlias(_))));
/// assert!(matches!(validate_alias("2x", &config), Err(BuildError::InvalidAlias(_))));
/// ```
pub fn validate_alias(raw: &str, config: &ParserConfig) -> Result<String, BuildError> {
    let alias = normalize_alias(raw)?;

    if is_reserved(&alias) {
        return Err(BuildError::ReservedAlias(alias));
    }
    check_shape(alias, config)
}

/// Validates a built-in alias, skipping the reserved-name check.
pub(crate) fn validate_builtin_alias(
    raw: &str,
    config: &ParserConfig,
) -> Result<String, BuildError> {
    check_shape(normalize_alias(raw)?, config)
}

fn check_shape(alias: String, config: &ParserConfig) -> Result<String, BuildError> {
    let len = alias.chars().count();
    if len > config.max_alias_length {
        return Err(BuildError::AliasTooLong {
            alias,
            max: config.max_alias_length,
        });
    }

    let usable = if len == 1 {
        config.prefixes.allows_short()
    } else {
        config.prefixes.allows_long()
    };
    if !usable {
        return Err(BuildError::AliasPrefixMismatch(alias));
    }

    Ok(alias)
}

/// Normalizes an alias without checking reserved names or prefix rules.
///
/// # Errors
///
/// Returns [`BuildError::EmptyAlias`] or [`BuildError::InvalidAlias`].
pub fn normalize_alias(raw: &str) -> Result<String, BuildError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BuildError::EmptyAlias);
    }

    let body = trimmed.trim_start_matches(['-', '/']);
    if body.is_empty() {
        return Err(BuildError::InvalidAlias(trimmed.to_string()));
    }

    // A lone symbol is a legal short alias (`-?`, `-@`).
    let mut chars = body.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if is_allowed_symbol(c) {
            return Ok(c.to_string());
        }
    }

    let mut alias = String::with_capacity(body.len());
    let mut pending_separator = false;
    for c in body.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => {
                if pending_separator && !alias.is_empty() {
                    alias.push('-');
                }
                pending_separator = false;
                alias.push(c);
            }
            '_' | '-' => pending_separator = true,
            c if c.is_whitespace() => pending_separator = true,
            _ => return Err(BuildError::InvalidAlias(trimmed.to_string())),
        }
    }

    match alias.chars().next() {
        None => Err(BuildError::InvalidAlias(trimmed.to_string())),
        Some(first) if first.is_ascii_digit() => {
            Err(BuildError::InvalidAlias(trimmed.to_string()))
        }
        Some(_) => Ok(alias),
    }
}

/// Prefixed spellings of a canonical alias, shortest first.
///
/// # Examples
///
/// ```
/// use argot_core::{prefixed_variants, PrefixRules};
///
/// let rules = PrefixRules::ALL;
/// assert_eq!(prefixed_variants("v", rules), vec!["/v", "-v", "--v"]);
/// assert_eq!(
///     prefixed_variants("value", PrefixRules::default()),
///     vec!["--value"]
/// );
/// ```
pub fn prefixed_variants(alias: &str, rules: PrefixRules) -> Vec<String> {
    let mut variants: Vec<String> = rules
        .prefixes_for_len(alias.chars().count())
        .into_iter()
        .map(|prefix| format!("{prefix}{alias}"))
        .collect();
    variants.sort_by_key(String::len);
    variants
}

/// Canonical aliases in use, each with its owning option, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    entries: Vec<(String, String)>,
    case_sensitive: bool,
}

impl AliasRegistry {
    /// Creates an empty registry.
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            entries: Vec::new(),
            case_sensitive,
        }
    }

    /// Owner of `alias`, if registered.
    pub fn owner(&self, alias: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(used, _)| self.same(used, alias))
            .map(|(_, owner)| owner.as_str())
    }

    /// Returns `true` if `alias` is registered.
    pub fn contains(&self, alias: &str) -> bool {
        self.owner(alias).is_some()
    }

    /// Registers `alias` for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::AliasAlreadyInUse`] if another option owns it.
    pub fn insert(&mut self, alias: &str, owner: &str) -> Result<(), BuildError> {
        if let Some(existing) = self.owner(alias) {
            return Err(BuildError::AliasAlreadyInUse {
                alias: alias.to_string(),
                owner: existing.to_string(),
            });
        }
        self.entries.push((alias.to_string(), owner.to_string()));
        Ok(())
    }

    /// Registered aliases in insertion order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(alias, _)| alias.as_str())
    }

    /// Whether comparisons are case-sensitive.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn same(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }
}

/// Removes duplicates from `aliases`, keeping first occurrences.
pub(crate) fn dedup_aliases(aliases: Vec<String>, case_sensitive: bool) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(aliases.len());
    for alias in aliases {
        let seen = unique.iter().any(|kept| {
            if case_sensitive {
                *kept == alias
            } else {
                kept.eq_ignore_ascii_case(&alias)
            }
        });
        if !seen {
            unique.push(alias);
        }
    }
    unique
}
