//! Alias suggestion heuristics.
//!
//! When an option is declared without explicit aliases, a short
//! (one-character) and a long (multi-word) alias are derived from its field
//! name. The search is deterministic: the same name and the same set of
//! already-used aliases, in the same order, always produce the same result,
//! so sibling options with colliding name roots are disambiguated in a
//! stable, testable way.

use tracing::trace;

use crate::alias::{AliasRegistry, is_reserved, validate_alias};
use crate::config::ParserConfig;
use crate::error::BuildError;
use crate::words::normalized_words;

/// Deepest character position probed for a short alias.
pub const SHORT_ALIAS_SEARCH_DEPTH: usize = 8;

/// A suggested alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Suggestion {
    /// A single-character alias.
    Short(String),
    /// A multi-word alias joined with `-`.
    Long(String),
}

impl Suggestion {
    /// The alias text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Short(alias) | Self::Long(alias) => alias,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Short,
    Long,
    Done,
}

/// Lazy, finite sequence of alias suggestions for one field name.
///
/// Yields at most one [`Suggestion::Short`] followed by at most one
/// [`Suggestion::Long`]. Create a new suggester for a fresh attempt.
///
/// # Examples
///
/// ```
/// use argot_core::{AliasSuggester, Suggestion};
///
/// let used = ["v", "value"];
/// let suggestions: Vec<_> = AliasSuggester::new("ValueTestProp", used, true, 32, 4).collect();
/// assert_eq!(
///     suggestions,
///     vec![
///         Suggestion::Short("t".into()),
///         Suggestion::Long("value-test-prop".into()),
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AliasSuggester<'a> {
    words: Vec<String>,
    used: Vec<&'a str>,
    case_sensitive: bool,
    max_alias_length: usize,
    max_word_count: usize,
    stage: Stage,
}

impl<'a> AliasSuggester<'a> {
    /// Creates a suggester for `field_name`, avoiding every alias in `used`.
    pub fn new<I>(
        field_name: &str,
        used: I,
        case_sensitive: bool,
        max_alias_length: usize,
        max_word_count: usize,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            words: normalized_words(field_name),
            used: used.into_iter().collect(),
            case_sensitive,
            max_alias_length,
            max_word_count,
            stage: Stage::Short,
        }
    }

    fn is_used(&self, candidate: &str) -> bool {
        self.used.iter().any(|used| {
            if self.case_sensitive {
                *used == candidate
            } else {
                used.eq_ignore_ascii_case(candidate)
            }
        })
    }

    fn is_available(&self, candidate: &str) -> bool {
        !is_reserved(candidate) && !self.is_used(candidate)
    }

    /// Probes position 0 of every word, then position 1, and so on.
    fn short_alias(&self) -> Option<String> {
        for position in 0..SHORT_ALIAS_SEARCH_DEPTH {
            for word in &self.words {
                let Some(c) = word.chars().nth(position) else {
                    continue;
                };
                if !c.is_ascii_alphabetic() {
                    continue;
                }

                let candidate = c.to_ascii_lowercase().to_string();
                if self.is_available(&candidate) {
                    trace!(alias = %candidate, position, "Suggested short alias");
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Longest leading word phrase that fits the length budget.
    fn long_alias(&self) -> Option<String> {
        let max_words = self.max_word_count.min(self.words.len());
        for count in (1..=max_words).rev() {
            let words = &self.words[..count];
            let len = words.iter().map(String::len).sum::<usize>() + count - 1;
            if len > self.max_alias_length || len < 2 {
                continue;
            }
            if words
                .iter()
                .any(|word| !word.chars().all(|c| c.is_ascii_alphanumeric()))
            {
                continue;
            }

            let candidate = words.join("-").to_ascii_lowercase();
            if candidate.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            if self.is_available(&candidate) {
                trace!(alias = %candidate, words = count, "Suggested long alias");
                return Some(candidate);
            }
        }
        None
    }
}

impl Iterator for AliasSuggester<'_> {
    type Item = Suggestion;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stage {
                Stage::Short => {
                    self.stage = Stage::Long;
                    if let Some(alias) = self.short_alias() {
                        return Some(Suggestion::Short(alias));
                    }
                }
                Stage::Long => {
                    self.stage = Stage::Done;
                    if let Some(alias) = self.long_alias() {
                        return Some(Suggestion::Long(alias));
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

/// Derives aliases for `field_name` under `config`, skipping every alias in `registry`.
///
/// Only suggestions usable with the enabled prefix rules are kept.
///
/// # Errors
///
/// Returns [`BuildError::AliasSuggestionExhausted`] if nothing usable could be derived.
pub fn suggest_aliases(
    field_name: &str,
    registry: &AliasRegistry,
    config: &ParserConfig,
) -> Result<Vec<String>, BuildError> {
    let suggester = AliasSuggester::new(
        field_name,
        registry.aliases(),
        config.case_sensitive,
        config.max_alias_length,
        config.max_alias_word_count,
    );

    let aliases: Vec<String> = suggester
        .filter(|suggestion| match suggestion {
            Suggestion::Short(_) => config.prefixes.allows_short(),
            Suggestion::Long(_) => config.prefixes.allows_long(),
        })
        .filter_map(|suggestion| validate_alias(suggestion.as_str(), config).ok())
        .collect();

    if aliases.is_empty() {
        return Err(BuildError::AliasSuggestionExhausted(field_name.to_string()));
    }
    Ok(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggest(name: &str, used: &[&str]) -> Vec<Suggestion> {
        AliasSuggester::new(name, used.iter().copied(), true, 32, 4).collect()
    }

    #[test]
    fn test_fresh_name_gets_first_letter_and_full_phrase() {
        assert_eq!(
            suggest("NullValue", &[]),
            vec![
                Suggestion::Short("n".into()),
                Suggestion::Long("null-value".into())
            ]
        );
    }

    #[test]
    fn test_long_alias_truncates_at_word_boundary() {
        let suggestions: Vec<_> = AliasSuggester::new(
            "VeryLongApplicationOptionValuePropertyName",
            [],
            true,
            32,
            crate::config::DEFAULT_MAX_ALIAS_WORD_COUNT,
        )
        .collect();
        assert_eq!(
            suggestions.last(),
            Some(&Suggestion::Long("very-long-application-option".into()))
        );

        let wide: Vec<_> = AliasSuggester::new(
            "VeryLongApplicationOptionValuePropertyName",
            [],
            true,
            32,
            10,
        )
        .collect();
        assert_eq!(
            wide.last(),
            Some(&Suggestion::Long("very-long-application-option".into()))
        );
    }

    #[test]
    fn test_short_alias_prefers_later_words_before_deeper_positions() {
        // v is taken, so position 0 of the next word wins before position 1 of "value".
        assert_eq!(
            suggest("ValueTest", &["v"])[0],
            Suggestion::Short("t".into())
        );
        assert_eq!(suggest("Value", &["v"])[0], Suggestion::Short("a".into()));
    }

    #[test]
    fn test_case_insensitive_collisions() {
        let suggestions: Vec<_> =
            AliasSuggester::new("Value", ["V", "value"], false, 32, 4).collect();
        assert_eq!(suggestions, vec![Suggestion::Short("a".into())]);
    }

    #[test]
    fn test_reserved_letters_are_skipped() {
        assert_eq!(suggest("Host", &[])[0], Suggestion::Short("o".into()));
        assert_eq!(suggest("Help", &[]).len(), 1);
    }

    #[test]
    fn test_digit_led_words_never_become_aliases() {
        assert_eq!(
            suggest("2", &[]),
            Vec::<Suggestion>::new(),
        );
        assert_eq!(
            suggest("2fa", &[]),
            vec![Suggestion::Short("f".into())]
        );
    }

    #[test]
    fn test_long_alias_falls_back_to_fewer_words() {
        assert_eq!(
            suggest("ValueTestProp", &["value-test-prop"]).last(),
            Some(&Suggestion::Long("value-test".into()))
        );
    }

    #[test]
    fn test_suggestions_are_deterministic() {
        let used = ["v", "t", "value"];
        let first = suggest("ValueTestProp", &used);
        for _ in 0..10 {
            assert_eq!(suggest("ValueTestProp", &used), first);
        }
    }

    #[test]
    fn test_suggest_aliases_respects_prefix_rules() {
        let mut config = ParserConfig::default();
        config.prefixes = crate::PrefixRules::DOUBLE_DASH_LONG;
        let registry = AliasRegistry::new(true);
        assert_eq!(
            suggest_aliases("NullValue", &registry, &config).unwrap(),
            vec!["null-value"]
        );

        assert_eq!(
            suggest_aliases("X", &registry, &config),
            Err(BuildError::AliasSuggestionExhausted("X".into()))
        );
    }

    #[test]
    fn test_suggested_aliases_validate() {
        let config = ParserConfig::default();
        let registry = AliasRegistry::new(true);
        for name in ["ValueTestProp", "max_depth", "HTTPPort2Go", "x86Target", "Q"] {
            for alias in suggest_aliases(name, &registry, &config).unwrap() {
                assert_eq!(validate_alias(&alias, &config).unwrap(), alias);
            }
        }
    }
}
