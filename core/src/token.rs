//! Tokenizer and alias/value extraction.
//!
//! Every argv element becomes a [`Token`]. The tokenizer decides whether an
//! element addresses an option (and which alias it used, plus any inline
//! value) or is a bare value for positional options.
//!
//! Prefix families are tried in priority order: `--`, `-`, `/`. Within a
//! family, registered aliases are tried longest first, so `--value` wins
//! over `--val` for the token `--value=1`.

use tracing::trace;

use crate::config::ParserConfig;
use crate::delimiter::PrefixFamily;
use crate::error::{ErrorCode, ErrorInfo};
use crate::words::is_allowed_symbol;

/// One argv element and what the parse pass learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Position in argv.
    pub index: usize,
    /// The raw argv element.
    pub raw: String,
    /// Registered (prefixed) alias this token addresses.
    pub alias: Option<String>,
    /// Inline value, or the whole element for bare values.
    pub value: Option<String>,
    /// The token is malformed and excluded from matching.
    pub invalid: bool,
    /// An option has claimed this token.
    pub parsed: bool,
}

impl Token {
    fn bare(index: usize, raw: &str) -> Self {
        Self {
            index,
            raw: raw.to_string(),
            alias: None,
            value: Some(raw.to_string()),
            invalid: false,
            parsed: false,
        }
    }

    fn invalid(index: usize, raw: &str) -> Self {
        Self {
            index,
            raw: raw.to_string(),
            alias: None,
            value: None,
            invalid: true,
            parsed: false,
        }
    }

    /// A value without alias that no option has claimed yet.
    pub fn is_bare_value(&self) -> bool {
        self.alias.is_none() && self.value.is_some() && !self.invalid && !self.parsed
    }

    /// An alias token that no option has claimed yet.
    pub fn is_unclaimed_alias(&self) -> bool {
        self.alias.is_some() && !self.invalid && !self.parsed
    }
}

/// Result of splitting one argv element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// The element addresses `alias`, with an optional inline value.
    Alias { alias: String, value: Option<String> },
    /// The element is a bare value.
    Bare,
}

/// Splits argv elements into aliases and values.
///
/// # Examples
///
/// ```
/// use argot_core::{Extracted, ParserConfig, PrefixRules, Tokenizer};
///
/// let config = ParserConfig { prefixes: PrefixRules::ALL, ..ParserConfig::default() };
/// let tokenizer = Tokenizer::new(["-v", "--value", "/v"], &config);
///
/// assert_eq!(
///     tokenizer.extract("--value=10").unwrap(),
///     Extracted::Alias { alias: "--value".into(), value: Some("10".into()) }
/// );
/// assert_eq!(
///     tokenizer.extract("-v10").unwrap(),
///     Extracted::Alias { alias: "-v".into(), value: Some("10".into()) }
/// );
/// assert_eq!(tokenizer.extract("-100").unwrap(), Extracted::Bare);
/// assert!(tokenizer.extract("--nope").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    aliases: Vec<String>,
    config: &'a ParserConfig,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over the registered prefixed aliases.
    pub fn new<I, S>(aliases: I, config: &'a ParserConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
        // Longest first; ties broken lexically so matching never depends on
        // declaration order.
        aliases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        aliases.dedup();
        Self { aliases, config }
    }

    /// Builds tokens for a whole argv, flagging malformed elements.
    ///
    /// Invalid tokens keep their argv slot but carry no alias or value.
    /// Empty elements produce no token; the others keep their argv index.
    pub fn tokenize<S: AsRef<str>>(&self, args: &[S]) -> (Vec<Token>, Vec<ErrorInfo>) {
        let mut tokens = Vec::with_capacity(args.len());
        let mut errors = Vec::new();

        for (index, arg) in args.iter().enumerate() {
            let raw = arg.as_ref();
            if raw.is_empty() {
                continue;
            }
            match self.extract(raw) {
                Ok(Extracted::Alias { alias, value }) => tokens.push(Token {
                    index,
                    raw: raw.to_string(),
                    alias: Some(alias),
                    value,
                    invalid: false,
                    parsed: false,
                }),
                Ok(Extracted::Bare) => tokens.push(Token::bare(index, raw)),
                Err(err) => {
                    trace!(index, token = raw, code = %err.code, "Rejected token");
                    tokens.push(Token::invalid(index, raw));
                    errors.push(err);
                }
            }
        }

        (tokens, errors)
    }

    /// Splits one argv element.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::InvalidToken`] for a bare prefix (`-`, `--`, `/`).
    /// - [`ErrorCode::InvalidAliasUsage`] when a known alias is followed by
    ///   something other than a delimiter.
    /// - [`ErrorCode::UnknownToken`] when the element looks like an option
    ///   but matches no alias.
    pub fn extract(&self, raw: &str) -> Result<Extracted, ErrorInfo> {
        if let Some(family) = PrefixFamily::of(raw) {
            if raw == family.prefix() && self.config.prefixes.allows_family(family) {
                return Err(ErrorInfo::new(ErrorCode::InvalidToken, [raw]));
            }
        }

        for family in PrefixFamily::PRIORITY {
            if self.config.prefixes.allows_family(family) && looks_like(family, raw) {
                return match self.match_family(family, raw) {
                    // Paths such as /usr/bin stay values unless an alias claims them.
                    Err(_) if family == PrefixFamily::ForwardSlash && raw[1..].contains('/') => {
                        Ok(Extracted::Bare)
                    }
                    result => result,
                };
            }
        }

        Ok(Extracted::Bare)
    }

    fn match_family(&self, family: PrefixFamily, raw: &str) -> Result<Extracted, ErrorInfo> {
        let delimiters = self.config.alias_delimiters;
        let mut misused: Option<&str> = None;

        let candidates = self
            .aliases
            .iter()
            .filter(|alias| PrefixFamily::of(alias) == Some(family));

        for alias in candidates {
            let Some(rest) = self.strip_alias(raw, alias) else {
                continue;
            };

            let Some(first) = rest.chars().next() else {
                return Ok(Extracted::Alias {
                    alias: alias.clone(),
                    value: None,
                });
            };

            if delimiters.is_inline(first) {
                return Ok(Extracted::Alias {
                    alias: alias.clone(),
                    value: Some(rest[first.len_utf8()..].to_string()),
                });
            }

            let body_len = alias.len() - family.prefix().len();
            if family == PrefixFamily::SingleDash && delimiters.allows_omit() && body_len == 1 {
                return Ok(Extracted::Alias {
                    alias: alias.clone(),
                    value: Some(rest.to_string()),
                });
            }

            misused.get_or_insert(alias.as_str());
        }

        match misused {
            Some(alias) => Err(ErrorInfo::new(ErrorCode::InvalidAliasUsage, [raw, alias])),
            None => Err(ErrorInfo::new(ErrorCode::UnknownToken, [raw])),
        }
    }

    /// Returns what follows `alias` in `raw`, if `raw` starts with it.
    fn strip_alias<'r>(&self, raw: &'r str, alias: &str) -> Option<&'r str> {
        if raw.len() < alias.len() || !raw.is_char_boundary(alias.len()) {
            return None;
        }
        let (head, rest) = raw.split_at(alias.len());
        self.config.alias_eq(head, alias).then_some(rest)
    }
}

/// Whether `raw` is shaped like an option of `family`.
fn looks_like(family: PrefixFamily, raw: &str) -> bool {
    let is_alias_start = |c: char| c.is_ascii_alphabetic() || is_allowed_symbol(c);
    match family {
        PrefixFamily::DoubleDash => raw.len() > 2 && raw.starts_with("--"),
        PrefixFamily::SingleDash => {
            !raw.starts_with("--")
                && raw
                    .strip_prefix('-')
                    .and_then(|rest| rest.chars().next())
                    .is_some_and(is_alias_start)
        }
        PrefixFamily::ForwardSlash => raw
            .strip_prefix('/')
            .and_then(|rest| rest.chars().next())
            .is_some_and(is_alias_start),
    }
}
