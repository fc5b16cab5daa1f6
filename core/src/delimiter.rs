//! Prefix and delimiter rule sets.
//!
//! Each rule set is a small bitset over the syntax rules a parser accepts.
//! The sets are pure data: they map enabled rules to the concrete prefix
//! strings and delimiter characters the tokenizer works with.
//!
//! Rule sets serialize as lists of kebab-case rule names so they read
//! naturally in YAML configuration:
//!
//! ```yaml
//! prefixes: [single-dash-short, double-dash-long]
//! alias_delimiters: [equal-sign, whitespace, omit]
//! value_delimiters: [comma]
//! ```

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

macro_rules! rule_set {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$rmeta:meta])* $rule:ident = $bit:expr, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Vec<String>", into = "Vec<String>")]
        pub struct $name(u8);

        impl $name {
            $($(#[$rmeta])* pub const $rule: Self = Self($bit);)+

            /// No rule enabled.
            pub const NONE: Self = Self(0);

            /// Every rule enabled.
            pub const ALL: Self = Self(0 $(| $bit)+);

            const NAMES: &'static [(&'static str, Self)] = &[$(($label, Self::$rule),)+];

            /// Returns the raw bits.
            pub const fn bits(self) -> u8 {
                self.0
            }

            /// Returns `true` if every rule in `other` is enabled.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Returns `true` if no rule is enabled.
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// Returns the union of both sets.
            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Returns this set without the rules in `other`.
            pub const fn without(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }

            /// Looks up a rule by its kebab-case name.
            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim();
                Self::NAMES
                    .iter()
                    .find(|(label, _)| label.eq_ignore_ascii_case(name))
                    .map(|(_, rule)| *rule)
            }

            /// Names of the enabled rules, in declaration order.
            pub fn names(self) -> Vec<&'static str> {
                Self::NAMES
                    .iter()
                    .filter(|(_, rule)| self.contains(*rule))
                    .map(|(label, _)| *label)
                    .collect()
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.names()).finish()
            }
        }

        impl TryFrom<Vec<String>> for $name {
            type Error = String;

            fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
                names.iter().try_fold(Self::NONE, |acc, name| {
                    Self::from_name(name)
                        .map(|rule| acc | rule)
                        .ok_or_else(|| format!("unknown {} rule: {name}", stringify!($name)))
                })
            }
        }

        impl From<$name> for Vec<String> {
            fn from(set: $name) -> Self {
                set.names().into_iter().map(String::from).collect()
            }
        }
    };
}

rule_set! {
    /// Alias prefix families a parser recognizes.
    ///
    /// Short aliases are a single character, long aliases two or more.
    ///
    /// # Examples
    ///
    /// ```
    /// use argot_core::PrefixRules;
    ///
    /// let rules = PrefixRules::SINGLE_DASH_SHORT | PrefixRules::DOUBLE_DASH_LONG;
    /// assert_eq!(rules.short_prefixes(), vec!["-"]);
    /// assert_eq!(rules.long_prefixes(), vec!["--"]);
    /// ```
    PrefixRules {
        /// `-v`
        SINGLE_DASH_SHORT = 1, "single-dash-short";
        /// `-value`
        SINGLE_DASH_LONG = 2, "single-dash-long";
        /// `--v`
        DOUBLE_DASH_SHORT = 4, "double-dash-short";
        /// `--value`
        DOUBLE_DASH_LONG = 8, "double-dash-long";
        /// `/v`
        FORWARD_SLASH_SHORT = 16, "forward-slash-short";
        /// `/value`
        FORWARD_SLASH_LONG = 32, "forward-slash-long";
    }
}

rule_set! {
    /// Delimiters accepted between an alias and its inline value.
    AliasDelimiters {
        /// `--key=value`
        EQUAL_SIGN = 1, "equal-sign";
        /// `--key:value`
        COLON = 2, "colon";
        /// `--key value` (separate argv elements)
        WHITESPACE = 4, "whitespace";
        /// `-kvalue` (single-character aliases only)
        OMIT = 8, "omit";
    }
}

rule_set! {
    /// Delimiters that split one value token into several values.
    ValueDelimiters {
        /// `a;b`
        SEMICOLON = 1, "semicolon";
        /// `a,b`
        COMMA = 2, "comma";
        /// `a|b`
        PIPE = 4, "pipe";
    }
}

/// Prefix families in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixFamily {
    DoubleDash,
    SingleDash,
    ForwardSlash,
}

impl PrefixFamily {
    /// All families, highest matching priority first.
    pub const PRIORITY: [Self; 3] = [Self::DoubleDash, Self::SingleDash, Self::ForwardSlash];

    /// The literal prefix.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::DoubleDash => "--",
            Self::SingleDash => "-",
            Self::ForwardSlash => "/",
        }
    }

    /// Rule enabling short aliases for this family.
    pub const fn short_rule(self) -> PrefixRules {
        match self {
            Self::DoubleDash => PrefixRules::DOUBLE_DASH_SHORT,
            Self::SingleDash => PrefixRules::SINGLE_DASH_SHORT,
            Self::ForwardSlash => PrefixRules::FORWARD_SLASH_SHORT,
        }
    }

    /// Rule enabling long aliases for this family.
    pub const fn long_rule(self) -> PrefixRules {
        match self {
            Self::DoubleDash => PrefixRules::DOUBLE_DASH_LONG,
            Self::SingleDash => PrefixRules::SINGLE_DASH_LONG,
            Self::ForwardSlash => PrefixRules::FORWARD_SLASH_LONG,
        }
    }

    /// Identifies the family of a prefixed alias or token.
    ///
    /// `--` wins over `-`.
    pub fn of(token: &str) -> Option<Self> {
        if token.starts_with("--") {
            Some(Self::DoubleDash)
        } else if token.starts_with('-') {
            Some(Self::SingleDash)
        } else if token.starts_with('/') {
            Some(Self::ForwardSlash)
        } else {
            None
        }
    }
}

impl PrefixRules {
    /// Returns `true` if any family accepts single-character aliases.
    pub const fn allows_short(self) -> bool {
        self.0
            & (Self::SINGLE_DASH_SHORT.0 | Self::DOUBLE_DASH_SHORT.0 | Self::FORWARD_SLASH_SHORT.0)
            != 0
    }

    /// Returns `true` if any family accepts multi-character aliases.
    pub const fn allows_long(self) -> bool {
        self.0
            & (Self::SINGLE_DASH_LONG.0 | Self::DOUBLE_DASH_LONG.0 | Self::FORWARD_SLASH_LONG.0)
            != 0
    }

    /// Returns `true` if any rule of `family` is enabled.
    pub const fn allows_family(self, family: PrefixFamily) -> bool {
        self.0 & (family.short_rule().0 | family.long_rule().0) != 0
    }

    /// Prefixes usable in front of single-character aliases.
    pub fn short_prefixes(self) -> Vec<&'static str> {
        PrefixFamily::PRIORITY
            .into_iter()
            .rev()
            .filter(|family| self.contains(family.short_rule()))
            .map(PrefixFamily::prefix)
            .collect()
    }

    /// Prefixes usable in front of multi-character aliases.
    pub fn long_prefixes(self) -> Vec<&'static str> {
        PrefixFamily::PRIORITY
            .into_iter()
            .rev()
            .filter(|family| self.contains(family.long_rule()))
            .map(PrefixFamily::prefix)
            .collect()
    }

    /// Prefixes usable for an alias of `len` characters.
    pub fn prefixes_for_len(self, len: usize) -> Vec<&'static str> {
        if len == 1 {
            self.short_prefixes()
        } else {
            self.long_prefixes()
        }
    }
}

impl Default for PrefixRules {
    fn default() -> Self {
        Self::SINGLE_DASH_SHORT | Self::DOUBLE_DASH_LONG
    }
}

impl AliasDelimiters {
    /// Inline delimiter characters (`=`, `:`).
    pub fn chars(self) -> Vec<char> {
        let mut chars = Vec::with_capacity(2);
        if self.contains(Self::EQUAL_SIGN) {
            chars.push('=');
        }
        if self.contains(Self::COLON) {
            chars.push(':');
        }
        chars
    }

    /// Whether `c` separates an alias from its inline value.
    pub fn is_inline(self, c: char) -> bool {
        (c == '=' && self.contains(Self::EQUAL_SIGN)) || (c == ':' && self.contains(Self::COLON))
    }

    /// Values may follow their alias as separate argv elements.
    pub const fn allows_whitespace(self) -> bool {
        self.contains(Self::WHITESPACE)
    }

    /// Single-character aliases may be glued to their value.
    pub const fn allows_omit(self) -> bool {
        self.contains(Self::OMIT)
    }
}

impl Default for AliasDelimiters {
    fn default() -> Self {
        Self::EQUAL_SIGN | Self::WHITESPACE | Self::OMIT
    }
}

impl ValueDelimiters {
    /// Value-list delimiter characters.
    pub fn chars(self) -> Vec<char> {
        [(Self::SEMICOLON, ';'), (Self::COMMA, ','), (Self::PIPE, '|')]
            .into_iter()
            .filter(|(rule, _)| self.contains(*rule))
            .map(|(_, c)| c)
            .collect()
    }

    /// Splits a value token on every enabled delimiter.
    ///
    /// With no delimiter enabled the token comes back unchanged. Empty
    /// fragments are kept so `a,,b` yields three values.
    ///
    /// # Examples
    ///
    /// ```
    /// use argot_core::ValueDelimiters;
    ///
    /// let delims = ValueDelimiters::COMMA | ValueDelimiters::PIPE;
    /// assert_eq!(delims.split("1,2|3"), vec!["1", "2", "3"]);
    /// assert_eq!(ValueDelimiters::NONE.split("1,2"), vec!["1,2"]);
    /// ```
    pub fn split(self, raw: &str) -> Vec<String> {
        let chars = self.chars();
        if chars.is_empty() {
            return vec![raw.to_string()];
        }
        raw.split(|c: char| chars.contains(&c))
            .map(String::from)
            .collect()
    }
}

impl Default for ValueDelimiters {
    fn default() -> Self {
        Self::NONE
    }
}
