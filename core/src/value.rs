//! Value kinds.
//!
//! Every typed option stores its values as some `T: ValueKind`. The trait
//! supplies the built-in text conversion (if the type has one) and the
//! comparison used by allowed-value sets. Custom types implement the trait
//! without a built-in parser and provide one at declaration time with
//! [`OptionBuilder::parse_with`](crate::OptionBuilder::parse_with).

use std::fmt::Debug;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// Text-to-value conversion.
pub type ParseFn<T> = fn(&str) -> Result<T, String>;

/// A type option values can be converted to.
///
/// # Examples
///
/// A custom type without a built-in parser:
///
/// ```
/// use argot_core::ValueKind;
///
/// #[derive(Debug, Clone, PartialEq, PartialOrd)]
/// struct Level(u8);
///
/// impl ValueKind for Level {
///     fn kind_name() -> &'static str {
///         "level"
///     }
/// }
///
/// assert!(Level::builtin_parser().is_none());
/// ```
pub trait ValueKind: Clone + PartialEq + PartialOrd + Debug + 'static {
    /// Human-readable type name used in messages.
    fn kind_name() -> &'static str;

    /// Built-in conversion from text; `None` requires an explicit parse callback.
    fn builtin_parser() -> Option<ParseFn<Self>> {
        None
    }

    /// Equality used for allowed-value checks on case-insensitive parsers.
    fn eq_ignore_case(&self, other: &Self) -> bool {
        self == other
    }
}

macro_rules! from_str_kind {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl ValueKind for $ty {
                fn kind_name() -> &'static str {
                    $name
                }

                fn builtin_parser() -> Option<ParseFn<Self>> {
                    Some(|raw| raw.trim().parse::<$ty>().map_err(|e| e.to_string()))
                }
            }
        )+
    };
}

from_str_kind! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
}

impl ValueKind for bool {
    fn kind_name() -> &'static str {
        "bool"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(parse_bool)
    }
}

/// Parses `true/false/yes/no/on/off/1/0`, ignoring ASCII case.
///
/// # Errors
///
/// Returns a message naming the rejected text.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    const TRUE: [&str; 4] = ["true", "yes", "on", "1"];
    const FALSE: [&str; 4] = ["false", "no", "off", "0"];

    let raw = raw.trim();
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(raw)) {
        Ok(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(raw)) {
        Ok(false)
    } else {
        Err(format!("'{raw}' is not a boolean"))
    }
}

impl ValueKind for char {
    fn kind_name() -> &'static str {
        "char"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(|raw| {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("'{raw}' is not a single character")),
            }
        })
    }

    fn eq_ignore_case(&self, other: &Self) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl ValueKind for String {
    fn kind_name() -> &'static str {
        "string"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(|raw| Ok(raw.to_string()))
    }

    fn eq_ignore_case(&self, other: &Self) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl ValueKind for PathBuf {
    fn kind_name() -> &'static str {
        "path"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(|raw| {
            if raw.is_empty() {
                Err("path cannot be empty".to_string())
            } else {
                Ok(PathBuf::from(raw))
            }
        })
    }
}

impl ValueKind for NaiveDate {
    fn kind_name() -> &'static str {
        "date"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| e.to_string()))
    }
}

impl ValueKind for NaiveTime {
    fn kind_name() -> &'static str {
        "time"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(|raw| {
            let raw = raw.trim();
            NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                .map_err(|e| e.to_string())
        })
    }
}

impl ValueKind for NaiveDateTime {
    fn kind_name() -> &'static str {
        "datetime"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(|raw| {
            let raw = raw.trim();
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
                .map_err(|e| e.to_string())
        })
    }
}

impl ValueKind for DateTime<FixedOffset> {
    fn kind_name() -> &'static str {
        "timestamp"
    }

    fn builtin_parser() -> Option<ParseFn<Self>> {
        Some(|raw| DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: ValueKind>(raw: &str) -> Result<T, String> {
        let parser = T::builtin_parser().expect("built-in parser");
        parser(raw)
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse::<i32>("-100"), Ok(-100));
        assert_eq!(parse::<u8>(" 7 "), Ok(7));
        assert!(parse::<u8>("256").is_err());
        assert!(parse::<i64>("ten").is_err());
        assert_eq!(parse::<f64>("2.5"), Ok(2.5));
    }

    #[test]
    fn test_bools() {
        for raw in ["true", "YES", "on", "1"] {
            assert_eq!(parse_bool(raw), Ok(true), "{raw}");
        }
        for raw in ["False", "no", "OFF", "0"] {
            assert_eq!(parse_bool(raw), Ok(false), "{raw}");
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_chars_and_strings() {
        assert_eq!(parse::<char>("x"), Ok('x'));
        assert!(parse::<char>("xy").is_err());
        assert!(parse::<char>("").is_err());
        assert_eq!(parse::<String>(" keep "), Ok(" keep ".to_string()));
        assert!('A'.eq_ignore_case(&'a'));
        assert!("Json".to_string().eq_ignore_case(&"JSON".to_string()));
        assert!(!5_i32.eq_ignore_case(&6));
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            parse::<NaiveDate>("2024-02-29"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(parse::<NaiveDate>("2023-02-29").is_err());
        assert!(parse::<NaiveTime>("12:30").is_ok());
        assert!(parse::<NaiveDateTime>("2024-01-01 08:00:00").is_ok());
        assert!(parse::<DateTime<FixedOffset>>("2024-01-01T08:00:00+02:00").is_ok());
    }

    #[test]
    fn test_paths() {
        assert_eq!(parse::<PathBuf>("/tmp/x"), Ok(PathBuf::from("/tmp/x")));
        assert!(parse::<PathBuf>("").is_err());
    }
}
