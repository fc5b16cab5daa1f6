//! Typed value storage behind an option.
//!
//! The option model itself is untyped: it claims tokens and counts values.
//! Everything that depends on the value type (conversion, allowed sets,
//! predicates, defaults, binding) lives in a [`TypedSlot`] reached through
//! the object-safe [`Slot`] trait.

use std::any::Any;

use crate::error::{ErrorCode, ErrorInfo};
use crate::value::ValueKind;

pub(crate) type ParseCallback<T> = Box<dyn Fn(&str) -> Result<T, String>>;
pub(crate) type Predicate<T> = Box<dyn Fn(&T) -> Result<(), String>>;
pub(crate) type ListPredicate<T> = Box<dyn Fn(&[T]) -> Result<(), String>>;

/// Applies a resolved value onto the caller's configuration object.
pub(crate) enum Binder<C, T> {
    Single(Box<dyn Fn(&mut C, T)>),
    Many(Box<dyn Fn(&mut C, Vec<T>)>),
}

/// Type-erased view of a [`TypedSlot`].
pub(crate) trait Slot<C> {
    /// Name of the value type.
    fn kind_name(&self) -> &'static str;

    /// A conversion is available.
    fn has_parser(&self) -> bool;

    /// Converts and checks `values`, storing them on success.
    fn load(&mut self, option: &str, values: &[String], case_sensitive: bool)
    -> Result<(), ErrorInfo>;

    /// Drops converted values.
    fn clear(&mut self);

    /// A default value is configured.
    fn has_default(&self) -> bool;

    /// Calls the binder with converted values (`present`) or the default.
    ///
    /// Returns `true` if the binder ran.
    fn bind(&self, target: &mut C, present: bool) -> bool;

    fn as_any(&self) -> &dyn Any;
}

pub(crate) struct TypedSlot<C, T: ValueKind> {
    pub(crate) parse: Option<ParseCallback<T>>,
    pub(crate) allowed: Option<Vec<T>>,
    pub(crate) predicates: Vec<Predicate<T>>,
    pub(crate) list_predicates: Vec<ListPredicate<T>>,
    pub(crate) default: Option<Vec<T>>,
    pub(crate) binder: Option<Binder<C, T>>,
    pub(crate) values: Vec<T>,
}

impl<C, T: ValueKind> TypedSlot<C, T> {
    pub(crate) fn new() -> Self {
        Self {
            parse: T::builtin_parser().map(|parse| Box::new(parse) as ParseCallback<T>),
            allowed: None,
            predicates: Vec::new(),
            list_predicates: Vec::new(),
            default: None,
            binder: None,
            values: Vec::new(),
        }
    }

    /// Converted values, or the default when nothing was converted.
    pub(crate) fn resolved(&self) -> &[T] {
        if self.values.is_empty() {
            self.default.as_deref().unwrap_or(&[])
        } else {
            &self.values
        }
    }

    fn is_allowed(&self, value: &T, case_sensitive: bool) -> bool {
        let Some(allowed) = &self.allowed else {
            return true;
        };
        allowed.iter().any(|candidate| {
            if case_sensitive {
                candidate == value
            } else {
                candidate.eq_ignore_case(value)
            }
        })
    }

    fn apply(&self, target: &mut C, values: &[T]) -> bool {
        match &self.binder {
            Some(Binder::Single(bind)) => match values.last() {
                Some(value) => {
                    bind(target, value.clone());
                    true
                }
                None => false,
            },
            Some(Binder::Many(bind)) => {
                bind(target, values.to_vec());
                true
            }
            None => false,
        }
    }
}

impl<C: 'static, T: ValueKind> Slot<C> for TypedSlot<C, T> {
    fn kind_name(&self) -> &'static str {
        T::kind_name()
    }

    fn has_parser(&self) -> bool {
        self.parse.is_some()
    }

    fn load(
        &mut self,
        option: &str,
        values: &[String],
        case_sensitive: bool,
    ) -> Result<(), ErrorInfo> {
        self.values.clear();
        let Some(parse) = &self.parse else {
            return Err(ErrorInfo::for_option(
                ErrorCode::UnexpectedError,
                option,
                Vec::<String>::new(),
            )
            .with_cause(format!("no parser for value type {}", T::kind_name())));
        };

        let mut converted = Vec::with_capacity(values.len());
        for raw in values {
            let value = parse(raw).map_err(|reason| {
                ErrorInfo::for_option(ErrorCode::InvalidOptionValue, option, [raw.as_str(), reason.as_str()])
            })?;

            if !self.is_allowed(&value, case_sensitive) {
                let allowed = self
                    .allowed
                    .iter()
                    .flatten()
                    .map(|v| format!("{v:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ErrorInfo::for_option(
                    ErrorCode::ValueMustBeOneOf,
                    option,
                    [raw.clone(), allowed],
                ));
            }

            for predicate in &self.predicates {
                predicate(&value).map_err(|reason| {
                    ErrorInfo::for_option(ErrorCode::PredicateFailure, option, [raw.as_str(), reason.as_str()])
                })?;
            }

            converted.push(value);
        }

        for predicate in &self.list_predicates {
            predicate(&converted).map_err(|reason| {
                ErrorInfo::for_option(ErrorCode::ListPredicateFailure, option, [reason])
            })?;
        }

        self.values = converted;
        Ok(())
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn has_default(&self) -> bool {
        self.default.is_some()
    }

    fn bind(&self, target: &mut C, present: bool) -> bool {
        if present {
            self.apply(target, &self.values)
        } else {
            match &self.default {
                Some(default) => self.apply(target, default),
                None => false,
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_load_converts_in_order() {
        let mut slot: TypedSlot<(), i32> = TypedSlot::new();
        slot.load("Value", &strings(&["1", "-2"]), true).unwrap();
        assert_eq!(slot.values, vec![1, -2]);
    }

    #[test]
    fn test_first_failure_stops_conversion() {
        let mut slot: TypedSlot<(), i32> = TypedSlot::new();
        slot.allowed = Some(vec![1, 2]);
        let err = slot.load("Value", &strings(&["x", "3"]), true).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOptionValue);
        assert_eq!(err.args[1], "x");

        let err = slot.load("Value", &strings(&["1", "3"]), true).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueMustBeOneOf);
        assert_eq!(err.args, vec!["Value", "3", "1, 2"]);
        assert!(slot.values.is_empty());
    }

    #[test]
    fn test_allowed_strings_follow_case_rules() {
        let mut slot: TypedSlot<(), String> = TypedSlot::new();
        slot.allowed = Some(vec!["json".into(), "yaml".into()]);
        assert!(slot.load("Format", &strings(&["JSON"]), true).is_err());
        assert!(slot.load("Format", &strings(&["JSON"]), false).is_ok());
    }

    #[test]
    fn test_predicates() {
        let mut slot: TypedSlot<(), i32> = TypedSlot::new();
        slot.predicates.push(Box::new(|v| {
            if *v > 0 { Ok(()) } else { Err("must be positive".into()) }
        }));
        slot.list_predicates.push(Box::new(|values| {
            if values.len() < 3 { Ok(()) } else { Err("at most two".into()) }
        }));

        let err = slot.load("N", &strings(&["0"]), true).unwrap_err();
        assert_eq!(err.code, ErrorCode::PredicateFailure);
        assert_eq!(err.args[2], "must be positive");

        let err = slot.load("N", &strings(&["1", "2", "3"]), true).unwrap_err();
        assert_eq!(err.code, ErrorCode::ListPredicateFailure);
    }

    #[test]
    fn test_bind_uses_values_then_default() {
        let mut slot: TypedSlot<Vec<i32>, i32> = TypedSlot::new();
        slot.binder = Some(Binder::Single(Box::new(|target: &mut Vec<i32>, v| target.push(v))));
        slot.default = Some(vec![7]);

        let mut target = Vec::new();
        assert!(!slot.bind(&mut target, true));
        assert!(slot.bind(&mut target, false));
        slot.load("N", &strings(&["1", "2"]), true).unwrap();
        assert!(slot.bind(&mut target, true));
        assert_eq!(target, vec![7, 2]);
        assert_eq!(slot.resolved(), &[1, 2]);
    }
}
