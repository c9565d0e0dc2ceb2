use std::collections::HashMap;

use crate::value::Value;

/// A filter takes the piped value and its optional `:argument`.
pub type FilterFn = fn(&Value, Option<&Value>) -> Result<Value, String>;

/// Filters available to variable expressions, keyed by name.
#[derive(Clone, Debug)]
pub struct FilterLibrary {
    filters: HashMap<String, FilterFn>,
}

impl Default for FilterLibrary {
    fn default() -> Self {
        Self::builtins()
    }
}

impl FilterLibrary {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    #[must_use]
    pub fn builtins() -> Self {
        let mut library = Self::empty();
        library.register("default", default);
        library.register("length", length);
        library.register("upper", upper);
        library.register("lower", lower);
        library.register("first", first);
        library.register("last", last);
        library
    }

    pub fn register(&mut self, name: impl Into<String>, filter: FilterFn) {
        self.filters.insert(name.into(), filter);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<FilterFn> {
        self.filters.get(name).copied()
    }
}

fn default(value: &Value, arg: Option<&Value>) -> Result<Value, String> {
    if value.is_truthy() {
        Ok(value.clone())
    } else {
        arg.cloned()
            .ok_or_else(|| "requires an argument".to_string())
    }
}

fn length(value: &Value, _arg: Option<&Value>) -> Result<Value, String> {
    Ok(value.len().map_or(Value::Int(0), Value::from))
}

fn upper(value: &Value, _arg: Option<&Value>) -> Result<Value, String> {
    Ok(Value::String(value.to_string().to_uppercase()))
}

fn lower(value: &Value, _arg: Option<&Value>) -> Result<Value, String> {
    Ok(Value::String(value.to_string().to_lowercase()))
}

fn first(value: &Value, _arg: Option<&Value>) -> Result<Value, String> {
    Ok(value.clone().into_sequence().into_iter().next().unwrap_or_default())
}

fn last(value: &Value, _arg: Option<&Value>) -> Result<Value, String> {
    Ok(value.clone().into_sequence().pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let library = FilterLibrary::builtins();
        for name in ["default", "length", "upper", "lower", "first", "last"] {
            assert!(library.get(name).is_some(), "missing filter {name}");
        }
        assert!(library.get("nope").is_none());
    }

    #[test]
    fn test_default_requires_argument() {
        assert!(default(&Value::None, None).is_err());
        assert_eq!(
            default(&Value::None, Some(&Value::from("x"))),
            Ok(Value::from("x"))
        );
        assert_eq!(
            default(&Value::from("y"), Some(&Value::from("x"))),
            Ok(Value::from("y"))
        );
    }

    #[test]
    fn test_length() {
        assert_eq!(length(&Value::from("abc"), None), Ok(Value::Int(3)));
        assert_eq!(length(&Value::None, None), Ok(Value::Int(0)));
    }

    #[test]
    fn test_first_last() {
        let list = Value::from(vec![1_i64, 2, 3]);
        assert_eq!(first(&list, None), Ok(Value::Int(1)));
        assert_eq!(last(&list, None), Ok(Value::Int(3)));
        assert_eq!(first(&Value::None, None), Ok(Value::None));
    }
}
