//! Function registry: the name → callable table templates call into.
//!
//! Callables take positional [`Value`] arguments. [`Args`] does the argument
//! checking so individual helpers stay one-liners.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FuncError {
    /// Wrong arity or argument kind.
    #[error("{0}")]
    Args(String),
    /// The function ran and failed.
    #[error("{0}")]
    Failed(String),
}

pub type FuncResult = Result<Value, FuncError>;

pub type TemplateFn = Arc<dyn Fn(&[Value]) -> FuncResult + Send + Sync>;

#[derive(Clone, Default)]
pub struct FunctionRegistry {
    funcs: HashMap<String, TemplateFn>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in helper library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::domain::funcs::register_builtins(&mut registry);
        registry
    }

    /// Insert or replace the binding for `name`.
    pub fn add_func<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> FuncResult + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(f));
    }

    pub fn insert(&mut self, name: String, f: TemplateFn) {
        if self.funcs.insert(name.clone(), f).is_some() {
            debug!(%name, "FunctionRegistry: replaced existing binding");
        }
    }

    pub fn add_funcs<I>(&mut self, funcs: I)
    where
        I: IntoIterator<Item = (String, TemplateFn)>,
    {
        for (name, f) in funcs {
            self.insert(name, f);
        }
    }

    pub fn get(&self, name: &str) -> Option<&TemplateFn> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("funcs", &self.names())
            .finish()
    }
}

/// Positional argument accessor with kind checks.
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// Require exactly `n` arguments.
    pub fn expect(values: &'a [Value], n: usize) -> Result<Self, FuncError> {
        if values.len() != n {
            return Err(FuncError::Args(format!(
                "expected {} argument{}, got {}",
                n,
                if n == 1 { "" } else { "s" },
                values.len()
            )));
        }
        Ok(Self::new(values))
    }

    pub fn value(&self, i: usize) -> &'a Value {
        &self.values[i]
    }

    pub fn f64(&self, i: usize) -> Result<f64, FuncError> {
        self.values[i].as_f64().ok_or_else(|| mismatch(i, "number", &self.values[i]))
    }

    pub fn i64(&self, i: usize) -> Result<i64, FuncError> {
        as_integer(&self.values[i]).ok_or_else(|| mismatch(i, "integer", &self.values[i]))
    }

    pub fn str(&self, i: usize) -> Result<&'a str, FuncError> {
        self.values[i].as_str().ok_or_else(|| mismatch(i, "string", &self.values[i]))
    }

    pub fn f64_list(&self, i: usize) -> Result<Vec<f64>, FuncError> {
        self.list(i, "list of numbers", Value::as_f64)
    }

    pub fn i64_list(&self, i: usize) -> Result<Vec<i64>, FuncError> {
        self.list(i, "list of integers", as_integer)
    }

    pub fn str_list(&self, i: usize) -> Result<Vec<&'a str>, FuncError> {
        self.list(i, "list of strings", Value::as_str)
    }

    fn list<T>(
        &self,
        i: usize,
        expected: &str,
        convert: impl Fn(&'a Value) -> Option<T>,
    ) -> Result<Vec<T>, FuncError> {
        let value = &self.values[i];
        let items = match value {
            Value::Array(items) => items,
            // A missing list renders like an empty one.
            Value::Null => return Ok(Vec::new()),
            other => return Err(mismatch(i, expected, other)),
        };
        items
            .iter()
            .map(|item| convert(item).ok_or_else(|| mismatch(i, expected, value)))
            .collect()
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn mismatch(i: usize, expected: &str, got: &Value) -> FuncError {
    FuncError::Args(format!(
        "argument {}: expected {}, got {}",
        i + 1,
        expected,
        kind_name(got)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn add_func_replaces_binding() {
        let mut registry = FunctionRegistry::new();
        registry.add_func("greet", |_| Ok(json!("hello")));
        registry.add_func("greet", |_| Ok(json!("bonjour")));
        assert_eq!(registry.len(), 1);
        let f = registry.get("greet").unwrap();
        assert_eq!(f(&[]).unwrap(), json!("bonjour"));
    }

    #[test]
    fn add_funcs_inserts_all() {
        let mut registry = FunctionRegistry::new();
        let one: TemplateFn = Arc::new(|_: &[Value]| -> FuncResult { Ok(json!(1)) });
        let two: TemplateFn = Arc::new(|_: &[Value]| -> FuncResult { Ok(json!(2)) });
        registry.add_funcs(vec![("one".to_string(), one), ("two".to_string(), two)]);
        assert_eq!(registry.names(), vec!["one", "two"]);
        assert!(registry.contains("two"));
        assert!(!registry.contains("three"));
    }

    #[test]
    fn builtins_are_registered() {
        let registry = FunctionRegistry::with_builtins();
        for name in [
            "formatCurrency",
            "formatPercent",
            "formatFloat",
            "colorCode",
            "trendIndicator",
            "isBullish",
            "isBearish",
            "isOverbought",
            "isOversold",
            "join",
            "joinFloats",
            "joinInts",
            "joinStrings",
            "toJSON",
            "toJSONPretty",
            "range",
            "default",
            "multiply",
            "divide",
            "add",
            "subtract",
            "abs",
            "min",
            "max",
        ] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
    }

    #[test]
    fn args_arity_check() {
        let values = [json!(1)];
        let err = Args::expect(&values, 2).err().unwrap();
        assert_eq!(err, FuncError::Args("expected 2 arguments, got 1".into()));
        assert!(Args::expect(&values, 1).is_ok());
    }

    #[test]
    fn args_kind_checks() {
        let values = [json!("x"), json!(2.0), json!(2.5), json!([1, 2]), json!(["a", 1])];
        let args = Args::new(&values);
        assert_eq!(
            args.f64(0).unwrap_err(),
            FuncError::Args("argument 1: expected number, got string".into())
        );
        assert_eq!(args.i64(1).unwrap(), 2);
        assert!(args.i64(2).is_err());
        assert_eq!(args.i64_list(3).unwrap(), vec![1, 2]);
        assert!(args.str_list(4).is_err());
        assert_eq!(args.str(0).unwrap(), "x");
    }

    #[test]
    fn null_list_is_empty() {
        let values = [Value::Null];
        assert!(Args::new(&values).f64_list(0).unwrap().is_empty());
    }

    #[test]
    fn debug_lists_names() {
        let mut registry = FunctionRegistry::new();
        registry.add_func("b", |_| Ok(Value::Null));
        registry.add_func("a", |_| Ok(Value::Null));
        assert_eq!(format!("{:?}", registry), r#"FunctionRegistry { funcs: ["a", "b"] }"#);
    }
}
