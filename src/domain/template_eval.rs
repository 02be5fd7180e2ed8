//! Template execution.
//!
//! Walks a compiled program against a JSON data context, resolving paths,
//! calling registered functions and choosing conditional branches.
//!
//! # Evaluation Semantics
//!
//! - `.A.B`: object lookup per segment; a missing key or an explicit `null`
//!   yields `null`, stepping into a scalar or array is an error
//! - Truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are false
//! - `if` chains evaluate conditions in order and stop at the first true one
//! - Execution never mutates the template, the registry or the context

use crate::domain::error::{RenderCause, RenderError};
use crate::domain::registry::{FuncError, FunctionRegistry};
use crate::domain::template::{CompiledTemplate, Expr, Literal, Node};
use serde_json::{Number, Value};
use std::borrow::Cow;
use tracing::trace;

static NULL: Value = Value::Null;

pub fn render(
    template: &CompiledTemplate,
    funcs: &FunctionRegistry,
    context: &Value,
) -> Result<String, RenderError> {
    trace!(path = %template.path, "render: executing template");
    let executor = Executor {
        funcs,
        root: context,
    };
    let mut out = String::new();
    executor
        .exec_nodes(template.program(), &mut out)
        .map_err(|cause| RenderError {
            path: template.path.clone(),
            cause,
        })?;
    Ok(out)
}

struct Executor<'a> {
    funcs: &'a FunctionRegistry,
    root: &'a Value,
}

impl<'a> Executor<'a> {
    fn exec_nodes(&self, nodes: &[Node], out: &mut String) -> Result<(), RenderCause> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Interpolate(expr) => {
                    let value = self.eval(expr)?;
                    write_value(out, &value);
                }
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let mut taken = false;
                    for branch in branches {
                        let cond = self.eval(&branch.condition)?;
                        if is_truthy(&cond) {
                            self.exec_nodes(&branch.body, out)?;
                            taken = true;
                            break;
                        }
                    }
                    if !taken {
                        self.exec_nodes(otherwise, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eval(&self, expr: &Expr) -> Result<Cow<'a, Value>, RenderCause> {
        match expr {
            Expr::Path(segments) => self.resolve_path(segments).map(Cow::Borrowed),
            Expr::Literal(lit) => Ok(Cow::Owned(literal_value(lit))),
            Expr::Call { name, args } => {
                let f = self
                    .funcs
                    .get(name)
                    .ok_or_else(|| RenderCause::UnknownFunction(name.clone()))?;
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg).map(Cow::into_owned))
                    .collect::<Result<Vec<_>, _>>()?;
                f(&values).map(Cow::Owned).map_err(|e| match e {
                    FuncError::Args(reason) => RenderCause::ArgumentMismatch {
                        function: name.clone(),
                        reason,
                    },
                    FuncError::Failed(reason) => RenderCause::FunctionFailed {
                        function: name.clone(),
                        reason,
                    },
                })
            }
        }
    }

    fn resolve_path(&self, segments: &[String]) -> Result<&'a Value, RenderCause> {
        let mut current = self.root;
        for (i, segment) in segments.iter().enumerate() {
            current = match current {
                Value::Object(map) => match map.get(segment) {
                    Some(value) => value,
                    None => return Ok(&NULL),
                },
                Value::Null => return Ok(current),
                _ => return Err(RenderCause::UnknownVariable(dotted(&segments[..=i]))),
            };
        }
        Ok(current)
    }
}

fn dotted(segments: &[String]) -> String {
    format!(".{}", segments.join("."))
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Str(s) => Value::String(s.clone()),
        Literal::Int(i) => Value::Number((*i).into()),
        Literal::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Nil => Value::Null,
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
    } else if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
    } else if let Some(f) = n.as_f64() {
        out.push_str(&f.to_string());
    }
}

/// Append the printed form of `value`.
pub fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(_) => out.push_str(&value.to_string()),
    }
}

pub fn display_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::TemplateSource;
    use crate::domain::template_parser::compile;
    use serde_json::json;

    fn run(text: &str, ctx: &Value) -> Result<String, RenderError> {
        let tmpl = compile(&TemplateSource::new("t.jet", text.as_bytes().to_vec())).unwrap();
        render(&tmpl, &FunctionRegistry::with_builtins(), ctx)
    }

    #[test]
    fn interpolates_paths() {
        let ctx = json!({"Name": "Alice", "Account": {"Value": 10500.5}});
        assert_eq!(
            run("{{.Name}} has {{.Account.Value}}", &ctx).unwrap(),
            "Alice has 10500.5"
        );
    }

    #[test]
    fn dot_prints_whole_context() {
        assert_eq!(run("{{.}}", &json!("plain")).unwrap(), "plain");
    }

    #[test]
    fn value_printing() {
        let ctx = json!({
            "i": 5, "f": 20.0, "g": 0.1, "t": true, "n": null,
            "list": ["BTC", "ETH", 3], "obj": {"a": 1}
        });
        assert_eq!(
            run("{{.i}}|{{.f}}|{{.g}}|{{.t}}|{{.n}}|{{.list}}|{{.obj}}", &ctx).unwrap(),
            "5|20|0.1|true||[BTC ETH 3]|{\"a\":1}"
        );
    }

    #[test]
    fn function_calls_and_pipes() {
        let ctx = json!({"Balance": 12500.5, "Price": 100.0, "EMA": 95.0});
        assert_eq!(
            run("{{formatCurrency(.Balance)}} {{.Balance | formatCurrency}}", &ctx).unwrap(),
            "$12.50K $12.50K"
        );
        assert_eq!(
            run("{{isBullish(.Price, .EMA)}}", &ctx).unwrap(),
            "true"
        );
        assert_eq!(
            run("{{formatFloat(multiply(.Price, 1.5), 1)}}", &ctx).unwrap(),
            "150.0"
        );
    }

    #[test]
    fn conditionals() {
        let tmpl = "{{if isBullish(.Price, .EMA)}}bull{{else if isBearish(.Price, .EMA)}}bear{{else}}flat{{end}}";
        assert_eq!(run(tmpl, &json!({"Price": 100, "EMA": 95})).unwrap(), "bull");
        assert_eq!(run(tmpl, &json!({"Price": 90, "EMA": 95})).unwrap(), "bear");
        assert_eq!(run(tmpl, &json!({"Price": 95, "EMA": 95})).unwrap(), "flat");
    }

    #[test]
    fn if_without_else_emits_nothing_when_false() {
        assert_eq!(run("a{{if .X}}b{{end}}c", &json!({"X": ""})).unwrap(), "ac");
    }

    #[test]
    fn truthiness_rules() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(-1), json!("0"), json!([0]), json!({"a": null})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn null_traversal_yields_null() {
        let ctx = json!({"Position": null});
        assert_eq!(run("[{{.Position.ExitPlan.StopLoss}}]", &ctx).unwrap(), "[]");
    }

    #[test]
    fn missing_key_yields_null() {
        let ctx = json!({"Account": {}});
        assert_eq!(run("[{{.Account.Cash}}]", &ctx).unwrap(), "[]");
        assert_eq!(run("[{{.Account.Cash.Amount}}]", &ctx).unwrap(), "[]");
        assert_eq!(run("{{if .Name}}hi{{else}}anon{{end}}", &ctx).unwrap(), "anon");
    }

    #[test]
    fn default_sees_missing_key() {
        assert_eq!(run(r#"{{default("world", .Missing)}}"#, &json!({})).unwrap(), "world");
        assert_eq!(run(r#"{{default("n/a", .Account.Cash)}}"#, &json!({"Account": {}})).unwrap(), "n/a");
    }

    #[test]
    fn path_through_scalar_is_error() {
        let err = run("{{.Name.First}}", &json!({"Name": "Alice"})).unwrap_err();
        assert_eq!(err.path, "t.jet");
        assert_eq!(err.cause, RenderCause::UnknownVariable(".Name.First".into()));
    }

    #[test]
    fn unknown_function_is_error() {
        let err = run("{{nope(1)}}", &json!({})).unwrap_err();
        assert_eq!(err.cause, RenderCause::UnknownFunction("nope".into()));
    }

    #[test]
    fn argument_mismatch_is_error() {
        let err = run("{{formatCurrency(.Name)}}", &json!({"Name": "x"})).unwrap_err();
        assert!(matches!(
            err.cause,
            RenderCause::ArgumentMismatch { ref function, .. } if function == "formatCurrency"
        ));
    }

    #[test]
    fn function_failure_is_error() {
        let mut funcs = FunctionRegistry::with_builtins();
        funcs.add_func("explode", |_| Err(FuncError::Failed("kaboom".into())));
        let tmpl = compile(&TemplateSource::new("e.jet", b"{{explode()}}".to_vec())).unwrap();
        let err = render(&tmpl, &funcs, &json!({})).unwrap_err();
        assert_eq!(
            err.cause,
            RenderCause::FunctionFailed {
                function: "explode".into(),
                reason: "kaboom".into()
            }
        );
    }

    #[test]
    fn unused_branch_errors_are_not_raised() {
        let out = run("{{if .Ok}}fine{{else}}{{.Ok.Deep}}{{end}}", &json!({"Ok": 1})).unwrap();
        assert_eq!(out, "fine");
    }

    #[test]
    fn render_is_deterministic() {
        let ctx = json!({"Coins": ["BTC", "ETH"], "Obj": {"b": 2, "a": 1}});
        let text = "{{joinStrings(.Coins, \",\")}} {{toJSON(.Obj)}}";
        assert_eq!(run(text, &ctx).unwrap(), run(text, &ctx).unwrap());
    }

    #[test]
    fn default_helper_in_template() {
        let ctx = json!({"Note": ""});
        assert_eq!(run(r#"{{default("none", .Note)}}"#, &ctx).unwrap(), "none");
    }
}
