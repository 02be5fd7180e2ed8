//! Built-in template helpers.
//!
//! The plain functions are the library; [`register_builtins`] wraps each one
//! with argument checking and binds it under its template name.

use crate::domain::registry::{Args, FuncError, FuncResult, FunctionRegistry};
use crate::domain::template_eval::display_value;
use serde::Serialize;
use serde_json::{Number, Value};

pub const GREEN: &str = "🟢";
pub const RED: &str = "🔴";
pub const YELLOW: &str = "🟡";
pub const WHITE: &str = "⚪";

pub const ARROW_UP: &str = "📈";
pub const ARROW_DOWN: &str = "📉";
pub const ARROW_FLAT: &str = "➡️";

/// Largest precision `formatFloat` accepts.
pub const MAX_PRECISION: usize = u16::MAX as usize;

/// `$1.50M`, `$5.50K`, `$99.99`.
pub fn format_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else {
        format!("${:.2}", value)
    }
}

/// `+5.25%` or `-2.50%`.
pub fn format_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

pub fn format_float(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

pub fn color_code(sentiment: &str) -> &'static str {
    match sentiment {
        "bullish" | "positive" | "up" => GREEN,
        "bearish" | "negative" | "down" => RED,
        "neutral" | "flat" => YELLOW,
        _ => WHITE,
    }
}

pub fn trend_indicator(current: f64, previous: f64) -> &'static str {
    if current > previous {
        ARROW_UP
    } else if current < previous {
        ARROW_DOWN
    } else {
        ARROW_FLAT
    }
}

pub fn is_bullish(price: f64, ema: f64) -> bool {
    price > ema
}

pub fn is_bearish(price: f64, ema: f64) -> bool {
    price < ema
}

pub fn is_overbought(rsi: f64) -> bool {
    rsi > 70.0
}

pub fn is_oversold(rsi: f64) -> bool {
    rsi < 30.0
}

pub fn join_floats(values: &[f64], sep: &str) -> String {
    values
        .iter()
        .map(|v| format!("{:.2}", v))
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn join_ints(values: &[i64], sep: &str) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn join_strings(values: &[&str], sep: &str) -> String {
    values.join(sep)
}

/// Compact JSON; a serialization failure becomes an inline `error: ...`.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("error: {}", e))
}

/// Two-space indented JSON; failures degrade like [`to_json`].
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("error: {}", e))
}

/// `1-20x`.
pub fn range_format(min: &Value, max: &Value, unit: &str) -> String {
    format!("{}-{}{}", display_value(min), display_value(max), unit)
}

/// Zero values: `nil`, `false`, `0`, `""`. Lists and objects never count.
pub fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn default_value(default: Value, value: Value) -> Value {
    if is_zero(&value) { default } else { value }
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

/// Division by zero yields 0.
pub fn divide(a: f64, b: f64) -> f64 {
    if b == 0.0 { 0.0 } else { a / b }
}

pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

pub fn abs(v: f64) -> f64 {
    v.abs()
}

pub fn min(a: f64, b: f64) -> f64 {
    if a < b { a } else { b }
}

pub fn max(a: f64, b: f64) -> f64 {
    if a > b { a } else { b }
}

fn number(value: f64) -> FuncResult {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| FuncError::Failed(format!("result {} is not a finite number", value)))
}

fn text(s: impl Into<String>) -> FuncResult {
    Ok(Value::String(s.into()))
}

fn binary_math(registry: &mut FunctionRegistry, name: &str, op: fn(f64, f64) -> f64) {
    registry.add_func(name, move |values: &[Value]| {
        let args = Args::expect(values, 2)?;
        number(op(args.f64(0)?, args.f64(1)?))
    });
}

fn binary_predicate(registry: &mut FunctionRegistry, name: &str, op: fn(f64, f64) -> bool) {
    registry.add_func(name, move |values: &[Value]| {
        let args = Args::expect(values, 2)?;
        Ok(Value::Bool(op(args.f64(0)?, args.f64(1)?)))
    });
}

fn unary_predicate(registry: &mut FunctionRegistry, name: &str, op: fn(f64) -> bool) {
    registry.add_func(name, move |values: &[Value]| {
        let args = Args::expect(values, 1)?;
        Ok(Value::Bool(op(args.f64(0)?)))
    });
}

fn join_floats_fn(values: &[Value]) -> FuncResult {
    let args = Args::expect(values, 2)?;
    text(join_floats(&args.f64_list(0)?, args.str(1)?))
}

/// Bind every built-in helper under its template name.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    // String formatting
    registry.add_func("formatCurrency", |values: &[Value]| {
        let args = Args::expect(values, 1)?;
        text(format_currency(args.f64(0)?))
    });
    registry.add_func("formatPercent", |values: &[Value]| {
        let args = Args::expect(values, 1)?;
        text(format_percent(args.f64(0)?))
    });
    registry.add_func("formatFloat", |values: &[Value]| {
        let args = Args::expect(values, 2)?;
        let precision = usize::try_from(args.i64(1)?)
            .map_err(|_| FuncError::Args("argument 2: precision must be non-negative".into()))?;
        if precision > MAX_PRECISION {
            return Err(FuncError::Args(format!(
                "argument 2: precision must be at most {}",
                MAX_PRECISION
            )));
        }
        text(format_float(args.f64(0)?, precision))
    });

    // Indicators
    registry.add_func("colorCode", |values: &[Value]| {
        let args = Args::expect(values, 1)?;
        text(color_code(args.str(0)?))
    });
    registry.add_func("trendIndicator", |values: &[Value]| {
        let args = Args::expect(values, 2)?;
        text(trend_indicator(args.f64(0)?, args.f64(1)?))
    });

    binary_predicate(registry, "isBullish", is_bullish);
    binary_predicate(registry, "isBearish", is_bearish);
    unary_predicate(registry, "isOverbought", is_overbought);
    unary_predicate(registry, "isOversold", is_oversold);

    // Lists
    registry.add_func("join", join_floats_fn);
    registry.add_func("joinFloats", join_floats_fn);
    registry.add_func("joinInts", |values: &[Value]| {
        let args = Args::expect(values, 2)?;
        text(join_ints(&args.i64_list(0)?, args.str(1)?))
    });
    registry.add_func("joinStrings", |values: &[Value]| {
        let args = Args::expect(values, 2)?;
        text(join_strings(&args.str_list(0)?, args.str(1)?))
    });

    // JSON
    registry.add_func("toJSON", |values: &[Value]| {
        let args = Args::expect(values, 1)?;
        text(to_json(args.value(0)))
    });
    registry.add_func("toJSONPretty", |values: &[Value]| {
        let args = Args::expect(values, 1)?;
        text(to_json_pretty(args.value(0)))
    });

    registry.add_func("range", |values: &[Value]| {
        let args = Args::expect(values, 3)?;
        text(range_format(args.value(0), args.value(1), args.str(2)?))
    });
    registry.add_func("default", |values: &[Value]| {
        let args = Args::expect(values, 2)?;
        Ok(default_value(args.value(0).clone(), args.value(1).clone()))
    });

    // Math
    binary_math(registry, "multiply", multiply);
    binary_math(registry, "divide", divide);
    binary_math(registry, "add", add);
    binary_math(registry, "subtract", subtract);
    binary_math(registry, "min", min);
    binary_math(registry, "max", max);
    registry.add_func("abs", |values: &[Value]| {
        let args = Args::expect(values, 1)?;
        number(abs(args.f64(0)?))
    });
}
