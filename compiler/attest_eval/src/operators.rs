//! Arithmetic, comparison and membership on builtin values.
//!
//! Native objects get first refusal in the interpreter before these run.
//! Integer arithmetic is checked; overflow raises `OverflowError`.

use std::cmp::Ordering;

use attest_ir::{BinaryOp, CmpOp, UnaryOp};

use crate::errors::{
    overflow_error, repeat_too_long, type_error, unorderable, unsupported_operands, value_error,
    zero_division, EvalError, EvalResult,
};
use crate::value::{Number, Value};

pub fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        return numeric_op(op, a, b);
    }
    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{a}{b}"))),
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Mul, seq, Value::Int(n)) | (BinaryOp::Mul, Value::Int(n), seq)
            if is_sequence(seq) =>
        {
            repeat(seq, *n)
        }
        (BinaryOp::Mod, Value::Str(format), args) => percent_format(format, args),
        _ => Err(unsupported_operands(
            op.as_symbol(),
            left.type_name(),
            right.type_name(),
        )),
    }
}

fn is_sequence(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::List(_) | Value::Tuple(_))
}

/// Largest sequence a repetition may build, in elements (bytes for strings).
const MAX_REPEAT_LEN: usize = 1 << 28;

fn repeat(seq: &Value, count: i64) -> EvalResult {
    let count = usize::try_from(count).unwrap_or(0);
    let checked_len = |len: usize| match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(total),
        _ => Err(repeat_too_long()),
    };
    Ok(match seq {
        Value::Str(s) => {
            checked_len(s.len())?;
            Value::string(s.repeat(count))
        }
        Value::List(items) => {
            let items = items.borrow();
            let total = checked_len(items.len())?;
            Value::list(items.iter().cloned().cycle().take(total).collect())
        }
        Value::Tuple(items) => {
            let total = checked_len(items.len())?;
            Value::tuple(items.iter().cloned().cycle().take(total).collect())
        }
        other => return Err(type_error(format!("can't multiply '{}'", other.type_name()))),
    })
}

fn numeric_op(op: BinaryOp, a: Number, b: Number) -> EvalResult {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => int_op(op, x, y),
        _ => float_op(op, a.to_f64(), b.to_f64()),
    }
}

fn int_op(op: BinaryOp, x: i64, y: i64) -> EvalResult {
    let checked = |result: Option<i64>, name: &str| {
        result.map(Value::Int).ok_or_else(|| overflow_error(name))
    };
    match op {
        BinaryOp::Add => checked(x.checked_add(y), "addition"),
        BinaryOp::Sub => checked(x.checked_sub(y), "subtraction"),
        BinaryOp::Mul => checked(x.checked_mul(y), "multiplication"),
        BinaryOp::Div => {
            if y == 0 {
                return Err(zero_division("division by zero"));
            }
            float_op(op, Number::Int(x).to_f64(), Number::Int(y).to_f64())
        }
        BinaryOp::FloorDiv => {
            if y == 0 {
                return Err(zero_division("integer division or modulo by zero"));
            }
            checked(x.checked_div_euclid(y).map(|_| floor_div(x, y)), "division")
        }
        BinaryOp::Mod => {
            if y == 0 {
                return Err(zero_division("integer division or modulo by zero"));
            }
            checked(x.checked_rem(y).map(|r| floor_mod(r, y)), "modulo")
        }
        BinaryOp::Pow => match u32::try_from(y) {
            Ok(exp) => checked(x.checked_pow(exp), "exponentiation"),
            Err(_) if y < 0 => float_op(op, Number::Int(x).to_f64(), Number::Int(y).to_f64()),
            Err(_) => Err(overflow_error("exponentiation")),
        },
    }
}

/// Quotient rounded toward negative infinity.
fn floor_div(x: i64, y: i64) -> i64 {
    let q = x / y;
    if (x % y != 0) && ((x < 0) != (y < 0)) {
        q - 1
    } else {
        q
    }
}

/// Remainder with the sign of the divisor.
fn floor_mod(r: i64, y: i64) -> i64 {
    if r != 0 && ((r < 0) != (y < 0)) {
        r + y
    } else {
        r
    }
}

fn float_op(op: BinaryOp, x: f64, y: f64) -> EvalResult {
    let result = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => {
            if y == 0.0 {
                return Err(zero_division("float division by zero"));
            }
            x / y
        }
        BinaryOp::FloorDiv => {
            if y == 0.0 {
                return Err(zero_division("float floor division by zero"));
            }
            (x / y).floor()
        }
        BinaryOp::Mod => {
            if y == 0.0 {
                return Err(zero_division("float modulo"));
            }
            let r = x % y;
            if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
                r + y
            } else {
                r
            }
        }
        BinaryOp::Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(zero_division("0.0 cannot be raised to a negative power"));
            }
            x.powf(y)
        }
    };
    Ok(Value::Float(result))
}

pub fn unary_op(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.truthy()?)),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnaryOp::Neg, value) => match value.as_int() {
            Some(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| overflow_error("negation")),
            None => Err(bad_unary("-", value)),
        },
        (UnaryOp::Pos, value) => match value.as_int() {
            Some(i) => Ok(Value::Int(i)),
            None => Err(bad_unary("+", value)),
        },
    }
}

#[cold]
fn bad_unary(symbol: &str, value: &Value) -> EvalError {
    type_error(format!(
        "bad operand type for unary {symbol}: '{}'",
        value.type_name()
    ))
}

/// Ordering between two values, for `<`, `sorted()`, `min()` and `max()`.
pub fn compare_values(op: &str, left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        return match (a, b) {
            (Number::Int(x), Number::Int(y)) => Ok(x.cmp(&y)),
            _ => a
                .to_f64()
                .partial_cmp(&b.to_f64())
                .ok_or_else(|| unorderable(op, left.type_name(), right.type_name())),
        };
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::List(a), Value::List(b)) => compare_seq(op, &a.borrow(), &b.borrow()),
        (Value::Tuple(a), Value::Tuple(b)) => compare_seq(op, a, b),
        _ => Err(unorderable(op, left.type_name(), right.type_name())),
    }
}

fn compare_seq(op: &str, a: &[Value], b: &[Value]) -> Result<Ordering, EvalError> {
    for (x, y) in a.iter().zip(b) {
        if !x.equals(y) {
            return compare_values(op, x, y);
        }
    }
    Ok(a.len().cmp(&b.len()))
}

/// Evaluate one comparison between builtin values.
pub fn compare_op(op: CmpOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    Ok(match op {
        CmpOp::Eq => left.equals(right),
        CmpOp::NotEq => !left.equals(right),
        CmpOp::Is => left.is_identical(right),
        CmpOp::IsNot => !left.is_identical(right),
        CmpOp::In => contains(right, left)?,
        CmpOp::NotIn => !contains(right, left)?,
        CmpOp::Lt => compare_values("<", left, right)? == Ordering::Less,
        CmpOp::LtEq => compare_values("<=", left, right)? != Ordering::Greater,
        CmpOp::Gt => compare_values(">", left, right)? == Ordering::Greater,
        CmpOp::GtEq => compare_values(">=", left, right)? != Ordering::Less,
    })
}

/// `item in container` for builtin containers.
pub fn contains(container: &Value, item: &Value) -> Result<bool, EvalError> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            other => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::List(items) => Ok(items.borrow().iter().any(|v| v.equals(item))),
        Value::Tuple(items) => Ok(items.iter().any(|v| v.equals(item))),
        Value::Dict(dict) => dict.borrow().contains_key(item),
        Value::Namespace(ns) => Ok(item.as_str().is_some_and(|name| ns.borrow().contains(name))),
        other => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// The operator with its operands swapped (`a < b` is `b > a`).
pub fn reflect(op: CmpOp) -> CmpOp {
    match op {
        CmpOp::Lt => CmpOp::Gt,
        CmpOp::LtEq => CmpOp::GtEq,
        CmpOp::Gt => CmpOp::Lt,
        CmpOp::GtEq => CmpOp::LtEq,
        other => other,
    }
}

/// `format % args` with `%s`, `%r`, `%d`, `%i`, `%f` and `%%`.
fn percent_format(format: &str, args: &Value) -> EvalResult {
    let args: Vec<Value> = match args {
        Value::Tuple(items) => items.to_vec(),
        other => vec![other.clone()],
    };
    let mut args = args.into_iter();
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let spec = chars
            .next()
            .ok_or_else(|| value_error("incomplete format"))?;
        if spec == '%' {
            out.push('%');
            continue;
        }
        let arg = args
            .next()
            .ok_or_else(|| type_error("not enough arguments for format string"))?;
        match spec {
            's' => out.push_str(&arg.to_str()),
            'r' => out.push_str(&arg.repr()),
            'd' | 'i' => match arg.as_number() {
                Some(Number::Int(i)) => out.push_str(&i.to_string()),
                Some(Number::Float(f)) => out.push_str(&format!("{}", f.trunc())),
                None => {
                    return Err(type_error(format!(
                        "%{spec} format: a number is required, not {}",
                        arg.type_name()
                    )))
                }
            },
            'f' => match arg.as_float() {
                Some(f) => out.push_str(&format!("{f:.6}")),
                None => {
                    return Err(type_error(format!(
                        "must be real number, not {}",
                        arg.type_name()
                    )))
                }
            },
            other => {
                return Err(value_error(format!(
                    "unsupported format character '{other}'"
                )))
            }
        }
    }
    if args.next().is_some() {
        return Err(type_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(Value::string(out))
}

#[cfg(test)]
mod tests;
