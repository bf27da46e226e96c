//! The builtins namespace.
//!
//! [`install`] fills a fresh namespace with the builtin functions, the
//! builtin types (callable as conversions, see [`construct`]) and the
//! builtin exception classes.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use attest_ir::BinaryOp;

use crate::environment::Namespace;
use crate::errors::{overflow_error, type_error, value_error, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::methods::sort_values;
use crate::operators::{binary_op, compare_values};
use crate::value::{
    BuiltinException, BuiltinType, CallArgs, DictValue, GeneratorValue, HashKey, Value,
};

const TYPES: [BuiltinType; 8] = [
    BuiltinType::Bool,
    BuiltinType::Int,
    BuiltinType::Float,
    BuiltinType::Str,
    BuiltinType::List,
    BuiltinType::Tuple,
    BuiltinType::Dict,
    BuiltinType::Type,
];

pub fn install(builtins: &Namespace) {
    let mut scope = builtins.borrow_mut();
    for ty in TYPES {
        scope.define(ty.name(), Value::Type(ty));
    }
    for exception in BuiltinException::ALL {
        scope.define(exception.name(), Value::ExceptionType(exception.into()));
    }

    let functions: [(&str, fn(&mut Interpreter, CallArgs) -> EvalResult); 31] = [
        ("print", builtin_print),
        ("len", builtin_len),
        ("repr", builtin_repr),
        ("range", builtin_range),
        ("isinstance", builtin_isinstance),
        ("issubclass", builtin_issubclass),
        ("globals", builtin_globals),
        ("locals", builtin_locals),
        ("abs", builtin_abs),
        ("min", builtin_min),
        ("max", builtin_max),
        ("sum", builtin_sum),
        ("sorted", builtin_sorted),
        ("reversed", builtin_reversed),
        ("enumerate", builtin_enumerate),
        ("zip", builtin_zip),
        ("any", builtin_any),
        ("all", builtin_all),
        ("getattr", builtin_getattr),
        ("setattr", builtin_setattr),
        ("hasattr", builtin_hasattr),
        ("callable", builtin_callable),
        ("map", builtin_map),
        ("filter", builtin_filter),
        ("round", builtin_round),
        ("chr", builtin_chr),
        ("ord", builtin_ord),
        ("id", builtin_id),
        ("hash", builtin_hash),
        ("iter", builtin_iter),
        ("divmod", builtin_divmod),
    ];
    for (name, func) in functions {
        scope.define(name, Value::builtin(name, func));
    }
}

/// Call a builtin type: `int('3')`, `list(x)`, `type(x)`, ...
pub fn construct(interp: &mut Interpreter, ty: BuiltinType, mut args: CallArgs) -> EvalResult {
    let name = ty.name();
    match ty {
        BuiltinType::Bool => {
            let positional = args.expect_positional(name, 0, 1)?;
            match positional.first() {
                Some(value) => Ok(Value::Bool(interp.truthy(value)?)),
                None => Ok(Value::Bool(false)),
            }
        }
        BuiltinType::Int => {
            let base = args.take_keyword("base");
            let positional = args.expect_positional(name, 0, 2)?;
            let base = positional.get(1).or(base.as_ref()).cloned();
            match (positional.first(), base) {
                (None, _) => Ok(Value::Int(0)),
                (Some(value), None) => to_int(value),
                (Some(Value::Str(text)), Some(base)) => {
                    let Some(radix) = base.as_int().and_then(|b| u32::try_from(b).ok()) else {
                        return Err(type_error("int() base must be an integer"));
                    };
                    if !(2..=36).contains(&radix) {
                        return Err(value_error("int() base must be >= 2 and <= 36"));
                    }
                    i64::from_str_radix(text.trim(), radix)
                        .map(Value::Int)
                        .map_err(|_| invalid_int_literal(text, radix))
                }
                (Some(_), Some(_)) => Err(type_error(
                    "int() can't convert non-string with explicit base",
                )),
            }
        }
        BuiltinType::Float => {
            let positional = args.expect_positional(name, 0, 1)?;
            match positional.first() {
                None => Ok(Value::Float(0.0)),
                Some(Value::Str(text)) => text
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| {
                        value_error(format!(
                            "could not convert string to float: {}",
                            Value::Str(text.clone()).repr()
                        ))
                    }),
                Some(value) => value.as_float().map(Value::Float).ok_or_else(|| {
                    type_error(format!(
                        "float() argument must be a string or a number, not '{}'",
                        value.type_name()
                    ))
                }),
            }
        }
        BuiltinType::Str => {
            let positional = args.expect_positional(name, 0, 1)?;
            Ok(positional
                .first()
                .map_or_else(|| Value::from(""), |value| Value::from(value.to_str())))
        }
        BuiltinType::List => {
            let positional = args.expect_positional(name, 0, 1)?.to_vec();
            match positional.first() {
                Some(iterable) => Ok(Value::list(interp.iterate(iterable)?)),
                None => Ok(Value::list(Vec::new())),
            }
        }
        BuiltinType::Tuple => {
            let positional = args.expect_positional(name, 0, 1)?.to_vec();
            match positional.first() {
                Some(iterable) => Ok(Value::tuple(interp.iterate(iterable)?)),
                None => Ok(Value::tuple(Vec::new())),
            }
        }
        BuiltinType::Dict => construct_dict(interp, args),
        BuiltinType::Type => {
            let positional = args.expect_positional(name, 1, 1)?;
            type_of(&positional[0])
        }
        BuiltinType::NoneType | BuiltinType::Function | BuiltinType::Module => Err(type_error(
            format!("cannot create '{name}' instances"),
        )),
    }
}

fn construct_dict(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    if args.positional.len() > 1 {
        return Err(type_error(format!(
            "dict expected at most 1 argument, got {}",
            args.positional.len()
        )));
    }
    let mut dict = match args.positional.first() {
        Some(Value::Dict(source)) => source.borrow().clone(),
        Some(iterable) => {
            let mut dict = DictValue::new();
            for item in interp.iterate(iterable)? {
                let pair = interp.iterate(&item)?;
                let [key, value]: [Value; 2] = pair.try_into().map_err(|pair: Vec<Value>| {
                    value_error(format!(
                        "dictionary update sequence element has length {}; 2 is required",
                        pair.len()
                    ))
                })?;
                dict.insert(key, value)?;
            }
            dict
        }
        None => DictValue::new(),
    };
    for (name, value) in args.keywords {
        dict.insert(Value::from(name), value)?;
    }
    Ok(Value::dict(dict))
}

/// The class of `value`, as `type(value)` reports it.
pub fn type_of(value: &Value) -> EvalResult {
    match value {
        Value::Exception(exception) => Ok(Value::ExceptionType(exception.ty.clone())),
        other => other.builtin_type().map(Value::Type).ok_or_else(|| {
            type_error(format!(
                "type() of '{}' objects is not available",
                other.type_name()
            ))
        }),
    }
}

#[cold]
fn invalid_int_literal(text: &str, base: u32) -> EvalError {
    value_error(format!(
        "invalid literal for int() with base {base}: {}",
        Value::string(text).repr()
    ))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "float to int conversion is range-checked first"
)]
fn to_int(value: &Value) -> EvalResult {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => {
            if f.is_nan() {
                return Err(value_error("cannot convert float NaN to integer"));
            }
            let truncated = f.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(overflow_error("int()"));
            }
            Ok(Value::Int(truncated as i64))
        }
        Value::Str(text) => {
            let cleaned = text.trim().replace('_', "");
            cleaned
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid_int_literal(text, 10))
        }
        other => Err(type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn builtin_print(interp: &mut Interpreter, mut args: CallArgs) -> EvalResult {
    let sep = args.take_keyword("sep").filter(|sep| !sep.is_none());
    let end = args.take_keyword("end").filter(|end| !end.is_none());
    args.no_keywords("print")?;
    let sep = sep.map_or_else(|| " ".to_string(), |sep| sep.to_str());
    let end = end.map_or_else(|| "\n".to_string(), |end| end.to_str());
    let parts: Vec<String> = args.positional.iter().map(Value::to_str).collect();
    let mut line = parts.join(&sep);
    line.push_str(&end);
    interp.write_output(&line);
    Ok(Value::None)
}

fn builtin_len(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("len", 1, 1)?;
    let len = interp.len_of(&positional[0])?;
    Ok(Value::Int(i64::try_from(len).unwrap_or(i64::MAX)))
}

fn builtin_repr(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("repr", 1, 1)?;
    Ok(Value::from(positional[0].repr()))
}

fn int_argument(value: &Value) -> Result<i64, EvalError> {
    value.as_int().ok_or_else(|| {
        type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

fn builtin_range(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("range", 1, 3)?;
    let ints = positional
        .iter()
        .map(int_argument)
        .collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => (0, 0, 1),
    };
    if step == 0 {
        return Err(value_error("range() arg 3 must not be zero"));
    }
    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        items.push(Value::Int(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::list(items))
}

fn builtin_isinstance(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("isinstance", 2, 2)?;
    Ok(Value::Bool(interp.isinstance(&positional[0], &positional[1])?))
}

fn builtin_issubclass(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("issubclass", 2, 2)?;
    Ok(Value::Bool(interp.issubclass(&positional[0], &positional[1])?))
}

fn builtin_globals(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    args.expect_positional("globals", 0, 0)?;
    match interp.current_scopes() {
        Some((globals, _)) => Ok(Value::Namespace(globals)),
        None => Ok(Value::Namespace(interp.builtins().clone())),
    }
}

fn builtin_locals(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    args.expect_positional("locals", 0, 0)?;
    match interp.current_scopes() {
        Some((_, locals)) => Ok(Value::Namespace(locals)),
        None => Ok(Value::Namespace(interp.builtins().clone())),
    }
}

fn builtin_abs(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("abs", 1, 1)?;
    match &positional[0] {
        Value::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(|| overflow_error("abs()")),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

/// Shared by `min` and `max`: one iterable or several arguments, `key=`
/// and `default=` keywords.
fn extreme(
    interp: &mut Interpreter,
    mut args: CallArgs,
    function: &str,
    want: Ordering,
) -> EvalResult {
    let key = args.take_keyword("key").filter(|key| !key.is_none());
    let default = args.take_keyword("default");
    args.no_keywords(function)?;
    let candidates = match args.positional.len() {
        0 => {
            return Err(type_error(format!(
                "{function} expected at least 1 argument, got 0"
            )))
        }
        1 => {
            let iterable = args.positional[0].clone();
            interp.iterate(&iterable)?
        }
        _ => args.positional,
    };
    let mut best: Option<(Value, Value)> = None;
    for candidate in candidates {
        let rank = match &key {
            Some(key) => interp.call(key, CallArgs::new(vec![candidate.clone()]))?,
            None => candidate.clone(),
        };
        let replace = match &best {
            None => true,
            Some((best_rank, _)) => compare_values("<", &rank, best_rank)? == want,
        };
        if replace {
            best = Some((rank, candidate));
        }
    }
    match (best, default) {
        (Some((_, value)), _) => Ok(value),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(value_error(format!("{function}() arg is an empty sequence"))),
    }
}

fn builtin_min(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    extreme(interp, args, "min", Ordering::Less)
}

fn builtin_max(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    extreme(interp, args, "max", Ordering::Greater)
}

fn builtin_sum(interp: &mut Interpreter, mut args: CallArgs) -> EvalResult {
    let start = args.take_keyword("start");
    let positional = args.expect_positional("sum", 1, 2)?;
    let mut total = positional
        .get(1)
        .cloned()
        .or(start)
        .unwrap_or(Value::Int(0));
    if total.as_str().is_some() {
        return Err(type_error("sum() can't sum strings [use ''.join(seq) instead]"));
    }
    let iterable = positional[0].clone();
    for item in interp.iterate(&iterable)? {
        total = binary_op(BinaryOp::Add, &total, &item)?;
    }
    Ok(total)
}

fn builtin_sorted(interp: &mut Interpreter, mut args: CallArgs) -> EvalResult {
    let key = args.take_keyword("key");
    let reverse = match args.take_keyword("reverse") {
        Some(flag) => flag.truthy()?,
        None => false,
    };
    let iterable = args.expect_positional("sorted", 1, 1)?[0].clone();
    let items = interp.iterate(&iterable)?;
    Ok(Value::list(sort_values(interp, items, key.as_ref(), reverse)?))
}

fn builtin_reversed(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let iterable = args.expect_positional("reversed", 1, 1)?[0].clone();
    let mut items = interp.iterate(&iterable)?;
    items.reverse();
    Ok(Value::list(items))
}

fn builtin_enumerate(interp: &mut Interpreter, mut args: CallArgs) -> EvalResult {
    let start = args.take_keyword("start");
    let positional = args.expect_positional("enumerate", 1, 2)?.to_vec();
    let start = match positional.get(1).or(start.as_ref()) {
        Some(value) => int_argument(value)?,
        None => 0,
    };
    let items = interp.iterate(&positional[0])?;
    let mut pairs = Vec::with_capacity(items.len());
    let mut index = start;
    for item in items {
        pairs.push(Value::tuple(vec![Value::Int(index), item]));
        index = index.checked_add(1).ok_or_else(|| overflow_error("enumerate()"))?;
    }
    Ok(Value::list(pairs))
}

fn builtin_zip(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    args.no_keywords("zip")?;
    let mut columns = Vec::with_capacity(args.positional.len());
    for iterable in &args.positional {
        columns.push(interp.iterate(iterable)?);
    }
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    let zipped = (0..rows)
        .map(|row| Value::tuple(columns.iter().map(|column| column[row].clone()).collect()))
        .collect();
    Ok(Value::list(zipped))
}

fn builtin_any(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let iterable = args.expect_positional("any", 1, 1)?[0].clone();
    for item in interp.iterate(&iterable)? {
        if interp.truthy(&item)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn builtin_all(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let iterable = args.expect_positional("all", 1, 1)?[0].clone();
    for item in interp.iterate(&iterable)? {
        if !interp.truthy(&item)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn attribute_name<'a>(function: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    value.as_str().ok_or_else(|| {
        type_error(format!(
            "{function}(): attribute name must be string, not '{}'",
            value.type_name()
        ))
    })
}

fn builtin_getattr(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("getattr", 2, 3)?.to_vec();
    let name = attribute_name("getattr", &positional[1])?;
    match interp.get_attr(&positional[0], name) {
        Err(err) if err.is(BuiltinException::AttributeError) && positional.len() == 3 => {
            Ok(positional[2].clone())
        }
        result => result,
    }
}

fn builtin_setattr(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("setattr", 3, 3)?.to_vec();
    let name = attribute_name("setattr", &positional[1])?;
    interp.set_attr(&positional[0], name, positional[2].clone())?;
    Ok(Value::None)
}

fn builtin_hasattr(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("hasattr", 2, 2)?.to_vec();
    let name = attribute_name("hasattr", &positional[1])?;
    Ok(Value::Bool(interp.has_attr(&positional[0], name)?))
}

fn builtin_callable(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("callable", 1, 1)?;
    Ok(Value::Bool(match &positional[0] {
        Value::Function(_) | Value::Builtin(_) | Value::Type(_) | Value::ExceptionType(_) => true,
        Value::Native(native) => native.is_callable(),
        _ => false,
    }))
}

fn builtin_map(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    args.no_keywords("map")?;
    let Some((func, iterables)) = args.positional.split_first() else {
        return Err(type_error("map() must have at least two arguments."));
    };
    if iterables.is_empty() {
        return Err(type_error("map() must have at least two arguments."));
    }
    let mut columns = Vec::with_capacity(iterables.len());
    for iterable in iterables {
        columns.push(interp.iterate(iterable)?);
    }
    let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
    let mut results = Vec::with_capacity(rows);
    for row in 0..rows {
        let call_args = columns.iter().map(|column| column[row].clone()).collect();
        results.push(interp.call(func, CallArgs::new(call_args))?);
    }
    Ok(Value::list(results))
}

fn builtin_filter(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("filter", 2, 2)?.to_vec();
    let mut kept = Vec::new();
    for item in interp.iterate(&positional[1])? {
        let keep = if positional[0].is_none() {
            interp.truthy(&item)?
        } else {
            let verdict = interp.call(&positional[0], CallArgs::new(vec![item.clone()]))?;
            interp.truthy(&verdict)?
        };
        if keep {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "rounded floats are range-checked before conversion"
)]
fn builtin_round(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("round", 1, 2)?;
    let digits = match positional.get(1) {
        None | Some(Value::None) => None,
        Some(value) => Some(int_argument(value)?),
    };
    match (&positional[0], digits) {
        (Value::Int(i), _) => Ok(Value::Int(*i)),
        (Value::Bool(b), _) => Ok(Value::Int(i64::from(*b))),
        (Value::Float(f), None) => {
            let rounded = f.round_ties_even();
            if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                return Err(overflow_error("round()"));
            }
            Ok(Value::Int(rounded as i64))
        }
        (Value::Float(f), Some(digits)) => {
            let exponent = i32::try_from(digits.clamp(-308, 308)).unwrap_or(0);
            let scale = 10f64.powi(exponent);
            Ok(Value::Float((f * scale).round_ties_even() / scale))
        }
        (other, _) => Err(type_error(format!(
            "type {} doesn't define __round__ method",
            other.type_name()
        ))),
    }
}

fn builtin_chr(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("chr", 1, 1)?;
    let code = int_argument(&positional[0])?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::from(c.to_string()))
        .ok_or_else(|| value_error("chr() arg not in range(0x110000)"))
}

fn builtin_ord(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("ord", 1, 1)?;
    let Some(text) = positional[0].as_str() else {
        return Err(type_error(format!(
            "ord() expected string of length 1, but {} found",
            positional[0].type_name()
        )));
    };
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
        _ => Err(type_error(format!(
            "ord() expected a character, but string of length {} found",
            text.chars().count()
        ))),
    }
}

fn builtin_id(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("id", 1, 1)?;
    Ok(Value::Int(identity(&positional[0])))
}

/// A stable identity for reference values; scalars use their hash.
fn identity(value: &Value) -> i64 {
    let address = match value {
        Value::List(items) => Rc::as_ptr(items).cast::<()>() as usize,
        Value::Tuple(items) => items.as_ptr().cast::<()>() as usize,
        Value::Dict(dict) => Rc::as_ptr(dict).cast::<()>() as usize,
        Value::Function(f) => Rc::as_ptr(f).cast::<()>() as usize,
        Value::Builtin(b) => Rc::as_ptr(b).cast::<()>() as usize,
        Value::Exception(e) => Rc::as_ptr(e).cast::<()>() as usize,
        Value::Module(m) => Rc::as_ptr(m).cast::<()>() as usize,
        Value::Generator(g) => Rc::as_ptr(g).cast::<()>() as usize,
        Value::Native(n) => Rc::as_ptr(n).cast::<()>() as usize,
        Value::Str(s) => s.as_ptr() as usize,
        other => return hash_value(other).unwrap_or(0),
    };
    i64::try_from(address).unwrap_or(i64::MAX)
}

fn hash_value(value: &Value) -> Result<i64, EvalError> {
    let key = HashKey::from_value(value)?;
    if let HashKey::Int(i) = key {
        return Ok(i);
    }
    let mut hasher = rustc_hash::FxHasher::default();
    key.hash(&mut hasher);
    Ok(i64::from_ne_bytes(hasher.finish().to_ne_bytes()))
}

fn builtin_hash(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("hash", 1, 1)?;
    Ok(Value::Int(hash_value(&positional[0])?))
}

/// Iteration is eager, so `iter(x)` is a one-shot generator over `x`.
fn builtin_iter(interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let iterable = args.expect_positional("iter", 1, 1)?[0].clone();
    let items = interp.iterate(&iterable)?;
    Ok(Value::Generator(Rc::new(GeneratorValue::new(items))))
}

fn builtin_divmod(_interp: &mut Interpreter, args: CallArgs) -> EvalResult {
    let positional = args.expect_positional("divmod", 2, 2)?;
    let quotient = binary_op(BinaryOp::FloorDiv, &positional[0], &positional[1])?;
    let remainder = binary_op(BinaryOp::Mod, &positional[0], &positional[1])?;
    Ok(Value::tuple(vec![quotient, remainder]))
}
