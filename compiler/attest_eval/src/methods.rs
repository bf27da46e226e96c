//! Methods on builtin values.
//!
//! Attribute access on a `str`, `list`, `tuple` or `dict` consults the
//! method table for the receiver's type. A hit yields a builtin function
//! bound to the receiver; calling it dispatches by pattern matching on the
//! receiver, as the type set is fixed.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::errors::{
    attribute_error, index_error, key_error, type_error, value_error, EvalError, EvalResult,
};
use crate::interpreter::Interpreter;
use crate::operators::compare_values;
use crate::value::{BuiltinException, CallArgs, DictValue, Value};

const STR_METHODS: &[&str] = &[
    "count",
    "endswith",
    "find",
    "format",
    "isalpha",
    "isdigit",
    "isspace",
    "join",
    "lower",
    "lstrip",
    "replace",
    "rstrip",
    "split",
    "splitlines",
    "startswith",
    "strip",
    "upper",
];

const LIST_METHODS: &[&str] = &[
    "append", "clear", "copy", "count", "extend", "index", "insert", "pop", "remove", "reverse",
    "sort",
];

const TUPLE_METHODS: &[&str] = &["count", "index"];

const DICT_METHODS: &[&str] = &[
    "clear",
    "copy",
    "get",
    "items",
    "keys",
    "pop",
    "setdefault",
    "update",
    "values",
];

/// Names of every method `receiver` supports.
pub fn method_names(receiver: &Value) -> &'static [&'static str] {
    match receiver {
        Value::Str(_) => STR_METHODS,
        Value::List(_) => LIST_METHODS,
        Value::Tuple(_) => TUPLE_METHODS,
        Value::Dict(_) => DICT_METHODS,
        _ => &[],
    }
}

/// `receiver.name` as a callable, if `name` is a method of the receiver.
pub fn bound_method(receiver: &Value, name: &str) -> Option<Value> {
    let method: &'static str = method_names(receiver)
        .iter()
        .copied()
        .find(|candidate| *candidate == name)?;
    let receiver = receiver.clone();
    Some(Value::builtin(method, move |interp, args| {
        dispatch_method(interp, &receiver, method, args)
    }))
}

pub fn dispatch_method(
    interp: &mut Interpreter,
    receiver: &Value,
    method: &str,
    args: CallArgs,
) -> EvalResult {
    match receiver {
        Value::Str(text) => dispatch_str_method(interp, text, method, args),
        Value::List(items) => dispatch_list_method(interp, items, method, args),
        Value::Tuple(items) => dispatch_tuple_method(items, method, &args),
        Value::Dict(dict) => dispatch_dict_method(dict, method, args),
        _ => Err(attribute_error(receiver.type_name(), method)),
    }
}

fn str_arg<'a>(method: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    value.as_str().ok_or_else(|| {
        type_error(format!(
            "{method}() argument must be str, not {}",
            value.type_name()
        ))
    })
}

fn strip_chars(args: &[Value], method: &str) -> Result<Option<Vec<char>>, EvalError> {
    match args.first() {
        None | Some(Value::None) => Ok(None),
        Some(chars) => Ok(Some(str_arg(method, chars)?.chars().collect())),
    }
}

fn dispatch_str_method(
    interp: &mut Interpreter,
    text: &Rc<str>,
    method: &str,
    args: CallArgs,
) -> EvalResult {
    match method {
        "upper" => {
            args.expect_positional(method, 0, 0)?;
            Ok(Value::from(text.to_uppercase()))
        }
        "lower" => {
            args.expect_positional(method, 0, 0)?;
            Ok(Value::from(text.to_lowercase()))
        }
        "strip" | "lstrip" | "rstrip" => {
            let positional = args.expect_positional(method, 0, 1)?;
            let chars = strip_chars(positional, method)?;
            let matches = |c: char| match &chars {
                Some(set) => set.contains(&c),
                None => c.is_whitespace(),
            };
            let stripped = match method {
                "strip" => text.trim_matches(matches),
                "lstrip" => text.trim_start_matches(matches),
                _ => text.trim_end_matches(matches),
            };
            Ok(Value::from(stripped))
        }
        "split" => {
            let positional = args.expect_positional(method, 0, 1)?;
            let parts: Vec<Value> = match positional.first() {
                None | Some(Value::None) => text.split_whitespace().map(Value::from).collect(),
                Some(sep) => {
                    let sep = str_arg(method, sep)?;
                    if sep.is_empty() {
                        return Err(value_error("empty separator"));
                    }
                    text.split(sep).map(Value::from).collect()
                }
            };
            Ok(Value::list(parts))
        }
        "splitlines" => {
            args.expect_positional(method, 0, 0)?;
            Ok(Value::list(text.lines().map(Value::from).collect()))
        }
        "join" => {
            let positional = args.expect_positional(method, 1, 1)?;
            let items = interp.iterate(&positional[0])?;
            let mut parts = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let Some(part) = item.as_str() else {
                    return Err(type_error(format!(
                        "sequence item {i}: expected str instance, {} found",
                        item.type_name()
                    )));
                };
                parts.push(part.to_string());
            }
            Ok(Value::from(parts.join(text)))
        }
        "startswith" | "endswith" => {
            let positional = args.expect_positional(method, 1, 1)?;
            let candidates: Vec<Value> = match &positional[0] {
                Value::Tuple(items) => items.to_vec(),
                other => vec![other.clone()],
            };
            for candidate in &candidates {
                let affix = str_arg(method, candidate)?;
                let hit = if method == "startswith" {
                    text.starts_with(affix)
                } else {
                    text.ends_with(affix)
                };
                if hit {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        "replace" => {
            let positional = args.expect_positional(method, 2, 2)?;
            let old = str_arg(method, &positional[0])?;
            let new = str_arg(method, &positional[1])?;
            Ok(Value::from(text.replace(old, new)))
        }
        "find" => {
            let positional = args.expect_positional(method, 1, 1)?;
            let needle = str_arg(method, &positional[0])?;
            let index = text
                .find(needle)
                .map_or(-1, |byte| char_count(&text[..byte]));
            Ok(Value::Int(index))
        }
        "count" => {
            let positional = args.expect_positional(method, 1, 1)?;
            let needle = str_arg(method, &positional[0])?;
            let count = if needle.is_empty() {
                char_count(text) + 1
            } else {
                char_count_of(text.matches(needle).count())
            };
            Ok(Value::Int(count))
        }
        "isdigit" | "isalpha" | "isspace" => {
            args.expect_positional(method, 0, 0)?;
            let predicate: fn(char) -> bool = match method {
                "isdigit" => |c: char| c.is_ascii_digit(),
                "isalpha" => char::is_alphabetic,
                _ => char::is_whitespace,
            };
            Ok(Value::Bool(!text.is_empty() && text.chars().all(predicate)))
        }
        "format" => format_str(text, args),
        _ => Err(attribute_error("str", method)),
    }
}

fn char_count(text: &str) -> i64 {
    char_count_of(text.chars().count())
}

fn char_count_of(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// `'{} and {0} and {name}'.format(...)` with `{{`/`}}` escapes.
fn format_str(template: &str, mut args: CallArgs) -> EvalResult {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_auto = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => field.push(ch),
                        None => return Err(value_error("unmatched '{' in format string")),
                    }
                }
                let value = if field.is_empty() {
                    let value = args.positional.get(next_auto).cloned();
                    next_auto += 1;
                    value
                } else if let Ok(index) = field.parse::<usize>() {
                    args.positional.get(index).cloned()
                } else {
                    let found = args
                        .keywords
                        .iter()
                        .find(|(name, _)| *name == field)
                        .map(|(_, value)| value.clone());
                    match found {
                        Some(value) => Some(value),
                        None => return Err(key_error(&Value::from(field))),
                    }
                };
                let Some(value) = value else {
                    return Err(index_error("format argument"));
                };
                out.push_str(&value.to_str());
            }
            '}' => return Err(value_error("single '}' encountered in format string")),
            other => out.push(other),
        }
    }
    args.keywords.clear();
    Ok(Value::from(out))
}

fn dispatch_list_method(
    interp: &mut Interpreter,
    items: &Rc<RefCell<Vec<Value>>>,
    method: &str,
    mut args: CallArgs,
) -> EvalResult {
    match method {
        "append" => {
            let positional = args.expect_positional(method, 1, 1)?;
            items.borrow_mut().push(positional[0].clone());
            Ok(Value::None)
        }
        "extend" => {
            let positional = args.expect_positional(method, 1, 1)?;
            let extra = interp.iterate(&positional[0])?;
            items.borrow_mut().extend(extra);
            Ok(Value::None)
        }
        "insert" => {
            let positional = args.expect_positional(method, 2, 2)?;
            let index = int_arg(method, &positional[0])?;
            let mut items = items.borrow_mut();
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let index = if index < 0 { (index + len).max(0) } else { index.min(len) };
            let index = usize::try_from(index).unwrap_or(0);
            items.insert(index, positional[1].clone());
            Ok(Value::None)
        }
        "pop" => {
            let positional = args.expect_positional(method, 0, 1)?;
            let mut items = items.borrow_mut();
            if items.is_empty() {
                return Err(EvalError::new(BuiltinException::IndexError, "pop from empty list"));
            }
            let index = match positional.first() {
                Some(index) => int_arg(method, index)?,
                None => -1,
            };
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let resolved = if index < 0 { index + len } else { index };
            match usize::try_from(resolved) {
                Ok(i) if i < items.len() => Ok(items.remove(i)),
                _ => Err(index_error("pop")),
            }
        }
        "remove" => {
            let positional = args.expect_positional(method, 1, 1)?;
            let mut items = items.borrow_mut();
            let Some(index) = items.iter().position(|item| item.equals(&positional[0])) else {
                return Err(value_error("list.remove(x): x not in list"));
            };
            items.remove(index);
            Ok(Value::None)
        }
        "index" => {
            let positional = args.expect_positional(method, 1, 1)?;
            index_of(&items.borrow(), &positional[0], "list")
        }
        "count" => {
            let positional = args.expect_positional(method, 1, 1)?;
            Ok(count_of(&items.borrow(), &positional[0]))
        }
        "reverse" => {
            args.expect_positional(method, 0, 0)?;
            items.borrow_mut().reverse();
            Ok(Value::None)
        }
        "copy" => {
            args.expect_positional(method, 0, 0)?;
            Ok(Value::list(items.borrow().clone()))
        }
        "clear" => {
            args.expect_positional(method, 0, 0)?;
            items.borrow_mut().clear();
            Ok(Value::None)
        }
        "sort" => {
            let key = args.take_keyword("key");
            let reverse = match args.take_keyword("reverse") {
                Some(flag) => flag.truthy()?,
                None => false,
            };
            args.expect_positional(method, 0, 0)?;
            let snapshot = items.borrow().clone();
            let sorted = sort_values(interp, snapshot, key.as_ref(), reverse)?;
            *items.borrow_mut() = sorted;
            Ok(Value::None)
        }
        _ => Err(attribute_error("list", method)),
    }
}

fn dispatch_tuple_method(items: &Rc<[Value]>, method: &str, args: &CallArgs) -> EvalResult {
    let positional = args.expect_positional(method, 1, 1)?;
    match method {
        "index" => index_of(items, &positional[0], "tuple"),
        "count" => Ok(count_of(items, &positional[0])),
        _ => Err(attribute_error("tuple", method)),
    }
}

fn dispatch_dict_method(dict: &Rc<RefCell<DictValue>>, method: &str, args: CallArgs) -> EvalResult {
    match method {
        "get" => {
            let positional = args.expect_positional(method, 1, 2)?;
            let found = dict.borrow().get(&positional[0])?;
            Ok(found.unwrap_or_else(|| positional.get(1).cloned().unwrap_or(Value::None)))
        }
        "keys" => {
            args.expect_positional(method, 0, 0)?;
            Ok(Value::list(dict.borrow().keys()))
        }
        "values" => {
            args.expect_positional(method, 0, 0)?;
            Ok(Value::list(dict.borrow().values()))
        }
        "items" => {
            args.expect_positional(method, 0, 0)?;
            let pairs = dict
                .borrow()
                .items()
                .iter()
                .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
                .collect();
            Ok(Value::list(pairs))
        }
        "pop" => {
            let positional = args.expect_positional(method, 1, 2)?;
            let removed = dict.borrow_mut().remove(&positional[0])?;
            match (removed, positional.get(1)) {
                (Some(value), _) => Ok(value),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => Err(key_error(&positional[0])),
            }
        }
        "setdefault" => {
            let positional = args.expect_positional(method, 1, 2)?;
            let existing = dict.borrow().get(&positional[0])?;
            if let Some(value) = existing {
                return Ok(value);
            }
            let default = positional.get(1).cloned().unwrap_or(Value::None);
            dict.borrow_mut()
                .insert(positional[0].clone(), default.clone())?;
            Ok(default)
        }
        "update" => {
            if args.positional.len() > 1 {
                return Err(type_error(format!(
                    "update expected at most 1 argument, got {}",
                    args.positional.len()
                )));
            }
            let mut pairs: Vec<(Value, Value)> = match args.positional.first() {
                Some(Value::Dict(other)) => other.borrow().items().to_vec(),
                Some(other) => {
                    return Err(type_error(format!(
                        "'{}' object is not a mapping",
                        other.type_name()
                    )))
                }
                None => Vec::new(),
            };
            pairs.extend(
                args.keywords
                    .into_iter()
                    .map(|(name, value)| (Value::from(name), value)),
            );
            let mut target = dict.borrow_mut();
            for (key, value) in pairs {
                target.insert(key, value)?;
            }
            Ok(Value::None)
        }
        "copy" => {
            args.expect_positional(method, 0, 0)?;
            Ok(Value::dict(dict.borrow().clone()))
        }
        "clear" => {
            args.expect_positional(method, 0, 0)?;
            *dict.borrow_mut() = DictValue::new();
            Ok(Value::None)
        }
        _ => Err(attribute_error("dict", method)),
    }
}

fn int_arg(method: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        other => Err(type_error(format!(
            "{method}() argument must be int, not {}",
            other.type_name()
        ))),
    }
}

fn index_of(items: &[Value], needle: &Value, kind: &str) -> EvalResult {
    items
        .iter()
        .position(|item| item.equals(needle))
        .map(|i| Value::Int(i64::try_from(i).unwrap_or(i64::MAX)))
        .ok_or_else(|| value_error(format!("{kind}.index(x): x not in {kind}")))
}

fn count_of(items: &[Value], needle: &Value) -> Value {
    let count = items.iter().filter(|item| item.equals(needle)).count();
    Value::Int(i64::try_from(count).unwrap_or(i64::MAX))
}

/// Stable sort by `key(item)` (or the items themselves). The first failed
/// comparison is reported once the sort finishes.
pub(crate) fn sort_values(
    interp: &mut Interpreter,
    items: Vec<Value>,
    key: Option<&Value>,
    reverse: bool,
) -> Result<Vec<Value>, EvalError> {
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let sort_key = match key {
            Some(func) if !func.is_none() => interp.call(func, CallArgs::new(vec![item.clone()]))?,
            _ => item.clone(),
        };
        keyed.push((sort_key, item));
    }
    let mut failure = None;
    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = if reverse {
            compare_values("<", b, a)
        } else {
            compare_values("<", a, b)
        };
        ordering.unwrap_or_else(|err| {
            if failure.is_none() {
                failure = Some(err);
            }
            Ordering::Equal
        })
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(keyed.into_iter().map(|(_, item)| item).collect()),
    }
}

#[cfg(test)]
mod tests;
