//! Attribute and item access.

use std::rc::Rc;

use super::Interpreter;
use crate::errors::{
    attribute_error, index_error, key_error, type_error, value_error, EvalError, EvalResult,
};
use crate::methods;
use crate::value::Value;

impl Interpreter {
    /// `object.name`.
    pub fn get_attr(&mut self, object: &Value, name: &str) -> EvalResult {
        let found = match object {
            Value::Module(module) => match name {
                "__name__" => Some(Value::string(&*module.name)),
                _ => module.get(name),
            },
            Value::Function(function) => match name {
                "__name__" => Some(Value::from(function.name())),
                "__qualname__" => Some(Value::from(function.qualified_name())),
                "__module__" => Some(Value::string(&*function.module)),
                "__doc__" => Some(
                    function
                        .def
                        .docstring()
                        .map_or(Value::None, Value::from),
                ),
                _ => None,
            },
            Value::Builtin(builtin) => match name {
                "__name__" => Some(Value::from(builtin.name.as_str())),
                _ => None,
            },
            Value::Type(ty) => match name {
                "__name__" => Some(Value::from(ty.name())),
                _ => None,
            },
            Value::ExceptionType(ty) => match name {
                "__name__" => Some(Value::from(ty.name())),
                _ => None,
            },
            Value::Exception(exception) => match name {
                "args" => Some(Value::tuple(exception.args.clone())),
                "__class__" => Some(Value::ExceptionType(exception.ty.clone())),
                _ => exception.get_attr(name),
            },
            Value::Native(native) => match Rc::clone(native).get_attr(self, name) {
                Some(result) => Some(result?),
                None => None,
            },
            _ => None,
        };
        if let Some(value) = found {
            return Ok(value);
        }
        if let Some(method) = methods::bound_method(object, name) {
            return Ok(method);
        }
        Err(match object {
            Value::Module(module) => EvalError::new(
                crate::value::BuiltinException::AttributeError,
                format!("module '{}' has no attribute '{name}'", module.name),
            ),
            other => attribute_error(other.type_name(), name),
        })
    }

    /// Whether `object.name` resolves.
    pub fn has_attr(&mut self, object: &Value, name: &str) -> Result<bool, EvalError> {
        match self.get_attr(object, name) {
            Ok(_) => Ok(true),
            Err(err) if err.is(crate::value::BuiltinException::AttributeError) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// `object.name = value`.
    pub fn set_attr(&mut self, object: &Value, name: &str, value: Value) -> Result<(), EvalError> {
        match object {
            Value::Module(module) => {
                module.set(name, value);
                Ok(())
            }
            Value::Exception(exception) => {
                exception.set_attr(name, value);
                Ok(())
            }
            other => Err(attribute_error(other.type_name(), name)),
        }
    }

    /// `object[index]`.
    pub fn get_item(&mut self, object: &Value, index: &Value) -> EvalResult {
        match object {
            Value::List(items) => {
                let items = items.borrow();
                let i = sequence_index(index, items.len(), "list")?;
                Ok(items[i].clone())
            }
            Value::Tuple(items) => {
                let i = sequence_index(index, items.len(), "tuple")?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = sequence_index(index, chars.len(), "string")?;
                Ok(Value::string(chars[i].to_string()))
            }
            Value::Dict(dict) => dict.borrow().get(index)?.ok_or_else(|| key_error(index)),
            Value::Namespace(ns) => index
                .as_str()
                .and_then(|name| ns.borrow().get(name))
                .ok_or_else(|| key_error(index)),
            Value::Native(native) => match Rc::clone(native).subscript(self, index) {
                Some(result) => result,
                None => Err(not_subscriptable(object)),
            },
            other => Err(not_subscriptable(other)),
        }
    }

    /// `object[lower:upper:step]`.
    pub fn get_slice(
        &mut self,
        object: &Value,
        lower: Option<&Value>,
        upper: Option<&Value>,
        step: Option<&Value>,
    ) -> EvalResult {
        let positions = |len: usize| slice_positions(lower, upper, step, len);
        match object {
            Value::List(items) => {
                let items = items.borrow();
                let picked = positions(items.len())?;
                Ok(Value::list(picked.into_iter().map(|i| items[i].clone()).collect()))
            }
            Value::Tuple(items) => {
                let picked = positions(items.len())?;
                Ok(Value::tuple(picked.into_iter().map(|i| items[i].clone()).collect()))
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let picked = positions(chars.len())?;
                Ok(Value::string(picked.into_iter().map(|i| chars[i]).collect::<String>()))
            }
            other => Err(not_subscriptable(other)),
        }
    }

    /// `object[index] = value`.
    pub fn set_item(&mut self, object: &Value, index: &Value, value: Value) -> Result<(), EvalError> {
        match object {
            Value::List(items) => {
                let mut items = items.borrow_mut();
                let len = items.len();
                let i = sequence_index(index, len, "list assignment")?;
                items[i] = value;
                Ok(())
            }
            Value::Dict(dict) => dict.borrow_mut().insert(index.clone(), value),
            Value::Namespace(ns) => {
                let Some(name) = index.as_str() else {
                    return Err(type_error("namespace keys must be strings"));
                };
                ns.borrow_mut().define(name, value);
                Ok(())
            }
            other => Err(type_error(format!(
                "'{}' object does not support item assignment",
                other.type_name()
            ))),
        }
    }
}

#[cold]
fn not_subscriptable(value: &Value) -> EvalError {
    type_error(format!(
        "'{}' object is not subscriptable",
        value.type_name()
    ))
}

/// Resolve a possibly negative index against `len`.
fn sequence_index(index: &Value, len: usize, what: &str) -> Result<usize, EvalError> {
    let Some(i) = index.as_int() else {
        return Err(type_error(format!(
            "{what} indices must be integers, not {}",
            index.type_name()
        )));
    };
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if i < 0 { i + len_i } else { i };
    if resolved < 0 || resolved >= len_i {
        return Err(index_error(what));
    }
    usize::try_from(resolved).map_err(|_| index_error(what))
}

/// Positions picked by `[lower:upper:step]` from a sequence of `len` items,
/// in output order. Bounds are clamped the way slices always are.
fn slice_positions(
    lower: Option<&Value>,
    upper: Option<&Value>,
    step: Option<&Value>,
    len: usize,
) -> Result<Vec<usize>, EvalError> {
    let step = match slice_int(step)? {
        None => 1,
        Some(0) => return Err(value_error("slice step cannot be zero")),
        Some(step) => step,
    };
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    // A negative step walks down from `len - 1` and may stop before index 0.
    let (min, max) = if step > 0 { (0, len_i) } else { (-1, len_i - 1) };
    let resolve = |bound: Option<&Value>, default: i64| -> Result<i64, EvalError> {
        Ok(match slice_int(bound)? {
            None => default,
            Some(i) if i < 0 => i.saturating_add(len_i).clamp(min, max),
            Some(i) => i.clamp(min, max),
        })
    };
    let (start, stop) = if step > 0 {
        (resolve(lower, 0)?, resolve(upper, len_i)?)
    } else {
        (resolve(lower, len_i - 1)?, resolve(upper, -1)?)
    };

    let mut positions = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if let Ok(index) = usize::try_from(i) {
            positions.push(index);
        }
        i = i.saturating_add(step);
    }
    Ok(positions)
}

fn slice_int(bound: Option<&Value>) -> Result<Option<i64>, EvalError> {
    match bound.filter(|b| !b.is_none()) {
        None => Ok(None),
        Some(bound) => bound
            .as_int()
            .map(Some)
            .ok_or_else(|| type_error("slice indices must be integers or None")),
    }
}
