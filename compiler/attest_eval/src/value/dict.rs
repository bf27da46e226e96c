//! Insertion-ordered dictionary.

use rustc_hash::FxHashMap;

use super::Value;
use crate::errors::{type_error, EvalError};

/// Hashable projection of a value. Numbers that compare equal hash equal
/// (`1`, `1.0` and `True` are the same key).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum HashKey {
    None,
    Int(i64),
    Float(u64),
    Str(String),
    Tuple(Vec<HashKey>),
    /// Identity-hashed values (functions, types, modules).
    Ptr(usize),
    Type(String),
}

impl HashKey {
    pub fn from_value(value: &Value) -> Result<HashKey, EvalError> {
        Ok(match value {
            Value::None => HashKey::None,
            Value::Bool(b) => HashKey::Int(i64::from(*b)),
            Value::Int(i) => HashKey::Int(*i),
            Value::Float(f) => float_key(*f),
            Value::Str(s) => HashKey::Str(s.to_string()),
            Value::Tuple(items) => HashKey::Tuple(
                items
                    .iter()
                    .map(HashKey::from_value)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Type(ty) => HashKey::Type(ty.name().to_string()),
            Value::ExceptionType(ty) => HashKey::Type(ty.name().to_string()),
            Value::Function(f) => HashKey::Ptr(std::rc::Rc::as_ptr(f) as usize),
            Value::Builtin(b) => HashKey::Ptr(std::rc::Rc::as_ptr(b) as usize),
            Value::Module(m) => HashKey::Ptr(std::rc::Rc::as_ptr(m) as usize),
            Value::Native(n) => HashKey::Ptr(std::rc::Rc::as_ptr(n).cast::<()>() as usize),
            other => {
                return Err(type_error(format!(
                    "unhashable type: '{}'",
                    other.type_name()
                )))
            }
        })
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "integral floats within i64 range convert exactly"
)]
fn float_key(value: f64) -> HashKey {
    if value.fract() == 0.0 && value.abs() < 9.0e18 {
        HashKey::Int(value as i64)
    } else {
        HashKey::Float(value.to_bits())
    }
}

#[derive(Clone, Debug, Default)]
pub struct DictValue {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<HashKey, usize>,
}

impl DictValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(Value, Value)>) -> Result<Self, EvalError> {
        let mut dict = DictValue::new();
        for (key, value) in pairs {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        let hash = HashKey::from_value(key)?;
        Ok(self.index.get(&hash).map(|&i| self.entries[i].1.clone()))
    }

    pub fn contains_key(&self, key: &Value) -> Result<bool, EvalError> {
        Ok(self.index.contains_key(&HashKey::from_value(key)?))
    }

    /// Insert or replace; an existing key keeps its position.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), EvalError> {
        let hash = HashKey::from_value(&key)?;
        if let Some(&i) = self.index.get(&hash) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(hash, self.entries.len());
            self.entries.push((key, value));
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &Value) -> Result<Option<Value>, EvalError> {
        let hash = HashKey::from_value(key)?;
        let Some(i) = self.index.remove(&hash) else {
            return Ok(None);
        };
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(Some(value))
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn items(&self) -> &[(Value, Value)] {
        &self.entries
    }
}
