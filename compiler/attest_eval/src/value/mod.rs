//! Runtime values.
//!
//! Scalars are stored inline. Containers use `Rc` (with `RefCell` when
//! mutable), so cloning a `Value` is cheap and aliases the same object,
//! which is what identity (`is`) and in-place mutation observe.

mod dict;
mod exception;
mod function;
mod native;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use attest_fmt::{format_float, quote_str};

use crate::environment::Namespace;
use crate::errors::EvalError;

pub use dict::{DictValue, HashKey};
pub use exception::{BuiltinException, CustomException, ExceptionType, ExceptionValue};
pub use function::{BuiltinFn, BuiltinFunction, CallArgs, FunctionValue, ModuleValue};
pub use native::NativeObject;

/// Builtin classes that can be called to convert or construct values.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinType {
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Dict,
    Function,
    Module,
    Type,
}

impl BuiltinType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoneType => "NoneType",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Function => "function",
            Self::Module => "module",
            Self::Type => "type",
        }
    }
}

/// A generator expression's results. Evaluated eagerly, consumed once.
#[derive(Debug, Default)]
pub struct GeneratorValue {
    items: RefCell<Option<Vec<Value>>>,
}

impl GeneratorValue {
    pub fn new(items: Vec<Value>) -> Self {
        GeneratorValue {
            items: RefCell::new(Some(items)),
        }
    }

    /// Take the remaining items; later calls yield nothing.
    pub fn drain(&self) -> Vec<Value> {
        self.items.borrow_mut().take().unwrap_or_default()
    }
}

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    Dict(Rc<RefCell<DictValue>>),
    Function(Rc<FunctionValue>),
    Builtin(Rc<BuiltinFunction>),
    Type(BuiltinType),
    ExceptionType(ExceptionType),
    Exception(Rc<ExceptionValue>),
    Module(Rc<ModuleValue>),
    /// A live variable scope, as returned by `globals()` and `locals()`.
    Namespace(Namespace),
    Generator(Rc<GeneratorValue>),
    Native(Rc<dyn NativeObject>),
}

impl Value {
    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Value::Str(text.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(items.into())
    }

    pub fn dict(dict: DictValue) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn builtin(
        name: impl Into<String>,
        func: impl Fn(&mut crate::Interpreter, CallArgs) -> crate::EvalResult + 'static,
    ) -> Self {
        Value::Builtin(Rc::new(BuiltinFunction::new(name, func)))
    }

    pub fn native(object: impl NativeObject) -> Self {
        Value::Native(Rc::new(object))
    }

    pub fn exception(ty: impl Into<ExceptionType>, args: Vec<Value>) -> Self {
        Value::Exception(Rc::new(ExceptionValue::new(ty.into(), args)))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin_function_or_method",
            Value::Type(_) | Value::ExceptionType(_) => "type",
            Value::Exception(e) => e.ty.name(),
            Value::Module(_) => "module",
            Value::Namespace(_) => "namespace",
            Value::Generator(_) => "generator",
            Value::Native(n) => n.type_name(),
        }
    }

    /// The class of this value, when it is a builtin one.
    pub fn builtin_type(&self) -> Option<BuiltinType> {
        Some(match self {
            Value::None => BuiltinType::NoneType,
            Value::Bool(_) => BuiltinType::Bool,
            Value::Int(_) => BuiltinType::Int,
            Value::Float(_) => BuiltinType::Float,
            Value::Str(_) => BuiltinType::Str,
            Value::List(_) => BuiltinType::List,
            Value::Tuple(_) => BuiltinType::Tuple,
            Value::Dict(_) => BuiltinType::Dict,
            Value::Function(_) | Value::Builtin(_) => BuiltinType::Function,
            Value::Module(_) => BuiltinType::Module,
            Value::Type(_) | Value::ExceptionType(_) => BuiltinType::Type,
            _ => return None,
        })
    }

    /// The name a reader would use for this value (`len`, `int`,
    /// `ValueError`, a module name), if it has one.
    pub fn display_name(&self) -> Option<String> {
        match self {
            Value::Function(f) => Some(f.name().to_string()),
            Value::Builtin(b) => Some(b.name.clone()),
            Value::Type(t) => Some(t.name().to_string()),
            Value::ExceptionType(t) => Some(t.name().to_string()),
            Value::Module(m) => Some(m.name.to_string()),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "int to float conversion follows float semantics"
    )]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Truth value in a boolean context.
    pub fn truthy(&self) -> Result<bool, EvalError> {
        Ok(match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            Value::Namespace(ns) => !ns.borrow().is_empty(),
            Value::Native(n) => n.truthy()?,
            _ => true,
        })
    }

    /// `repr(value)`.
    pub fn repr(&self) -> String {
        attest_stack::ensure_sufficient_stack(|| match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => quote_str(s),
            Value::List(items) => format!("[{}]", join_reprs(&items.borrow())),
            Value::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Value::Tuple(items) => format!("({})", join_reprs(items)),
            Value::Dict(dict) => {
                let entries: Vec<String> = dict
                    .borrow()
                    .items()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Function(f) => format!("<function {}>", f.name()),
            Value::Builtin(b) => format!("<built-in function {}>", b.name),
            Value::Type(t) => format!("<class '{}'>", t.name()),
            Value::ExceptionType(t) => format!("<class '{}'>", t.name()),
            Value::Exception(e) => e.repr(),
            Value::Module(m) => m.repr(),
            Value::Namespace(ns) => {
                let entries: Vec<String> = ns
                    .borrow()
                    .entries()
                    .into_iter()
                    .map(|(k, v)| format!("{}: {}", quote_str(&k), v.repr()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Value::Generator(_) => "<generator object <genexpr>>".to_string(),
            Value::Native(n) => n.repr(),
        })
    }

    /// `str(value)`.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            Value::Exception(e) => e.message(),
            other => other.repr(),
        }
    }

    /// `a is b`. Small scalars and strings compare by value.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b) || (a.is_empty() && b.is_empty()),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::ExceptionType(a), Value::ExceptionType(b)) => a == b,
            (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::Namespace(a), Value::Namespace(b)) => a.ptr_eq(b),
            (Value::Generator(a), Value::Generator(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }

    /// `a == b` for values that define structural equality; everything
    /// else falls back to identity.
    pub fn equals(&self, other: &Value) -> bool {
        attest_stack::ensure_sufficient_stack(|| match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || seq_equal(&a.borrow(), &b.borrow())
            }
            (Value::Tuple(a), Value::Tuple(b)) => seq_equal(a, b),
            (Value::Dict(a), Value::Dict(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.items().iter().all(|(k, v)| {
                        matches!(b.get(k), Ok(Some(other)) if v.equals(&other))
                    })
            }
            (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.equals(b),
                _ => self.is_identical(other),
            },
        })
    }

    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }
}

/// Numeric view used by arithmetic and comparison.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[expect(
        clippy::cast_precision_loss,
        reason = "mixed int/float arithmetic promotes to float"
    )]
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    #[expect(clippy::float_cmp, reason = "numeric equality is exact")]
    fn equals(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.to_f64() == b.to_f64(),
        }
    }
}

fn seq_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
}

fn join_reprs(items: &[Value]) -> String {
    items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}
