//! Exception types and instances.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::Value;

/// Exception classes known to the interpreter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinException {
    BaseException,
    Exception,
    ArithmeticError,
    AssertionError,
    AttributeError,
    ImportError,
    IndexError,
    KeyError,
    LookupError,
    NameError,
    NotImplementedError,
    OverflowError,
    RecursionError,
    RuntimeError,
    StopIteration,
    SyntaxError,
    TypeError,
    ValueError,
    ZeroDivisionError,
}

impl BuiltinException {
    pub const ALL: [BuiltinException; 19] = [
        Self::BaseException,
        Self::Exception,
        Self::ArithmeticError,
        Self::AssertionError,
        Self::AttributeError,
        Self::ImportError,
        Self::IndexError,
        Self::KeyError,
        Self::LookupError,
        Self::NameError,
        Self::NotImplementedError,
        Self::OverflowError,
        Self::RecursionError,
        Self::RuntimeError,
        Self::StopIteration,
        Self::SyntaxError,
        Self::TypeError,
        Self::ValueError,
        Self::ZeroDivisionError,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::BaseException => "BaseException",
            Self::Exception => "Exception",
            Self::ArithmeticError => "ArithmeticError",
            Self::AssertionError => "AssertionError",
            Self::AttributeError => "AttributeError",
            Self::ImportError => "ImportError",
            Self::IndexError => "IndexError",
            Self::KeyError => "KeyError",
            Self::LookupError => "LookupError",
            Self::NameError => "NameError",
            Self::NotImplementedError => "NotImplementedError",
            Self::OverflowError => "OverflowError",
            Self::RecursionError => "RecursionError",
            Self::RuntimeError => "RuntimeError",
            Self::StopIteration => "StopIteration",
            Self::SyntaxError => "SyntaxError",
            Self::TypeError => "TypeError",
            Self::ValueError => "ValueError",
            Self::ZeroDivisionError => "ZeroDivisionError",
        }
    }

    /// Direct base class; `None` only for `BaseException`.
    pub const fn base(self) -> Option<BuiltinException> {
        match self {
            Self::BaseException => None,
            Self::Exception => Some(Self::BaseException),
            Self::ArithmeticError
            | Self::AssertionError
            | Self::AttributeError
            | Self::ImportError
            | Self::LookupError
            | Self::NameError
            | Self::RuntimeError
            | Self::StopIteration
            | Self::SyntaxError
            | Self::TypeError
            | Self::ValueError => Some(Self::Exception),
            Self::OverflowError | Self::ZeroDivisionError => Some(Self::ArithmeticError),
            Self::IndexError | Self::KeyError => Some(Self::LookupError),
            Self::NotImplementedError | Self::RecursionError => Some(Self::RuntimeError),
        }
    }
}

/// An exception class defined outside the interpreter core.
#[derive(Debug)]
pub struct CustomException {
    pub name: String,
    pub base: ExceptionType,
}

/// An exception class value.
#[derive(Clone, Debug)]
pub enum ExceptionType {
    Builtin(BuiltinException),
    Custom(Rc<CustomException>),
}

impl ExceptionType {
    /// Define a new exception class deriving from `base`.
    pub fn custom(name: impl Into<String>, base: ExceptionType) -> Self {
        ExceptionType::Custom(Rc::new(CustomException {
            name: name.into(),
            base,
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(builtin) => builtin.name(),
            Self::Custom(custom) => &custom.name,
        }
    }

    pub fn base(&self) -> Option<ExceptionType> {
        match self {
            Self::Builtin(builtin) => builtin.base().map(ExceptionType::Builtin),
            Self::Custom(custom) => Some(custom.base.clone()),
        }
    }

    /// Whether `self` is `other` or derives from it.
    pub fn is_subclass_of(&self, other: &ExceptionType) -> bool {
        let mut current = Some(self.clone());
        while let Some(ty) = current {
            if ty == *other {
                return true;
            }
            current = ty.base();
        }
        false
    }
}

impl PartialEq for ExceptionType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<BuiltinException> for ExceptionType {
    fn from(builtin: BuiltinException) -> Self {
        ExceptionType::Builtin(builtin)
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raised (or raisable) exception instance.
#[derive(Debug)]
pub struct ExceptionValue {
    pub ty: ExceptionType,
    pub args: Vec<Value>,
    pub attrs: RefCell<FxHashMap<String, Value>>,
}

impl ExceptionValue {
    pub fn new(ty: ExceptionType, args: Vec<Value>) -> Self {
        ExceptionValue {
            ty,
            args,
            attrs: RefCell::new(FxHashMap::default()),
        }
    }

    /// `str(exc)`: empty for no arguments, the argument's `str` for one
    /// (its `repr` for `KeyError`), the tuple `repr` otherwise.
    pub fn message(&self) -> String {
        match self.args.as_slice() {
            [] => String::new(),
            [key] if self.ty == ExceptionType::Builtin(BuiltinException::KeyError) => key.repr(),
            [single] => single.to_str(),
            args => Value::tuple(args.to_vec()).repr(),
        }
    }

    pub fn repr(&self) -> String {
        let args: Vec<String> = self.args.iter().map(Value::repr).collect();
        format!("{}({})", self.ty.name(), args.join(", "))
    }

    pub fn get_attr(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    pub fn set_attr(&self, name: impl Into<String>, value: Value) {
        self.attrs.borrow_mut().insert(name.into(), value);
    }
}
