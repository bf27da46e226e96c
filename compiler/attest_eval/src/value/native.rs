//! Objects implemented outside the interpreter.
//!
//! Library crates expose script-visible objects (assertion wrappers, test
//! collections) by implementing [`NativeObject`]. Every hook has a default
//! that behaves like a plain object without the corresponding protocol.

use std::any::Any;
use std::rc::Rc;

use attest_ir::CmpOp;

use super::{CallArgs, Value};
use crate::errors::{type_error, EvalError, EvalResult};
use crate::Interpreter;

pub trait NativeObject: Any {
    /// Name used in `repr` and error messages.
    fn type_name(&self) -> &'static str;

    fn repr(&self) -> String {
        format!("<{} object>", self.type_name())
    }

    /// Attribute lookup; `None` means no such attribute.
    fn get_attr(self: Rc<Self>, _interp: &mut Interpreter, _name: &str) -> Option<EvalResult> {
        None
    }

    fn call(self: Rc<Self>, _interp: &mut Interpreter, _args: CallArgs) -> EvalResult {
        Err(type_error(format!(
            "'{}' object is not callable",
            self.type_name()
        )))
    }

    /// Whether `callable(self)` holds.
    fn is_callable(&self) -> bool {
        false
    }

    fn truthy(&self) -> Result<bool, EvalError> {
        Ok(true)
    }

    /// `self <op> other`; `None` falls back to identity comparison.
    fn compare(
        self: Rc<Self>,
        _interp: &mut Interpreter,
        _op: CmpOp,
        _other: &Value,
    ) -> Option<EvalResult> {
        None
    }

    /// `item in self`.
    fn contains(self: Rc<Self>, _interp: &mut Interpreter, _item: &Value) -> Option<EvalResult> {
        None
    }

    /// `self[index]`.
    fn subscript(self: Rc<Self>, _interp: &mut Interpreter, _index: &Value) -> Option<EvalResult> {
        None
    }

    fn len(&self) -> Option<usize> {
        None
    }

    /// Items produced by iterating `self`.
    fn iterate(self: Rc<Self>, _interp: &mut Interpreter) -> Option<Result<Vec<Value>, EvalError>> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn NativeObject {
    pub fn downcast_ref<T: NativeObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
