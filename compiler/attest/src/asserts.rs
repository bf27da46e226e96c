//! The `Assert` wrapper.
//!
//! `Assert(obj)` wraps a value so that comparisons and truth tests on it
//! fail with a descriptive `AssertionError`:
//!
//! ```text
//! Assert(1 + 1) == 3        AssertionError: 2 != 3
//! 2 in Assert([1, 3])       AssertionError: 2 not in [1, 3]
//! Assert('hello').upper() == 'HELLO'
//! ```
//!
//! Attribute access, calls and subscripts are forwarded to the wrapped
//! value and their results wrapped again.

use std::any::Any;
use std::rc::Rc;

use attest_eval::errors::{assertion_error, type_error};
use attest_eval::{CallArgs, EvalError, EvalResult, Interpreter, NativeObject, Value};
use attest_ir::CmpOp;

use crate::assertion::Statistics;

type TypeMethod = fn(&AssertType, &mut Interpreter, CallArgs) -> EvalResult;
type ValueMethod = fn(&AssertValue, &mut Interpreter, Value) -> EvalResult;

const TYPE_METHODS: &[(&str, TypeMethod)] = &[
    ("raises", AssertType::raises),
    ("not_raising", AssertType::not_raising),
    ("isinstance", AssertType::isinstance),
    ("not_isinstance", AssertType::not_isinstance),
    ("issubclass", AssertType::issubclass),
    ("not_issubclass", AssertType::not_issubclass),
];

const VALUE_METHODS: &[(&str, ValueMethod)] = &[
    ("is_", AssertValue::is_),
    ("is_not", AssertValue::is_not),
    ("in_", AssertValue::in_),
    ("not_in", AssertValue::not_in),
];

/// The `Assert` class object.
pub struct AssertType {
    statistics: Rc<Statistics>,
}

impl AssertType {
    pub fn new(statistics: Rc<Statistics>) -> Self {
        AssertType { statistics }
    }

    fn wrap(&self, obj: Value) -> Value {
        wrap(&self.statistics, obj)
    }

    /// `Assert.raises(ExcType, func, *args, **kwargs)`: the caught
    /// exception, wrapped.
    fn raises(&self, interp: &mut Interpreter, mut args: CallArgs) -> EvalResult {
        if args.positional.len() < 2 {
            return Err(type_error(
                "Assert.raises() takes an exception type and a callable",
            ));
        }
        let mut rest = args.positional.split_off(1);
        let func = rest.remove(0);
        let expected = args.positional.remove(0);
        self.statistics.record_assertion();
        let call = CallArgs {
            positional: rest,
            keywords: args.keywords,
        };
        match interp.call(&func, call) {
            Ok(_) => Err(assertion_error(Some(Value::from(format!(
                "didn't raise {}",
                class_repr(&expected)
            ))))),
            Err(err) if interp.isinstance(&err.value(), &expected)? => Ok(self.wrap(err.value())),
            Err(err) => Err(err),
        }
    }

    /// `Assert.not_raising(ExcType, func, *args, **kwargs)`.
    fn not_raising(&self, interp: &mut Interpreter, mut args: CallArgs) -> EvalResult {
        if args.positional.len() < 2 {
            return Err(type_error(
                "Assert.not_raising() takes an exception type and a callable",
            ));
        }
        let mut rest = args.positional.split_off(1);
        let func = rest.remove(0);
        let unexpected = args.positional.remove(0);
        self.statistics.record_assertion();
        let call = CallArgs {
            positional: rest,
            keywords: args.keywords,
        };
        match interp.call(&func, call) {
            Ok(value) => Ok(self.wrap(value)),
            Err(err) if interp.isinstance(&err.value(), &unexpected)? => {
                Err(assertion_error(Some(Value::from(format!(
                    "raised {}",
                    class_repr(&unexpected)
                )))))
            }
            Err(err) => Err(err),
        }
    }

    fn isinstance(&self, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let (obj, classinfo) = two_arguments("Assert.isinstance", args)?;
        let holds = interp.isinstance(&obj, &classinfo)?;
        self.check(
            holds,
            format!("not isinstance({}, {})", obj.repr(), class_repr(&classinfo)),
        )
    }

    fn not_isinstance(&self, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let (obj, classinfo) = two_arguments("Assert.not_isinstance", args)?;
        let holds = interp.isinstance(&obj, &classinfo)?;
        self.check(
            !holds,
            format!("isinstance({}, {})", obj.repr(), class_repr(&classinfo)),
        )
    }

    fn issubclass(&self, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let (cls, classinfo) = two_arguments("Assert.issubclass", args)?;
        let holds = interp.issubclass(&cls, &classinfo)?;
        self.check(
            holds,
            format!("not issubclass({}, {})", class_repr(&cls), class_repr(&classinfo)),
        )
    }

    fn not_issubclass(&self, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let (cls, classinfo) = two_arguments("Assert.not_issubclass", args)?;
        let holds = interp.issubclass(&cls, &classinfo)?;
        self.check(
            !holds,
            format!("issubclass({}, {})", class_repr(&cls), class_repr(&classinfo)),
        )
    }

    fn check(&self, holds: bool, message: String) -> EvalResult {
        counted(&self.statistics, holds, message).map(Value::Bool)
    }
}

impl NativeObject for AssertType {
    fn type_name(&self) -> &'static str {
        "type"
    }

    fn repr(&self) -> String {
        "<class 'Assert'>".to_string()
    }

    fn get_attr(self: Rc<Self>, _interp: &mut Interpreter, name: &str) -> Option<EvalResult> {
        if name == "__name__" {
            return Some(Ok(Value::from("Assert")));
        }
        let &(name, func) = TYPE_METHODS.iter().find(|(method, _)| *method == name)?;
        Some(Ok(Value::builtin(
            format!("Assert.{name}"),
            move |interp, args| func(&self, interp, args),
        )))
    }

    fn call(self: Rc<Self>, _interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let [obj] = args
            .bind("Assert", &[], &["obj"])?
            .try_into()
            .map_err(|_| type_error("Assert() argument binding failed"))?;
        Ok(self.wrap(obj.unwrap_or(Value::None)))
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A wrapped value.
pub struct AssertValue {
    obj: Value,
    statistics: Rc<Statistics>,
}

impl AssertValue {
    pub fn obj(&self) -> &Value {
        &self.obj
    }

    fn is_(&self, _interp: &mut Interpreter, other: Value) -> EvalResult {
        let holds = self.obj.is_identical(&other);
        self.check(holds, format!("{} is not {}", self.obj.repr(), other.repr()))
    }

    fn is_not(&self, _interp: &mut Interpreter, other: Value) -> EvalResult {
        let holds = !self.obj.is_identical(&other);
        self.check(holds, format!("{} is {}", self.obj.repr(), other.repr()))
    }

    fn in_(&self, interp: &mut Interpreter, container: Value) -> EvalResult {
        let holds = interp.compare(CmpOp::In, &self.obj, &container)?;
        self.check(holds, format!("{} not in {}", self.obj.repr(), container.repr()))
    }

    fn not_in(&self, interp: &mut Interpreter, container: Value) -> EvalResult {
        let holds = interp.compare(CmpOp::NotIn, &self.obj, &container)?;
        self.check(holds, format!("{} in {}", self.obj.repr(), container.repr()))
    }

    fn check(&self, holds: bool, message: String) -> EvalResult {
        counted(&self.statistics, holds, message).map(Value::Bool)
    }
}

impl NativeObject for AssertValue {
    fn type_name(&self) -> &'static str {
        "Assert"
    }

    fn repr(&self) -> String {
        format!("Assert({})", self.obj.repr())
    }

    fn get_attr(self: Rc<Self>, interp: &mut Interpreter, name: &str) -> Option<EvalResult> {
        if name == "obj" {
            return Some(Ok(self.obj.clone()));
        }
        let Some(&(name, func)) = VALUE_METHODS.iter().find(|(method, _)| *method == name) else {
            let result = interp
                .get_attr(&self.obj, name)
                .map(|value| wrap(&self.statistics, value));
            return Some(result);
        };
        Some(Ok(Value::builtin(name, move |interp, args| {
            let [other] = args
                .bind(name, &["obj"], &[])?
                .try_into()
                .map_err(|_| type_error(format!("{name}() argument binding failed")))?;
            func(&self, interp, unwrap(other.unwrap_or(Value::None)))
        })))
    }

    fn call(self: Rc<Self>, interp: &mut Interpreter, args: CallArgs) -> EvalResult {
        let result = interp.call(&self.obj, args)?;
        Ok(wrap(&self.statistics, result))
    }

    fn is_callable(&self) -> bool {
        true
    }

    fn truthy(&self) -> Result<bool, EvalError> {
        let holds = self.obj.truthy()?;
        counted(&self.statistics, holds, format!("not {}", self.obj.repr()))
    }

    fn compare(
        self: Rc<Self>,
        interp: &mut Interpreter,
        op: CmpOp,
        other: &Value,
    ) -> Option<EvalResult> {
        let inverse = match op {
            CmpOp::Eq => "!=",
            CmpOp::NotEq => "==",
            CmpOp::Lt => ">=",
            CmpOp::LtEq => ">",
            CmpOp::Gt => "<=",
            CmpOp::GtEq => "<",
            _ => return None,
        };
        let other = unwrap(other.clone());
        let result = interp.compare(op, &self.obj, &other).and_then(|holds| {
            let message = format!("{} {inverse} {}", self.obj.repr(), other.repr());
            self.check(holds, message)
        });
        Some(result)
    }

    fn contains(self: Rc<Self>, interp: &mut Interpreter, item: &Value) -> Option<EvalResult> {
        let item = unwrap(item.clone());
        let result = interp.compare(CmpOp::In, &item, &self.obj).and_then(|holds| {
            self.check(holds, format!("{} not in {}", item.repr(), self.obj.repr()))
        });
        Some(result)
    }

    fn subscript(self: Rc<Self>, interp: &mut Interpreter, index: &Value) -> Option<EvalResult> {
        let result = interp
            .get_item(&self.obj, index)
            .map(|value| wrap(&self.statistics, value));
        Some(result)
    }

    fn len(&self) -> Option<usize> {
        match &self.obj {
            Value::Str(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.borrow().len()),
            Value::Tuple(items) => Some(items.len()),
            Value::Dict(dict) => Some(dict.borrow().len()),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn wrap(statistics: &Rc<Statistics>, obj: Value) -> Value {
    Value::native(AssertValue {
        obj: unwrap(obj),
        statistics: Rc::clone(statistics),
    })
}

/// The wrapped value of an `Assert`, or the value itself.
fn unwrap(value: Value) -> Value {
    if let Value::Native(native) = &value {
        if let Some(wrapped) = native.downcast_ref::<AssertValue>() {
            return wrapped.obj.clone();
        }
    }
    value
}

/// Count one assertion; fail with `message` unless it holds.
fn counted(statistics: &Statistics, holds: bool, message: String) -> Result<bool, EvalError> {
    statistics.record_assertion();
    if holds {
        Ok(true)
    } else {
        Err(assertion_error(Some(Value::from(message))))
    }
}

fn two_arguments(function: &str, args: CallArgs) -> Result<(Value, Value), EvalError> {
    let [first, second] = args.expect_positional(function, 2, 2)? else {
        return Err(type_error(format!("{function}() takes exactly 2 arguments")));
    };
    Ok((unwrap(first.clone()), second.clone()))
}

/// Classes by name, tuples of classes element-wise, anything else by repr.
fn class_repr(value: &Value) -> String {
    match value {
        Value::Type(_) | Value::ExceptionType(_) => value.display_name().unwrap_or_default(),
        Value::Tuple(items) => {
            let parts: Vec<String> = items.iter().map(class_repr).collect();
            format!("({})", parts.join(", "))
        }
        other => other.repr(),
    }
}
