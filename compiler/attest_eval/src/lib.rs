//! Attest Eval - the host interpreter for attest scripts.
//!
//! A tree-walking interpreter over `attest_ir` trees, with the pieces a test
//! library needs to hook into it:
//!
//! - [`Interpreter`]: builtins, the loaded-units registry, the call stack
//!   and the import machinery.
//! - [`MetaPathFinder`]: finders consulted before the default loader, so a
//!   library can take over loading of selected units.
//! - [`NativeObject`]: script-visible objects implemented in Rust.
//! - [`PrintHandler`]: where `print` output goes (stdout or a buffer).
//!
//! Errors are script exceptions ([`EvalError`]) carrying a traceback;
//! control flow travels separately as [`ControlAction`].

mod builtins;
mod environment;
pub mod errors;
mod interpreter;
pub mod loader;
mod methods;
mod operators;
mod print_handler;
mod stack;
pub mod value;

pub use environment::{new_namespace, LocalScope, Namespace, Scope};
pub use errors::{ControlAction, EvalError, EvalResult, FrameOrigin, TracebackEntry};
pub use interpreter::{ContextState, Interpreter, InterpreterBuilder};
pub use loader::{FoundUnit, MetaPathFinder, UnitError, UnitKind};
pub use operators::{binary_op, compare_op, unary_op};
pub use print_handler::{BufferPrintHandler, PrintHandler, SharedPrintHandler};
pub use stack::DEFAULT_MAX_DEPTH;
pub use value::{
    BuiltinException, BuiltinType, CallArgs, ExceptionType, ExceptionValue, FunctionValue,
    ModuleValue, NativeObject, Value,
};
