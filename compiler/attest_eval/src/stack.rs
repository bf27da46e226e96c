//! Call stack.
//!
//! Every executing body (a module, a function call, a context's setup or
//! teardown, a re-evaluated assertion) has a [`Frame`]. The frame carries
//! the scopes name lookup uses and the line currently executing, which is
//! what tracebacks and `globals()`/`locals()` read.

use std::rc::Rc;

use crate::environment::Namespace;
use crate::errors::{recursion_limit_exceeded, EvalError, FrameOrigin, TracebackEntry};

/// Default depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

#[derive(Clone, Debug)]
pub struct Frame {
    /// Function name, or `<module>` for top-level code.
    pub function: Rc<str>,
    /// Name of the module the code belongs to.
    pub module: Rc<str>,
    pub file: Rc<str>,
    pub line: u32,
    pub globals: Namespace,
    pub locals: Namespace,
    pub origin: FrameOrigin,
}

impl Frame {
    /// Frame for top-level code, where locals and globals are one scope.
    pub fn module(module: Rc<str>, file: Rc<str>, namespace: Namespace) -> Self {
        Frame {
            function: "<module>".into(),
            module,
            file,
            line: 0,
            globals: namespace.clone(),
            locals: namespace,
            origin: FrameOrigin::User,
        }
    }

    pub fn traceback_entry(&self) -> TracebackEntry {
        TracebackEntry {
            file: Rc::clone(&self.file),
            line: self.line,
            function: Rc::clone(&self.function),
            origin: self.origin,
        }
    }
}

/// Live call stack with a depth limit.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, failing with `RecursionError` past the limit. The
    /// frame is not pushed on failure.
    pub fn push(&mut self, frame: Frame) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            return Err(recursion_limit_exceeded(self.max_depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Frame> {
        debug_assert!(!self.frames.is_empty(), "CallStack::pop on empty stack");
        self.frames.pop()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline]
    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Record the line being executed in the current frame.
    #[inline]
    pub fn set_line(&mut self, line: u32) {
        if let Some(frame) = self.frames.last_mut() {
            frame.line = line;
        }
    }

    /// Swap the current frame's locals, returning the previous scope.
    pub fn replace_locals(&mut self, locals: Namespace) -> Option<Namespace> {
        self.frames
            .last_mut()
            .map(|frame| std::mem::replace(&mut frame.locals, locals))
    }

    /// Snapshot of the live frames, outermost first.
    pub fn entries(&self) -> Vec<TracebackEntry> {
        self.frames.iter().map(Frame::traceback_entry).collect()
    }
}

impl Default for CallStack {
    fn default() -> Self {
        CallStack::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests;
