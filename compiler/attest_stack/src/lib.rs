//! Stack safety for deep recursion.
//!
//! The parser, un-parser and interpreter all recurse on the shape of the
//! syntax tree, so a pathological script (`((((...))))`, a long chain of
//! `a + a + ...`) could exhaust the native stack. Recursive entry points wrap
//! their bodies in [`ensure_sufficient_stack`], which grows the stack on
//! demand instead.
//!
//! - **Red zone**: 100KB. If less than this remains, the stack grows.
//! - **Growth size**: 1MB per growth.

const RED_ZONE: usize = 100 * 1024;

const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
