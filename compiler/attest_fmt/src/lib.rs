//! Attest formatter.
//!
//! Turns syntax trees back into source text. The assertion rewriter uses
//! [`expr_to_source`] to recover the text of an asserted condition, and the
//! regenerate compile mode prints whole modules with [`module_to_source`].

mod emitter;
mod generator;
mod literals;

pub use emitter::{Emitter, StringEmitter};
pub use generator::{expr_to_source, module_to_source, precedence, SourceGenerator};
pub use literals::{format_float, quote_str};
