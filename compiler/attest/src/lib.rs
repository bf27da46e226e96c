//! Attest - assertion rewriting and test running for attest scripts.
//!
//! A script unit opts in to rewriting with a module-scope
//! `from attest import assert_hook`. When such a unit is loaded through
//! the [`ImportHook`], each `assert` statement becomes a call to
//! `assert_hook`, which re-evaluates the condition in the caller's scopes
//! and, on failure, raises `TestFailure` with the condition rendered:
//!
//! ```text
//! assert value > 3            value = 2
//! TestFailure: not (2 > 3)
//! ```
//!
//! # Architecture
//!
//! ```text
//! source ──► AssertTransformer ──► rewritten Module ──► Interpreter
//!                                                          │
//!                              assert_hook(expr, ...) ◄────┘
//!                                     │
//!                                     ▼
//!                         ExpressionEvaluator::render
//! ```
//!
//! Around the core sit the `Tests` collection, the `Assert` wrapper, the
//! runner and the reporters.

pub mod assertion;
pub mod asserts;
pub mod collector;
pub mod commands;
pub mod evaluator;
pub mod hook;
pub mod reporters;
pub mod result;
pub mod rewriter;
pub mod runner;
pub mod session;
pub mod utils;

use std::sync::Once;

pub use assertion::{AssertionFailure, Statistics};
pub use collector::{TestCase, TestCollection};
pub use evaluator::{evalexpr, Bindings, ExpressionEvaluator, RenderedExpression};
pub use hook::{HookConfig, ImportHook, LoadError};
pub use reporters::{get_reporter_by_name, reporter_names, Reporter};
pub use result::{FailureKind, TestIdentity, TestResult, TestSummary};
pub use rewriter::{AssertTransformer, CompileMode};
pub use runner::{capture_output, run_tests, RunnerConfig};
pub use session::Session;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=attest=debug` or `RUST_LOG=attest_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
