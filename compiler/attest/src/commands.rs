//! Command handlers for the `attest` CLI.
//!
//! Handlers return the process exit code (or an error to print) and leave
//! exiting to `main`.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use attest_eval::loader::{self, PACKAGE_INIT, SOURCE_EXTENSION};
use attest_eval::{EvalError, Interpreter, UnitError, Value};
use attest_parse::ParseError;

use crate::collector::TestCollection;
use crate::hook::{HookConfig, ImportHook};
use crate::reporters::{get_reporter_by_name, reporter_names, UnknownReporter};
use crate::rewriter::{AssertTransformer, CompileMode};
use crate::runner::{run_tests, RunnerConfig};
use crate::session::Session;

/// Options of `attest run`.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Module names, `module:object` names, or paths to units.
    pub targets: Vec<String>,
    pub reporter: Option<String>,
    /// Load test units through the rewriting hook.
    pub hook: bool,
    pub compile_mode: CompileMode,
    pub runner: RunnerConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            targets: Vec::new(),
            reporter: None,
            hook: true,
            compile_mode: CompileMode::Tree,
            runner: RunnerConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {error}", path.display())]
    Parse { path: PathBuf, error: ParseError },
    #[error(transparent)]
    Unit(#[from] UnitError),
    #[error(transparent)]
    Reporter(#[from] UnknownReporter),
    #[error("{}", format_error(.0))]
    Load(EvalError),
    #[error("writing the report failed: {0}")]
    Report(#[source] io::Error),
}

/// `attest run`: collect every `Tests` collection from the targets and
/// run them. Returns 0 when every test passed.
pub fn run_tests_command(options: &RunOptions) -> Result<i32, CommandError> {
    let mut interp = Interpreter::builder().search_path(".").build();
    let session = Session::install(&mut interp);
    if options.hook {
        ImportHook::enable(
            &mut interp,
            HookConfig::default().compile_mode(options.compile_mode),
        );
    }
    let collection = TestCollection::new(session.clone());
    for target in &options.targets {
        let name = resolve_target(&mut interp, target);
        tracing::debug!(target = %target, module = %name, "collecting");
        collection
            .register_value(&mut interp, Value::from(name))
            .map_err(CommandError::Load)?;
    }
    let mut reporter =
        get_reporter_by_name(options.reporter.as_deref(), "auto", Box::new(io::stdout()))?;
    let regenerated = options.hook && options.compile_mode == CompileMode::Regenerate;
    let config = options
        .runner
        .clone()
        .blank_line_numbers(options.runner.blank_line_numbers || regenerated);
    let summary = run_tests(
        &mut interp,
        &session,
        &collection.tests(),
        reporter.as_mut(),
        &config,
    )
    .map_err(CommandError::Report)?;
    Ok(i32::from(!summary.is_success()))
}

/// The unit name for a target, adding its directory to the search paths
/// when the target is a path.
fn resolve_target(interp: &mut Interpreter, target: &str) -> String {
    let path = Path::new(target);
    let is_source = path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION);
    let is_package = path.join(PACKAGE_INIT).is_file();
    if !(is_source && path.is_file()) && !is_package {
        return target.to_string();
    }
    let name = if is_package {
        path.file_name()
    } else {
        path.file_stem()
    };
    let name = name.and_then(|n| n.to_str()).unwrap_or(target).to_string();
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    interp.add_search_path(dir);
    name
}

/// `attest rewrite <file>`: the source as the hook would execute it.
/// Units that do not opt in come back unchanged.
pub fn rewrite_file(path: &Path) -> Result<String, CommandError> {
    let source = std::fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let transformer = AssertTransformer::new(source, path.display().to_string());
    let parse_error = |error| CommandError::Parse {
        path: path.to_path_buf(),
        error,
    };
    if !transformer.should_rewrite().map_err(parse_error)? {
        return Ok(transformer.source().to_string());
    }
    transformer.regenerate().map_err(parse_error)
}

/// `attest compile <file>`: write the precompiled unit next to the source.
pub fn compile_file(path: &Path) -> Result<PathBuf, CommandError> {
    Ok(loader::compile_file(path)?)
}

/// `attest reporters`.
pub fn list_reporters() -> Vec<&'static str> {
    reporter_names().to_vec()
}

/// An uncaught error with its traceback, as printed by the CLI.
pub fn format_error(err: &EvalError) -> String {
    let mut out = String::new();
    if !err.traceback.is_empty() {
        out.push_str("Traceback (most recent call last):\n");
        for entry in &err.traceback {
            let _ = writeln!(out, "  {entry}");
        }
    }
    let _ = write!(out, "{err}");
    out
}

#[cfg(test)]
mod tests;
