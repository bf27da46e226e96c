//! The module loading hook.
//!
//! [`ImportHook`] is a finder registered ahead of the interpreter's default
//! loader. It claims every unit it can locate, and loads it in one of three
//! ways:
//!
//! - already in the registry: returned as is;
//! - no source (precompiled only), or a source that does not opt in:
//!   handed to the default loader unchanged;
//! - a source that imports `assert_hook` from `attest`: rewritten, compiled
//!   and executed in a fresh module.
//!
//! Failures of a rewritten unit surface as [`LoadError`], which scripts see
//! as an `ImportError` (or `SyntaxError`) naming the unit.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use attest_eval::errors::import_error;
use attest_eval::loader::find_unit;
use attest_eval::{
    BuiltinException, EvalError, FoundUnit, Interpreter, MetaPathFinder, ModuleValue, UnitError,
};
use attest_parse::ParseError;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument, trace};

use crate::rewriter::{compile, AssertTransformer, CompileMode};

/// Name the hook registers under.
pub const FINDER_NAME: &str = "attest.hook";

/// Configuration for the loading hook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HookConfig {
    pub compile_mode: CompileMode,
}

impl HookConfig {
    #[must_use]
    pub fn compile_mode(mut self, mode: CompileMode) -> Self {
        self.compile_mode = mode;
        self
    }
}

/// Why a unit could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot import {name}: no unit found")]
    NotFound { name: String },
    #[error("cannot import {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: UnitError,
    },
    #[error("cannot import {name}: {error}")]
    Parse { name: String, error: ParseError },
    #[error("cannot import {name}: regenerated source does not parse: {error}")]
    Compile { name: String, error: ParseError },
    #[error("cannot import {name}: {source}")]
    Execute {
        name: String,
        #[source]
        source: EvalError,
    },
}

impl LoadError {
    pub fn name(&self) -> &str {
        match self {
            LoadError::NotFound { name }
            | LoadError::Io { name, .. }
            | LoadError::Parse { name, .. }
            | LoadError::Compile { name, .. }
            | LoadError::Execute { name, .. } => name,
        }
    }
}

impl From<LoadError> for EvalError {
    /// Parse failures become `SyntaxError`, everything else `ImportError`.
    /// An execution failure keeps its traceback and is attached as
    /// `__cause__`.
    fn from(err: LoadError) -> Self {
        match &err {
            LoadError::Parse { .. } | LoadError::Compile { .. } => {
                EvalError::new(BuiltinException::SyntaxError, err.to_string())
            }
            LoadError::Execute { source, .. } => {
                let mut error = import_error(err.to_string());
                error.traceback.clone_from(&source.traceback);
                error.exception.set_attr("__cause__", source.value());
                error
            }
            LoadError::NotFound { .. } | LoadError::Io { .. } => import_error(err.to_string()),
        }
    }
}

/// The assertion-rewriting finder.
pub struct ImportHook {
    config: HookConfig,
    /// Locations found by `find_module`. Entries live as long as the hook.
    cache: RefCell<FxHashMap<String, FoundUnit>>,
}

impl ImportHook {
    pub fn new(config: HookConfig) -> Self {
        ImportHook {
            config,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Install a hook on `interp`, replacing one installed earlier.
    pub fn enable(interp: &mut Interpreter, config: HookConfig) -> Rc<ImportHook> {
        ImportHook::disable(interp);
        let hook = Rc::new(ImportHook::new(config));
        interp.add_finder(Rc::clone(&hook) as Rc<dyn MetaPathFinder>);
        debug!(mode = ?hook.config.compile_mode, "import hook enabled");
        hook
    }

    /// Remove the hook. Returns whether one was installed.
    pub fn disable(interp: &mut Interpreter) -> bool {
        interp.remove_finder(FINDER_NAME)
    }

    pub fn is_enabled(interp: &Interpreter) -> bool {
        interp.has_finder(FINDER_NAME)
    }

    pub fn config(&self) -> &HookConfig {
        &self.config
    }

    /// The location cached for `name`.
    pub fn cached(&self, name: &str) -> Option<FoundUnit> {
        self.cache.borrow().get(name).cloned()
    }

    /// Locate `name` in the parent package's path, or the search paths.
    fn locate(&self, interp: &Interpreter, name: &str, path: Option<&[PathBuf]>) -> Option<FoundUnit> {
        let last = name.rsplit('.').next().unwrap_or(name);
        match path {
            Some(path) => find_unit(last, path),
            None => match name.rsplit_once('.') {
                Some((parent, _)) => {
                    let package_path = interp.module(parent)?.package_path.clone()?;
                    find_unit(last, &package_path)
                }
                None => find_unit(last, interp.search_paths()),
            },
        }
    }

    #[instrument(level = "debug", skip(self, interp, found), fields(location = %found.location.display()))]
    fn load(
        &self,
        interp: &mut Interpreter,
        name: &str,
        found: &FoundUnit,
    ) -> Result<Rc<ModuleValue>, EvalError> {
        if !found.has_source() {
            debug!("no source, delegating");
            return interp.load_found(name, found);
        }
        let source = found.read_source().map_err(|source| LoadError::Io {
            name: name.to_string(),
            source,
        })?;
        let transformer = AssertTransformer::new(source, found.location.display().to_string());
        let eligible = transformer.should_rewrite().map_err(|error| LoadError::Parse {
            name: name.to_string(),
            error,
        })?;
        if !eligible {
            trace!("not opted in, delegating");
            return interp.load_source(name, found, transformer.source());
        }
        Ok(self.load_rewritten(interp, name, found, &transformer)?)
    }

    fn load_rewritten(
        &self,
        interp: &mut Interpreter,
        name: &str,
        found: &FoundUnit,
        transformer: &AssertTransformer,
    ) -> Result<Rc<ModuleValue>, LoadError> {
        let node = transformer.node().map_err(|error| LoadError::Parse {
            name: name.to_string(),
            error,
        })?;
        let code = compile(node, self.config.compile_mode).map_err(|error| LoadError::Compile {
            name: name.to_string(),
            error,
        })?;
        interp
            .load_code(name, Some(found.location.clone()), found.package_path(), &code)
            .map_err(|source| LoadError::Execute {
                name: name.to_string(),
                source,
            })
    }
}

impl MetaPathFinder for ImportHook {
    fn name(&self) -> &str {
        FINDER_NAME
    }

    fn find_module(&self, interp: &Interpreter, name: &str, path: Option<&[PathBuf]>) -> bool {
        let Some(found) = self.locate(interp, name, path) else {
            trace!(module = name, "declined");
            return false;
        };
        trace!(module = name, location = %found.location.display(), kind = ?found.kind, "found");
        self.cache.borrow_mut().insert(name.to_string(), found);
        true
    }

    fn load_module(
        &self,
        interp: &mut Interpreter,
        name: &str,
    ) -> Result<Rc<ModuleValue>, EvalError> {
        if let Some(module) = interp.module(name) {
            trace!(module = name, "already loaded");
            return Ok(module);
        }
        let cached = self.cache.borrow().get(name).cloned();
        let found = cached
            .or_else(|| self.locate(interp, name, None))
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })?;
        self.load(interp, name, &found)
    }
}

#[cfg(test)]
mod tests;
