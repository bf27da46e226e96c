//! Import machinery: the registry, finders, and the default loader.
//!
//! Loading a dotted name imports each parent package first and searches the
//! parent's `__path__` for the last component. Every request goes to the
//! registered finders in order; the first to claim a unit loads it. When
//! none does, the default loader reads source (or a precompiled unit) and
//! executes it without modification.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use attest_ir::{Alias, Module};
use tracing::{debug, trace};

use super::Interpreter;
use crate::environment::new_namespace;
use crate::errors::{import_error, runtime_error, syntax_error, ControlAction, EvalError};
use crate::loader::{find_unit, read_precompiled, FoundUnit, UnitKind};
use crate::stack::Frame;
use crate::value::{BuiltinException, ModuleValue, Value};

impl Interpreter {
    /// Create a module with `__name__`, `__file__` and (for packages)
    /// `__path__` set. The module is not registered.
    pub fn create_module(
        &self,
        name: &str,
        file: Option<PathBuf>,
        package_path: Option<Vec<PathBuf>>,
    ) -> Rc<ModuleValue> {
        let namespace = new_namespace(None);
        {
            let mut scope = namespace.borrow_mut();
            scope.define("__name__", Value::from(name));
            scope.define(
                "__file__",
                file.as_ref()
                    .map_or(Value::None, |f| Value::from(f.display().to_string())),
            );
            if let Some(path) = &package_path {
                let entries = path
                    .iter()
                    .map(|p| Value::from(p.display().to_string()))
                    .collect();
                scope.define("__path__", Value::list(entries));
            }
        }
        Rc::new(ModuleValue {
            name: name.into(),
            file,
            package_path,
            namespace,
        })
    }

    /// Execute `code` as the top-level body of `module`.
    pub fn exec_module(&mut self, module: &Rc<ModuleValue>, code: &Module) -> Result<(), EvalError> {
        let file: Rc<str> = module
            .file
            .as_ref()
            .map_or_else(|| format!("<{}>", module.name), |f| f.display().to_string())
            .into();
        let frame = Frame::module(Rc::clone(&module.name), file, module.namespace.clone());
        self.in_frame(frame, |interp| match interp.exec_block(&code.body) {
            Ok(()) => Ok(()),
            Err(ControlAction::Error(err)) => Err(err),
            Err(_) => Err(runtime_error(
                "'return', 'break' or 'continue' at module level",
            )),
        })
    }

    /// Create, register and execute a unit. A unit whose execution fails is
    /// removed from the registry again.
    pub fn load_code(
        &mut self,
        name: &str,
        file: Option<PathBuf>,
        package_path: Option<Vec<PathBuf>>,
        code: &Module,
    ) -> Result<Rc<ModuleValue>, EvalError> {
        let module = self.create_module(name, file, package_path);
        self.register_module(Rc::clone(&module));
        if let Err(err) = self.exec_module(&module, code) {
            debug!(module = name, error = %err, "unit failed to execute");
            self.remove_module(name);
            return Err(err);
        }
        Ok(module)
    }

    /// Parse and execute source text as unit `name`.
    pub fn load_source(
        &mut self,
        name: &str,
        found: &FoundUnit,
        source: &str,
    ) -> Result<Rc<ModuleValue>, EvalError> {
        let code = attest_parse::parse_module(source).map_err(|err| syntax_error(&err))?;
        self.load_code(
            name,
            Some(found.location.clone()),
            found.package_path(),
            &code,
        )
    }

    /// Run a script file as a unit named `name`.
    pub fn run_file(&mut self, name: &str, path: &Path) -> Result<Rc<ModuleValue>, EvalError> {
        let found = FoundUnit::source(path.to_path_buf());
        let source = found.read_source().map_err(EvalError::from)?;
        self.load_source(name, &found, &source)
    }

    /// Load a located unit without any finder: source is executed as-is,
    /// precompiled units are decoded and executed.
    pub fn load_found(&mut self, name: &str, found: &FoundUnit) -> Result<Rc<ModuleValue>, EvalError> {
        if let Some(module) = self.module(name) {
            return Ok(module);
        }
        trace!(module = name, location = %found.location.display(), kind = ?found.kind, "default load");
        match found.kind {
            UnitKind::Source | UnitKind::Package => {
                let source = found.read_source().map_err(EvalError::from)?;
                self.load_source(name, found, &source)
            }
            UnitKind::Compiled => {
                let code = read_precompiled(&found.location).map_err(EvalError::from)?;
                self.load_code(name, Some(found.location.clone()), None, &code)
            }
        }
    }

    /// The default loader: locate `name` in `path` (or the search paths).
    pub fn default_load(
        &mut self,
        name: &str,
        path: Option<&[PathBuf]>,
    ) -> Result<Rc<ModuleValue>, EvalError> {
        let last = name.rsplit('.').next().unwrap_or(name);
        let found = match path {
            Some(path) => find_unit(last, path),
            None => find_unit(last, &self.search_paths),
        };
        match found {
            Some(found) => self.load_found(name, &found),
            None => Err(import_error(format!("No module named '{name}'"))),
        }
    }

    /// Import a (dotted) unit name, returning the innermost module.
    pub fn import_module(&mut self, name: &str) -> Result<Rc<ModuleValue>, EvalError> {
        if let Some(module) = self.module(name) {
            return Ok(module);
        }
        let (parent, path) = match name.rsplit_once('.') {
            Some((parent_name, _)) => {
                let parent = self.import_module(parent_name)?;
                if let Some(module) = self.module(name) {
                    return Ok(module);
                }
                let Some(path) = parent.package_path.clone() else {
                    return Err(import_error(format!(
                        "No module named '{name}'; '{parent_name}' is not a package"
                    )));
                };
                (Some(parent), Some(path))
            }
            None => (None, None),
        };
        let module = self.find_and_load(name, path.as_deref())?;
        if let Some(parent) = parent {
            let last = name.rsplit('.').next().unwrap_or(name);
            parent.set(last, Value::Module(Rc::clone(&module)));
        }
        Ok(module)
    }

    fn find_and_load(
        &mut self,
        name: &str,
        path: Option<&[PathBuf]>,
    ) -> Result<Rc<ModuleValue>, EvalError> {
        let finders = self.meta_path.clone();
        for finder in finders {
            if finder.find_module(self, name, path) {
                trace!(module = name, finder = finder.name(), "finder claimed unit");
                return finder.load_module(self, name);
            }
        }
        self.default_load(name, path)
    }

    pub(super) fn exec_import(&mut self, names: &[Alias]) -> Result<(), EvalError> {
        for alias in names {
            let module = self.import_module(&alias.name)?;
            match &alias.asname {
                Some(asname) => self.assign_name(asname, Value::Module(module)),
                None => {
                    let top = alias.bound_name();
                    let top_module = self.import_module(top)?;
                    self.assign_name(top, Value::Module(top_module));
                }
            }
        }
        Ok(())
    }

    pub(super) fn exec_import_from(
        &mut self,
        module: Option<&str>,
        names: &[Alias],
        level: u32,
    ) -> Result<(), EvalError> {
        let absolute = if level == 0 {
            module.unwrap_or_default().to_string()
        } else {
            self.resolve_relative(module, level)?
        };
        let source = self.import_module(&absolute)?;
        for alias in names {
            let value = match source.get(&alias.name) {
                Some(value) => value,
                None => {
                    let submodule = format!("{absolute}.{}", alias.name);
                    match self.import_module(&submodule) {
                        Ok(module) => Value::Module(module),
                        Err(err) if err.is(BuiltinException::ImportError) => {
                            return Err(import_error(format!(
                                "cannot import name '{}' from '{absolute}'",
                                alias.name
                            )));
                        }
                        Err(err) => return Err(err),
                    }
                }
            };
            let bound = alias.asname.as_deref().unwrap_or(&alias.name);
            self.assign_name(bound, value);
        }
        Ok(())
    }

    /// Absolute name for `from <dots><module> import ...`.
    fn resolve_relative(&self, module: Option<&str>, level: u32) -> Result<String, EvalError> {
        let (globals, _) = self
            .current_scopes()
            .ok_or_else(|| import_error("relative import outside of a module"))?;
        let globals = globals.borrow();
        let current = globals
            .get("__name__")
            .map(|name| name.to_str())
            .unwrap_or_default();
        let mut package = if globals.contains("__path__") {
            current
        } else {
            current
                .rsplit_once('.')
                .map(|(parent, _)| parent.to_string())
                .unwrap_or_default()
        };
        for _ in 1..level {
            package = package
                .rsplit_once('.')
                .map(|(parent, _)| parent.to_string())
                .unwrap_or_default();
        }
        if package.is_empty() {
            return Err(import_error(
                "attempted relative import with no known parent package",
            ));
        }
        Ok(match module {
            Some(module) => format!("{package}.{module}"),
            None => package,
        })
    }
}
