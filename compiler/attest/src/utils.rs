//! Import helpers for collecting tests by name.

use std::path::Path;

use attest_eval::errors::import_error;
use attest_eval::loader::{COMPILED_EXTENSION, PACKAGE_INIT, SOURCE_EXTENSION};
use attest_eval::{EvalError, EvalResult, Interpreter, Value};

/// Import `pkg.module.obj` or `pkg.module:obj` and return `obj`; a name
/// without a separator returns the module itself.
///
/// After `:` the object part may itself be dotted (`module:suite.tests`).
pub fn import_dotted_name(interp: &mut Interpreter, name: &str) -> EvalResult {
    let (module_name, object) = match name.split_once(':') {
        Some((module_name, object)) => (module_name, object),
        None => match name.rsplit_once('.') {
            Some((module_name, object)) => (module_name, object),
            None => return Ok(Value::Module(interp.import_module(name)?)),
        },
    };
    let module = interp.import_module(module_name)?;
    let mut value = Value::Module(module);
    let mut path = module_name.to_string();
    for attr in object.split('.') {
        path.push('.');
        path.push_str(attr);
        value = match interp.get_attr(&value, attr) {
            Ok(found) => found,
            Err(_) if matches!(value, Value::Module(_)) => {
                Value::Module(interp.import_module(&path).map_err(|_| {
                    import_error(format!("cannot import name '{attr}' from '{module_name}'"))
                })?)
            }
            Err(err) => return Err(err),
        };
    }
    Ok(value)
}

/// `name` and, for a package, every unit below it, depth first in name
/// order. Each listed unit is imported.
pub fn deep_iter_modules(interp: &mut Interpreter, name: &str) -> Result<Vec<String>, EvalError> {
    let module = interp.import_module(name)?;
    let mut names = vec![name.to_string()];
    let Some(package_path) = module.package_path.clone() else {
        return Ok(names);
    };
    let mut children: Vec<String> = Vec::new();
    for dir in &package_path {
        children.extend(package_children(dir));
    }
    children.sort();
    children.dedup();
    for child in children {
        names.extend(deep_iter_modules(interp, &format!("{name}.{child}"))?);
    }
    Ok(names)
}

/// Unit names directly inside a package directory.
fn package_children(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut children = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.join(PACKAGE_INIT).is_file() {
                children.extend(path.file_name().and_then(|n| n.to_str()).map(str::to_string));
            }
            continue;
        }
        let is_unit = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == SOURCE_EXTENSION || ext == COMPILED_EXTENSION);
        let stem = path.file_stem().and_then(|stem| stem.to_str());
        match stem {
            Some(stem) if is_unit && stem != "__init__" => children.push(stem.to_string()),
            _ => {}
        }
    }
    children
}

/// Module-level values of `name` and every unit below it that satisfy
/// `predicate`. Names starting with `_` are skipped unless `private`.
/// A value bound under several names, or in several units, is listed once.
pub fn deep_get_members(
    interp: &mut Interpreter,
    name: &str,
    predicate: impl Fn(&Value) -> bool,
    private: bool,
) -> Result<Vec<Value>, EvalError> {
    let mut members: Vec<Value> = Vec::new();
    for module_name in deep_iter_modules(interp, name)? {
        let Some(module) = interp.module(&module_name) else {
            continue;
        };
        for (member, value) in module.namespace.borrow().entries() {
            if !private && member.starts_with('_') {
                continue;
            }
            if predicate(&value) && !members.iter().any(|seen| seen.is_identical(&value)) {
                members.push(value);
            }
        }
    }
    Ok(members)
}

#[cfg(test)]
mod tests;
