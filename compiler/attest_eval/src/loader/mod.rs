//! Unit discovery and precompiled units.
//!
//! A unit named `name` is looked up in each search directory in order:
//!
//! ```text
//! <dir>/<name>/__init__.att   package
//! <dir>/<name>.att            source
//! <dir>/<name>.attc           precompiled
//! ```
//!
//! Precompiled units are a magic header followed by a bincode-encoded
//! [`PrecompiledUnit`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use attest_ir::Module;
use attest_parse::ParseError;
use serde::{Deserialize, Serialize};

use crate::errors::{import_error, syntax_error, EvalError};
use crate::interpreter::Interpreter;
use crate::value::ModuleValue;

pub const SOURCE_EXTENSION: &str = "att";
pub const COMPILED_EXTENSION: &str = "attc";
pub const PACKAGE_INIT: &str = "__init__.att";

/// Header of every precompiled unit.
pub const MAGIC: &[u8; 4] = b"ATTC";

/// Format version written after the header.
pub const FORMAT_VERSION: u32 = 1;

/// A finder consulted before the default loader.
///
/// `find_module` claims a unit by returning `true`; the interpreter then
/// calls `load_module` on the same finder. Declining leaves the unit to the
/// next finder, and finally to the default loader.
pub trait MetaPathFinder {
    /// Identifies the finder in logs and in `has_finder`.
    fn name(&self) -> &str;

    fn find_module(&self, interp: &Interpreter, name: &str, path: Option<&[PathBuf]>) -> bool;

    fn load_module(&self, interp: &mut Interpreter, name: &str)
        -> Result<Rc<ModuleValue>, EvalError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Source,
    Compiled,
    Package,
}

/// Where a unit was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoundUnit {
    /// The file to read: the source, the `__init__.att`, or the `.attc`.
    pub location: PathBuf,
    pub kind: UnitKind,
    /// The package directory, for packages only.
    pub package_dir: Option<PathBuf>,
}

impl FoundUnit {
    pub fn source(location: PathBuf) -> Self {
        FoundUnit {
            location,
            kind: UnitKind::Source,
            package_dir: None,
        }
    }

    /// The `__path__` a package exposes to its submodules.
    pub fn package_path(&self) -> Option<Vec<PathBuf>> {
        self.package_dir.as_ref().map(|dir| vec![dir.clone()])
    }

    pub fn has_source(&self) -> bool {
        self.kind != UnitKind::Compiled
    }

    pub fn read_source(&self) -> Result<String, UnitError> {
        std::fs::read_to_string(&self.location).map_err(|err| UnitError::io(&self.location, err))
    }
}

/// Locate `name` (a single, undotted component) in `paths`.
pub fn find_unit(name: &str, paths: &[PathBuf]) -> Option<FoundUnit> {
    for dir in paths {
        let package_dir = dir.join(name);
        let init = package_dir.join(PACKAGE_INIT);
        if init.is_file() {
            return Some(FoundUnit {
                location: init,
                kind: UnitKind::Package,
                package_dir: Some(package_dir),
            });
        }
        let source = dir.join(format!("{name}.{SOURCE_EXTENSION}"));
        if source.is_file() {
            return Some(FoundUnit::source(source));
        }
        let compiled = dir.join(format!("{name}.{COMPILED_EXTENSION}"));
        if compiled.is_file() {
            return Some(FoundUnit {
                location: compiled,
                kind: UnitKind::Compiled,
                package_dir: None,
            });
        }
    }
    None
}

/// The serialized payload of a `.attc` file.
#[derive(Debug, Serialize, Deserialize)]
pub struct PrecompiledUnit {
    pub version: u32,
    /// Display form of the source file the unit was compiled from.
    pub source: String,
    pub module: Module,
}

pub fn write_precompiled(path: &Path, unit: &PrecompiledUnit) -> Result<(), UnitError> {
    let payload = bincode::serialize(unit).map_err(|err| UnitError::format(path, err))?;
    let mut bytes = Vec::with_capacity(MAGIC.len() + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&payload);
    std::fs::write(path, bytes).map_err(|err| UnitError::io(path, err))
}

pub fn read_precompiled(path: &Path) -> Result<Module, UnitError> {
    let bytes = std::fs::read(path).map_err(|err| UnitError::io(path, err))?;
    let payload = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| UnitError::format(path, "bad magic number"))?;
    let unit: PrecompiledUnit =
        bincode::deserialize(payload).map_err(|err| UnitError::format(path, err))?;
    if unit.version != FORMAT_VERSION {
        return Err(UnitError::format(
            path,
            format!("unsupported format version {}", unit.version),
        ));
    }
    Ok(unit.module)
}

/// Parse `path` and write `<stem>.attc` next to it. Returns the output path.
pub fn compile_file(path: &Path) -> Result<PathBuf, UnitError> {
    let source = std::fs::read_to_string(path).map_err(|err| UnitError::io(path, err))?;
    let module = attest_parse::parse_module(&source).map_err(|error| UnitError::Parse {
        path: path.to_path_buf(),
        error,
    })?;
    let output = path.with_extension(COMPILED_EXTENSION);
    let unit = PrecompiledUnit {
        version: FORMAT_VERSION,
        source: path.display().to_string(),
        module,
    };
    write_precompiled(&output, &unit)?;
    tracing::debug!(source = %path.display(), output = %output.display(), "compiled unit");
    Ok(output)
}

#[derive(Debug)]
pub enum UnitError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, error: ParseError },
    Format { path: PathBuf, message: String },
}

impl UnitError {
    #[cold]
    fn io(path: &Path, source: io::Error) -> Self {
        UnitError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    #[cold]
    fn format(path: &Path, message: impl fmt::Display) -> Self {
        UnitError::Format {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            UnitError::Io { path, .. }
            | UnitError::Parse { path, .. }
            | UnitError::Format { path, .. } => path,
        }
    }
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            UnitError::Parse { path, error } => write!(f, "{}: {error}", path.display()),
            UnitError::Format { path, message } => {
                write!(f, "{}: invalid precompiled unit: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for UnitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnitError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<UnitError> for EvalError {
    fn from(err: UnitError) -> Self {
        match &err {
            UnitError::Parse { error, .. } => syntax_error(error),
            UnitError::Io { .. } | UnitError::Format { .. } => import_error(err.to_string()),
        }
    }
}
