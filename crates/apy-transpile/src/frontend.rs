//! Filesystem front-end: unit discovery and module resolution.
//!
//! Starting from the entry files, every local import is resolved to a file
//! and loaded once, breadth-first. Specifiers are classified as:
//!
//! - relative (`./x`, `../x`): resolved against the importing file;
//! - `paths` aliases (`@lib/*`): resolved against `base_url`;
//! - the stdlib shim: never loaded;
//! - anything else: an external module of the target language.
//!
//! Relative or aliased specifiers that do not resolve are reported on the
//! importing unit and skipped.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::driver::{CompileError, SourceUnit};
use crate::grammar::Grammar;
use crate::ir::Stmt;
use crate::stdlib::{is_shim_module, shim_submodule};
use crate::traits::{FrontEnd, Reader};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when resolving a module specifier.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "js", "jsx", "mjs"];

/// How an import specifier was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Local(PathBuf),
    /// The stdlib shim or one of its submodules.
    Shim,
    /// A module of the target language (or a declaration-only file).
    External,
    /// Looked local but matched no file.
    Unresolved,
}

/// Loads units from disk.
pub struct FsFrontEnd<'a> {
    reader: &'a dyn Reader,
    grammar: &'a Grammar,
    /// Root for `paths` targets.
    pub base_url: Option<PathBuf>,
    /// Path aliases, e.g. `"@lib/*": ["src/lib/*"]`.
    pub paths: IndexMap<String, Vec<String>>,
}

impl<'a> FsFrontEnd<'a> {
    pub fn new(reader: &'a dyn Reader, grammar: &'a Grammar) -> Self {
        Self {
            reader,
            grammar,
            base_url: None,
            paths: IndexMap::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<PathBuf>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_paths(mut self, paths: IndexMap<String, Vec<String>>) -> Self {
        self.paths = paths;
        self
    }

    /// Module specifiers imported by a unit, in source order.
    ///
    /// Unreadable text yields no imports; the driver reports it when the
    /// unit itself is compiled.
    pub fn imports(&self, text: &str) -> Vec<String> {
        match self.reader.read(text) {
            Ok(program) => program
                .body
                .into_iter()
                .filter_map(|stmt| match stmt {
                    Stmt::Import(import) => Some(import.source),
                    _ => None,
                })
                .collect(),
            Err(err) => {
                tracing::debug!(error = %err, "could not scan imports");
                Vec::new()
            }
        }
    }

    /// Classify `specifier` as imported from `importer`.
    pub fn resolve(&self, specifier: &str, importer: &Path) -> Resolution {
        if is_shim_module(specifier, self.grammar) || shim_submodule(specifier, self.grammar).is_some()
        {
            return Resolution::Shim;
        }

        if is_relative(specifier) {
            let Some(dir) = importer.parent() else {
                return Resolution::Unresolved;
            };
            return match resolve_file(&dir.join(specifier)) {
                Some(path) => classify(path),
                None => Resolution::Unresolved,
            };
        }

        if let Some(candidates) = self.alias_targets(specifier) {
            return candidates
                .iter()
                .find_map(|candidate| resolve_file(candidate))
                .map(classify)
                .unwrap_or(Resolution::Unresolved);
        }

        // Non-relative specifiers may still name a file under baseUrl
        if let Some(base) = &self.base_url
            && let Some(path) = resolve_file(&base.join(specifier))
        {
            return classify(path);
        }

        Resolution::External
    }

    /// Candidate paths for a specifier matching a `paths` alias, or `None`
    /// if no alias matches.
    fn alias_targets(&self, specifier: &str) -> Option<Vec<PathBuf>> {
        let base = self.base_url.clone().unwrap_or_default();
        self.paths.iter().find_map(|(pattern, targets)| {
            let captured = match_alias(pattern, specifier)?;
            Some(
                targets
                    .iter()
                    .map(|target| base.join(target.replacen('*', captured, 1)))
                    .collect(),
            )
        })
    }
}

impl FrontEnd for FsFrontEnd<'_> {
    fn load(&self, entries: &[PathBuf]) -> Result<Vec<SourceUnit>, CompileError> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();

        for entry in entries {
            let text = fs::read_to_string(entry).map_err(|source| {
                if source.kind() == ErrorKind::NotFound {
                    CompileError::EntryNotFound(entry.clone())
                } else {
                    CompileError::Read {
                        path: entry.clone(),
                        source,
                    }
                }
            })?;
            let path = canonical(entry);
            if seen.insert(path.clone()) {
                queue.push_back(SourceUnit::new(path, text));
            }
        }

        let mut units = Vec::new();
        while let Some(mut unit) = queue.pop_front() {
            for specifier in self.imports(&unit.text) {
                match self.resolve(&specifier, &unit.path) {
                    Resolution::Local(target) => {
                        let target = canonical(&target);
                        if !seen.insert(target.clone()) {
                            continue;
                        }
                        match fs::read_to_string(&target) {
                            Ok(text) => queue.push_back(SourceUnit::new(target, text)),
                            Err(err) => unit.diagnostics.push(
                                Diagnostic::new(
                                    DiagnosticKind::Io,
                                    format!("failed to read {}: {err}", target.display()),
                                )
                                .with_path(&unit.path),
                            ),
                        }
                    }
                    Resolution::Unresolved => {
                        tracing::warn!(
                            specifier = %specifier,
                            importer = %unit.path.display(),
                            "unresolved import"
                        );
                        unit.diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::Resolution,
                                format!("cannot resolve `{specifier}`"),
                            )
                            .with_path(&unit.path),
                        );
                    }
                    Resolution::Shim | Resolution::External => {}
                }
            }
            tracing::debug!(path = %unit.path.display(), "loaded unit");
            units.push(unit);
        }

        Ok(units)
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
}

/// Declaration-only files carry no runtime code.
fn classify(path: PathBuf) -> Resolution {
    let declaration = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(".d.ts"));
    if declaration {
        Resolution::External
    } else {
        Resolution::Local(path)
    }
}

/// Find the file a module path refers to: as-is, with a source extension,
/// or as a directory index.
fn resolve_file(target: &Path) -> Option<PathBuf> {
    if target.is_file() {
        return Some(target.to_path_buf());
    }

    // `./util.js` commonly names `util.ts`
    for ext in SOURCE_EXTENSIONS {
        let with_ext = target.with_extension(ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
        let appended = PathBuf::from(format!("{}.{ext}", target.display()));
        if appended.is_file() {
            return Some(appended);
        }
    }

    if target.is_dir() {
        for ext in SOURCE_EXTENSIONS {
            let index = target.join(format!("index.{ext}"));
            if index.is_file() {
                return Some(index);
            }
        }
    }

    let declaration = PathBuf::from(format!("{}.d.ts", target.display()));
    declaration.is_file().then_some(declaration)
}

/// Match `specifier` against an alias pattern with at most one `*`,
/// returning the text the wildcard captured.
fn match_alias<'s>(pattern: &str, specifier: &'s str) -> Option<&'s str> {
    match pattern.split_once('*') {
        None => (pattern == specifier).then_some(""),
        Some((prefix, suffix)) => specifier
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix)),
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(all(test, feature = "read-typescript"))]
mod tests {
    use super::*;
    use crate::input::TYPESCRIPT_READER;

    fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    fn names(units: &[SourceUnit]) -> Vec<String> {
        units
            .iter()
            .map(|u| u.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_match_alias() {
        assert_eq!(match_alias("@lib/*", "@lib/math"), Some("math"));
        assert_eq!(match_alias("@lib/*", "lodash"), None);
        assert_eq!(match_alias("config", "config"), Some(""));
        assert_eq!(match_alias("config", "configs"), None);
    }

    #[test]
    fn test_loads_transitive_imports_breadth_first() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(
            dir.path(),
            "main.ts",
            "import { a } from \"./a\";\nimport { b } from \"./lib/b.js\";\n",
        );
        write(dir.path(), "a.ts", "import { c } from \"./c\";\nexport const a = 1;\n");
        write(dir.path(), "lib/b.ts", "import { a } from \"../a\";\nexport const b = 2;\n");
        write(dir.path(), "c.ts", "export const c = 3;\n");

        let grammar = Grammar::python();
        let front_end = FsFrontEnd::new(&TYPESCRIPT_READER, &grammar);
        let units = front_end.load(&[entry]).unwrap();
        assert_eq!(names(&units), vec!["main.ts", "a.ts", "b.ts", "c.ts"]);
        assert!(units.iter().all(|u| u.diagnostics.is_empty()));
    }

    #[test]
    fn test_external_shim_and_declaration_imports_are_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(
            dir.path(),
            "main.ts",
            "import py from \"./pylib\";\nimport os from \"os\";\nimport { T } from \"./types\";\n",
        );
        write(dir.path(), "pylib/index.ts", "export default {};\n");
        write(dir.path(), "types.d.ts", "export interface T {}\n");

        let grammar = Grammar::python();
        let front_end = FsFrontEnd::new(&TYPESCRIPT_READER, &grammar);
        let units = front_end.load(&[entry]).unwrap();
        assert_eq!(names(&units), vec!["main.ts"]);
        assert!(units[0].diagnostics.is_empty());
    }

    #[test]
    fn test_unresolved_local_import_is_diagnosed() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(dir.path(), "main.ts", "import { x } from \"./missing\";\n");

        let grammar = Grammar::python();
        let front_end = FsFrontEnd::new(&TYPESCRIPT_READER, &grammar);
        let units = front_end.load(&[entry]).unwrap();
        assert_eq!(units.len(), 1);
        let diagnostic = &units[0].diagnostics[0];
        assert_eq!(diagnostic.kind, DiagnosticKind::Resolution);
        assert!(diagnostic.message.contains("./missing"));
    }

    #[test]
    fn test_path_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let entry = write(dir.path(), "src/main.ts", "import { m } from \"@lib/math\";\n");
        write(dir.path(), "src/lib/math.ts", "export const m = 1;\n");

        let grammar = Grammar::python();
        let mut paths = IndexMap::new();
        paths.insert("@lib/*".to_string(), vec!["src/lib/*".to_string()]);
        let front_end = FsFrontEnd::new(&TYPESCRIPT_READER, &grammar)
            .with_base_url(dir.path())
            .with_paths(paths);
        let units = front_end.load(&[entry]).unwrap();
        assert_eq!(names(&units), vec!["main.ts", "math.ts"]);
    }

    #[test]
    fn test_missing_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let grammar = Grammar::python();
        let front_end = FsFrontEnd::new(&TYPESCRIPT_READER, &grammar);
        let err = front_end
            .load(&[dir.path().join("nope.ts")])
            .unwrap_err();
        assert!(matches!(err, CompileError::EntryNotFound(_)));
    }
}
