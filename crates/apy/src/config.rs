//! Project configuration for apy.
//!
//! Loaded from `--config FILE` or `apyconfig.json` in the current
//! directory. Every field is optional; relative paths are resolved against
//! the directory holding the config file.
//!
//! Example apyconfig.json:
//! ```json
//! {
//!   "entry": "src/main.ts",
//!   "outDir": "dist",
//!   "grammar": "grammars/gdscript.json",
//!   "baseUrl": ".",
//!   "paths": { "@lib/*": ["src/lib/*"] }
//! }
//! ```

use anyhow::{Context, Result};
use apy_transpile::Grammar;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "apyconfig.json";

/// Output directory used when neither the CLI nor the config names one.
pub const DEFAULT_OUT_DIR: &str = "dist";

/// A grammar given inline or as a path to a JSON file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GrammarSource {
    Path(PathBuf),
    Inline(serde_json::Value),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApyConfig {
    pub entry: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub grammar: Option<GrammarSource>,
    /// Root for `paths` alias targets.
    pub base_url: Option<PathBuf>,
    pub paths: IndexMap<String, Vec<String>>,
}

impl ApyConfig {
    /// Load the explicit config file, or `apyconfig.json` from `cwd` if it
    /// exists, or the defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => {
                let candidate = cwd.join(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::load_file(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load config from a file path.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        let root = path.parent().unwrap_or(Path::new(""));
        Ok(config.relative_to(root))
    }

    fn relative_to(self, root: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };
        Self {
            entry: self.entry.map(join),
            out_dir: self.out_dir.map(join),
            grammar: self.grammar.map(|source| match source {
                GrammarSource::Path(path) => GrammarSource::Path(join(path)),
                inline => inline,
            }),
            base_url: self.base_url.map(join),
            paths: self.paths,
        }
    }

    /// Grammar from `override_path` if given, else from the config, else
    /// the Python default.
    pub fn grammar(&self, override_path: Option<&Path>) -> Result<Grammar> {
        if let Some(path) = override_path {
            return load_grammar_file(path);
        }
        match &self.grammar {
            None => Ok(Grammar::default()),
            Some(GrammarSource::Path(path)) => load_grammar_file(path),
            Some(GrammarSource::Inline(value)) => {
                serde_json::from_value(value.clone()).context("invalid inline grammar")
            }
        }
    }
}

pub fn load_grammar_file(path: &Path) -> Result<Grammar> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grammar {}", path.display()))?;
    Grammar::from_json(&content).with_context(|| format!("invalid grammar {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = ApyConfig::load(None, dir.path()).unwrap();
        assert_eq!(config, ApyConfig::default());
        assert_eq!(config.grammar(None).unwrap(), Grammar::python());
    }

    #[test]
    fn test_load_from_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "entry": "src/main.ts", "outDir": "build", "paths": { "@lib/*": ["lib/*"] } }"#,
        )
        .unwrap();

        let config = ApyConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.entry, Some(dir.path().join("src/main.ts")));
        assert_eq!(config.out_dir, Some(dir.path().join("build")));
        assert_eq!(config.paths["@lib/*"], vec!["lib/*".to_string()]);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_inline_grammar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(
            &path,
            r#"{ "grammar": { "functionKeyword": "func", "file": { "extension": "gd" } } }"#,
        )
        .unwrap();

        let config = ApyConfig::load(Some(path.as_path()), Path::new("/")).unwrap();
        let grammar = config.grammar(None).unwrap();
        assert_eq!(grammar.function_keyword, "func");
        assert_eq!(grammar.file.extension, "gd");
        assert_eq!(grammar.class.keyword, "class");
    }

    #[test]
    fn test_grammar_path_relative_to_config() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("grammars")).unwrap();
        std::fs::write(
            dir.path().join("grammars/braces.json"),
            r#"{ "file": { "useBraces": true } }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "grammar": "grammars/braces.json" }"#,
        )
        .unwrap();

        let config = ApyConfig::load(None, dir.path()).unwrap();
        assert!(config.grammar(None).unwrap().file.use_braces);
    }

    #[test]
    fn test_invalid_grammar_is_an_error() {
        let config = ApyConfig {
            grammar: Some(GrammarSource::Inline(serde_json::json!({
                "templateLiteral": { "start": "`" }
            }))),
            ..Default::default()
        };
        let err = config.grammar(None).unwrap_err();
        assert!(format!("{err:#}").contains("templateLiteral"));
    }

    #[test]
    fn test_unreadable_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(ApyConfig::load(Some(missing.as_path()), dir.path()).is_err());
    }
}
