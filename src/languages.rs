// src/languages.rs
//! Language name -> file extensions table.

use crate::error::Result;
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LangExtension {
    pub name: String,
    pub extensions: Vec<String>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    ("C#", &[".cs", ".cake", ".csx"]),
    ("Dart", &[".dart"]),
    ("Go", &[".go"]),
    ("Java", &[".java"]),
    ("JavaScript", &[".js", ".cjs", ".mjs", ".jsx", ".es6"]),
    ("Kotlin", &[".kt", ".kts", ".ktm"]),
    ("Python", &[".py", ".pyw"]),
    ("Scala", &[".scala", ".sc"]),
    ("Swift", &[".swift"]),
    ("TypeScript", &[".ts", ".tsx", ".mts", ".cts"]),
];

pub fn builtin() -> Vec<LangExtension> {
    BUILTIN
        .iter()
        .map(|(name, exts)| LangExtension {
            name: (*name).to_owned(),
            extensions: exts.iter().map(|e| (*e).to_owned()).collect(),
        })
        .collect()
}

/// Table from `path` when it exists, otherwise the built-in one.
pub fn load(path: &Path) -> Result<Vec<LangExtension>> {
    if path.is_file() {
        log::debug!("Loading language extensions from {}", path.display());
        crate::error::read_json(path)
    } else {
        Ok(builtin())
    }
}

/// Union of the extensions of every requested language.
///
/// Unknown language names contribute nothing and are reported.
pub fn resolve(table: &[LangExtension], languages: &[String]) -> HashSet<String> {
    let mut extensions = HashSet::new();
    for lang in languages {
        let mut found = false;
        for entry in table.iter().filter(|e| &e.name == lang) {
            found = true;
            extensions.extend(entry.extensions.iter().cloned());
        }
        if !found {
            log::warn!("No extensions known for language '{lang}'");
        }
    }
    extensions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unions_languages() {
        let exts = resolve(&builtin(), &["Java".into(), "Kotlin".into(), "Cobol".into()]);
        assert!(exts.contains(".java"));
        assert!(exts.contains(".kt"));
        assert!(!exts.contains(".swift"));
        assert_eq!(exts.len(), 4);
    }

    #[test]
    fn test_table_file_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langs.json");
        std::fs::write(&path, r#"[{"name":"Java","extensions":[".jav"]}]"#).unwrap();

        let table = load(&path).unwrap();
        assert_eq!(table.len(), 1);
        let exts = resolve(&table, &["Java".into()]);
        assert!(exts.contains(".jav"));
        assert!(!exts.contains(".java"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let table = load(Path::new("definitely/not/here.json")).unwrap();
        assert_eq!(table, builtin());
    }
}
