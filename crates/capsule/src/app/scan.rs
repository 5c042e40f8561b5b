//! Project folder scanning.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::infra::config::Config;

/// A candidate source file listed in the file panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name, also the key under which the file is staged.
    pub name: String,
    pub size: Option<u64>,
}

/// Result of scanning a project folder.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub files: Vec<SourceFile>,
    pub root: PathBuf,
    /// The folder did not exist and `files` holds a single placeholder entry.
    pub placeholder: bool,
}

impl ScanResult {
    pub fn find(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|file| file.name == name)
    }
}

/// Configuration inputs for the scanner.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub placeholder_file: String,
}

impl ScannerConfig {
    pub fn from_root(root: PathBuf, config: &Config) -> Self {
        Self {
            root,
            extensions: config.project.extensions.clone(),
            placeholder_file: config.project.placeholder_file.clone(),
        }
    }
}

/// Lists the files directly inside a folder whose names match the extension filter.
#[derive(Debug, Default)]
pub struct Scanner;

impl Scanner {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, cfg: &ScannerConfig) -> Result<ScanResult> {
        if !cfg.root.is_dir() {
            tracing::info!(root = %cfg.root.display(), "project folder missing; using placeholder");
            return Ok(ScanResult {
                files: vec![SourceFile {
                    path: cfg.root.join(&cfg.placeholder_file),
                    name: cfg.placeholder_file.clone(),
                    size: None,
                }],
                root: cfg.root.clone(),
                placeholder: true,
            });
        }

        let matcher = build_matcher(&cfg.extensions)?;
        let mut builder = WalkBuilder::new(&cfg.root);
        builder.standard_filters(false).max_depth(Some(1));

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "scanner error");
                    continue;
                }
            };
            if entry.depth() == 0 || !entry.file_type().is_some_and(|kind| kind.is_file()) {
                continue;
            }
            if let Some(file) = to_source_file(entry.path(), &matcher) {
                files.push(file);
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(root = %cfg.root.display(), files = files.len(), "scanned folder");

        Ok(ScanResult {
            files,
            root: cfg.root.clone(),
            placeholder: false,
        })
    }
}

fn to_source_file(path: &Path, matcher: &GlobSet) -> Option<SourceFile> {
    let name = path.file_name()?.to_string_lossy().to_string();
    if !matcher.is_match(&name) {
        return None;
    }
    let size = path.metadata().ok().map(|meta| meta.len());
    Some(SourceFile {
        path: path.to_path_buf(),
        name,
        size,
    })
}

fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("invalid extension pattern '{pattern}'"))?;
        builder.add(glob);
    }
    builder.build().context("failed to build extension matcher")
}

/// Read a source file as text. Invalid UTF-8 sequences (legacy code pages) are replaced rather
/// than rejected, and a leading byte order mark is dropped.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::info!(path = %path.display(), "source is not valid UTF-8; decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_owned(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(root: &Path, config: &Config) -> Result<ScanResult> {
        Scanner::new().scan(&ScannerConfig::from_root(root.to_path_buf(), config))
    }

    #[test]
    fn lists_matching_files_without_recursing() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("Sub"))?;
        fs::write(root.join("Program.cs"), "class Program {}")?;
        fs::write(root.join("Cart.cs"), "class Cart {}")?;
        fs::write(root.join("README.md"), "# readme")?;
        fs::write(root.join("Sub/Nested.cs"), "class Nested {}")?;
        fs::write(root.join(".Hidden.cs"), "class Hidden {}")?;

        let result = scan(root, &Config::default())?;
        let names: Vec<_> = result.files.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, [".Hidden.cs", "Cart.cs", "Program.cs"]);
        assert!(!result.placeholder);
        assert_eq!(result.find("Cart.cs").and_then(|f| f.size), Some(13));
        Ok(())
    }

    #[test]
    fn missing_folder_yields_placeholder_entry() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let missing = temp.path().join("does-not-exist");

        let result = scan(&missing, &Config::default())?;
        assert!(result.placeholder);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].name, "FakeFile.cs");
        Ok(())
    }

    #[test]
    fn honours_configured_extensions() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        fs::write(root.join("Build.csx"), "")?;
        fs::write(root.join("App.cs"), "")?;

        let mut config = Config::default();
        config.project.extensions = vec!["*.csx".into()];
        let result = scan(root, &config)?;
        let names: Vec<_> = result.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Build.csx"]);
        Ok(())
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.project.extensions = vec!["[".into()];
        assert!(scan(temp.path(), &config).is_err());
    }

    #[test]
    fn reads_legacy_encoded_source_lossily() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("Legacy.cs");
        // "// \xcf\xf0\xe8" is a cp1251 comment, invalid as UTF-8.
        fs::write(&path, b"// \xcf\xf0\xe8\nclass Legacy {}\n")?;

        let text = read_source(&path)?;
        assert!(text.starts_with("// \u{fffd}"));
        assert!(text.ends_with("class Legacy {}\n"));
        Ok(())
    }

    #[test]
    fn strips_byte_order_mark() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("Bom.cs");
        fs::write(&path, "\u{feff}class Bom {}")?;
        assert_eq!(read_source(&path)?, "class Bom {}");
        Ok(())
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        assert!(read_source(&temp.path().join("Gone.cs")).is_err());
    }
}
