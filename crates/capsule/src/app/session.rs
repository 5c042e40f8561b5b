//! Project session: the open file, its hidden names, and the staged bundle.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::export::{CopyOutcome, Exporter};
use crate::app::redact::Redactor;
use crate::app::scan::{ScanResult, Scanner, ScannerConfig, SourceFile, read_source};
use crate::domain::errors::DomainError;
use crate::domain::model::{HiddenNames, StagedBundle};
use crate::domain::syntax::{OutlineEntry, ParsedSource};
use crate::infra::clipboard::ClipboardSink;
use crate::infra::config::Config;
use crate::infra::parser::CSharpParser;

/// Source shown when the selected file cannot be found on disk.
pub const PLACEHOLDER_SOURCE: &str = "public class Fake { void Test() {} }";

/// The file currently shown in the editor pane.
#[derive(Debug, Clone)]
pub struct OpenFile {
    pub name: String,
    pub path: PathBuf,
    /// Parsed original content; every redaction starts from here.
    pub source: ParsedSource,
    pub outline: Vec<OutlineEntry>,
    /// Text currently displayed, i.e. the source rendered with the active hidden names.
    pub displayed: String,
}

/// State of one opened project folder.
#[derive(Debug)]
pub struct ProjectSession {
    scan: ScanResult,
    output_file: String,
    parser: CSharpParser,
    redactor: Redactor,
    exporter: Exporter,
    current: Option<OpenFile>,
    hidden: HiddenNames,
    staged: StagedBundle,
    github_url: Option<String>,
}

impl ProjectSession {
    /// Scan `root` and start a session with nothing open and nothing staged.
    pub fn open(root: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        let root = root.into();
        let scan = Scanner::new()
            .scan(&ScannerConfig::from_root(root, config))
            .context("failed to scan project folder")?;

        Ok(Self {
            scan,
            output_file: config.project.output_file.clone(),
            parser: CSharpParser::new()?,
            redactor: Redactor::from_config(config),
            exporter: Exporter::from_config(config)?,
            current: None,
            hidden: HiddenNames::new(),
            staged: StagedBundle::new(),
            github_url: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.scan.root
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.scan.files
    }

    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }

    pub fn current(&self) -> Option<&OpenFile> {
        self.current.as_ref()
    }

    pub fn hidden(&self) -> &HiddenNames {
        &self.hidden
    }

    pub fn staged(&self) -> &StagedBundle {
        &self.staged
    }

    /// Displayed text of the open file, empty when nothing is open.
    pub fn displayed_text(&self) -> &str {
        self.current
            .as_ref()
            .map_or("", |file| file.displayed.as_str())
    }

    /// Location the Markdown document is saved to.
    pub fn output_path(&self) -> PathBuf {
        self.scan.root.join(&self.output_file)
    }

    /// Remember a GitHub URL. Remote fetching is not supported, so this has no other effect.
    pub fn set_github_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        tracing::info!(%url, "GitHub URL recorded; remote fetch is not supported");
        self.github_url = Some(url);
    }

    pub fn github_url(&self) -> Option<&str> {
        self.github_url.as_deref()
    }

    /// Open a file from the scanned list. Hidden names are reset and the file is shown unredacted.
    pub fn open_file(&mut self, name: &str) -> Result<&OpenFile> {
        let file = self
            .scan
            .find(name)
            .cloned()
            .ok_or_else(|| DomainError::UnknownFile(name.to_owned()))?;

        let text = if file.path.is_file() {
            read_source(&file.path)?
        } else {
            tracing::info!(path = %file.path.display(), "file missing; showing placeholder source");
            PLACEHOLDER_SOURCE.to_owned()
        };

        let source = self
            .parser
            .parse(text)
            .with_context(|| format!("failed to parse {}", file.name))?;
        self.hidden.clear();

        let displayed = self.redactor.redact(&source, &self.hidden);
        let outline = source.outline();
        tracing::debug!(file = %file.name, entries = outline.len(), "opened file");

        Ok(&*self.current.insert(OpenFile {
            name: file.name,
            path: file.path,
            source,
            outline,
            displayed,
        }))
    }

    /// Hide or show a class of the open file and re-render. Returns the new displayed text.
    pub fn set_class_hidden(&mut self, name: &str, hidden: bool) -> Result<&str> {
        self.hidden.set_class_hidden(name, hidden);
        self.rerender()
    }

    /// Hide or show every method named `name` in the open file and re-render.
    pub fn set_method_hidden(&mut self, name: &str, hidden: bool) -> Result<&str> {
        self.hidden.set_method_hidden(name, hidden);
        self.rerender()
    }

    /// Flip the visibility of an outline entry. Returns whether it is hidden afterwards.
    pub fn toggle(&mut self, entry: &OutlineEntry) -> Result<bool> {
        let hide = !self.is_hidden(entry);
        match entry {
            OutlineEntry::Class { name, .. } => self.set_class_hidden(name, hide)?,
            OutlineEntry::Method { name, .. } => self.set_method_hidden(name, hide)?,
        };
        Ok(hide)
    }

    pub fn is_hidden(&self, entry: &OutlineEntry) -> bool {
        match entry {
            OutlineEntry::Class { name, .. } => self.hidden.is_class_hidden(name),
            OutlineEntry::Method { name, .. } => self.hidden.is_method_hidden(name),
        }
    }

    fn rerender(&mut self) -> Result<&str> {
        let file = self.current.as_mut().ok_or(DomainError::NoOpenFile)?;
        file.displayed = self.redactor.redact(&file.source, &self.hidden);
        Ok(file.displayed.as_str())
    }

    /// Capture the displayed text of the open file. Returns the number of staged files.
    pub fn stage_current(&mut self) -> Result<usize> {
        let file = self.current.as_ref().ok_or(DomainError::NoOpenFile)?;
        if file.displayed.is_empty() {
            return Err(DomainError::EmptyDisplay.into());
        }
        self.staged.stage(file.name.clone(), file.displayed.clone());
        tracing::info!(file = %file.name, staged = self.staged.len(), "file staged");
        Ok(self.staged.len())
    }

    /// Render the staged bundle; empty when nothing is staged.
    pub fn document(&self) -> Result<String> {
        self.exporter.render(&self.staged)
    }

    /// Write the document to the project folder. `None` when nothing is staged.
    pub fn save_document(&self) -> Result<Option<PathBuf>> {
        self.exporter.write_to(&self.staged, &self.output_path())
    }

    pub fn copy_document(&self, clipboard: &mut dyn ClipboardSink) -> Result<CopyOutcome> {
        self.exporter.copy_to(&self.staged, clipboard)
    }
}
