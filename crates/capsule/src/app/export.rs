//! Bundle export: render staged snapshots as one Markdown document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use minijinja::Environment;
use serde::Serialize;

use crate::domain::model::StagedBundle;
use crate::infra::clipboard::ClipboardSink;
use crate::infra::config::Config;

const BUILTIN_TEMPLATE: &str = "bundle_markdown";

/// Runtime options controlling the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub title: String,
    /// Info string of each fenced code block.
    pub language: String,
    /// Built-in template name or a path to a template file.
    pub template: String,
}

impl ExportOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.export.title(),
            language: config.export.language(),
            template: config.export.template(),
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of a clipboard export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    NothingStaged,
    /// The clipboard refused the text; nothing visible happened.
    Unavailable,
}

/// Responsible for rendering bundles and writing artifacts.
#[derive(Debug)]
pub struct Exporter {
    env: Environment<'static>,
    options: ExportOptions,
}

impl Exporter {
    /// Create a new exporter with the built-in template loaded.
    pub fn new(options: ExportOptions) -> Result<Self> {
        Ok(Self {
            env: default_environment()?,
            options,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(ExportOptions::from_config(config))
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Render the bundle. An empty bundle renders to an empty string, which callers treat as
    /// "nothing to export".
    pub fn render(&self, bundle: &StagedBundle) -> Result<String> {
        if bundle.is_empty() {
            return Ok(String::new());
        }

        let context = TemplateContext {
            title: &self.options.title,
            language: &self.options.language,
            count: bundle.len(),
            files: bundle
                .iter()
                .map(|(name, contents)| TemplateFile { name, contents })
                .collect(),
        };
        self.render_with_template(&context, &self.options.template)
    }

    /// Write the rendered document to `path`, replacing any existing file. Returns `None` without
    /// touching the filesystem when nothing is staged.
    pub fn write_to(&self, bundle: &StagedBundle, path: &Path) -> Result<Option<PathBuf>> {
        let rendered = self.render(bundle)?;
        if rendered.is_empty() {
            return Ok(None);
        }

        fs::write(path, &rendered)
            .with_context(|| format!("failed to write export output to {}", path.display()))?;
        tracing::info!(path = %path.display(), files = bundle.len(), "bundle written");
        Ok(Some(path.to_path_buf()))
    }

    /// Place the rendered document on the clipboard. A clipboard failure is reported as
    /// [`CopyOutcome::Unavailable`] rather than an error.
    pub fn copy_to(
        &self,
        bundle: &StagedBundle,
        clipboard: &mut dyn ClipboardSink,
    ) -> Result<CopyOutcome> {
        let rendered = self.render(bundle)?;
        if rendered.is_empty() {
            return Ok(CopyOutcome::NothingStaged);
        }

        match clipboard.set_text(&rendered) {
            Ok(()) => {
                tracing::info!(files = bundle.len(), "bundle copied to clipboard");
                Ok(CopyOutcome::Copied)
            }
            Err(err) => {
                tracing::info!(error = %err, "clipboard unavailable");
                Ok(CopyOutcome::Unavailable)
            }
        }
    }

    fn render_with_template(
        &self,
        context: &TemplateContext<'_>,
        template_name: &str,
    ) -> Result<String> {
        if let Ok(template) = self.env.get_template(template_name) {
            return template
                .render(context)
                .map_err(|err| anyhow!("failed to render template '{template_name}': {err}"));
        }

        let template_path = Path::new(template_name);
        if template_path.exists() {
            let source = fs::read_to_string(template_path).with_context(|| {
                format!(
                    "failed to load template from path {}",
                    template_path.display()
                )
            })?;
            let mut env = Environment::new();
            env.set_trim_blocks(true);
            env.set_lstrip_blocks(true);
            env.add_template("external", &source)
                .map_err(|err| anyhow!("invalid template '{template_name}': {err}"))?;
            return env
                .get_template("external")
                .and_then(|template| template.render(context))
                .map_err(|err| anyhow!("failed to render template '{template_name}': {err}"));
        }

        Err(anyhow!(
            "template '{}' not found (built-in or filesystem)",
            template_name
        ))
    }
}

fn default_environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template(BUILTIN_TEMPLATE, DEFAULT_MARKDOWN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register default markdown template: {err}"))?;
    Ok(env)
}

#[derive(Serialize)]
struct TemplateContext<'a> {
    title: &'a str,
    language: &'a str,
    count: usize,
    files: Vec<TemplateFile<'a>>,
}

#[derive(Serialize)]
struct TemplateFile<'a> {
    name: &'a str,
    contents: &'a str,
}

const DEFAULT_MARKDOWN_TEMPLATE: &str = r#"# {{ title }}
**Total files:** {{ count }}

{% for file in files %}
## File: `{{ file.name }}`
```{{ language }}
{{ file.contents }}
```
---
{% endfor %}
"#;
